pub mod auth;
pub mod csrf;
pub mod error_pages;
pub mod response;

pub use auth::{redirect_if_logged_in, require_login};
pub use csrf::{csrf_middleware, CsrfToken, RotateCsrf};
pub use error_pages::{error_pages, panic_response};
pub use response::{html, is_htmx, redirect_to};

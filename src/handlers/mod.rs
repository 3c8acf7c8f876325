// handlers/mod.rs - Route handlers
//
// Public:    /health, /login, /register, /logout
// Protected: /, /lists/*   (behind require_login)

pub mod extract;
pub mod health;
pub mod lists;
pub mod login;

use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use self::extract::Viewer;
use crate::app::AppState;
use crate::error::AppError;
use crate::middleware::html;
use crate::view::{Partial, View};

pub use health::health;
pub use lists::{create_list, delete_list, edit_list, list_index, root, show_list, update_list};
pub use login::{login_form, logout, register_form, submit_login, submit_registration};

/// Full page inside the layout
pub(crate) async fn page<T: Serialize>(
    state: &AppState,
    viewer: &Viewer,
    status: StatusCode,
    view: View,
    data: &T,
) -> Result<Response, AppError> {
    let globals = viewer.globals();
    let body = state.renderer.render_view(view, &globals, data).await?;
    Ok(html(status, body))
}

/// Partial for htmx swaps, without the layout
pub(crate) async fn fragment<T: Serialize>(
    state: &AppState,
    viewer: &Viewer,
    status: StatusCode,
    partial: Partial,
    data: &T,
) -> Result<Response, AppError> {
    let globals = viewer.globals();
    let body = state.renderer.render_partial(partial, &globals, data).await?;
    Ok(html(status, body))
}

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::not_found("Page not found")
}

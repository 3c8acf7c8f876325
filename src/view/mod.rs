//! Server-side HTML rendering.
//!
//! Templates live in a directory tree:
//!
//! ```text
//! views/
//!   layout.html          page chrome shared by every view
//!   shared/*.html        partials available everywhere
//!   <dir>/*.html         views, plus `_`-prefixed partials
//!   <dir>/shared/*.html  partials that replace a global one of the same name
//! ```

pub mod card;
pub mod context;
pub mod names;
pub mod renderer;

pub use card::{Card, NewListForm};
pub use context::Globals;
pub use names::{Partial, SharedPartial, View};
pub use renderer::{RenderError, Renderer, TemplateSet};

pub const LAYOUT_FILE: &str = "layout.html";
pub const SHARED_DIR: &str = "shared";

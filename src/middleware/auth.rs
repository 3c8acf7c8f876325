use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;
use tracing::warn;

use super::response::{is_htmx, redirect_to};
use crate::app::AppState;
use crate::auth::current_user;
use crate::error::AppError;

/// Sends anonymous callers to the login page. A no-op when login is not required.
pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.security.require_login || current_user(&session).await?.is_some() {
        return Ok(next.run(request).await);
    }

    warn!(
        method = %request.method(),
        path = %request.uri().path(),
        "not logged in, redirecting to /login"
    );
    Ok(redirect_to(is_htmx(request.headers()), "/login"))
}

/// Keeps logged-in callers away from the login and registration pages
pub async fn redirect_if_logged_in(session: Session, request: Request, next: Next) -> Result<Response, AppError> {
    if current_user(&session).await?.is_some() {
        return Ok(redirect_to(is_htmx(request.headers()), "/lists"));
    }
    Ok(next.run(request).await)
}

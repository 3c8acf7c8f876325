use std::any::Any;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::{error, warn};

use super::csrf::CsrfToken;
use super::response::is_htmx;
use crate::app::AppState;
use crate::auth::current_user;
use crate::error::{AppError, ErrorPage};
use crate::view::{Globals, SharedPartial, View};

#[derive(Serialize)]
struct ErrorView<'a> {
    status: u16,
    reason: &'a str,
    message: &'a str,
}

/// Replaces the body of every [`AppError`] response with a rendered page, or
/// with the shared error fragment for htmx requests. Status and headers
/// (including any `Set-Cookie`) are kept.
pub async fn error_pages(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let htmx = is_htmx(request.headers());
    let session = request.extensions().get::<Session>().cloned();
    let response = next.run(request).await;

    let Some(page) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let user = match session {
        Some(session) => current_user(&session).await.unwrap_or_else(|e| {
            warn!(error = %e, "session unreadable while rendering error page");
            None
        }),
        None => None,
    };
    let token = response
        .extensions()
        .get::<CsrfToken>()
        .map(|CsrfToken(token)| token.clone())
        .unwrap_or_default();
    let globals = Globals::new(token, user.as_ref());
    let data = ErrorView {
        status: page.status.as_u16(),
        reason: page.status.canonical_reason().unwrap_or("Error"),
        message: &page.message,
    };

    let rendered = if htmx {
        state
            .renderer
            .render_shared(SharedPartial::ErrorMessage, &globals, &data)
            .await
    } else {
        let view = if page.status == StatusCode::NOT_FOUND {
            View::NotFound
        } else {
            View::Error
        };
        state.renderer.render_view(view, &globals, &data).await
    };

    match rendered {
        Ok(html) => {
            let (mut parts, _) = response.into_parts();
            parts.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            );
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(html))
        }
        Err(err) => {
            error!(error = %err, detail = ?err, "failed to render error page");
            response
        }
    }
}

/// Response for a panicking handler; rendered by [`error_pages`] like any other 500
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    };
    AppError::internal(format!("handler panicked: {}", detail)).into_response()
}

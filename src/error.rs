// Request-level error classification
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::{IdentityError, SessionError};
use crate::database::{DatabaseError, ValidationError};
use crate::view::RenderError;

/// Every way a request can fail, classified into a status code
#[derive(Debug, Error)]
pub enum AppError {
    // 400
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // 403
    #[error("{0}")]
    Forbidden(String),

    // 404
    #[error("{0}")]
    NotFound(String),

    // 500
    #[error(transparent)]
    Database(DatabaseError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error("{0}")]
    Internal(String),
}

/// Attached to error responses so the error page middleware can replace the
/// plain body with a rendered page or fragment.
#[derive(Debug, Clone)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Render(_)
            | AppError::Session(_)
            | AppError::Identity(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the client; server faults never leak details
    pub fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::Forbidden(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(err) => err.to_string(),
            _ => "Internal server error".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        if err.is_not_found() {
            match err {
                DatabaseError::NotFound(what) => AppError::NotFound(what),
                _ => AppError::NotFound("Not found".to_string()),
            }
        } else {
            AppError::Database(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, detail = ?self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let message = self.client_message();
        let mut response = (status, message.clone()).into_response();
        response.extensions_mut().insert(ErrorPage { status, message });
        response
    }
}

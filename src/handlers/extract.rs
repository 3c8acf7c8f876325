// handlers/extract.rs - Request extractors shared by the handlers

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;
use tower_sessions::Session;

use crate::auth::{current_user, SessionUser};
use crate::error::AppError;
use crate::middleware::CsrfToken;
use crate::view::Globals;

/// Body accepted as JSON when the content type says so, as a url-encoded form otherwise
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::bad_request(e.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// The `:id` path segment of a list route. Anything that is not an integer
/// names a list that cannot exist, so it is a 404 rather than a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for ListId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found("List not found"))?;
        raw.parse::<i64>()
            .map(ListId)
            .map_err(|_| AppError::not_found(format!("List {} not found", raw)))
    }
}

/// Who is asking and the CSRF token their forms must echo
#[derive(Debug, Clone)]
pub struct Viewer {
    pub csrf_token: String,
    pub user: Option<SessionUser>,
}

impl Viewer {
    pub fn globals(&self) -> Globals {
        Globals::new(self.csrf_token.as_str(), self.user.as_ref())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let CsrfToken(csrf_token) = parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::internal("page handler ran without a CSRF token"))?;
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::internal("page handler ran without a session"))?;

        let user = current_user(&session).await?;
        Ok(Self { csrf_token, user })
    }
}

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, error};

use crate::app::AppState;
use crate::auth::{is_well_formed_token, random_token, tokens_match, CSRF_COOKIE, CSRF_FIELD, CSRF_HEADER};
use crate::config::SecurityConfig;
use crate::error::AppError;

/// Largest form body buffered while looking for the token
const MAX_FORM_BYTES: usize = 64 * 1024;

/// The caller's CSRF token, available to handlers and to the error page layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

/// Set on a response to have the caller issued a new CSRF token, as on login and logout
#[derive(Debug, Clone, Copy)]
pub struct RotateCsrf;

/// Double-submit CSRF protection.
///
/// The token lives in the `htmxtodo_csrf` cookie and is issued on the first
/// page view, without touching the session. State-changing requests must
/// echo it in the `_csrf` form field of url-encoded bodies or in the
/// `X-CSRF-Token` header.
pub async fn csrf_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let issued = jar
        .get(CSRF_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| is_well_formed_token(value));

    let mut request = match check(request, issued.as_deref()).await {
        Ok(request) => request,
        Err(err) => {
            let mut response = err.into_response();
            if let Some(token) = issued {
                response.extensions_mut().insert(CsrfToken(token));
            }
            return response;
        }
    };

    let token = issued.clone().unwrap_or_else(random_token);
    request.extensions_mut().insert(CsrfToken(token.clone()));
    let mut response = next.run(request).await;

    let rotate = response.extensions().get::<RotateCsrf>().is_some();
    let token = if rotate { random_token() } else { token };
    response.extensions_mut().insert(CsrfToken(token.clone()));

    if rotate || issued.is_none() {
        debug!(rotate, "issuing CSRF token");
        let jar = jar.add(csrf_cookie(token, &state.config.security));
        return (jar, response).into_response();
    }
    response
}

/// Passes safe requests through; otherwise the request back once its token matches
async fn check(request: Request, issued: Option<&str>) -> Result<Request, AppError> {
    if is_safe(request.method()) {
        return Ok(request);
    }

    let (parts, body) = request.into_parts();
    let header_token = header_token(&parts.headers);

    let (token, request) = if is_form(&parts.headers) {
        let bytes = to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|e| AppError::bad_request(format!("unreadable form body: {}", e)))?;
        let token = form_token(&bytes).or(header_token);
        (token, Request::from_parts(parts, Body::from(bytes)))
    } else {
        (header_token, Request::from_parts(parts, body))
    };

    match (token, issued) {
        (Some(token), Some(expected)) if tokens_match(&token, expected) => Ok(request),
        (supplied, _) => {
            error!(
                method = %request.method(),
                path = %request.uri().path(),
                token_supplied = supplied.is_some(),
                cookie_present = issued.is_some(),
                "CSRF token mismatch"
            );
            Err(AppError::forbidden("Invalid CSRF token"))
        }
    }
}

/// Readable by page scripts so htmx can send it as a header
fn csrf_cookie(token: String, security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .http_only(false)
        .secure(security.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(security.session_ttl_days))
        .build()
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn form_token(body: &[u8]) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == CSRF_FIELD)
        .map(|(_, value)| value.into_owned())
}

use axum::{
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
};

pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_LOCATION: HeaderName = HeaderName::from_static("hx-location");
pub const HX_RETARGET: HeaderName = HeaderName::from_static("hx-retarget");
pub const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");

/// True when the request was issued by htmx rather than a full page load
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key(HX_REQUEST)
}

/// HTML body with an explicit status
pub fn html(status: StatusCode, body: String) -> Response {
    (status, Html(body)).into_response()
}

/// Sends the browser to `location`.
///
/// htmx follows a 302 inside its XHR and would swap the target page into the
/// current one, so htmx requests get a 200 with `HX-Location` instead.
pub fn redirect_to(htmx: bool, location: &'static str) -> Response {
    if htmx {
        (StatusCode::OK, [(HX_LOCATION, location)]).into_response()
    } else {
        (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
    }
}

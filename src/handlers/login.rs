// handlers/login.rs - Account registration, login and logout
//
// Credentials are checked by the identity provider; the session only
// remembers that the check passed.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, warn};

use super::extract::{FormOrJson, Viewer};
use super::page;
use crate::app::AppState;
use crate::auth::{self, SignUpRequest};
use crate::database::ValidationError;
use crate::error::AppError;
use crate::middleware::{is_htmx, redirect_to, RotateCsrf};
use crate::view::View;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Default, Serialize)]
struct AuthForm {
    email: String,
    error: Option<String>,
}

/// What the login and registration templates render
#[derive(Debug, Default, Serialize)]
struct AuthPage {
    form: AuthForm,
}

impl AuthPage {
    fn rejected(email: &str, error: impl ToString) -> Self {
        Self {
            form: AuthForm {
                email: email.to_string(),
                error: Some(error.to_string()),
            },
        }
    }
}

pub async fn login_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Response, AppError> {
    page(&state, &viewer, StatusCode::OK, View::Login, &AuthPage::default()).await
}

pub async fn submit_login(
    State(state): State<AppState>,
    session: Session,
    viewer: Viewer,
    headers: HeaderMap,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim();
    if let Err(err) = require("email", email).and_then(|_| require("password", &form.password)) {
        return rejected(&state, &viewer, View::Login, email, err).await;
    }

    match state.identity.sign_in(email, &form.password).await {
        Ok(outcome) => {
            auth::log_in(&session, outcome.email).await?;
            info!("user logged in");
            let mut response = redirect_to(is_htmx(&headers), "/lists");
            response.extensions_mut().insert(RotateCsrf);
            Ok(response)
        }
        Err(err) if err.is_user_facing() => {
            warn!(error = %err, "login rejected");
            rejected(&state, &viewer, View::Login, email, err).await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn register_form(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Response, AppError> {
    page(&state, &viewer, StatusCode::OK, View::Register, &AuthPage::default()).await
}

pub async fn submit_registration(
    State(state): State<AppState>,
    viewer: Viewer,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    FormOrJson(form): FormOrJson<RegistrationForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim();
    if let Err(err) = validate_registration(email, &form) {
        return rejected(&state, &viewer, View::Register, email, err).await;
    }

    let request = SignUpRequest {
        email: email.to_string(),
        password: form.password.clone(),
        ip_address: client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr)),
    };

    match state.identity.sign_up(&request).await {
        Ok(outcome) => {
            info!(user_confirmed = outcome.user_confirmed, "user registered");
            Ok(redirect_to(is_htmx(&headers), "/login"))
        }
        Err(err) if err.is_user_facing() => {
            warn!(error = %err, "registration rejected");
            rejected(&state, &viewer, View::Register, email, err).await
        }
        Err(err) => Err(AppError::from(err)),
    }
}

pub async fn logout(session: Session, headers: HeaderMap) -> Result<Response, AppError> {
    auth::log_out(&session).await?;
    info!("user logged out");
    let mut response = redirect_to(is_htmx(&headers), "/login");
    response.extensions_mut().insert(RotateCsrf);
    Ok(response)
}

/// The form again, with the email kept and the reason shown (422)
async fn rejected(
    state: &AppState,
    viewer: &Viewer,
    view: View,
    email: &str,
    error: impl ToString,
) -> Result<Response, AppError> {
    let data = AuthPage::rejected(email, error);
    page(state, viewer, StatusCode::UNPROCESSABLE_ENTITY, view, &data).await
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

fn validate_registration(email: &str, form: &RegistrationForm) -> Result<(), ValidationError> {
    require("email", email)?;
    require("password", &form.password)?;
    if form.password != form.password_confirmation {
        return Err(ValidationError::Mismatch("passwords do not match"));
    }
    Ok(())
}

/// First `X-Forwarded-For` hop, else the peer address
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity provider is not configured")]
    NotConfigured,

    /// The provider refused the request; `message` is safe to show the user.
    #[error("{message}")]
    Rejected { kind: String, message: String },

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected identity provider response: {0}")]
    UnexpectedResponse(String),
}

impl IdentityError {
    /// Errors the user can act on, as opposed to outages and bugs
    pub fn is_user_facing(&self) -> bool {
        matches!(self, IdentityError::Rejected { .. } | IdentityError::NotConfigured)
    }
}

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutcome {
    pub email: String,
}

/// Account registration and credential checks delegated to an external service
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome, IdentityError>;
}

/// Stand-in used when no provider client id is configured
pub struct UnconfiguredProvider;

#[async_trait]
impl IdentityProvider for UnconfiguredProvider {
    async fn sign_up(&self, _request: &SignUpRequest) -> Result<SignUpOutcome, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<SignInOutcome, IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}

pub mod cognito;
pub mod identity;
pub mod session;
pub mod store;

use subtle::ConstantTimeEq;
use tower_sessions::cookie::Key;

use crate::config::ConfigError;

pub use cognito::CognitoClient;
pub use identity::{
    IdentityError, IdentityProvider, SignInOutcome, SignUpOutcome, SignUpRequest, UnconfiguredProvider,
};
pub use session::{current_user, log_in, log_out, SessionError, SessionUser, USER_KEY};
pub use store::{postgres_store, spawn_expired_session_cleanup, CLEANUP_INTERVAL};

/// Name of the signed session cookie
pub const SESSION_COOKIE: &str = "htmxtodo_session_id";
/// Name of the script-readable cookie carrying the CSRF token
pub const CSRF_COOKIE: &str = "htmxtodo_csrf";
/// Form field carrying the CSRF token
pub const CSRF_FIELD: &str = "_csrf";
/// Header carrying the CSRF token for script-issued requests
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Shortest secret accepted for signing session cookies
pub const MIN_SECRET_BYTES: usize = 64;

/// Cookie signing key from the configured secret
pub fn signing_key(secret: &str) -> Result<Key, ConfigError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::Invalid {
            name: "SESSION_SECRET",
            value: format!("{} bytes, need at least {}", secret.len(), MIN_SECRET_BYTES),
        });
    }
    Key::try_from(secret.as_bytes()).map_err(|_| ConfigError::Invalid {
        name: "SESSION_SECRET",
        value: "unusable as a signing key".to_string(),
    })
}

/// Random token with 244 bits of entropy
pub fn random_token() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Compares two tokens in constant time. An empty expected token never matches.
pub fn tokens_match(given: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Whether a cookie value could have come from [`random_token`]
pub fn is_well_formed_token(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

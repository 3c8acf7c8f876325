use serde::{Deserialize, Serialize};
use tower_sessions::Session;

pub use tower_sessions::session::Error as SessionError;

/// Session key holding the signed-in [`SessionUser`]
pub const USER_KEY: &str = "user";

/// Who the session belongs to. Absent for anonymous callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
}

pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, SessionError> {
    session.get::<SessionUser>(USER_KEY).await
}

/// Marks the caller as signed in under a new session id
pub async fn log_in(session: &Session, email: impl Into<String>) -> Result<(), SessionError> {
    session.cycle_id().await?;
    session
        .insert(USER_KEY, SessionUser { email: email.into() })
        .await
}

/// Deletes the session from the store and expires its cookie
pub async fn log_out(session: &Session) -> Result<(), SessionError> {
    session.flush().await
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// A row of the `lists` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct List {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A list name that has been trimmed and checked for emptiness and control
/// characters.
///
/// The repository only accepts this type, so an empty, padded or NUL-bearing
/// name can never reach the `lists` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListName(String);

impl ListName {
    pub const MAX_LEN: usize = 200;

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        if trimmed.chars().count() > Self::MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: Self::MAX_LEN,
            });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::ControlCharacters { field: "name" });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ListName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

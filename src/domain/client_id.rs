//! `ClientId` value object.

use serde::Serialize;
use thiserror::Error;

/// Maximum length of a client id (characters).
const MAX_CLIENT_ID_LEN: usize = 64;

/// Validation errors for [`ClientId`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClientIdError {
    /// Client id is empty (or whitespace only)
    #[error("client id must not be empty")]
    Empty,

    /// Client id exceeds the maximum length
    #[error("client id must be at most {MAX_CLIENT_ID_LEN} characters, got {0}")]
    TooLong(usize),
}

/// Identifier a client picks for itself when joining the room.
///
/// Unique among *live* connections only — the registry replaces the previous
/// entry when the same id connects again. Stored messages keep the id of
/// whoever sent them, live or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Create a validated `ClientId`. Surrounding whitespace is trimmed.
    pub fn new(value: String) -> Result<Self, ClientIdError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ClientIdError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_CLIENT_ID_LEN {
            return Err(ClientIdError::TooLong(len));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ClientId {
    type Error = ClientIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

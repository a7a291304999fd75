//! Errors reported to chat clients.
//!
//! The `Display` text of each variant is the advisory string sent back over
//! the socket; clients show it verbatim.

/// Result type for hub operations
pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChatError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("You must join with a username first")]
    NotJoined,

    #[error("Invalid message format: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::MalformedPayload(e.to_string())
    }
}

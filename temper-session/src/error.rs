//! Session error types.
//!
//! Generation failures never appear here: a failed classification keeps
//! the prior mood and a failed reply becomes the canned fallback reply.

use thiserror::Error;

/// Errors from building or driving a conversation session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The character is not part of this session.
    #[error("Character not in session: {0}")]
    UnknownCharacter(String),

    /// A character with this id already joined the session.
    #[error("Character already in session: {0}")]
    DuplicateCharacter(String),

    /// Loading configuration or a roster failed.
    #[error(transparent)]
    Core(#[from] temper_core::TemperError),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SessionError>;

//! Error types for the temper core library.

use thiserror::Error;

/// Top-level error type for all temper-core operations.
///
/// Note that nothing on the per-turn path (extraction, adjustment, rule
/// matching, assembly) returns this type: those stages normalize instead of
/// failing. Errors only arise while loading configuration, rosters and
/// persisted records.
#[derive(Error, Debug)]
pub enum TemperError {
    /// No character with this id or name exists in the roster.
    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    /// A persisted mood record could not be decoded.
    #[error("Invalid mood record: {0}")]
    InvalidRecord(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, TemperError>;

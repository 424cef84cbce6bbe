//! Generation error types.

use thiserror::Error;

/// Errors that can occur while asking a provider for text.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP request failed.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    /// Provider response body was not the expected JSON.
    #[error("Failed to parse LLM response as JSON: {0}")]
    ParseError(String),

    /// Request timed out.
    #[error("LLM request timed out after {0}ms")]
    Timeout(u64),

    /// Provider is unavailable or not configured.
    #[error("LLM provider unavailable: {0}")]
    Unavailable(String),

    /// All retry attempts against one provider exhausted.
    #[error("All LLM retry attempts exhausted after {attempts} tries: {last_error}")]
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
        /// The error from the final attempt.
        last_error: String,
    },

    /// Every provider in a fallback chain failed.
    #[error("All {providers} LLM providers failed; last error: {last_error}")]
    AllProvidersFailed {
        /// How many providers were tried.
        providers: usize,
        /// The error from the last provider tried.
        last_error: String,
    },

    /// Configuration error.
    #[error("LLM configuration error: {0}")]
    ConfigError(String),
}

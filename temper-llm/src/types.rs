//! Core types for generation requests and responses.

use serde::{Deserialize, Serialize};

/// Which model class a request needs.
///
/// Every provider maps the two tiers onto its own model names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Small, quick model. Used for mood classification.
    Fast,
    /// Larger model. Used for in-character replies.
    Quality,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Quality => write!(f, "quality"),
        }
    }
}

/// A request to a text generator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmRequest {
    /// System prompt (analyst role, or the character's instructions).
    pub system: String,
    /// User prompt (analysis task, or the conversation so far).
    pub user: String,
    /// Model tier to use.
    pub tier: ModelTier,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl LlmRequest {
    /// Timeout used until [`LlmRequest::with_timeout`] says otherwise.
    pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

    /// A mood classification request: fast tier, low temperature.
    #[must_use]
    pub fn classification(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            tier: ModelTier::Fast,
            max_tokens: 300,
            temperature: 0.3,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    /// An in-character reply request: quality tier.
    #[must_use]
    pub fn reply(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            tier: ModelTier::Quality,
            max_tokens: 500,
            temperature: 0.7,
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    /// Set the sampling parameters.
    #[must_use]
    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Replace whichever sampling parameters are given, keeping the rest.
    #[must_use]
    pub fn with_overrides(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        if let Some(max_tokens) = max_tokens {
            self.max_tokens = max_tokens;
        }
        self
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A response from a text generator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LlmResponse {
    /// The generated text. Untrusted.
    pub text: String,
    /// How many tokens were generated.
    pub tokens_generated: u32,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model produced the text.
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builders_pick_tiers() {
        let c = LlmRequest::classification("sys", "user");
        assert_eq!(c.tier, ModelTier::Fast);
        let r = LlmRequest::reply("sys", "user").with_sampling(0.9, 120).with_timeout(5_000);
        assert_eq!(r.tier, ModelTier::Quality);
        assert_eq!(r.max_tokens, 120);
        assert_eq!(r.timeout_ms, 5_000);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let r = LlmRequest::classification("sys", "user").with_overrides(None, Some(80));
        assert_eq!(r.max_tokens, 80);
        assert!((r.temperature - 0.3).abs() < f32::EPSILON);

        let r = LlmRequest::reply("sys", "user").with_overrides(Some(0.2), None);
        assert!((r.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(r.max_tokens, 500);
    }

    #[test]
    fn tier_wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&ModelTier::Quality).expect("json"), "\"quality\"");
        assert_eq!(ModelTier::Fast.to_string(), "fast");
    }
}

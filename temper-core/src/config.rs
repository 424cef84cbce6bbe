//! Configuration for the temper engine.
//!
//! Maps directly to `temper.toml`. Every field has a default, so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemperConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Text-generation providers, in priority order.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Mood classification and adjustment policy.
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Per-session behavior.
    #[serde(default)]
    pub session: SessionConfig,
}

impl TemperConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `TemperError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::TemperError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Backend kind of a provider entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Ollama's `/api/generate`.
    Ollama,
    /// Any OpenAI-compatible `/chat/completions` endpoint (Groq, OpenAI, ...).
    #[serde(alias = "openai_compatible", alias = "groq")]
    OpenAi,
    /// Always unavailable.
    None,
}

/// One text-generation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Label used in logs.
    #[serde(default = "default_provider_name")]
    pub name: String,
    /// Backend kind.
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderKind,
    /// Base URL. For OpenAI-compatible backends this includes the version
    /// segment, e.g. `https://api.groq.com/openai/v1`.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Environment variable holding the API key, if the backend needs one.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Model used for fast requests (classification).
    #[serde(default = "default_fast_model")]
    pub fast_model: String,
    /// Model used for quality requests (replies).
    #[serde(default = "default_quality_model")]
    pub quality_model: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            kind: default_provider_kind(),
            base_url: default_ollama_url(),
            api_key_env: None,
            fast_model: default_fast_model(),
            quality_model: default_quality_model(),
        }
    }
}

/// Text-generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Providers tried in this order; the first success wins.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
    /// Hard timeout for a single HTTP request in milliseconds.
    #[serde(default = "default_30000")]
    pub request_timeout_ms: u64,
    /// Retries per provider before moving on to the next one.
    #[serde(default = "default_1")]
    pub max_retries: u32,
    /// Overrides the classification template's temperature.
    #[serde(default)]
    pub classification_temperature: Option<f32>,
    /// Overrides the classification template's token cap.
    #[serde(default)]
    pub classification_max_tokens: Option<u32>,
    /// Overrides the reply template's temperature.
    #[serde(default)]
    pub reply_temperature: Option<f32>,
    /// Overrides the reply template's token cap.
    #[serde(default)]
    pub reply_max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            request_timeout_ms: 30_000,
            max_retries: 1,
            classification_temperature: None,
            classification_max_tokens: None,
            reply_temperature: None,
            reply_max_tokens: None,
        }
    }
}

/// Mood classification policy. All thresholds are tunable heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Number of trailing history entries shown to the classifier.
    #[serde(default = "default_6_usize")]
    pub history_window: usize,
    /// Biography characters included in the classification prompt.
    #[serde(default = "default_300_usize")]
    pub biography_excerpt_chars: usize,
    /// Scenario characters included in the classification prompt.
    #[serde(default = "default_400_usize")]
    pub scenario_excerpt_chars: usize,
    /// Personality traits included in the classification prompt.
    #[serde(default = "default_5_usize")]
    pub max_traits: usize,
    /// Intensity added to negative moods of aggressive characters.
    #[serde(default = "default_0_1")]
    pub aggressive_boost: f32,
    /// Intensity removed from empathetic characters facing vulnerability.
    #[serde(default = "default_0_15")]
    pub empathetic_reduction: f32,
    /// A positive reversal above this intensity counts as implausible.
    #[serde(default = "default_0_7")]
    pub reversal_threshold: f32,
    /// Intensity an implausible reversal is capped to.
    #[serde(default = "default_0_6")]
    pub reversal_cap: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            history_window: 6,
            biography_excerpt_chars: 300,
            scenario_excerpt_chars: 400,
            max_traits: 5,
            aggressive_boost: 0.1,
            empathetic_reduction: 0.15,
            reversal_threshold: 0.7,
            reversal_cap: 0.6,
        }
    }
}

/// Per-session behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Intensity every character starts a scenario with.
    #[serde(default = "default_0_3")]
    pub initial_intensity: f32,
    /// Budget for one character's whole turn in milliseconds.
    #[serde(default = "default_45000")]
    pub turn_timeout_ms: u64,
    /// Reply used when every provider fails.
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
    /// Shared history entries kept per session; older ones are dropped.
    #[serde(default = "default_200_usize")]
    pub history_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_intensity: 0.3,
            turn_timeout_ms: 45_000,
            fallback_reply: default_fallback_reply(),
            history_limit: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "info".to_string() }
fn default_provider_name() -> String { "local".to_string() }
fn default_provider_kind() -> ProviderKind { ProviderKind::Ollama }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_fast_model() -> String { "openai/gpt-oss-20b".to_string() }
fn default_quality_model() -> String { "openai/gpt-oss-120b".to_string() }
fn default_fallback_reply() -> String {
    "I'm having trouble responding right now. Could you say that again?".to_string()
}
fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "groq".to_string(),
            kind: ProviderKind::OpenAi,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: Some("GROQ_API_KEY".to_string()),
            fast_model: default_fast_model(),
            quality_model: default_quality_model(),
        },
        ProviderConfig {
            name: "local".to_string(),
            kind: ProviderKind::Ollama,
            base_url: default_ollama_url(),
            api_key_env: None,
            fast_model: "qwen2.5:1.5b".to_string(),
            quality_model: "mistral:7b-instruct".to_string(),
        },
    ]
}
fn default_0_1() -> f32 { 0.1 }
fn default_0_15() -> f32 { 0.15 }
fn default_0_3() -> f32 { 0.3 }
fn default_0_6() -> f32 { 0.6 }
fn default_0_7() -> f32 { 0.7 }
fn default_1() -> u32 { 1 }
fn default_5_usize() -> usize { 5 }
fn default_6_usize() -> usize { 6 }
fn default_200_usize() -> usize { 200 }
fn default_300_usize() -> usize { 300 }
fn default_400_usize() -> usize { 400 }
fn default_30000() -> u64 { 30_000 }
fn default_45000() -> u64 { 45_000 }

//! HTTP client for Ollama and OpenAI-compatible (Groq, OpenAI, ...) backends.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::generator::TextGenerator;
use crate::types::{LlmRequest, LlmResponse, ModelTier};

/// Provider backend for inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// Server root, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible {
        /// API root including the version segment, e.g.
        /// `https://api.groq.com/openai/v1`.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// No backend. Every call fails with [`LlmError::Unavailable`].
    None,
}

/// Text and token count pulled out of a provider response.
struct Completion {
    text: String,
    tokens_generated: u32,
}

/// A named client bound to one provider and its two tier models.
pub struct LlmClient {
    name: String,
    provider: LlmProvider,
    http: Client,
    fast_model: String,
    quality_model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new client.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        provider: LlmProvider,
        fast_model: impl Into<String>,
        quality_model: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            http: Client::new(),
            fast_model: fast_model.into(),
            quality_model: quality_model.into(),
            max_retries,
        }
    }

    /// Create a client with no backend.
    #[must_use]
    pub fn none() -> Self {
        Self::new("none", LlmProvider::None, "", "", 0)
    }

    /// Check if the client has a backend configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// The model name used for a tier.
    #[must_use]
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Quality => &self.quality_model,
        }
    }

    /// Use a preconfigured HTTP client (proxy settings, TLS roots).
    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    async fn generate_ollama(&self, base_url: &str, request: &LlmRequest) -> Result<Completion, LlmError> {
        let model = self.model_for(request.tier);
        let url = format!("{}/api/generate", base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "prompt": format!("{}\n\n{}", request.system, request.user),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });

        let json = self
            .send_with_retries(request, || self.http.post(&url).json(&body))
            .await?;

        Ok(Completion {
            text: completion_text(&json, "/response")?,
            tokens_generated: token_count(&json["eval_count"]),
        })
    }

    async fn generate_openai(
        &self,
        base_url: &str,
        api_key: &str,
        request: &LlmRequest,
    ) -> Result<Completion, LlmError> {
        let model = self.model_for(request.tier);
        let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        let body = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let json = self
            .send_with_retries(request, || {
                self.http
                    .post(&url)
                    .header("Authorization", format!("Bearer {api_key}"))
                    .json(&body)
            })
            .await?;

        Ok(Completion {
            text: completion_text(&json, "/choices/0/message/content")?,
            tokens_generated: token_count(&json["usage"]["completion_tokens"]),
        })
    }

    /// Send the request built by `build`, retrying up to `max_retries` times
    /// on transport errors and non-success statuses.
    async fn send_with_retries<F>(&self, request: &LlmRequest, build: F) -> Result<Value, LlmError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error = LlmError::Unavailable("no attempt made".into());
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(
                    provider = %self.name,
                    "Retrying LLM call (attempt {}/{})",
                    attempt + 1,
                    self.max_retries + 1
                );
            }

            let result = build()
                .timeout(Duration::from_millis(request.timeout_ms))
                .send()
                .await;

            last_error = match result {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json::<Value>()
                        .await
                        .map_err(|e| LlmError::ParseError(e.to_string()));
                }
                Ok(resp) => {
                    let status = resp.status();
                    LlmError::RequestFailed(format!(
                        "HTTP {status}: {}",
                        resp.text().await.unwrap_or_default()
                    ))
                }
                Err(e) if e.is_timeout() => LlmError::Timeout(request.timeout_ms),
                Err(e) if e.is_connect() => LlmError::Unavailable(e.to_string()),
                Err(e) => LlmError::RequestFailed(e.to_string()),
            };
            warn!(provider = %self.name, attempt = attempt + 1, "{last_error}");
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last_error: last_error.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = Instant::now();
        let completion = match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable("No LLM provider configured".into())),
            LlmProvider::Ollama { base_url } => self.generate_ollama(base_url, request).await,
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.generate_openai(base_url, api_key, request).await
            }
        }?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let model = self.model_for(request.tier).to_string();
        debug!(
            provider = %self.name,
            model = %model,
            tier = %request.tier,
            latency_ms,
            "generation complete"
        );
        Ok(LlmResponse {
            text: completion.text,
            tokens_generated: completion.tokens_generated,
            latency_ms,
            model,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The generated text at `pointer`. A missing, non-string or blank value is
/// a parse error so a fallback chain moves on to its next provider.
fn completion_text(json: &Value, pointer: &str) -> Result<String, LlmError> {
    match json.pointer(pointer).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(LlmError::ParseError(format!("empty completion at {pointer}"))),
        None => Err(LlmError::ParseError(format!("no completion text at {pointer}"))),
    }
}

fn token_count(value: &Value) -> u32 {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

//! The generation capability and its priority-ordered fallback chain.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Anything that turns a request into (untrusted) text.
///
/// Implementations may fail with any [`LlmError`]; callers decide how to
/// degrade.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for one request.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        (**self).generate(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Providers tried one at a time in priority order.
///
/// The next provider is only called after the previous one has failed; no
/// two calls are ever in flight at once. The first success wins.
pub struct FallbackChain {
    providers: Vec<Box<dyn TextGenerator>>,
}

impl FallbackChain {
    /// Build a chain. The first provider has the highest priority.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn TextGenerator>>) -> Self {
        Self { providers }
    }

    /// Number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in priority order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.name())
    }
}

#[async_trait]
impl TextGenerator for FallbackChain {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut last_error = String::from("no providers configured");
        for provider in &self.providers {
            match provider.generate(request).await {
                Ok(response) => {
                    debug!(provider = provider.name(), "provider succeeded");
                    return Ok(response);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                    last_error = e.to_string();
                }
            }
        }

        Err(LlmError::AllProvidersFailed {
            providers: self.providers.len(),
            last_error,
        })
    }

    fn name(&self) -> &str {
        "fallback-chain"
    }
}

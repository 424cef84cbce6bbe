//! Build the provider fallback chain from `[llm]` configuration.

use temper_core::ProviderKind;
use temper_core::config::{LlmConfig, ProviderConfig};
use temper_llm::{FallbackChain, LlmClient, LlmProvider, TextGenerator};
use tracing::{info, warn};

/// One client per usable provider, in configured priority order.
///
/// Providers of kind `none` are skipped, as are OpenAI-compatible providers
/// whose API key variable is unset. The result may be empty, in which case
/// every generation fails and sessions degrade to their fallbacks.
#[must_use]
pub fn build_chain(config: &LlmConfig) -> FallbackChain {
    build_chain_with(config, |var| std::env::var(var).ok())
}

/// [`build_chain`] with an explicit secret lookup.
pub fn build_chain_with(config: &LlmConfig, lookup: impl Fn(&str) -> Option<String>) -> FallbackChain {
    let providers: Vec<Box<dyn TextGenerator>> = config
        .providers
        .iter()
        .filter_map(|p| client_for(p, config.max_retries, &lookup))
        .map(|c| Box::new(c) as Box<dyn TextGenerator>)
        .collect();

    let chain = FallbackChain::new(providers);
    info!(providers = ?chain.names().collect::<Vec<_>>(), "provider chain ready");
    chain
}

fn client_for(
    provider: &ProviderConfig,
    max_retries: u32,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Option<LlmClient> {
    let backend = match provider.kind {
        ProviderKind::None => return None,
        ProviderKind::Ollama => LlmProvider::Ollama {
            base_url: provider.base_url.clone(),
        },
        ProviderKind::OpenAi => {
            let api_key = provider.api_key_env.as_deref().and_then(lookup);
            let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
                warn!(
                    provider = %provider.name,
                    env = provider.api_key_env.as_deref().unwrap_or("<unset>"),
                    "API key missing, skipping provider"
                );
                return None;
            };
            LlmProvider::OpenAiCompatible {
                base_url: provider.base_url.clone(),
                api_key,
            }
        }
    };

    Some(LlmClient::new(
        provider.name.clone(),
        backend,
        provider.fast_model.clone(),
        provider.quality_model.clone(),
        max_retries,
    ))
}

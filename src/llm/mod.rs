//! Completion providers and the multi-provider aggregator.
//!
//! The primary provider carries conversational context; secondary providers
//! are stateless and receive a single translated prompt.

mod aggregator;
mod cohere;
mod huggingface;
mod openai_compatible;
mod provider;

pub use aggregator::{Aggregator, NO_PROVIDER_MESSAGE};
pub use cohere::CohereProvider;
pub use huggingface::HuggingFaceProvider;
pub use openai_compatible::OpenAiCompatibleProvider;
pub use provider::{ChatMessage, CompletionProvider, CompletionRequest, Role};

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::translate::Translator;

/// Build the aggregator from config: an OpenAI-compatible primary plus any
/// secondaries whose API keys are configured.
pub fn create_aggregator(
    config: &LlmConfig,
    translator: Option<Arc<dyn Translator>>,
    source_lang: &str,
    target_lang: &str,
) -> Aggregator {
    let primary = Arc::new(OpenAiCompatibleProvider::new(config.primary.clone()));
    let mut aggregator = Aggregator::new(primary, config.provider_timeout);

    if let Some(cohere) = &config.cohere {
        tracing::info!("Cohere secondary provider enabled");
        aggregator = aggregator.with_secondary(Arc::new(CohereProvider::new(cohere.clone())));
    }
    if let Some(hf) = &config.huggingface {
        tracing::info!("Hugging Face secondary provider enabled");
        aggregator = aggregator.with_secondary(Arc::new(HuggingFaceProvider::new(hf.clone())));
    }
    if let Some(translator) = translator {
        aggregator = aggregator.with_translator(translator, source_lang, target_lang);
    }

    aggregator
}

//! Multi-provider fan-out.
//!
//! Queries every configured provider for the same prompt and merges the
//! successful answers into one labeled block. Best-effort by contract: a
//! failing provider is omitted, never propagated, so one rate-limited or
//! unauthenticated backend can't take down the whole answer.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionProvider, CompletionRequest};
use crate::translate::Translator;

/// Returned when every provider failed or timed out.
pub const NO_PROVIDER_MESSAGE: &str =
    "No provider could answer right now (all failed or hit their limits).";

/// Fans one prompt out to the primary provider (with conversational context)
/// and any stateless secondaries (with a translated prompt).
pub struct Aggregator {
    primary: Arc<dyn CompletionProvider>,
    secondaries: Vec<Arc<dyn CompletionProvider>>,
    translator: Option<Arc<dyn Translator>>,
    source_lang: String,
    target_lang: String,
    provider_timeout: Duration,
}

impl Aggregator {
    pub fn new(primary: Arc<dyn CompletionProvider>, provider_timeout: Duration) -> Self {
        Self {
            primary,
            secondaries: Vec::new(),
            translator: None,
            source_lang: "pt".to_string(),
            target_lang: "en".to_string(),
            provider_timeout,
        }
    }

    /// Add a stateless secondary provider. Output ordering follows the order
    /// providers were added.
    pub fn with_secondary(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.secondaries.push(provider);
        self
    }

    /// Set the translator used to transform prompts for secondary providers.
    pub fn with_translator(
        mut self,
        translator: Arc<dyn Translator>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        self.translator = Some(translator);
        self.source_lang = source_lang.into();
        self.target_lang = target_lang.into();
        self
    }

    /// Replace the primary provider (the `model` command rebuilds it).
    pub fn set_primary(&mut self, provider: Arc<dyn CompletionProvider>) {
        self.primary = provider;
    }

    /// Ask only the primary provider, with the full assembled context.
    pub async fn query_primary(&self, context: Vec<ChatMessage>) -> Result<String, LlmError> {
        self.primary.complete(CompletionRequest::new(context)).await
    }

    /// Query every provider and merge the successful answers.
    ///
    /// `context` is the full message list for the primary (prior turns plus
    /// the new prompt); `prompt` is the bare prompt for the secondaries.
    /// Calls run concurrently, each under its own timeout, but output order
    /// is fixed: primary first, then secondaries in configured order.
    pub async fn query_all(&self, prompt: &str, context: Vec<ChatMessage>) -> String {
        // Translation is best-effort and shared by all secondaries.
        let secondary_prompt = self.translate_or_original(prompt).await;

        let primary_fut = self.call_provider(&self.primary, CompletionRequest::new(context));
        let secondary_futs = self
            .secondaries
            .iter()
            .map(|p| self.call_provider(p, CompletionRequest::from_prompt(&secondary_prompt)));

        let (primary_result, secondary_results) =
            tokio::join!(primary_fut, join_all(secondary_futs));

        let mut answers = Vec::new();
        if let Some(text) = primary_result {
            answers.push(format!("[{}]\n{}", self.primary.name(), text));
        }
        for (provider, result) in self.secondaries.iter().zip(secondary_results) {
            if let Some(text) = result {
                answers.push(format!("[{}]\n{}", provider.name(), text));
            }
        }

        if answers.is_empty() {
            NO_PROVIDER_MESSAGE.to_string()
        } else {
            answers.join("\n\n")
        }
    }

    /// One isolated provider call: any error or timeout becomes an omission.
    async fn call_provider(
        &self,
        provider: &Arc<dyn CompletionProvider>,
        req: CompletionRequest,
    ) -> Option<String> {
        match tokio::time::timeout(self.provider_timeout, provider.complete(req)).await {
            Ok(Ok(text)) if !text.is_empty() => Some(text),
            Ok(Ok(_)) => {
                tracing::warn!("provider {} returned empty output, omitting", provider.name());
                None
            }
            Ok(Err(e)) => {
                tracing::warn!("provider {} omitted: {}", e.provider(), e);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "provider {} timed out after {:?}, omitting",
                    provider.name(),
                    self.provider_timeout
                );
                None
            }
        }
    }

    async fn translate_or_original(&self, prompt: &str) -> String {
        let Some(translator) = &self.translator else {
            return prompt.to_string();
        };
        match translator
            .translate(prompt, &self.source_lang, &self.target_lang)
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                tracing::warn!("translation failed, using original prompt: {}", e);
                prompt.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::error::TranslationError;

    struct FixedProvider {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn complete(&self, _req: CompletionRequest) -> Result<String, LlmError> {
            Ok(self.reply.to_string())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct FailingProvider {
        name: &'static str,
    }

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        async fn complete(&self, _req: CompletionRequest) -> Result<String, LlmError> {
            Err(LlmError::QuotaExceeded {
                provider: self.name.to_string(),
            })
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(
            &self,
            _text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, TranslationError> {
            Err(TranslationError::RequestFailed("down".to_string()))
        }
    }

    struct UppercaseTranslator;

    #[async_trait]
    impl Translator for UppercaseTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, TranslationError> {
            Ok(text.to_uppercase())
        }
    }

    struct EchoProvider {
        name: &'static str,
    }

    #[async_trait]
    impl CompletionProvider for EchoProvider {
        async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
            Ok(req.messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn timeout() -> Duration {
        Duration::from_secs(5)
    }

    #[tokio::test]
    async fn middle_provider_failure_is_omitted_order_preserved() {
        let agg = Aggregator::new(
            Arc::new(FixedProvider {
                name: "alpha",
                reply: "first answer",
            }),
            timeout(),
        )
        .with_secondary(Arc::new(FailingProvider { name: "beta" }))
        .with_secondary(Arc::new(FixedProvider {
            name: "gamma",
            reply: "third answer",
        }));

        let out = agg.query_all("question", vec![ChatMessage::user("question")]).await;

        assert!(out.contains("[alpha]\nfirst answer"));
        assert!(out.contains("[gamma]\nthird answer"));
        assert!(!out.contains("beta"));
        let alpha_pos = out.find("[alpha]").unwrap();
        let gamma_pos = out.find("[gamma]").unwrap();
        assert!(alpha_pos < gamma_pos);
    }

    #[tokio::test]
    async fn all_providers_failing_returns_fixed_message() {
        let agg = Aggregator::new(Arc::new(FailingProvider { name: "alpha" }), timeout())
            .with_secondary(Arc::new(FailingProvider { name: "beta" }));

        let out = agg.query_all("question", vec![ChatMessage::user("question")]).await;
        assert_eq!(out, NO_PROVIDER_MESSAGE);
    }

    #[tokio::test]
    async fn translation_failure_falls_back_to_original_prompt() {
        let agg = Aggregator::new(
            Arc::new(FailingProvider { name: "alpha" }),
            timeout(),
        )
        .with_secondary(Arc::new(EchoProvider { name: "echo" }))
        .with_translator(Arc::new(FailingTranslator), "pt", "en");

        let out = agg.query_all("pergunta", vec![ChatMessage::user("pergunta")]).await;
        assert_eq!(out, "[echo]\npergunta");
    }

    #[tokio::test]
    async fn secondaries_receive_translated_prompt() {
        let agg = Aggregator::new(
            Arc::new(FailingProvider { name: "alpha" }),
            timeout(),
        )
        .with_secondary(Arc::new(EchoProvider { name: "echo" }))
        .with_translator(Arc::new(UppercaseTranslator), "pt", "en");

        let out = agg.query_all("pergunta", vec![ChatMessage::user("pergunta")]).await;
        assert_eq!(out, "[echo]\nPERGUNTA");
    }

    #[tokio::test]
    async fn slow_provider_is_timed_out_and_omitted() {
        struct SlowProvider;

        #[async_trait]
        impl CompletionProvider for SlowProvider {
            async fn complete(&self, _req: CompletionRequest) -> Result<String, LlmError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("too late".to_string())
            }

            fn name(&self) -> &str {
                "slow"
            }
        }

        let agg = Aggregator::new(
            Arc::new(FixedProvider {
                name: "fast",
                reply: "on time",
            }),
            Duration::from_millis(50),
        )
        .with_secondary(Arc::new(SlowProvider));

        let out = agg.query_all("q", vec![ChatMessage::user("q")]).await;
        assert_eq!(out, "[fast]\non time");
    }
}

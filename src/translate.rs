//! Translation capability.
//!
//! Secondary providers expect prompts in a fixed language (English by
//! default), so the aggregator translates before calling them. Translation is
//! strictly best-effort: any failure falls back to the original text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::TranslateConfig;
use crate::error::TranslationError;

/// Text translation between two languages.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;
}

/// HTTP translator against a LibreTranslate-compatible endpoint
/// (POST /translate with q/source/target).
pub struct HttpTranslator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Build from config. None when no endpoint is configured.
    pub fn from_config(config: &TranslateConfig) -> Option<Self> {
        config
            .base_url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.api_key().map(str::to_string)))
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate", self.base_url.trim_end_matches('/'));
        let body = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            api_key: self.api_key.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranslationError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(TranslationError::RequestFailed(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        let parsed: TranslateResponse = serde_json::from_str(&text)
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;
        Ok(parsed.translated_text)
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

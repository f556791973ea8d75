//! Cohere generate API provider.
//!
//! Stateless secondary provider: takes a single prompt, no conversational
//! context. Prompts are expected in English, so the aggregator translates
//! before calling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CohereConfig;
use crate::error::LlmError;
use crate::llm::provider::{CompletionProvider, CompletionRequest};

const PROVIDER_NAME: &str = "cohere";
const MAX_TOKENS: u32 = 300;

pub struct CohereProvider {
    client: Client,
    config: CohereConfig,
}

impl CohereProvider {
    pub fn new(config: CohereConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn api_url(&self) -> String {
        format!("{}/v1/generate", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for CohereProvider {
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
        // Stateless: flatten the message list into one prompt.
        let prompt = req
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let body = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.api_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LlmError::AuthFailed {
                    provider: PROVIDER_NAME.to_string(),
                });
            }
            if status.as_u16() == 429 {
                return Err(LlmError::QuotaExceeded {
                    provider: PROVIDER_NAME.to_string(),
                });
            }
            return Err(LlmError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("HTTP {}: {}", status, text),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::InvalidResponse {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("JSON parse error: {}", e),
            })?;

        let generation = parsed.generations.into_iter().next().ok_or_else(|| {
            LlmError::InvalidResponse {
                provider: PROVIDER_NAME.to_string(),
                reason: "No generations in response".to_string(),
            }
        })?;

        Ok(generation.text.trim().to_string())
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
struct Generation {
    text: String,
}

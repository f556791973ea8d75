//! Hugging Face inference API provider.
//!
//! Stateless secondary provider. The inference API returns either a list of
//! `{generated_text}` objects or an `{error}` object depending on the model
//! and its load state, so the response is parsed as a generic JSON value.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::HuggingFaceConfig;
use crate::error::LlmError;
use crate::llm::provider::{CompletionProvider, CompletionRequest};

const PROVIDER_NAME: &str = "huggingface";

pub struct HuggingFaceProvider {
    client: Client,
    config: HuggingFaceConfig,
}

impl HuggingFaceProvider {
    pub fn new(config: HuggingFaceConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }
}

#[async_trait]
impl CompletionProvider for HuggingFaceProvider {
    async fn complete(&self, req: CompletionRequest) -> Result<String, LlmError> {
        let prompt = req
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let body = InferenceRequest { inputs: prompt };

        let response = self
            .client
            .post(&self.config.model_url)
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
            if status.as_u16() == 401 {
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

        let value: Value = serde_json::from_str(&text).map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER_NAME.to_string(),
            reason: format!("JSON parse error: {}", e),
        })?;

        // List shape: [{"generated_text": "..."}]
        if let Some(generated) = value
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|item| item.get("generated_text"))
            .and_then(Value::as_str)
        {
            return Ok(generated.trim().to_string());
        }

        // Object shape: {"error": "..."} (model loading, bad input, etc.)
        if let Some(err) = value.get("error").and_then(Value::as_str) {
            return Err(LlmError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: err.to_string(),
            });
        }

        Err(LlmError::InvalidResponse {
            provider: PROVIDER_NAME.to_string(),
            reason: format!("unrecognized response shape: {}", value),
        })
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest {
    inputs: String,
}

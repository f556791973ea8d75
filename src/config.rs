//! Configuration for mentor.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Main configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub context: ContextConfig,
    pub translate: TranslateConfig,
    pub lint: LintConfig,
}

impl Config {
    /// Load configuration from environment variables (`.env` honored if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            context: ContextConfig::from_env()?,
            translate: TranslateConfig::from_env()?,
            lint: LintConfig::from_env()?,
        })
    }
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite path or `sqlite://` URL. Empty or `:memory:` means in-memory.
    pub url: String,
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = optional_env("MENTOR_DB")?.unwrap_or_else(default_db_path);
        Ok(Self { url })
    }

    /// Build a config pointing at an explicit path or URL (tests, `--db` flag).
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Get the default database path (~/.mentor/history.db).
fn default_db_path() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mentor")
        .join("history.db")
        .to_string_lossy()
        .into_owned()
}

/// Completion provider configuration.
///
/// The primary provider is any OpenAI-compatible chat-completions endpoint.
/// Secondary providers (Cohere, Hugging Face) are stateless and optional:
/// each is enabled only when its API key is set.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub primary: OpenAiCompatibleConfig,
    pub cohere: Option<CohereConfig>,
    pub huggingface: Option<HuggingFaceConfig>,
    /// Per-provider timeout for aggregate (fan-out) calls.
    pub provider_timeout: Duration,
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let primary = OpenAiCompatibleConfig::from_env()?;

        let cohere = optional_env("COHERE_API_KEY")?.map(|key| CohereConfig {
            api_key: SecretString::from(key),
            base_url: std::env::var("COHERE_BASE_URL")
                .unwrap_or_else(|_| "https://api.cohere.com".to_string()),
            model: std::env::var("COHERE_MODEL").unwrap_or_else(|_| "command".to_string()),
        });

        let huggingface = optional_env("HF_API_KEY")?.map(|key| HuggingFaceConfig {
            api_key: SecretString::from(key),
            model_url: std::env::var("HF_MODEL_URL").unwrap_or_else(|_| {
                "https://api-inference.huggingface.co/models/bigscience/bloomz-560m".to_string()
            }),
        });

        let provider_timeout =
            Duration::from_secs(parse_optional_env("MENTOR_PROVIDER_TIMEOUT_SECS", 60_u64)?);

        Ok(Self {
            primary,
            cohere,
            huggingface,
            provider_timeout,
        })
    }
}

/// OpenAI-compatible chat-completions endpoint configuration.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL (e.g. "https://api.openai.com").
    pub base_url: String,
    /// Model name (e.g. "gpt-4o-mini").
    pub model: String,
    /// API key. Optional for local servers.
    pub api_key: Option<SecretString>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl OpenAiCompatibleConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: optional_env("OPENAI_BASE_URL")?
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model: optional_env("OPENAI_MODEL")?.unwrap_or_else(|| "gpt-4o-mini".to_string()),
            api_key: optional_env("OPENAI_API_KEY")?.map(SecretString::from),
            temperature: parse_optional_env("OPENAI_TEMPERATURE", 0.7_f32)?,
            max_tokens: parse_optional_env("OPENAI_MAX_TOKENS", 1500_u32)?,
        })
    }

    /// Get the API key if configured (exposes the secret).
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }
}

/// Cohere generate API configuration.
#[derive(Debug, Clone)]
pub struct CohereConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
}

impl CohereConfig {
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Hugging Face inference API configuration.
#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: SecretString,
    /// Full model inference URL.
    pub model_url: String,
}

impl HuggingFaceConfig {
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Context window configuration.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Number of prior interactions replayed to the primary provider.
    pub window_size: usize,
    /// Character budget for the rendered context. Oldest pairs are dropped
    /// first until the window fits.
    pub max_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            max_chars: 24_000,
        }
    }
}

impl ContextConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            window_size: parse_optional_env("MENTOR_CONTEXT_WINDOW", defaults.window_size)?,
            max_chars: parse_optional_env("MENTOR_CONTEXT_MAX_CHARS", defaults.max_chars)?,
        })
    }
}

/// Translation service configuration (LibreTranslate-compatible endpoint).
///
/// Secondary providers expect English prompts; the user-facing language is
/// configurable. Translation is best-effort: if the endpoint is unset or
/// failing, the untranslated prompt is used.
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    /// Endpoint base URL (e.g. "https://libretranslate.com"). None disables translation.
    pub base_url: Option<String>,
    /// Optional API key.
    pub api_key: Option<SecretString>,
    /// Source language of user prompts.
    pub source_lang: String,
    /// Target language expected by secondary providers.
    pub target_lang: String,
}

impl TranslateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: optional_env("TRANSLATE_BASE_URL")?,
            api_key: optional_env("TRANSLATE_API_KEY")?.map(SecretString::from),
            source_lang: optional_env("TRANSLATE_SOURCE_LANG")?.unwrap_or_else(|| "pt".to_string()),
            target_lang: optional_env("TRANSLATE_TARGET_LANG")?.unwrap_or_else(|| "en".to_string()),
        })
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|k| k.expose_secret())
    }
}

/// Static-analysis configuration.
#[derive(Debug, Clone)]
pub struct LintConfig {
    /// Linter commands to run over a submitted snippet. Each entry is a
    /// program name; the temp file path is appended as the last argument.
    pub linters: Vec<String>,
    /// Per-linter timeout.
    pub timeout: Duration,
}

impl LintConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let linters = optional_env("MENTOR_LINTERS")?
            .map(|s| {
                s.split(',')
                    .map(|l| l.trim().to_string())
                    .filter(|l| !l.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "flake8".to_string(),
                    "pylint".to_string(),
                    "mypy".to_string(),
                ]
            });

        Ok(Self {
            linters,
            timeout: Duration::from_secs(parse_optional_env("MENTOR_LINT_TIMEOUT_SECS", 30_u64)?),
        })
    }
}

// Helper functions

fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::ParseError(format!(
            "failed to read {key}: {e}"
        ))),
    }
}

fn parse_optional_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)?
        .map(|s| {
            s.parse().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{e}"),
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_defaults() {
        let c = ContextConfig::default();
        assert_eq!(c.window_size, 5);
        assert_eq!(c.max_chars, 24_000);
    }

    #[test]
    fn database_with_url() {
        let c = DatabaseConfig::with_url("sqlite://");
        assert_eq!(c.url, "sqlite://");
    }
}

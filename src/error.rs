//! Error types for mentor.

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to read environment: {0}")]
    ParseError(String),
}

/// Database errors. Fatal to the command in progress, never to the session loop.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database pool error: {0}")]
    Pool(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Completion provider errors.
///
/// All variants are non-fatal at the aggregator boundary: a failing provider
/// is omitted from the combined answer, never surfaced to the session loop.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider}: quota exhausted")]
    QuotaExceeded { provider: String },

    #[error("{provider}: rate limited")]
    RateLimited { provider: String },

    #[error("{provider}: authentication failed")]
    AuthFailed { provider: String },

    #[error("{provider}: request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("{provider}: invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl LlmError {
    /// Provider name this error originated from.
    pub fn provider(&self) -> &str {
        match self {
            LlmError::QuotaExceeded { provider }
            | LlmError::RateLimited { provider }
            | LlmError::AuthFailed { provider }
            | LlmError::RequestFailed { provider, .. }
            | LlmError::InvalidResponse { provider, .. } => provider,
        }
    }
}

/// Translation errors. Non-fatal: callers fall back to the untranslated text.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    RequestFailed(String),

    #[error("invalid translation response: {0}")]
    InvalidResponse(String),
}

/// Export errors (plain-text and notebook export).
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

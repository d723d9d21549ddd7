//! Error types for the AI and remote question bank adapters.
//!
//! Everything that can go wrong talking to the chat completions API or the
//! `PostgREST` endpoint surfaces as an [`AiError`]. At the collaborator
//! boundary these collapse into [`CollabError`] for the session.

use vetlogic_core::CollabError;

/// Errors raised by the HTTP adapters.
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// The request could not be sent or the connection failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The request exceeded its deadline.
    #[error("request timed out after {ms} ms")]
    Timeout {
        /// The deadline that elapsed.
        ms: u64,
    },

    /// The API key was rejected (HTTP 401).
    #[error("API key is invalid or expired")]
    Unauthorized,

    /// Balance exhausted or rate limited (HTTP 402 or 429).
    #[error("API balance exhausted or too many requests")]
    QuotaExceeded,

    /// Any other non-success status.
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// Failed to render a prompt template.
    #[error("template error: {0}")]
    Template(String),

    /// The response could not be turned into the expected shape.
    #[error("response parse error: {0}")]
    Parse(String),

    /// A required setting is missing.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            402 | 429 => Self::QuotaExceeded,
            _ => Self::Status { status, body },
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<minijinja::Error> for AiError {
    fn from(e: minijinja::Error) -> Self {
        Self::Template(e.to_string())
    }
}

impl From<AiError> for CollabError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::Timeout { ms } => Self::Timeout { ms },
            AiError::Unauthorized => Self::Unauthorized,
            AiError::QuotaExceeded => Self::QuotaExceeded,
            AiError::NotConfigured(what) => Self::NotConfigured(what),
            AiError::Parse(msg) => Self::InvalidResponse(msg),
            AiError::Serde(err) => Self::InvalidResponse(err.to_string()),
            other @ (AiError::Http(_) | AiError::Status { .. } | AiError::Template(_)) => {
                Self::Upstream(other.to_string())
            }
        }
    }
}

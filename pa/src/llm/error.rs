//! LLM error types

use thiserror::Error;

/// Errors that can occur during a single provider call
///
/// None of these are retried. The REPL reports them and waits for the next
/// input; at startup they are wrapped in a `ConfigurationError` instead.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited by provider")]
    RateLimited,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response blocked: {0}")]
    Blocked(String),
}

impl LlmError {
    /// Check if this error means the credential was rejected
    pub fn is_auth_error(&self) -> bool {
        match self {
            LlmError::ApiError { status: 401 | 403, .. } => true,
            LlmError::ApiError { status: 400, message } => {
                message.contains("API key") || message.contains("API_KEY_INVALID")
            }
            _ => false,
        }
    }

    /// Check if this error means the model does not exist or is not served to this key
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, LlmError::ApiError { status: 404, .. })
    }

    /// One-line follow-up shown to the user under the error itself
    pub fn hint(&self) -> &'static str {
        match self {
            LlmError::RateLimited => "The provider quota is exhausted for now. Wait a moment before sending another message.",
            LlmError::Network(_) => "Check your network connection, then send your message again.",
            LlmError::Blocked(_) => "The provider declined to answer. Try rephrasing your message.",
            _ if self.is_auth_error() => "Your API key was rejected. Check the key and restart the agent.",
            _ if self.is_model_unavailable() => "The model is not available for your key/region.",
            _ => "Please check your API key and ensure the model is available.",
        }
    }
}

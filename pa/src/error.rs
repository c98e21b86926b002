//! Startup error types

use thiserror::Error;

use crate::llm::LlmError;

/// Fatal errors raised before the first turn
///
/// Any of these ends the process; per-turn provider failures are `LlmError`
/// and never reach this type.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("No API key provided (checked ${env_var} and the interactive prompt)")]
    MissingCredential { env_var: String },

    #[error("Could not start the agent: {0}")]
    Client(#[source] LlmError),

    #[error("Could not start the agent with model {model}: {source}")]
    ModelUnavailable {
        model: String,
        #[source]
        source: LlmError,
    },
}

impl ConfigurationError {
    /// Follow-up line printed under the error
    pub fn hint(&self) -> String {
        match self {
            ConfigurationError::MissingCredential { env_var } => {
                format!("Set {env_var} or enter a key when prompted. Exiting.")
            }
            ConfigurationError::Client(_) | ConfigurationError::ModelUnavailable { .. } => {
                "Please ensure your API key is correct and the model is available for your key/region.".to_string()
            }
        }
    }
}

//! LLM Client module for prdagent
//!
//! Provides the provider-agnostic client trait, request/response types and
//! the Gemini implementation.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::{ApiKey, LlmConfig};

/// Create the LLM client for the agent's fixed model
pub fn create_client(config: &LlmConfig, api_key: ApiKey) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(model = %crate::MODEL, "create_client: called");
    Ok(Arc::new(GeminiClient::from_config(config, api_key, crate::MODEL)?))
}

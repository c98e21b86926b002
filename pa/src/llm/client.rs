//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call carries the whole conversation
///
/// Conversation state lives in `ChatSession`; the client only turns one
/// request into one provider round-trip.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Model identifier this client is bound to
    fn model(&self) -> &str;

    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Confirm the model is reachable with the configured credential
    async fn check_model(&self) -> Result<(), LlmError>;
}

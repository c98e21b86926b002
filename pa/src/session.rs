//! Conversation session
//!
//! A `ChatSession` is the conversation handle: one client (and so one model),
//! one system instruction, and the alternating user/assistant history.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, StopReason, TokenUsage};

/// Default response budget
pub const DEFAULT_MAX_TOKENS: u32 = 8192;

/// One reply from the agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub text: String,
    /// The provider cut the reply off at the token limit
    pub truncated: bool,
}

/// A conversation bound to one model and one system instruction
pub struct ChatSession {
    client: Arc<dyn LlmClient>,
    system_prompt: String,
    history: Vec<Message>,
    max_tokens: u32,
    temperature: Option<f64>,
    usage: TokenUsage,
}

impl ChatSession {
    pub fn new(client: Arc<dyn LlmClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            history: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Send one user turn and wait for the reply
    ///
    /// On success the history grows by the user turn followed by the
    /// assistant turn. On failure it is left exactly as it was, so the next
    /// call starts from the same conversation.
    pub async fn send(&mut self, user_text: &str) -> Result<AgentReply, LlmError> {
        debug!(turns = self.history.len(), text_len = user_text.len(), "send: called");

        let mut messages = self.history.clone();
        messages.push(Message::user(user_text));

        let request = CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.client.complete(request).await?;

        self.usage.accumulate(&response.usage);
        self.history.push(Message::user(user_text));
        self.history.push(Message::assistant(&response.content));

        info!(
            turns = self.history.len() / 2,
            reply_len = response.content.len(),
            total_tokens = self.usage.total_tokens(),
            "send: reply received"
        );

        Ok(AgentReply {
            truncated: response.stop_reason == StopReason::MaxTokens,
            text: response.content,
        })
    }

    /// Model this session talks to
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Get the full conversation history
    pub fn messages(&self) -> &[Message] {
        &self.history
    }

    /// Token usage accumulated over every successful turn
    pub fn usage(&self) -> &TokenUsage {
        &self.usage
    }
}

// The client and the prompt text stay out of debug output
impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("model", &self.model())
            .field("turns", &self.history.len())
            .field("usage", &self.usage)
            .finish()
    }
}

//! prdagent - conversational product manager
//!
//! A terminal agent that interviews the user about a product idea, compiles a
//! Product Requirements Document and turns it into INVEST user stories, ending
//! with a Jira-importable CSV printed to the terminal.
//!
//! # Core Concepts
//!
//! - **The prompt drives the phases**: discovery, PRD, stories and export are
//!   described to the model in one system instruction; nothing local tracks
//!   the phase
//! - **One call per turn**: each user line is one provider round-trip, never
//!   retried
//! - **Output sniffing**: replies are checked for the CSV export so the user
//!   can be told to save it
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait and Gemini implementation
//! - [`session`] - Conversation history bound to one model and prompt
//! - [`sniffer`] - Jira CSV detection
//! - [`repl`] - Startup sequence and the turn loop
//! - [`prompts`] - Embedded system instruction
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod repl;
pub mod session;
pub mod sniffer;

/// The one model the agent talks to
pub const MODEL: &str = "gemini-2.5-flash";

/// Typed at the prompt to end the conversation (any letter case)
pub const EXIT_COMMAND: &str = "exit";

// Re-export commonly used types
pub use config::{ApiKey, Config, LlmConfig};
pub use error::ConfigurationError;
pub use llm::{GeminiClient, LlmClient, LlmError};
pub use repl::{LoopState, TurnLoop};
pub use session::{AgentReply, ChatSession};
pub use sniffer::looks_like_jira_csv;

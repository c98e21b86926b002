//! Interactive REPL for prdagent
//!
//! Startup resolves the credential and opens the session; the turn loop then
//! owns that session until the user types `exit`.

mod input;
mod turn_loop;

pub use input::{LineReader, ReadOutcome, Terminal};
pub use turn_loop::{LoopState, TurnLoop, USER_PROMPT, is_exit_command};

use std::io;
use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use tracing::{debug, info};

use crate::config::{ApiKey, Config, LlmConfig};
use crate::error::ConfigurationError;
use crate::llm::{self, LlmClient};
use crate::prompts;
use crate::session::ChatSession;

/// Prompt used when the key is not in the environment
pub const API_KEY_PROMPT: &str = "Please enter your Gemini API Key: ";

/// Run the interactive REPL
///
/// Startup failures come back as a [`ConfigurationError`] inside the report.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let mut terminal = Terminal::new()?;

    print_welcome();

    let api_key = resolve_api_key(config.llm.api_key_from_env(), &config.llm.api_key_env, &mut terminal)?;
    let session = start_session(&config.llm, api_key).await?;

    println!("Agent initialized successfully with model: {}.\n", session.model().cyan());
    println!("You can start by describing your core idea, or type '{}' to quit.", crate::EXIT_COMMAND.yellow());
    println!();

    let mut turn_loop = TurnLoop::new(session, terminal, io::stdout());
    turn_loop.run().await
}

/// Print welcome message
fn print_welcome() {
    println!();
    println!("{}", "--- AI Product Manager Agent (CLI - Jira Support) ---".bright_cyan().bold());
    println!(
        "This agent will help you define your product idea, generate a PRD, and then create Jira-ready user stories."
    );
}

/// Take the key from the environment, else ask for it once
///
/// An empty answer or closed input is fatal; the key is never added to the
/// line editor's history.
pub fn resolve_api_key<R: LineReader>(from_env: Option<ApiKey>, env_var: &str, reader: &mut R) -> Result<ApiKey> {
    if let Some(key) = from_env {
        debug!(%env_var, "resolve_api_key: found in environment");
        return Ok(key);
    }

    info!(%env_var, "resolve_api_key: not set, prompting");
    println!();
    let key = match reader.read_line(API_KEY_PROMPT)? {
        ReadOutcome::Line(line) => ApiKey::new(line),
        ReadOutcome::Interrupted | ReadOutcome::Eof => None,
    };

    key.ok_or_else(|| {
        ConfigurationError::MissingCredential {
            env_var: env_var.to_string(),
        }
        .into()
    })
}

/// Create the client for the fixed model and open a session on it
pub async fn start_session(config: &LlmConfig, api_key: ApiKey) -> Result<ChatSession, ConfigurationError> {
    let client = llm::create_client(config, api_key).map_err(ConfigurationError::Client)?;
    open_session(client, config).await
}

/// Probe the model if configured, then bind a session to the client
pub async fn open_session(client: Arc<dyn LlmClient>, config: &LlmConfig) -> Result<ChatSession, ConfigurationError> {
    if config.verify_model {
        debug!(model = %client.model(), "open_session: verifying model");
        client
            .check_model()
            .await
            .map_err(|source| ConfigurationError::ModelUnavailable {
                model: client.model().to_string(),
                source,
            })?;
    }

    info!(model = %client.model(), "open_session: session created");
    Ok(ChatSession::new(client, prompts::PRODUCT_MANAGER)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature))
}

#[cfg(test)]
mod tests {
    use super::input::scripted::ScriptedReader;
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    #[test]
    fn test_resolve_api_key_prefers_environment() {
        let mut reader = ScriptedReader::new(&["typed-key"]);
        let key = resolve_api_key(ApiKey::new("env-key"), "GEMINI_API_KEY", &mut reader).unwrap();
        assert_eq!(key.expose(), "env-key");
        assert!(reader.prompts.is_empty());
    }

    #[test]
    fn test_resolve_api_key_prompts_when_unset() {
        let mut reader = ScriptedReader::new(&["  typed-key  "]);
        let key = resolve_api_key(None, "GEMINI_API_KEY", &mut reader).unwrap();
        assert_eq!(key.expose(), "typed-key");
        assert_eq!(reader.prompts, vec![API_KEY_PROMPT.to_string()]);
        assert!(reader.history.is_empty());
    }

    #[test]
    fn test_resolve_api_key_empty_answer_is_fatal() {
        let mut reader = ScriptedReader::new(&[""]);
        let err = resolve_api_key(None, "GEMINI_API_KEY", &mut reader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigurationError>(),
            Some(ConfigurationError::MissingCredential { env_var }) if env_var == "GEMINI_API_KEY"
        ));
    }

    #[test]
    fn test_resolve_api_key_eof_is_fatal() {
        let mut reader = ScriptedReader::new(&[]);
        let err = resolve_api_key(None, "MY_KEY", &mut reader).unwrap_err();
        assert!(err.downcast_ref::<ConfigurationError>().is_some());
    }

    #[tokio::test]
    async fn test_open_session_binds_prompt_and_limits() {
        let client = Arc::new(MockLlmClient::with_replies(&["What is the core idea?"]));
        let config = LlmConfig {
            max_tokens: 1024,
            temperature: Some(0.4),
            ..Default::default()
        };

        let mut session = open_session(client.clone(), &config).await.unwrap();
        session.send("hi").await.unwrap();

        let request = &client.requests()[0];
        assert_eq!(request.system_prompt, prompts::PRODUCT_MANAGER);
        assert_eq!(request.max_tokens, 1024);
        assert_eq!(request.temperature, Some(0.4));
    }

    #[tokio::test]
    async fn test_open_session_model_unavailable_is_fatal() {
        let client = Arc::new(MockLlmClient::with_replies(&[]).with_model_unavailable());
        let err = match open_session(client.clone(), &LlmConfig::default()).await {
            Err(e) => e,
            Ok(session) => panic!("expected ModelUnavailable, got {session:?}"),
        };

        assert!(matches!(err, ConfigurationError::ModelUnavailable { ref model, .. } if model == "mock-model"));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_open_session_skips_probe_when_disabled() {
        let client = Arc::new(MockLlmClient::with_replies(&[]).with_model_unavailable());
        let config = LlmConfig {
            verify_model: false,
            ..Default::default()
        };
        assert!(open_session(client, &config).await.is_ok());
    }
}

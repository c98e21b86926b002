//! The conversation loop
//!
//! Reads one line, forwards it to the session, prints the reply and checks it
//! for the CSV export. Exactly one provider call per non-empty, non-exit line.

use std::io::Write;

use colored::Colorize;
use eyre::Result;
use tracing::{debug, info, warn};

use super::input::{LineReader, ReadOutcome};
use crate::EXIT_COMMAND;
use crate::session::{AgentReply, ChatSession};
use crate::sniffer::looks_like_jira_csv;

/// Prompt shown before each user line
pub const USER_PROMPT: &str = "You: ";

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Check for the exit command (case-insensitive)
pub fn is_exit_command(input: &str) -> bool {
    input.eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Owns the session for the life of the conversation
pub struct TurnLoop<R: LineReader, W: Write> {
    session: ChatSession,
    reader: R,
    out: W,
    state: LoopState,
}

impl<R: LineReader, W: Write> TurnLoop<R, W> {
    pub fn new(session: ChatSession, reader: R, out: W) -> Self {
        Self {
            session,
            reader,
            out,
            state: LoopState::Running,
        }
    }

    /// Run until the user exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        info!(model = %self.session.model(), "run: conversation started");
        while self.state == LoopState::Running {
            self.step().await?;
        }
        info!(
            turns = self.session.messages().len() / 2,
            total_tokens = self.session.usage().total_tokens(),
            "run: conversation ended"
        );
        Ok(())
    }

    /// Process a single line of input
    pub async fn step(&mut self) -> Result<LoopState> {
        let line = match self.reader.read_line(USER_PROMPT)? {
            ReadOutcome::Line(line) => line,
            ReadOutcome::Interrupted => {
                // Ctrl+C - just show new prompt
                writeln!(self.out, "^C")?;
                return Ok(self.state);
            }
            ReadOutcome::Eof => return self.terminate(),
        };

        let input = line.trim();
        if input.is_empty() {
            return Ok(self.state);
        }

        if is_exit_command(input) {
            return self.terminate();
        }

        self.reader.add_history(input);

        match self.session.send(input).await {
            Ok(reply) => self.print_reply(&reply)?,
            Err(e) => {
                warn!(error = %e, "step: provider call failed");
                writeln!(
                    self.out,
                    "\n{} An issue occurred during interaction: {}",
                    "Agent Error:".red().bold(),
                    e
                )?;
                writeln!(self.out, "{}", e.hint())?;
            }
        }

        self.out.flush()?;
        Ok(self.state)
    }

    fn print_reply(&mut self, reply: &AgentReply) -> Result<()> {
        writeln!(self.out, "\n{} {}", "Agent:".bright_blue().bold(), reply.text)?;

        if reply.truncated {
            writeln!(self.out, "{}", "[Response truncated - max tokens reached]".yellow())?;
        }

        if looks_like_jira_csv(&reply.text) {
            debug!("print_reply: CSV export detected");
            writeln!(self.out)?;
            writeln!(self.out, "{}", "--- Jira Import Compatible CSV Detected ---".bright_green())?;
            writeln!(
                self.out,
                "You can copy the CSV text above and save it as 'stories.csv' for Jira import."
            )?;
            writeln!(self.out, "{}", "-------------------------------------------".bright_green())?;
        }

        Ok(())
    }

    fn terminate(&mut self) -> Result<LoopState> {
        writeln!(self.out, "Exiting chat. Goodbye!")?;
        self.out.flush()?;
        self.state = LoopState::Terminated;
        Ok(self.state)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn output(&self) -> &W {
        &self.out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::LlmError;
    use crate::llm::client::mock::{MockLlmClient, reply};
    use crate::repl::input::scripted::ScriptedReader;

    const EXPORT: &str = "Summary,Description,Labels\n\
        User Login,\"As a Customer, I want to log in so that I can access my account\",Customer";

    fn turn_loop(client: Arc<MockLlmClient>, lines: &[&str]) -> TurnLoop<ScriptedReader, Vec<u8>> {
        colored::control::set_override(false);
        let session = ChatSession::new(client, "SYSTEM");
        TurnLoop::new(session, ScriptedReader::new(lines), Vec::new())
    }

    fn output(turn_loop: &TurnLoop<ScriptedReader, Vec<u8>>) -> String {
        String::from_utf8(turn_loop.output().clone()).unwrap()
    }

    #[test]
    fn test_is_exit_command() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("ExIt"));
        assert!(!is_exit_command("exit now"));
        assert!(!is_exit_command("quit"));
    }

    #[tokio::test]
    async fn test_exit_in_any_case_never_calls_client() {
        for word in ["exit", "EXIT", "Exit", "eXiT"] {
            let client = Arc::new(MockLlmClient::with_replies(&["unused"]));
            let mut turn_loop = turn_loop(client.clone(), &[word, "never read"]);

            turn_loop.run().await.unwrap();

            assert_eq!(turn_loop.state(), LoopState::Terminated);
            assert_eq!(client.call_count(), 0);
            assert!(turn_loop.session().messages().is_empty());
            assert!(output(&turn_loop).contains("Exiting chat. Goodbye!"));
            assert_eq!(turn_loop.reader().prompts, vec![USER_PROMPT.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_one_call_per_input() {
        let client = Arc::new(MockLlmClient::with_replies(&["What is the core idea?", "Who is it for?"]));
        let mut turn_loop = turn_loop(client.clone(), &["Hello", "A recipe planner", "exit"]);

        assert_eq!(turn_loop.step().await.unwrap(), LoopState::Running);
        assert_eq!(client.call_count(), 1);
        assert_eq!(turn_loop.session().messages().len(), 2);

        assert_eq!(turn_loop.step().await.unwrap(), LoopState::Running);
        assert_eq!(client.call_count(), 2);
        assert_eq!(turn_loop.session().messages().len(), 4);

        assert_eq!(turn_loop.step().await.unwrap(), LoopState::Terminated);
        assert_eq!(client.call_count(), 2);

        let out = output(&turn_loop);
        assert!(out.contains("Agent: What is the core idea?"));
        assert!(out.contains("Agent: Who is it for?"));
        assert_eq!(turn_loop.reader().history, vec!["Hello", "A recipe planner"]);
    }

    #[tokio::test]
    async fn test_provider_failure_is_recoverable() {
        let client = Arc::new(MockLlmClient::new(vec![
            Err(LlmError::ApiError {
                status: 503,
                message: "model overloaded".to_string(),
            }),
            Ok(reply("Let's continue.")),
        ]));
        let mut turn_loop = turn_loop(client.clone(), &["Hello", "Hello again"]);

        assert_eq!(turn_loop.step().await.unwrap(), LoopState::Running);
        assert!(turn_loop.session().messages().is_empty());
        let out = output(&turn_loop);
        assert!(out.contains("Agent Error: An issue occurred during interaction: API error 503: model overloaded"));
        assert!(out.contains("Please check your API key and ensure the model is available."));

        assert_eq!(turn_loop.step().await.unwrap(), LoopState::Running);
        assert_eq!(client.call_count(), 2);
        assert_eq!(turn_loop.session().messages().len(), 2);
        assert!(output(&turn_loop).contains("Agent: Let's continue."));
    }

    #[tokio::test]
    async fn test_csv_reply_prints_banner() {
        let client = Arc::new(MockLlmClient::with_replies(&[EXPORT]));
        let mut turn_loop = turn_loop(client, &["done"]);

        turn_loop.step().await.unwrap();

        let out = output(&turn_loop);
        assert!(out.contains(EXPORT));
        assert!(out.contains("--- Jira Import Compatible CSV Detected ---"));
        assert!(out.contains("save it as 'stories.csv'"));
    }

    #[tokio::test]
    async fn test_prose_reply_has_no_banner() {
        let client = Arc::new(MockLlmClient::with_replies(&[
            "Once you type done I will produce Summary, Description and Labels columns.\nReady?",
        ]));
        let mut turn_loop = turn_loop(client, &["what next?"]);

        turn_loop.step().await.unwrap();

        assert!(!output(&turn_loop).contains("CSV Detected"));
    }

    #[tokio::test]
    async fn test_blank_input_is_skipped() {
        let client = Arc::new(MockLlmClient::with_replies(&["ok"]));
        let mut turn_loop = turn_loop(client.clone(), &["", "   ", "\t", "  hi  "]);

        turn_loop.run().await.unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(client.requests()[0].messages[0].content, "hi");
    }

    #[tokio::test]
    async fn test_eof_terminates() {
        let client = Arc::new(MockLlmClient::with_replies(&[]));
        let mut turn_loop = turn_loop(client.clone(), &[]);

        turn_loop.run().await.unwrap();

        assert_eq!(turn_loop.state(), LoopState::Terminated);
        assert_eq!(client.call_count(), 0);
        assert!(output(&turn_loop).contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_interrupt_keeps_running() {
        colored::control::set_override(false);
        let client = Arc::new(MockLlmClient::with_replies(&["still here"]));
        let reader = ScriptedReader::from_outcomes(vec![
            ReadOutcome::Interrupted,
            ReadOutcome::Line("hello".to_string()),
            ReadOutcome::Line("exit".to_string()),
        ]);
        let mut turn_loop = TurnLoop::new(ChatSession::new(client.clone(), "SYSTEM"), reader, Vec::new());

        assert_eq!(turn_loop.step().await.unwrap(), LoopState::Running);
        assert_eq!(client.call_count(), 0);

        turn_loop.run().await.unwrap();
        assert_eq!(client.call_count(), 1);
        let out = output(&turn_loop);
        assert!(out.starts_with("^C"));
        assert!(out.contains("Agent: still here"));
    }

    #[tokio::test]
    async fn test_truncated_reply_is_noted() {
        let client = Arc::new(MockLlmClient::new(vec![Ok(crate::llm::CompletionResponse {
            content: "1. Project Overview & Goal".to_string(),
            stop_reason: crate::llm::StopReason::MaxTokens,
            usage: Default::default(),
        })]));
        let mut turn_loop = turn_loop(client, &["that's everything"]);

        turn_loop.step().await.unwrap();

        assert!(output(&turn_loop).contains("[Response truncated - max tokens reached]"));
    }
}

//! CLI argument parsing for prdagent

use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
The agent reads the API key from GEMINI_API_KEY (or the variable named by
llm.api-key-env in the config file) and asks for it when unset.

Describe your idea, answer one question at a time, and type 'exit' to quit.";

#[derive(Parser, Debug)]
#[command(name = "pa")]
#[command(author, version, about = "Turn a product idea into a PRD and Jira-ready user stories", long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

/// Parse a log level name, case-insensitively
pub fn parse_log_level(s: &str) -> Option<tracing::Level> {
    match s.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args() {
        let cli = Cli::try_parse_from(["pa"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from(["pa", "-c", "agent.yml", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("agent.yml")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_rejects_subcommands() {
        assert!(Cli::try_parse_from(["pa", "chat"]).is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug"), Some(tracing::Level::DEBUG));
        assert_eq!(parse_log_level("Warning"), Some(tracing::Level::WARN));
        assert_eq!(parse_log_level("ERROR"), Some(tracing::Level::ERROR));
        assert_eq!(parse_log_level("loud"), None);
    }
}

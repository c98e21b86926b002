//! prdagent - conversational product manager
//!
//! CLI entry point: load config, set up logging, run the REPL.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{error, info};

use prdagent::cli::{Cli, parse_log_level};
use prdagent::config::Config;
use prdagent::error::ConfigurationError;
use prdagent::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prdagent")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_log_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    // Write to log file, never stdout/stderr: the terminal belongs to the conversation
    let log_file = fs::File::create(log_dir.join("prdagent.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {})", level);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;

    info!(
        model = %prdagent::MODEL,
        api_key_env = %config.llm.api_key_env,
        base_url = %config.llm.base_url,
        "prdagent starting"
    );

    if let Err(err) = repl::run_interactive(&config).await {
        if let Some(startup) = err.downcast_ref::<ConfigurationError>() {
            error!(error = %startup, "startup failed");
            eprintln!("\n{} {}", "Initialization Error:".red().bold(), startup);
            eprintln!("{}", startup.hint());
            std::process::exit(1);
        }
        return Err(err);
    }

    Ok(())
}

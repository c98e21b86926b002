//! Line input for the REPL

use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

/// What one prompt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl+C at the prompt
    Interrupted,
    /// Ctrl+D or closed stdin
    Eof,
}

/// Source of user input lines
pub trait LineReader {
    /// Show `prompt` and read one line
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Remember a submitted line for arrow-key recall
    fn add_history(&mut self, _line: &str) {}
}

/// Interactive terminal input backed by rustyline
///
/// History is in-memory only and is never saved.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        Ok(Self { editor })
    }
}

impl LineReader for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

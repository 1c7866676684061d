//! Line-oriented prompt for querying a JSON response body.
//!
//! The session holds the raw response body and answers `get <dotted.path>`
//! commands against it. It is fail-fast: the first command that errors
//! (unknown command, missing argument, unresolved path) ends the session and
//! the error is returned to the caller. Blank lines re-prompt and end of
//! input closes the session cleanly.

use crate::domain::navigator::{self, NavigationError};
use colored::Colorize;
use serde_json::Value;
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

pub const PROMPT: &str = "Enter command: ";
pub const COMMAND_GET: &str = "get";

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command not found: '{command}'")]
    UnknownCommand { command: String },

    #[error("property name is not defined: usage '{command} <path>'")]
    MissingArgument { command: String },

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error("failed to format value: {0}")]
    Render(#[from] serde_json::Error),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Get { path: Vec<&'a str> },
}

impl<'a> Command<'a> {
    /// Parses one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &'a str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };

        match command {
            COMMAND_GET => {
                let argument = words.next().ok_or_else(|| CommandError::MissingArgument {
                    command: command.to_string(),
                })?;
                Ok(Some(Command::Get {
                    path: navigator::split_path(argument),
                }))
            }
            other => Err(CommandError::UnknownCommand {
                command: other.to_string(),
            }),
        }
    }
}

pub struct InteractiveSession<'a> {
    document: &'a [u8],
    color: bool,
}

impl<'a> InteractiveSession<'a> {
    pub fn new(document: &'a [u8]) -> Self {
        Self {
            document,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Prompts, reads and executes commands until input ends or a command fails.
    pub fn run<R: BufRead, W: Write>(
        &self,
        mut input: R,
        mut output: W,
    ) -> Result<(), CommandError> {
        let mut line = String::new();
        loop {
            write!(output, "{}", PROMPT)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("input closed, leaving interactive session");
                writeln!(output)?;
                return Ok(());
            }

            self.execute(&line, &mut output)?;
        }
    }

    /// Executes a single command line against the held document
    pub fn execute<W: Write>(&self, line: &str, output: &mut W) -> Result<(), CommandError> {
        let Some(command) = Command::parse(line)? else {
            return Ok(());
        };

        match command {
            Command::Get { path } => {
                let raw = navigator::navigate(self.document, &path)?;
                let pretty = render(raw)?;
                if self.color {
                    writeln!(output, "{}", pretty.green())?;
                } else {
                    writeln!(output, "{}", pretty)?;
                }
            }
        }
        Ok(())
    }
}

fn render(raw: &[u8]) -> Result<String, serde_json::Error> {
    let value: Value = serde_json::from_slice(raw)?;
    serde_json::to_string_pretty(&value)
}

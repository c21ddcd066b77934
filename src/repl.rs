//! Interactive query shell state.
//!
//! The shell buffers input lines until a unit ends with `.`, then classifies
//! the unit as a built-in command or a query. All state lives here so the
//! read loop in the binary stays a thin rustyline wrapper, and the buffering
//! and classification stay testable.

use std::mem;
use std::path::{Path, PathBuf};

use crate::error::{DiscoverError, QueryError};
use crate::program::ProgramRepresentation;
use crate::query::{self, QueryEngine, QueryResult};
use crate::Language;

/// Result of processing one line of input.
#[derive(Debug)]
pub enum InputResult {
    Command(ShellCommand),
    /// A complete dot-terminated unit that is not a built-in command.
    Query(String),
    Incomplete,
    Empty,
}

/// Built-in shell commands, all dot-terminated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Exit,
    /// Describe the shell session itself.
    ShellInfo,
    /// Describe the loaded program.
    ProgramInfo,
    /// Discover and parse a new program, replacing the current one.
    Load(PathBuf),
}

impl ShellCommand {
    /// Classify a complete input unit. `None` means it should be parsed as a
    /// query instead.
    pub fn parse(input: &str) -> Option<Self> {
        let body = input.trim().strip_suffix('.').unwrap_or(input.trim());
        let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.as_str() {
            "help" => Some(ShellCommand::Help),
            "exit" | "quit" => Some(ShellCommand::Exit),
            "shell info" => Some(ShellCommand::ShellInfo),
            "program info" => Some(ShellCommand::ProgramInfo),
            other => other
                .strip_prefix("load program ")
                .map(|path| ShellCommand::Load(PathBuf::from(path.trim()))),
        }
    }
}

/// Shell state: the loaded program plus the multi-line input buffer.
pub struct ShellState {
    pub language: Language,
    pub program_path: Option<PathBuf>,
    pub representation: ProgramRepresentation,
    input_buffer: String,
}

impl ShellState {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            program_path: None,
            representation: ProgramRepresentation::empty(language),
            input_buffer: String::new(),
        }
    }

    /// Discover, read and parse the program at `path`, replacing the current
    /// representation. On error the current representation is kept.
    pub fn load(&mut self, path: &Path) -> Result<(), DiscoverError> {
        let representation = crate::parse_path(path, self.language)?;
        self.representation = representation;
        self.program_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Process one line, concatenating until a trailing `.` completes a unit.
    pub fn process_line(&mut self, line: &str) -> InputResult {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if self.input_buffer.is_empty() {
                return InputResult::Empty;
            }
            return InputResult::Incomplete;
        }

        if !self.input_buffer.is_empty() {
            self.input_buffer.push(' ');
        }
        self.input_buffer.push_str(trimmed);

        if self.input_buffer.ends_with('.') {
            let unit = mem::take(&mut self.input_buffer);
            match ShellCommand::parse(&unit) {
                Some(command) => InputResult::Command(command),
                None => InputResult::Query(unit),
            }
        } else {
            InputResult::Incomplete
        }
    }

    pub fn has_pending_input(&self) -> bool {
        !self.input_buffer.is_empty()
    }

    pub fn clear_pending_input(&mut self) {
        self.input_buffer.clear();
    }

    /// Parse and evaluate one query against the loaded program.
    pub fn execute_query(&self, text: &str) -> Result<QueryResult<'_>, QueryError> {
        let parsed = query::parse_query(text)?;
        Ok(QueryEngine::new(&self.representation).evaluate(&parsed))
    }

    pub fn shell_info(&self) -> String {
        let program = match &self.program_path {
            Some(path) => path.display().to_string(),
            None => "(none)".to_string(),
        };
        format!(
            "language: {}\nprogram: {}\ndefinitions: {}",
            self.language,
            program,
            self.representation.len()
        )
    }
}

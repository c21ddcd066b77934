//! Sembrowse: semantic browsing for Prolog-like and C-like programs.
//!
//! Source lines are parsed into terms ([`parser`]), assembled into
//! definitions by line-oriented builders ([`builder`]), type-unified
//! ([`unify`]) and stored in a queryable representation ([`program`]).
//! Queries ([`query`]) are parsed from a small boolean language and matched
//! structurally against the stored definitions. The interactive shell
//! ([`repl`]) and file discovery ([`discover`]) wrap both ends.

pub mod builder;
pub mod discover;
pub mod error;
pub mod parser;
pub mod pretty;
pub mod program;
pub mod query;
pub mod repl;
pub mod term;
pub mod unify;

use std::fmt;
use std::fs;
use std::path::Path;

pub use builder::{parse_source, ProgramBuilder};
pub use error::{DiscoverError, ParseError, QueryError, UnifyError};
pub use program::{DefRef, ProgramRepresentation};
pub use query::{parse_query, Query, QueryEngine, QueryResult};
pub use term::{Term, VarType};

/// Source language of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Prolog,
    C,
}

impl Language {
    /// File extensions discovered for this language.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Language::Prolog => &["pl", "P"],
            Language::C => &["c"],
        }
    }

    /// Infer the language from a file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pl" | "P" => Some(Language::Prolog),
            "c" => Some(Language::C),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Prolog => write!(f, "Prolog"),
            Language::C => write!(f, "C"),
        }
    }
}

/// Discover, read and parse every matching source file under `path` into one
/// program representation.
pub fn parse_path(path: &Path, language: Language) -> Result<ProgramRepresentation, DiscoverError> {
    let sources = discover::discover_sources(path, language)?;
    let mut builder = ProgramBuilder::new(language);
    for source_path in &sources {
        let source = fs::read_to_string(source_path).map_err(|e| DiscoverError::Io {
            path: source_path.clone(),
            message: e.to_string(),
        })?;
        builder.feed_source(&source);
    }
    Ok(builder.finish())
}

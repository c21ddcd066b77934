//! Error types and report formatting.
//!
//! Each phase has its own error enum with a hand-rolled `Display`; parse and
//! query errors can additionally be rendered as ariadne reports anchored to
//! the offending text.

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fmt;
use std::path::PathBuf;

use crate::term::VarType;

/// Errors raised while parsing a single term or definition head.
///
/// All variants are fatal to the definition being parsed, never to the rest
/// of the source unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Parenthesis depth went negative or did not return to zero.
    UnbalancedParens { text: String, offset: usize },
    /// An argument or operand position was empty after splitting.
    EmptyOperand { text: String },
    /// The whole term text was empty.
    EmptyTerm,
    /// A statement-language head had no recognizable return type or name.
    BadMethodHead { text: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnbalancedParens { text, .. } => {
                write!(f, "malformed term `{}`: unbalanced parentheses", text)
            }
            ParseError::EmptyOperand { text } => {
                write!(f, "malformed term `{}`: empty operand after splitting", text)
            }
            ParseError::EmptyTerm => write!(f, "malformed term: empty input"),
            ParseError::BadMethodHead { text } => {
                write!(f, "malformed method head `{}`", text)
            }
        }
    }
}

/// Errors raised by the unification pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnifyError {
    /// Same name reused with a different arity across definitions.
    RedefinedArity {
        name: String,
        existing: usize,
        new: usize,
    },
    /// Two occurrences of one variable name resolved to incompatible
    /// concrete types. Reported as a warning; the first-seen type is kept.
    ConflictingType {
        variable: String,
        existing: VarType,
        candidate: VarType,
    },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnifyError::RedefinedArity {
                name,
                existing,
                new,
            } => write!(
                f,
                "predicate or function `{}` redefined with arity {} (was {})",
                name, new, existing
            ),
            UnifyError::ConflictingType {
                variable,
                existing,
                candidate,
            } => write!(
                f,
                "variable `{}` matches two conflicting types: {} and {}",
                variable, existing, candidate
            ),
        }
    }
}

/// Errors raised while parsing a query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// The query did not end with `.`.
    MissingTerminator,
    /// The query did not start with the `find` keyword.
    MissingFind,
    /// Nothing followed `find`.
    MissingTarget,
    /// Target was neither `predicate` nor `function`.
    UnknownTarget(String),
    /// The `/<arity>` suffix was not an integer.
    BadArity(String),
    /// Something other than `where` followed the target.
    ExpectedWhere(String),
    /// `where` with no assertions after it.
    EmptyWhere,
    /// Assertion operator was not `inputs`, `bodycontains` or `returns`.
    UnknownOperator(String),
    /// An assertion block without `<operator>:<values>` shape.
    MalformedAssertion(String),
    /// Parenthesis depth went negative or did not return to zero.
    UnbalancedParens,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::MissingTerminator => write!(f, "query must end with `.`"),
            QueryError::MissingFind => write!(f, "query must start with `find`"),
            QueryError::MissingTarget => {
                write!(f, "expected `predicate` or `function` after `find`")
            }
            QueryError::UnknownTarget(t) => {
                write!(f, "unknown target `{}`: expected `predicate` or `function`", t)
            }
            QueryError::BadArity(a) => write!(f, "arity `{}` is not an integer", a),
            QueryError::ExpectedWhere(t) => write!(f, "expected `where`, found `{}`", t),
            QueryError::EmptyWhere => write!(f, "`where` must be followed by assertions"),
            QueryError::UnknownOperator(op) => write!(
                f,
                "unknown assertion operator `{}`: expected inputs, bodycontains or returns",
                op
            ),
            QueryError::MalformedAssertion(a) => {
                write!(f, "assertion `{}` is not of the form operator:value[,value]", a)
            }
            QueryError::UnbalancedParens => write!(f, "unbalanced parentheses in assertions"),
        }
    }
}

/// Errors raised while discovering or reading source files.
#[derive(Debug)]
pub enum DiscoverError {
    /// The given root path does not exist. Fatal: no partial run.
    PathNotFound(PathBuf),
    /// An I/O failure while walking or reading.
    Io { path: PathBuf, message: String },
}

impl fmt::Display for DiscoverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoverError::PathNotFound(path) => {
                write!(f, "path {} does not exist", path.display())
            }
            DiscoverError::Io { path, message } => {
                write!(f, "i/o error at {}: {}", path.display(), message)
            }
        }
    }
}

/// Format a parse error into an ariadne report against the source text it
/// came from (typically a single stripped line).
pub fn format_parse_error(source: &str, error: &ParseError) -> String {
    let (offset, message) = match error {
        ParseError::UnbalancedParens { offset, .. } => {
            (*offset, "unbalanced parentheses".to_string())
        }
        ParseError::EmptyOperand { .. } => (0, "empty operand after splitting".to_string()),
        ParseError::EmptyTerm => (0, "empty term".to_string()),
        ParseError::BadMethodHead { .. } => (0, "malformed method head".to_string()),
    };
    let end = (offset + 1).min(source.len().max(1));
    let span = offset.min(end.saturating_sub(1))..end;

    render_report(source, "Parse error", span, message).unwrap_or_else(|| error.to_string())
}

/// Format a query error into an ariadne report against the query text.
pub fn format_query_error(query: &str, error: &QueryError) -> String {
    let span = match error {
        QueryError::MissingTerminator => query.len().saturating_sub(1)..query.len().max(1),
        _ => 0..query.len().max(1),
    };

    render_report(query, "Invalid query", span, error.to_string())
        .unwrap_or_else(|| error.to_string())
}

fn render_report(
    source: &str,
    header: &str,
    span: std::ops::Range<usize>,
    message: String,
) -> Option<String> {
    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, (), span.start)
        .with_message(header)
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        );

    report.finish().write(Source::from(source), &mut output).ok()?;
    String::from_utf8(output).ok()
}

//! Line-oriented assembly of definitions.
//!
//! The builders consume a source unit one line at a time and emit completed
//! definitions into the program representation, which runs the unification
//! passes on each add. A parse failure inside one definition abandons that
//! definition only; the rest of the unit is still processed.

use std::mem;

use tracing::{debug, warn};

use crate::parser;
use crate::program::{CProgram, PrologProgram, ProgramRepresentation};
use crate::term::{Conditional, Loop, Method, Predicate, Term};
use crate::Language;

/// Builder for either language, matching the representation variant.
pub enum ProgramBuilder {
    Prolog(ClauseBuilder),
    C(BlockBuilder),
}

impl ProgramBuilder {
    pub fn new(language: Language) -> Self {
        match language {
            Language::Prolog => ProgramBuilder::Prolog(ClauseBuilder::new()),
            Language::C => ProgramBuilder::C(BlockBuilder::new()),
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        match self {
            ProgramBuilder::Prolog(b) => b.feed_line(line),
            ProgramBuilder::C(b) => b.feed_line(line),
        }
    }

    /// Feed a whole source unit, line by line.
    pub fn feed_source(&mut self, source: &str) {
        for line in source.lines() {
            self.feed_line(line);
        }
    }

    pub fn finish(self) -> ProgramRepresentation {
        match self {
            ProgramBuilder::Prolog(b) => ProgramRepresentation::Prolog(b.finish()),
            ProgramBuilder::C(b) => ProgramRepresentation::C(b.finish()),
        }
    }
}

/// Parse a full source unit in one call.
pub fn parse_source(source: &str, language: Language) -> ProgramRepresentation {
    let mut builder = ProgramBuilder::new(language);
    builder.feed_source(source);
    builder.finish()
}

/// Clause assembly for the predicate language.
///
/// State machine: `idle -> reading_body -> idle`, driven by `:-` and a
/// trailing `.` per line. A line ending in `.` with no `:-` is a fact.
pub struct ClauseBuilder {
    program: PrologProgram,
    head: Option<(String, Vec<Term>)>,
    body: Vec<Term>,
    reading_body: bool,
    /// Set after a parse failure: consume lines until the clause terminator.
    skipping: bool,
}

impl Default for ClauseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClauseBuilder {
    pub fn new() -> Self {
        Self {
            program: PrologProgram::new(),
            head: None,
            body: Vec::new(),
            reading_body: false,
            skipping: false,
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        let stripped: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        if stripped.is_empty() {
            return;
        }

        if self.skipping {
            if stripped.ends_with('.') {
                self.skipping = false;
            }
            return;
        }

        if self.reading_body {
            self.continue_body(&stripped);
        } else if let Some((head_text, rest)) = stripped.split_once(":-") {
            self.open_clause(head_text, rest);
        } else if let Some(fact_text) = stripped.strip_suffix('.') {
            self.parse_fact(fact_text);
        } else {
            debug!("ignoring line outside any clause: {}", line.trim());
        }
    }

    pub fn finish(mut self) -> PrologProgram {
        if self.head.is_some() {
            warn!("source ended inside an unterminated clause; definition dropped");
            self.head = None;
            self.body.clear();
        }
        self.program
    }

    fn open_clause(&mut self, head_text: &str, rest: &str) {
        match parser::parse_head(head_text, Language::Prolog) {
            Ok(head) => self.head = Some((head.name, head.args)),
            Err(e) => {
                warn!("skipping clause: {}", e);
                self.abandon(rest.ends_with('.'));
                return;
            }
        }

        let mut closed = false;
        let mut rest = rest;
        if let Some(r) = rest.strip_suffix(',') {
            rest = r;
        } else if let Some(r) = rest.strip_suffix('.') {
            rest = r;
            closed = true;
        }

        if !rest.is_empty() && !self.append_clauses(rest, closed) {
            return;
        }
        if closed {
            self.finalize();
        } else {
            self.reading_body = true;
        }
    }

    fn continue_body(&mut self, stripped: &str) {
        let mut closed = false;
        let mut text = stripped;
        if let Some(t) = text.strip_suffix('.') {
            text = t;
            closed = true;
        } else if let Some(t) = text.strip_suffix(',') {
            text = t;
        }

        if !text.is_empty() && !self.append_clauses(text, closed) {
            return;
        }
        if closed {
            self.finalize();
        }
    }

    fn parse_fact(&mut self, text: &str) {
        match parser::parse_head(text, Language::Prolog) {
            Ok(head) => {
                self.head = Some((head.name, head.args));
                self.finalize();
            }
            Err(e) => warn!("skipping fact: {}", e),
        }
    }

    /// Parse comma-separated body clauses; on failure abandon the whole
    /// definition and report whether the caller may continue.
    fn append_clauses(&mut self, text: &str, closed: bool) -> bool {
        for clause in parser::split_depth0(text, ',') {
            match parser::parse_term(&clause, Language::Prolog, false) {
                Ok(term) => self.body.push(term),
                Err(e) => {
                    warn!("skipping clause: {}", e);
                    self.abandon(closed);
                    return false;
                }
            }
        }
        true
    }

    fn abandon(&mut self, terminator_seen: bool) {
        self.head = None;
        self.body.clear();
        self.reading_body = false;
        self.skipping = !terminator_seen;
    }

    fn finalize(&mut self) {
        self.reading_body = false;
        if let Some((name, args)) = self.head.take() {
            let predicate = Predicate {
                name,
                args,
                body: mem::take(&mut self.body),
            };
            debug!("parsed predicate {}/{}", predicate.name, predicate.arity());
            if let Err(e) = self.program.add_predicate(predicate) {
                warn!("{}", e);
            }
        }
    }
}

/// An open `{`-block awaiting its closing brace.
enum OpenBlock {
    Loop(Loop),
    Conditional(Conditional),
    /// A brace scope we do not model (bare block, switch); its statements
    /// fall through to the enclosing container.
    Plain(Vec<Term>),
}

impl OpenBlock {
    fn body_mut(&mut self) -> &mut Vec<Term> {
        match self {
            OpenBlock::Loop(l) => &mut l.body,
            OpenBlock::Conditional(c) => &mut c.body,
            OpenBlock::Plain(body) => body,
        }
    }
}

/// Block assembly for the statement language.
///
/// Tracks a brace-depth counter and a stack of open loop/conditional blocks;
/// a line ending in `{` opens a method or nested block, `}` closes the
/// innermost one, and a `;`-terminated line is a flat statement appended to
/// whichever container is current.
pub struct BlockBuilder {
    program: CProgram,
    current: Option<Method>,
    stack: Vec<OpenBlock>,
    depth: usize,
    /// Inside a top-level block that is not a method (struct definition).
    skipping_block: bool,
    /// The current method failed to parse; consume it without storing.
    abandoned: bool,
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            program: CProgram::new(),
            current: None,
            stack: Vec::new(),
            depth: 0,
            skipping_block: false,
            abandoned: false,
        }
    }

    pub fn feed_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
            return;
        }

        if let Some(rest) = trimmed.strip_prefix('}') {
            self.close_block();
            // `} else {` and `} else if (..) {` reopen on the same line; a
            // do-while tail `} while (..);` belongs to the closed loop.
            let rest = rest.trim();
            if let Some(inner) = rest.strip_suffix('{') {
                self.open_block(inner.trim());
            }
        } else if let Some(inner) = trimmed.strip_suffix('{') {
            self.open_block(inner.trim());
        } else if let Some(statement) = trimmed.strip_suffix(';') {
            self.push_statement(statement);
        } else {
            debug!("ignoring unterminated line: {}", trimmed);
        }
    }

    pub fn finish(mut self) -> CProgram {
        if self.current.is_some() {
            warn!("source ended inside an unterminated method; definition dropped");
            self.current = None;
        }
        self.program
    }

    fn open_block(&mut self, header: &str) {
        self.depth += 1;
        if self.skipping_block {
            return;
        }

        if self.current.is_none() {
            match parser::parse_method_head(header) {
                Ok((return_type, name, args)) => {
                    debug!("parsing method {}/{}", name, args.len());
                    self.current = Some(Method {
                        name,
                        return_type,
                        args,
                        body: Vec::new(),
                    });
                    self.abandoned = false;
                }
                Err(e) => {
                    debug!("skipping non-method block `{}`: {}", header, e);
                    self.skipping_block = true;
                }
            }
            return;
        }

        let keyword = header.split('(').next().unwrap_or("").trim();
        let block = match keyword {
            "for" | "while" | "do" => OpenBlock::Loop(Loop {
                name: keyword.to_string(),
                body: Vec::new(),
            }),
            "if" => OpenBlock::Conditional(Conditional {
                name: "if".to_string(),
                body: Vec::new(),
            }),
            kw if kw.starts_with("else") => OpenBlock::Conditional(Conditional {
                name: if kw.contains("if") { "else if" } else { "else" }.to_string(),
                body: Vec::new(),
            }),
            _ => OpenBlock::Plain(Vec::new()),
        };
        self.stack.push(block);
    }

    fn close_block(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.skipping_block {
            if self.depth == 0 {
                self.skipping_block = false;
            }
            return;
        }

        if let Some(block) = self.stack.pop() {
            if let Some(container) = self.container() {
                match block {
                    OpenBlock::Loop(l) => container.push(Term::Loop(l)),
                    OpenBlock::Conditional(c) => container.push(Term::Conditional(c)),
                    OpenBlock::Plain(mut body) => container.append(&mut body),
                }
            }
        } else if let Some(method) = self.current.take() {
            if self.abandoned {
                debug!("dropping abandoned method {}", method.name);
            } else if let Err(e) = self.program.add_method(method) {
                warn!("{}", e);
            }
        }
    }

    fn push_statement(&mut self, statement: &str) {
        if self.skipping_block || self.abandoned {
            return;
        }
        if self.current.is_none() {
            debug!("ignoring statement outside any method: {}", statement);
            return;
        }
        match parser::parse_term(statement, Language::C, false) {
            Ok(term) => {
                if let Some(container) = self.container() {
                    container.push(term);
                }
            }
            Err(e) => {
                warn!("abandoning method after malformed statement: {}", e);
                self.abandoned = true;
            }
        }
    }

    /// Body of the innermost open container, if any.
    fn container(&mut self) -> Option<&mut Vec<Term>> {
        match self.stack.last_mut() {
            Some(block) => Some(block.body_mut()),
            None => self.current.as_mut().map(|m| &mut m.body),
        }
    }
}

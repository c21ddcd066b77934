//! Human-readable rendering of programs and query results.
//!
//! Every stored definition and every variable's resolved type appears in the
//! full rendering; the summary form is one line per definition.

use crate::program::{DefRef, ProgramRepresentation};
use crate::query::QueryResult;
use crate::term::{Term, Variable};

/// How much of a definition to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// One line: name, arity, return type.
    Summary,
    /// Arguments with resolved types, plus the nested body.
    Full,
}

/// A pretty-printer with indentation tracking.
pub struct Pretty {
    output: String,
    indent_level: usize,
}

impl Default for Pretty {
    fn default() -> Self {
        Self::new()
    }
}

impl Pretty {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn indent(&mut self) {
        for _ in 0..(self.indent_level * 2) {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn line(&mut self, s: &str) {
        self.indent();
        self.writeln(s);
    }

    fn inc_indent(&mut self) {
        self.indent_level += 1;
    }

    fn dec_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }
}

impl Pretty {
    pub fn representation(&mut self, repr: &ProgramRepresentation) {
        self.writeln(&format!(
            "{} ({} definitions)",
            repr.description(),
            repr.len()
        ));
        for def in repr.definitions() {
            self.definition(&def, Verbosity::Full);
        }
    }

    pub fn definition(&mut self, def: &DefRef, verbosity: Verbosity) {
        let mut header = format!("{} {}/{}", def.kind_name(), def.name(), def.arity());
        if let Some(return_type) = def.return_type() {
            header.push_str(&format!(" -> {}", return_type));
        }
        self.line(&header);
        if verbosity == Verbosity::Summary {
            return;
        }

        self.inc_indent();
        if !def.args().is_empty() {
            self.line("arguments:");
            self.inc_indent();
            for arg in def.args() {
                self.term(arg);
            }
            self.dec_indent();
        }
        if !def.body().is_empty() {
            self.line("body:");
            self.inc_indent();
            for term in def.body() {
                self.term(term);
            }
            self.dec_indent();
        }
        self.dec_indent();
    }

    pub fn term(&mut self, term: &Term) {
        match term {
            Term::Variable(v) => self.variable(v),
            Term::Function(f) => {
                self.line(&format!("function {}/{}", f.name, f.arity()));
                self.inc_indent();
                for arg in &f.args {
                    self.term(arg);
                }
                self.dec_indent();
            }
            Term::Operator(op) => {
                self.line(&format!(
                    "operator `{}` ({})",
                    op.name,
                    op.symbols.join(" ")
                ));
                self.inc_indent();
                for operand in &op.operands {
                    self.variable(operand);
                }
                self.dec_indent();
            }
            Term::Loop(l) => {
                self.line(&format!("loop `{}`", l.name));
                self.inc_indent();
                for t in &l.body {
                    self.term(t);
                }
                self.dec_indent();
            }
            Term::Conditional(c) => {
                self.line(&format!("conditional `{}`", c.name));
                self.inc_indent();
                for t in &c.body {
                    self.term(t);
                }
                self.dec_indent();
            }
        }
    }

    fn variable(&mut self, v: &Variable) {
        self.line(&format!("{}: {}", v.name, v.ty));
    }
}

/// Render the full program dump.
pub fn render_representation(repr: &ProgramRepresentation) -> String {
    let mut pretty = Pretty::new();
    pretty.representation(repr);
    pretty.finish()
}

/// Render a query result: the original query, both match lists, and a count.
pub fn render_result(result: &QueryResult) -> String {
    let mut pretty = Pretty::new();
    pretty.writeln(&format!("query: {}", result.query.trim()));

    pretty.writeln("fully matched definitions:");
    pretty.inc_indent();
    if result.matches.is_empty() {
        pretty.line("(none)");
    }
    for def in &result.matches {
        pretty.definition(def, Verbosity::Summary);
    }
    pretty.dec_indent();

    if !result.partial_matches.is_empty() {
        pretty.writeln("partially matched definitions:");
        pretty.inc_indent();
        for def in &result.partial_matches {
            pretty.definition(def, Verbosity::Summary);
        }
        pretty.dec_indent();
    }

    pretty.writeln(&format!(
        "{} match{}",
        result.matches.len(),
        if result.matches.len() == 1 { "" } else { "es" }
    ));
    pretty.finish()
}

//! Assembled program representation.
//!
//! The ordered definition list is the source of truth; the name map is a
//! non-authoritative fast path that keeps only the most recently added
//! definition per name. Once building ends the representation is read-only
//! and can back any number of query evaluations.

use indexmap::IndexMap;
use tracing::warn;

use crate::error::UnifyError;
use crate::term::{Method, Predicate, Term};
use crate::unify;
use crate::Language;

/// A borrowed view of one stored definition, either language.
#[derive(Clone, Copy, Debug)]
pub enum DefRef<'a> {
    Predicate(&'a Predicate),
    Method(&'a Method),
}

impl<'a> DefRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            DefRef::Predicate(p) => &p.name,
            DefRef::Method(m) => &m.name,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            DefRef::Predicate(p) => p.arity(),
            DefRef::Method(m) => m.arity(),
        }
    }

    pub fn args(&self) -> &'a [Term] {
        match self {
            DefRef::Predicate(p) => &p.args,
            DefRef::Method(m) => &m.args,
        }
    }

    pub fn body(&self) -> &'a [Term] {
        match self {
            DefRef::Predicate(p) => &p.body,
            DefRef::Method(m) => &m.body,
        }
    }

    /// Declared return type; predicates have none.
    pub fn return_type(&self) -> Option<&'a str> {
        match self {
            DefRef::Predicate(_) => None,
            DefRef::Method(m) => Some(&m.return_type),
        }
    }

    /// Target-kind keyword as used by the query language.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DefRef::Predicate(_) => "predicate",
            DefRef::Method(_) => "function",
        }
    }
}

/// A predicate-language program: ordered predicates plus a name fast path.
#[derive(Debug, Default)]
pub struct PrologProgram {
    predicates: Vec<Predicate>,
    index: IndexMap<String, usize>,
}

impl PrologProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unify the new predicate internally and against every stored
    /// definition of the same name, then append it.
    ///
    /// Same name with a different arity rejects the definition; type
    /// conflicts are logged and the first-seen type kept.
    pub fn add_predicate(&mut self, mut predicate: Predicate) -> Result<(), UnifyError> {
        if let Some(existing) = self.predicates.iter().find(|p| {
            p.name == predicate.name && p.arity() != predicate.arity()
        }) {
            return Err(UnifyError::RedefinedArity {
                existing: existing.arity(),
                new: predicate.arity(),
                name: predicate.name,
            });
        }

        let mut conflicts = unify::unify_variables(&mut predicate.args, &mut predicate.body);
        for existing in self
            .predicates
            .iter_mut()
            .filter(|p| p.name == predicate.name)
        {
            conflicts.extend(unify::unify_heads(&mut existing.args, &mut predicate.args));
            // Propagate refined head types back into both bodies.
            conflicts.extend(unify::unify_variables(
                &mut existing.args,
                &mut existing.body,
            ));
            conflicts.extend(unify::unify_variables(
                &mut predicate.args,
                &mut predicate.body,
            ));
        }
        report_conflicts(&predicate.name, predicate.arity(), &conflicts);

        self.index
            .insert(predicate.name.clone(), self.predicates.len());
        self.predicates.push(predicate);
        Ok(())
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Most recently added predicate with this name.
    pub fn lookup(&self, name: &str) -> Option<&Predicate> {
        self.index.get(name).and_then(|&i| self.predicates.get(i))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// A statement-language program: ordered methods plus a name fast path.
#[derive(Debug, Default)]
pub struct CProgram {
    methods: Vec<Method>,
    index: IndexMap<String, usize>,
}

impl CProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counterpart of [`PrologProgram::add_predicate`] for methods.
    pub fn add_method(&mut self, mut method: Method) -> Result<(), UnifyError> {
        if let Some(existing) = self
            .methods
            .iter()
            .find(|m| m.name == method.name && m.arity() != method.arity())
        {
            return Err(UnifyError::RedefinedArity {
                existing: existing.arity(),
                new: method.arity(),
                name: method.name,
            });
        }

        let mut conflicts = unify::unify_variables(&mut method.args, &mut method.body);
        for existing in self.methods.iter_mut().filter(|m| m.name == method.name) {
            conflicts.extend(unify::unify_heads(&mut existing.args, &mut method.args));
            conflicts.extend(unify::unify_variables(
                &mut existing.args,
                &mut existing.body,
            ));
            conflicts.extend(unify::unify_variables(&mut method.args, &mut method.body));
        }
        report_conflicts(&method.name, method.arity(), &conflicts);

        self.index.insert(method.name.clone(), self.methods.len());
        self.methods.push(method);
        Ok(())
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn lookup(&self, name: &str) -> Option<&Method> {
        self.index.get(name).and_then(|&i| self.methods.get(i))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

fn report_conflicts(name: &str, arity: usize, conflicts: &[UnifyError]) {
    for conflict in conflicts {
        warn!("in {}/{}: {}", name, arity, conflict);
    }
}

/// The full parsed program, tagged by source language.
#[derive(Debug)]
pub enum ProgramRepresentation {
    Prolog(PrologProgram),
    C(CProgram),
}

impl ProgramRepresentation {
    pub fn empty(language: Language) -> Self {
        match language {
            Language::Prolog => ProgramRepresentation::Prolog(PrologProgram::new()),
            Language::C => ProgramRepresentation::C(CProgram::new()),
        }
    }

    pub fn language(&self) -> Language {
        match self {
            ProgramRepresentation::Prolog(_) => Language::Prolog,
            ProgramRepresentation::C(_) => Language::C,
        }
    }

    /// One-line description of the representation kind.
    pub fn description(&self) -> &'static str {
        match self {
            ProgramRepresentation::Prolog(_) => {
                "Prolog program represented as a series of predicates"
            }
            ProgramRepresentation::C(_) => "C program represented as a series of functions",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ProgramRepresentation::Prolog(p) => p.len(),
            ProgramRepresentation::C(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored definition, in insertion order.
    pub fn definitions(&self) -> Vec<DefRef<'_>> {
        match self {
            ProgramRepresentation::Prolog(p) => {
                p.predicates().iter().map(DefRef::Predicate).collect()
            }
            ProgramRepresentation::C(c) => c.methods().iter().map(DefRef::Method).collect(),
        }
    }

    /// Most recently added definition with this name (fast path; arity
    /// overloads require scanning [`Self::definitions`]).
    pub fn lookup(&self, name: &str) -> Option<DefRef<'_>> {
        match self {
            ProgramRepresentation::Prolog(p) => p.lookup(name).map(DefRef::Predicate),
            ProgramRepresentation::C(c) => c.lookup(name).map(DefRef::Method),
        }
    }

    /// Human-readable dump of every definition and every resolved variable
    /// type.
    pub fn render(&self) -> String {
        crate::pretty::render_representation(self)
    }
}

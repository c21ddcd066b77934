//! Query evaluation against a program representation.

use crate::program::{DefRef, ProgramRepresentation};
use crate::term::Term;

use super::{Assertion, AssertionOp, Join, Query, Relation, TargetKind};

/// Evaluates parsed queries against one read-only representation.
pub struct QueryEngine<'a> {
    representation: &'a ProgramRepresentation,
}

/// Ordered matches for one query.
///
/// `matches` holds definitions whose assertion fold came out true, in
/// insertion order; `partial_matches` holds definitions where at least one
/// assertion held but the fold did not.
#[derive(Debug)]
pub struct QueryResult<'a> {
    pub query: String,
    pub matches: Vec<DefRef<'a>>,
    pub partial_matches: Vec<DefRef<'a>>,
}

impl QueryResult<'_> {
    pub fn render(&self) -> String {
        crate::pretty::render_result(self)
    }
}

impl<'a> QueryEngine<'a> {
    pub fn new(representation: &'a ProgramRepresentation) -> Self {
        Self { representation }
    }

    /// Evaluate every assertion independently per definition, then fold the
    /// boolean vector through the query's join relations.
    pub fn evaluate(&self, query: &Query) -> QueryResult<'a> {
        let mut matches = Vec::new();
        let mut partial_matches = Vec::new();

        for def in self.representation.definitions() {
            if !kind_matches(query.kind, &def) {
                continue;
            }
            if let Some(arity) = query.arity {
                if def.arity() != arity {
                    continue;
                }
            }

            let results: Vec<bool> = query
                .assertions
                .iter()
                .map(|a| check_assertion(a, &def))
                .collect();

            if fold_relations(&results, &query.relations) {
                matches.push(def);
            } else if results.iter().any(|&r| r) {
                partial_matches.push(def);
            }
        }

        QueryResult {
            query: query.text.clone(),
            matches,
            partial_matches,
        }
    }
}

fn kind_matches(kind: TargetKind, def: &DefRef) -> bool {
    match (kind, def) {
        (TargetKind::Predicate, DefRef::Predicate(_)) => true,
        (TargetKind::Function, DefRef::Method(_)) => true,
        _ => false,
    }
}

/// Fold assertion results through the declared relations; assertions not
/// referenced by any relation are implicitly ANDed in.
fn fold_relations(results: &[bool], relations: &[Relation]) -> bool {
    let mut referenced = vec![false; results.len()];
    let mut combined = true;

    for relation in relations {
        let left = results.get(relation.left).copied().unwrap_or(false);
        let right = results.get(relation.right).copied().unwrap_or(false);
        if let Some(r) = referenced.get_mut(relation.left) {
            *r = true;
        }
        if let Some(r) = referenced.get_mut(relation.right) {
            *r = true;
        }
        combined &= match relation.join {
            Join::And => left && right,
            Join::Or => left || right,
        };
    }

    for (result, seen) in results.iter().zip(&referenced) {
        if !seen {
            combined &= *result;
        }
    }
    combined
}

fn check_assertion(assertion: &Assertion, def: &DefRef) -> bool {
    match assertion.operator {
        AssertionOp::Inputs => check_inputs(&assertion.values, def.args()),
        AssertionOp::BodyContains => body_contains(&assertion.values, def.body()),
        AssertionOp::Returns => match def.return_type() {
            Some(return_type) => assertion
                .values
                .iter()
                .any(|v| type_name_matches(v, return_type)),
            None => false,
        },
    }
}

/// Positional comparison of expected values against actual arguments:
/// `func/<n>` matches a function argument of arity n, a bare type name
/// matches a variable's computed type, anything else fails the position.
fn check_inputs(values: &[String], args: &[Term]) -> bool {
    if values.len() != args.len() {
        return false;
    }
    values.iter().zip(args).all(|(value, arg)| match arg {
        Term::Function(f) => match value.strip_prefix("func/") {
            Some(arity_text) => arity_text.parse::<usize>() == Ok(f.arity()),
            None => false,
        },
        Term::Variable(v) => type_name_matches(value, &v.ty.to_string()),
        _ => false,
    })
}

/// True iff any body element, searched recursively through nested bodies,
/// has one of the requested term kinds.
fn body_contains(values: &[String], body: &[Term]) -> bool {
    body.iter().any(|term| term_matches(values, term))
}

fn term_matches(values: &[String], term: &Term) -> bool {
    if values.iter().any(|v| v == term.kind_name()) {
        return true;
    }
    match term {
        Term::Function(f) => body_contains(values, &f.args),
        Term::Loop(l) => body_contains(values, &l.body),
        Term::Conditional(c) => body_contains(values, &c.body),
        Term::Variable(_) | Term::Operator(_) => false,
    }
}

/// Query values are lowercased and space-free; compare declared types the
/// same way.
fn type_name_matches(value: &str, type_name: &str) -> bool {
    let normalized: String = type_name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    value == normalized
}

//! Variable type unification.
//!
//! Two passes, both driven by the pure [`refine`] rule:
//!
//! - within one definition, every same-named variable occurrence (head
//!   arguments and body, walked recursively) is folded to a single resolved
//!   type which is then written back to each occurrence;
//! - across definitions sharing a name, head argument positions are compared
//!   pairwise and refined on both sides.
//!
//! Conflicting concrete types are reported, never stored: the caller logs
//! them as warnings and the pre-conflict type is retained.

use indexmap::IndexMap;

use crate::error::UnifyError;
use crate::term::{self, Term, VarType, Variable};

/// Outcome of refining a current type against a candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Refinement {
    /// The candidate adds nothing.
    Unchanged,
    /// The current type should become this.
    Refined(VarType),
    /// Both sides are concrete and disagree.
    Conflict,
}

/// The unification rule for one pair of occurrences.
///
/// If either side is unknown, adopt the other; a generic `var` adopts any
/// concrete type; equal types are a no-op; differing concrete types conflict.
pub fn refine(current: &VarType, candidate: &VarType) -> Refinement {
    if current == candidate {
        return Refinement::Unchanged;
    }
    match (current, candidate) {
        (VarType::Unknown, other) => Refinement::Refined(other.clone()),
        (_, VarType::Unknown) => Refinement::Unchanged,
        (VarType::Var, other) => Refinement::Refined(other.clone()),
        (_, VarType::Var) => Refinement::Unchanged,
        _ => Refinement::Conflict,
    }
}

/// Unify every same-named variable occurrence across a definition's head
/// arguments and body. Returns the conflicts found; on conflict the
/// occurrence keeps its pre-conflict type.
pub fn unify_variables(args: &mut [Term], body: &mut [Term]) -> Vec<UnifyError> {
    let mut resolved: IndexMap<String, VarType> = IndexMap::new();
    let mut conflicts = Vec::new();

    {
        let mut record = |var: &Variable| {
            let entry = resolved
                .entry(var.name.clone())
                .or_insert(VarType::Unknown);
            match refine(entry, &var.ty) {
                Refinement::Refined(ty) => *entry = ty,
                Refinement::Unchanged => {}
                Refinement::Conflict => conflicts.push(UnifyError::ConflictingType {
                    variable: var.name.clone(),
                    existing: entry.clone(),
                    candidate: var.ty.clone(),
                }),
            }
        };
        term::visit_variables(args, &mut record);
        term::visit_variables(body, &mut record);
    }

    let mut write_back = |var: &mut Variable| {
        if let Some(ty) = resolved.get(&var.name) {
            if let Refinement::Refined(t) = refine(&var.ty, ty) {
                var.ty = t;
            }
        }
    };
    term::visit_variables_mut(args, &mut write_back);
    term::visit_variables_mut(body, &mut write_back);

    conflicts
}

/// Unify head argument types positionally between two same-name, same-arity
/// definitions. A function argument on one side forces the other side's
/// variable to `func`; variable pairs refine both ways.
pub fn unify_heads(existing: &mut [Term], new: &mut [Term]) -> Vec<UnifyError> {
    let mut conflicts = Vec::new();

    for (a, b) in existing.iter_mut().zip(new.iter_mut()) {
        match (a, b) {
            (Term::Function(_), Term::Variable(v)) | (Term::Variable(v), Term::Function(_)) => {
                apply(v, &VarType::Func, &mut conflicts);
            }
            (Term::Variable(va), Term::Variable(vb)) => {
                let ty_a = va.ty.clone();
                let ty_b = vb.ty.clone();
                apply(va, &ty_b, &mut conflicts);
                apply(vb, &ty_a, &mut conflicts);
            }
            _ => {}
        }
    }

    conflicts
}

fn apply(var: &mut Variable, candidate: &VarType, conflicts: &mut Vec<UnifyError>) {
    match refine(&var.ty, candidate) {
        Refinement::Refined(ty) => var.ty = ty,
        Refinement::Unchanged => {}
        Refinement::Conflict => conflicts.push(UnifyError::ConflictingType {
            variable: var.name.clone(),
            existing: var.ty.clone(),
            candidate: candidate.clone(),
        }),
    }
}

//! Term model for parsed programs.
//!
//! Every syntactic unit the parsers produce is a [`Term`]: a variable, a
//! function application, an infix operator expression, or (statement language
//! only) a loop or conditional block. Top-level definitions are [`Predicate`]
//! (predicate language) and [`Method`] (statement language); both carry an
//! argument list and an ordered body of nested terms.
//!
//! Terms are immutable after parsing with one exception: the computed type of
//! a [`Variable`] is refined in place during the unification phase (see
//! `unify`), and never touched afterward.

use std::fmt;

/// Computed semantic type of a variable occurrence.
///
/// `Unknown` is the initial state; it is refined, never silently overwritten,
/// by unification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VarType {
    /// Nothing known yet.
    Unknown,
    /// Lowercase-leading literal in the predicate language.
    Atom,
    /// `[`-leading literal.
    List,
    /// Digit-leading literal.
    Scalar,
    /// Uppercase-leading: unbound, but consistently named.
    Var,
    /// Bound to a function result through a head position.
    Func,
    /// Explicit declared type from the statement language (`int`, `char*`, ...).
    Declared(String),
}

impl VarType {
    /// A concrete type cannot be refined further, only conflicted with.
    pub fn is_concrete(&self) -> bool {
        !matches!(self, VarType::Unknown | VarType::Var)
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Unknown => write!(f, "unknown"),
            VarType::Atom => write!(f, "atom"),
            VarType::List => write!(f, "list"),
            VarType::Scalar => write!(f, "scalar"),
            VarType::Var => write!(f, "var"),
            VarType::Func => write!(f, "func"),
            VarType::Declared(name) => write!(f, "{}", name),
        }
    }
}

/// A leaf term: a name and its computed type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub ty: VarType,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: VarType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// An interior term: a named application over an ordered argument list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub args: Vec<Term>,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// An infix relation between operand variables.
///
/// `symbols` is the set of operator tokens found in the literal (e.g. `is`,
/// `+`, `=`); `operands` are the pieces between the symbolic tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    pub name: String,
    pub symbols: Vec<String>,
    pub operands: Vec<Variable>,
}

/// A `for`/`while`/`do` block with its nested statement body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loop {
    pub name: String,
    pub body: Vec<Term>,
}

/// An `if`/`else if`/`else` block with its nested statement body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conditional {
    pub name: String,
    pub body: Vec<Term>,
}

/// Any parsed syntactic unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Term {
    Variable(Variable),
    Function(Function),
    Operator(Operator),
    Loop(Loop),
    Conditional(Conditional),
}

impl Term {
    /// Textual head symbol of the term.
    pub fn name(&self) -> &str {
        match self {
            Term::Variable(v) => &v.name,
            Term::Function(f) => &f.name,
            Term::Operator(o) => &o.name,
            Term::Loop(l) => &l.name,
            Term::Conditional(c) => &c.name,
        }
    }

    /// Kind keyword as used by `bodycontains` queries and rendering.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Variable(_) => "variable",
            Term::Function(_) => "function",
            Term::Operator(_) => "operator",
            Term::Loop(_) => "loop",
            Term::Conditional(_) => "conditional",
        }
    }

    /// Visit every variable occurrence in this term, recursively.
    pub fn visit_variables<'a>(&'a self, f: &mut impl FnMut(&'a Variable)) {
        match self {
            Term::Variable(v) => f(v),
            Term::Function(func) => visit_variables(&func.args, f),
            Term::Operator(op) => {
                for v in &op.operands {
                    f(v);
                }
            }
            Term::Loop(l) => visit_variables(&l.body, f),
            Term::Conditional(c) => visit_variables(&c.body, f),
        }
    }

    /// Visit every variable occurrence mutably, recursively.
    pub fn visit_variables_mut(&mut self, f: &mut impl FnMut(&mut Variable)) {
        match self {
            Term::Variable(v) => f(v),
            Term::Function(func) => visit_variables_mut(&mut func.args, f),
            Term::Operator(op) => {
                for v in &mut op.operands {
                    f(v);
                }
            }
            Term::Loop(l) => visit_variables_mut(&mut l.body, f),
            Term::Conditional(c) => visit_variables_mut(&mut c.body, f),
        }
    }
}

/// Visit every variable occurrence in a term slice, recursively.
pub fn visit_variables<'a>(terms: &'a [Term], f: &mut impl FnMut(&'a Variable)) {
    for term in terms {
        term.visit_variables(f);
    }
}

/// Visit every variable occurrence in a term slice mutably, recursively.
pub fn visit_variables_mut(terms: &mut [Term], f: &mut impl FnMut(&mut Variable)) {
    for term in terms {
        term.visit_variables_mut(f);
    }
}

/// A top-level predicate-language definition: head arguments plus an ordered
/// clause body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub name: String,
    pub args: Vec<Term>,
    pub body: Vec<Term>,
}

impl Predicate {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

/// A top-level statement-language definition: declared return type, argument
/// list, and an ordered statement body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub return_type: String,
    pub args: Vec<Term>,
    pub body: Vec<Term>,
}

impl Method {
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

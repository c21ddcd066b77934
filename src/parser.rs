//! Term parser for the clause and statement languages.
//!
//! There is no tokenizer. The grammar is whitespace-insensitive at the term
//! level, so parsing strips all whitespace first and then works character by
//! character. Correctness hinges on the paren-depth-aware comma split: a
//! comma separates arguments only at depth 0, which is what lets a nested
//! call like `foo(bar(X,Y),Z)` split into two arguments instead of three.

use crate::error::ParseError;
use crate::term::{Function, Operator, Term, VarType, Variable};
use crate::Language;

/// Relational/arithmetic operator tokens of the predicate language.
/// Longest-first, so `\+`/`\=` match before `+`/`=`.
pub const PROLOG_OPERATORS: &[&str] = &["\\+", "\\=", "is", "+", "-", "="];

/// Operator tokens of the statement language.
pub const C_OPERATORS: &[&str] = &["+", "-", "="];

/// Operator token table for a language.
pub fn operator_table(language: Language) -> &'static [&'static str] {
    match language {
        Language::Prolog => PROLOG_OPERATORS,
        Language::C => C_OPERATORS,
    }
}

/// Parse one logical unit of source text into a term.
///
/// With `as_head` set the text is a definition head: the result is always a
/// [`Function`] (a bare name parses as a zero-arity head) and leaf
/// classification is skipped. Otherwise the text is classified as a nested
/// function call, an operator expression, or a variable.
pub fn parse_term(text: &str, language: Language, as_head: bool) -> Result<Term, ParseError> {
    let stripped = strip_whitespace(text);
    if stripped.is_empty() {
        return Err(ParseError::EmptyTerm);
    }
    check_balanced(&stripped)?;

    if stripped.contains('(') && stripped.contains(')') {
        let open = stripped.find('(').unwrap_or(0);
        let close = stripped.rfind(')').unwrap_or(stripped.len());
        let name = stripped[..open].to_string();
        if name.is_empty() {
            return Err(ParseError::EmptyOperand { text: stripped });
        }

        let pieces = split_depth0(&stripped[open + 1..close], ',');
        let mut args = Vec::new();
        for piece in &pieces {
            if piece.is_empty() {
                return Err(ParseError::EmptyOperand { text: stripped });
            }
            args.push(parse_term(piece, language, false)?);
        }

        Ok(Term::Function(Function { name, args }))
    } else if as_head {
        // A fact with no arguments: `happy.`
        Ok(Term::Function(Function {
            name: stripped,
            args: Vec::new(),
        }))
    } else {
        classify_leaf(&stripped, language)
    }
}

/// Parse a definition head into its name and argument terms.
pub fn parse_head(text: &str, language: Language) -> Result<Function, ParseError> {
    match parse_term(text, language, true)? {
        Term::Function(f) => Ok(f),
        // parse_term with as_head set only produces functions
        _ => Err(ParseError::EmptyTerm),
    }
}

/// Parse a statement-language definition head, where whitespace is
/// significant: `int check(int id, struct list* l)` yields the return type,
/// the name, and `Declared`-typed argument variables.
pub fn parse_method_head(text: &str) -> Result<(String, String, Vec<Term>), ParseError> {
    let trimmed = text.trim();
    check_balanced(trimmed)?;

    let open = trimmed.find('(').ok_or_else(|| ParseError::BadMethodHead {
        text: trimmed.to_string(),
    })?;
    let close = trimmed.rfind(')').ok_or_else(|| ParseError::BadMethodHead {
        text: trimmed.to_string(),
    })?;

    let (return_type, name) = split_declaration(&trimmed[..open])?;

    let inner = trimmed[open + 1..close].trim();
    let mut args = Vec::new();
    if !inner.is_empty() && inner != "void" {
        for piece in split_depth0(inner, ',') {
            if piece.trim().is_empty() {
                return Err(ParseError::EmptyOperand {
                    text: trimmed.to_string(),
                });
            }
            let (ty, arg_name) = split_declaration(&piece)?;
            args.push(Term::Variable(Variable::new(arg_name, VarType::Declared(ty))));
        }
    }

    Ok((return_type, name, args))
}

/// Lexical type seed for a leaf, from its first character only. Refined by
/// unification later.
pub fn lexical_seed(text: &str) -> VarType {
    match text.chars().next() {
        Some(c) if c.is_lowercase() => VarType::Atom,
        Some('[') => VarType::List,
        Some(c) if c.is_ascii_digit() => VarType::Scalar,
        Some(c) if c.is_uppercase() => VarType::Var,
        _ => VarType::Unknown,
    }
}

/// Split `text` at `separator`, but only where the paren depth is zero.
pub fn split_depth0(text: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in text.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            c if c == separator && depth == 0 => {
                pieces.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    pieces.push(current);
    pieces
}

/// Reject text whose paren depth goes negative or does not return to zero.
pub fn check_balanced(text: &str) -> Result<(), ParseError> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ParseError::UnbalancedParens {
                        text: text.to_string(),
                        offset: i,
                    });
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedParens {
            text: text.to_string(),
            offset: text.len().saturating_sub(1),
        });
    }
    Ok(())
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Classify a paren-free leaf as an operator expression or a variable.
fn classify_leaf(text: &str, language: Language) -> Result<Term, ParseError> {
    let table = operator_table(language);
    let symbols = find_symbols(text, table);
    if symbols.is_empty() {
        return Ok(Term::Variable(Variable::new(text, lexical_seed(text))));
    }

    // Operands split at the symbolic tokens only. The word token `is` joins
    // the symbols set but never splits: after whitespace stripping it is
    // indistinguishable from the letters of an identifier such as `List`.
    let pieces = split_operands(text, table);
    if pieces.len() == 1 {
        return Ok(Term::Variable(Variable::new(text, lexical_seed(text))));
    }
    if pieces.iter().any(|p| p.is_empty()) {
        return Err(ParseError::EmptyOperand {
            text: text.to_string(),
        });
    }

    let operands = pieces
        .iter()
        .map(|p| Variable::new(p.as_str(), lexical_seed(p)))
        .collect();

    Ok(Term::Operator(Operator {
        name: text.to_string(),
        symbols,
        operands,
    }))
}

/// Every operator token of the table occurring anywhere in the literal.
fn find_symbols(text: &str, table: &[&str]) -> Vec<String> {
    table
        .iter()
        .filter(|tok| text.contains(**tok))
        .map(|tok| tok.to_string())
        .collect()
}

/// Split at symbolic operator occurrences, longest token first.
fn split_operands(text: &str, table: &[&str]) -> Vec<String> {
    let symbolic: Vec<&str> = table
        .iter()
        .filter(|tok| !tok.chars().all(|c| c.is_ascii_alphabetic()))
        .copied()
        .collect();

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if let Some(tok) = symbolic.iter().find(|t| rest.starts_with(**t)) {
            pieces.push(std::mem::take(&mut current));
            i += tok.len();
        } else if let Some(c) = rest.chars().next() {
            current.push(c);
            i += c.len_utf8();
        } else {
            break;
        }
    }
    pieces.push(current);
    pieces
}

/// Split a C declaration like `struct student_list* list` into its declared
/// type and the declared name (the trailing identifier run).
fn split_declaration(text: &str) -> Result<(String, String), ParseError> {
    let trimmed = text.trim();
    let boundary = trimmed
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .ok_or_else(|| ParseError::BadMethodHead {
            text: trimmed.to_string(),
        })?;

    let name = &trimmed[boundary + 1..];
    let ty: String = trimmed[..=boundary]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() || ty.is_empty() {
        return Err(ParseError::BadMethodHead {
            text: trimmed.to_string(),
        });
    }

    Ok((ty, name.to_string()))
}

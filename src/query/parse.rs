//! Query language parser.
//!
//! Grammar: `find <kind>[/<arity>] [where <assertions>].` where assertions
//! are `<operator>:<value>[,<value>...]` joined by `and`/`or`.

use crate::error::QueryError;

use super::{Assertion, AssertionOp, Join, Query, Relation, TargetKind};

/// Parse a free-text query. The text must end in `.`.
pub fn parse_query(text: &str) -> Result<Query, QueryError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_suffix('.')
        .ok_or(QueryError::MissingTerminator)?;
    let lowered = body.to_lowercase();

    let mut words = lowered.split_whitespace();
    if words.next() != Some("find") {
        return Err(QueryError::MissingFind);
    }
    let target = words.next().ok_or(QueryError::MissingTarget)?;
    let (kind, arity) = parse_target(target)?;

    let rest: Vec<&str> = words.collect();
    let (assertions, relations) = if rest.is_empty() {
        (Vec::new(), Vec::new())
    } else {
        if rest[0] != "where" {
            return Err(QueryError::ExpectedWhere(rest[0].to_string()));
        }
        if rest.len() == 1 {
            return Err(QueryError::EmptyWhere);
        }
        parse_assertions(&rest[1..].join(" "))?
    };

    Ok(Query {
        text: trimmed.to_string(),
        kind,
        arity,
        assertions,
        relations,
    })
}

fn parse_target(target: &str) -> Result<(TargetKind, Option<usize>), QueryError> {
    let (base, arity) = match target.split_once('/') {
        Some((base, arity_text)) => {
            let arity = arity_text
                .parse::<usize>()
                .map_err(|_| QueryError::BadArity(arity_text.to_string()))?;
            (base, Some(arity))
        }
        None => (target, None),
    };

    let kind = match base {
        "predicate" => TargetKind::Predicate,
        "function" => TargetKind::Function,
        other => return Err(QueryError::UnknownTarget(other.to_string())),
    };
    Ok((kind, arity))
}

// The query text is lowercased before substitution, so a single uppercase
// character is a safe sentinel for each join keyword.
const AND_SENTINEL: char = 'A';
const OR_SENTINEL: char = 'O';

fn parse_assertions(text: &str) -> Result<(Vec<Assertion>, Vec<Relation>), QueryError> {
    let substituted = format!(" {} ", text)
        .replace(" and ", &AND_SENTINEL.to_string())
        .replace(" or ", &OR_SENTINEL.to_string())
        .replace(' ', "");

    let mut assertions = Vec::new();
    let mut relations = Vec::new();
    parse_group(&substituted, &mut assertions, &mut relations)?;
    Ok((assertions, relations))
}

/// Split one group at depth-0 sentinels; parenthesized sub-groups recurse
/// and are joined to their neighbors at their boundary assertions.
fn parse_group(
    text: &str,
    assertions: &mut Vec<Assertion>,
    relations: &mut Vec<Relation>,
) -> Result<(), QueryError> {
    let mut pieces = Vec::new();
    let mut joins = Vec::new();
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
                if depth < 0 {
                    return Err(QueryError::UnbalancedParens);
                }
                current.push(c);
            }
            AND_SENTINEL if depth == 0 => {
                pieces.push(std::mem::take(&mut current));
                joins.push(Join::And);
            }
            OR_SENTINEL if depth == 0 => {
                pieces.push(std::mem::take(&mut current));
                joins.push(Join::Or);
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(QueryError::UnbalancedParens);
    }
    pieces.push(current);

    // First and last assertion index contributed by each piece.
    let mut spans = Vec::new();
    for piece in &pieces {
        if piece.is_empty() {
            return Err(QueryError::MalformedAssertion(piece.clone()));
        }
        if piece.starts_with('(') && piece.ends_with(')') {
            let before = assertions.len();
            parse_group(&piece[1..piece.len() - 1], assertions, relations)?;
            if assertions.len() == before {
                return Err(QueryError::MalformedAssertion(piece.clone()));
            }
            spans.push((before, assertions.len() - 1));
        } else {
            let index = assertions.len();
            assertions.push(parse_assertion(piece)?);
            spans.push((index, index));
        }
    }

    for (i, join) in joins.into_iter().enumerate() {
        relations.push(Relation {
            join,
            left: spans[i].1,
            right: spans[i + 1].0,
        });
    }
    Ok(())
}

fn parse_assertion(text: &str) -> Result<Assertion, QueryError> {
    let (operator_text, values_text) = text
        .split_once(':')
        .ok_or_else(|| QueryError::MalformedAssertion(text.to_string()))?;

    let operator = match operator_text {
        "inputs" => AssertionOp::Inputs,
        "bodycontains" => AssertionOp::BodyContains,
        "returns" => AssertionOp::Returns,
        other => return Err(QueryError::UnknownOperator(other.to_string())),
    };

    let values: Vec<String> = values_text.split(',').map(str::to_string).collect();
    if values.iter().any(|v| v.is_empty()) {
        return Err(QueryError::MalformedAssertion(text.to_string()));
    }

    Ok(Assertion { operator, values })
}

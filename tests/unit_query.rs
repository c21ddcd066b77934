//! Unit tests for the query language parser and evaluator

use sembrowse::builder::parse_source;
use sembrowse::error::QueryError;
use sembrowse::program::ProgramRepresentation;
use sembrowse::query::{parse_query, AssertionOp, Join, QueryEngine, Relation, TargetKind};
use sembrowse::Language;

fn evaluate<'a>(repr: &'a ProgramRepresentation, text: &str) -> Vec<String> {
    let query = parse_query(text).unwrap();
    QueryEngine::new(repr)
        .evaluate(&query)
        .matches
        .iter()
        .map(|d| format!("{}/{}", d.name(), d.arity()))
        .collect()
}

fn family() -> ProgramRepresentation {
    parse_source(
        "\
parent(tom, bob).
parent(tom, liz).
grandparent(X,Z) :- parent(X,Y), parent(Y,Z).
",
        Language::Prolog,
    )
}

// ============================================================================
// Query parsing
// ============================================================================

#[test]
fn test_parse_bare_query() {
    let query = parse_query("find predicate.").unwrap();
    assert_eq!(query.kind, TargetKind::Predicate);
    assert_eq!(query.arity, None);
    assert!(query.assertions.is_empty());
    assert!(query.relations.is_empty());
}

#[test]
fn test_parse_arity_constraint() {
    let query = parse_query("find function/3.").unwrap();
    assert_eq!(query.kind, TargetKind::Function);
    assert_eq!(query.arity, Some(3));
}

#[test]
fn test_parse_assertions_and_joins() {
    let query =
        parse_query("find predicate/2 where inputs:atom,var and bodycontains:loop or returns:int.")
            .unwrap();
    assert_eq!(query.assertions.len(), 3);
    assert_eq!(query.assertions[0].operator, AssertionOp::Inputs);
    assert_eq!(query.assertions[0].values, vec!["atom", "var"]);
    assert_eq!(query.assertions[1].operator, AssertionOp::BodyContains);
    assert_eq!(query.assertions[2].operator, AssertionOp::Returns);
    assert_eq!(
        query.relations,
        vec![
            Relation {
                join: Join::And,
                left: 0,
                right: 1
            },
            Relation {
                join: Join::Or,
                left: 1,
                right: 2
            },
        ]
    );
}

#[test]
fn test_parse_keeps_parenthesized_groups_whole() {
    let query = parse_query(
        "find predicate where inputs:atom and (bodycontains:loop or bodycontains:conditional).",
    )
    .unwrap();
    assert_eq!(query.assertions.len(), 3);
    assert!(query.relations.contains(&Relation {
        join: Join::Or,
        left: 1,
        right: 2
    }));
    assert!(query.relations.contains(&Relation {
        join: Join::And,
        left: 0,
        right: 1
    }));
}

#[test]
fn test_parse_query_is_case_and_space_insensitive() {
    let query = parse_query("  FIND   Predicate/2   WHERE  inputs: atom , var .").unwrap();
    assert_eq!(query.arity, Some(2));
    assert_eq!(query.assertions[0].values, vec!["atom", "var"]);
}

// ============================================================================
// Query parse errors
// ============================================================================

#[test]
fn test_missing_find_is_invalid() {
    assert_eq!(
        parse_query("predicate/2."),
        Err(QueryError::MissingFind)
    );
}

#[test]
fn test_missing_terminator_is_invalid() {
    assert_eq!(
        parse_query("find predicate/2"),
        Err(QueryError::MissingTerminator)
    );
}

#[test]
fn test_unknown_target_is_invalid() {
    assert!(matches!(
        parse_query("find widget."),
        Err(QueryError::UnknownTarget(_))
    ));
}

#[test]
fn test_bad_arity_is_invalid() {
    assert!(matches!(
        parse_query("find predicate/x."),
        Err(QueryError::BadArity(_))
    ));
}

#[test]
fn test_missing_where_keyword_is_invalid() {
    assert!(matches!(
        parse_query("find predicate with inputs:atom."),
        Err(QueryError::ExpectedWhere(_))
    ));
    assert_eq!(
        parse_query("find predicate where."),
        Err(QueryError::EmptyWhere)
    );
}

#[test]
fn test_unknown_operator_is_invalid() {
    assert!(matches!(
        parse_query("find predicate where magic:x."),
        Err(QueryError::UnknownOperator(_))
    ));
}

#[test]
fn test_malformed_assertion_is_invalid() {
    assert!(matches!(
        parse_query("find predicate where inputs."),
        Err(QueryError::MalformedAssertion(_))
    ));
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_unconstrained_query_returns_all_in_order() {
    let repr = family();
    assert_eq!(
        evaluate(&repr, "find predicate."),
        vec!["parent/2", "parent/2", "grandparent/2"]
    );
}

#[test]
fn test_arity_constraint_filters() {
    let repr = parse_source("a(x).\nb(x,y).\nc(x,y).\n", Language::Prolog);
    assert_eq!(evaluate(&repr, "find predicate/2."), vec!["b/2", "c/2"]);
}

#[test]
fn test_query_is_idempotent() {
    let repr = family();
    let first = evaluate(&repr, "find predicate/2 where inputs:atom,atom.");
    let second = evaluate(&repr, "find predicate/2 where inputs:atom,atom.");
    assert_eq!(first, second);
}

#[test]
fn test_inputs_matches_computed_types() {
    let repr = parse_source(
        "\
foo(X,Y) :- bar(X), baz(Y,5).
foo(a,Z) :- qux(Z).
",
        Language::Prolog,
    );
    // Cross-clause unification fixed position 0 to atom in both clauses;
    // position 1 is unresolved in both.
    assert_eq!(
        evaluate(&repr, "find predicate/2 where inputs:atom,var."),
        vec!["foo/2", "foo/2"]
    );
}

#[test]
fn test_inputs_matches_function_arguments_by_arity() {
    let repr = parse_source("p(f(X,Y)).\nq(a).\n", Language::Prolog);
    assert_eq!(
        evaluate(&repr, "find predicate/1 where inputs:func/2."),
        vec!["p/1"]
    );
    // A bare type name never matches a function argument.
    assert!(evaluate(&repr, "find predicate/1 where inputs:func.")
        .iter()
        .all(|name| name != "p/1"));
}

#[test]
fn test_inputs_length_mismatch_fails() {
    let repr = family();
    assert!(evaluate(&repr, "find predicate/2 where inputs:atom.").is_empty());
}

#[test]
fn test_single_assertion_still_gates() {
    // One assertion, no relations: the assertion must still hold.
    let repr = family();
    assert!(evaluate(&repr, "find predicate/2 where bodycontains:loop.").is_empty());
}

#[test]
fn test_or_join_recovers_failed_assertion() {
    let repr = parse_source("foo(X) :- bar(X).\n", Language::Prolog);
    assert!(evaluate(
        &repr,
        "find predicate/1 where bodycontains:loop and bodycontains:function."
    )
    .is_empty());
    assert_eq!(
        evaluate(
            &repr,
            "find predicate/1 where bodycontains:loop or bodycontains:function."
        ),
        vec!["foo/1"]
    );
}

#[test]
fn test_partial_matches_are_tracked() {
    let repr = parse_source("foo(X) :- bar(X).\n", Language::Prolog);
    let query =
        parse_query("find predicate/1 where bodycontains:loop and bodycontains:function.").unwrap();
    let result = QueryEngine::new(&repr).evaluate(&query);
    assert!(result.matches.is_empty());
    assert_eq!(result.partial_matches.len(), 1);
}

#[test]
fn test_returns_fails_for_predicates() {
    let repr = family();
    assert!(evaluate(&repr, "find predicate/2 where returns:int.").is_empty());
}

#[test]
fn test_bodycontains_searches_nested_blocks() {
    let repr = parse_source(
        "\
int count_matches(int id){
	int total = 0;
	if(id > 0){
		while(id > total){
			total = total + 1;
		}
	}
	return total;
}
",
        Language::C,
    );
    // The loop sits inside a conditional; the search recurses.
    assert_eq!(
        evaluate(&repr, "find function/1 where bodycontains:loop."),
        vec!["count_matches/1"]
    );
    assert_eq!(
        evaluate(&repr, "find function/1 where bodycontains:conditional."),
        vec!["count_matches/1"]
    );
}

#[test]
fn test_returns_matches_declared_type() {
    let repr = parse_source(
        "\
int get_total(int id){
	return id;
}
float get_rate(int id){
	return rate;
}
",
        Language::C,
    );
    assert_eq!(
        evaluate(&repr, "find function/1 where returns:int."),
        vec!["get_total/1"]
    );
    assert_eq!(
        evaluate(&repr, "find function/1 where returns:int,float."),
        vec!["get_total/1", "get_rate/1"]
    );
}

#[test]
fn test_inputs_matches_declared_c_types() {
    let repr = parse_source(
        "\
int search(struct student_list* list, int id){
	return id;
}
",
        Language::C,
    );
    assert_eq!(
        evaluate(
            &repr,
            "find function/2 where inputs:structstudent_list*,int."
        ),
        vec!["search/2"]
    );
}

#[test]
fn test_kind_must_match_language() {
    let repr = family();
    assert!(evaluate(&repr, "find function.").is_empty());
}

// ============================================================================
// Result rendering
// ============================================================================

#[test]
fn test_result_render_contains_query_and_count() {
    let repr = family();
    let query = parse_query("find predicate/2.").unwrap();
    let result = QueryEngine::new(&repr).evaluate(&query);
    let rendered = result.render();
    assert!(rendered.contains("find predicate/2."));
    assert!(rendered.contains("3 matches"));
    assert!(rendered.contains("grandparent/2"));
}

//! Unit tests for clause/block assembly and file discovery

use std::fs;

use sembrowse::builder::parse_source;
use sembrowse::discover::discover_sources;
use sembrowse::error::DiscoverError;
use sembrowse::term::{Term, VarType};
use sembrowse::{parse_path, Language};

// ============================================================================
// Predicate language
// ============================================================================

#[test]
fn test_parse_facts_and_clauses() {
    let source = "\
parent(tom, bob).
parent(bob, ann).
grandparent(X,Z) :- parent(X,Y), parent(Y,Z).
";
    let repr = parse_source(source, Language::Prolog);
    assert_eq!(repr.len(), 3);

    let defs = repr.definitions();
    assert_eq!(defs[0].name(), "parent");
    assert_eq!(defs[1].name(), "parent");
    assert_eq!(defs[2].name(), "grandparent");
    assert_eq!(defs[2].arity(), 2);
    assert_eq!(defs[2].body().len(), 2);
}

#[test]
fn test_parse_multi_line_clause() {
    let source = "\
grandparent(X,Z) :-
    parent(X,Y),
    parent(Y,Z).
";
    let repr = parse_source(source, Language::Prolog);
    assert_eq!(repr.len(), 1);
    let defs = repr.definitions();
    assert_eq!(defs[0].body().len(), 2);
    assert!(matches!(defs[0].body()[0], Term::Function(_)));
}

#[test]
fn test_zero_arity_fact() {
    let repr = parse_source("halt.\n", Language::Prolog);
    assert_eq!(repr.len(), 1);
    assert_eq!(repr.definitions()[0].arity(), 0);
}

#[test]
fn test_malformed_fact_does_not_abort_unit() {
    let source = "\
good(a).
bad(foo(.
more(b).
";
    let repr = parse_source(source, Language::Prolog);
    assert_eq!(repr.len(), 2);
    assert_eq!(repr.definitions()[0].name(), "good");
    assert_eq!(repr.definitions()[1].name(), "more");
}

#[test]
fn test_malformed_clause_is_skipped_to_terminator() {
    let source = "\
p(X) :-
    q(X)),
    r(X).
s(a).
";
    let repr = parse_source(source, Language::Prolog);
    assert_eq!(repr.len(), 1);
    assert_eq!(repr.definitions()[0].name(), "s");
}

#[test]
fn test_redefined_arity_is_rejected() {
    let source = "\
foo(a).
foo(a,b).
";
    let repr = parse_source(source, Language::Prolog);
    assert_eq!(repr.len(), 1);
    assert_eq!(repr.definitions()[0].arity(), 1);
}

#[test]
fn test_name_index_points_at_latest_definition() {
    let source = "\
foo(a).
foo(b).
bar(c).
";
    let repr = parse_source(source, Language::Prolog);
    assert_eq!(repr.len(), 3);

    // The fast path resolves to the most recently added `foo`; the ordered
    // list keeps both.
    let latest = repr.lookup("foo").unwrap();
    match latest.args()[0] {
        Term::Variable(ref v) => assert_eq!(v.name, "b"),
        _ => panic!("expected variable argument"),
    }
}

// ============================================================================
// Statement language
// ============================================================================

#[test]
fn test_parse_method_with_nested_blocks() {
    let source = "\
int check_id(int id, struct student_list* list){
	struct student_records* current_link = list->head;
	int id_found = 0;
	if(list->num_of_students>0){
		while(current_link != NULL){
			if(current_link->student->id==id){
				id_found = 1;
			}
			current_link = current_link->previous;
		}
	}
	return id_found;
}
";
    let repr = parse_source(source, Language::C);
    assert_eq!(repr.len(), 1);

    let defs = repr.definitions();
    assert_eq!(defs[0].name(), "check_id");
    assert_eq!(defs[0].arity(), 2);
    assert_eq!(defs[0].return_type(), Some("int"));

    // The `if` block is a direct body member; the `while` nests inside it.
    let conditional = defs[0]
        .body()
        .iter()
        .find_map(|t| match t {
            Term::Conditional(c) => Some(c),
            _ => None,
        })
        .expect("expected a conditional in the body");
    assert!(conditional
        .body
        .iter()
        .any(|t| matches!(t, Term::Loop(_))));
}

#[test]
fn test_parse_else_on_close_line() {
    let source = "\
void fix_name(char* name){
	if(name != start){
		upper = 1;
	} else {
		upper = 0;
	}
}
";
    let repr = parse_source(source, Language::C);
    let defs = repr.definitions();
    let kinds: Vec<&str> = defs[0].body().iter().map(|t| t.kind_name()).collect();
    assert_eq!(kinds, vec!["conditional", "conditional"]);
    assert_eq!(defs[0].body()[1].name(), "else");
}

#[test]
fn test_parse_do_while_loop() {
    let source = "\
int scan(int limit){
	int count = 0;
	do{
		count = count + 1;
	}while(count < limit);
	return count;
}
";
    let repr = parse_source(source, Language::C);
    let defs = repr.definitions();
    let type_of_loop = defs[0]
        .body()
        .iter()
        .find_map(|t| match t {
            Term::Loop(l) => Some(l.name.as_str()),
            _ => None,
        })
        .expect("expected a loop in the body");
    assert_eq!(type_of_loop, "do");
}

#[test]
fn test_struct_definitions_are_skipped() {
    let source = "\
struct point{
	int x;
	int y;
};

int origin_x(struct point* p){
	return 0;
}
";
    let repr = parse_source(source, Language::C);
    assert_eq!(repr.len(), 1);
    assert_eq!(repr.definitions()[0].name(), "origin_x");
}

#[test]
fn test_comments_and_preprocessor_lines_are_ignored() {
    let source = "\
#include <stdio.h>
//finds a student by id
int find_student(int id){
	return id;
}
";
    let repr = parse_source(source, Language::C);
    assert_eq!(repr.len(), 1);
}

#[test]
fn test_method_args_carry_declared_types() {
    let source = "\
float average(int total, int count){
	return result;
}
";
    let repr = parse_source(source, Language::C);
    let defs = repr.definitions();
    match &defs[0].args()[0] {
        Term::Variable(v) => {
            assert_eq!(v.name, "total");
            assert_eq!(v.ty, VarType::Declared("int".to_string()));
        }
        _ => panic!("expected variable argument"),
    }
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_discover_missing_path_is_fatal() {
    let err = discover_sources(std::path::Path::new("/no/such/path"), Language::Prolog)
        .unwrap_err();
    assert!(matches!(err, DiscoverError::PathNotFound(_)));
}

#[test]
fn test_discover_filters_and_orders_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.pl"), "b(x).\n").unwrap();
    fs::write(dir.path().join("a.pl"), "a(x).\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not source\n").unwrap();

    let sources = discover_sources(dir.path(), Language::Prolog).unwrap();
    let names: Vec<_> = sources
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.pl", "b.pl"]);
}

#[test]
fn test_parse_path_reads_whole_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.pl"), "a(x).\n").unwrap();
    fs::write(dir.path().join("b.pl"), "b(y).\n").unwrap();

    let repr = parse_path(dir.path(), Language::Prolog).unwrap();
    assert_eq!(repr.len(), 2);
    assert_eq!(repr.definitions()[0].name(), "a");
    assert_eq!(repr.definitions()[1].name(), "b");
}

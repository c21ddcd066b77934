//! Property tests for paren-depth splitting and term parsing


use proptest::prelude::*;
use sembrowse::parser::{parse_term, split_depth0};
use sembrowse::term::Term;
use sembrowse::Language;

/// Render a parsed term back to source text.
fn render_term(term: &Term) -> String {
    match term {
        Term::Variable(v) => v.name.clone(),
        Term::Function(f) => {
            let args: Vec<String> = f.args.iter().map(render_term).collect();
            format!("{}({})", f.name, args.join(","))
        }
        Term::Operator(op) => op.name.clone(),
        Term::Loop(l) => l.name.clone(),
        Term::Conditional(c) => c.name.clone(),
    }
}

proptest! {
    /// The number of top-level pieces equals the number of depth-0 commas
    /// plus one, and rejoining reproduces the input.
    #[test]
    fn split_depth0_partitions_and_rejoins(spec in generators::arb_call()) {
        let text = spec.render();
        let inner = &text[text.find('(').unwrap() + 1..text.rfind(')').unwrap()];

        let pieces = split_depth0(inner, ',');
        prop_assert_eq!(pieces.len(), spec.arity());
        prop_assert_eq!(pieces.join(","), inner);
    }

    /// Parsing a generated call yields its exact argument structure.
    #[test]
    fn parse_preserves_call_structure(spec in generators::arb_call()) {
        let text = spec.render();
        let term = parse_term(&text, Language::Prolog, false).unwrap();

        match &term {
            Term::Function(f) => prop_assert_eq!(f.arity(), spec.arity()),
            other => prop_assert!(false, "expected function, got {:?}", other),
        }
    }

    /// Re-rendering the parsed tree reproduces the input text exactly
    /// (the generator emits no whitespace).
    #[test]
    fn parse_render_roundtrip(spec in generators::arb_call()) {
        let text = spec.render();
        let term = parse_term(&text, Language::Prolog, false).unwrap();
        prop_assert_eq!(render_term(&term), text);
    }

    /// Whitespace never changes the parse.
    #[test]
    fn parse_ignores_whitespace(spec in generators::arb_call(), seed in any::<u64>()) {
        let text = spec.render();
        let mut padded = String::new();
        let mut state = seed;
        for c in text.chars() {
            padded.push(c);
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            if state % 4 == 0 {
                padded.push(' ');
            }
        }

        let plain = parse_term(&text, Language::Prolog, false).unwrap();
        let spaced = parse_term(&padded, Language::Prolog, false).unwrap();
        prop_assert_eq!(plain, spaced);
    }

    /// The parser returns an error or a term for arbitrary input; it never
    /// panics.
    #[test]
    fn parse_never_panics(text in "[a-zA-Z0-9_(),+=\\[\\]|-]{0,40}") {
        let _ = parse_term(&text, Language::Prolog, false);
        let _ = parse_term(&text, Language::C, false);
    }
}

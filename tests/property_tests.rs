// tests/property_tests.rs
//
// Properties that must hold for every input, checked with proptest.

use formula_lang::ast::TokenKind;
use formula_lang::{Expr, parse, parse_formula, tokenize};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Source text of single tokens that never merge with a neighbour once
/// separated by a space.
fn arb_token_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z_][A-Za-z0-9_]{0,6}",
        "[0-9]{1,5}",
        "[0-9]{1,3}\\.[0-9]{1,3}",
        "'[a-z ]{0,6}'",
        prop::sample::select(vec![
            "+", "-", "*", "/", "^", "%", "=", "==", "!=", "<>", "<", "<=", ">", ">=", "&",
            "&&", "||", "!", "(", ")", ",", ".", "$",
        ])
        .prop_map(str::to_string),
    ]
}

fn arb_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..10_000).prop_map(|n| n.to_string()),
        (0u32..100, 0u32..100).prop_map(|(a, b)| format!("{}.{}", a, b)),
        "'[a-z ]{0,5}'",
        "F_[a-z]{1,5}(\\.F_[a-z]{1,5}){0,2}",
        "\\$F_[a-z]{1,4}\\.F_[a-z]{1,4}",
        prop::sample::select(vec!["TRUE", "false", "Null"]).prop_map(str::to_string),
    ]
}

/// Syntactically valid formulas built from random leaves and operators.
fn arb_formula() -> impl Strategy<Value = String> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop::sample::select(vec![
                    "+", "-", "*", "/", "^", "%", "=", "<>", "<", "<=", ">", ">=", "&", "AND",
                    "or", "&&", "||",
                ]),
                inner.clone(),
            )
                .prop_map(|(a, op, b)| format!("{} {} {}", a, op, b)),
            inner.clone().prop_map(|a| format!("({})", a)),
            inner.clone().prop_map(|a| format!("-{}", a)),
            inner.clone().prop_map(|a| format!("(NOT {})", a)),
            prop::collection::vec(inner, 0..4)
                .prop_map(|args| format!("FN({})", args.join(", "))),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn tokenize_is_deterministic(input in "\\PC{0,40}") {
        prop_assert_eq!(tokenize(&input), tokenize(&input));
    }

    #[test]
    fn raw_text_reconstructs_source(parts in prop::collection::vec(arb_token_text(), 0..12)) {
        let source = parts.join(" ");
        let tokens = tokenize(&source).unwrap();

        prop_assert_eq!(tokens.iter().filter(|t| t.is(TokenKind::Eof)).count(), 1);
        let rebuilt: Vec<&str> = tokens
            .iter()
            .filter(|t| !t.is(TokenKind::Eof))
            .map(|t| t.text.as_str())
            .collect();
        prop_assert_eq!(rebuilt.join(" "), source);
    }

    #[test]
    fn token_offsets_point_at_their_text(parts in prop::collection::vec(arb_token_text(), 0..12)) {
        let source = parts.join(" ");
        let chars: Vec<char> = source.chars().collect();
        for token in tokenize(&source).unwrap() {
            let start = token.location.offset;
            let len = token.text.chars().count();
            let slice: String = chars[start..start + len].iter().collect();
            prop_assert_eq!(slice, token.text);
        }
    }

    #[test]
    fn generated_formulas_parse(source in arb_formula()) {
        prop_assert!(parse_formula(&source).is_ok(), "failed to parse {}", source);
    }

    #[test]
    fn canonical_rendering_reparses_to_same_tree(source in arb_formula()) {
        let expr = parse_formula(&source).unwrap();
        let canonical = expr.to_string();
        let reparsed = parse_formula(&canonical).unwrap();
        prop_assert!(
            expr.structurally_eq(&reparsed),
            "{} rendered as {} which parsed differently",
            source,
            canonical
        );
    }

    #[test]
    fn parse_is_deterministic(source in arb_formula()) {
        let a = parse(tokenize(&source).unwrap());
        let b = parse(tokenize(&source).unwrap());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn positions_are_valid_offsets(source in arb_formula()) {
        let expr = parse_formula(&source).unwrap();
        let len = source.chars().count();
        let mut positions = Vec::new();
        expr.walk(&mut |node: &Expr| positions.push(node.position()));
        for position in positions {
            prop_assert!(position < len);
        }
    }

    #[test]
    fn error_locations_are_within_source(input in "[a-z0-9+*/()'., <>=&|!^%$#-]{0,24}") {
        if let Err(e) = parse_formula(&input) {
            let location = e.location().unwrap();
            prop_assert!(location.offset <= input.chars().count());
            prop_assert!(location.line >= 1 && location.column >= 1);
        }
    }
}

// tests/integration_tests.rs
//
// End-to-end behaviour of the tokenize -> parse pipeline and the CLI helpers.

use formula_lang::cli::{self, CheckOptions, CliError};
use formula_lang::{
    BinOp, Expr, FormulaError, Literal, Location, ParserOptions, parse_formula,
    parse_formula_with,
};

// ============================================================================
// Pipeline
// ============================================================================

#[test]
fn test_business_rule_formula() {
    let expr = parse_formula(
        "IF(AND(ISPICKVAL(StageName, 'Closed Won'), Amount >= 10000),\n   Account.Owner.Name & ' earns ' & TEXT(Amount * 0.05),\n   NULL)",
    )
    .unwrap();

    match &expr {
        Expr::FunctionCall { name, args, .. } => {
            assert_eq!(name, "IF");
            assert_eq!(args.len(), 3);
            assert!(matches!(&args[0], Expr::FunctionCall { name, .. } if name == "AND"));
            assert!(matches!(args[1], Expr::BinaryOp { op: BinOp::Concat, .. }));
            assert!(matches!(args[2], Expr::Literal { value: Literal::Null, .. }));
        }
        other => panic!("Expected IF call, got {:?}", other),
    }

    let fields: Vec<String> = expr
        .field_references()
        .iter()
        .map(|p| p.join("."))
        .collect();
    assert_eq!(
        fields,
        vec!["StageName", "Amount", "Account.Owner.Name", "Amount"]
    );
    assert_eq!(expr.function_names(), vec!["IF", "AND", "ISPICKVAL", "TEXT"]);
}

#[test]
fn test_canonical_rendering() {
    let cases = vec![
        ("1 + 2 * 3", "(1 + (2 * 3))"),
        ("2 ^ 3 ^ 2", "(2 ^ (3 ^ 2))"),
        ("-2 * 3", "((-2) * 3)"),
        ("a <> b", "(a != b)"),
        ("NOT x && y", "((!x) AND y)"),
        ("'it\\'s' & \"x\"", "('it\\'s' & 'x')"),
        ("$User.Id = OwnerId", "($User.Id = OwnerId)"),
        ("max( 1 ,2 )", "max(1, 2)"),
        ("'a\\'b'", "'a\\'b'"),
        ("true || null", "(TRUE OR NULL)"),
    ];
    for (input, expected) in cases {
        let expr = parse_formula(input).unwrap();
        assert_eq!(expr.to_string(), expected, "{}", input);
    }
}

#[test]
fn test_depth() {
    assert_eq!(parse_formula("x").unwrap().depth(), 1);
    assert_eq!(parse_formula("1 + 2 * 3").unwrap().depth(), 3);
    assert_eq!(parse_formula("F(G(H()))").unwrap().depth(), 3);
}

#[test]
fn test_lex_error_surfaces_as_formula_error() {
    let err = parse_formula("'abc").unwrap_err();
    assert!(matches!(err, FormulaError::Lex(_)));
    assert_eq!(err.location(), Some(Location::START));
    assert!(err.to_string().starts_with("Tokenizer error: Unterminated string"));
}

#[test]
fn test_parse_error_surfaces_as_formula_error() {
    let err = parse_formula("1 + 2 3").unwrap_err();
    assert!(matches!(err, FormulaError::Parse(_)));
    assert_eq!(err.location(), Some(Location::new(6, 1, 7)));
    assert!(err.message().contains("after complete expression"));
}

#[test]
fn test_custom_depth_limit() {
    let options = ParserOptions { max_depth: 3 };
    assert!(parse_formula_with("(1)", options).is_ok());

    let err = parse_formula_with("((((1))))", options).unwrap_err();
    assert!(err.message().contains("nested too deeply"));
}

#[test]
fn test_parallel_parsing() {
    let formulas = ["1 + 2", "MAX(a, b)", "x.y.z", "NOT flag", "'a' & 'b'"];
    let handles: Vec<_> = formulas
        .iter()
        .map(|f| {
            let f = f.to_string();
            std::thread::spawn(move || parse_formula(&f).map(|e| e.to_string()))
        })
        .collect();

    let rendered: Vec<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(
        rendered,
        vec!["(1 + 2)", "MAX(a, b)", "x.y.z", "(!flag)", "('a' & 'b')"]
    );
}

// ============================================================================
// CLI helpers
// ============================================================================

#[test]
fn test_check_report() {
    let report = cli::execute_check(&CheckOptions {
        formula: "IF(Amount > 100, Account.Name, LOWER(Account.Name))".to_string(),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(
        report.canonical,
        "IF((Amount > 100), Account.Name, LOWER(Account.Name))"
    );
    assert_eq!(report.fields, vec!["Amount", "Account.Name"]);
    assert_eq!(report.functions, vec!["IF", "LOWER"]);

    let text = report.to_string();
    assert!(text.starts_with("Syntax is valid\n"));
    assert!(text.contains("Fields: Amount, Account.Name\n"));
}

#[test]
fn test_check_reports_diagnostic() {
    let err = cli::execute_check(&CheckOptions {
        formula: "MAX(1 2)".to_string(),
        ..Default::default()
    })
    .unwrap_err();

    assert!(matches!(err, CliError::Formula { .. }));
    let text = err.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "Parser error: Expected ',' or ')' in arguments of MAX, found number 2 at line 1, column 7"
    );
    assert_eq!(lines[1], "  1 | MAX(1 2)");
    assert_eq!(lines[2], "    |       ^");
}

#[test]
fn test_tokens_table() {
    let table = cli::tokens_table("a >= 1").unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("1:1"));
    assert!(lines[1].contains("GREATER_THAN_OR_EQUAL"));
    assert!(lines[1].ends_with(">="));
    assert!(lines[3].contains("EOF"));
}

#[test]
fn test_tokens_json_string() {
    let json = cli::tokens_to_json_string("x", false).unwrap();
    assert_eq!(
        json,
        r#"[{"column":1,"kind":"IDENTIFIER","line":1,"offset":0,"text":"x"},{"column":2,"kind":"EOF","line":1,"offset":1,"text":""}]"#
    );
}

#[test]
fn test_parse_to_json() {
    let json = cli::parse_to_json("-Amount", ParserOptions::default(), false).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "unary");
    assert_eq!(value["operator"], "-");
    assert_eq!(value["operand"]["type"], "field");
    assert_eq!(value["operand"]["position"], 1);
}

#[test]
fn test_parse_to_json_error() {
    let err = cli::parse_to_json("(", ParserOptions::default(), true).unwrap_err();
    assert!(err.to_string().contains("Unexpected end of input"));
}

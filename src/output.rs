//! JSON rendering of tokens and syntax trees for tooling.
//!
//! Nodes become objects tagged by `"type"` (`binary`, `unary`, `call`,
//! `literal`, `field`) and carry their source `"position"`. Numbers are
//! rendered as decimal strings so no precision is lost.
//!
//! # Examples
//!
//! ```
//! use formula_lang::{expr_to_json, parse_formula};
//!
//! let expr = parse_formula("Amount * 2").unwrap();
//! let json = expr_to_json(&expr);
//!
//! assert_eq!(json["type"], "binary");
//! assert_eq!(json["operator"], "*");
//! assert_eq!(json["left"]["path"][0], "Amount");
//! ```

use serde_json::{Value, json};

use crate::ast::{Expr, Literal, LiteralType, Token};

pub fn tokens_to_json(tokens: &[Token]) -> Value {
    Value::Array(
        tokens
            .iter()
            .map(|token| {
                json!({
                    "kind": token.kind.name(),
                    "text": token.text,
                    "offset": token.location.offset,
                    "line": token.location.line,
                    "column": token.location.column,
                })
            })
            .collect(),
    )
}

pub fn expr_to_json(expr: &Expr) -> Value {
    match expr {
        Expr::BinaryOp {
            op,
            left,
            right,
            position,
        } => json!({
            "type": "binary",
            "operator": op.symbol(),
            "left": expr_to_json(left),
            "right": expr_to_json(right),
            "position": position,
        }),
        Expr::UnaryOp {
            op,
            operand,
            position,
        } => json!({
            "type": "unary",
            "operator": op.symbol(),
            "operand": expr_to_json(operand),
            "position": position,
        }),
        Expr::FunctionCall {
            name,
            args,
            position,
        } => json!({
            "type": "call",
            "name": name,
            "arguments": args.iter().map(expr_to_json).collect::<Vec<_>>(),
            "position": position,
        }),
        Expr::Literal { value, position } => json!({
            "type": "literal",
            "literalType": literal_type_name(value.literal_type()),
            "value": literal_to_json(value),
            "position": position,
        }),
        Expr::FieldRef { path, position } => json!({
            "type": "field",
            "path": path,
            "position": position,
        }),
    }
}

fn literal_type_name(literal_type: LiteralType) -> &'static str {
    match literal_type {
        LiteralType::Number => "NUMBER",
        LiteralType::String => "STRING",
        LiteralType::Boolean => "BOOLEAN",
        LiteralType::Null => "NULL",
    }
}

fn literal_to_json(literal: &Literal) -> Value {
    match literal {
        Literal::Number(n) => Value::String(n.to_string()),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Boolean(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

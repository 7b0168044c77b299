//! Tokenizer and parser for business-rule formula expressions.
//!
//! ```
//! use formula_lang::{parse_formula, Expr};
//!
//! let expr = parse_formula("Account.Owner.Name & ' (' & TEXT(Amount) & ')'").unwrap();
//! assert!(matches!(expr, Expr::BinaryOp { .. }));
//! ```
pub mod ast;
pub mod cli;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;

pub use ast::{BinOp, Expr, Literal, LiteralType, Location, Token, TokenKind, UnaryOp};
pub use error::FormulaError;
pub use lexer::{LexError, Lexer, tokenize};
pub use output::{expr_to_json, tokens_to_json};
pub use parser::{ParseError, Parser, ParserOptions, parse};

/// Tokenizes and parses `source` in one step.
pub fn parse_formula(source: &str) -> Result<Expr, FormulaError> {
    parse_formula_with(source, ParserOptions::default())
}

pub fn parse_formula_with(source: &str, options: ParserOptions) -> Result<Expr, FormulaError> {
    let tokens = tokenize(source)?;
    let expr = Parser::with_options(tokens, options)?.parse()?;
    Ok(expr)
}

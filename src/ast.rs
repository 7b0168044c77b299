//! # Formula Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the Abstract Syntax Tree (AST) for
//! business-rule formulas: expressions over record fields, literals,
//! operators and named function calls.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and source locations produced by the lexer
//! - **[operators]** - Binary and unary operators
//! - **[expressions]** - The five expression node kinds and literal values
//!
//! ## Quick Start
//!
//! ```text
//! IF(Account.AnnualRevenue > 1000000, 'Enterprise', 'SMB')
//! ```
//!
//! parses into a function call `IF` whose first argument is a comparison
//! between the field path `Account.AnnualRevenue` and a number.
//!
//! ## Operator Precedence
//!
//! From loosest to tightest binding:
//!
//! | Tier | Operators                      | Associativity |
//! |------|--------------------------------|---------------|
//! | 1    | `OR` `\|\|`                    | left          |
//! | 2    | `AND` `&&`                     | left          |
//! | 3    | `NOT` `!` (prefix)             | -             |
//! | 4    | `=` `!=` `<>` `<` `<=` `>` `>=` | left (chains) |
//! | 5    | `&`                            | left          |
//! | 6    | `+` `-`                        | left          |
//! | 7    | `*` `/` `%`                    | left          |
//! | 8    | `^`                            | right         |
//! | 9    | `-` `+` (prefix)               | -             |
//!
//! Comparisons are not special-cased: `a < b < c` is `(a < b) < c`.
//! Concatenation sits on its own tier below addition, so
//! `'Total: ' & 1 + 2` is `'Total: ' & (1 + 2)`.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expr, Literal, LiteralType};
pub use operators::{BinOp, UnaryOp};
pub use tokens::{Location, Token, TokenKind};

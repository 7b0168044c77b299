//! Errors shared by the tokenize -> parse pipeline.

use thiserror::Error;

use crate::ast::Location;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Either stage of the pipeline failing, as returned by [`crate::parse_formula`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("Tokenizer error: {0}")]
    Lex(#[from] LexError),

    #[error("Parser error: {0}")]
    Parse(#[from] ParseError),
}

impl FormulaError {
    pub fn message(&self) -> &str {
        match self {
            FormulaError::Lex(e) => &e.message,
            FormulaError::Parse(e) => &e.message,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            FormulaError::Lex(e) => e.location,
            FormulaError::Parse(e) => e.location,
        }
    }
}

/// Suffix appended to error messages: `" at line L, column C"` or nothing.
pub(crate) fn describe_location(location: &Option<Location>) -> String {
    match location {
        Some(location) => format!(" at {}", location),
        None => String::new(),
    }
}

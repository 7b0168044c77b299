//! CLI support for formula-lang
//!
//! Provides programmatic access to the `formula` commands so other tools can
//! embed them without going through the binary.

mod check;
mod diagnostic;
mod inspect;

pub use check::{CheckOptions, CheckReport, execute_check};
pub use diagnostic::render_diagnostic;
pub use inspect::{parse_to_json, tokens_table, tokens_to_json_string};

use std::io;

use thiserror::Error;

use crate::FormulaError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// The formula failed to tokenize or parse
    #[error("{}", render_diagnostic(.formula, .error))]
    Formula {
        formula: String,
        #[source]
        error: FormulaError,
    },

    #[error("Could not render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No formula provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
}

impl CliError {
    pub(crate) fn formula(formula: &str, error: impl Into<FormulaError>) -> Self {
        CliError::Formula {
            formula: formula.to_string(),
            error: error.into(),
        }
    }
}

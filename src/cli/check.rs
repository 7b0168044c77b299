//! Validate formula syntax and summarize what it references

use std::fmt;

use super::CliError;
use crate::{Parser, ParserOptions, tokenize};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The formula to validate
    pub formula: String,
    /// Parser settings
    pub parser: ParserOptions,
}

/// Summary of a formula that parsed successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Fully parenthesized rendering of the parsed tree
    pub canonical: String,
    /// Distinct dotted field paths, in order of first use
    pub fields: Vec<String>,
    /// Distinct function names, in order of first use
    pub functions: Vec<String>,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Syntax is valid")?;
        writeln!(f, "Canonical: {}", self.canonical)?;
        if !self.fields.is_empty() {
            writeln!(f, "Fields: {}", self.fields.join(", "))?;
        }
        if !self.functions.is_empty() {
            writeln!(f, "Functions: {}", self.functions.join(", "))?;
        }
        Ok(())
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

/// Execute a formula check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckReport, CliError> {
    let formula = &options.formula;

    let tokens = tokenize(formula).map_err(|e| CliError::formula(formula, e))?;
    let expr = Parser::with_options(tokens, options.parser)
        .and_then(|mut parser| parser.parse())
        .map_err(|e| CliError::formula(formula, e))?;

    let mut fields = Vec::new();
    for path in expr.field_references() {
        push_unique(&mut fields, path.join("."));
    }

    let mut functions = Vec::new();
    for name in expr.function_names() {
        push_unique(&mut functions, name.to_string());
    }

    Ok(CheckReport {
        canonical: expr.to_string(),
        fields,
        functions,
    })
}

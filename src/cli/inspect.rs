//! Dump tokens and syntax trees

use super::CliError;
use crate::{Parser, ParserOptions, expr_to_json, tokenize, tokens_to_json};

/// One token per line: `line:column  KIND  text`
pub fn tokens_table(formula: &str) -> Result<String, CliError> {
    let tokens = tokenize(formula).map_err(|e| CliError::formula(formula, e))?;

    let mut out = String::new();
    for token in &tokens {
        let position = format!("{}:{}", token.location.line, token.location.column);
        out.push_str(&format!(
            "{:<8} {:<22} {}\n",
            position,
            token.kind.name(),
            token.text
        ));
    }
    Ok(out)
}

pub fn tokens_to_json_string(formula: &str, pretty: bool) -> Result<String, CliError> {
    let tokens = tokenize(formula).map_err(|e| CliError::formula(formula, e))?;
    let json = tokens_to_json(&tokens);
    Ok(to_string(&json, pretty)?)
}

pub fn parse_to_json(
    formula: &str,
    options: ParserOptions,
    pretty: bool,
) -> Result<String, CliError> {
    let tokens = tokenize(formula).map_err(|e| CliError::formula(formula, e))?;
    let expr = Parser::with_options(tokens, options)
        .and_then(|mut parser| parser.parse())
        .map_err(|e| CliError::formula(formula, e))?;
    Ok(to_string(&expr_to_json(&expr), pretty)?)
}

fn to_string(json: &serde_json::Value, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(json)
    } else {
        serde_json::to_string(json)
    }
}

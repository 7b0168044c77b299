//! Caret diagnostics for formula errors

use crate::FormulaError;

/// Renders the error message followed by the offending source line with a
/// caret under the reported column.
///
/// ```text
/// Parser error: Unexpected end of input: expected an expression at line 1, column 5
///   1 | 1 +
///     |     ^
/// ```
pub fn render_diagnostic(formula: &str, error: &FormulaError) -> String {
    let mut out = error.to_string();

    let Some(location) = error.location() else {
        return out;
    };

    let line_text = location
        .line
        .checked_sub(1)
        .and_then(|index| formula.split('\n').nth(index))
        .unwrap_or("")
        .trim_end_matches('\r');
    let gutter = location.line.to_string();
    let pad = " ".repeat(gutter.len());
    let caret_pad = " ".repeat(location.column.saturating_sub(1));

    out.push_str(&format!("\n  {} | {}", gutter, line_text));
    out.push_str(&format!("\n  {} | {}^", pad, caret_pad));
    out
}

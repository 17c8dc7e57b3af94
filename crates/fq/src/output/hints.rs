//! Unknown-field warnings.

use filter_syntax_rs::diagnostics::FieldHint;
use owo_colors::OwoColorize;

/// Formats hints as warnings, each followed by the query with the field underlined.
pub fn format_hints(query: &str, hints: &[FieldHint], use_colors: bool) -> String {
    let mut output = String::new();
    for hint in hints {
        let label = if use_colors {
            "warning".yellow().bold().to_string()
        } else {
            "warning".to_string()
        };
        output.push_str(&format!("{label}: {hint}\n"));

        let indent = query[..hint.start].chars().count();
        let width = query[hint.start..hint.end].chars().count().max(1);
        output.push_str(&format!("  {query}\n"));
        output.push_str(&format!("  {}{}\n", " ".repeat(indent), "^".repeat(width)));
    }
    output
}

//! Check command implementation.
//!
//! Reports syntax errors and operator-shaped text whose field is not in the schema.

use filter_syntax_rs::diagnostics::unknown_fields;
use filter_syntax_rs::filter::FilterParser;
use filter_syntax_rs::Schema;

use super::{CommandContext, Result};
use crate::output::format_hints;

/// Executes the check command.
///
/// # Errors
///
/// Returns the parse error when the query is not syntactically valid; hints
/// alone do not fail the command.
pub fn execute(ctx: &CommandContext, query: &str, schema: &Schema) -> Result<()> {
    FilterParser::parse(query, schema)?;
    let hints = unknown_fields(query, schema);

    if ctx.json_output {
        let output = serde_json::json!({
            "valid": true,
            "hints": hints,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if hints.is_empty() {
            println!("OK");
        } else {
            eprint!("{}", format_hints(query, &hints, ctx.use_colors));
        }
    }

    Ok(())
}

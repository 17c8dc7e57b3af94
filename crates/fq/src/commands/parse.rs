//! Parse command implementation.
//!
//! Prints the expression tree a query parses to.

use filter_syntax_rs::filter::FilterParser;
use filter_syntax_rs::Schema;

use super::{CommandContext, Result};

/// Executes the parse command.
///
/// The tree is always printed as JSON; `--json` switches to compact output.
pub fn execute(ctx: &CommandContext, query: &str, schema: &Schema) -> Result<()> {
    let expr = FilterParser::parse(query, schema)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string(&expr)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&expr)?);
    }

    Ok(())
}

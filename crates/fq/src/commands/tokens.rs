//! Tokens command implementation.
//!
//! Shows how the parser interpreted each token of a query.

use filter_syntax_rs::filter::FilterParser;
use filter_syntax_rs::Schema;

use super::{CommandContext, Result};
use crate::output::{format_tokens_table, highlight_query};

/// Executes the tokens command.
///
/// Classification never fails, so partially typed queries can be inspected.
pub fn execute(ctx: &CommandContext, query: &str, schema: &Schema) -> Result<()> {
    let tagged = FilterParser::tokens_with_tags(query, schema);

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&tagged)?);
        return Ok(());
    }

    if ctx.use_colors && !ctx.quiet {
        println!("{}\n", highlight_query(query, &tagged, true));
    }
    print!("{}", format_tokens_table(&tagged, ctx.use_colors));

    Ok(())
}

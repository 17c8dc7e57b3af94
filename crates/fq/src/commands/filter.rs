//! Filter command implementation.
//!
//! Reads JSON records and prints the ones that match a query as JSON Lines.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;

use filter_syntax_rs::{FilterCompiler, JsonFieldGetter, Schema};
use serde_json::Value;
use tracing::debug;

use super::{CommandContext, CommandError, Result};

/// Options for the filter command.
pub struct FilterOptions {
    /// Filter query.
    pub query: String,
    /// Records file; stdin when `None`.
    pub input: Option<PathBuf>,
    /// Print only the match count.
    pub count: bool,
}

/// Executes the filter command.
pub fn execute(
    ctx: &CommandContext,
    opts: &FilterOptions,
    schema: Schema,
    getter: JsonFieldGetter,
) -> Result<()> {
    let records = match &opts.input {
        Some(path) => read_records(BufReader::new(File::open(path)?))?,
        None => read_records(io::stdin().lock())?,
    };
    debug!(records = records.len(), "read input records");

    let compiler = FilterCompiler::new(schema, getter);
    let filter = compiler.compile(&opts.query)?;
    let matched = filter.filter_records(&records);
    debug!(matched = matched.len(), "filtered records");

    let mut stdout = io::stdout().lock();
    if opts.count {
        write_count(&mut stdout, ctx, matched.len())?;
    } else {
        write_records(&mut stdout, &matched)?;
    }
    stdout.flush()?;

    Ok(())
}

/// Reads records from a JSON array or from JSON Lines.
///
/// Input whose first non-blank character is `[` is read as one array; anything
/// else is read one value per non-blank line.
pub fn read_records<R: Read>(mut reader: R) -> Result<Vec<Value>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed)
            .map_err(|e| CommandError::Input(format!("invalid JSON array: {e}")));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .map_err(|e| CommandError::Input(format!("line {}: {e}", index + 1)))
        })
        .collect()
}

/// Writes records as JSON Lines.
pub fn write_records<W: Write>(out: &mut W, records: &[&Value]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_count<W: Write>(out: &mut W, ctx: &CommandContext, count: usize) -> Result<()> {
    if ctx.json_output {
        writeln!(out, "{}", serde_json::json!({ "count": count }))?;
    } else {
        writeln!(out, "{count}")?;
    }
    Ok(())
}

//! Output formatting utilities for the fq CLI.
//!
//! - [`tokens`] - Token classification (highlighted query, table)
//! - [`hints`] - Unknown-field warnings for `fq check`

mod hints;
mod tokens;

pub use hints::format_hints;
pub use tokens::{format_tokens_table, highlight_query, kind_label};

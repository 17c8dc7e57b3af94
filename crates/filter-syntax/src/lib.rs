//! Schema-directed filter queries.
//!
//! This crate parses short, human-typed queries such as
//!
//! ```text
//! (subject:in MATH, CPSC AND 300<=number<500) OR is:fysem
//! ```
//!
//! into a typed expression tree and evaluates that tree against records.
//! Which words are operators is decided by a [`Schema`] that declares the
//! field names of each category; anything that does not fit an operator
//! shape is matched as free text instead of being rejected.
//!
//! The usual entry point is [`FilterCompiler`]:
//!
//! ```
//! use filter_syntax_rs::{FilterCompiler, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .boolean(["fysem"])
//!     .categorical(["subject"])
//!     .numeric(["number"])
//!     .build()
//!     .unwrap();
//!
//! let compiler = FilterCompiler::json(schema);
//! let filter = compiler.compile("subject:in MATH, CPSC AND number < 300").unwrap();
//!
//! assert!(filter.matches(&json!({"subject": "CPSC", "number": 223})));
//! assert!(!filter.matches(&json!({"subject": "CPSC", "number": 323})));
//! ```
//!
//! The [`filter`] module exposes the parser and evaluator separately for
//! callers that need the tree itself or token classification for
//! highlighting.

mod compile;
pub mod diagnostics;
pub mod filter;
mod schema;
mod value;

pub use compile::{CompiledFilter, FilterCompiler};
pub use schema::{FieldCategory, Schema, SchemaBuilder, SchemaDefinition, SchemaError};
pub use value::{FieldValue, JsonFieldGetter, WildcardSource};

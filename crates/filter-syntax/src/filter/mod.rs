//! Filter expression parser and evaluator.
//!
//! This module turns a human-typed query into an [`Expr`] tree under a
//! [`Schema`](crate::Schema) and evaluates that tree against records.
//!
//! # Supported Syntax
//!
//! ## Boolean Fields
//! - `is:field` - The flag is set
//! - `not:field` - The flag is not set
//!
//! ## Set Fields
//! - `field:has a` - The set contains `a`
//! - `field:has-all-of a, b` / `field:equals a, b` - The set contains every value
//! - `field:has-any-of a, b` - The set contains at least one value
//! - `field:all-in a, b` - Every element of the set is listed
//!
//! ## Categorical Fields
//! - `field:is a` - The value is `a`
//! - `field:in a, b` - The value is one of those listed
//!
//! ## Numeric Fields
//! - `field < 3`, `<=`, `>`, `>=`, `=`, `!=` - Single bound
//! - `1 < field <= 3` - Range; both operators must point the same way
//!
//! ## Text Fields
//! - `field:contains foo` - Case-insensitive substring
//! - `field:contains-words foo` - Case-insensitive whole word
//! - `field:matches ^fo+` - Case-insensitive regular expression
//! - `*:contains foo` - Same, against the whole record
//!
//! ## Combinators
//! - `AND`, `OR` - Combine operands; side-by-side operands continue the group
//! - `NOT` - Negate the next expression
//! - `()` - Grouping
//! - `"..."` - Quoted text is always a value, never syntax
//!
//! Anything else is matched as free text against the wildcard target.
//!
//! # Example
//!
//! ```
//! use filter_syntax_rs::filter::{FilterEvaluator, FilterParser};
//! use filter_syntax_rs::{JsonFieldGetter, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::builder()
//!     .categorical(["color"])
//!     .numeric(["price"])
//!     .build()
//!     .unwrap();
//!
//! // Parse a filter expression
//! let filter = FilterParser::parse("color:in red, blue AND price < 10", &schema).unwrap();
//!
//! // Evaluate it against records
//! let getter = JsonFieldGetter::new();
//! let evaluator = FilterEvaluator::new(&filter, &getter);
//!
//! let records = vec![
//!     json!({"color": "red", "price": 5}),
//!     json!({"color": "green", "price": 5}),
//! ];
//! assert_eq!(evaluator.filter_records(&records).len(), 1);
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{
    BooleanOp, BooleanOperator, CategoricalOp, CategoricalOperator, Combinator,
    CompoundNumericOp, Expr, NumericOp, NumericOperator, QueryArg, RangeDirection, SetOp,
    SetOperator, TextOp, TextOperator, TextTarget, WILDCARD,
};
pub use error::{FilterError, FilterResult};
pub use evaluator::{evaluate, FieldGetter, FilterEvaluator};
pub use lexer::{tokenize, Lexer, Token};
pub use parser::{FilterParser, TaggedToken, TokenKind, MAX_NESTING};

pub(crate) use evaluator::{eval, Patterns};
pub(crate) use parser::parse_number;

#[cfg(test)]
mod tests;

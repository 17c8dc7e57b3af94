//! One-step query compilation.
//!
//! [`FilterCompiler`] binds a [`Schema`] to a field getter so callers can go
//! from query text to a reusable predicate without touching the parser or
//! evaluator directly.

use crate::filter::{eval, Expr, FieldGetter, FilterParser, FilterResult, Patterns};
use crate::schema::Schema;
use crate::value::JsonFieldGetter;

/// Builds [`CompiledFilter`]s from query text.
///
/// # Example
///
/// ```
/// use filter_syntax_rs::{FilterCompiler, Schema};
/// use serde_json::json;
///
/// let schema = Schema::builder().boolean(["done"]).build().unwrap();
/// let compiler = FilterCompiler::json(schema);
///
/// let filter = compiler.compile("not:done").unwrap();
/// assert!(filter.matches(&json!({"done": false})));
/// assert!(!filter.matches(&json!({"done": true})));
/// ```
#[derive(Debug, Clone)]
pub struct FilterCompiler<G> {
    schema: Schema,
    getter: G,
}

impl FilterCompiler<JsonFieldGetter> {
    /// Creates a compiler for `serde_json::Value` records using the default getter.
    pub fn json(schema: Schema) -> Self {
        Self::new(schema, JsonFieldGetter::new())
    }
}

impl<G> FilterCompiler<G> {
    /// Creates a compiler with a custom field getter.
    pub fn new(schema: Schema, getter: G) -> Self {
        Self { schema, getter }
    }

    /// Returns the schema queries are parsed under.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the field getter.
    pub fn getter(&self) -> &G {
        &self.getter
    }

    /// Parses `query` once into a filter that can be applied to many records.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`](crate::filter::FilterError) when the query has
    /// structure the parser cannot place.
    pub fn compile(&self, query: &str) -> FilterResult<CompiledFilter<'_, G>> {
        let expr = FilterParser::parse(query, &self.schema)?;
        Ok(CompiledFilter::new(expr, &self.getter))
    }
}

/// A parsed query bound to a field getter.
#[derive(Debug)]
pub struct CompiledFilter<'g, G> {
    expr: Expr,
    getter: &'g G,
    patterns: Patterns,
}

impl<'g, G> CompiledFilter<'g, G> {
    /// Binds an already parsed expression to a getter.
    pub fn new(expr: Expr, getter: &'g G) -> Self {
        let patterns = Patterns::for_expr(&expr);
        Self {
            expr,
            getter,
            patterns,
        }
    }

    /// Returns the parsed expression.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Consumes the filter, returning the parsed expression.
    pub fn into_expr(self) -> Expr {
        self.expr
    }

    /// Returns true if the record matches.
    pub fn matches<R: ?Sized>(&self, record: &R) -> bool
    where
        G: FieldGetter<R>,
    {
        eval(&self.expr, record, self.getter, &self.patterns)
    }

    /// Filters a slice of records, returning only those that match.
    pub fn filter_records<'r, R>(&self, records: &'r [R]) -> Vec<&'r R>
    where
        G: FieldGetter<R>,
    {
        records.iter().filter(|record| self.matches(*record)).collect()
    }
}

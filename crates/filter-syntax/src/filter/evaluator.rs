//! Filter evaluation against records.
//!
//! This module provides the [`FilterEvaluator`] for evaluating parsed filter
//! expressions against arbitrary records through a caller-supplied
//! [`FieldGetter`].
//!
//! # Example
//!
//! ```
//! use filter_syntax_rs::filter::{Expr, FilterEvaluator, FilterParser};
//! use filter_syntax_rs::{FieldValue, Schema};
//!
//! struct Book {
//!     title: String,
//!     pages: u32,
//! }
//!
//! let schema = Schema::builder().numeric(["pages"]).text(["title"]).build().unwrap();
//! let filter = FilterParser::parse("pages > 100 title:contains rust", &schema).unwrap();
//!
//! let getter = |book: &Book, field: &str, _expr: &Expr| match field {
//!     "pages" => FieldValue::from(book.pages as f64),
//!     "title" | "*" => FieldValue::from(book.title.as_str()),
//!     _ => FieldValue::Null,
//! };
//!
//! let evaluator = FilterEvaluator::new(&filter, &getter);
//! let book = Book { title: "The Rust Book".to_string(), pages: 550 };
//! assert!(evaluator.matches(&book));
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::ast::{
    BooleanOp, BooleanOperator, CategoricalOp, CategoricalOperator, Combinator,
    CompoundNumericOp, Expr, NumericOp, SetOp, SetOperator, TextOp, TextOperator,
};
use crate::value::FieldValue;

/// Compiled size limit for `matches` patterns, in bytes.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Splits text into alternating runs of word and non-word characters.
static WORD_PIECES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|\W+").expect("word piece pattern is valid"));

/// Reads field values out of records.
///
/// `field` is the target of the leaf being evaluated, `*` for wildcard text.
/// The expression is the leaf itself, so a getter can special-case by
/// operator. Any `Fn(&R, &str, &Expr) -> FieldValue` closure is a getter.
pub trait FieldGetter<R: ?Sized> {
    /// Returns the value of `field` in `record`.
    fn get(&self, record: &R, field: &str, expr: &Expr) -> FieldValue;
}

impl<R: ?Sized, F> FieldGetter<R> for F
where
    F: Fn(&R, &str, &Expr) -> FieldValue,
{
    fn get(&self, record: &R, field: &str, expr: &Expr) -> FieldValue {
        self(record, field, expr)
    }
}

/// Compiled `matches` patterns of one expression, keyed by source text.
///
/// Invalid patterns are absent, so they match nothing.
#[derive(Debug, Clone, Default)]
pub(crate) struct Patterns {
    compiled: HashMap<String, Regex>,
}

impl Patterns {
    /// Compiles every `matches` pattern in `expr`.
    pub(crate) fn for_expr(expr: &Expr) -> Self {
        let mut patterns = Self::default();
        patterns.collect(expr);
        patterns
    }

    fn collect(&mut self, expr: &Expr) {
        match expr {
            Expr::Complex { operands, .. } => operands.iter().for_each(|op| self.collect(op)),
            Expr::Not { operand } => self.collect(operand),
            Expr::Text(TextOp {
                operator: TextOperator::Matches,
                value,
                ..
            }) => {
                if !self.compiled.contains_key(value) {
                    if let Some(regex) = compile_pattern(value) {
                        self.compiled.insert(value.clone(), regex);
                    }
                }
            }
            _ => {}
        }
    }

    fn get(&self, pattern: &str) -> Option<&Regex> {
        self.compiled.get(pattern)
    }
}

/// Compiles a `matches` pattern: case-insensitive, Unicode-aware, unanchored.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .map_err(|error| debug!(pattern, %error, "ignoring invalid match pattern"))
        .ok()
}

/// Evaluates `expr` against one record.
///
/// Compiles the expression's patterns on every call; use [`FilterEvaluator`]
/// to evaluate one expression against many records.
pub fn evaluate<R, G>(record: &R, expr: &Expr, getter: &G) -> bool
where
    R: ?Sized,
    G: FieldGetter<R> + ?Sized,
{
    eval(expr, record, getter, &Patterns::for_expr(expr))
}

/// Evaluates a parsed filter against records.
///
/// The evaluator borrows an [`Expr`] and a [`FieldGetter`] and compiles the
/// expression's regular expressions once, up front.
#[derive(Debug)]
pub struct FilterEvaluator<'a, G: ?Sized> {
    expr: &'a Expr,
    getter: &'a G,
    patterns: Patterns,
}

impl<'a, G: ?Sized> FilterEvaluator<'a, G> {
    /// Creates a new filter evaluator.
    pub fn new(expr: &'a Expr, getter: &'a G) -> Self {
        Self {
            expr,
            getter,
            patterns: Patterns::for_expr(expr),
        }
    }

    /// Returns true if the record matches the filter.
    pub fn matches<R: ?Sized>(&self, record: &R) -> bool
    where
        G: FieldGetter<R>,
    {
        eval(self.expr, record, self.getter, &self.patterns)
    }

    /// Filters a slice of records, returning only those that match.
    pub fn filter_records<'r, R>(&self, records: &'r [R]) -> Vec<&'r R>
    where
        G: FieldGetter<R>,
    {
        records.iter().filter(|record| self.matches(*record)).collect()
    }
}

/// Evaluates an expression against a record.
pub(crate) fn eval<R, G>(expr: &Expr, record: &R, getter: &G, patterns: &Patterns) -> bool
where
    R: ?Sized,
    G: FieldGetter<R> + ?Sized,
{
    match expr {
        // Boolean operators
        Expr::Complex {
            combinator: Combinator::And,
            operands,
        } => operands
            .iter()
            .all(|operand| eval(operand, record, getter, patterns)),
        Expr::Complex {
            combinator: Combinator::Or,
            operands,
        } => operands
            .iter()
            .any(|operand| eval(operand, record, getter, patterns)),
        Expr::Not { operand } => !eval(operand, record, getter, patterns),

        // Leaves
        Expr::Boolean(op) => boolean_matches(op, &getter.get(record, &op.target, expr)),
        Expr::Set(op) => set_matches(op, &getter.get(record, &op.target, expr)),
        Expr::Categorical(op) => categorical_matches(op, &getter.get(record, &op.target, expr)),
        Expr::Numeric(op) => numeric_matches(op, &getter.get(record, &op.target, expr)),
        Expr::CompoundNumeric(op) => range_matches(op, &getter.get(record, &op.target, expr)),
        Expr::Text(op) => text_matches(op, &getter.get(record, op.target.as_str(), expr), patterns),
    }
}

fn boolean_matches(op: &BooleanOp, value: &FieldValue) -> bool {
    let FieldValue::Bool(flag) = value else {
        return false;
    };
    match op.operator {
        BooleanOperator::Is => *flag,
        BooleanOperator::Not => !*flag,
    }
}

fn set_matches(op: &SetOp, value: &FieldValue) -> bool {
    let FieldValue::List(items) = value else {
        return false;
    };
    let literals = op.value.as_slice();
    let present = |literal: &String| items.contains(literal);

    match op.operator {
        SetOperator::Has | SetOperator::HasAllOf | SetOperator::Equals => {
            literals.iter().all(present)
        }
        SetOperator::HasAnyOf => literals.iter().any(present),
        SetOperator::AllIn => items.iter().all(|item| op.value.contains(item)),
    }
}

fn categorical_matches(op: &CategoricalOp, value: &FieldValue) -> bool {
    let FieldValue::String(value) = value else {
        return false;
    };
    match op.operator {
        CategoricalOperator::Is | CategoricalOperator::In => op.value.contains(value),
    }
}

fn numeric_matches(op: &NumericOp, value: &FieldValue) -> bool {
    let FieldValue::Number(number) = value else {
        return false;
    };
    op.operator.compare(*number, op.value)
}

fn range_matches(op: &CompoundNumericOp, value: &FieldValue) -> bool {
    let FieldValue::Number(number) = value else {
        return false;
    };
    let [low_op, high_op] = op.operators;
    let [low, high] = op.values;
    low_op.compare(low, *number) && high_op.compare(*number, high)
}

fn text_matches(op: &TextOp, value: &FieldValue, patterns: &Patterns) -> bool {
    let FieldValue::String(text) = value else {
        return false;
    };
    match op.operator {
        TextOperator::Contains => text.to_lowercase().contains(&op.value.to_lowercase()),
        TextOperator::ContainsWords => {
            // A literal spanning several words never equals a single piece.
            let literal = op.value.to_lowercase();
            WORD_PIECES
                .find_iter(text)
                .any(|piece| piece.as_str().to_lowercase() == literal)
        }
        TextOperator::Matches => patterns
            .get(&op.value)
            .is_some_and(|regex| regex.is_match(text)),
    }
}

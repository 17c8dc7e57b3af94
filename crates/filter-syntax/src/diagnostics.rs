//! "Did you mean" hints for operator-shaped text.
//!
//! A query such as `colour:is red` parses without error: `colour` is not a
//! categorical field, so both tokens fall back to free text. These helpers
//! find tokens that look like an operator but were matched as text, and
//! point at the field that probably was meant.

use std::fmt;

use serde::Serialize;

use crate::filter::{
    parse_number, BooleanOperator, CategoricalOperator, FilterParser, NumericOperator,
    SetOperator, TaggedToken, TextOperator, TokenKind, WILDCARD,
};
use crate::schema::{FieldCategory, Schema};

/// A field reference the parser could not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldHint {
    /// The field name as written.
    pub field: String,
    /// Byte offset of the field name in the query.
    pub start: usize,
    /// Byte offset just past the field name.
    pub end: usize,
    /// The category the surrounding operator needs.
    pub expected: FieldCategory,
    /// The category the field is actually declared in, if any.
    pub declared: Option<FieldCategory>,
    /// The closest field of the expected category.
    pub suggestion: Option<String>,
}

impl fmt::Display for FieldHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.declared {
            Some(declared) => write!(
                f,
                "'{}' is a {} field, not a {} field",
                self.field, declared, self.expected
            )?,
            None => write!(f, "unknown {} field '{}'", self.expected, self.field)?,
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{suggestion}'?)")?;
        }
        Ok(())
    }
}

/// Returns a hint for every operator-shaped token matched as free text.
///
/// # Example
///
/// ```
/// use filter_syntax_rs::diagnostics::unknown_fields;
/// use filter_syntax_rs::{FieldCategory, Schema};
///
/// let schema = Schema::builder().categorical(["color"]).build().unwrap();
/// let hints = unknown_fields("colour:is red", &schema);
///
/// assert_eq!(hints.len(), 1);
/// assert_eq!(hints[0].expected, FieldCategory::Categorical);
/// assert_eq!(hints[0].suggestion.as_deref(), Some("color"));
/// ```
pub fn unknown_fields(query: &str, schema: &Schema) -> Vec<FieldHint> {
    let tagged = FilterParser::tokens_with_tags(query, schema);

    tagged
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::WildcardText && !t.token.quoted)
        .filter_map(|(index, t)| {
            operator_field(t).or_else(|| numeric_field(&tagged, index))
        })
        .filter_map(|(field, start, expected)| {
            let declared = schema.category_of(field);
            if declared == Some(expected) {
                // Declared correctly; the operator just lacked a value.
                return None;
            }
            Some(FieldHint {
                field: field.to_string(),
                start,
                end: start + field.len(),
                expected,
                declared,
                suggestion: schema.suggest_field(Some(expected), field).map(str::to_string),
            })
        })
        .collect()
}

/// Reads `is:field`, `field:is` and the other colon forms.
fn operator_field<'a>(tagged: &TaggedToken<'a>) -> Option<(&'a str, usize, FieldCategory)> {
    let text = tagged.token.text;
    let (left, right) = text.split_once(':')?;
    if left.is_empty() || right.is_empty() {
        return None;
    }

    if BooleanOperator::from_keyword(left).is_some() {
        return Some((right, tagged.token.start + left.len() + 1, FieldCategory::Boolean));
    }
    if left == WILDCARD {
        return None;
    }

    let expected = if SetOperator::from_keyword(right).is_some() {
        FieldCategory::Set
    } else if CategoricalOperator::from_keyword(right).is_some() {
        FieldCategory::Categorical
    } else if TextOperator::KEYWORDS
        .iter()
        .any(|(keyword, _)| right.starts_with(keyword))
    {
        FieldCategory::Text
    } else {
        return None;
    };
    Some((left, tagged.token.start, expected))
}

/// Reads `field <op> number`.
fn numeric_field<'a>(
    tagged: &[TaggedToken<'a>],
    index: usize,
) -> Option<(&'a str, usize, FieldCategory)> {
    let target = tagged.get(index)?.token;
    let operator = tagged.get(index + 1)?.token;
    let value = tagged.get(index + 2)?.token;

    let shaped = !operator.quoted
        && NumericOperator::from_keyword(operator.text).is_some()
        && !value.quoted
        && parse_number(value.text).is_some()
        && parse_number(target.text).is_none()
        && !target.text.contains(':');
    shaped.then_some((target.text, target.start, FieldCategory::Numeric))
}

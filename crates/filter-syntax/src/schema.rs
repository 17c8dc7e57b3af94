//! Field schema for filter queries.
//!
//! A [`Schema`] declares which field names each operator category recognizes.
//! The parser consults it to decide whether a token such as `color:is` is an
//! operator or plain free text, so every field name lives in exactly one
//! category.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;
use thiserror::Error;

use crate::filter::WILDCARD;

/// Maximum Levenshtein distance to consider a field name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Characters that split or terminate tokens and therefore cannot appear in a field name.
const RESERVED_CHARS: &[char] = &['(', ')', ',', ':', '=', '<', '>', '!', '"'];

/// The operator category a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    /// Flags tested with `is:field` / `not:field`.
    Boolean,
    /// String collections tested with `field:has` and friends.
    Set,
    /// Single strings from an implicit enumeration (`field:is`, `field:in`).
    Categorical,
    /// Numbers compared with relational operators.
    Numeric,
    /// Free text (`field:contains`, `field:contains-words`, `field:matches`).
    Text,
}

impl FieldCategory {
    /// All categories, in declaration order.
    pub const ALL: [FieldCategory; 5] = [
        FieldCategory::Boolean,
        FieldCategory::Set,
        FieldCategory::Categorical,
        FieldCategory::Numeric,
        FieldCategory::Text,
    ];

    /// Returns the lowercase name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldCategory::Boolean => "boolean",
            FieldCategory::Set => "set",
            FieldCategory::Categorical => "categorical",
            FieldCategory::Numeric => "numeric",
            FieldCategory::Text => "text",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building a [`Schema`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The same field name was declared in two categories.
    #[error("field '{field}' is declared as both {first} and {second}")]
    DuplicateField {
        /// The field name.
        field: String,
        /// The category it was first declared in.
        first: FieldCategory,
        /// The conflicting category.
        second: FieldCategory,
    },

    /// The field name is empty or contains whitespace or query syntax characters.
    #[error("invalid field name '{field}': names must be non-empty and contain no whitespace or ( ) , : = < > ! \"")]
    InvalidFieldName {
        /// The rejected name.
        field: String,
    },

    /// The field name is reserved by the query language.
    #[error("field name '{field}' is reserved")]
    ReservedFieldName {
        /// The rejected name.
        field: String,
    },
}

/// Field names recognized by the parser, grouped by operator category.
///
/// Field names are matched case-sensitively. Build one with [`Schema::builder`]
/// or deserialize it from a mapping with the keys `boolean`, `set`,
/// `categorical`, `numeric` and `text`.
///
/// # Example
///
/// ```
/// use filter_syntax_rs::{FieldCategory, Schema};
///
/// let schema = Schema::builder()
///     .boolean(["archived"])
///     .numeric(["price"])
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.category_of("price"), Some(FieldCategory::Numeric));
/// assert_eq!(schema.category_of("Price"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDefinition")]
pub struct Schema {
    boolean: BTreeSet<String>,
    set: BTreeSet<String>,
    categorical: BTreeSet<String>,
    numeric: BTreeSet<String>,
    text: BTreeSet<String>,
}

/// Field lists as written in a schema file, before validation.
///
/// Deserialize this instead of [`Schema`] to keep parse errors and
/// [`SchemaError`]s apart; `Schema::try_from` validates it.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    #[serde(default)]
    pub boolean: Vec<String>,
    #[serde(default)]
    pub set: Vec<String>,
    #[serde(default)]
    pub categorical: Vec<String>,
    #[serde(default)]
    pub numeric: Vec<String>,
    #[serde(default)]
    pub text: Vec<String>,
}

impl TryFrom<SchemaDefinition> for Schema {
    type Error = SchemaError;

    fn try_from(def: SchemaDefinition) -> Result<Self, Self::Error> {
        Schema::builder()
            .boolean(def.boolean)
            .set(def.set)
            .categorical(def.categorical)
            .numeric(def.numeric)
            .text(def.text)
            .build()
    }
}

impl Schema {
    /// Creates a builder for a new schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Returns the field names declared for a category.
    pub fn fields(&self, category: FieldCategory) -> &BTreeSet<String> {
        match category {
            FieldCategory::Boolean => &self.boolean,
            FieldCategory::Set => &self.set,
            FieldCategory::Categorical => &self.categorical,
            FieldCategory::Numeric => &self.numeric,
            FieldCategory::Text => &self.text,
        }
    }

    /// Returns true if `name` is declared in `category`.
    pub fn contains(&self, category: FieldCategory, name: &str) -> bool {
        self.fields(category).contains(name)
    }

    /// Returns the category `name` is declared in, if any.
    pub fn category_of(&self, name: &str) -> Option<FieldCategory> {
        FieldCategory::ALL
            .into_iter()
            .find(|category| self.contains(*category, name))
    }

    /// Iterates over every declared field with its category.
    pub fn iter(&self) -> impl Iterator<Item = (FieldCategory, &str)> {
        FieldCategory::ALL.into_iter().flat_map(move |category| {
            self.fields(category)
                .iter()
                .map(move |name| (category, name.as_str()))
        })
    }

    /// Returns true if no field is declared.
    pub fn is_empty(&self) -> bool {
        FieldCategory::ALL
            .into_iter()
            .all(|category| self.fields(category).is_empty())
    }

    /// Finds the declared field closest to `name`, optionally limited to one category.
    ///
    /// Distance is measured case-insensitively so that `Price` suggests
    /// `price`; an exact match is never suggested.
    pub fn suggest_field(&self, category: Option<FieldCategory>, name: &str) -> Option<&str> {
        let name_lower = name.to_lowercase();

        let (best_match, best_distance) = self
            .iter()
            .filter(|(c, field)| category.is_none_or(|wanted| wanted == *c) && *field != name)
            .map(|(_, field)| (field, levenshtein(&name_lower, &field.to_lowercase())))
            .min_by_key(|(_, d)| *d)?;

        (best_distance <= MAX_SUGGESTION_DISTANCE).then_some(best_match)
    }
}

/// Builder for [`Schema`], validating names when [`build`](SchemaBuilder::build) is called.
#[derive(Debug, Default, Clone)]
pub struct SchemaBuilder {
    fields: Vec<(FieldCategory, String)>,
}

impl SchemaBuilder {
    /// Adds field names to a category.
    pub fn fields<I, S>(mut self, category: FieldCategory, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .extend(names.into_iter().map(|name| (category, name.into())));
        self
    }

    /// Adds boolean fields.
    pub fn boolean<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields(FieldCategory::Boolean, names)
    }

    /// Adds set fields.
    pub fn set<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields(FieldCategory::Set, names)
    }

    /// Adds categorical fields.
    pub fn categorical<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields(FieldCategory::Categorical, names)
    }

    /// Adds numeric fields.
    pub fn numeric<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields(FieldCategory::Numeric, names)
    }

    /// Adds text fields.
    pub fn text<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields(FieldCategory::Text, names)
    }

    /// Validates the collected names and builds the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ReservedFieldName`] for `*`,
    /// [`SchemaError::InvalidFieldName`] for names the lexer could not keep in
    /// one token, and [`SchemaError::DuplicateField`] when a name appears in two
    /// categories. Repeating a name within one category is allowed.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut schema = Schema::default();

        for (category, name) in self.fields {
            validate_field_name(&name)?;

            if let Some(first) = schema.category_of(&name) {
                if first != category {
                    return Err(SchemaError::DuplicateField {
                        field: name,
                        first,
                        second: category,
                    });
                }
                continue;
            }

            let set = match category {
                FieldCategory::Boolean => &mut schema.boolean,
                FieldCategory::Set => &mut schema.set,
                FieldCategory::Categorical => &mut schema.categorical,
                FieldCategory::Numeric => &mut schema.numeric,
                FieldCategory::Text => &mut schema.text,
            };
            set.insert(name);
        }

        Ok(schema)
    }
}

fn validate_field_name(name: &str) -> Result<(), SchemaError> {
    if name == WILDCARD {
        return Err(SchemaError::ReservedFieldName {
            field: name.to_string(),
        });
    }
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c)) {
        return Err(SchemaError::InvalidFieldName {
            field: name.to_string(),
        });
    }
    Ok(())
}

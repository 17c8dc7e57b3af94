//! Abstract Syntax Tree (AST) for filter expressions.

use std::fmt;
use std::slice;

use serde::Serialize;

/// The wildcard target used by free-text matches.
pub const WILDCARD: &str = "*";

/// Represents a parsed filter expression.
///
/// Leaf variants read one field through the caller's field getter; `Complex`
/// and `Not` combine other expressions. Serializes with a `type` tag
/// (`ComplexExpr`, `NotExpr`, `BooleanOp`, ...) for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expr {
    // ==================== Composite ====================
    /// Conjunction or disjunction of operands.
    ///
    /// An empty AND is the canonical "match everything" node.
    #[serde(rename = "ComplexExpr")]
    Complex {
        /// How the operands combine.
        #[serde(rename = "operator")]
        combinator: Combinator,
        /// The combined expressions, in query order.
        operands: Vec<Expr>,
    },

    /// Logical negation.
    #[serde(rename = "NotExpr")]
    Not {
        /// The negated expression.
        operand: Box<Expr>,
    },

    // ==================== Leaves ====================
    /// Boolean flag test (`is:field`, `not:field`).
    #[serde(rename = "BooleanOp")]
    Boolean(BooleanOp),

    /// Set membership test (`field:has-any-of a, b`).
    #[serde(rename = "SetOp")]
    Set(SetOp),

    /// Categorical value test (`field:in a, b`).
    #[serde(rename = "CategoricalOp")]
    Categorical(CategoricalOp),

    /// Single-bound numeric comparison (`field >= 3`).
    #[serde(rename = "NumericOp")]
    Numeric(NumericOp),

    /// Two-sided numeric range (`1 < field <= 3`).
    #[serde(rename = "CompoundNumericOp")]
    CompoundNumeric(CompoundNumericOp),

    /// Text test (`field:contains foo`), also used for free-text fallback.
    #[serde(rename = "TextOp")]
    Text(TextOp),
}

impl Expr {
    /// Returns the empty AND node, which matches every record.
    pub fn match_all() -> Self {
        Expr::Complex {
            combinator: Combinator::And,
            operands: Vec::new(),
        }
    }

    /// Creates an AND of the given operands.
    pub fn and(operands: Vec<Expr>) -> Self {
        Expr::Complex {
            combinator: Combinator::And,
            operands,
        }
    }

    /// Creates an OR of the given operands.
    pub fn or(operands: Vec<Expr>) -> Self {
        Expr::Complex {
            combinator: Combinator::Or,
            operands,
        }
    }

    /// Creates a NOT of another expression.
    pub fn negate(operand: Expr) -> Self {
        Expr::Not {
            operand: Box::new(operand),
        }
    }

    /// Creates a free-text match against the wildcard target.
    pub fn free_text(value: impl Into<String>) -> Self {
        Expr::Text(TextOp {
            target: TextTarget::Wildcard,
            operator: TextOperator::Contains,
            value: value.into(),
        })
    }

    /// Returns true for the empty AND node.
    pub fn is_match_all(&self) -> bool {
        matches!(
            self,
            Expr::Complex {
                combinator: Combinator::And,
                operands,
            } if operands.is_empty()
        )
    }

    /// Returns the field name a leaf reads (`*` for wildcard text), or `None` for composites.
    pub fn target(&self) -> Option<&str> {
        match self {
            Expr::Complex { .. } | Expr::Not { .. } => None,
            Expr::Boolean(op) => Some(&op.target),
            Expr::Set(op) => Some(&op.target),
            Expr::Categorical(op) => Some(&op.target),
            Expr::Numeric(op) => Some(&op.target),
            Expr::CompoundNumeric(op) => Some(&op.target),
            Expr::Text(op) => Some(op.target.as_str()),
        }
    }
}

/// Defines an operator enum with its keyword table.
///
/// Each operator gets `keyword()`, `from_keyword()` and a `KEYWORDS` slice
/// listing keywords in match priority order.
macro_rules! operator_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $keyword:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $keyword)]
                $variant,
            )+
        }

        impl $name {
            /// Keywords in match priority order.
            pub const KEYWORDS: &'static [(&'static str, $name)] = &[$(($keyword, $name::$variant)),+];

            /// Returns the query keyword for this operator.
            pub fn keyword(&self) -> &'static str {
                match self {
                    $($name::$variant => $keyword,)+
                }
            }

            /// Looks up an operator by its exact keyword.
            pub fn from_keyword(keyword: &str) -> Option<Self> {
                Self::KEYWORDS
                    .iter()
                    .find(|(k, _)| *k == keyword)
                    .map(|(_, op)| *op)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }
    };
}

operator_enum! {
    /// How the operands of a complex expression combine.
    Combinator {
        /// Every operand must match.
        And => "AND",
        /// At least one operand must match.
        Or => "OR",
    }
}

operator_enum! {
    /// Boolean flag operators.
    BooleanOperator {
        /// The flag is `true`.
        Is => "is",
        /// The flag is `false`.
        Not => "not",
    }
}

operator_enum! {
    /// Set membership operators.
    SetOperator {
        /// The set contains the single value.
        Has => "has",
        /// The set contains every listed value.
        HasAllOf => "has-all-of",
        /// The set contains at least one listed value.
        HasAnyOf => "has-any-of",
        /// Every element of the set is listed.
        AllIn => "all-in",
        /// The set contains every listed value (same test as `has-all-of`).
        Equals => "equals",
    }
}

operator_enum! {
    /// Categorical operators.
    CategoricalOperator {
        /// The value equals the literal.
        Is => "is",
        /// The value is one of the listed literals.
        In => "in",
    }
}

operator_enum! {
    /// Relational operators. Two-character operators are listed first so the
    /// lexer never splits `<=` into `<` and `=`.
    NumericOperator {
        /// `<=`
        Le => "<=",
        /// `<`
        Lt => "<",
        /// `>=`
        Ge => ">=",
        /// `>`
        Gt => ">",
        /// `!=`
        Ne => "!=",
        /// `=`
        Eq => "=",
    }
}

operator_enum! {
    /// Text operators. `contains-words` precedes `contains` so the longer
    /// keyword wins prefix matching.
    TextOperator {
        /// Whole-word equality, case-insensitive.
        ContainsWords => "contains-words",
        /// Substring, case-insensitive.
        Contains => "contains",
        /// Case-insensitive regular expression.
        Matches => "matches",
    }
}

/// Which side of a range an ordering operator bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeDirection {
    /// `<` and `<=`: values increase left to right.
    Ascending,
    /// `>` and `>=`: values decrease left to right.
    Descending,
}

impl NumericOperator {
    /// Returns the range direction of ordering operators; `None` for `=` and `!=`.
    pub fn direction(&self) -> Option<RangeDirection> {
        match self {
            NumericOperator::Lt | NumericOperator::Le => Some(RangeDirection::Ascending),
            NumericOperator::Gt | NumericOperator::Ge => Some(RangeDirection::Descending),
            NumericOperator::Eq | NumericOperator::Ne => None,
        }
    }

    /// Applies the comparison `left <op> right`.
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            NumericOperator::Lt => left < right,
            NumericOperator::Le => left <= right,
            NumericOperator::Gt => left > right,
            NumericOperator::Ge => left >= right,
            NumericOperator::Eq => left == right,
            NumericOperator::Ne => left != right,
        }
    }
}

/// A literal operand: one value, or a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryArg {
    /// A single value (`has`, `is`).
    One(String),
    /// A list of values (`has-any-of a, b`, `in a, b`).
    Many(Vec<String>),
}

impl QueryArg {
    /// Returns the values as a slice, regardless of shape.
    pub fn as_slice(&self) -> &[String] {
        match self {
            QueryArg::One(value) => slice::from_ref(value),
            QueryArg::Many(values) => values,
        }
    }

    /// Returns true if `value` is one of the literal values.
    pub fn contains(&self, value: &str) -> bool {
        self.as_slice().iter().any(|v| v == value)
    }
}

/// The field a text operator reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextTarget {
    /// A schema-declared text field.
    Field(String),
    /// The whole record (`*`).
    Wildcard,
}

impl TextTarget {
    /// Returns the field name, `*` for the wildcard.
    pub fn as_str(&self) -> &str {
        match self {
            TextTarget::Field(name) => name,
            TextTarget::Wildcard => WILDCARD,
        }
    }
}

impl Serialize for TextTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `is:target` / `not:target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanOp {
    pub target: String,
    pub operator: BooleanOperator,
}

/// `target:operator value[, value...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetOp {
    pub target: String,
    pub operator: SetOperator,
    pub value: QueryArg,
}

/// `target:is value` / `target:in value[, value...]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalOp {
    pub target: String,
    pub operator: CategoricalOperator,
    pub value: QueryArg,
}

/// `target <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericOp {
    pub target: String,
    pub operator: NumericOperator,
    pub value: f64,
}

/// `values[0] <operators[0]> target <operators[1]> values[1]`.
///
/// Both operators always share one [`RangeDirection`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompoundNumericOp {
    pub target: String,
    pub operators: [NumericOperator; 2],
    pub values: [f64; 2],
}

impl CompoundNumericOp {
    /// Creates a range, or `None` if the operators are not both ordering
    /// operators of the same direction.
    pub fn new(
        target: impl Into<String>,
        operators: [NumericOperator; 2],
        values: [f64; 2],
    ) -> Option<Self> {
        let direction = operators[0].direction()?;
        if operators[1].direction()? != direction {
            return None;
        }
        Some(Self {
            target: target.into(),
            operators,
            values,
        })
    }
}

/// `target:operator value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextOp {
    pub target: TextTarget,
    pub operator: TextOperator,
    pub value: String,
}

//! Recursive descent parser for filter expressions.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, trace};

use super::ast::{
    BooleanOp, BooleanOperator, CategoricalOp, CategoricalOperator, Combinator, CompoundNumericOp,
    Expr, NumericOp, NumericOperator, QueryArg, SetOp, SetOperator, TextOp, TextOperator,
    TextTarget, WILDCARD,
};
use super::error::{FilterError, FilterResult};
use super::lexer::{tokenize, Token};
use crate::schema::{FieldCategory, Schema};

/// How the parser interpreted a token, for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// Not reached by any parse alternative.
    Unknown,
    /// `(` or `)` of a group.
    Paren,
    /// `,` separating list values.
    Comma,
    /// `AND`, `OR` or `NOT`.
    Combinator,
    /// `is:field` / `not:field`.
    BooleanOp,
    /// `field:has` and the other set operators.
    SetOp,
    /// `field:is` / `field:in`.
    CategoricalOp,
    /// `field:contains` and the other text operators.
    TextOp,
    /// A relational operator.
    NumericOp,
    /// The field of a numeric comparison.
    NumericTarget,
    /// A numeric literal.
    Number,
    /// The value of a set, categorical or text operator.
    QueryArg,
    /// A token matched as free text against the wildcard target.
    WildcardText,
}

/// A token with the interpretation the parser gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaggedToken<'a> {
    #[serde(flatten)]
    pub token: Token<'a>,
    pub kind: TokenKind,
}

/// Result of one parse alternative: the node and the index after it.
type Parsed = Option<(Expr, usize)>;

/// Deepest nesting of groups and `NOT` the parser builds. Deeper `(` and `NOT`
/// tokens are matched as free text.
pub const MAX_NESTING: usize = 64;

/// Parser for filter expressions.
///
/// The parser is type-directed: whether `color:is red` is a categorical test
/// or two words of free text depends on whether `color` is declared
/// categorical in the [`Schema`]. Anything that does not fit an operator
/// shape degrades to a free-text match, so almost every input parses.
///
/// # Grammar
///
/// ```text
/// query   ::= complex
/// complex ::= expr (("AND" | "OR")? expr)*
/// expr    ::= "(" complex ")"
///           | "NOT" expr
///           | ("is" | "not") ":" BOOLEAN_FIELD
///           | SET_FIELD ":" set_op value ("," value)*
///           | CATEGORICAL_FIELD ":" ("is" | "in") value ("," value)*
///           | NUMBER rel NUMERIC_FIELD rel NUMBER
///           | NUMERIC_FIELD rel NUMBER
///           | (TEXT_FIELD | "*") ":" text_op value
///           | any token
/// ```
///
/// Alternatives of `expr` are tried in the order above and the first that
/// succeeds wins. A group's combinator is fixed by the first `AND`/`OR`
/// after its first operand; operands written side by side without a keyword
/// continue the same group.
///
/// # Example
///
/// ```
/// use filter_syntax_rs::filter::{Expr, FilterParser};
/// use filter_syntax_rs::Schema;
///
/// let schema = Schema::builder().numeric(["price"]).build().unwrap();
/// let expr = FilterParser::parse("price < 10 OR cheap", &schema).unwrap();
/// assert!(matches!(expr, Expr::Complex { .. }));
/// ```
pub struct FilterParser<'a, 's> {
    tokens: Vec<Token<'a>>,
    kinds: Vec<TokenKind>,
    schema: &'s Schema,
    /// Current nesting of `parse_expr` calls.
    depth: usize,
    /// `(index, depth)` pairs where a group was tried and never closed.
    unclosed_groups: HashSet<(usize, usize)>,
}

impl<'a, 's> FilterParser<'a, 's> {
    /// Parses a filter expression string into an [`Expr`].
    ///
    /// The result is always a complex expression at the top level; an empty
    /// or blank query yields the match-everything node.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnexpectedToken`] if tokens remain that could not
    /// be placed in the tree after trailing `)` tokens were absorbed as text.
    pub fn parse(input: &'a str, schema: &'s Schema) -> FilterResult<Expr> {
        Self::parse_with_tags(input, schema).map(|(expr, _)| expr)
    }

    /// Parses a filter expression and also returns how each token was interpreted.
    ///
    /// # Errors
    ///
    /// Same as [`FilterParser::parse`].
    pub fn parse_with_tags(
        input: &'a str,
        schema: &'s Schema,
    ) -> FilterResult<(Expr, Vec<TaggedToken<'a>>)> {
        let mut parser = Self::new(input, schema);
        let (expr, end) = parser.parse_query();

        if let Some(remaining) = parser.tokens.get(end) {
            debug!(
                token = remaining.text,
                position = remaining.start,
                "filter query has unparsed tokens"
            );
            return Err(FilterError::unexpected_token(remaining.text, remaining.start));
        }

        Ok((expr, parser.into_tagged()))
    }

    /// Classifies the tokens of a query without building the tree.
    ///
    /// Runs the same algorithm as [`FilterParser::parse`] and never fails; use it
    /// for highlighting partially typed input.
    pub fn tokens_with_tags(input: &'a str, schema: &'s Schema) -> Vec<TaggedToken<'a>> {
        let mut parser = Self::new(input, schema);
        parser.parse_query();
        parser.into_tagged()
    }

    fn new(input: &'a str, schema: &'s Schema) -> Self {
        let tokens = tokenize(input);
        let kinds = vec![TokenKind::Unknown; tokens.len()];
        Self {
            tokens,
            kinds,
            schema,
            depth: 0,
            unclosed_groups: HashSet::new(),
        }
    }

    fn into_tagged(self) -> Vec<TaggedToken<'a>> {
        self.tokens
            .into_iter()
            .zip(self.kinds)
            .map(|(token, kind)| TaggedToken { token, kind })
            .collect()
    }

    // ==================== Token Helpers ====================

    fn tag(&mut self, index: usize, kind: TokenKind) {
        if let Some(slot) = self.kinds.get_mut(index) {
            *slot = kind;
        }
    }

    /// Returns the text of the token at `index` if it exists and is unquoted.
    fn unquoted(&self, index: usize) -> Option<&'a str> {
        self.tokens
            .get(index)
            .filter(|token| !token.quoted)
            .map(|token| token.text)
    }

    /// Returns true if the token at `index` is the unquoted `text`.
    fn is_syntax(&self, index: usize, text: &str) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|token| token.is_syntax(text))
    }

    /// Returns the unquoted token at `index` parsed as a number.
    fn number(&self, index: usize) -> Option<f64> {
        self.unquoted(index).and_then(parse_number)
    }

    /// Returns the relational operator at `index`.
    fn numeric_operator(&self, index: usize) -> Option<NumericOperator> {
        self.unquoted(index).and_then(NumericOperator::from_keyword)
    }

    // ==================== Structure ====================

    /// Parses the whole query and absorbs trailing `)` tokens as free text.
    fn parse_query(&mut self) -> (Expr, usize) {
        let (mut expr, mut index) = self.parse_complex(0, true);

        // Guard only: the top level already reads `)` as free text.
        while self.is_syntax(index, ")") {
            if let Expr::Complex { operands, .. } = &mut expr {
                operands.push(Expr::free_text(")"));
            }
            self.tag(index, TokenKind::WildcardText);
            index += 1;
        }

        (expr, index)
    }

    /// Parses operands joined by one combinator, starting at `index`.
    ///
    /// Inside a group (`accept_right_paren == false`) an unquoted `)` ends the
    /// operand list and is left for the caller.
    fn parse_complex(&mut self, index: usize, accept_right_paren: bool) -> (Expr, usize) {
        if !accept_right_paren && self.is_syntax(index, ")") {
            return (Expr::match_all(), index);
        }
        let Some((first, next)) = self.parse_expr(index) else {
            return (Expr::match_all(), index);
        };

        let mut operands = vec![first];
        let combinator = Combinator::KEYWORDS
            .iter()
            .find(|(keyword, _)| self.is_syntax(next, keyword))
            .map(|(_, combinator)| *combinator);

        let mut i = next;
        if combinator.is_some() {
            self.tag(i, TokenKind::Combinator);
            i += 1;
        }

        while i < self.tokens.len() && (accept_right_paren || !self.is_syntax(i, ")")) {
            let Some((operand, next)) = self.parse_expr(i) else {
                break;
            };
            operands.push(operand);

            match combinator {
                Some(combinator) if self.is_syntax(next, combinator.keyword()) => {
                    self.tag(next, TokenKind::Combinator);
                    i = next + 1;
                }
                _ => i = next,
            }
        }

        let expr = Expr::Complex {
            combinator: combinator.unwrap_or(Combinator::And),
            operands,
        };
        (expr, i)
    }

    /// Parses one expression at `index`, trying each alternative in priority order.
    ///
    /// Group outcomes depend only on the start index and the depth, which is
    /// what makes caching unclosed groups sound.
    fn parse_expr(&mut self, index: usize) -> Parsed {
        let alternatives: [fn(&mut Self, usize) -> Parsed; 8] = [
            Self::parse_group,
            Self::parse_not,
            Self::parse_boolean_op,
            Self::parse_set_op,
            Self::parse_categorical_op,
            Self::parse_numeric_op,
            Self::parse_text_op,
            Self::parse_free_text,
        ];

        self.depth += 1;
        let parsed = alternatives
            .into_iter()
            .find_map(|alternative| alternative(self, index));
        self.depth -= 1;
        parsed
    }

    /// Returns true if a group or `NOT` may open at the current depth.
    fn can_nest(&self, index: usize) -> bool {
        if self.depth > MAX_NESTING {
            trace!(index, "nesting limit reached");
            return false;
        }
        true
    }

    /// `"(" complex ")"`
    fn parse_group(&mut self, index: usize) -> Parsed {
        if !self.is_syntax(index, "(") || !self.can_nest(index) {
            return None;
        }
        let key = (index, self.depth);
        if self.unclosed_groups.contains(&key) {
            return None;
        }
        self.tag(index, TokenKind::Paren);

        let (inner, next) = self.parse_complex(index + 1, false);
        if !self.is_syntax(next, ")") {
            self.unclosed_groups.insert(key);
            return None;
        }
        self.tag(next, TokenKind::Paren);
        Some((inner, next + 1))
    }

    /// `"NOT" expr`
    fn parse_not(&mut self, index: usize) -> Parsed {
        if !self.is_syntax(index, "NOT") || !self.can_nest(index) {
            return None;
        }
        let (operand, next) = self.parse_expr(index + 1)?;
        self.tag(index, TokenKind::Combinator);
        Some((Expr::negate(operand), next))
    }

    // ==================== Typed Operators ====================

    /// `("is" | "not") ":" BOOLEAN_FIELD`
    fn parse_boolean_op(&mut self, index: usize) -> Parsed {
        let (keyword, target) = self.unquoted(index)?.split_once(':')?;
        let operator = BooleanOperator::from_keyword(keyword)?;
        if !self.schema.contains(FieldCategory::Boolean, target) {
            return None;
        }

        self.tag(index, TokenKind::BooleanOp);
        let op = BooleanOp {
            target: target.to_string(),
            operator,
        };
        Some((Expr::Boolean(op), index + 1))
    }

    /// `SET_FIELD ":" set_op value ("," value)*`
    fn parse_set_op(&mut self, index: usize) -> Parsed {
        let (target, keyword) = self.unquoted(index)?.split_once(':')?;
        let operator = SetOperator::from_keyword(keyword)?;
        if !self.schema.contains(FieldCategory::Set, target) || index + 1 >= self.tokens.len() {
            return None;
        }

        self.tag(index, TokenKind::SetOp);
        let (value, next) = match operator {
            SetOperator::Has => self.parse_single_value(index + 1),
            _ => self.parse_value_list(index + 1),
        };
        let op = SetOp {
            target: target.to_string(),
            operator,
            value,
        };
        Some((Expr::Set(op), next))
    }

    /// `CATEGORICAL_FIELD ":" ("is" | "in") value ("," value)*`
    fn parse_categorical_op(&mut self, index: usize) -> Parsed {
        let (target, keyword) = self.unquoted(index)?.split_once(':')?;
        let operator = CategoricalOperator::from_keyword(keyword)?;
        if !self.schema.contains(FieldCategory::Categorical, target)
            || index + 1 >= self.tokens.len()
        {
            return None;
        }

        self.tag(index, TokenKind::CategoricalOp);
        let (value, next) = match operator {
            CategoricalOperator::Is => self.parse_single_value(index + 1),
            CategoricalOperator::In => self.parse_value_list(index + 1),
        };
        let op = CategoricalOp {
            target: target.to_string(),
            operator,
            value,
        };
        Some((Expr::Categorical(op), next))
    }

    /// Reads the single value token at `index`, quoted or not.
    fn parse_single_value(&mut self, index: usize) -> (QueryArg, usize) {
        self.tag(index, TokenKind::QueryArg);
        let value = self.tokens[index].text.to_string();
        (QueryArg::One(value), index + 1)
    }

    /// Reads the value at `index` plus every following `"," value` pair.
    fn parse_value_list(&mut self, index: usize) -> (QueryArg, usize) {
        self.tag(index, TokenKind::QueryArg);
        let mut values = vec![self.tokens[index].text.to_string()];

        let mut i = index + 1;
        while i + 1 < self.tokens.len() && self.is_syntax(i, ",") {
            self.tag(i, TokenKind::Comma);
            self.tag(i + 1, TokenKind::QueryArg);
            values.push(self.tokens[i + 1].text.to_string());
            i += 2;
        }

        (QueryArg::Many(values), i)
    }

    /// `NUMBER rel NUMERIC_FIELD rel NUMBER` or `NUMERIC_FIELD rel NUMBER`.
    ///
    /// A leading number commits to the range form.
    fn parse_numeric_op(&mut self, index: usize) -> Parsed {
        if self.number(index).is_some() {
            return self.parse_numeric_range(index);
        }

        let target = self.unquoted(index)?;
        if !self.schema.contains(FieldCategory::Numeric, target) {
            return None;
        }
        let operator = self.numeric_operator(index + 1)?;
        let value = self.number(index + 2)?;

        self.tag(index, TokenKind::NumericTarget);
        self.tag(index + 1, TokenKind::NumericOp);
        self.tag(index + 2, TokenKind::Number);
        let op = NumericOp {
            target: target.to_string(),
            operator,
            value,
        };
        Some((Expr::Numeric(op), index + 3))
    }

    fn parse_numeric_range(&mut self, index: usize) -> Parsed {
        let low = self.number(index)?;
        let first = self.numeric_operator(index + 1)?;
        let target = self.unquoted(index + 2)?;
        if !self.schema.contains(FieldCategory::Numeric, target) {
            return None;
        }
        let second = self.numeric_operator(index + 3)?;
        let high = self.number(index + 4)?;
        let op = CompoundNumericOp::new(target, [first, second], [low, high])?;

        self.tag(index, TokenKind::Number);
        self.tag(index + 1, TokenKind::NumericOp);
        self.tag(index + 2, TokenKind::NumericTarget);
        self.tag(index + 3, TokenKind::NumericOp);
        self.tag(index + 4, TokenKind::Number);
        Some((Expr::CompoundNumeric(op), index + 5))
    }

    /// `(TEXT_FIELD | "*") ":" text_op value`
    ///
    /// The operator is matched as a prefix of the text after the colon.
    fn parse_text_op(&mut self, index: usize) -> Parsed {
        let (target, rest) = self.unquoted(index)?.split_once(':')?;
        let (_, operator) = TextOperator::KEYWORDS
            .iter()
            .find(|(keyword, _)| rest.starts_with(keyword))?;

        let target = if target == WILDCARD {
            TextTarget::Wildcard
        } else if self.schema.contains(FieldCategory::Text, target) {
            TextTarget::Field(target.to_string())
        } else {
            return None;
        };
        let value = self.tokens.get(index + 1)?.text.to_string();

        self.tag(index, TokenKind::TextOp);
        self.tag(index + 1, TokenKind::QueryArg);
        let op = TextOp {
            target,
            operator: *operator,
            value,
        };
        Some((Expr::Text(op), index + 2))
    }

    /// Any single token becomes a free-text match.
    fn parse_free_text(&mut self, index: usize) -> Parsed {
        let token = self.tokens.get(index)?;
        trace!(token = token.text, "matching token as free text");
        let expr = Expr::free_text(token.text);
        self.tag(index, TokenKind::WildcardText);
        Some((expr, index + 1))
    }
}

/// Parses `-?digits(.digits)?` as a number.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    fn is_digits(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
    }

    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let valid = match unsigned.split_once('.') {
        Some((whole, fraction)) => is_digits(whole) && is_digits(fraction),
        None => is_digits(unsigned),
    };
    if !valid {
        return None;
    }
    text.parse().ok()
}

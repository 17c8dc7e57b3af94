//! Error types for the filter parser.

use thiserror::Error;

/// A specialized Result type for filter parsing operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur during filter parsing.
///
/// Unknown fields and malformed operator fragments are not errors: they
/// become free-text matches. Only structure the parser cannot place anywhere
/// in the tree is reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Tokens remained after the whole query was parsed.
    #[error("unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The first token that could not be placed.
        token: String,
        /// Byte offset of the token in the query.
        position: usize,
    },
}

impl FilterError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        FilterError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Returns the byte offset the error points at.
    pub fn position(&self) -> usize {
        match self {
            FilterError::UnexpectedToken { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_display() {
        let err = FilterError::unexpected_token(")", 7);
        assert_eq!(err.to_string(), "unexpected token ')' at position 7");
        assert_eq!(err.position(), 7);
    }
}

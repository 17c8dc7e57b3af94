//! Lexer (tokenizer) for filter expressions.
//!
//! The lexer only splits the input into spans. Whether a span is a keyword,
//! an operator or free text depends on its position and on the schema, so
//! that decision is left to the parser.

use std::iter::Peekable;
use std::str::CharIndices;

use serde::Serialize;

use super::ast::NumericOperator;

/// A span of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// Whether the span was written as `"..."`. Quoted tokens are never syntax.
    pub quoted: bool,
    /// The token text, without surrounding quotes.
    pub text: &'a str,
    /// Byte offset where the span starts (at the opening quote for quoted tokens).
    pub start: usize,
    /// Byte offset just past the span (past the closing quote for quoted tokens).
    pub end: usize,
}

impl<'a> Token<'a> {
    /// Returns true if this is the unquoted token `text`.
    pub fn is_syntax(&self, text: &str) -> bool {
        !self.quoted && self.text == text
    }
}

/// Lexer for tokenizing filter expressions.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Start of the pending run of literal characters, if any.
    literal_start: Option<usize>,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            literal_start: None,
            tokens: Vec::new(),
        }
    }

    /// Emits the pending literal run ending at `end`.
    fn flush_literal(&mut self, end: usize) {
        if let Some(start) = self.literal_start.take() {
            let input = self.input;
            self.push(false, &input[start..end], start, end);
        }
    }

    fn push(&mut self, quoted: bool, text: &'a str, start: usize, end: usize) {
        self.tokens.push(Token {
            quoted,
            text,
            start,
            end,
        });
    }

    /// Marks the character at `position` as part of a literal run.
    fn extend_literal(&mut self, position: usize) {
        self.literal_start.get_or_insert(position);
    }

    /// Tries to read a quoted string whose opening quote is at `position`.
    ///
    /// Only a closing quote with at least one character in between makes a
    /// quoted token; otherwise nothing is consumed.
    fn read_quoted(&mut self, position: usize) -> bool {
        let content_start = position + 1;
        let Some(length) = self.input[content_start..].find('"') else {
            return false;
        };
        if length == 0 {
            return false;
        }

        let input = self.input;
        let close = content_start + length;
        self.flush_literal(position);
        self.push(true, &input[content_start..close], position, close + 1);

        // Skip to just past the closing quote
        while let Some(&(i, _)) = self.chars.peek() {
            if i > close {
                break;
            }
            self.chars.next();
        }
        true
    }

    /// Tries to read a relational operator starting at `position`.
    fn read_operator(&mut self, position: usize) -> bool {
        let input = self.input;
        let rest = &input[position..];
        let Some((keyword, _)) = NumericOperator::KEYWORDS
            .iter()
            .find(|(keyword, _)| rest.starts_with(keyword))
        else {
            return false;
        };

        let end = position + keyword.len();
        self.flush_literal(position);
        self.push(false, &input[position..end], position, end);

        while let Some(&(i, _)) = self.chars.peek() {
            if i >= end {
                break;
            }
            self.chars.next();
        }
        true
    }

    /// Collects all tokens.
    pub fn tokenize(mut self) -> Vec<Token<'a>> {
        let input = self.input;
        while let Some(&(position, c)) = self.chars.peek() {
            match c {
                _ if c.is_whitespace() => {
                    self.flush_literal(position);
                    self.chars.next();
                }
                '(' | ')' | ',' => {
                    self.flush_literal(position);
                    self.chars.next();
                    self.push(false, &input[position..position + 1], position, position + 1);
                }
                '"' => {
                    if !self.read_quoted(position) {
                        self.extend_literal(position);
                        self.chars.next();
                    }
                }
                '<' | '>' | '=' | '!' => {
                    if !self.read_operator(position) {
                        self.extend_literal(position);
                        self.chars.next();
                    }
                }
                _ => {
                    self.extend_literal(position);
                    self.chars.next();
                }
            }
        }

        self.flush_literal(input.len());
        self.tokens
    }
}

/// Splits `input` into tokens.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns `(quoted, text)` pairs, dropping offsets.
    fn texts(input: &str) -> Vec<(bool, &str)> {
        tokenize(input)
            .into_iter()
            .map(|t| (t.quoted, t.text))
            .collect()
    }

    #[test]
    fn test_tokenize_words() {
        assert_eq!(texts("Hello world"), vec![(false, "Hello"), (false, "world")]);
    }

    #[test]
    fn test_tokenize_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n").is_empty());
    }

    #[test]
    fn test_tokenize_punctuation() {
        assert_eq!(
            texts("(a,b)"),
            vec![
                (false, "("),
                (false, "a"),
                (false, ","),
                (false, "b"),
                (false, ")"),
            ]
        );
    }

    #[test]
    fn test_tokenize_operators_longest_first() {
        assert_eq!(
            texts("300<=number<500"),
            vec![
                (false, "300"),
                (false, "<="),
                (false, "number"),
                (false, "<"),
                (false, "500"),
            ]
        );
        assert_eq!(
            texts("a>=1 b!=2 c=3 d>4"),
            vec![
                (false, "a"),
                (false, ">="),
                (false, "1"),
                (false, "b"),
                (false, "!="),
                (false, "2"),
                (false, "c"),
                (false, "="),
                (false, "3"),
                (false, "d"),
                (false, ">"),
                (false, "4"),
            ]
        );
    }

    #[test]
    fn test_tokenize_bang_alone_is_literal() {
        assert_eq!(texts("wow!"), vec![(false, "wow!")]);
    }

    #[test]
    fn test_tokenize_quoted() {
        assert_eq!(
            texts(r#"subject:has "foo bar", "bar baz""#),
            vec![
                (false, "subject:has"),
                (true, "foo bar"),
                (false, ","),
                (true, "bar baz"),
            ]
        );
    }

    #[test]
    fn test_tokenize_quoted_keyword_stays_quoted() {
        assert_eq!(
            texts(r#"a "AND" b"#),
            vec![(false, "a"), (true, "AND"), (false, "b")]
        );
    }

    #[test]
    fn test_tokenize_unclosed_quote_is_literal() {
        assert_eq!(texts(r#""quote"#), vec![(false, "\"quote")]);
        assert_eq!(
            texts(r#"subject:in "A"#),
            vec![(false, "subject:in"), (false, "\"A")]
        );
    }

    #[test]
    fn test_tokenize_empty_quotes_are_literal() {
        assert_eq!(texts(r#""""#), vec![(false, "\"\"")]);
    }

    #[test]
    fn test_tokenize_quote_inside_word() {
        assert_eq!(
            texts(r#"a"b c"d"#),
            vec![(false, "a"), (true, "b c"), (false, "d")]
        );
    }

    #[test]
    fn test_tokenize_offsets() {
        let tokens = tokenize(r#"x:is "a b" <= 3"#);
        let spans: Vec<_> = tokens.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(spans, vec![(0, 4), (5, 10), (11, 13), (14, 15)]);
    }

    #[test]
    fn test_tokenize_unicode_offsets() {
        let input = "café (ü)";
        let tokens = tokenize(input);
        assert_eq!(tokens[0].text, "café");
        assert_eq!(tokens[0].end, "café".len());
        assert_eq!(tokens[2].text, "ü");
        assert_eq!(&input[tokens[2].start..tokens[2].end], "ü");
    }

    #[test]
    fn test_is_syntax_ignores_quoted() {
        let tokens = tokenize(r#"NOT "NOT""#);
        assert!(tokens[0].is_syntax("NOT"));
        assert!(!tokens[1].is_syntax("NOT"));
    }
}

//! Token classification output.

use filter_syntax_rs::filter::{TaggedToken, TokenKind};
use owo_colors::OwoColorize;

/// Returns the display name of a token kind.
pub fn kind_label(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Unknown => "unknown",
        TokenKind::Paren => "paren",
        TokenKind::Comma => "comma",
        TokenKind::Combinator => "combinator",
        TokenKind::BooleanOp => "boolean-op",
        TokenKind::SetOp => "set-op",
        TokenKind::CategoricalOp => "categorical-op",
        TokenKind::TextOp => "text-op",
        TokenKind::NumericOp => "numeric-op",
        TokenKind::NumericTarget => "numeric-target",
        TokenKind::Number => "number",
        TokenKind::QueryArg => "query-arg",
        TokenKind::WildcardText => "wildcard-text",
    }
}

/// Colors `text` by the kind of token it is.
fn paint(text: &str, kind: TokenKind) -> String {
    match kind {
        TokenKind::Unknown => text.red().to_string(),
        TokenKind::Paren | TokenKind::Comma => text.dimmed().to_string(),
        TokenKind::Combinator => text.magenta().bold().to_string(),
        TokenKind::BooleanOp
        | TokenKind::SetOp
        | TokenKind::CategoricalOp
        | TokenKind::TextOp
        | TokenKind::NumericTarget => text.cyan().to_string(),
        TokenKind::NumericOp | TokenKind::Number => text.yellow().to_string(),
        TokenKind::QueryArg => text.green().to_string(),
        TokenKind::WildcardText => text.to_string(),
    }
}

/// Reprints `query` with every token colored by kind.
///
/// Text between tokens, including whitespace, is copied unchanged. Without
/// colors the query is returned as is.
pub fn highlight_query(query: &str, tagged: &[TaggedToken<'_>], use_colors: bool) -> String {
    if !use_colors {
        return query.to_string();
    }

    let mut output = String::with_capacity(query.len());
    let mut last = 0;
    for t in tagged {
        output.push_str(&query[last..t.token.start]);
        output.push_str(&paint(&query[t.token.start..t.token.end], t.kind));
        last = t.token.end;
    }
    output.push_str(&query[last..]);
    output
}

/// Formats one line per token: byte span, kind and text.
pub fn format_tokens_table(tagged: &[TaggedToken<'_>], use_colors: bool) -> String {
    let mut output = String::new();
    for t in tagged {
        let span = format!("{}..{}", t.token.start, t.token.end);
        let label = format!("{:<14}", kind_label(t.kind));
        let label = if use_colors {
            paint(&label, t.kind)
        } else {
            label
        };
        let text = if t.token.quoted {
            format!("\"{}\"", t.token.text)
        } else {
            t.token.text.to_string()
        };
        output.push_str(&format!("{span:<9} {label} {text}\n"));
    }
    output
}

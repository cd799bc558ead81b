//! Source span and parse-input model (component A).
//!
//! A [`Span`] is a half-open byte range `[start, end)` into a module's
//! source text. Every AST node and every diagnostic carries one. Spans never
//! carry the source text themselves -- the owning [`crate::ast::Ast`] (or a
//! caller-supplied `&str`) is the single handle to the text.

use std::fmt;

/// A byte-offset range into a module's source text. `start <= end` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// A zero-width span at `at`, used for synthetic/implicit nodes.
    pub const fn point(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// The smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn text<'a>(self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn contains_offset(self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Cursor over an immutable source buffer. Parsers consume input
/// monotonically; on failure they leave the caller free to retry from the
/// same position.
#[derive(Debug, Clone, Copy)]
pub struct ParseInput<'a> {
    pub source: &'a str,
    pub index: usize,
}

impl<'a> ParseInput<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, index: 0 }
    }

    pub fn rest(self) -> &'a str {
        &self.source[self.index..]
    }

    pub fn peek_char(self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn is_eof(self) -> bool {
        self.index >= self.source.len()
    }

    /// Advance past `n` *bytes* (callers only ever advance past UTF-8 char
    /// boundaries that they themselves just matched).
    pub fn advance_bytes(self, n: usize) -> Self {
        Self {
            source: self.source,
            index: self.index + n,
        }
    }

    pub fn advance_char(self, c: char) -> Self {
        self.advance_bytes(c.len_utf8())
    }

    pub fn span_since(self, start: ParseInput<'a>) -> Span {
        Span::new(start.index, self.index)
    }

    /// Line/column for human-facing diagnostics, computed on demand (this
    /// crate does not track line/col during parsing -- only byte offsets).
    pub fn line_col_at(source: &str, offset: usize) -> (usize, usize) {
        let mut line = 1usize;
        let mut col = 1usize;
        for (i, c) in source.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }
}

/// Outcome of attempting to run a parser at a given position. The `None`
/// case (the parser didn't match but the input isn't malformed) is what
/// lets ordered choice work without allocation or exceptions.
pub enum ParseResult<'a, T> {
    Success {
        input: ParseInput<'a>,
        span: Span,
        value: T,
    },
    Error {
        input: ParseInput<'a>,
        err: ParseError,
    },
    None,
}

impl<'a, T> ParseResult<'a, T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseResult<'a, U> {
        match self {
            ParseResult::Success { input, span, value } => ParseResult::Success {
                input,
                span,
                value: f(value),
            },
            ParseResult::Error { input, err } => ParseResult::Error { input, err },
            ParseResult::None => ParseResult::None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ParseResult::Success { .. })
    }
}

/// A hard parser failure: an expected construct was present but malformed.
/// Promoted from the `None` case by `required`, or raised directly past a
/// commit point. Always carries the span of the offending text.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    pub fn eof(item: &str, at: usize) -> Self {
        Self::new(format!("hit EOF while parsing {item}"), Span::point(at))
    }

    /// Render in a caret-underline style, given the module source text for
    /// line lookup.
    pub fn render(&self, source: &str) -> String {
        use colored::Colorize;

        let (line, col) = ParseInput::line_col_at(source, self.span.start);
        let lines: Vec<&str> = source.lines().collect();
        let line_str = lines.get(line.saturating_sub(1)).copied().unwrap_or("");
        let margin = format!("{line}").len();
        let margin_fill = " ".repeat(margin);
        let pad = " ".repeat(col.saturating_sub(1));
        let carets = "^".repeat(self.span.len().max(1)).red();

        format!(
            "{margin_fill} |\n{line} |{line_str}\n{margin_fill} |{pad}{carets} {}",
            self.message
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.message, self.span)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_merge_takes_outer_bounds() {
        let a = Span::new(3, 7);
        let b = Span::new(1, 5);
        assert_eq!(a.merge(b), Span::new(1, 7));
    }

    #[test]
    fn parse_input_advances_by_char_width() {
        let input = ParseInput::new("héllo");
        let c = input.peek_char().unwrap();
        assert_eq!(c, 'h');
        let next = input.advance_char(c);
        assert_eq!(next.index, 1);
        let c2 = next.peek_char().unwrap();
        assert_eq!(c2, 'é');
        let next2 = next.advance_char(c2);
        assert_eq!(next2.index, 1 + 'é'.len_utf8());
    }

    #[test]
    fn line_col_counts_newlines() {
        let source = "ab\ncd\nef";
        assert_eq!(ParseInput::line_col_at(source, 0), (1, 1));
        assert_eq!(ParseInput::line_col_at(source, 3), (2, 1));
        assert_eq!(ParseInput::line_col_at(source, 7), (3, 2));
    }
}

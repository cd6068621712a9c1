//! Diagnostic tokens used to attribute errors to source positions

use std::fmt;

/// A source position supplied by the parser.
///
/// Every fallible runtime operation takes an `Option<Token>` so that a
/// failure can be reported against the expression that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Token {
    /// Byte offset of the first character
    pub start: usize,

    /// Byte offset one past the last character
    pub end: usize,

    /// 1-based line number
    pub line: usize,

    /// 1-based column number
    pub column: usize,
}

impl Token {
    /// Create a token covering `start..end` at the given line and column.
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Length of the covered source text in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the token covers no source text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

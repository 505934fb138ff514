use std::fmt::{Display, Formatter, Result};

use thiserror::Error;

use crate::check::CheckError;
use crate::lexer::LexError;
use crate::parse::ParseError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Check(#[from] CheckError),
}

impl CompileError {
    /// Best-known source span for this error, if any stage recorded one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Lex(e) => Some(e.span()),
            CompileError::Parse(e) => Some(e.span()),
            CompileError::Check(e) => e.span(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

impl Default for Span {
    fn default() -> Self {
        // A harmless 1:1 zero-length span instead of line 0.
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Renders an error with a one-line source excerpt and a caret row marking
/// the offending columns. Spans that continue past the excerpted line are
/// marked to its end.
///
/// ```text
/// error at 2:13: Unexpected character: @
///    2 |     let a = @;
///      |             ^
/// ```
pub fn format_error(source: &str, span: Span, error: impl Display) -> String {
    let line_no = span.start.line.max(1);
    let column = span.start.column.max(1);
    let mut out = format!("error at {}:{}: {}\n", line_no, column, error);

    let Some(excerpt) = source.lines().nth(line_no - 1) else {
        return out;
    };
    out.push_str(&format!("{:>4} | {}\n", line_no, excerpt));

    // Carets cover the span's extent on the excerpted line, at least one
    // column, clamped to the line's end.
    let extent = if span.end.line == line_no {
        span.end.column.saturating_sub(column)
    } else {
        excerpt.chars().count().saturating_sub(column - 1)
    };
    let extent = extent.max(1);
    out.push_str(&format!(
        "{:>4} | {}{}\n",
        "",
        " ".repeat(column - 1),
        "^".repeat(extent)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(line: usize, column: usize, len: usize) -> Span {
        let start = Position {
            offset: 0,
            line,
            column,
        };
        let end = Position {
            offset: len,
            line,
            column: column + len,
        };
        Span::new(start, end)
    }

    #[test]
    fn test_excerpt_with_caret_under_the_offending_column() {
        let source = "fn main() -> unit {\n    let a = @;\n}\n";
        let rendered = format_error(source, span(2, 13, 1), "Unexpected character: @");

        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("error at 2:13: Unexpected character: @"));
        let excerpt_row = lines.next().expect("excerpt row");
        assert!(excerpt_row.ends_with("    let a = @;"));
        let caret_row = lines.next().expect("caret row");

        // The caret lands in the same display column as the offender.
        assert_eq!(caret_row.find('^'), excerpt_row.find('@'));
        assert_eq!(caret_row.matches('^').count(), 1);
    }

    #[test]
    fn test_carets_cover_the_span() {
        let rendered = format_error("let p2 = p;\n", span(1, 5, 2), "Undefined variable: p2");
        assert!(rendered.contains("^^"));
        assert_eq!(rendered.matches('^').count(), 2);
    }

    #[test]
    fn test_span_past_source_still_reports() {
        let rendered = format_error("", span(9, 1, 1), "No 'main' function");
        assert_eq!(rendered, "error at 9:1: No 'main' function\n");
    }
}

//! Error handling types and utilities.

use thiserror::Error;

/// A specialized Result type for rustdoc-index operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()`
/// and `.with_context()` methods at I/O boundaries.
pub type Result<T> = anyhow::Result<T>;

/// Syntax error produced by the artifact lexer or parser.
///
/// Carries the byte offset of the problem and a pre-rendered source window.
/// Artifacts are minified onto a handful of very long lines, so the window
/// shows at most a short run of characters around the offset instead of the
/// whole line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{rendered}")]
pub struct SyntaxError {
    pub message: String,
    /// Byte offset into the source text where the problem starts.
    pub offset: usize,
    rendered: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, offset: usize, source: &str) -> Self {
        let message = message.into();
        let rendered = render_window(&message, offset, source);
        Self {
            message,
            offset,
            rendered,
        }
    }
}

/// Characters of context shown on each side of the error position.
const WINDOW: usize = 30;

fn render_window(message: &str, offset: usize, source: &str) -> String {
    let mut offset = offset.min(source.len());
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }

    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i);
    let line_number = source[..line_start].matches('\n').count() + 1;
    let column = source[line_start..offset].chars().count();

    let chars: Vec<char> = source[line_start..line_end].chars().collect();
    let window_start = column.saturating_sub(WINDOW);
    let window_end = (column + WINDOW).min(chars.len());
    let snippet: String = chars[window_start..window_end].iter().collect();
    let lead = if window_start > 0 { "…" } else { "" };
    let trail = if window_end < chars.len() { "…" } else { "" };

    let caret_indent = lead.chars().count() + (column - window_start);
    format!(
        "syntax error at line {}, column {}: {}\n  {}{}{}\n  {}^",
        line_number,
        column + 1,
        message,
        lead,
        snippet,
        trail,
        " ".repeat(caret_indent),
    )
}

/// Semantic error turning a parsed artifact into the typed model.
///
/// These are the failures a lenient consumer would have hit at lookup time:
/// dangling interning references, impossible kind codes, rows of the wrong
/// shape. [`validate`](crate::validate::validate) reports the same conditions
/// without bailing on the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("reference {array}[{index}] is out of bounds ({array} has {len} entries)")]
    InternOutOfBounds {
        array: String,
        index: u64,
        len: usize,
    },

    #[error("`{array}` is referenced as an interning array but is not one")]
    NotAnArray { array: String },

    #[error("interning entry {array}[{index}] is not a string literal")]
    BadInternEntry { array: String, index: u64 },

    #[error("unknown constant `{0}`")]
    UnknownConstant(String),

    #[error("no searchIndex assignments found")]
    NoCrates,

    #[error("crate `{krate}`: record is missing the `{key}` key")]
    MissingKey { krate: String, key: &'static str },

    #[error("crate `{krate}`: {place} must be {expected}")]
    Shape {
        krate: String,
        place: String,
        expected: &'static str,
    },

    #[error("crate `{krate}`: entry {row} has {len} slots (expected 4 to 6)")]
    RowArity { krate: String, row: usize, len: usize },

    #[error("crate `{krate}`: unknown item kind code {code}")]
    UnknownKind { krate: String, code: u64 },

    #[error(
        "crate `{krate}`: entry {row} references parent {index} but the parent table has {len} rows"
    )]
    ParentOutOfBounds {
        krate: String,
        row: usize,
        index: u64,
        len: usize,
    },
}

/// Rejected [`IndexBuilder`](crate::builder::IndexBuilder) input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("parent index {index} out of bounds for a parent table of {len} rows")]
    ParentOutOfBounds { index: u32, len: usize },
}

/// A search query that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("empty query")]
    Empty,
    #[error("unknown kind filter `{0}`")]
    UnknownKindFilter(String),
    #[error("expected one return type after `->`, found `{0}`")]
    MultipleReturns(String),
}

/// A search that could not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("unknown crate `{name}`")]
    UnknownCrate {
        name: String,
        /// Close known crate names, best first.
        suggestions: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn caret_points_at_the_offset() {
        let source = "var N=null;";
        let err = SyntaxError::new("unexpected character", 4, source);
        let text = err.to_string();
        check!(text.contains("line 1, column 5"));
        check!(text.contains("var N=null;"));
        let caret_line = text.lines().last().unwrap();
        check!(caret_line == "      ^");
    }

    #[test]
    fn long_lines_are_windowed() {
        let source = format!("{}X{}", "a".repeat(500), "b".repeat(500));
        let err = SyntaxError::new("bad token", 500, &source);
        let text = err.to_string();
        check!(text.contains('…'));
        check!(text.contains('X'));
        // Window plus markers stays far below the raw line length.
        check!(text.lines().nth(1).unwrap().chars().count() < 80);
    }

    #[test]
    fn offset_past_end_is_clamped() {
        let err = SyntaxError::new("unexpected end of input", 999, "var;");
        check!(err.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn later_lines_are_numbered() {
        let source = "var N=null;\nvar R=[];\noops";
        let err = SyntaxError::new("unexpected identifier", 22, source);
        check!(err.to_string().contains("line 3, column 1"));
    }
}

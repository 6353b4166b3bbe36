use serde::{Deserialize, Serialize};
use std::fmt;

/// Source location of a token or form.
///
/// Lines and columns are 1-based. `end_col` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// A zero-width span at one position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Span from the start of `self` to the end of `other`.
    ///
    /// Used by the reader to cover a whole list from `(` to `)`, so `other`
    /// is expected to end at or after `self`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start_line, self.start_col, other.end_line, other.end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Source text plus a line index, kept around for error context.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// The text of a 1-based line, without its terminator.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_point() {
        let s = Span::point(2, 7);
        assert_eq!(s, Span::new(2, 7, 2, 7));
    }

    #[test]
    fn test_span_to_covers_both() {
        let open = Span::point(1, 1);
        let close = Span::new(3, 4, 3, 4);
        assert_eq!(open.to(close), Span::new(1, 1, 3, 4));
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(4, 9, 4, 12).to_string(), "4:9");
    }

    #[test]
    fn test_source_file_lines() {
        let src = SourceFile::new("prog.l3", "(define x 1)\n(+ x 2)\n\n");
        assert_eq!(src.line(1), Some("(define x 1)"));
        assert_eq!(src.line(2), Some("(+ x 2)"));
        assert_eq!(src.line(3), Some(""));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(5), None);
        assert_eq!(src.line(4), Some(""));
    }

    #[test]
    fn test_source_file_crlf() {
        let src = SourceFile::new("prog.l3", "(L3\r\n  1)\r\n");
        assert_eq!(src.line(1), Some("(L3"));
        assert_eq!(src.line(2), Some("  1)"));
    }

    #[test]
    fn test_source_file_empty() {
        let src = SourceFile::new("prog.l3", "");
        assert_eq!(src.line(2), None);
        assert_eq!(src.line(1), Some(""));
    }
}

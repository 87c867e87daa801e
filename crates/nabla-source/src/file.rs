use miette::SourceSpan;
use std::sync::Arc;

/// A named source document.
///
/// The frontend never touches the filesystem; callers read text and wrap it
/// in a `SourceFile` so diagnostics can point back at it.
///
/// # Example
///
/// ```
/// use nabla_source::SourceFile;
///
/// let file = SourceFile::new("config.nabla", "def Port = Number");
/// assert_eq!(file.location(), "config.nabla");
/// assert_eq!(file.line_col(4), (1, 5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    location: String,
    contents: Arc<str>,
}

impl SourceFile {
    pub fn new(location: impl Into<String>, contents: impl Into<Arc<str>>) -> Self {
        Self {
            location: location.into(),
            contents: contents.into(),
        }
    }

    /// Path or display name of the document.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// The text covered by `span`, or `None` if it falls outside the document
    /// or splits a character.
    pub fn slice(&self, span: SourceSpan) -> Option<&str> {
        let start = span.offset();
        self.contents.get(start..start + span.len())
    }

    /// 1-based line and column of a byte offset. Offsets past the end clamp
    /// to the last position.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.contents.len());
        let mut line = 1;
        let mut line_start = 0;
        for (idx, ch) in self.contents.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                line_start = idx + 1;
            }
        }
        let column = self.contents[line_start..]
            .char_indices()
            .take_while(|(idx, _)| line_start + idx < offset)
            .count();
        (line, column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_across_lines() {
        let file = SourceFile::new("a.nabla", "def A = {\n  x: Number\n}");
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(12), (2, 3));
        assert_eq!(file.line_col(1000), (3, 2));
    }

    #[test]
    fn test_slice_checks_bounds() {
        let file = SourceFile::new("a.nabla", "use net");
        assert_eq!(file.slice(SourceSpan::new(4.into(), 3)), Some("net"));
        assert_eq!(file.slice(SourceSpan::new(5.into(), 10)), None);
    }
}

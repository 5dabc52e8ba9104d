use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Everything that can go wrong while reading, parsing, or serializing a document.
#[derive(Debug, Error, Diagnostic)]
pub enum CoreError {
    /// Malformed input: unterminated string/comment, unbalanced container, bad escape,
    /// stray closer, or an illegal value in context (e.g. a whitespace-only implicit value).
    #[error("{message} (line {line}, column {column})")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// A strict accessor was invoked on a value of the wrong variant.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A mutating call (`set`/`update`/`mutate`/`apply`) was made through a frozen reference.
    #[error("reference is immutable")]
    ImmutableReference,

    /// Installing a value would have created a reference cycle.
    #[error("operation would create a cyclic reference")]
    Cyclic,

    /// Reader/capture misuse internal to the library (e.g. `end_capture` without a matching
    /// `start_capture`).
    #[error("invalid reader state: {0}")]
    InvalidState(String),
}

impl CoreError {
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Attach source text to a [`CoreError::Syntax`] to build a labeled, renderable
    /// diagnostic. Returns `None` for any other variant (they carry no source span).
    pub fn with_source(
        &self,
        name: impl AsRef<str> + Into<String>,
        src: impl Into<String>,
    ) -> Option<SyntaxDiagnostic> {
        let Self::Syntax {
            line,
            column,
            message,
        } = self
        else {
            return None;
        };
        let src = src.into();
        let offset = offset_for_line_col(&src, *line, *column);
        Some(SyntaxDiagnostic {
            src: NamedSource::new(name, src),
            span: (offset, 1).into(),
            message: message.clone(),
        })
    }
}

/// A [`CoreError::Syntax`] rendered against its source text, suitable for `miette`'s fancy
/// reporter.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SyntaxDiagnostic {
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: SourceSpan,
    pub message: String,
}

/// Inverse of `reader::Reader`'s line/column tracking: find the byte offset of a given
/// 1-based (line, column) pair.
fn offset_for_line_col(content: &str, line: usize, column: usize) -> usize {
    let mut cur_line = 1;
    let mut cur_col = 1;
    for (i, ch) in content.char_indices() {
        if cur_line == line && cur_col == column {
            return i;
        }
        if ch == '\n' {
            cur_line += 1;
            cur_col = 1;
        } else {
            cur_col += 1;
        }
    }
    content.len()
}

pub type Result<T> = core::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_for_line_col_first_line() {
        assert_eq!(offset_for_line_col("abc\ndef", 1, 1), 0);
        assert_eq!(offset_for_line_col("abc\ndef", 1, 3), 2);
    }

    #[test]
    fn offset_for_line_col_second_line() {
        assert_eq!(offset_for_line_col("abc\ndef", 2, 1), 4);
    }

    #[test]
    fn with_source_builds_diagnostic() {
        let err = CoreError::syntax(2, 1, "unexpected token");
        let diag = err.with_source("doc.xjs", "abc\ndef").unwrap();
        assert_eq!(diag.message, "unexpected token");
    }

    #[test]
    fn with_source_none_for_non_syntax() {
        let err = CoreError::ImmutableReference;
        assert!(err.with_source("doc.xjs", "abc").is_none());
    }
}

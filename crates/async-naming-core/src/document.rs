//! Source documents as seen by rules.

use crate::cancel::{CancellationToken, Cancelled};
use crate::utils::trivia;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Non-semantic text attached in front of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trivia {
    /// A run of whitespace.
    Whitespace(String),
    /// A `//` comment, without the line terminator.
    LineComment(String),
    /// A `/* */` comment, delimiters included.
    BlockComment(String),
    /// A documentation comment (`///`, `//!`, `/** */`, `/*! */`).
    DocComment(String),
}

impl Trivia {
    /// Returns the text of an ordinary line or block comment.
    #[must_use]
    pub fn comment_text(&self) -> Option<&str> {
        match self {
            Self::LineComment(text) | Self::BlockComment(text) => Some(text),
            Self::Whitespace(_) | Self::DocComment(_) => None,
        }
    }
}

/// One compiled source file.
///
/// The identity of a document is its `Arc` allocation: two handles refer to
/// the same document exactly when they point at the same allocation.
/// Implementations must be immutable once shared.
pub trait SourceDocument: fmt::Debug + Send + Sync {
    /// Path of the file, if the document came from one.
    fn path(&self) -> Option<&Path>;

    /// Trivia in front of the first token, or the end-of-file trivia when
    /// the document has no token.
    ///
    /// Returns `Ok(None)` when the syntax root cannot be retrieved.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is triggered while inspecting.
    fn leading_trivia(&self, cancel: &CancellationToken) -> Result<Option<Vec<Trivia>>, Cancelled>;
}

/// Shared handle to a document.
pub type DocumentRef = Arc<dyn SourceDocument>;

/// A Rust source file held in memory.
#[derive(Debug, Clone)]
pub struct RustDocument {
    path: PathBuf,
    relative_path: PathBuf,
    content: String,
}

impl RustDocument {
    /// Creates a document for `path` with the given contents.
    ///
    /// `root` is used to compute the path reported in locations.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, root: &Path) -> Self {
        let path = path.into();
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.clone(), Path::to_path_buf);
        Self {
            path,
            relative_path,
            content: content.into(),
        }
    }

    /// Absolute (or as-given) path to the file.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the analysis root.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// File contents.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parses the contents into a `syn` syntax tree.
    ///
    /// # Errors
    ///
    /// Returns the `syn` error if the file is not valid Rust.
    pub fn parse(&self) -> syn::Result<syn::File> {
        syn::parse_file(&self.content)
    }

    /// Calculates the byte offset for a 1-indexed line and character column.
    ///
    /// Returns 0 for line 0 and the end of the content when out of bounds.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.split_inclusive('\n').enumerate() {
            if i + 1 == line {
                let in_line = line_content
                    .char_indices()
                    .nth(column.saturating_sub(1))
                    .map_or(line_content.len(), |(byte, _)| byte);
                return offset + in_line;
            }
            offset += line_content.len();
        }

        offset
    }
}

impl SourceDocument for RustDocument {
    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn leading_trivia(&self, cancel: &CancellationToken) -> Result<Option<Vec<Trivia>>, Cancelled> {
        trivia::leading_trivia(&self.content, cancel).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_strips_root() {
        let doc = RustDocument::new("/work/src/lib.rs", "", Path::new("/work"));
        assert_eq!(doc.relative_path(), Path::new("src/lib.rs"));
        assert_eq!(doc.file_path(), Path::new("/work/src/lib.rs"));
    }

    #[test]
    fn relative_path_falls_back_to_path() {
        let doc = RustDocument::new("other/lib.rs", "", Path::new("/work"));
        assert_eq!(doc.relative_path(), Path::new("other/lib.rs"));
    }

    #[test]
    fn offset_calculation() {
        let doc = RustDocument::new("test.rs", "line1\r\nline2\nline3", Path::new("."));
        assert_eq!(doc.offset_for(1, 1), 0);
        assert_eq!(doc.offset_for(2, 1), 7);
        assert_eq!(doc.offset_for(3, 3), 15);
    }

    #[test]
    fn offset_counts_columns_in_characters() {
        let doc = RustDocument::new("test.rs", "a\n/* é */ fn f() {}", Path::new("."));
        assert_eq!(doc.offset_for(2, 12), 14);
        assert_eq!(&doc.content()[14..15], "f");
        assert_eq!(doc.offset_for(2, 100), doc.content().len());
    }

    #[test]
    fn leading_trivia_comes_from_content() {
        let doc = RustDocument::new("a.rs", "// <auto-generated />\nfn f() {}", Path::new("."));
        let trivia = doc
            .leading_trivia(&CancellationToken::new())
            .unwrap()
            .unwrap();
        let comments: Vec<&str> = trivia.iter().filter_map(Trivia::comment_text).collect();
        assert_eq!(comments, vec!["// <auto-generated />"]);
    }
}

//! Block-level document model.
//!
//! A loaded document is an ordered stream of [`Block`]s (paragraphs and
//! tables) in body order. The engine never mutates a loaded stream; it
//! partitions it into [`Section`]s and assembles fresh output from those.

use serde::{Deserialize, Serialize};

use crate::normalize::collapse_whitespace;

/// One unit of a document's linear content stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph of plain text with its resolved style name.
    Paragraph(Paragraph),
    /// A table of text cells.
    Table(TableBlock),
}

impl Block {
    /// The paragraph inside this block, if it is one.
    #[inline]
    #[must_use]
    pub const fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Self::Paragraph(p) => Some(p),
            Self::Table(_) => None,
        }
    }

    /// The table inside this block, if it is one.
    #[inline]
    #[must_use]
    pub const fn as_table(&self) -> Option<&TableBlock> {
        match self {
            Self::Table(t) => Some(t),
            Self::Paragraph(_) => None,
        }
    }
}

/// A paragraph: text content plus the display name of its paragraph style.
///
/// `style_name` is the resolved style NAME (e.g. `"heading 1"`), not the
/// internal style id; heading classification depends on it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Concatenated run text of the paragraph.
    pub text: String,
    /// Resolved paragraph style name, if the paragraph carries one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub style_name: Option<String>,
}

impl Paragraph {
    /// Create a plain paragraph with no style.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_name: None,
        }
    }

    /// Create a paragraph with a style name.
    #[must_use]
    pub fn with_style(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_name: Some(style.into()),
        }
    }
}

/// A table as a grid of text cells, row-major. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Row-major cell text.
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Number of rows in the table.
    #[inline]
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row (0 for an empty table).
    #[must_use]
    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// True when the table has no rows.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A heading-delimited span of a document.
///
/// `title` is the collapsed display text of the opening heading; the
/// heading paragraph itself is never part of `blocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Level of the opening heading, `1..=9`.
    pub level: u8,
    /// Display title (whitespace-collapsed, case preserved).
    pub title: String,
    /// Content blocks under the heading, in document order.
    pub blocks: Vec<Block>,
}

impl Section {
    /// Create an empty section anchored at a heading.
    #[must_use]
    pub fn new(level: u8, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            blocks: Vec::new(),
        }
    }
}

/// One row of a heading overview, as returned by `extract_headings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRef {
    /// Heading level, `1..=9`.
    pub level: u8,
    /// Collapsed display text of the heading.
    pub text: String,
}

impl HeadingRef {
    /// Build a heading row, collapsing the display text.
    #[must_use]
    pub fn new(level: u8, text: &str) -> Self {
        Self {
            level,
            text: collapse_whitespace(text),
        }
    }
}

/// An input document blob as handed in by the surrounding I/O layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Display name of the document (usually the upload filename).
    pub name: String,
    /// Raw package bytes.
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    /// Wrap a named byte blob.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_accessors() {
        let p = Block::Paragraph(Paragraph::new("hello"));
        let t = Block::Table(TableBlock {
            rows: vec![vec!["a".to_string()]],
        });

        assert!(p.as_paragraph().is_some());
        assert!(p.as_table().is_none());
        assert!(t.as_table().is_some());
        assert!(t.as_paragraph().is_none());
    }

    #[test]
    fn test_table_max_cols_ragged() {
        let table = TableBlock {
            rows: vec![
                vec!["a".to_string()],
                vec!["b".to_string(), "c".to_string(), "d".to_string()],
                vec!["e".to_string(), "f".to_string()],
            ],
        };
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.max_cols(), 3);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_table_empty() {
        let table = TableBlock::default();
        assert_eq!(table.max_cols(), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_heading_ref_collapses_text() {
        let h = HeadingRef::new(2, "  Plan   de \t Formación ");
        assert_eq!(h.level, 2);
        assert_eq!(h.text, "Plan de Formación");
    }

    #[test]
    fn test_paragraph_constructors() {
        let plain = Paragraph::new("body");
        assert_eq!(plain.style_name, None);

        let styled = Paragraph::with_style("intro", "heading 1");
        assert_eq!(styled.style_name.as_deref(), Some("heading 1"));
    }
}

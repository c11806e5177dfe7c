//! # docmerge-engine
//!
//! Heading-based segmentation and cross-document section merge.
//!
//! # Architecture
//!
//! ```text
//! raw DOCX bytes
//!      │  DocxReader (docmerge-backend)
//!      ▼
//! Vec<Block> ──▶ Segmenter ──▶ Vec<Section> ──▶ Title Matcher ──▶ Assembler
//!                   │  uses                                          │
//!                   ▼                                                ▼
//!            TitleRecognizer                              DOCX + XLSX output bytes
//!        (style- or catalog-driven)                       (DocxWriter / WorkbookWriter)
//! ```
//!
//! The engine is synchronous and stateless: each operation is pure given
//! its inputs, holds no caches, and may run concurrently with others.
//! Unreadable input documents are skipped and recorded, never fatal to a
//! multi-document request; invalid criteria are rejected before any
//! document is read.
//!
//! # Example
//!
//! ```ignore
//! use docmerge_core::SourceDocument;
//! use docmerge_engine::{merge_unified, SegmentOptions, SelectionCriteria};
//!
//! let documents = vec![SourceDocument::new("report.docx", bytes)];
//! let criteria = SelectionCriteria::new([1, 2], &[], false)?;
//! let result = merge_unified(&documents, &criteria, &SegmentOptions::default())?;
//! for (name, payload) in &result.outputs {
//!     std::fs::write(name, payload)?;
//! }
//! # Ok::<(), docmerge_core::MergeError>(())
//! ```

pub mod assemble;
pub mod classify;
pub mod export;
pub mod matcher;
pub mod recognize;
pub mod report;
pub mod segment;

use docmerge_backend::DocxReader;
use docmerge_core::{HeadingRef, Result};

pub use assemble::{
    merge_by_catalog, merge_grouped, merge_unified, sanitize_filename, GroupingLevel, MergeOutput,
    SkippedDocument, ABSENCE_REPORT_NAME, UNIFIED_COVER_TITLE, UNIFIED_DOCUMENT_NAME,
    UNIFIED_TABLES_NAME,
};
pub use classify::{classify_paragraph, classify_style, StyleTag};
pub use export::{export_workbook, flatten_table, sheet_title, TableExport, TABLE_CELL_DELIMITER};
pub use matcher::{filter_sections, SelectionCriteria};
pub use recognize::{CatalogRecognizer, RecognizedHeading, StyleRecognizer, TitleRecognizer};
pub use report::{title_presence, PresenceReport};
pub use segment::{heading_overview, segment, DeeperHeadingPolicy, SegmentOptions};

/// Extract the ordered heading overview of one document, for previews.
///
/// Style-driven: headings are the paragraphs whose style name classifies
/// as a heading; no merging or filtering is involved.
///
/// # Errors
///
/// Returns a backend error when the bytes are not a readable package
/// (there is no skip-and-continue for a single-document preview).
pub fn extract_headings(bytes: &[u8]) -> Result<Vec<HeadingRef>> {
    let blocks = DocxReader::read(bytes)?;
    Ok(heading_overview(&blocks))
}

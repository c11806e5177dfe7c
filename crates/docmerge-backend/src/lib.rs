//! Document package plumbing for the docmerge workspace.
//!
//! This crate owns every byte-level concern: reading DOCX packages into
//! the engine's block stream, and writing the merge results back out as
//! DOCX and XLSX packages. All three sides share one idiom: ZIP
//! archives of XML parts handled with `zip` + `quick-xml` events.
//!
//! ```text
//! DOCX bytes ──DocxReader──▶ Vec<Block> ──(engine)──▶ DocxWriter ──▶ DOCX bytes
//!                                          └────────▶ WorkbookWriter ▶ XLSX bytes
//! ```
//!
//! The reader never interprets headings; it resolves paragraph style ids
//! to display names and leaves classification to the engine.

pub mod docx;
pub mod docx_writer;
pub mod package;
pub mod xlsx_writer;

pub use docx::DocxReader;
pub use docx_writer::{DocxWriter, MAX_HEADING_LEVEL};
pub use xlsx_writer::{column_reference, sanitize_sheet_name, WorkbookWriter, MAX_SHEET_NAME_LEN};

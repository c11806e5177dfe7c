//! Merge assembly: recombining matched sections into output documents.
//!
//! Two caller-selected policies plus the catalog-driven variant:
//!
//! - **Unified**: every kept section from every input document, in input
//!   order, concatenated into one document; every table additionally
//!   accumulated for the workbook side export.
//! - **Grouped**: kept sections pooled by title key across documents;
//!   one output document per distinct title.
//! - **By catalog**: grouped against an injected title catalog, with a
//!   per-title table workbook and an absence report alongside.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use docmerge_backend::{DocxReader, DocxWriter};
use docmerge_core::{
    normalize, Block, MergeError, Result, Section, SourceDocument, TitleCatalog,
};

use crate::export::{export_workbook, flatten_table, TableExport};
use crate::matcher::{filter_sections, SelectionCriteria};
use crate::recognize::{CatalogRecognizer, StyleRecognizer};
use crate::report::PresenceReport;
use crate::segment::{segment, SegmentOptions};

/// Output name of the unified merge document.
pub const UNIFIED_DOCUMENT_NAME: &str = "merged.docx";

/// Output name of the unified merge's table workbook.
pub const UNIFIED_TABLES_NAME: &str = "tables.xlsx";

/// Cover title of the unified merge document.
pub const UNIFIED_COVER_TITLE: &str = "Unified Document";

/// Output name of the catalog merge's absence report.
pub const ABSENCE_REPORT_NAME: &str = "missing_titles.txt";

/// Placeholder paragraph for a catalog title found without content.
const NO_CONTENT_MESSAGE: &str = "No content found for this title in the analyzed documents.";

/// Length cap applied to sanitized filename stems, before the extension.
pub const MAX_FILENAME_STEM_LEN: usize = 180;

/// Characters replaced when deriving filenames from titles.
const FILENAME_UNSAFE: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// An input document that was skipped instead of aborting the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    /// Name of the skipped document.
    pub name: String,
    /// Why it could not be processed.
    pub reason: String,
}

/// Result of a merge request: output payloads plus the skip record.
#[derive(Debug, Default)]
pub struct MergeOutput {
    /// Output filename → package bytes. Names are unique per request.
    pub outputs: BTreeMap<String, Vec<u8>>,
    /// Input documents skipped as unreadable, in input order.
    pub skipped: Vec<SkippedDocument>,
}

/// Level selection for the grouped merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingLevel {
    /// Group sections opened at one specific level.
    Level(u8),
    /// Group across all heading levels `1..=9`.
    AnyLevel,
}

impl GroupingLevel {
    /// The section-opening level set this selection spans.
    fn levels(self) -> Vec<u8> {
        match self {
            Self::Level(level) => vec![level],
            Self::AnyLevel => (1..=9).collect(),
        }
    }
}

/// Derive a safe output filename from a title.
///
/// Filesystem-unsafe characters and control characters become `_`,
/// whitespace runs become a single `_`, stray leading/trailing dots and
/// spaces are trimmed, the stem is capped at [`MAX_FILENAME_STEM_LEN`]
/// characters, and `extension` (e.g. `".docx"`) is appended unless
/// already present. An empty stem falls back to `"document"`.
#[must_use]
pub fn sanitize_filename(title: &str, extension: &str) -> String {
    let stem: String = title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| {
            if FILENAME_UNSAFE.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem: String = stem
        .trim_matches(|c| c == ' ' || c == '.')
        .chars()
        .take(MAX_FILENAME_STEM_LEN)
        .collect();
    let stem = if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    };

    if stem.to_lowercase().ends_with(&extension.to_lowercase()) {
        stem
    } else {
        format!("{stem}{extension}")
    }
}

/// Pick a name not yet present in `outputs`, disambiguating collisions
/// with a numeric suffix before the extension.
///
/// Distinct title keys can sanitize to the same filename; overwriting
/// silently would drop a whole output document, so collisions get
/// `name-2`, `name-3`, ... and a warning.
fn unique_output_name(outputs: &BTreeMap<String, Vec<u8>>, candidate: String) -> String {
    if !outputs.contains_key(&candidate) {
        return candidate;
    }
    let (stem, extension) = match candidate.rsplit_once('.') {
        Some((s, e)) => (s.to_string(), format!(".{e}")),
        None => (candidate.clone(), String::new()),
    };
    let mut n = 2;
    loop {
        let next = format!("{stem}-{n}{extension}");
        if !outputs.contains_key(&next) {
            log::warn!("Output filename collision on {candidate}; using {next}");
            return next;
        }
        n += 1;
    }
}

/// Append one section to an output document: heading, provenance label,
/// then content with tables flattened to text. Every non-empty table is
/// also captured into `tables` for the workbook export.
fn append_section(
    writer: &mut DocxWriter,
    source_name: &str,
    section: &Section,
    tables: &mut Vec<TableExport>,
) {
    // One fixed visual level regardless of the section's original level;
    // provenance rides along as a label, not a style.
    writer.add_heading(&section.title, 1);
    writer.add_source_label(&format!("[Source: {source_name}]"));

    for block in &section.blocks {
        match block {
            Block::Paragraph(paragraph) => writer.add_paragraph(&paragraph.text),
            Block::Table(table) => {
                writer.add_paragraph("");
                for line in flatten_table(table) {
                    writer.add_paragraph(&line);
                }
                writer.add_paragraph("");
                if !table.is_empty() {
                    tables.push(TableExport {
                        title: section.title.clone(),
                        source: source_name.to_string(),
                        rows: table.rows.clone(),
                    });
                }
            }
        }
    }
    // Separator after each appended section.
    writer.add_paragraph("");
}

/// Read one source document, recording a skip instead of failing.
pub(crate) fn read_or_skip(
    document: &SourceDocument,
    skipped: &mut Vec<SkippedDocument>,
) -> Option<Vec<Block>> {
    match DocxReader::read(&document.bytes) {
        Ok(blocks) => Some(blocks),
        Err(e) => {
            log::warn!("Skipping unreadable document {}: {e}", document.name);
            skipped.push(SkippedDocument {
                name: document.name.clone(),
                reason: e.to_string(),
            });
            None
        }
    }
}

/// Unified merge: one consolidated document plus the table workbook.
///
/// # Errors
///
/// Returns [`MergeError::NoDocuments`] when `documents` is empty, or a
/// backend error when output assembly fails. Unreadable inputs are
/// skipped and recorded, never fatal.
pub fn merge_unified(
    documents: &[SourceDocument],
    criteria: &SelectionCriteria,
    options: &SegmentOptions,
) -> Result<MergeOutput> {
    if documents.is_empty() {
        return Err(MergeError::NoDocuments);
    }

    let mut writer = DocxWriter::new();
    writer.add_title(UNIFIED_COVER_TITLE);

    let mut tables: Vec<TableExport> = Vec::new();
    let mut skipped = Vec::new();

    for document in documents {
        let Some(blocks) = read_or_skip(document, &mut skipped) else {
            continue;
        };
        let sections = segment(&blocks, criteria.levels(), &StyleRecognizer, options);
        for section in filter_sections(sections, criteria) {
            append_section(&mut writer, &document.name, &section, &mut tables);
        }
    }

    let mut outputs = BTreeMap::new();
    outputs.insert(UNIFIED_DOCUMENT_NAME.to_string(), writer.finish()?);
    outputs.insert(UNIFIED_TABLES_NAME.to_string(), export_workbook(&tables)?);
    Ok(MergeOutput { outputs, skipped })
}

/// Sections pooled under one title across source documents.
struct TitleGroup {
    display: String,
    entries: Vec<(String, Section)>,
}

/// Grouped merge: one output document per distinct title key.
///
/// Pooling is by title key across ALL input documents, at one chosen
/// level or across all levels, with contributions in input-document
/// order. Title keys that end up empty are omitted entirely.
///
/// # Errors
///
/// Returns [`MergeError::InvalidCriteria`] for an invalid level and
/// [`MergeError::NoDocuments`] for an empty input set.
pub fn merge_grouped(
    documents: &[SourceDocument],
    grouping: GroupingLevel,
    allow_titles: &[String],
    enforce: bool,
    options: &SegmentOptions,
) -> Result<MergeOutput> {
    let criteria = SelectionCriteria::new(grouping.levels(), allow_titles, enforce)?;
    if documents.is_empty() {
        return Err(MergeError::NoDocuments);
    }

    let mut skipped = Vec::new();
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, TitleGroup> = HashMap::new();

    for document in documents {
        let Some(blocks) = read_or_skip(document, &mut skipped) else {
            continue;
        };
        let sections = segment(&blocks, criteria.levels(), &StyleRecognizer, options);
        for section in filter_sections(sections, &criteria) {
            let key = normalize(&section.title);
            if key.is_empty() {
                continue;
            }
            let group = groups.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                TitleGroup {
                    display: section.title.clone(),
                    entries: Vec::new(),
                }
            });
            group.entries.push((document.name.clone(), section));
        }
    }

    let mut outputs = BTreeMap::new();
    for key in &order {
        let Some(group) = groups.get(key) else {
            continue;
        };
        let mut writer = DocxWriter::new();
        writer.add_title(&group.display);
        let mut table_sink = Vec::new();
        for (source_name, section) in &group.entries {
            append_section(&mut writer, source_name, section, &mut table_sink);
        }
        let name = unique_output_name(&outputs, sanitize_filename(&group.display, ".docx"));
        outputs.insert(name, writer.finish()?);
    }

    Ok(MergeOutput { outputs, skipped })
}

/// Catalog-driven grouped merge.
///
/// Titles are recognized against the injected catalog (independent of
/// paragraph styles); each catalog title present in the inputs yields a
/// merged document and a companion workbook of that title's tables, all
/// keyed by the catalog display form. The absence report rides along
/// under [`ABSENCE_REPORT_NAME`].
///
/// # Errors
///
/// Returns [`MergeError::InvalidCriteria`] for an empty catalog and
/// [`MergeError::NoDocuments`] for an empty input set.
pub fn merge_by_catalog(
    documents: &[SourceDocument],
    catalog: &TitleCatalog,
    options: &SegmentOptions,
) -> Result<MergeOutput> {
    if catalog.is_empty() {
        return Err(MergeError::InvalidCriteria(
            "the title catalog has no entries".to_string(),
        ));
    }
    if documents.is_empty() {
        return Err(MergeError::NoDocuments);
    }

    let recognizer = CatalogRecognizer::new(catalog);
    let levels: BTreeSet<u8> = [1].into_iter().collect();

    let mut skipped = Vec::new();
    let mut analyzed: Vec<String> = Vec::new();
    let mut found_by_file: HashMap<String, HashSet<String>> = HashMap::new();
    let mut groups: HashMap<String, Vec<(String, Section)>> = HashMap::new();

    for document in documents {
        let Some(blocks) = read_or_skip(document, &mut skipped) else {
            continue;
        };
        analyzed.push(document.name.clone());
        let found = found_by_file.entry(document.name.clone()).or_default();
        for section in segment(&blocks, &levels, &recognizer, options) {
            found.insert(section.title.clone());
            groups
                .entry(section.title.clone())
                .or_default()
                .push((document.name.clone(), section));
        }
    }

    let mut outputs = BTreeMap::new();

    // Outputs in catalog order; absent titles only appear in the report.
    for display in catalog.display_titles() {
        let Some(entries) = groups.get(display) else {
            continue;
        };

        let mut writer = DocxWriter::new();
        writer.add_title(display);
        let mut tables: Vec<TableExport> = Vec::new();

        // A found-but-contentless title keeps its document, with a
        // placeholder body instead of fragments.
        let contributing: Vec<&(String, Section)> = entries
            .iter()
            .filter(|(_, section)| !section.blocks.is_empty())
            .collect();
        if contributing.is_empty() {
            writer.add_paragraph(NO_CONTENT_MESSAGE);
        } else {
            for (source_name, section) in contributing {
                append_section(&mut writer, source_name, section, &mut tables);
            }
        }

        let doc_name = unique_output_name(&outputs, sanitize_filename(display, ".docx"));
        outputs.insert(doc_name, writer.finish()?);

        let workbook = export_title_workbook(&tables)?;
        let workbook_name = unique_output_name(&outputs, sanitize_filename(display, ".xlsx"));
        outputs.insert(workbook_name, workbook);
    }

    let report = PresenceReport::from_observations(&analyzed, &skipped, &found_by_file, catalog);
    outputs.insert(
        ABSENCE_REPORT_NAME.to_string(),
        report.render().into_bytes(),
    );

    Ok(MergeOutput { outputs, skipped })
}

/// Per-title workbook: one sheet stacking each table under a banner row
/// naming its source document, separated by blank rows.
fn export_title_workbook(tables: &[TableExport]) -> Result<Vec<u8>> {
    use docmerge_backend::WorkbookWriter;
    use docmerge_core::collapse_whitespace;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for table in tables {
        rows.push(vec![table.source.clone()]);
        for row in &table.rows {
            rows.push(row.iter().map(|c| collapse_whitespace(c)).collect());
        }
        rows.push(Vec::new());
    }
    if rows.is_empty() {
        rows.push(vec!["No tables found for this title.".to_string()]);
    }

    let mut writer = WorkbookWriter::new();
    writer.add_sheet("Tables", rows);
    writer.finish()
}

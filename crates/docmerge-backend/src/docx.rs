//! DOCX (Microsoft Word) package reader.
//!
//! # Architecture
//!
//! Manual ZIP + XML parsing. DOCX files are ZIP archives containing:
//! - `word/document.xml`: main content (paragraphs, tables)
//! - `word/styles.xml`: style definitions (heading styles, etc.)
//!
//! The reader resolves each paragraph's style id to its display NAME via
//! `word/styles.xml` and emits an ordered [`Block`] stream. It does not
//! interpret headings itself; heading classification is a function of the
//! style name and belongs to the engine.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use docmerge_core::{Block, MergeError, Paragraph, Result, TableBlock};

/// Extract an attribute value by key from an element.
#[inline]
fn get_attr(e: &quick_xml::events::BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(std::result::Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// State container for walking the document body.
///
/// Location flags mirror the XML nesting; paragraphs inside table cells
/// accumulate into the open cell instead of the block stream.
#[derive(Default)]
struct WalkState {
    blocks: Vec<Block>,

    // Location tracking
    in_body: bool,
    in_run: bool,
    in_text: bool,
    table_depth: usize,

    // Paragraph accumulation (outside tables)
    current_para: Option<Paragraph>,
    current_style_id: Option<String>,

    // Table accumulation (outermost table only)
    current_rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    current_cell: Option<String>,
}

impl WalkState {
    /// Append run text to whatever is currently open.
    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.current_cell.as_mut() {
            cell.push_str(text);
        } else if let Some(para) = self.current_para.as_mut() {
            para.text.push_str(text);
        }
    }

    /// Close the open paragraph, resolving its style id to a name.
    fn finish_paragraph(&mut self, styles: &HashMap<String, String>) {
        if self.table_depth > 0 {
            // Paragraph boundary inside a cell: separate cell paragraphs.
            if let Some(cell) = self.current_cell.as_mut() {
                cell.push('\n');
            }
            return;
        }
        if let Some(mut para) = self.current_para.take() {
            para.style_name = self
                .current_style_id
                .take()
                .map(|id| styles.get(&id).cloned().unwrap_or(id));
            self.blocks.push(Block::Paragraph(para));
        }
    }
}

/// Reads DOCX bytes into an ordered block stream.
pub struct DocxReader;

impl DocxReader {
    /// Parse a DOCX package into its body blocks, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Backend`] when the bytes are not a readable
    /// ZIP archive, when `word/document.xml` is missing, or when the XML
    /// is malformed. Callers merging many documents treat this as a
    /// per-document skip condition.
    pub fn read(bytes: &[u8]) -> Result<Vec<Block>> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| MergeError::Backend(format!("Not a DOCX package: {e}")))?;

        let document_xml = read_archive_part(&mut archive, "word/document.xml")?
            .ok_or_else(|| MergeError::Backend("Missing word/document.xml".to_string()))?;

        // styles.xml is optional; without it style ids stand in for names.
        let styles = match read_archive_part(&mut archive, "word/styles.xml")? {
            Some(xml) => parse_styles_xml(&xml)?,
            None => HashMap::new(),
        };

        let blocks = walk_body(&document_xml, &styles)?;
        log::debug!(
            "Parsed DOCX package: {} blocks, {} named styles",
            blocks.len(),
            styles.len()
        );
        Ok(blocks)
    }
}

/// Read one part of the archive to a string, `Ok(None)` when absent.
fn read_archive_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>> {
    let Ok(mut part) = archive.by_name(name) else {
        return Ok(None);
    };
    let mut content = String::new();
    part.read_to_string(&mut content)
        .map_err(MergeError::Io)?;
    Ok(Some(content))
}

/// Parse `word/styles.xml` into a styleId → display-name map.
///
/// Only paragraph style names are needed; `w:name/@w:val` carries the
/// display form (`"heading 1"`, `"Título 2"`, ...).
fn parse_styles_xml(xml: &str) -> Result<HashMap<String, String>> {
    let mut styles = HashMap::new();
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut current_style_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:style" => {
                    current_style_id = get_attr(&e, b"w:styleId");
                }
                b"w:name" => {
                    if let (Some(id), Some(name)) =
                        (current_style_id.as_ref(), get_attr(&e, b"w:val"))
                    {
                        styles.insert(id.clone(), name);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"w:style" {
                    current_style_id = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MergeError::Backend(format!(
                    "Error parsing styles.xml: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

/// Walk `word/document.xml` and build the block stream.
fn walk_body(xml: &str, styles: &HashMap<String, String>) -> Result<Vec<Block>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut state = WalkState::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:body" => state.in_body = true,
                b"w:p" if state.in_body => {
                    if state.table_depth == 0 {
                        state.current_para = Some(Paragraph::default());
                        state.current_style_id = None;
                    }
                }
                b"w:pStyle" if state.table_depth == 0 => {
                    state.current_style_id = get_attr(&e, b"w:val");
                }
                b"w:r" if state.in_body => state.in_run = true,
                b"w:t" => state.in_text = true,
                b"w:tbl" if state.in_body => {
                    state.table_depth += 1;
                    if state.table_depth == 1 {
                        state.current_rows = Vec::new();
                    }
                }
                b"w:tr" if state.table_depth == 1 => {
                    state.current_row = Vec::new();
                }
                b"w:tc" if state.table_depth == 1 => {
                    state.current_cell = Some(String::new());
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:pStyle" if state.in_body && state.table_depth == 0 => {
                    state.current_style_id = get_attr(&e, b"w:val");
                }
                // Run-level breaks contribute separator whitespace. The
                // in_run guard keeps tab-stop definitions in w:pPr out.
                b"w:tab" | b"w:br" | b"w:cr" if state.in_run => state.push_text(" "),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if state.in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| MergeError::Backend(format!("Bad run text: {err}")))?;
                    state.push_text(&text);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:body" => state.in_body = false,
                b"w:r" => state.in_run = false,
                b"w:t" => state.in_text = false,
                b"w:p" if state.in_body => state.finish_paragraph(styles),
                b"w:tc" if state.table_depth == 1 => {
                    if let Some(cell) = state.current_cell.take() {
                        state.current_row.push(cell.trim().to_string());
                    }
                }
                b"w:tr" if state.table_depth == 1 => {
                    let row = std::mem::take(&mut state.current_row);
                    state.current_rows.push(row);
                }
                b"w:tbl" if state.table_depth > 0 => {
                    state.table_depth -= 1;
                    if state.table_depth == 0 {
                        let rows = std::mem::take(&mut state.current_rows);
                        state.blocks.push(Block::Table(TableBlock { rows }));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MergeError::Backend(format!(
                    "Error parsing document.xml: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(state.blocks)
}

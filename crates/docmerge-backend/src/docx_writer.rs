//! DOCX (Microsoft Word) package writer.
//!
//! Builds the minimal package a merge output needs: `word/document.xml`
//! written event-by-event with `quick_xml::Writer` (the mirror image of
//! how the reader walks it), a generated `word/styles.xml` defining the
//! Title and Heading styles the output uses, and the OPC boilerplate
//! parts ([Content_Types].xml, relationships, docProps/core.xml).
//!
//! Formatting is deliberately small: style-based headings, a bold-italic
//! centered variant for provenance labels, and plain body paragraphs.
//! Rich run styling of the source documents is not carried through.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use docmerge_core::{MergeError, Result};

use crate::package::{
    core_properties_xml, PackageBuilder, REL_TYPE_CORE_PROPERTIES, REL_TYPE_OFFICE_DOCUMENT,
};

/// WordprocessingML main namespace.
const WORD_ML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Deepest style-backed heading level.
pub const MAX_HEADING_LEVEL: u8 = 9;

const CONTENT_TYPES_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/word/document.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>",
    "<Override PartName=\"/word/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml\"/>",
    "<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>",
    "</Types>",
);

const DOCUMENT_RELS_XML: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
    "</Relationships>",
);

/// Kinds of paragraph the writer can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutParagraph {
    /// Document cover title (Title style).
    Title(String),
    /// Section heading at a style level `1..=9`.
    Heading(String, u8),
    /// Bold-italic centered provenance label.
    SourceLabel(String),
    /// Plain body paragraph (may be empty, used as a separator).
    Body(String),
}

/// One body item: a paragraph or a native table grid.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OutItem {
    Paragraph(OutParagraph),
    Table(Vec<Vec<String>>),
}

/// Accumulates body items and renders them into DOCX package bytes.
#[derive(Debug, Default)]
pub struct DocxWriter {
    items: Vec<OutItem>,
}

impl DocxWriter {
    /// Start an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the document cover title.
    pub fn add_title(&mut self, text: &str) {
        self.items
            .push(OutItem::Paragraph(OutParagraph::Title(text.to_string())));
    }

    /// Append a heading at the given level (clamped to `1..=9`).
    pub fn add_heading(&mut self, text: &str, level: u8) {
        let level = level.clamp(1, MAX_HEADING_LEVEL);
        self.items.push(OutItem::Paragraph(OutParagraph::Heading(
            text.to_string(),
            level,
        )));
    }

    /// Append a bold-italic centered provenance label.
    pub fn add_source_label(&mut self, text: &str) {
        self.items
            .push(OutItem::Paragraph(OutParagraph::SourceLabel(
                text.to_string(),
            )));
    }

    /// Append a plain body paragraph. Empty text yields an empty
    /// paragraph, used as a visual separator.
    pub fn add_paragraph(&mut self, text: &str) {
        self.items
            .push(OutItem::Paragraph(OutParagraph::Body(text.to_string())));
    }

    /// Append a native table of plain text cells (one paragraph per
    /// cell). Rows may be ragged.
    pub fn add_table(&mut self, rows: Vec<Vec<String>>) {
        self.items.push(OutItem::Table(rows));
    }

    /// Number of body items queued so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when nothing has been appended yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the accumulated paragraphs into DOCX package bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Backend`] when XML or package assembly fails.
    pub fn finish(self) -> Result<Vec<u8>> {
        let document_xml = self.render_document_xml()?;
        let styles_xml = render_styles_xml()?;

        let mut pkg = PackageBuilder::new();
        pkg.add_part("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes())?;
        pkg.add_part("_rels/.rels", root_rels_xml().as_bytes())?;
        pkg.add_part("word/document.xml", &document_xml)?;
        pkg.add_part("word/styles.xml", &styles_xml)?;
        pkg.add_part("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.as_bytes())?;
        pkg.add_part("docProps/core.xml", core_properties_xml().as_bytes())?;
        pkg.finish()
    }

    /// Serialize `word/document.xml`.
    fn render_document_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let mut document = BytesStart::new("w:document");
        document.push_attribute(("xmlns:w", WORD_ML_NS));
        writer.write_event(Event::Start(document)).map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("w:body")))
            .map_err(xml_err)?;

        for item in &self.items {
            match item {
                OutItem::Paragraph(paragraph) => write_paragraph(&mut writer, paragraph)?,
                OutItem::Table(rows) => write_table(&mut writer, rows)?,
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new("w:body")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:document")))
            .map_err(xml_err)?;

        Ok(writer.into_inner())
    }
}

/// Map a quick-xml error into the crate error type.
fn xml_err(e: quick_xml::Error) -> MergeError {
    MergeError::Backend(format!("Failed to write document XML: {e}"))
}

/// Package-level relationships: main document + core properties.
fn root_rels_xml() -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{office}\" Target=\"word/document.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"{core}\" Target=\"docProps/core.xml\"/>",
            "</Relationships>",
        ),
        office = REL_TYPE_OFFICE_DOCUMENT,
        core = REL_TYPE_CORE_PROPERTIES,
    )
}

/// Write a self-closing element carrying a single `w:val` attribute.
fn write_val_element(writer: &mut Writer<Vec<u8>>, name: &str, val: &str) -> Result<()> {
    let mut element = BytesStart::new(name);
    element.push_attribute(("w:val", val));
    writer.write_event(Event::Empty(element)).map_err(xml_err)
}

/// Write one paragraph with its style/run properties.
fn write_paragraph(writer: &mut Writer<Vec<u8>>, paragraph: &OutParagraph) -> Result<()> {
    let (text, style, centered, bold_italic) = match paragraph {
        OutParagraph::Title(text) => (text.as_str(), Some("Title".to_string()), false, false),
        OutParagraph::Heading(text, level) => {
            (text.as_str(), Some(format!("Heading{level}")), false, false)
        }
        OutParagraph::SourceLabel(text) => (text.as_str(), None, true, true),
        OutParagraph::Body(text) => (text.as_str(), None, false, false),
    };

    writer
        .write_event(Event::Start(BytesStart::new("w:p")))
        .map_err(xml_err)?;

    if style.is_some() || centered {
        writer
            .write_event(Event::Start(BytesStart::new("w:pPr")))
            .map_err(xml_err)?;
        if let Some(style_id) = &style {
            write_val_element(writer, "w:pStyle", style_id)?;
        }
        if centered {
            write_val_element(writer, "w:jc", "center")?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("w:pPr")))
            .map_err(xml_err)?;
    }

    if !text.is_empty() {
        writer
            .write_event(Event::Start(BytesStart::new("w:r")))
            .map_err(xml_err)?;
        if bold_italic {
            writer
                .write_event(Event::Start(BytesStart::new("w:rPr")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Empty(BytesStart::new("w:b")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Empty(BytesStart::new("w:i")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("w:rPr")))
                .map_err(xml_err)?;
        }

        let mut t = BytesStart::new("w:t");
        t.push_attribute(("xml:space", "preserve"));
        writer.write_event(Event::Start(t)).map_err(xml_err)?;
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:t")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("w:r")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("w:p")))
        .map_err(xml_err)
}

/// Write a table as `w:tbl` with one plain paragraph per cell.
fn write_table(writer: &mut Writer<Vec<u8>>, rows: &[Vec<String>]) -> Result<()> {
    writer
        .write_event(Event::Start(BytesStart::new("w:tbl")))
        .map_err(xml_err)?;

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    writer
        .write_event(Event::Start(BytesStart::new("w:tblGrid")))
        .map_err(xml_err)?;
    for _ in 0..width {
        writer
            .write_event(Event::Empty(BytesStart::new("w:gridCol")))
            .map_err(xml_err)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("w:tblGrid")))
        .map_err(xml_err)?;

    for row in rows {
        writer
            .write_event(Event::Start(BytesStart::new("w:tr")))
            .map_err(xml_err)?;
        for cell in row {
            writer
                .write_event(Event::Start(BytesStart::new("w:tc")))
                .map_err(xml_err)?;
            write_paragraph(writer, &OutParagraph::Body(cell.clone()))?;
            writer
                .write_event(Event::End(BytesEnd::new("w:tc")))
                .map_err(xml_err)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("w:tr")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("w:tbl")))
        .map_err(xml_err)
}

/// Serialize `word/styles.xml`: Normal, Title and Heading1..Heading9.
///
/// Heading style display names use the stock `"heading N"` form so the
/// reader side (and any other consumer) classifies them by name.
fn render_styles_xml() -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;

    let mut styles = BytesStart::new("w:styles");
    styles.push_attribute(("xmlns:w", WORD_ML_NS));
    writer.write_event(Event::Start(styles)).map_err(xml_err)?;

    write_style(&mut writer, "Normal", "Normal", None, None)?;
    write_style(&mut writer, "Title", "Title", None, Some(56))?;
    for level in 1..=MAX_HEADING_LEVEL {
        let size = 36_u8.saturating_sub(2 * level).max(24);
        write_style(
            &mut writer,
            &format!("Heading{level}"),
            &format!("heading {level}"),
            Some(level - 1),
            Some(size),
        )?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("w:styles")))
        .map_err(xml_err)?;
    Ok(writer.into_inner())
}

/// Write one `w:style` definition.
fn write_style(
    writer: &mut Writer<Vec<u8>>,
    style_id: &str,
    name: &str,
    outline_level: Option<u8>,
    half_point_size: Option<u8>,
) -> Result<()> {
    let mut style = BytesStart::new("w:style");
    style.push_attribute(("w:type", "paragraph"));
    style.push_attribute(("w:styleId", style_id));
    if style_id == "Normal" {
        style.push_attribute(("w:default", "1"));
    }
    writer.write_event(Event::Start(style)).map_err(xml_err)?;

    write_val_element(writer, "w:name", name)?;

    if let Some(outline) = outline_level {
        writer
            .write_event(Event::Start(BytesStart::new("w:pPr")))
            .map_err(xml_err)?;
        write_val_element(writer, "w:outlineLvl", &outline.to_string())?;
        writer
            .write_event(Event::End(BytesEnd::new("w:pPr")))
            .map_err(xml_err)?;
    }

    if let Some(size) = half_point_size {
        writer
            .write_event(Event::Start(BytesStart::new("w:rPr")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Empty(BytesStart::new("w:b")))
            .map_err(xml_err)?;
        write_val_element(writer, "w:sz", &size.to_string())?;
        writer
            .write_event(Event::End(BytesEnd::new("w:rPr")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("w:style")))
        .map_err(xml_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::DocxReader;

    #[test]
    fn test_writer_reader_roundtrip() {
        let mut writer = DocxWriter::new();
        writer.add_title("Unified Document");
        writer.add_heading("Intro", 1);
        writer.add_source_label("[Source: a.docx]");
        writer.add_paragraph("hello world");
        writer.add_paragraph("");

        let bytes = writer.finish().unwrap();
        let blocks = DocxReader::read(&bytes).unwrap();

        assert_eq!(blocks.len(), 5);
        let title = blocks[0].as_paragraph().unwrap();
        assert_eq!(title.text, "Unified Document");
        assert_eq!(title.style_name.as_deref(), Some("Title"));

        let heading = blocks[1].as_paragraph().unwrap();
        assert_eq!(heading.text, "Intro");
        assert_eq!(heading.style_name.as_deref(), Some("heading 1"));

        let label = blocks[2].as_paragraph().unwrap();
        assert_eq!(label.text, "[Source: a.docx]");
        assert_eq!(label.style_name, None);

        assert_eq!(blocks[3].as_paragraph().unwrap().text, "hello world");
        assert_eq!(blocks[4].as_paragraph().unwrap().text, "");
    }

    #[test]
    fn test_heading_level_clamped() {
        let mut writer = DocxWriter::new();
        writer.add_heading("deep", 12);
        writer.add_heading("shallow", 0);

        let bytes = writer.finish().unwrap();
        let blocks = DocxReader::read(&bytes).unwrap();
        assert_eq!(
            blocks[0].as_paragraph().unwrap().style_name.as_deref(),
            Some("heading 9")
        );
        assert_eq!(
            blocks[1].as_paragraph().unwrap().style_name.as_deref(),
            Some("heading 1")
        );
    }

    #[test]
    fn test_text_escaping_roundtrip() {
        let mut writer = DocxWriter::new();
        writer.add_paragraph("a & b < c > d \"q\"");

        let bytes = writer.finish().unwrap();
        let blocks = DocxReader::read(&bytes).unwrap();
        assert_eq!(blocks[0].as_paragraph().unwrap().text, "a & b < c > d \"q\"");
    }

    #[test]
    fn test_package_has_expected_parts() {
        use std::io::Cursor;
        use zip::ZipArchive;

        let mut writer = DocxWriter::new();
        writer.add_paragraph("x");
        let bytes = writer.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/_rels/document.xml.rels",
            "docProps/core.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {part}");
        }
    }

    #[test]
    fn test_empty_document_is_valid_package() {
        let bytes = DocxWriter::new().finish().unwrap();
        let blocks = DocxReader::read(&bytes).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_table_roundtrip() {
        let mut writer = DocxWriter::new();
        writer.add_paragraph("before");
        writer.add_table(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ]);

        let bytes = writer.finish().unwrap();
        let blocks = DocxReader::read(&bytes).unwrap();

        assert_eq!(blocks.len(), 2);
        let table = blocks[1].as_table().unwrap();
        assert_eq!(
            table.rows,
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
    }
}

//! XLSX (Microsoft Excel) package writer.
//!
//! Produces a workbook of plain text sheets using inline strings, one
//! worksheet part per sheet. Only what the table export needs: no shared
//! strings, no number formats, no styling.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use docmerge_core::{MergeError, Result};

use crate::package::{
    core_properties_xml, PackageBuilder, REL_TYPE_CORE_PROPERTIES, REL_TYPE_OFFICE_DOCUMENT,
};

/// SpreadsheetML main namespace.
const SHEET_ML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Relationships namespace used by workbook.xml.
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Hard cap on worksheet names in the XLSX format.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Characters the XLSX format forbids in worksheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Make a string safe to use as a worksheet name.
///
/// Forbidden characters become `_`, whitespace runs collapse to a single
/// `_`, and the result is truncated to [`MAX_SHEET_NAME_LEN`] characters
/// (plain prefix truncation, no word-boundary logic). An empty result
/// falls back to `"Sheet"`.
#[must_use]
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| {
            if FORBIDDEN_SHEET_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Convert a 0-based column index to its A1-style column reference.
///
/// `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`.
#[must_use]
pub fn column_reference(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_else(|_| "A".to_string())
}

/// One worksheet of text rows.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Sheet {
    name: String,
    rows: Vec<Vec<String>>,
}

/// Accumulates sheets and renders them into XLSX package bytes.
#[derive(Debug, Default)]
pub struct WorkbookWriter {
    sheets: Vec<Sheet>,
}

impl WorkbookWriter {
    /// Start an empty workbook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sheet. The name is sanitized and truncated to the
    /// format's cap; rows are written as given (callers pad ragged rows
    /// if a rectangular grid is wanted).
    pub fn add_sheet(&mut self, name: &str, rows: Vec<Vec<String>>) {
        self.sheets.push(Sheet {
            name: sanitize_sheet_name(name),
            rows,
        });
    }

    /// Number of sheets added so far.
    #[inline]
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Render the workbook into XLSX package bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Backend`] when no sheets were added (the
    /// XLSX format requires at least one worksheet; callers emit a
    /// placeholder sheet instead of an empty workbook) or when package
    /// assembly fails.
    pub fn finish(self) -> Result<Vec<u8>> {
        if self.sheets.is_empty() {
            return Err(MergeError::Backend(
                "a workbook requires at least one sheet".to_string(),
            ));
        }

        let mut pkg = PackageBuilder::new();
        pkg.add_part("[Content_Types].xml", self.content_types_xml().as_bytes())?;
        pkg.add_part("_rels/.rels", root_rels_xml().as_bytes())?;
        pkg.add_part("xl/workbook.xml", &self.workbook_xml()?)?;
        pkg.add_part(
            "xl/_rels/workbook.xml.rels",
            self.workbook_rels_xml().as_bytes(),
        )?;
        for (idx, sheet) in self.sheets.iter().enumerate() {
            let part = format!("xl/worksheets/sheet{}.xml", idx + 1);
            pkg.add_part(&part, &render_sheet_xml(sheet)?)?;
        }
        pkg.add_part("docProps/core.xml", core_properties_xml().as_bytes())?;
        pkg.finish()
    }

    fn content_types_xml(&self) -> String {
        let mut xml = String::from(concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
            "<Override PartName=\"/docProps/core.xml\" ContentType=\"application/vnd.openxmlformats-package.core-properties+xml\"/>",
        ));
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                "<Override PartName=\"/xl/worksheets/sheet{idx}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn workbook_rels_xml(&self) -> String {
        let mut xml = String::from(concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
        ));
        for idx in 1..=self.sheets.len() {
            xml.push_str(&format!(
                "<Relationship Id=\"rId{idx}\" Type=\"{REL_NS}/worksheet\" Target=\"worksheets/sheet{idx}.xml\"/>"
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    /// Serialize `xl/workbook.xml` with one `sheet` entry per worksheet.
    fn workbook_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_err)?;

        let mut workbook = BytesStart::new("workbook");
        workbook.push_attribute(("xmlns", SHEET_ML_NS));
        workbook.push_attribute(("xmlns:r", REL_NS));
        writer.write_event(Event::Start(workbook)).map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("sheets")))
            .map_err(xml_err)?;

        for (idx, sheet) in self.sheets.iter().enumerate() {
            let mut entry = BytesStart::new("sheet");
            entry.push_attribute(("name", sheet.name.as_str()));
            entry.push_attribute(("sheetId", (idx + 1).to_string().as_str()));
            entry.push_attribute(("r:id", format!("rId{}", idx + 1).as_str()));
            writer.write_event(Event::Empty(entry)).map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("sheets")))
            .map_err(xml_err)?;
        writer
            .write_event(Event::End(BytesEnd::new("workbook")))
            .map_err(xml_err)?;
        Ok(writer.into_inner())
    }
}

/// Map a quick-xml error into the crate error type.
fn xml_err(e: quick_xml::Error) -> MergeError {
    MergeError::Backend(format!("Failed to write workbook XML: {e}"))
}

/// Package-level relationships: workbook + core properties.
fn root_rels_xml() -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{office}\" Target=\"xl/workbook.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"{core}\" Target=\"docProps/core.xml\"/>",
            "</Relationships>",
        ),
        office = REL_TYPE_OFFICE_DOCUMENT,
        core = REL_TYPE_CORE_PROPERTIES,
    )
}

/// Serialize one worksheet as inline-string cells.
fn render_sheet_xml(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_err)?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", SHEET_ML_NS));
    writer.write_event(Event::Start(worksheet)).map_err(xml_err)?;
    writer
        .write_event(Event::Start(BytesStart::new("sheetData")))
        .map_err(xml_err)?;

    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let row_ref = (row_idx + 1).to_string();
        let mut row_el = BytesStart::new("row");
        row_el.push_attribute(("r", row_ref.as_str()));
        writer.write_event(Event::Start(row_el)).map_err(xml_err)?;

        for (col_idx, cell) in row.iter().enumerate() {
            let cell_ref = format!("{}{row_ref}", column_reference(col_idx));
            let mut cell_el = BytesStart::new("c");
            cell_el.push_attribute(("r", cell_ref.as_str()));
            cell_el.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(cell_el)).map_err(xml_err)?;
            writer
                .write_event(Event::Start(BytesStart::new("is")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Start(BytesStart::new("t")))
                .map_err(xml_err)?;
            writer
                .write_event(Event::Text(BytesText::new(cell)))
                .map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("t"))).map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new("is")))
                .map_err(xml_err)?;
            writer.write_event(Event::End(BytesEnd::new("c"))).map_err(xml_err)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("row")))
            .map_err(xml_err)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("sheetData")))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new("worksheet")))
        .map_err(xml_err)?;
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    #[test]
    fn test_column_reference() {
        assert_eq!(column_reference(0), "A");
        assert_eq!(column_reference(1), "B");
        assert_eq!(column_reference(25), "Z");
        assert_eq!(column_reference(26), "AA");
        assert_eq!(column_reference(27), "AB");
        assert_eq!(column_reference(51), "AZ");
        assert_eq!(column_reference(52), "BA");
        assert_eq!(column_reference(701), "ZZ");
        assert_eq!(column_reference(702), "AAA");
    }

    #[test]
    fn test_sanitize_sheet_name_forbidden_chars() {
        assert_eq!(sanitize_sheet_name("a/b:c*d?e[f]g\\h"), "a_b_c_d_e_f_g_h");
    }

    #[test]
    fn test_sanitize_sheet_name_whitespace_and_cap() {
        assert_eq!(sanitize_sheet_name("  Plan   de  mejora "), "Plan_de_mejora");
        let long = "x".repeat(100);
        assert_eq!(sanitize_sheet_name(&long).chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_sanitize_sheet_name_empty_fallback() {
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
        assert_eq!(sanitize_sheet_name(""), "Sheet");
    }

    #[test]
    fn test_empty_workbook_rejected() {
        let err = WorkbookWriter::new().finish().unwrap_err();
        assert!(err.to_string().contains("at least one sheet"));
    }

    #[test]
    fn test_workbook_parts_and_sheet_content() {
        let mut writer = WorkbookWriter::new();
        writer.add_sheet(
            "Table_001_intro",
            vec![
                vec!["a".to_string(), "b & c".to_string()],
                vec!["d".to_string(), String::new()],
            ],
        );
        writer.add_sheet("Second", vec![vec!["x".to_string()]]);
        assert_eq!(writer.sheet_count(), 2);

        let bytes = writer.finish().unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/workbook.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/worksheets/sheet1.xml",
            "xl/worksheets/sheet2.xml",
            "docProps/core.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part {part}");
        }

        let mut sheet1 = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet1)
            .unwrap();
        assert!(sheet1.contains(r#"<c r="A1" t="inlineStr"><is><t>a</t></is></c>"#));
        assert!(sheet1.contains("b &amp; c"));
        assert!(sheet1.contains(r#"<row r="2">"#));

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains(r#"name="Table_001_intro""#));
        assert!(workbook.contains(r#"sheetId="2""#));
    }

    #[test]
    fn test_sheet_count_matches_worksheet_parts() {
        let mut writer = WorkbookWriter::new();
        for i in 0..5 {
            writer.add_sheet(&format!("S{i}"), vec![vec![i.to_string()]]);
        }
        let bytes = writer.finish().unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let worksheet_parts = archive
            .file_names()
            .filter(|name| name.starts_with("xl/worksheets/"))
            .count();
        assert_eq!(worksheet_parts, 5);
    }
}

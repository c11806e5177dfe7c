//! Table flattening and the tabular side export.
//!
//! Tables appear twice in merge output: flattened to delimited text rows
//! inside the merged document (lossy by design), and as true grids in a
//! separate workbook, one sheet per table.

use docmerge_core::{collapse_whitespace, Result, TableBlock};
use docmerge_backend::{sanitize_sheet_name, WorkbookWriter};

/// Delimiter between cells in flattened table rows.
pub const TABLE_CELL_DELIMITER: &str = " | ";

/// Sheet name of the placeholder emitted when no tables were found.
pub const NO_TABLES_SHEET_NAME: &str = "Tables";

/// Cell content of the placeholder sheet.
pub const NO_TABLES_MESSAGE: &str = "No tables found in the selected sections";

/// One table captured for the workbook export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableExport {
    /// Title of the section the table was found under.
    pub title: String,
    /// Name of the document the table came from.
    pub source: String,
    /// The table grid, rows possibly ragged.
    pub rows: Vec<Vec<String>>,
}

/// Flatten a table to one delimited text line per row.
///
/// Cells are whitespace-collapsed; callers surround the returned lines
/// with one blank paragraph on each side.
#[must_use]
pub fn flatten_table(table: &TableBlock) -> Vec<String> {
    table
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| collapse_whitespace(cell))
                .collect::<Vec<_>>()
                .join(TABLE_CELL_DELIMITER)
        })
        .collect()
}

/// Build the sheet name for the `index`-th exported table (1-based):
/// `Table_NNN` plus a sanitized fragment of the section title, truncated
/// to the format's 31-character cap (plain prefix truncation).
#[must_use]
pub fn sheet_title(index: usize, title: &str) -> String {
    let fragment = collapse_whitespace(title);
    let composed = if fragment.is_empty() {
        format!("Table_{index:03}")
    } else {
        format!("Table_{index:03}_{fragment}")
    };
    sanitize_sheet_name(&composed)
}

/// Render the accumulated tables into workbook bytes.
///
/// One sheet per table in encounter order, ragged rows padded with empty
/// cells to the table's widest row. Zero tables produce a single
/// placeholder sheet rather than an empty file; the placeholder is a
/// caller-visible contract.
///
/// # Errors
///
/// Returns a backend error when workbook assembly fails.
pub fn export_workbook(tables: &[TableExport]) -> Result<Vec<u8>> {
    let mut writer = WorkbookWriter::new();

    if tables.is_empty() {
        writer.add_sheet(
            NO_TABLES_SHEET_NAME,
            vec![vec![NO_TABLES_MESSAGE.to_string()]],
        );
        return writer.finish();
    }

    for (idx, table) in tables.iter().enumerate() {
        writer.add_sheet(&sheet_title(idx + 1, &table.title), pad_grid(&table.rows));
    }
    writer.finish()
}

/// Pad ragged rows with empty cells to the widest row, collapsing cell
/// whitespace on the way.
fn pad_grid(rows: &[Vec<String>]) -> Vec<Vec<String>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    rows.iter()
        .map(|row| {
            let mut padded: Vec<String> = row.iter().map(|c| collapse_whitespace(c)).collect();
            padded.resize(width, String::new());
            padded
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn table(rows: &[&[&str]]) -> TableBlock {
        TableBlock {
            rows: rows
                .iter()
                .map(|r| r.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    #[test]
    fn test_flatten_table_rows() {
        let t = table(&[&["a", "b"], &["c  d", "e"]]);
        assert_eq!(flatten_table(&t), vec!["a | b", "c d | e"]);
    }

    #[test]
    fn test_flatten_table_collapses_cell_whitespace() {
        let t = table(&[&["  x \t y ", ""]]);
        assert_eq!(flatten_table(&t), vec!["x y | "]);
    }

    #[test]
    fn test_sheet_title_composition() {
        assert_eq!(sheet_title(1, "Intro"), "Table_001_Intro");
        assert_eq!(sheet_title(12, ""), "Table_012");
        assert_eq!(sheet_title(3, "  Plan   de mejora "), "Table_003_Plan_de_mejora");
    }

    #[test]
    fn test_sheet_title_truncated_to_cap() {
        let name = sheet_title(1, &"x".repeat(80));
        assert_eq!(name.chars().count(), 31);
        assert!(name.starts_with("Table_001_x"));
    }

    #[test]
    fn test_pad_grid_ragged_rows() {
        let padded = pad_grid(&[
            vec!["a".to_string()],
            vec!["b".to_string(), "c".to_string(), "d".to_string()],
        ]);
        assert_eq!(padded[0], vec!["a", "", ""]);
        assert_eq!(padded[1], vec!["b", "c", "d"]);
    }

    #[test]
    fn test_export_zero_tables_yields_placeholder_sheet() {
        let bytes = export_workbook(&[]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let worksheet_count = archive
            .file_names()
            .filter(|n| n.starts_with("xl/worksheets/"))
            .count();
        assert_eq!(worksheet_count, 1);

        let mut sheet = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet)
            .unwrap();
        assert!(sheet.contains(NO_TABLES_MESSAGE));
    }

    #[test]
    fn test_export_one_sheet_per_table() {
        let tables = vec![
            TableExport {
                title: "Intro".to_string(),
                source: "a.docx".to_string(),
                rows: vec![vec!["a".to_string()]],
            },
            TableExport {
                title: "Intro".to_string(),
                source: "b.docx".to_string(),
                rows: vec![vec!["b".to_string(), "c".to_string()]],
            },
            TableExport {
                title: "Results".to_string(),
                source: "a.docx".to_string(),
                rows: vec![vec!["d".to_string()]],
            },
        ];
        let bytes = export_workbook(&tables).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let worksheet_count = archive
            .file_names()
            .filter(|n| n.starts_with("xl/worksheets/"))
            .count();
        assert_eq!(worksheet_count, 3);

        let mut workbook = String::new();
        archive
            .by_name("xl/workbook.xml")
            .unwrap()
            .read_to_string(&mut workbook)
            .unwrap();
        assert!(workbook.contains("Table_001_Intro"));
        assert!(workbook.contains("Table_002_Intro"));
        assert!(workbook.contains("Table_003_Results"));
    }
}

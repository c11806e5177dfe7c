//! docmerge CLI - batch section merging over local DOCX files.
//!
//! Thin collaborator around the engine: it gathers input files (explicit
//! paths or scanned directories), runs one merge operation, and writes
//! the resulting payload mapping into an output directory. Everything
//! content-related happens in `docmerge-engine`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use docmerge_core::{SourceDocument, TitleCatalog};
use docmerge_engine::{
    extract_headings, merge_by_catalog, merge_grouped, merge_unified, GroupingLevel, MergeOutput,
    SegmentOptions, SelectionCriteria,
};

#[derive(Parser)]
#[command(
    name = "docmerge",
    version,
    about = "Merge DOCX sections across documents by heading"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the heading overview of each input document
    Headings {
        /// DOCX files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Emit the overview as JSON
        #[arg(long)]
        json: bool,
    },
    /// Merge every matching section into one consolidated document
    Unified {
        /// DOCX files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Section-opening heading levels
        #[arg(long, value_delimiter = ',', default_value = "1,2,3")]
        levels: Vec<u8>,
        /// File with allowed titles, one per line (absent = take everything)
        #[arg(long)]
        titles: Option<PathBuf>,
        /// Strict allow-list enforcement
        #[arg(long)]
        enforce: bool,
        /// Directory the outputs are written to
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Produce one document per distinct title, pooled across inputs
    Grouped {
        /// DOCX files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Heading level to group at
        #[arg(long, default_value_t = 1, conflicts_with = "any_level")]
        level: u8,
        /// Group across all heading levels instead of one
        #[arg(long)]
        any_level: bool,
        /// File with allowed titles, one per line (absent = take everything)
        #[arg(long)]
        titles: Option<PathBuf>,
        /// Strict allow-list enforcement
        #[arg(long)]
        enforce: bool,
        /// Directory the outputs are written to
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
    /// Catalog-driven merge: per-title documents, workbooks and the
    /// absence report
    Catalog {
        /// DOCX files or directories to scan
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// File with the expected titles, one per line (numbering
        /// markers like "01. " are understood)
        #[arg(long)]
        catalog: PathBuf,
        /// Directory the outputs are written to
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Headings { inputs, json } => run_headings(&inputs, json),
        Command::Unified {
            inputs,
            levels,
            titles,
            enforce,
            out_dir,
        } => {
            let documents = collect_documents(&inputs)?;
            let allow = read_title_lines(titles.as_deref())?;
            let criteria = SelectionCriteria::new(levels, &allow, enforce)?;
            let result = merge_unified(&documents, &criteria, &SegmentOptions::default())?;
            finish(&out_dir, &result)
        }
        Command::Grouped {
            inputs,
            level,
            any_level,
            titles,
            enforce,
            out_dir,
        } => {
            let documents = collect_documents(&inputs)?;
            let allow = read_title_lines(titles.as_deref())?;
            let grouping = if any_level {
                GroupingLevel::AnyLevel
            } else {
                GroupingLevel::Level(level)
            };
            let result = merge_grouped(
                &documents,
                grouping,
                &allow,
                enforce,
                &SegmentOptions::default(),
            )?;
            finish(&out_dir, &result)
        }
        Command::Catalog {
            inputs,
            catalog,
            out_dir,
        } => {
            let documents = collect_documents(&inputs)?;
            let text = fs::read_to_string(&catalog)
                .with_context(|| format!("Failed to read catalog file {}", catalog.display()))?;
            let catalog = TitleCatalog::from_lines(&text);
            let result = merge_by_catalog(&documents, &catalog, &SegmentOptions::default())?;
            finish(&out_dir, &result)
        }
    }
}

/// Is this filename a merge candidate? `.docx`, not an editor lock file
/// (`~$...`), not a dotfile.
fn is_merge_candidate(name: &str) -> bool {
    name.to_lowercase().ends_with(".docx") && !name.starts_with("~$") && !name.starts_with('.')
}

/// Load input documents from explicit files and scanned directories.
///
/// Directory entries are taken in name order so batch runs are
/// deterministic.
fn collect_documents(inputs: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("Failed to scan directory {}", input.display()))?
                .filter_map(std::result::Result::ok)
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(is_merge_candidate)
                })
                .collect();
            entries.sort();
            for path in entries {
                documents.push(load_document(&path)?);
            }
        } else {
            documents.push(load_document(input)?);
        }
    }
    if documents.is_empty() {
        bail!("no input documents found");
    }
    Ok(documents)
}

/// Read one file into a named source document.
fn load_document(path: &Path) -> Result<SourceDocument> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.docx")
        .to_string();
    Ok(SourceDocument::new(name, bytes))
}

/// Read an optional allow-list file: one title per line, blanks skipped.
fn read_title_lines(path: Option<&Path>) -> Result<Vec<String>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read title list {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

/// Print the heading overview of each input document.
fn run_headings(inputs: &[PathBuf], json: bool) -> Result<()> {
    let documents = collect_documents(inputs)?;

    if json {
        let mut overview = BTreeMap::new();
        for document in &documents {
            let headings = extract_headings(&document.bytes)
                .with_context(|| format!("Failed to parse {}", document.name))?;
            overview.insert(document.name.clone(), headings);
        }
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    for document in &documents {
        let headings = extract_headings(&document.bytes)
            .with_context(|| format!("Failed to parse {}", document.name))?;
        println!("{}:", document.name);
        if headings.is_empty() {
            println!("  (no headings)");
        }
        for heading in headings {
            println!("  H{} {}", heading.level, heading.text);
        }
    }
    Ok(())
}

/// Write the merge outputs and summarize skips on stderr.
fn finish(out_dir: &Path, result: &MergeOutput) -> Result<()> {
    write_outputs(out_dir, &result.outputs)?;
    for skip in &result.skipped {
        eprintln!("skipped {}: {}", skip.name, skip.reason);
    }
    println!(
        "{} output file(s) written to {}",
        result.outputs.len(),
        out_dir.display()
    );
    Ok(())
}

/// Write each named payload under the output directory.
fn write_outputs(out_dir: &Path, outputs: &BTreeMap<String, Vec<u8>>) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    for (name, payload) in outputs {
        let path = out_dir.join(name);
        fs::write(&path, payload)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmerge_backend::DocxWriter;

    #[test]
    fn test_is_merge_candidate() {
        assert!(is_merge_candidate("report.docx"));
        assert!(is_merge_candidate("REPORT.DOCX"));
        assert!(!is_merge_candidate("~$report.docx"));
        assert!(!is_merge_candidate(".hidden.docx"));
        assert!(!is_merge_candidate("notes.txt"));
        assert!(!is_merge_candidate("archive.docx.zip"));
    }

    #[test]
    fn test_read_title_lines_absent_means_empty() {
        assert!(read_title_lines(None).unwrap().is_empty());
    }

    #[test]
    fn test_read_title_lines_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("titles.txt");
        fs::write(&path, "Alpha\n\n  Beta  \n").unwrap();

        let titles = read_title_lines(Some(&path)).unwrap();
        assert_eq!(titles, vec!["Alpha".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn test_collect_documents_scans_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.docx", "a.docx", "~$a.docx", "notes.txt"] {
            let mut writer = DocxWriter::new();
            writer.add_paragraph("x");
            fs::write(dir.path().join(name), writer.finish().unwrap()).unwrap();
        }

        let documents = collect_documents(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a.docx", "b.docx"]);
    }

    #[test]
    fn test_collect_documents_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_documents(&[dir.path().to_path_buf()]).is_err());
    }

    #[test]
    fn test_write_outputs_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("out");
        let mut outputs = BTreeMap::new();
        outputs.insert("a.txt".to_string(), b"payload".to_vec());

        write_outputs(&out_dir, &outputs).unwrap();
        assert_eq!(fs::read(out_dir.join("a.txt")).unwrap(), b"payload");
    }
}

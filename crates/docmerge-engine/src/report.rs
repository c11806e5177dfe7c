//! Title presence / absence reporting against a catalog.
//!
//! For a batch of documents and an expected-title catalog, records which
//! documents contain no catalog title at all, which titles each document
//! is missing, and which documents each title is missing from. The
//! rendered form is the plain-text companion report shipped next to a
//! catalog merge.

use std::collections::{HashMap, HashSet};

use docmerge_core::{Block, MergeError, Result, SourceDocument, TitleCatalog};

use crate::assemble::{read_or_skip, SkippedDocument};

/// Presence matrix of catalog titles across a document batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceReport {
    /// Documents that were readable, in input order.
    pub analyzed: Vec<String>,
    /// Documents skipped as unreadable, in input order.
    pub skipped: Vec<String>,
    /// Readable documents containing no catalog title at all.
    pub files_without_titles: Vec<String>,
    /// Per document (input order): catalog titles it lacks, in catalog
    /// order. Documents missing nothing are omitted.
    pub missing_by_file: Vec<(String, Vec<String>)>,
    /// Per catalog title (catalog order): documents lacking it, in input
    /// order. Titles present everywhere are omitted.
    pub missing_by_title: Vec<(String, Vec<String>)>,
}

impl PresenceReport {
    /// Build the report from a finished scan.
    ///
    /// `found_by_file` maps each analyzed document to the catalog
    /// DISPLAY titles recognized in it.
    #[must_use]
    pub fn from_observations(
        analyzed: &[String],
        skipped: &[SkippedDocument],
        found_by_file: &HashMap<String, HashSet<String>>,
        catalog: &TitleCatalog,
    ) -> Self {
        let empty = HashSet::new();

        let files_without_titles: Vec<String> = analyzed
            .iter()
            .filter(|name| found_by_file.get(*name).unwrap_or(&empty).is_empty())
            .cloned()
            .collect();

        let missing_by_file: Vec<(String, Vec<String>)> = analyzed
            .iter()
            .filter_map(|name| {
                let found = found_by_file.get(name).unwrap_or(&empty);
                let missing: Vec<String> = catalog
                    .display_titles()
                    .filter(|title| !found.contains(*title))
                    .map(ToString::to_string)
                    .collect();
                (!missing.is_empty()).then(|| (name.clone(), missing))
            })
            .collect();

        let missing_by_title: Vec<(String, Vec<String>)> = catalog
            .display_titles()
            .filter_map(|title| {
                let absent: Vec<String> = analyzed
                    .iter()
                    .filter(|name| !found_by_file.get(*name).unwrap_or(&empty).contains(title))
                    .cloned()
                    .collect();
                (!absent.is_empty()).then(|| (title.to_string(), absent))
            })
            .collect();

        Self {
            analyzed: analyzed.to_vec(),
            skipped: skipped.iter().map(|s| s.name.clone()).collect(),
            files_without_titles,
            missing_by_file,
            missing_by_title,
        }
    }

    /// True when every analyzed document carries every catalog title.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_by_file.is_empty() && self.skipped.is_empty()
    }

    /// Render the three-part plain-text report.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("A) Documents containing no catalog title:\n");
        if self.files_without_titles.is_empty() {
            out.push_str("  (every analyzed document contains at least one catalog title)\n");
        } else {
            for name in &self.files_without_titles {
                out.push_str(&format!("- {name}\n"));
            }
        }

        out.push_str("\nB) Missing titles per document:\n");
        if self.missing_by_file.is_empty() {
            out.push_str("  (no document is missing any catalog title)\n");
        } else {
            for (name, missing) in &self.missing_by_file {
                out.push_str(&format!("- {name}\n"));
                for title in missing {
                    out.push_str(&format!("    missing: {title}\n"));
                }
            }
        }

        out.push_str("\nC) Documents missing each title:\n");
        if self.missing_by_title.is_empty() {
            out.push_str("  (every catalog title is present in every document)\n");
        } else {
            for (title, absent) in &self.missing_by_title {
                out.push_str(&format!("- {title}\n"));
                for name in absent {
                    out.push_str(&format!("    not in: {name}\n"));
                }
            }
        }

        if !self.skipped.is_empty() {
            out.push_str("\nSkipped (unreadable):\n");
            for name in &self.skipped {
                out.push_str(&format!("- {name}\n"));
            }
        }

        out
    }
}

/// Scan documents for catalog titles and build the presence report.
///
/// Unreadable documents are skipped and recorded, matching the merge
/// operations' behavior.
///
/// # Errors
///
/// Returns [`MergeError::InvalidCriteria`] for an empty catalog and
/// [`MergeError::NoDocuments`] for an empty input set.
pub fn title_presence(
    documents: &[SourceDocument],
    catalog: &TitleCatalog,
) -> Result<PresenceReport> {
    if catalog.is_empty() {
        return Err(MergeError::InvalidCriteria(
            "the title catalog has no entries".to_string(),
        ));
    }
    if documents.is_empty() {
        return Err(MergeError::NoDocuments);
    }

    let mut skipped = Vec::new();
    let mut analyzed = Vec::new();
    let mut found_by_file: HashMap<String, HashSet<String>> = HashMap::new();

    for document in documents {
        let Some(blocks) = read_or_skip(document, &mut skipped) else {
            continue;
        };
        analyzed.push(document.name.clone());
        let found = found_by_file.entry(document.name.clone()).or_default();
        for paragraph in blocks.iter().filter_map(Block::as_paragraph) {
            if let Some(entry) = catalog.match_title(&paragraph.text) {
                found.insert(entry.display.clone());
            }
        }
    }

    Ok(PresenceReport::from_observations(
        &analyzed,
        &skipped,
        &found_by_file,
        catalog,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observations(
        analyzed: &[&str],
        found: &[(&str, &[&str])],
    ) -> (Vec<String>, HashMap<String, HashSet<String>>) {
        let analyzed: Vec<String> = analyzed.iter().map(ToString::to_string).collect();
        let mut map = HashMap::new();
        for (name, titles) in found {
            map.insert(
                (*name).to_string(),
                titles.iter().map(ToString::to_string).collect(),
            );
        }
        (analyzed, map)
    }

    #[test]
    fn test_report_complete_batch() {
        let catalog = TitleCatalog::from_lines("01. Alpha\n02. Beta");
        let (analyzed, found) = observations(
            &["a.docx"],
            &[("a.docx", &["01 Alpha", "02 Beta"])],
        );
        let report = PresenceReport::from_observations(&analyzed, &[], &found, &catalog);

        assert!(report.is_complete());
        assert!(report.files_without_titles.is_empty());
        assert!(report.missing_by_file.is_empty());
        assert!(report.missing_by_title.is_empty());

        let text = report.render();
        assert!(text.contains("every analyzed document contains"));
        assert!(text.contains("no document is missing"));
    }

    #[test]
    fn test_report_missing_matrix() {
        let catalog = TitleCatalog::from_lines("01. Alpha\n02. Beta");
        let (analyzed, found) = observations(
            &["a.docx", "b.docx", "c.docx"],
            &[
                ("a.docx", &["01 Alpha", "02 Beta"]),
                ("b.docx", &["01 Alpha"]),
                ("c.docx", &[]),
            ],
        );
        let report = PresenceReport::from_observations(&analyzed, &[], &found, &catalog);

        assert_eq!(report.files_without_titles, vec!["c.docx"]);
        assert_eq!(report.missing_by_file.len(), 2);
        assert_eq!(report.missing_by_file[0].0, "b.docx");
        assert_eq!(report.missing_by_file[0].1, vec!["02 Beta"]);
        assert_eq!(report.missing_by_file[1].0, "c.docx");
        assert_eq!(report.missing_by_file[1].1, vec!["01 Alpha", "02 Beta"]);

        // Title order follows the catalog; absent-file order the input.
        assert_eq!(report.missing_by_title.len(), 2);
        assert_eq!(report.missing_by_title[0].0, "01 Alpha");
        assert_eq!(report.missing_by_title[0].1, vec!["c.docx"]);
        assert_eq!(report.missing_by_title[1].0, "02 Beta");
        assert_eq!(report.missing_by_title[1].1, vec!["b.docx", "c.docx"]);
    }

    #[test]
    fn test_report_render_sections() {
        let catalog = TitleCatalog::from_lines("01. Alpha");
        let (analyzed, found) = observations(&["a.docx"], &[("a.docx", &[])]);
        let skipped = vec![SkippedDocument {
            name: "broken.docx".to_string(),
            reason: "bad zip".to_string(),
        }];
        let report = PresenceReport::from_observations(&analyzed, &skipped, &found, &catalog);

        let text = report.render();
        assert!(text.contains("A) Documents containing no catalog title:\n- a.docx"));
        assert!(text.contains("missing: 01 Alpha"));
        assert!(text.contains("not in: a.docx"));
        assert!(text.contains("Skipped (unreadable):\n- broken.docx"));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_title_presence_rejects_empty_inputs() {
        let catalog = TitleCatalog::from_lines("01. Alpha");
        assert!(matches!(
            title_presence(&[], &catalog).unwrap_err(),
            MergeError::NoDocuments
        ));
        assert!(matches!(
            title_presence(
                &[SourceDocument::new("a", vec![])],
                &TitleCatalog::default()
            )
            .unwrap_err(),
            MergeError::InvalidCriteria(_)
        ));
    }
}

//! Injected catalog of expected section titles.
//!
//! Some callers work against a known index of titles ("01. Plan de
//! formación integral del estudiante", ...), where each entry may carry a
//! leading numeral-and-punctuation marker. The catalog strips markers for
//! matching and re-renders them as a zero-padded display prefix, so
//! `"01. Plan de ..."` is shown (and filed) as `"01 Plan de ..."`.
//!
//! A catalog is always an explicit value passed into the engine; nothing
//! in this workspace bakes a fixed title list into code.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::{collapse_whitespace, normalize};

/// Leading numbering marker: up to three digits followed by `.`, `)` or
/// `-`, e.g. `"01. "`, `"3) "`, `"12 - "`.
static NUMBERING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,3})\s*[-.)]\s*(.*)$").expect("valid marker regex"));

/// Split a leading numbering marker off a title line.
///
/// Returns `(number, rest)`; `number` is `None` when the line carries no
/// marker. The rest is trimmed but otherwise untouched.
#[must_use]
pub fn strip_numbering_marker(text: &str) -> (Option<u32>, &str) {
    if let Some(caps) = NUMBERING_MARKER.captures(text) {
        let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
        if let Some(rest) = caps.get(2) {
            return (number, rest.as_str().trim());
        }
    }
    (None, text.trim())
}

/// One catalog entry: optional source numbering plus the display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Number recovered from the entry's marker, if it had one.
    pub number: Option<u32>,
    /// Display form: `"01 Plan de ..."` when numbered, the bare title
    /// otherwise.
    pub display: String,
    /// Marker-stripped title key used for matching.
    key: String,
}

impl CatalogEntry {
    /// The normalized key this entry matches under.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// An ordered set of expected titles with normalized-key lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleCatalog {
    entries: Vec<CatalogEntry>,
    by_key: HashMap<String, usize>,
}

impl TitleCatalog {
    /// Build a catalog from raw lines, one title per line.
    ///
    /// Blank lines are skipped; leading numbering markers are stripped for
    /// matching and folded into the display form. Later duplicates of the
    /// same title key are ignored (first entry wins).
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        Self::from_titles(text.lines())
    }

    /// Build a catalog from individual title strings.
    #[must_use]
    pub fn from_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::default();
        for raw in titles {
            let (number, title) = strip_numbering_marker(raw.as_ref());
            if title.is_empty() {
                continue;
            }
            let key = normalize(title);
            if catalog.by_key.contains_key(&key) {
                continue;
            }
            let display = match number {
                Some(n) => format!("{n:02} {}", collapse_whitespace(title)),
                None => collapse_whitespace(title),
            };
            catalog.by_key.insert(key.clone(), catalog.entries.len());
            catalog.entries.push(CatalogEntry {
                number,
                display,
                key,
            });
        }
        catalog
    }

    /// Match free paragraph text against the catalog.
    ///
    /// The text has any leading numbering marker stripped and is then
    /// normalized; a hit returns the catalog entry regardless of how the
    /// paragraph was styled.
    #[must_use]
    pub fn match_title(&self, text: &str) -> Option<&CatalogEntry> {
        let (_, bare) = strip_numbering_marker(text);
        if bare.is_empty() {
            return None;
        }
        self.by_key.get(&normalize(bare)).map(|&i| &self.entries[i])
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Display titles in catalog order.
    pub fn display_titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.display.as_str())
    }

    /// Number of entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog has no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

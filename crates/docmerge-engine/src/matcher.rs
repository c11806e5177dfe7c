//! Selection criteria and title filtering.

use std::collections::{BTreeSet, HashSet};

use docmerge_core::{normalize, MergeError, Result, Section};

/// Validated selection criteria for a merge request.
///
/// Construction is the validation point: invalid level sets are rejected
/// here, before any document is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCriteria {
    levels: BTreeSet<u8>,
    allow_list: HashSet<String>,
    /// Strict-enforce flag. Observed behavior: with a non-empty allow
    /// list the result is restricted to listed titles whether this is
    /// true or false (the "soft" mode never grew distinct semantics);
    /// with an empty allow list nothing is filtered either way. The flag
    /// is kept on the interface and reported back as given.
    pub enforce: bool,
}

impl SelectionCriteria {
    /// Build criteria from raw caller input.
    ///
    /// The allow list is normalized to title keys here; empty entries
    /// are dropped so a list of blank strings behaves like no list.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidCriteria`] when the level set is
    /// empty or contains a level outside `1..=9`.
    pub fn new<I>(levels: I, allow_titles: &[String], enforce: bool) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let levels: BTreeSet<u8> = levels.into_iter().collect();
        if levels.is_empty() {
            return Err(MergeError::InvalidCriteria(
                "at least one heading level is required".to_string(),
            ));
        }
        if let Some(bad) = levels.iter().find(|l| !(1..=9).contains(*l)) {
            return Err(MergeError::InvalidCriteria(format!(
                "heading level {bad} out of range 1..=9"
            )));
        }

        let allow_list: HashSet<String> = allow_titles
            .iter()
            .map(|t| normalize(t))
            .filter(|key| !key.is_empty())
            .collect();

        Ok(Self {
            levels,
            allow_list,
            enforce,
        })
    }

    /// Section-opening heading levels.
    #[inline]
    #[must_use]
    pub const fn levels(&self) -> &BTreeSet<u8> {
        &self.levels
    }

    /// True when no allow list is in effect ("take everything").
    #[inline]
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.allow_list.is_empty()
    }

    /// Whether a section title passes the allow list.
    #[must_use]
    pub fn admits(&self, title: &str) -> bool {
        self.allow_list.is_empty() || self.allow_list.contains(&normalize(title))
    }
}

/// Filter sections against the criteria's allow list.
///
/// Order and multiplicity are preserved; a recurring title is NOT
/// deduplicated here (grouping, if any, happens at assembly time).
#[must_use]
pub fn filter_sections(sections: Vec<Section>, criteria: &SelectionCriteria) -> Vec<Section> {
    if criteria.is_unfiltered() {
        return sections;
    }
    sections
        .into_iter()
        .filter(|section| criteria.admits(&section.title))
        .collect()
}

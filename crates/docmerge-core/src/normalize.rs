//! Locale-independent text normalization.
//!
//! Two normal forms are used throughout the engine:
//!
//! - [`normalize`] produces the **title key**: the canonical identity used
//!   for allow-list matching, grouping, and deduplication. Accents, case,
//!   and whitespace runs are all folded away.
//! - [`collapse_whitespace`] is the lighter cleanup applied to display
//!   text and table cells before they are written to output: whitespace
//!   folding only, case and accents preserved.
//!
//! Both are pure functions over Unicode tables, with no locale or platform
//! dependency, and both are idempotent.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compute the title key for a piece of text.
///
/// Applies Unicode canonical decomposition (NFD), strips combining marks,
/// lowercases, collapses every whitespace run to a single space, and trims.
/// Total over all strings; the empty string maps to itself, and absent
/// text (`Option::None` at call sites) maps to the empty key.
///
/// # Examples
///
/// ```
/// use docmerge_core::normalize;
///
/// assert_eq!(normalize("Plan de Formación"), "plan de formacion");
/// assert_eq!(normalize("  PLAN   DE FORMACION "), "plan de formacion");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    collapse_whitespace(&folded)
}

/// Collapse whitespace runs to single spaces and trim the ends.
///
/// Case and accents are preserved. This is the cleanup applied to heading
/// display text and to table cells before export.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("Formación"), "formacion");
        assert_eq!(normalize("Überschrift"), "uberschrift");
        assert_eq!(normalize("évaluation"), "evaluation");
    }

    #[test]
    fn test_normalize_case_folds() {
        assert_eq!(normalize("PLAN DE FORMACION"), "plan de formacion");
        assert_eq!(normalize("Plan De Formacion"), "plan de formacion");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  plan \t de\n formación "), "plan de formacion");
    }

    #[test]
    fn test_normalize_equivalence() {
        // The three spellings the matcher must treat as the same title.
        let a = normalize("Plan de Formación");
        let b = normalize("PLAN DE FORMACION");
        let c = normalize("  plan   de formación ");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in [
            "",
            "Plan de Formación",
            "  A\tB  C ",
            "ÀÉÎÕÜ ñ ç",
            "already normalized",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_normalize_total_on_empty_and_whitespace() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n  "), "");
    }

    #[test]
    fn test_collapse_whitespace_preserves_case_and_accents() {
        assert_eq!(collapse_whitespace("  Plan  de\tFormación "), "Plan de Formación");
    }

    #[test]
    fn test_collapse_whitespace_idempotent() {
        let once = collapse_whitespace("a \u{a0}b"); // NBSP is whitespace per char::is_whitespace
        assert_eq!(collapse_whitespace(&once), once);
    }
}

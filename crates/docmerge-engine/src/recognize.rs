//! Title recognition strategies.
//!
//! Two independent ways a paragraph can be recognized as a section title,
//! kept as swappable implementations of one capability rather than merged
//! into a single heuristic:
//!
//! - [`StyleRecognizer`]: style-driven; the paragraph's style name
//!   classifies as a heading (see [`crate::classify`]).
//! - [`CatalogRecognizer`]: index-driven; the paragraph's text, after
//!   stripping a leading numbering marker and normalizing, equals an
//!   entry of an injected [`TitleCatalog`], regardless of style.

use docmerge_core::{collapse_whitespace, Paragraph, TitleCatalog};

use crate::classify::{classify_paragraph, StyleTag};

/// A paragraph recognized as a section-opening title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedHeading {
    /// Nesting level, `1..=9`.
    pub level: u8,
    /// Display title the section will carry.
    pub title: String,
}

/// Capability to decide whether a paragraph opens a section.
pub trait TitleRecognizer {
    /// Recognize a paragraph as a title, or `None` for ordinary content.
    fn recognize(&self, paragraph: &Paragraph) -> Option<RecognizedHeading>;
}

/// Style-driven recognition: headings are exactly the paragraphs whose
/// style name classifies as [`StyleTag::Heading`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleRecognizer;

impl TitleRecognizer for StyleRecognizer {
    fn recognize(&self, paragraph: &Paragraph) -> Option<RecognizedHeading> {
        match classify_paragraph(paragraph) {
            StyleTag::Heading { level } => Some(RecognizedHeading {
                level,
                title: collapse_whitespace(&paragraph.text),
            }),
            StyleTag::Unrecognized | StyleTag::HeadingChar => None,
        }
    }
}

/// Index-driven recognition against an injected catalog.
///
/// The catalog is flat, so every recognized title sits at level 1; the
/// recognized display form is the catalog's (numbering marker folded into
/// a zero-padded prefix), not the paragraph's own spelling.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRecognizer<'a> {
    catalog: &'a TitleCatalog,
}

impl<'a> CatalogRecognizer<'a> {
    /// Recognize against the given catalog.
    #[must_use]
    pub const fn new(catalog: &'a TitleCatalog) -> Self {
        Self { catalog }
    }
}

impl TitleRecognizer for CatalogRecognizer<'_> {
    fn recognize(&self, paragraph: &Paragraph) -> Option<RecognizedHeading> {
        self.catalog
            .match_title(&paragraph.text)
            .map(|entry| RecognizedHeading {
                level: 1,
                title: entry.display.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_recognizer_uses_style_only() {
        let recognizer = StyleRecognizer;

        let heading = Paragraph::with_style("  Plan de   mejora ", "Heading 2");
        let hit = recognizer.recognize(&heading).unwrap();
        assert_eq!(hit.level, 2);
        assert_eq!(hit.title, "Plan de mejora");

        let body = Paragraph::new("Plan de mejora");
        assert!(recognizer.recognize(&body).is_none());

        let char_variant = Paragraph::with_style("Plan", "Heading 2 Char");
        assert!(recognizer.recognize(&char_variant).is_none());
    }

    #[test]
    fn test_catalog_recognizer_ignores_style() {
        let catalog = TitleCatalog::from_lines("01. Plan de formación integral");
        let recognizer = CatalogRecognizer::new(&catalog);

        // Unstyled paragraph whose text matches (different marker, case).
        let p = Paragraph::new("1) PLAN DE FORMACION INTEGRAL");
        let hit = recognizer.recognize(&p).unwrap();
        assert_eq!(hit.level, 1);
        assert_eq!(hit.title, "01 Plan de formación integral");

        // A styled heading whose text is not in the catalog is ignored.
        let styled = Paragraph::with_style("Otro apartado", "Heading 1");
        assert!(recognizer.recognize(&styled).is_none());
    }

    #[test]
    fn test_catalog_recognizer_empty_catalog() {
        let catalog = TitleCatalog::default();
        let recognizer = CatalogRecognizer::new(&catalog);
        assert!(recognizer.recognize(&Paragraph::new("anything")).is_none());
    }
}

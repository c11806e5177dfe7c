//! Heading classification from paragraph style names.
//!
//! Heading-ness is a deterministic function of the style NAME alone: the
//! name is parsed once into a [`StyleTag`] and every caller dispatches on
//! the tag. No heading is ever inferred from text content or indentation.

use once_cell::sync::Lazy;
use regex::Regex;

use docmerge_core::Paragraph;

/// Heading-family style names: a language variant of the word "heading"
/// followed by a small integer ("Heading 1", "Título 2", "Encabezado3",
/// "Titre 2", "Überschrift 1", ...).
static HEADING_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:heading|t[íi]tulo|encabezado|titre|überschrift)\s*(\d{1,2})\b")
        .expect("valid heading style pattern")
});

/// What a paragraph style name says about the paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    /// Not a heading-family style.
    Unrecognized,
    /// Body-level heading style at a level in `1..=9`.
    Heading {
        /// Nesting level of the heading.
        level: u8,
    },
    /// Character variant of a heading style ("Heading 1 Char"): used for
    /// in-line run formatting, NOT block structure. Never a heading.
    HeadingChar,
}

impl StyleTag {
    /// The heading level, when the tag is a structural heading.
    #[inline]
    #[must_use]
    pub const fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading { level } => Some(level),
            Self::Unrecognized | Self::HeadingChar => None,
        }
    }
}

/// Parse a style name into its [`StyleTag`].
#[must_use]
pub fn classify_style(style_name: &str) -> StyleTag {
    let Some(caps) = HEADING_STYLE.captures(style_name) else {
        return StyleTag::Unrecognized;
    };
    // "Heading 1 Char" and friends match the base pattern but mark run
    // formatting; reject them before reading the level.
    if style_name.to_lowercase().contains("char") {
        return StyleTag::HeadingChar;
    }
    match caps.get(1).and_then(|m| m.as_str().parse::<u8>().ok()) {
        Some(level) if (1..=9).contains(&level) => StyleTag::Heading { level },
        _ => StyleTag::Unrecognized,
    }
}

/// Classify a paragraph; a paragraph without a style name is never a
/// heading.
#[must_use]
pub fn classify_paragraph(paragraph: &Paragraph) -> StyleTag {
    paragraph
        .style_name
        .as_deref()
        .map_or(StyleTag::Unrecognized, classify_style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_english_headings() {
        assert_eq!(classify_style("Heading 1"), StyleTag::Heading { level: 1 });
        assert_eq!(classify_style("heading 4"), StyleTag::Heading { level: 4 });
        assert_eq!(classify_style("Heading9"), StyleTag::Heading { level: 9 });
    }

    #[test]
    fn test_classify_language_variants() {
        assert_eq!(classify_style("Título 2"), StyleTag::Heading { level: 2 });
        assert_eq!(classify_style("Titulo 3"), StyleTag::Heading { level: 3 });
        assert_eq!(classify_style("Encabezado 1"), StyleTag::Heading { level: 1 });
        assert_eq!(classify_style("Titre 2"), StyleTag::Heading { level: 2 });
        assert_eq!(classify_style("Überschrift 1"), StyleTag::Heading { level: 1 });
    }

    #[test]
    fn test_classify_rejects_char_variants() {
        assert_eq!(classify_style("Heading 1 Char"), StyleTag::HeadingChar);
        assert_eq!(classify_style("heading 2 char"), StyleTag::HeadingChar);
        assert_eq!(classify_style("Heading 1 Char").heading_level(), None);
    }

    #[test]
    fn test_classify_rejects_out_of_range_levels() {
        assert_eq!(classify_style("Heading 0"), StyleTag::Unrecognized);
        assert_eq!(classify_style("Heading 10"), StyleTag::Unrecognized);
        assert_eq!(classify_style("Heading 99"), StyleTag::Unrecognized);
    }

    #[test]
    fn test_classify_rejects_non_headings() {
        assert_eq!(classify_style("Normal"), StyleTag::Unrecognized);
        assert_eq!(classify_style("Title"), StyleTag::Unrecognized);
        assert_eq!(classify_style("List Paragraph"), StyleTag::Unrecognized);
        assert_eq!(classify_style("Heading"), StyleTag::Unrecognized);
        assert_eq!(classify_style(""), StyleTag::Unrecognized);
    }

    #[test]
    fn test_classify_paragraph_without_style() {
        let p = Paragraph::new("1. Introduction");
        // Text that looks like a heading is NOT a heading without the style.
        assert_eq!(classify_paragraph(&p), StyleTag::Unrecognized);

        let styled = Paragraph::with_style("Intro", "heading 1");
        assert_eq!(classify_paragraph(&styled), StyleTag::Heading { level: 1 });
    }
}

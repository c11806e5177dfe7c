//! Section segmentation.
//!
//! Partitions a document's block stream into heading-delimited sections:
//! a heading at a section-opening level starts a section; the section
//! runs until the next heading at the same or a higher (shallower) level.
//! Content preceding the first recognized heading is out of scope and
//! discarded.

use std::collections::BTreeSet;

use docmerge_core::{Block, HeadingRef, Section};

use crate::recognize::{StyleRecognizer, TitleRecognizer};

/// What to do with a heading DEEPER than the open section's level when
/// its own level is not in the section-opening set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeeperHeadingPolicy {
    /// Swallow the deeper span into the open section: the deeper
    /// heading's own paragraph is dropped and the content under it keeps
    /// accumulating into the parent. This reproduces the legacy
    /// behavior and is the default.
    #[default]
    Absorb,
    /// Treat the deeper heading as a pure separator that closes the open
    /// section; content after it is discarded until the next
    /// section-opening heading.
    CloseSection,
}

/// Segmentation tuning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentOptions {
    /// Handling of deeper, non-opening sub-headings.
    pub deeper_headings: DeeperHeadingPolicy,
}

/// Partition `blocks` into sections opened at the given levels.
///
/// Guarantees: sections come back in encounter order; heading paragraphs
/// (opening or nested) never appear as content; every content block is a
/// clone of exactly one input block.
#[must_use]
pub fn segment(
    blocks: &[Block],
    levels: &BTreeSet<u8>,
    recognizer: &dyn TitleRecognizer,
    options: &SegmentOptions,
) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current: Option<Section> = None;

    for block in blocks {
        match block {
            Block::Paragraph(paragraph) => {
                if let Some(heading) = recognizer.recognize(paragraph) {
                    if levels.contains(&heading.level) {
                        // Section-opening heading: close and start fresh.
                        if let Some(done) = current.take() {
                            sections.push(done);
                        }
                        current = Some(Section::new(heading.level, heading.title));
                    } else if let Some(open_level) = current.as_ref().map(|s| s.level) {
                        let closes = heading.level <= open_level
                            || options.deeper_headings == DeeperHeadingPolicy::CloseSection;
                        if closes {
                            if let Some(done) = current.take() {
                                sections.push(done);
                            }
                        }
                        // Absorb: a deeper heading is neither content nor
                        // a boundary; the span under it stays in the
                        // parent section.
                    }
                    // A heading paragraph is never content.
                } else if let Some(open) = current.as_mut() {
                    open.blocks.push(block.clone());
                }
            }
            Block::Table(_) => {
                if let Some(open) = current.as_mut() {
                    open.blocks.push(block.clone());
                }
            }
        }
    }

    if let Some(open) = current {
        sections.push(open);
    }
    sections
}

/// Collect the style-driven heading overview of a block stream, in order.
#[must_use]
pub fn heading_overview(blocks: &[Block]) -> Vec<HeadingRef> {
    let recognizer = StyleRecognizer;
    blocks
        .iter()
        .filter_map(Block::as_paragraph)
        .filter_map(|p| recognizer.recognize(p))
        .map(|h| HeadingRef {
            level: h.level,
            text: h.title,
        })
        .collect()
}

//! # docmerge-core
//!
//! Leaf types for the docmerge workspace: the block-level document model,
//! locale-independent text normalization, the injected title catalog, and
//! the shared error type.
//!
//! Everything here is pure data and pure functions; reading and writing
//! actual document packages lives in `docmerge-backend`, and the
//! segmentation/merge logic lives in `docmerge-engine`.

pub mod block;
pub mod catalog;
pub mod error;
pub mod normalize;

pub use block::{Block, HeadingRef, Paragraph, Section, SourceDocument, TableBlock};
pub use catalog::{strip_numbering_marker, CatalogEntry, TitleCatalog};
pub use error::{MergeError, Result};
pub use normalize::{collapse_whitespace, normalize};

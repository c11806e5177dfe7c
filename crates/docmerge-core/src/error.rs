//! Error types for merge operations.

use thiserror::Error;

/// Error types that can occur while segmenting and merging documents.
///
/// Per-document parse failures are deliberately NOT represented here as a
/// whole-request failure: a merge over many inputs skips unreadable
/// documents and records them in the output (`MergeOutput::skipped`).
/// Only whole-request conditions (invalid criteria, no inputs at all) and
/// failures while producing output packages surface as `MergeError`.
#[derive(Error, Debug)]
pub enum MergeError {
    /// Selection criteria were rejected before any document was read,
    /// e.g. a heading level outside `1..=9` or an empty level set.
    #[error("Invalid selection criteria: {0}")]
    InvalidCriteria(String),

    /// The request carried no input documents at all.
    #[error("No input documents supplied")]
    NoDocuments,

    /// A document package could not be read or an output package could
    /// not be produced (bad ZIP container, malformed XML part, ...).
    #[error("Backend error: {0}")]
    Backend(String),

    /// File I/O error (only reachable through the surrounding I/O layer;
    /// the engine itself works on in-memory bytes).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for [`Result<T, MergeError>`].
pub type Result<T> = std::result::Result<T, MergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_criteria_display() {
        let error = MergeError::InvalidCriteria("level 0 out of range".to_string());
        assert_eq!(
            format!("{error}"),
            "Invalid selection criteria: level 0 out of range"
        );
    }

    #[test]
    fn test_backend_error_display() {
        let error = MergeError::Backend("missing word/document.xml".to_string());
        let display = format!("{error}");
        assert!(display.contains("Backend error"));
        assert!(display.contains("word/document.xml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MergeError = io_err.into();
        match err {
            MergeError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected Io variant"),
        }
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn inner() -> Result<()> {
            Err(MergeError::NoDocuments)
        }

        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }

        match outer() {
            Err(MergeError::NoDocuments) => {}
            _ => panic!("Expected NoDocuments to propagate"),
        }
    }
}

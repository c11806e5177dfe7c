//! Shared OPC package pieces for the DOCX and XLSX writers.
//!
//! Both output formats are ZIP archives of XML parts; the bits that are
//! identical across them (relationship part names, core properties) live
//! here so the two writers stay symmetric.

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use docmerge_core::{MergeError, Result};

/// Application name stamped into generated packages.
pub const GENERATOR_NAME: &str = "docmerge";

/// Relationship type for the core-properties part.
pub const REL_TYPE_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

/// Relationship type for the main office document part.
pub const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Build the `docProps/core.xml` part with creator and UTC timestamps.
///
/// The field set matches what real packages carry (`dc:creator`,
/// `dcterms:created`, `dcterms:modified` in W3CDTF form).
#[must_use]
pub fn core_properties_xml() -> String {
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
            "<cp:coreProperties",
            " xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\"",
            " xmlns:dc=\"http://purl.org/dc/elements/1.1/\"",
            " xmlns:dcterms=\"http://purl.org/dc/terms/\"",
            " xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:creator>{creator}</dc:creator>",
            "<dcterms:created xsi:type=\"dcterms:W3CDTF\">{stamp}</dcterms:created>",
            "<dcterms:modified xsi:type=\"dcterms:W3CDTF\">{stamp}</dcterms:modified>",
            "</cp:coreProperties>",
        ),
        creator = GENERATOR_NAME,
        stamp = stamp,
    )
}

/// In-memory ZIP package under construction.
///
/// Thin wrapper so the writers share one error mapping and one set of
/// file options (deflate, no per-part tuning).
pub struct PackageBuilder {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageBuilder {
    /// Start an empty package.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add one part to the package.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Backend`] when the archive rejects the entry.
    pub fn add_part(&mut self, name: &str, content: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip
            .start_file(name, options)
            .map_err(|e| MergeError::Backend(format!("Failed to start package part {name}: {e}")))?;
        self.zip.write_all(content)?;
        Ok(())
    }

    /// Finish the archive and return the package bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::Backend`] when the archive cannot be closed.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self
            .zip
            .finish()
            .map_err(|e| MergeError::Backend(format!("Failed to finish package: {e}")))?;
        Ok(cursor.into_inner())
    }
}

impl Default for PackageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_core_properties_fields() {
        let xml = core_properties_xml();
        assert!(xml.contains("<dc:creator>docmerge</dc:creator>"));
        assert!(xml.contains("dcterms:created"));
        assert!(xml.contains("dcterms:modified"));
        assert!(xml.contains("W3CDTF"));
    }

    #[test]
    fn test_package_builder_roundtrip() {
        let mut builder = PackageBuilder::new();
        builder.add_part("a/b.xml", b"<x/>").unwrap();
        builder.add_part("c.txt", b"hello").unwrap();
        let bytes = builder.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut content = String::new();
        archive
            .by_name("a/b.xml")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<x/>");
    }
}

//! DOCX Preprocessor
//!
//! Opens a WordprocessingML package and decodes it into a [`Document`]
//! in two stages:
//! 1. Package extraction: DOCX bytes → `word/document.xml` + `word/styles.xml`
//! 2. Markup parsing: XML parts → `Document` with resolved formatting

pub mod styles;
pub mod writer;
pub mod xml_parser;

use crate::document::{Document, StyleSheet};
use crate::error::DocxError;
use crate::preprocessors::preprocessor::Preprocessor;
use crate::types::MarkupParts;
use anyhow::Result;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

pub use writer::write_docx;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";

fn read_part(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, DocxError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|source| DocxError::Io {
            part: name.to_string(),
            source,
        })?;
    Ok(Some(content))
}

/// Pull the XML parts the checker reads out of a DOCX package.
pub fn extract_parts(bytes: &[u8]) -> Result<MarkupParts, DocxError> {
    if bytes.is_empty() {
        return Err(DocxError::Empty);
    }
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
    let styles_xml = read_part(&mut archive, STYLES_PART)?;
    Ok(MarkupParts {
        document_xml,
        styles_xml,
    })
}

/// Parse extracted parts and resolve style inheritance.
pub fn parse_parts(parts: &MarkupParts) -> Result<Document, DocxError> {
    let mut document = xml_parser::parse_document_xml(&parts.document_xml)
        .map_err(|e| DocxError::xml(DOCUMENT_PART, e))?;
    document.styles = match &parts.styles_xml {
        Some(xml) => styles::parse_styles_xml(xml).map_err(|e| DocxError::xml(STYLES_PART, e))?,
        None => StyleSheet::default(),
    };
    document.styles.clone().apply_to(&mut document);

    debug!(
        paragraphs = document.paragraphs.len(),
        runs = document.run_count(),
        styles = document.styles.styles.len(),
        "decoded DOCX"
    );
    Ok(document)
}

/// Decode DOCX bytes straight into a [`Document`].
pub fn decode_docx(bytes: &[u8]) -> Result<Document, DocxError> {
    parse_parts(&extract_parts(bytes)?)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxPreprocessor;

impl DocxPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for DocxPreprocessor {
    fn extract_markup(&self, bytes: &[u8]) -> Result<MarkupParts> {
        Ok(extract_parts(bytes)?)
    }

    fn parse_markup(&self, parts: &MarkupParts) -> Result<Document> {
        Ok(parse_parts(parts)?)
    }

    fn name(&self) -> &str {
        "DocxPreprocessor"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("docx"))
    }
}

// Preprocessor abstraction for document decoding
//
// This module defines the boundary between document decoding (DOCX bytes -> Document)
// and checking (Document -> ScanReport). Everything after this point works with the
// decoded Document and never touches the package format.

use crate::document::Document;
use crate::types::MarkupParts;
use anyhow::Result;
use std::path::Path;

/// Preprocessor trait - converts uploaded documents into a [`Document`]
///
/// The preprocessing happens in two clear steps:
/// 1. Document -> Markup (e.g., DOCX package -> WordprocessingML parts)
/// 2. Markup -> Document (paragraphs, runs, resolved formatting)
pub trait Preprocessor {
    /// Step 1: Pull the markup parts out of the raw document bytes
    fn extract_markup(&self, bytes: &[u8]) -> Result<MarkupParts>;

    /// Step 2: Parse markup parts into the document model
    fn parse_markup(&self, parts: &MarkupParts) -> Result<Document>;

    /// Full document processing (combines both steps)
    fn process(&self, bytes: &[u8]) -> Result<Document> {
        let parts = self.extract_markup(bytes)?;
        self.parse_markup(&parts)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor supports the given file type
    fn supports_file_type(&self, path: &Path) -> bool;
}

//! Document Preprocessors
//!
//! Converts uploaded documents into the [`Document`](crate::document::Document)
//! model the checker works on.
//!
//! ## Architecture
//!
//! ```text
//! Document bytes (DOCX)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! MarkupParts (document.xml, styles.xml)
//!     ↓
//! Document (paragraphs, runs, resolved formatting)
//! ```

pub mod docx;
pub mod preprocessor;

pub use docx::{decode_docx, write_docx, DocxPreprocessor};
pub use preprocessor::Preprocessor;

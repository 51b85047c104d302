//! Error types for DOCX decoding and attribute reads.
//!
//! Decoding errors abort a whole document. Attribute errors are scoped to a
//! single run property and are turned into a failed verdict by the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Not a readable DOCX package: {0}")]
    Package(#[from] zip::result::ZipError),

    #[error("DOCX package is missing required part '{0}'")]
    MissingPart(String),

    #[error("Failed to read part '{part}': {source}")]
    Io {
        part: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XML in '{part}': {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },
}

impl DocxError {
    pub fn xml(part: &str, source: impl Into<quick_xml::Error>) -> Self {
        Self::Xml {
            part: part.to_string(),
            source: source.into(),
        }
    }
}

/// A run or paragraph property that is present but cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("invalid font size value '{0}' (expected half-points)")]
    InvalidSize(String),

    #[error("invalid font color value '{0}' (expected RRGGBB or auto)")]
    InvalidColor(String),
}

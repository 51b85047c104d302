// Formatcheck Core Library
//
// Checks Word documents against a formatting checklist: locate each phrase,
// judge the formatting of its first occurrence, and score the result.
// The DOCX decoder sits behind a pluggable preprocessor.

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod locator;
pub mod practice;
pub mod preprocessors;
pub mod processor;
pub mod rules;
pub mod storage;
pub mod types;

// Re-export main types and functions for easy use
pub use config::CheckerConfig;
pub use document::Document;
pub use error::{AttributeError, DocxError};
pub use locator::TextLocator;
pub use preprocessors::{decode_docx, write_docx, DocxPreprocessor, Preprocessor};
pub use processor::{scan, DocumentProcessor, StepProfiler};
pub use rules::{is_in_range, ColorTarget, DebugConfig, RuleEngine};
pub use types::*;

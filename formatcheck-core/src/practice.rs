//! Practice document generation
//!
//! Builds the worksheet students format by hand: a title, the
//! instructions, every checklist phrase as its own unformatted paragraph,
//! and a short formatting guide.

use crate::config::CheckerConfig;
use crate::document::{Document, PageMargins, Paragraph, Run, RunProperties, SectionProperties};
use crate::preprocessors::write_docx;
use crate::storage::DocumentStorage;
use anyhow::Result;
use tracing::info;

/// US Letter with one-inch margins, in twips.
fn letter_section() -> SectionProperties {
    SectionProperties {
        page_width: Some(12240),
        page_height: Some(15840),
        margins: Some(PageMargins {
            top: 1440,
            right: 1440,
            bottom: 1440,
            left: 1440,
        }),
    }
}

fn text_paragraph(text: &str) -> Paragraph {
    if text.is_empty() {
        Paragraph::new(Vec::new())
    } else {
        Paragraph::new(vec![Run::new(text)])
    }
}

pub fn build_practice_document(config: &CheckerConfig) -> Document {
    let practice = &config.practice;
    let mut paragraphs = vec![
        Paragraph::new(vec![Run::with_properties(
            practice.title.as_str(),
            RunProperties {
                bold: Some(true),
                ..Default::default()
            }
            .with_size_pt(16.0),
        )]),
        text_paragraph(""),
        text_paragraph(&practice.instructions),
        text_paragraph(""),
    ];

    // Phrases start explicitly unformatted
    let plain = RunProperties {
        bold: Some(false),
        italic: Some(false),
        ..Default::default()
    };
    paragraphs.extend(config.requirements.iter().map(|requirement| {
        Paragraph::new(vec![Run::with_properties(
            requirement.search_phrase.as_str(),
            plain.clone(),
        )])
    }));

    if !practice.guide.is_empty() {
        paragraphs.push(text_paragraph(""));
        paragraphs.push(text_paragraph("Formatting Guide:"));
        paragraphs.extend(practice.guide.iter().map(|line| text_paragraph(line)));
    }

    let mut document = Document::new(paragraphs);
    document.sections.push(letter_section());
    document
}

/// The practice document as DOCX bytes.
pub fn write_practice_file(config: &CheckerConfig) -> Result<Vec<u8>> {
    write_docx(&build_practice_document(config))
}

/// Store the practice document and return where it can be downloaded from.
pub fn publish_practice_file(
    config: &CheckerConfig,
    storage: &dyn DocumentStorage,
) -> Result<Option<String>> {
    let bytes = write_practice_file(config)?;
    storage.store_blob(&config.practice.file_name, &bytes)?;
    let location = storage.blob_location(&config.practice.file_name);
    info!(
        "Published {} ({} bytes, {} requirements)",
        config.practice.file_name,
        bytes.len(),
        config.requirements.len()
    );
    Ok(location)
}

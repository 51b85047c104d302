//! Text locator
//!
//! Finds the runs that carry a searched phrase. Matching is
//! case-insensitive. The paragraph text decides whether a paragraph is a
//! candidate, but matches are recorded per run: a phrase split across two
//! runs (e.g. "Bold" + "1") passes the paragraph test and still yields no
//! run match. That keeps the first match usable for run-level formatting
//! checks.
//!
//! When the phrase contains whitespace a second pass compares with all
//! whitespace removed, so "Align Right" also finds "AlignRight". Runs found
//! by both passes are reported twice; callers only look at the first match.

use crate::config::LocatorConfig;
use crate::document::Document;
use crate::types::RunMatch;

#[derive(Debug, Clone)]
pub struct TextLocator {
    whitespace_fallback: bool,
    include_table_paragraphs: bool,
}

impl Default for TextLocator {
    fn default() -> Self {
        Self::new(&LocatorConfig::default())
    }
}

impl TextLocator {
    pub fn new(config: &LocatorConfig) -> Self {
        Self {
            whitespace_fallback: config.whitespace_fallback,
            include_table_paragraphs: config.include_table_paragraphs,
        }
    }

    /// Every run matching `phrase`, in document order. Empty when absent.
    pub fn locate<'a>(&self, document: &'a Document, phrase: &str) -> Vec<RunMatch<'a>> {
        let mut matches = Vec::new();
        if phrase.trim().is_empty() {
            return matches;
        }

        let phrase_lower = phrase.to_lowercase();
        let compact_phrase = if self.whitespace_fallback && phrase.trim().contains(char::is_whitespace) {
            Some(strip_whitespace(&phrase_lower))
        } else {
            None
        };

        for (paragraph_index, paragraph) in document.paragraphs.iter().enumerate() {
            if paragraph.in_table && !self.include_table_paragraphs {
                continue;
            }
            let paragraph_text = paragraph.text().to_lowercase();

            if paragraph_text.contains(&phrase_lower) {
                for (run_index, run) in paragraph.runs.iter().enumerate() {
                    if run.text.to_lowercase().contains(&phrase_lower) {
                        matches.push(RunMatch {
                            paragraph_index,
                            run_index,
                            matched_text: &run.text,
                            paragraph,
                            run,
                        });
                    }
                }
            }

            if let Some(compact) = &compact_phrase {
                if strip_whitespace(&paragraph_text).contains(compact.as_str()) {
                    for (run_index, run) in paragraph.runs.iter().enumerate() {
                        if strip_whitespace(&run.text.to_lowercase()).contains(compact.as_str()) {
                            matches.push(RunMatch {
                                paragraph_index,
                                run_index,
                                matched_text: &run.text,
                                paragraph,
                                run,
                            });
                        }
                    }
                }
            }
        }

        matches
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Paragraph, Run};

    fn doc(paragraphs: &[&[&str]]) -> Document {
        Document::new(
            paragraphs
                .iter()
                .map(|runs| Paragraph::new(runs.iter().map(|text| Run::new(*text)).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_case_insensitive_match() {
        let document = doc(&[&["Intro"], &["BOLD1"]]);
        let matches = TextLocator::default().locate(&document, "Bold1");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].paragraph_index, 1);
        assert_eq!(matches[0].run_index, 0);
        assert_eq!(matches[0].matched_text, "BOLD1");
    }

    #[test]
    fn test_whitespace_insensitive_fallback() {
        let document = doc(&[&["AlignRight"]]);
        let matches = TextLocator::default().locate(&document, "Align Right");
        assert_eq!(matches.len(), 1);

        let strict = TextLocator::new(&LocatorConfig {
            whitespace_fallback: false,
            ..Default::default()
        });
        assert!(strict.locate(&document, "Align Right").is_empty());
    }

    #[test]
    fn test_fallback_duplicates_are_kept() {
        let document = doc(&[&["Align Right"]]);
        let matches = TextLocator::default().locate(&document, "Align Right");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].run_index, matches[1].run_index);
    }

    #[test]
    fn test_phrase_split_across_runs_has_no_run_match() {
        let document = doc(&[&["Bold", "1"]]);
        assert!(TextLocator::default().locate(&document, "Bold1").is_empty());
    }

    #[test]
    fn test_every_matching_run_is_reported() {
        let document = doc(&[&["Impact", " and ", "impact"], &["Impact again"]]);
        let matches = TextLocator::default().locate(&document, "impact");
        let positions: Vec<_> = matches
            .iter()
            .map(|m| (m.paragraph_index, m.run_index))
            .collect();
        assert_eq!(positions, vec![(0, 0), (0, 2), (1, 0)]);
    }

    #[test]
    fn test_not_found_and_empty_inputs() {
        let locator = TextLocator::default();
        assert!(locator.locate(&Document::default(), "Bold1").is_empty());
        assert!(locator.locate(&doc(&[&["Italic1"]]), "Bold1").is_empty());
        assert!(locator.locate(&doc(&[&["Italic1"]]), "  ").is_empty());
    }

    #[test]
    fn test_table_paragraphs_can_be_excluded() {
        let mut document = doc(&[&["Tahoma"]]);
        document.paragraphs[0].in_table = true;

        assert_eq!(TextLocator::default().locate(&document, "Tahoma").len(), 1);
        let body_only = TextLocator::new(&LocatorConfig {
            include_table_paragraphs: false,
            ..Default::default()
        });
        assert!(body_only.locate(&document, "Tahoma").is_empty());
    }
}

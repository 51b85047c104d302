//! End-to-end checks: document model → DOCX bytes → decode → scan.
//!
//! Every document here is built in memory and packaged with the DOCX
//! writer, so the tests exercise the real decoder (zip + XML + style
//! resolution) without binary fixtures on disk.

use formatcheck_core::config::CheckerConfig;
use formatcheck_core::document::{
    Alignment, Document, HighlightColor, Paragraph, Run, RunProperties, Style, StyleKind,
    UnderlineStyle, VerticalAlign,
};
use formatcheck_core::practice::{build_practice_document, write_practice_file};
use formatcheck_core::storage::{FileStorage, NoOpStorage};
use formatcheck_core::{
    decode_docx, scan, write_docx, CheckKind, DocumentProcessor, DocxPreprocessor,
    FormattingRequirement, RuleEngine, ScanReport, ScanResponse, TextLocator,
};

// ============================================================================
// Helpers
// ============================================================================

fn props() -> RunProperties {
    RunProperties::default()
}

/// A paragraph carrying `phrase` formatted the way `check` asks for.
fn formatted_paragraph(phrase: &str, check: &CheckKind) -> Paragraph {
    let mut run = props();
    let mut alignment = None;
    match check {
        CheckKind::Bold => run.bold = Some(true),
        CheckKind::Italic => run.italic = Some(true),
        CheckKind::Underline => run.underline = Some(UnderlineStyle::Single),
        CheckKind::UnderlineDouble => run.underline = Some(UnderlineStyle::Double),
        CheckKind::UnderlineDotted => run.underline = Some(UnderlineStyle::Dotted),
        CheckKind::UnderlineColored(_) => {
            run.underline = Some(UnderlineStyle::Single);
            run.underline_color = Some("FF0000".to_string());
        }
        CheckKind::Superscript => run.vertical_align = Some(VerticalAlign::Superscript),
        CheckKind::Subscript => run.vertical_align = Some(VerticalAlign::Subscript),
        CheckKind::Strikethrough => run.strike = Some(true),
        CheckKind::StrikethroughDouble => run.double_strike = Some(true),
        CheckKind::SmallCaps => run.small_caps = Some(true),
        CheckKind::FontSize(points) => run = run.with_size_pt(*points as f32),
        CheckKind::FontFamily(keyword) => {
            let font = match keyword.as_str() {
                "bookman" => "Bookman Old Style",
                "comic" => "Comic Sans MS",
                "arial" => "Arial",
                "impact" => "Impact",
                "tahoma" => "Tahoma",
                "verdana" => "Verdana",
                other => other,
            };
            run.font_name = Some(font.to_string());
        }
        CheckKind::FontColor(target) => {
            let hex = match target.name() {
                "green" => "00B050",
                "darkblue" => "002060",
                "red" => "FF0000",
                "blue" => "0070C0",
                _ => "00FFFF",
            };
            run.color = Some(hex.to_string());
        }
        CheckKind::Highlight(_) => run.highlight = Some(HighlightColor::Cyan),
        CheckKind::Alignment(target) => alignment = Some(*target),
        CheckKind::SpacingExpanded(_)
        | CheckKind::SpacingCondensed(_)
        | CheckKind::Unrecognized(_) => {}
    }
    let paragraph = Paragraph::new(vec![Run::with_properties(phrase, run)]);
    match alignment {
        Some(target) => paragraph.with_alignment(target),
        None => paragraph,
    }
}

/// The default checklist with every phrase formatted correctly.
fn answer_key(config: &CheckerConfig) -> Document {
    Document::new(
        config
            .requirements
            .iter()
            .map(|r| formatted_paragraph(&r.search_phrase, &r.check))
            .collect(),
    )
}

fn roundtrip(document: &Document) -> Document {
    let bytes = write_docx(document).expect("write docx");
    decode_docx(&bytes).expect("decode docx")
}

fn scan_default(document: &Document, config: &CheckerConfig) -> ScanReport {
    scan(
        document,
        &config.requirements,
        &TextLocator::new(&config.locator),
        &RuleEngine::new(),
    )
}

fn processor_without_cache() -> DocumentProcessor {
    DocumentProcessor::new_with_dependencies(
        Box::new(DocxPreprocessor::new()),
        Box::new(NoOpStorage::new()),
    )
}

// ============================================================================
// Full checklist
// ============================================================================

mod full_checklist {
    use super::*;

    #[test]
    fn answer_key_passes_every_supported_check() {
        let config = CheckerConfig::default();
        let report = scan_default(&roundtrip(&answer_key(&config)), &config);

        assert_eq!(report.total_requirements, 30);
        assert_eq!(report.found_count, 30);
        assert_eq!(report.format_results.len(), 30);

        let failing: Vec<&str> = report
            .format_results
            .iter()
            .filter(|r| !r.correct)
            .map(|r| r.format_check.as_str())
            .collect();
        assert_eq!(
            failing,
            vec![
                "underlineRed",
                "spacingExpanded5",
                "spacingExpanded10",
                "spacingCondensed2"
            ]
        );
        assert_eq!(report.format_correct_count, 26);

        let expected = (100.0 + 100.0 * 26.0 / 30.0) / 2.0;
        assert!((report.overall_score - expected).abs() < 1e-9);
    }

    #[test]
    fn untouched_practice_document_scores_half() {
        let config = CheckerConfig::default();
        let bytes = write_practice_file(&config).unwrap();
        let report = processor_without_cache()
            .check_bytes(&bytes, &config, true)
            .unwrap();

        assert_eq!(report.found_count, 30);
        assert_eq!(report.format_correct_count, 0);
        assert_eq!(report.find_percentage, 100.0);
        assert_eq!(report.overall_score, 50.0);
        assert!(report.format_results.iter().all(|r| !r.correct));
    }

    #[test]
    fn spacing_checks_are_unavailable_regardless_of_content() {
        let config = CheckerConfig::default();
        let report = scan_default(&roundtrip(&answer_key(&config)), &config);
        let spacing = report
            .format_results
            .iter()
            .find(|r| r.format_check == "spacingExpanded5")
            .unwrap();
        assert!(!spacing.correct);
        assert!(spacing.message.contains("not available"));
    }
}

// ============================================================================
// Gating and scoring
// ============================================================================

mod gating {
    use super::*;

    #[test]
    fn one_missing_phrase_skips_all_format_verdicts() {
        let config = CheckerConfig::default();
        let mut document = answer_key(&config);
        document.paragraphs.retain(|p| p.text() != "Tahoma");

        let report = scan_default(&roundtrip(&document), &config);
        assert_eq!(report.found_count, 29);
        assert_eq!(report.format_correct_count, 0);
        assert!(report.format_results.is_empty());
        assert_eq!(report.format_percentage, 0.0);

        let tahoma = report
            .find_results
            .iter()
            .find(|r| r.phrase == "Tahoma")
            .unwrap();
        assert!(!tahoma.found);
        assert_eq!(tahoma.instances_count, 0);

        let expected = 100.0 * 29.0 / 30.0 / 2.0;
        assert!((report.overall_score - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_document_finds_nothing() {
        let config = CheckerConfig::default();
        let report = scan_default(&roundtrip(&Document::default()), &config);
        assert!(report.find_results.iter().all(|r| !r.found));
        assert_eq!(report.found_count, 0);
        assert_eq!(report.overall_score, 0.0);
    }
}

// ============================================================================
// Attribute faults
// ============================================================================

mod faults {
    use super::*;

    #[test]
    fn unreadable_size_fails_only_its_own_requirement() {
        let document = Document::new(vec![
            Paragraph::new(vec![Run::with_properties(
                "10 point",
                RunProperties {
                    size: Some("big".to_string()),
                    ..Default::default()
                },
            )]),
            formatted_paragraph("Bold1", &CheckKind::Bold),
        ]);
        let requirements = [
            FormattingRequirement::new("10 point", "fontSize10"),
            FormattingRequirement::new("Bold1", "bold"),
        ];
        let report = scan(
            &roundtrip(&document),
            &requirements,
            &TextLocator::default(),
            &RuleEngine::new(),
        );

        assert_eq!(report.format_results.len(), 2);
        assert!(!report.format_results[0].correct);
        assert!(report.format_results[0].message.starts_with("Error checking"));
        assert!(report.format_results[1].correct);
        assert_eq!(report.format_correct_count, 1);
    }
}

// ============================================================================
// Locator behaviour through the decoder
// ============================================================================

mod locating {
    use super::*;

    #[test]
    fn phrase_match_ignores_case() {
        let document = Document::new(vec![formatted_paragraph("BOLD1", &CheckKind::Bold)]);
        let requirements = [FormattingRequirement::new("Bold1", "bold")];
        let report = scan(
            &roundtrip(&document),
            &requirements,
            &TextLocator::default(),
            &RuleEngine::new(),
        );
        assert!(report.find_results[0].found);
        assert!(report.format_results[0].correct);
    }

    #[test]
    fn phrase_without_spaces_still_matches() {
        let document = Document::new(vec![
            Paragraph::new(vec![Run::new("AlignRight")]).with_alignment(Alignment::Right)
        ]);
        let requirements = [FormattingRequirement::new("Align Right", "alignRight")];
        let report = scan(
            &roundtrip(&document),
            &requirements,
            &TextLocator::default(),
            &RuleEngine::new(),
        );
        assert!(report.find_results[0].found);
        assert!(report.format_results[0].correct);
    }

    #[test]
    fn table_cell_phrases_are_found() {
        let mut cell = formatted_paragraph("Impact", &CheckKind::parse("fontImpact"));
        cell.in_table = true;
        let decoded = roundtrip(&Document::new(vec![cell]));
        assert!(decoded.paragraphs[0].in_table);

        let report = scan(
            &decoded,
            &[FormattingRequirement::new("Impact", "fontImpact")],
            &TextLocator::default(),
            &RuleEngine::new(),
        );
        assert_eq!(report.format_correct_count, 1);
    }
}

// ============================================================================
// Style inheritance
// ============================================================================

mod styles {
    use super::*;

    fn style(id: &str, kind: StyleKind, run: RunProperties, alignment: Option<Alignment>) -> Style {
        Style {
            id: id.to_string(),
            name: Some(id.to_string()),
            kind,
            based_on: None,
            is_default: false,
            run,
            alignment,
        }
    }

    #[test]
    fn formatting_from_styles_counts() {
        let mut document = Document::new(vec![
            Paragraph {
                style_id: Some("Title".to_string()),
                ..Paragraph::new(vec![Run::new("Align Center")])
            },
            Paragraph::new(vec![Run::with_properties(
                "Italic1",
                RunProperties {
                    style_id: Some("Emphasis".to_string()),
                    ..Default::default()
                },
            )]),
        ]);
        document.styles.default_run = props().with_size_pt(12.0);
        document.styles.styles.push(style(
            "Title",
            StyleKind::Paragraph,
            props(),
            Some(Alignment::Center),
        ));
        document.styles.styles.push(style(
            "Emphasis",
            StyleKind::Character,
            RunProperties {
                italic: Some(true),
                ..Default::default()
            },
            None,
        ));

        let requirements = [
            FormattingRequirement::new("Align Center", "alignCenter"),
            FormattingRequirement::new("Italic1", "italic"),
            FormattingRequirement::new("Italic1", "fontSize12"),
        ];
        let report = scan(
            &roundtrip(&document),
            &requirements,
            &TextLocator::default(),
            &RuleEngine::new(),
        );
        assert!(report.format_results.iter().all(|r| r.correct), "{report:#?}");
    }
}

// ============================================================================
// Processor: idempotence, caching, transport
// ============================================================================

mod processor {
    use super::*;

    #[test]
    fn scanning_twice_gives_identical_reports() {
        let config = CheckerConfig::default();
        let bytes = write_docx(&answer_key(&config)).unwrap();
        let processor = processor_without_cache();

        let first = processor.check_bytes(&bytes, &config, true).unwrap();
        let second = processor.check_bytes(&bytes, &config, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cached_report_matches_fresh_report() {
        let root = std::env::temp_dir().join(format!("formatcheck_scan_cache_{}", std::process::id()));
        let processor = DocumentProcessor::new_with_dependencies(
            Box::new(DocxPreprocessor::new()),
            Box::new(FileStorage::open(&root).unwrap()),
        );
        let config = CheckerConfig::default();
        let bytes = write_docx(&build_practice_document(&config)).unwrap();

        let fresh = processor.check_bytes(&bytes, &config, false).unwrap();
        let cached = processor.check_bytes(&bytes, &config, false).unwrap();
        assert_eq!(fresh, cached);

        std::fs::remove_dir_all(root).ok();
    }

    #[test]
    fn response_envelope_flattens_report() {
        let config = CheckerConfig::default();
        let report = scan_default(&Document::default(), &config);
        let response = ScanResponse::new("essay.docx", report);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["filename"], "essay.docx");
        assert_eq!(json["found_count"], 0);
        assert_eq!(json["total_requirements"], 30);
        assert!(json["scan_id"].is_string());
        assert!(json["timestamp"].is_string());
        assert!(json.get("error").is_none());
    }
}

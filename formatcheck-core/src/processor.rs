use crate::cache::{ReportCacheKey, ReportCacheValue};
use crate::config::{CheckerConfig, StorageConfig};
use crate::document::Document;
use crate::locator::TextLocator;
use crate::preprocessors::{DocxPreprocessor, Preprocessor};
use crate::rules::{DebugConfig, RuleEngine};
use crate::storage::{
    calculate_config_hash, calculate_document_hash, DocumentStorage, FileStorage, NoOpStorage,
};
use crate::types::*;
use anyhow::{bail, Result};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Run the checklist against a decoded document.
///
/// Every phrase is searched first. Formatting is judged only when all of
/// them were found, and then only on the first match of each phrase.
/// The overall score is the mean of the find and format percentages.
pub fn scan(
    document: &Document,
    requirements: &[FormattingRequirement],
    locator: &TextLocator,
    rule_engine: &RuleEngine,
) -> ScanReport {
    let total = requirements.len();
    let mut find_results = Vec::with_capacity(total);
    let mut debug_info = Vec::with_capacity(total);
    let mut first_matches = Vec::with_capacity(total);

    // Find phase
    for requirement in requirements {
        let matches = locator.locate(document, &requirement.search_phrase);
        let found = !matches.is_empty();
        debug!(
            phrase = %requirement.search_phrase,
            instances = matches.len(),
            "searched"
        );
        debug_info.push(format!(
            "Searched '{}': {} ({} instances)",
            requirement.search_phrase,
            if found { "FOUND" } else { "NOT FOUND" },
            matches.len()
        ));
        find_results.push(FindResult {
            phrase: requirement.search_phrase.clone(),
            found,
            instances_count: matches.len(),
        });
        first_matches.push(matches.into_iter().next());
    }

    let found_count = find_results.iter().filter(|result| result.found).count();
    info!("Find phase: {found_count}/{total} phrases found");

    // Format phase, gated on every phrase being present
    let mut format_results = Vec::new();
    if found_count == total {
        for (requirement, first_match) in requirements.iter().zip(&first_matches) {
            let Some(first) = first_match else {
                continue;
            };
            let verdict = rule_engine.evaluate(requirement, first.run, first.paragraph);
            format_results.push(FormatResult {
                phrase: requirement.search_phrase.clone(),
                format_check: requirement.check.to_string(),
                correct: verdict.correct,
                message: verdict.message,
                debug: verdict.debug,
            });
        }
    } else {
        info!("Format phase skipped: not all phrases found");
    }

    let format_correct_count = format_results.iter().filter(|result| result.correct).count();
    let find_percentage = percentage(found_count, total);
    let format_percentage = if found_count == total {
        percentage(format_correct_count, total)
    } else {
        0.0
    };

    ScanReport {
        total_requirements: total,
        found_count,
        format_correct_count,
        find_results,
        format_results,
        find_percentage,
        format_percentage,
        overall_score: (find_percentage + format_percentage) / 2.0,
        debug_info,
        error: None,
    }
}

/// Simple profiler that collects timings for check steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        println!("⏱️  {}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        println!("\n📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let share = if total.is_zero() {
                0.0
            } else {
                duration.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            println!("   {:.<35} {:.0}ms ({:.1}%)", step, duration.as_millis(), share);
        }
        println!("   {:.<35} {:.0}ms", "Total", total.as_millis());
    }
}

pub struct DocumentProcessor {
    preprocessor: Box<dyn Preprocessor>,
    storage: Box<dyn DocumentStorage + Send + Sync>,
    rule_engine: RuleEngine,
}

impl DocumentProcessor {
    /// Create DocumentProcessor with full dependency injection
    pub fn new_with_dependencies(
        preprocessor: Box<dyn Preprocessor>,
        storage: Box<dyn DocumentStorage + Send + Sync>,
    ) -> Self {
        Self {
            preprocessor,
            storage,
            rule_engine: RuleEngine::new(),
        }
    }

    /// DOCX decoding with file-backed storage, or no storage when report
    /// caching is switched off
    pub fn new_cli(storage_config: &StorageConfig) -> Result<Self> {
        let storage: Box<dyn DocumentStorage + Send + Sync> = if storage_config.cache_reports {
            Box::new(FileStorage::new(storage_config)?)
        } else {
            Box::new(NoOpStorage::new())
        };
        Ok(Self::new_with_dependencies(Box::new(DocxPreprocessor::new()), storage))
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.rule_engine.set_debug_config(debug_config);
    }

    pub fn storage(&self) -> &(dyn DocumentStorage + Send + Sync) {
        self.storage.as_ref()
    }

    pub fn preprocessor_name(&self) -> &str {
        self.preprocessor.name()
    }

    /// Decode without checking (for `--dump-document` and diagnostics)
    pub fn decode(&self, bytes: &[u8]) -> Result<Document> {
        self.preprocessor.process(bytes)
    }

    /// Check uploaded document bytes against the configured checklist
    pub fn check_bytes(
        &self,
        bytes: &[u8],
        config: &CheckerConfig,
        skip_cache: bool,
    ) -> Result<ScanReport> {
        self.check_bytes_with_profiler(bytes, config, &mut StepProfiler::new(false), skip_cache)
    }

    /// Check document bytes, timing each step through `profiler`.
    ///
    /// A document that cannot be decoded yields a failed report rather than
    /// an error. Errors are reserved for the report cache.
    pub fn check_bytes_with_profiler(
        &self,
        bytes: &[u8],
        config: &CheckerConfig,
        profiler: &mut StepProfiler,
        skip_cache: bool,
    ) -> Result<ScanReport> {
        let start_time = Instant::now();
        let total = config.requirements.len();

        let cache_key = profiler.time_step("Cache Key Generation", || {
            let checklist_hash = calculate_config_hash(&(&config.requirements, &config.locator))?;
            Ok::<ReportCacheKey, anyhow::Error>(ReportCacheKey::new(
                calculate_document_hash(bytes),
                checklist_hash,
            ))
        })?;

        if skip_cache {
            println!("🚫 Skipping cache lookup (--skip-cache enabled)");
        } else if let Some(cached) =
            profiler.time_step("Cache Lookup", || self.storage.get_report(&cache_key))?
        {
            println!("🎯 Cache hit: Found report for document + checklist combination");
            return Ok(cached.report);
        }

        let decoded = profiler.time_step("1. DOCX → Markup", || {
            self.preprocessor.extract_markup(bytes)
        });
        let document = match decoded.and_then(|parts| {
            profiler.time_step("2. Markup → Document", || self.preprocessor.parse_markup(&parts))
        }) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to decode document: {e}");
                return Ok(ScanReport::failed(total, e.to_string()));
            }
        };
        info!(
            "Decoded {} paragraphs, {} runs with {}",
            document.paragraphs.len(),
            document.run_count(),
            self.preprocessor.name()
        );

        let locator = TextLocator::new(&config.locator);
        let report = profiler.time_step("3. Scan", || {
            scan(&document, &config.requirements, &locator, &self.rule_engine)
        });

        if skip_cache {
            println!("🚫 Skipping cache storage (--skip-cache enabled)");
        } else {
            profiler.time_step("Cache Storage", || {
                let processing_time = start_time.elapsed().as_millis() as u64;
                let cache_value = ReportCacheValue::new(report.clone(), processing_time);
                self.storage.store_report(&cache_key, &cache_value)
            })?;
        }

        Ok(report)
    }

    /// Check a document on disk
    pub fn check_file(
        &self,
        input_path: &Path,
        config: &CheckerConfig,
        enable_profiling: bool,
        skip_cache: bool,
    ) -> Result<ScanReport> {
        if !self.preprocessor.supports_file_type(input_path) {
            bail!("Please upload a .docx file: {}", input_path.display());
        }

        let mut profiler = StepProfiler::new(enable_profiling);
        let bytes = profiler.time_step("Read File", || std::fs::read(input_path))?;
        println!("📄 Checking document: {} ({} bytes)", input_path.display(), bytes.len());

        let report = self.check_bytes_with_profiler(&bytes, config, &mut profiler, skip_cache)?;
        profiler.print_summary();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Paragraph, Run, RunProperties};
    use crate::error::DocxError;

    fn bold_run(text: &str, bold: bool) -> Run {
        Run::with_properties(
            text,
            RunProperties {
                bold: Some(bold),
                ..Default::default()
            },
        )
    }

    fn run_scan(document: &Document, requirements: &[FormattingRequirement]) -> ScanReport {
        scan(document, requirements, &TextLocator::default(), &RuleEngine::new())
    }

    #[test]
    fn test_bold_scenarios() {
        let requirements = [FormattingRequirement::new("Bold1", "bold")];

        let good = Document::new(vec![Paragraph::new(vec![bold_run("Bold1", true)])]);
        let report = run_scan(&good, &requirements);
        assert!(report.find_results[0].found);
        assert!(report.format_results[0].correct);
        assert_eq!(report.overall_score, 100.0);

        let bad = Document::new(vec![Paragraph::new(vec![bold_run("Bold1", false)])]);
        let report = run_scan(&bad, &requirements);
        assert!(report.find_results[0].found);
        assert!(!report.format_results[0].correct);
        assert_eq!(report.format_results[0].message, "Bold formatting missing");
        assert_eq!(report.overall_score, 50.0);
    }

    #[test]
    fn test_gating_skips_format_phase() {
        let document = Document::new(vec![Paragraph::new(vec![bold_run("Bold1", true)])]);
        let requirements = [
            FormattingRequirement::new("Bold1", "bold"),
            FormattingRequirement::new("Italic1", "italic"),
        ];
        let report = run_scan(&document, &requirements);
        assert_eq!(report.found_count, 1);
        assert_eq!(report.format_correct_count, 0);
        assert!(report.format_results.is_empty());
        assert_eq!(report.find_percentage, 50.0);
        assert_eq!(report.format_percentage, 0.0);
        assert_eq!(report.overall_score, 25.0);
    }

    #[test]
    fn test_first_match_decides() {
        let document = Document::new(vec![
            Paragraph::new(vec![bold_run("Bold1", false)]),
            Paragraph::new(vec![bold_run("Bold1", true)]),
        ]);
        let report = run_scan(&document, &[FormattingRequirement::new("Bold1", "bold")]);
        assert_eq!(report.find_results[0].instances_count, 2);
        assert!(!report.format_results[0].correct);
    }

    #[test]
    fn test_debug_info_lines() {
        let document = Document::new(vec![Paragraph::new(vec![Run::new("Align Right")])]);
        let report = run_scan(
            &document,
            &[
                FormattingRequirement::new("Align Right", "alignRight"),
                FormattingRequirement::new("Tahoma", "fontTahoma"),
            ],
        );
        assert_eq!(
            report.debug_info,
            vec![
                "Searched 'Align Right': FOUND (2 instances)".to_string(),
                "Searched 'Tahoma': NOT FOUND (0 instances)".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_document_and_empty_checklist() {
        let report = run_scan(
            &Document::default(),
            &[FormattingRequirement::new("Bold1", "bold")],
        );
        assert!(!report.find_results[0].found);
        assert_eq!(report.overall_score, 0.0);

        let report = run_scan(&Document::default(), &[]);
        assert_eq!(report.total_requirements, 0);
        assert_eq!(report.overall_score, 0.0);
        assert!(report.format_results.is_empty());
    }

    #[test]
    fn test_check_bytes_reports_decode_failure() {
        let processor = DocumentProcessor::new_with_dependencies(
            Box::new(DocxPreprocessor::new()),
            Box::new(NoOpStorage::new()),
        );
        let config = CheckerConfig::default();

        let report = processor.check_bytes(&[], &config, false).unwrap();
        assert!(report.is_failed());
        assert_eq!(report.error.as_deref(), Some(DocxError::Empty.to_string().as_str()));
        assert_eq!(report.total_requirements, 30);
        assert_eq!(report.found_count, 0);

        let report = processor.check_bytes(b"not a zip", &config, true).unwrap();
        assert!(report.is_failed());
    }

    #[test]
    fn test_preprocessor_name() {
        let processor = DocumentProcessor::new_with_dependencies(
            Box::new(DocxPreprocessor::new()),
            Box::new(NoOpStorage::new()),
        );
        assert_eq!(processor.preprocessor_name(), "DocxPreprocessor");
    }

    #[test]
    fn test_check_file_rejects_other_extensions() {
        let processor = DocumentProcessor::new_with_dependencies(
            Box::new(DocxPreprocessor::new()),
            Box::new(NoOpStorage::new()),
        );
        let err = processor
            .check_file(Path::new("essay.pdf"), &CheckerConfig::default(), false, true)
            .unwrap_err();
        assert!(err.to_string().contains(".docx"));
    }
}

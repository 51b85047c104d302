use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use formatcheck_core::practice::{publish_practice_file, write_practice_file};
use formatcheck_core::{CheckerConfig, DebugConfig, DocumentProcessor, ScanReport, ScanResponse};

#[derive(Parser)]
#[command(name = "formatcheck")]
#[command(about = "Check the text formatting of a Word document against a practice checklist")]
struct Args {
    /// Path to the .docx file to check
    #[arg(short, long)]
    input: Option<String>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<String>,

    /// Print the active checklist and exit
    #[arg(long)]
    show_requirements: bool,

    /// Write the practice document to this path and exit
    #[arg(long)]
    generate_practice: Option<String>,

    /// Store the practice document in the storage directory and print its location
    #[arg(long)]
    publish: bool,

    /// Storage directory for published files and cached reports
    /// (default: <user data dir>/formatcheck)
    #[arg(long)]
    storage_dir: Option<String>,

    /// Skip cache and force a fresh scan
    #[arg(long)]
    skip_cache: bool,

    /// Enable detailed profiling of decode and scan steps
    #[arg(long)]
    profile: bool,

    /// Trace evaluation of requirements whose phrase matches (regex or substring)
    #[arg(long)]
    debug_filter: Vec<String>,

    /// Verbose logging (debug level unless RUST_LOG is set)
    #[arg(short, long)]
    verbose: bool,

    /// Save the decoded document model as JSON instead of scanning
    #[arg(long)]
    dump_document: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    println!("🦀 Formatcheck Document Checker");

    let mut config = CheckerConfig::load_with_fallback(args.config.as_deref());
    if let Some(config_path) = &args.config {
        println!("📋 Loaded config from: {}", config_path);
    } else {
        println!("📋 Using default checklist ({} requirements)", config.requirements.len());
    }

    apply_overrides(&args, &mut config);

    if args.show_requirements {
        show_requirements(&config);
        return Ok(());
    }

    if let Some(path) = &args.generate_practice {
        let bytes = write_practice_file(&config)?;
        std::fs::write(path, &bytes)
            .with_context(|| format!("Failed to write practice document: {path}"))?;
        println!("💾 Practice document saved to: {} ({} bytes)", path, bytes.len());
        return Ok(());
    }

    let mut processor = DocumentProcessor::new_cli(&config.storage)?;
    println!("🚀 Using {}", processor.preprocessor_name());

    if args.publish {
        match publish_practice_file(&config, processor.storage())? {
            Some(location) => println!("📤 Practice document published: {}", location),
            None => println!("⚠️  Storage is disabled; nothing was published"),
        }
        return Ok(());
    }

    let Some(input) = &args.input else {
        println!("⚠️  No input document given.");
        println!("   Use --input <file.docx>, or --generate-practice <path> to get started.");
        return Ok(());
    };
    let input_path = Path::new(input);
    if !input_path.exists() {
        println!("⚠️  Input document not found at: {}", input);
        println!("   Please check the file path.");
        return Ok(());
    }

    if args.dump_document {
        let bytes = std::fs::read(input_path)?;
        let document = processor.decode(&bytes)?;
        let output_path = output_path(&args, input, "document");
        std::fs::write(&output_path, serde_json::to_string_pretty(&document)?)
            .with_context(|| format!("Failed to write document dump: {output_path}"))?;
        println!("💾 Decoded document saved to: {}", output_path);
        return Ok(());
    }

    if !args.debug_filter.is_empty() {
        println!("🔍 Tracing requirements matching: {:?}", args.debug_filter);
        processor.set_debug_config(DebugConfig::new(true, args.debug_filter.clone()));
    }

    let report = match processor.check_file(input_path, &config, args.profile, args.skip_cache) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Check failed: {e}");
            std::process::exit(1);
        }
    };
    print_summary(&report);

    let filename = input_path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(input.as_str());
    let response = ScanResponse::new(filename, report);
    let output_path = output_path(&args, input, "formatcheck");
    std::fs::write(&output_path, serde_json::to_string_pretty(&response)?)
        .with_context(|| format!("Failed to write report: {output_path}"))?;
    println!("💾 Report saved to: {}", output_path);

    Ok(())
}

/// Apply CLI overrides to config.
///
/// `--skip-cache` stays out of the storage config; it only bypasses the
/// report cache for one scan.
fn apply_overrides(args: &Args, config: &mut CheckerConfig) {
    if let Some(root) = storage_root(args) {
        config.storage.root_dir = root;
    }
}

/// `--output`, or `<input stem>[_<config stem>]_<suffix>.json` in the
/// working directory.
fn output_path(args: &Args, input: &str, suffix: &str) -> String {
    if let Some(output) = &args.output {
        return output.clone();
    }
    let input_name = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let config_suffix = args
        .config
        .as_ref()
        .and_then(|p| Path::new(p).file_stem())
        .and_then(|s| s.to_str())
        .map(|s| format!("_{s}"))
        .unwrap_or_default();
    format!("{input_name}{config_suffix}_{suffix}.json")
}

/// `--storage-dir`, else the user data directory unless a config file chose one
fn storage_root(args: &Args) -> Option<PathBuf> {
    match (&args.storage_dir, &args.config) {
        (Some(dir), _) => Some(PathBuf::from(dir)),
        (None, None) => dirs::data_dir().map(|dir| dir.join("formatcheck")),
        (None, Some(_)) => None,
    }
}

fn show_requirements(config: &CheckerConfig) {
    println!("\n📋 Active checklist:");
    for (index, requirement) in config.requirements.iter().enumerate() {
        println!(
            "  {:>2}. {:<36} {}",
            index + 1,
            requirement.search_phrase,
            requirement.check
        );
    }

    println!("\n📝 Usage Examples:");
    println!("  formatcheck --generate-practice practice.docx");
    println!("  formatcheck -i practice.docx");
    println!("  formatcheck -i practice.docx -o report.json --profile");
    println!("  formatcheck -i practice.docx -c checklist.yaml --debug-filter 'Underline.*'");
}

fn print_summary(report: &ScanReport) {
    if let Some(error) = &report.error {
        println!("❌ Document could not be read: {}", error);
        return;
    }

    println!("✅ Scan complete");
    println!("📊 Results:");
    println!(
        "   - Found: {}/{} ({:.1}%)",
        report.found_count, report.total_requirements, report.find_percentage
    );
    if report.all_found() {
        println!(
            "   - Formatted correctly: {}/{} ({:.1}%)",
            report.format_correct_count, report.total_requirements, report.format_percentage
        );
    } else {
        println!("   - Formatting not checked: every phrase must be present first");
        for missing in report.find_results.iter().filter(|r| !r.found) {
            println!("     ✗ '{}' not found", missing.phrase);
        }
    }
    for result in &report.format_results {
        let mark = if result.correct { "✓" } else { "✗" };
        println!("     {} {:<36} {}", mark, result.phrase, result.message);
    }
    println!("   - Overall score: {:.1}%", report.overall_score);
}

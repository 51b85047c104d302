use crate::types::FormattingRequirement;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_requirements() -> Vec<FormattingRequirement> {
    DEFAULT_CHECKLIST
        .iter()
        .map(|(phrase, check)| FormattingRequirement::new(phrase, check))
        .collect()
}

/// The comprehensive practice checklist: phrase and check identifier.
pub const DEFAULT_CHECKLIST: &[(&str, &str)] = &[
    ("Bold1", "bold"),
    ("Italic1", "italic"),
    ("Underline1", "underline"),
    ("Underline2 Double", "underlineDouble"),
    ("Underline3 Dotted", "underlineDotted"),
    ("Underline4 Red", "underlineRed"),
    ("Superscript", "superscript"),
    ("Subscript", "subscript"),
    ("Strikethrough1", "strikethrough"),
    ("Strikethrough2 Double", "strikethroughDouble"),
    ("SMALL CAPS", "smallCaps"),
    ("10 point", "fontSize10"),
    ("12 point", "fontSize12"),
    ("15 point", "fontSize15"),
    ("26 point", "fontSize26"),
    ("Arial", "fontArial"),
    ("Bookman Old Style", "fontBookman"),
    ("Comic Sans Ms", "fontComicSans"),
    ("Impact", "fontImpact"),
    ("Tahoma", "fontTahoma"),
    ("Verdana", "fontVerdana"),
    ("Font Color Green", "colorGreen"),
    ("Font Color Dark Blue", "colorDarkBlue"),
    ("Highlight Turquoise", "highlightTurquoise"),
    ("Character Spacing Expanded at 5", "spacingExpanded5"),
    ("Character Spacing Expanded at 10", "spacingExpanded10"),
    ("Character Spacing Condensed at 2", "spacingCondensed2"),
    ("Align Right", "alignRight"),
    ("Align Center", "alignCenter"),
    ("Align Left", "alignLeft"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Checklist, evaluated in order
    #[serde(default = "default_requirements")]
    pub requirements: Vec<FormattingRequirement>,
    /// Text search behaviour
    #[serde(default)]
    pub locator: LocatorConfig,
    /// Practice document contents
    #[serde(default)]
    pub practice: PracticeConfig,
    /// Where practice files and cached reports live
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Retry phrases containing spaces with all whitespace removed
    #[serde(default = "default_true")]
    pub whitespace_fallback: bool,
    /// Search paragraphs inside table cells as well as body paragraphs
    #[serde(default = "default_true")]
    pub include_table_paragraphs: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            whitespace_fallback: true,
            include_table_paragraphs: true,
        }
    }
}

fn default_practice_file_name() -> String {
    "comprehensive-formatting-practice.docx".to_string()
}

fn default_title() -> String {
    "Comprehensive Formatting Practice Document".to_string()
}

fn default_instructions() -> String {
    "Instructions: Apply the correct formatting to each term below:".to_string()
}

fn default_guide() -> Vec<String> {
    vec![
        "• Bold1 - Make bold".to_string(),
        "• Italic1 - Make italic".to_string(),
        "• Font sizes: Use Home → Font Size".to_string(),
        "• Colors: Use Home → Font Color".to_string(),
        "• Alignment: Use Home → Paragraph alignment".to_string(),
        "• Special effects: Use Home → Font dialog (Ctrl+D)".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Blob name of the generated practice document
    #[serde(default = "default_practice_file_name")]
    pub file_name: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Lines of the formatting guide appended after the checklist
    #[serde(default = "default_guide")]
    pub guide: Vec<String>,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            file_name: default_practice_file_name(),
            title: default_title(),
            instructions: default_instructions(),
            guide: default_guide(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("formatcheck-data")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for blobs and the report cache
    #[serde(default = "default_storage_root")]
    pub root_dir: PathBuf,
    /// Reuse reports for byte-identical documents and identical checklists
    #[serde(default = "default_true")]
    pub cache_reports: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_storage_root(),
            cache_reports: true,
        }
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            requirements: default_requirements(),
            locator: LocatorConfig::default(),
            practice: PracticeConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl CheckerConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: CheckerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("⚠️  Failed to load config from {p}: {e:#}; using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

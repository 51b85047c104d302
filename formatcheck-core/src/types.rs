use crate::document::{Alignment, Paragraph, Run};
use crate::rules::color::ColorTarget;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

// ===== REQUIREMENTS =====

static FONT_SIZE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fontSize(\d+)$").unwrap());

static SPACING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^spacing(Expanded|Condensed)(\d+)$").unwrap());

static NAMED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(font|color|highlight|underline)([A-Z][A-Za-z]*)$").unwrap());

/// Identifier suffix -> font keyword, where the keyword is not simply the
/// lowercased suffix.
const FONT_KEYWORD_ALIASES: &[(&str, &str)] = &[("ComicSans", "comic")];

/// The comparison rule a requirement asks for.
///
/// Identifiers follow the camelCase checklist grammar (`bold`,
/// `fontSize12`, `colorDarkBlue`, `alignRight`, ...). Parsing never fails:
/// identifiers that name no rule become [`CheckKind::Unrecognized`] and are
/// reported as failed checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckKind {
    Bold,
    Italic,
    Underline,
    UnderlineDouble,
    UnderlineDotted,
    UnderlineColored(ColorTarget),
    Superscript,
    Subscript,
    Strikethrough,
    StrikethroughDouble,
    SmallCaps,
    /// Target size in whole points
    FontSize(u32),
    /// Lowercase keyword that must appear in the font name
    FontFamily(String),
    FontColor(ColorTarget),
    Highlight(ColorTarget),
    /// Expanded character spacing in points
    SpacingExpanded(u32),
    /// Condensed character spacing in points
    SpacingCondensed(u32),
    Alignment(Alignment),
    Unrecognized(String),
}

impl CheckKind {
    pub fn parse(identifier: &str) -> Self {
        let id = identifier.trim();
        let exact = match id {
            "bold" => Some(Self::Bold),
            "italic" => Some(Self::Italic),
            "underline" => Some(Self::Underline),
            "underlineDouble" => Some(Self::UnderlineDouble),
            "underlineDotted" => Some(Self::UnderlineDotted),
            "superscript" => Some(Self::Superscript),
            "subscript" => Some(Self::Subscript),
            "strikethrough" => Some(Self::Strikethrough),
            "strikethroughDouble" => Some(Self::StrikethroughDouble),
            "smallCaps" => Some(Self::SmallCaps),
            "alignLeft" => Some(Self::Alignment(Alignment::Left)),
            "alignCenter" => Some(Self::Alignment(Alignment::Center)),
            "alignRight" => Some(Self::Alignment(Alignment::Right)),
            _ => None,
        };
        if let Some(kind) = exact {
            return kind;
        }

        if let Some(cap) = FONT_SIZE_REGEX.captures(id) {
            if let Ok(points) = cap[1].parse::<u32>() {
                return Self::FontSize(points);
            }
        }

        if let Some(cap) = SPACING_REGEX.captures(id) {
            if let Ok(points) = cap[2].parse::<u32>() {
                return match &cap[1] {
                    "Expanded" => Self::SpacingExpanded(points),
                    _ => Self::SpacingCondensed(points),
                };
            }
        }

        if let Some(cap) = NAMED_REGEX.captures(id) {
            let suffix = &cap[2];
            let kind = match &cap[1] {
                "font" => Some(Self::FontFamily(font_keyword(suffix))),
                "color" => ColorTarget::from_name(suffix).map(Self::FontColor),
                "highlight" => ColorTarget::from_name(suffix).map(Self::Highlight),
                "underline" => ColorTarget::from_name(suffix).map(Self::UnderlineColored),
                _ => None,
            };
            if let Some(kind) = kind {
                return kind;
            }
        }

        Self::Unrecognized(id.to_string())
    }

    /// Short human label used in report messages.
    pub fn label(&self) -> String {
        match self {
            Self::Bold => "Bold".to_string(),
            Self::Italic => "Italic".to_string(),
            Self::Underline => "Underline".to_string(),
            Self::UnderlineDouble => "Double underline".to_string(),
            Self::UnderlineDotted => "Dotted underline".to_string(),
            Self::UnderlineColored(color) => format!("{} underline", color.display_name()),
            Self::Superscript => "Superscript".to_string(),
            Self::Subscript => "Subscript".to_string(),
            Self::Strikethrough => "Strikethrough".to_string(),
            Self::StrikethroughDouble => "Double strikethrough".to_string(),
            Self::SmallCaps => "Small caps".to_string(),
            Self::FontSize(points) => format!("{points}pt font size"),
            Self::FontFamily(keyword) => format!("{} font", title_case(keyword)),
            Self::FontColor(color) => format!("{} font color", color.display_name()),
            Self::Highlight(color) => format!("{} highlight", color.display_name()),
            Self::SpacingExpanded(points) => format!("Character spacing expanded by {points}pt"),
            Self::SpacingCondensed(points) => format!("Character spacing condensed by {points}pt"),
            Self::Alignment(alignment) => format!("{alignment} alignment"),
            Self::Unrecognized(id) => id.clone(),
        }
    }
}

fn font_keyword(suffix: &str) -> String {
    FONT_KEYWORD_ALIASES
        .iter()
        .find(|(alias, _)| *alias == suffix)
        .map(|(_, keyword)| keyword.to_string())
        .unwrap_or_else(|| suffix.to_lowercase())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bold => f.write_str("bold"),
            Self::Italic => f.write_str("italic"),
            Self::Underline => f.write_str("underline"),
            Self::UnderlineDouble => f.write_str("underlineDouble"),
            Self::UnderlineDotted => f.write_str("underlineDotted"),
            Self::UnderlineColored(color) => write!(f, "underline{}", color.identifier()),
            Self::Superscript => f.write_str("superscript"),
            Self::Subscript => f.write_str("subscript"),
            Self::Strikethrough => f.write_str("strikethrough"),
            Self::StrikethroughDouble => f.write_str("strikethroughDouble"),
            Self::SmallCaps => f.write_str("smallCaps"),
            Self::FontSize(points) => write!(f, "fontSize{points}"),
            Self::FontFamily(keyword) => {
                let suffix = FONT_KEYWORD_ALIASES
                    .iter()
                    .find(|(_, alias_keyword)| alias_keyword == keyword)
                    .map(|(suffix, _)| suffix.to_string())
                    .unwrap_or_else(|| title_case(keyword));
                write!(f, "font{suffix}")
            }
            Self::FontColor(color) => write!(f, "color{}", color.identifier()),
            Self::Highlight(color) => write!(f, "highlight{}", color.identifier()),
            Self::SpacingExpanded(points) => write!(f, "spacingExpanded{points}"),
            Self::SpacingCondensed(points) => write!(f, "spacingCondensed{points}"),
            Self::Alignment(alignment) => write!(f, "align{alignment}"),
            Self::Unrecognized(id) => f.write_str(id),
        }
    }
}

impl FromStr for CheckKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for CheckKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CheckKind> for String {
    fn from(kind: CheckKind) -> Self {
        kind.to_string()
    }
}

/// One checklist entry: a phrase to find and the formatting it must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattingRequirement {
    #[serde(alias = "searchedWord")]
    pub search_phrase: String,
    #[serde(alias = "formatCheck")]
    pub check: CheckKind,
}

impl FormattingRequirement {
    pub fn new(search_phrase: &str, check: &str) -> Self {
        Self {
            search_phrase: search_phrase.to_string(),
            check: CheckKind::parse(check),
        }
    }
}

// ===== SEARCH AND EVALUATION =====

/// A run whose text contains a searched phrase.
#[derive(Debug, Clone, Copy)]
pub struct RunMatch<'a> {
    pub paragraph_index: usize,
    pub run_index: usize,
    pub matched_text: &'a str,
    pub paragraph: &'a Paragraph,
    pub run: &'a Run,
}

/// Outcome of checking one requirement against one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub correct: bool,
    pub message: String,
    pub debug: String,
}

impl Verdict {
    pub fn new(correct: bool, message: impl Into<String>, debug: impl Into<String>) -> Self {
        Self {
            correct,
            message: message.into(),
            debug: debug.into(),
        }
    }

    /// A check the document introspection layer cannot answer.
    pub fn unsupported(message: impl Into<String>, debug: impl Into<String>) -> Self {
        Self::new(false, message, debug)
    }
}

// ===== REPORT =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindResult {
    pub phrase: String,
    pub found: bool,
    pub instances_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatResult {
    pub phrase: String,
    pub format_check: String,
    pub correct: bool,
    pub message: String,
    pub debug: String,
}

/// Result of scanning one document against the checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub total_requirements: usize,
    pub found_count: usize,
    pub format_correct_count: usize,
    pub find_results: Vec<FindResult>,
    pub format_results: Vec<FormatResult>,
    pub find_percentage: f64,
    pub format_percentage: f64,
    pub overall_score: f64,
    pub debug_info: Vec<String>,
    /// Set when the document could not be decoded at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanReport {
    /// Report for a document that could not be opened: all counts zero.
    pub fn failed(total_requirements: usize, error: impl Into<String>) -> Self {
        Self {
            total_requirements,
            found_count: 0,
            format_correct_count: 0,
            find_results: Vec::new(),
            format_results: Vec::new(),
            find_percentage: 0.0,
            format_percentage: 0.0,
            overall_score: 0.0,
            debug_info: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn all_found(&self) -> bool {
        self.found_count == self.total_requirements
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Transport envelope around a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResponse {
    pub scan_id: Uuid,
    pub filename: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub report: ScanReport,
}

impl ScanResponse {
    pub fn new(filename: &str, report: ScanReport) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            filename: filename.to_string(),
            timestamp: Utc::now(),
            report,
        }
    }
}

// ===== PREPROCESSOR OUTPUT =====

/// Raw XML parts pulled out of a DOCX package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkupParts {
    pub document_xml: String,
    pub styles_xml: Option<String>,
}

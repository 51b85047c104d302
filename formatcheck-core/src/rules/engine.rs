use super::color::ColorTarget;
use crate::document::{Alignment, Paragraph, Run, UnderlineStyle};
use crate::error::AttributeError;
use crate::types::*;
use regex::Regex;
use tracing::{debug, info};

// Debug configuration for tracing individual requirements
#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub filter_patterns: Vec<String>,
}

impl DebugConfig {
    pub fn new(enabled: bool, filter_patterns: Vec<String>) -> Self {
        Self {
            enabled,
            filter_patterns,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            filter_patterns: Vec::new(),
        }
    }

    /// Whether evaluations for this phrase should be traced.
    pub fn matches(&self, phrase: &str) -> bool {
        if !self.enabled || self.filter_patterns.is_empty() {
            return false;
        }
        self.filter_patterns.iter().any(|pattern| {
            // Try regex first, fall back to simple string contains
            if let Ok(regex) = Regex::new(pattern) {
                regex.is_match(phrase)
            } else {
                phrase.contains(pattern.as_str())
            }
        })
    }
}

/// Maps a requirement to a verdict for one located run.
///
/// Evaluation is a pure function of the check kind and the run/paragraph
/// attributes. It never fails: unsupported checks and unreadable attributes
/// both come back as `correct = false` with an explanation.
pub struct RuleEngine {
    debug_config: DebugConfig,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            debug_config: DebugConfig::disabled(),
        }
    }

    pub fn set_debug_config(&mut self, debug_config: DebugConfig) {
        self.debug_config = debug_config;
    }

    pub fn evaluate(
        &self,
        requirement: &FormattingRequirement,
        run: &Run,
        paragraph: &Paragraph,
    ) -> Verdict {
        let verdict = self.evaluate_check(&requirement.check, run, paragraph);

        if self.debug_config.matches(&requirement.search_phrase) {
            info!(
                phrase = %requirement.search_phrase,
                check = %requirement.check,
                run_text = %run.text,
                correct = verdict.correct,
                debug = %verdict.debug,
                "🔍 traced evaluation"
            );
        } else {
            debug!(
                phrase = %requirement.search_phrase,
                check = %requirement.check,
                correct = verdict.correct,
                "evaluated requirement"
            );
        }

        verdict
    }

    pub fn evaluate_check(&self, check: &CheckKind, run: &Run, paragraph: &Paragraph) -> Verdict {
        match check {
            CheckKind::Bold => flag(check, run.is_bold(), format!("bold = {:?}", run.resolved.bold)),
            CheckKind::Italic => {
                flag(check, run.is_italic(), format!("italic = {:?}", run.resolved.italic))
            }
            CheckKind::Superscript | CheckKind::Subscript => {
                let is_set = match check {
                    CheckKind::Superscript => run.is_superscript(),
                    _ => run.is_subscript(),
                };
                flag(
                    check,
                    is_set,
                    format!("vertical_align = {:?}", run.resolved.vertical_align),
                )
            }
            CheckKind::Strikethrough => {
                flag(check, run.is_strike(), format!("strike = {:?}", run.resolved.strike))
            }
            CheckKind::StrikethroughDouble => flag(
                check,
                run.is_double_strike(),
                format!("double_strike = {:?}", run.resolved.double_strike),
            ),
            CheckKind::SmallCaps => flag(
                check,
                run.is_small_caps(),
                format!("small_caps = {:?}", run.resolved.small_caps),
            ),
            CheckKind::Underline => {
                let style = run.underline();
                flag(check, style != UnderlineStyle::None, format!("underline = {style}"))
            }
            CheckKind::UnderlineDouble => underline_exact(run, UnderlineStyle::Double),
            CheckKind::UnderlineDotted => underline_exact(run, UnderlineStyle::Dotted),
            CheckKind::UnderlineColored(_) => Verdict::unsupported(
                format!("{} check not available", check.label()),
                format!(
                    "underline = {}, underline_color = {:?}",
                    run.underline(),
                    run.resolved.underline_color
                ),
            ),
            CheckKind::FontSize(target) => match run.font_size_pt() {
                Ok(actual) => font_size(*target, actual),
                Err(err) => attribute_fault(check, err),
            },
            CheckKind::FontFamily(keyword) => font_family(keyword, run.font_name()),
            CheckKind::FontColor(target) => match run.font_color() {
                Ok(rgb) => {
                    let correct = rgb.map_or(false, |rgb| target.contains(rgb));
                    let shown = rgb.map_or_else(|| "None".to_string(), |rgb| rgb.to_string());
                    Verdict::new(
                        correct,
                        if correct {
                            format!("{} correct", check.label())
                        } else {
                            format!("Font color doesn't match {} range", target.name())
                        },
                        format!("font_color = {shown}"),
                    )
                }
                Err(err) => attribute_fault(check, err),
            },
            CheckKind::Highlight(target) => highlight(check, *target, run),
            CheckKind::SpacingExpanded(_) | CheckKind::SpacingCondensed(_) => Verdict::unsupported(
                "Character spacing check not available in the document reader",
                "Character spacing (w:spacing on runs) is not exposed by the run attributes",
            ),
            CheckKind::Alignment(target) => alignment(*target, paragraph.alignment()),
            CheckKind::Unrecognized(id) => Verdict::new(
                false,
                format!("Format check for {id} not implemented"),
                format!("format_check = {id}"),
            ),
        }
    }
}

fn flag(check: &CheckKind, is_set: bool, debug: String) -> Verdict {
    let message = if is_set {
        format!("{} formatting correct", check.label())
    } else {
        format!("{} formatting missing", check.label())
    };
    Verdict::new(is_set, message, debug)
}

fn underline_exact(run: &Run, expected: UnderlineStyle) -> Verdict {
    let actual = run.underline();
    let correct = actual == expected;
    let message = if correct {
        format!("{} underline correct", title(expected.as_ooxml()))
    } else {
        format!("Underline is {actual}, should be {expected}")
    };
    Verdict::new(correct, message, format!("underline = {actual}"))
}

fn font_size(target: u32, actual: Option<f32>) -> Verdict {
    // Exact comparison: DOCX sizes are half-points, so 12.5pt is not 12pt
    let correct = actual == Some(target as f32);
    let shown = actual.map_or_else(|| "not set".to_string(), |pt| format!("{pt}pt"));
    let message = if correct {
        format!("{target}pt font size correct")
    } else {
        format!("Font size is {shown}, should be {target}pt")
    };
    Verdict::new(correct, message, format!("font_size = {shown}"))
}

fn font_family(keyword: &str, actual: Option<&str>) -> Verdict {
    let actual_lower = actual.unwrap_or_default().to_lowercase();
    let correct = actual_lower.contains(&keyword.to_lowercase());
    let message = if correct {
        format!("{} font correct", title(keyword))
    } else {
        format!(
            "Font is {}, should contain {keyword}",
            actual.unwrap_or("not set")
        )
    };
    Verdict::new(correct, message, format!("font_name = {actual:?}"))
}

fn highlight(check: &CheckKind, target: ColorTarget, run: &Run) -> Verdict {
    let highlight = run.highlight();
    let correct = highlight
        .and_then(|color| color.rgb())
        .map_or(false, |rgb| target.contains(rgb));
    let shown = highlight.map_or_else(|| "None".to_string(), |color| color.to_string());
    let message = if correct {
        format!("{} correct", check.label())
    } else {
        format!("Highlight color doesn't match {}", target.name())
    };
    Verdict::new(correct, message, format!("highlight = {shown}"))
}

fn alignment(target: Alignment, actual: Option<Alignment>) -> Verdict {
    let correct = actual == Some(target);
    let shown = actual.map_or_else(|| "not set".to_string(), |a| a.to_string());
    let message = if correct {
        format!("{target} alignment correct")
    } else {
        format!("Alignment is {shown}, should be {target}")
    };
    Verdict::new(correct, message, format!("paragraph_alignment = {shown}"))
}

fn attribute_fault(check: &CheckKind, err: AttributeError) -> Verdict {
    Verdict::new(
        false,
        format!("Error checking {check}: {err}"),
        format!("Attribute read failed: {err:?}"),
    )
}

fn title(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

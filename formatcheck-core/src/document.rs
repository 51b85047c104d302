//! Decoded document model
//!
//! The model mirrors the parts of WordprocessingML the checks care about:
//! body paragraphs made of runs, the style sheet they inherit from, and the
//! section properties. Every run keeps both its direct formatting and the
//! effective formatting after style resolution; the accessors used by the
//! rule engine always read the effective values.

use crate::error::AttributeError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== COLOR =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse an OOXML `RRGGBB` value (no leading '#').
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        Some(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ===== ENUMERATED PROPERTIES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    Distribute,
}

impl Alignment {
    /// Map a `w:jc` value. Bidi-aware `start`/`end` are treated as left/right.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "both" => Some(Self::Justify),
            "distribute" | "thaiDistribute" => Some(Self::Distribute),
            _ => None,
        }
    }

    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
            Self::Distribute => "distribute",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
            Self::Justify => "Justify",
            Self::Distribute => "Distribute",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnderlineStyle {
    None,
    Single,
    Words,
    Double,
    Thick,
    Dotted,
    Dash,
    Wave,
    /// Any other `w:u` value (dotDash, wavyDouble, ...), kept verbatim.
    Other(String),
}

impl UnderlineStyle {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "single" => Self::Single,
            "words" => Self::Words,
            "double" => Self::Double,
            "thick" => Self::Thick,
            "dotted" => Self::Dotted,
            "dash" => Self::Dash,
            "wave" => Self::Wave,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_ooxml(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Words => "words",
            Self::Double => "double",
            Self::Thick => "thick",
            Self::Dotted => "dotted",
            Self::Dash => "dash",
            Self::Wave => "wave",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for UnderlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ooxml())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerticalAlign {
    Baseline,
    Superscript,
    Subscript,
}

impl VerticalAlign {
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "baseline" => Some(Self::Baseline),
            "superscript" => Some(Self::Superscript),
            "subscript" => Some(Self::Subscript),
            _ => None,
        }
    }

    pub fn as_ooxml(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
        }
    }
}

/// The fixed highlight palette of `w:highlight`.
///
/// Shading (`w:shd`) can look like a highlight in the editor but is a
/// different property and is not reported here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HighlightColor {
    None,
    Black,
    Blue,
    Cyan,
    Green,
    Magenta,
    Red,
    Yellow,
    White,
    DarkBlue,
    DarkCyan,
    DarkGreen,
    DarkMagenta,
    DarkRed,
    DarkYellow,
    DarkGray,
    LightGray,
    Other(String),
}

impl HighlightColor {
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "black" => Self::Black,
            "blue" => Self::Blue,
            "cyan" => Self::Cyan,
            "green" => Self::Green,
            "magenta" => Self::Magenta,
            "red" => Self::Red,
            "yellow" => Self::Yellow,
            "white" => Self::White,
            "darkBlue" => Self::DarkBlue,
            "darkCyan" => Self::DarkCyan,
            "darkGreen" => Self::DarkGreen,
            "darkMagenta" => Self::DarkMagenta,
            "darkRed" => Self::DarkRed,
            "darkYellow" => Self::DarkYellow,
            "darkGray" => Self::DarkGray,
            "lightGray" => Self::LightGray,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_ooxml(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Black => "black",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Green => "green",
            Self::Magenta => "magenta",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::White => "white",
            Self::DarkBlue => "darkBlue",
            Self::DarkCyan => "darkCyan",
            Self::DarkGreen => "darkGreen",
            Self::DarkMagenta => "darkMagenta",
            Self::DarkRed => "darkRed",
            Self::DarkYellow => "darkYellow",
            Self::DarkGray => "darkGray",
            Self::LightGray => "lightGray",
            Self::Other(value) => value,
        }
    }

    /// The swatch Word renders for this palette entry.
    pub fn rgb(&self) -> Option<Rgb> {
        let rgb = match self {
            Self::None | Self::Other(_) => return None,
            Self::Black => Rgb::new(0x00, 0x00, 0x00),
            Self::Blue => Rgb::new(0x00, 0x00, 0xFF),
            Self::Cyan => Rgb::new(0x00, 0xFF, 0xFF),
            Self::Green => Rgb::new(0x00, 0xFF, 0x00),
            Self::Magenta => Rgb::new(0xFF, 0x00, 0xFF),
            Self::Red => Rgb::new(0xFF, 0x00, 0x00),
            Self::Yellow => Rgb::new(0xFF, 0xFF, 0x00),
            Self::White => Rgb::new(0xFF, 0xFF, 0xFF),
            Self::DarkBlue => Rgb::new(0x00, 0x00, 0x80),
            Self::DarkCyan => Rgb::new(0x00, 0x80, 0x80),
            Self::DarkGreen => Rgb::new(0x00, 0x80, 0x00),
            Self::DarkMagenta => Rgb::new(0x80, 0x00, 0x80),
            Self::DarkRed => Rgb::new(0x80, 0x00, 0x00),
            Self::DarkYellow => Rgb::new(0x80, 0x80, 0x00),
            Self::DarkGray => Rgb::new(0x80, 0x80, 0x80),
            Self::LightGray => Rgb::new(0xC0, 0xC0, 0xC0),
        };
        Some(rgb)
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Word's UI names for the palette entries that differ from the XML value
        let name = match self {
            Self::Cyan => "turquoise",
            Self::Green => "bright green",
            Self::Magenta => "pink",
            Self::DarkCyan => "teal",
            Self::DarkGreen => "green",
            Self::DarkMagenta => "violet",
            Self::DarkGray => "gray 50%",
            Self::LightGray => "gray 25%",
            other => other.as_ooxml(),
        };
        f.write_str(name)
    }
}

// ===== RUN PROPERTIES =====

/// Character formatting as written in a `w:rPr` block.
///
/// `None` means "not specified at this level". Numeric and color values are
/// kept as raw strings so that a malformed value surfaces as an
/// [`AttributeError`] at read time instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    pub style_id: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<UnderlineStyle>,
    pub underline_color: Option<String>,
    pub strike: Option<bool>,
    pub double_strike: Option<bool>,
    pub small_caps: Option<bool>,
    pub vertical_align: Option<VerticalAlign>,
    pub font_name: Option<String>,
    /// `w:sz` in half-points
    pub size: Option<String>,
    /// `w:color` as `RRGGBB` or `auto`
    pub color: Option<String>,
    pub highlight: Option<HighlightColor>,
}

impl RunProperties {
    /// Apply every property set in `top` over `self`.
    pub fn overlay(&mut self, top: &RunProperties) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.style_id, &top.style_id);
        take(&mut self.bold, &top.bold);
        take(&mut self.italic, &top.italic);
        take(&mut self.underline, &top.underline);
        take(&mut self.underline_color, &top.underline_color);
        take(&mut self.strike, &top.strike);
        take(&mut self.double_strike, &top.double_strike);
        take(&mut self.small_caps, &top.small_caps);
        take(&mut self.vertical_align, &top.vertical_align);
        take(&mut self.font_name, &top.font_name);
        take(&mut self.size, &top.size);
        take(&mut self.color, &top.color);
        take(&mut self.highlight, &top.highlight);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the size from a point value (stored as half-points).
    pub fn with_size_pt(mut self, points: f32) -> Self {
        self.size = Some(format!("{}", (points * 2.0).round() as i64));
        self
    }
}

// ===== DOCUMENT TREE =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    /// Formatting written on the run itself
    pub direct: RunProperties,
    /// Effective formatting after style resolution
    pub resolved: RunProperties,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_properties(text, RunProperties::default())
    }

    /// Build a run whose effective formatting equals its direct formatting.
    pub fn with_properties(text: impl Into<String>, properties: RunProperties) -> Self {
        Self {
            text: text.into(),
            direct: properties.clone(),
            resolved: properties,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.resolved.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.resolved.italic.unwrap_or(false)
    }

    pub fn is_strike(&self) -> bool {
        self.resolved.strike.unwrap_or(false)
    }

    pub fn is_double_strike(&self) -> bool {
        self.resolved.double_strike.unwrap_or(false)
    }

    pub fn is_small_caps(&self) -> bool {
        self.resolved.small_caps.unwrap_or(false)
    }

    pub fn is_superscript(&self) -> bool {
        self.resolved.vertical_align == Some(VerticalAlign::Superscript)
    }

    pub fn is_subscript(&self) -> bool {
        self.resolved.vertical_align == Some(VerticalAlign::Subscript)
    }

    pub fn underline(&self) -> UnderlineStyle {
        self.resolved
            .underline
            .clone()
            .unwrap_or(UnderlineStyle::None)
    }

    pub fn font_name(&self) -> Option<&str> {
        self.resolved.font_name.as_deref()
    }

    /// Effective font size in points.
    pub fn font_size_pt(&self) -> Result<Option<f32>, AttributeError> {
        match self.resolved.size.as_deref() {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map(|half_points| Some(half_points as f32 / 2.0))
                .map_err(|_| AttributeError::InvalidSize(raw.to_string())),
        }
    }

    /// Effective font color; `auto` reads as no explicit color.
    pub fn font_color(&self) -> Result<Option<Rgb>, AttributeError> {
        match self.resolved.color.as_deref() {
            None => Ok(None),
            Some(raw) if raw.eq_ignore_ascii_case("auto") => Ok(None),
            Some(raw) => Rgb::from_hex(raw)
                .map(Some)
                .ok_or_else(|| AttributeError::InvalidColor(raw.to_string())),
        }
    }

    pub fn highlight(&self) -> Option<&HighlightColor> {
        self.resolved.highlight.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub style_id: Option<String>,
    /// `w:jc` written on the paragraph itself
    pub direct_alignment: Option<Alignment>,
    /// Effective alignment after style resolution
    pub alignment: Option<Alignment>,
    pub runs: Vec<Run>,
    /// True for paragraphs inside table cells
    pub in_table: bool,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.direct_alignment = Some(alignment);
        self.alignment = Some(alignment);
        self
    }

    /// Concatenated text of all runs.
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn alignment(&self) -> Option<Alignment> {
        self.alignment
    }
}

/// Page margins in twentieths of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub page_width: Option<u32>,
    pub page_height: Option<u32>,
    pub margins: Option<PageMargins>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    Numbering,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: String,
    pub name: Option<String>,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub run: RunProperties,
    pub alignment: Option<Alignment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    /// `w:docDefaults/w:rPrDefault`
    pub default_run: RunProperties,
    pub styles: Vec<Style>,
}

impl StyleSheet {
    pub fn is_empty(&self) -> bool {
        self.default_run.is_empty() && self.styles.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Style> {
        self.styles.iter().find(|style| style.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    pub sections: Vec<SectionProperties>,
    pub styles: StyleSheet,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Default::default()
        }
    }

    pub fn run_count(&self) -> usize {
        self.paragraphs.iter().map(|p| p.runs.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex("00B050"), Some(Rgb::new(0, 0xB0, 0x50)));
        assert_eq!(Rgb::from_hex("#ff0000"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::from_hex("auto"), None);
        assert_eq!(Rgb::from_hex("12345"), None);
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn test_missing_boolean_attributes_read_false() {
        let run = Run::new("plain");
        assert!(!run.is_bold());
        assert!(!run.is_italic());
        assert!(!run.is_small_caps());
        assert!(!run.is_superscript());
        assert_eq!(run.underline(), UnderlineStyle::None);
        assert_eq!(run.font_size_pt(), Ok(None));
        assert_eq!(run.font_color(), Ok(None));
    }

    #[test]
    fn test_font_size_and_color_reads() {
        let props = RunProperties {
            color: Some("auto".to_string()),
            ..Default::default()
        }
        .with_size_pt(10.5);
        let run = Run::with_properties("x", props);
        assert_eq!(run.font_size_pt(), Ok(Some(10.5)));
        assert_eq!(run.font_color(), Ok(None));

        let broken = Run::with_properties(
            "x",
            RunProperties {
                size: Some("big".to_string()),
                color: Some("green".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(
            broken.font_size_pt(),
            Err(AttributeError::InvalidSize("big".to_string()))
        );
        assert_eq!(
            broken.font_color(),
            Err(AttributeError::InvalidColor("green".to_string()))
        );
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let mut base = RunProperties {
            bold: Some(true),
            font_name: Some("Calibri".to_string()),
            ..Default::default()
        };
        base.overlay(&RunProperties {
            bold: Some(false),
            italic: Some(true),
            ..Default::default()
        });
        assert_eq!(base.bold, Some(false));
        assert_eq!(base.italic, Some(true));
        assert_eq!(base.font_name.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_paragraph_text_concatenates_runs() {
        let paragraph = Paragraph::new(vec![Run::new("Align"), Run::new(" Right")]);
        assert_eq!(paragraph.text(), "Align Right");
        assert_eq!(paragraph.alignment(), None);
    }

    #[test]
    fn test_highlight_palette() {
        assert_eq!(HighlightColor::from_ooxml("cyan"), HighlightColor::Cyan);
        assert_eq!(HighlightColor::Cyan.to_string(), "turquoise");
        assert_eq!(HighlightColor::None.rgb(), None);
        assert_eq!(
            HighlightColor::from_ooxml("weird"),
            HighlightColor::Other("weird".to_string())
        );
    }
}

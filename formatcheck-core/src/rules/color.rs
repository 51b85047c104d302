//! Color range classifier
//!
//! Each named target is a hand-tuned inequality region over 8-bit RGB.
//! Regions overlap: navy is both "blue" and "darkblue".

use crate::document::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorTarget {
    Green,
    DarkBlue,
    Red,
    Blue,
    Turquoise,
}

impl ColorTarget {
    /// Case-insensitive lookup; spaces, dashes and underscores are ignored
    /// so "Dark Blue", "dark_blue" and "DarkBlue" all resolve.
    pub fn from_name(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "green" => Some(Self::Green),
            "darkblue" => Some(Self::DarkBlue),
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "turquoise" => Some(Self::Turquoise),
            _ => None,
        }
    }

    /// Canonical lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::DarkBlue => "darkblue",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Turquoise => "turquoise",
        }
    }

    /// CamelCase suffix used in check identifiers (`colorDarkBlue`)
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::DarkBlue => "DarkBlue",
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Turquoise => "Turquoise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::DarkBlue => "Dark blue",
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Turquoise => "Turquoise",
        }
    }

    pub fn contains(&self, rgb: Rgb) -> bool {
        let (r, g, b) = (rgb.r, rgb.g, rgb.b);
        match self {
            Self::Green => g > 100 && r < 150 && b < 150,
            Self::DarkBlue => b > 50 && r < 80 && g < 80 && b > r && b > g,
            Self::Red => r > 150 && g < 100 && b < 100,
            Self::Blue => b > 100 && r < 150 && g < 150,
            Self::Turquoise => g > 150 && b > 150 && r < 120,
        }
    }
}

/// Classify an optional color against a target name.
///
/// Absent colors and unknown names never match.
pub fn is_in_range(rgb: Option<Rgb>, target_name: &str) -> bool {
    match (rgb, ColorTarget::from_name(target_name)) {
        (Some(rgb), Some(target)) => target.contains(rgb),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_green_region() {
        assert!(is_in_range(Some(Rgb::new(50, 180, 60)), "green"));
        assert!(!is_in_range(Some(Rgb::new(0, 0, 0)), "green"));
        // Word's standard "Green" swatch
        assert!(is_in_range(Rgb::from_hex("00B050"), "green"));
    }

    #[test]
    fn test_dark_blue_region() {
        assert!(is_in_range(Rgb::from_hex("002060"), "darkblue"));
        assert!(is_in_range(Rgb::from_hex("002060"), "Dark Blue"));
        assert!(!is_in_range(Rgb::from_hex("0070C0"), "darkblue"));
    }

    #[test]
    fn test_red_blue_turquoise_regions() {
        assert!(is_in_range(Rgb::from_hex("FF0000"), "red"));
        assert!(is_in_range(Rgb::from_hex("0070C0"), "blue"));
        assert!(is_in_range(Rgb::from_hex("00FFFF"), "turquoise"));
        assert!(!is_in_range(Rgb::from_hex("FFFF00"), "turquoise"));
    }

    #[test]
    fn test_regions_may_overlap() {
        let navy = Rgb::new(0, 0, 128);
        assert!(ColorTarget::Blue.contains(navy));
        assert!(ColorTarget::DarkBlue.contains(navy));
        let sea = Rgb::new(0, 120, 120);
        assert!(ColorTarget::Green.contains(sea));
        assert!(ColorTarget::Blue.contains(sea));
    }

    #[test]
    fn test_absent_color_or_unknown_name() {
        assert!(!is_in_range(None, "green"));
        assert!(!is_in_range(Some(Rgb::new(50, 180, 60)), "chartreuse"));
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

pub const COLOR: &str = "color";
pub const BACKGROUND_COLOR: &str = "background-color";
pub const FONT_SIZE: &str = "font-size";
pub const FONT_FAMILY: &str = "font-family";

pub const DEFAULT_FONT_COLOR: &str = "#000";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#fff";
pub const DEFAULT_FONT_SIZE: &str = "15px";
pub const DEFAULT_FONT_SIZE_PX: u32 = 15;

/// Sizes at or below this are rejected by the font-size stepper.
pub const MIN_FONT_SIZE_PX: u32 = 5;

/// Style overrides cleared by "clear formatting".
pub const CLEARABLE_PROPERTIES: [&str; 4] = [COLOR, BACKGROUND_COLOR, FONT_FAMILY, FONT_SIZE];

static DECLARATION_RE: OnceLock<Regex> = OnceLock::new();
static FONT_SIZE_RE: OnceLock<Regex> = OnceLock::new();
static HEX_COLOR_RE: OnceLock<Regex> = OnceLock::new();

/// Inline style of a text run: CSS property name to value.
///
/// Serialized as a CSS declaration list (`"color: #f00; font-size: 18px"`),
/// with properties in sorted order so equal maps serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CSS declaration list. Malformed declarations are skipped.
    pub fn parse(css: &str) -> Self {
        let re = DECLARATION_RE
            .get_or_init(|| Regex::new(r"^\s*([A-Za-z-]+)\s*:\s*(.*?)\s*$").unwrap());
        let mut map = BTreeMap::new();
        for decl in css.split(';') {
            if let Some(caps) = re.captures(decl) {
                let value = &caps[2];
                if !value.is_empty() {
                    map.insert(caps[1].to_ascii_lowercase(), value.to_string());
                }
            }
        }
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set (`Some`) or remove (`None`) a property.
    pub fn patch(&mut self, key: &str, value: Option<&str>) {
        match value {
            Some(v) if !v.trim().is_empty() => {
                self.0.insert(key.to_string(), v.trim().to_string());
            }
            _ => {
                self.0.remove(key);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl From<String> for StyleMap {
    fn from(css: String) -> Self {
        Self::parse(&css)
    }
}

impl From<StyleMap> for String {
    fn from(style: StyleMap) -> Self {
        style.to_css()
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Parse a font size such as `"15px"` or `"15"` into whole pixels.
pub fn parse_font_size(value: &str) -> Option<u32> {
    let re = FONT_SIZE_RE.get_or_init(|| Regex::new(r"^\s*(\d+)(?:\.\d+)?\s*(?:px)?\s*$").unwrap());
    re.captures(value).and_then(|caps| caps[1].parse().ok())
}

pub fn format_font_size(px: u32) -> String {
    format!("{}px", px)
}

/// Parse `#rgb` or `#rrggbb` into an RGB triple.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let re = HEX_COLOR_RE
        .get_or_init(|| Regex::new(r"^\s*#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})\s*$").unwrap());
    let caps = re.captures(value)?;
    let hex = &caps[1];
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    if hex.len() == 3 {
        let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
        Some((expand(0)?, expand(1)?, expand(2)?))
    } else {
        Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?))
    }
}

pub fn format_hex_color(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let style = StyleMap::parse("color: #ff0000;  font-size:18px ; bogus");
        assert_eq!(style.get(COLOR), Some("#ff0000"));
        assert_eq!(style.get(FONT_SIZE), Some("18px"));
        assert_eq!(style.get(BACKGROUND_COLOR), None);
    }

    #[test]
    fn test_css_is_sorted_and_stable() {
        let a = StyleMap::parse("font-size: 18px; color: #000");
        let b = StyleMap::parse("color: #000; font-size: 18px");
        assert_eq!(a, b);
        assert_eq!(a.to_css(), "color: #000; font-size: 18px");
    }

    #[test]
    fn test_patch_sets_and_removes() {
        let mut style = StyleMap::new();
        style.patch(COLOR, Some("#123456"));
        assert_eq!(style.get(COLOR), Some("#123456"));
        style.patch(COLOR, None);
        assert!(style.is_empty());
    }

    #[test]
    fn test_empty_string_deserializes_to_empty_map() {
        let style: StyleMap = serde_json::from_str("\"\"").unwrap();
        assert!(style.is_empty());
    }

    #[test]
    fn test_parse_font_size() {
        assert_eq!(parse_font_size("15px"), Some(15));
        assert_eq!(parse_font_size(" 22 "), Some(22));
        assert_eq!(parse_font_size("12.5px"), Some(12));
        assert_eq!(parse_font_size(""), None);
        assert_eq!(parse_font_size("large"), None);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#000"), Some((0, 0, 0)));
        assert_eq!(parse_hex_color("#fff"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("#1a2B3c"), Some((0x1a, 0x2b, 0x3c)));
        assert_eq!(parse_hex_color("red"), None);
        assert_eq!(format_hex_color(0x1a, 0x2b, 0x3c), "#1a2b3c");
    }
}

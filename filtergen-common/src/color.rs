//! Color value parsing and normalization
//!
//! Author-supplied color values are hex strings (`#RRGGBB` or `#RRGGBBAA`,
//! alpha defaulting to 255). The output rule language wants a 4-integer
//! space-separated string (`"R G B A"`). A `-1` or a `"disabled:*"` string
//! is a sentinel meaning "use the layered default".

use serde::{Deserialize, Serialize};

/// Default text and border color (opaque white)
pub const DEFAULT_WHITE: &str = "255 255 255 255";
/// Default background color (opaque black)
pub const DEFAULT_BLACK: &str = "0 0 0 255";

/// A color value as it appears in a configuration document.
///
/// Documents carry either a hex string or a numeric sentinel, so this is an
/// untagged union; anything that does not parse as a hex color resolves to
/// the caller-supplied default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Numeric sentinel (`-1` means "disabled, use default")
    Sentinel(i64),
    /// Hex color string, or a `"disabled:*"` sentinel
    Text(String),
}

impl ColorSpec {
    /// Normalize to `"R G B A"`, falling back to `default` for sentinels
    /// and unparsable values.
    pub fn resolve(&self, default: &str) -> String {
        match self {
            ColorSpec::Sentinel(_) => default.to_string(),
            ColorSpec::Text(s) => parse_hex(s).unwrap_or_else(|| default.to_string()),
        }
    }
}

/// Resolve an optional document color against a layered default.
pub fn resolve_color(value: Option<&ColorSpec>, default: &str) -> String {
    match value {
        Some(spec) => spec.resolve(default),
        None => default.to_string(),
    }
}

/// Parse `#RRGGBB` / `#RRGGBBAA` into `"R G B A"` (alpha defaults to 255).
fn parse_hex(value: &str) -> Option<String> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    let a = if hex.len() == 8 {
        u8::from_str_radix(&hex[6..8], 16).ok()?
    } else {
        255
    };
    Some(format!("{} {} {} {}", r, g, b, a))
}

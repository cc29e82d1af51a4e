use serde::{Deserialize, Deserializer};

use crate::error::ShowError;

pub type Rgb = (u8, u8, u8);

pub const WHITE: Rgb = (255, 255, 255);

// Light cyan rocket body
pub const ROCKET_COLOR: Rgb = (224, 255, 255);

/// Inner/halo colour pair shared by every particle of one burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Palette {
    #[serde(deserialize_with = "hex_color")]
    pub inner: Rgb,
    #[serde(deserialize_with = "hex_color")]
    pub halo: Rgb,
}

impl Palette {
    /// Bright cyan core with an electric blue halo.
    pub const MYSTIC_BLUE: Palette = Palette {
        inner: (0, 255, 255),
        halo: (0, 100, 255),
    };
}

pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

pub fn parse_color(raw: &str) -> Result<Rgb, ShowError> {
    parse_hex_color(raw).ok_or_else(|| ShowError::InvalidColor(raw.to_string()))
}

/// Serde adapter for `"#RRGGBB"` strings.
pub fn hex_color<'de, D>(deserializer: D) -> Result<Rgb, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_hex_color(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{}'", raw)))
}

/// Tile value → color lookup.
///
/// Defaults follow the classic 2048 stylesheet. Values missing from the
/// table use the "super" color. Entries can be overridden from the
/// `[palette]` section of config.toml.

use std::collections::{BTreeMap, HashMap};

use crossterm::style::Color;

/// Board background behind the tiles.
pub const BOARD_BG: Color = Color::Rgb { r: 119, g: 110, b: 101 };
/// Text on light tiles (values below 8).
pub const TEXT_DARK: Color = Color::Rgb { r: 119, g: 110, b: 101 };
/// Text on saturated tiles (8 and up).
pub const TEXT_LIGHT: Color = Color::Rgb { r: 249, g: 246, b: 242 };

const DEFAULTS: &[(u32, &str)] = &[
    (2, "eee4da"),
    (4, "ede0c8"),
    (8, "f2b179"),
    (16, "f59563"),
    (32, "f59563"),
    (64, "f65e3b"),
    (128, "edcf72"),
    (256, "edcc61"),
    (512, "edc850"),
    (1024, "edc53f"),
    (2048, "edc22e"),
];
const DEFAULT_SUPER: &str = "3c3a32";

#[derive(Clone, Debug)]
pub struct Palette {
    colors: HashMap<u32, Color>,
    fallback: Color,
}

impl Palette {
    /// Default table with config overrides applied. Invalid entries are
    /// skipped with a warning.
    pub fn from_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut palette = Palette::default();
        for (key, hex) in overrides {
            let Some(color) = parse_hex(hex) else {
                tracing::warn!(key = %key, hex = %hex, "ignoring palette entry: bad color");
                continue;
            };
            if key.eq_ignore_ascii_case("super") {
                palette.fallback = color;
            } else if let Ok(value) = key.parse::<u32>() {
                palette.colors.insert(value, color);
            } else {
                tracing::warn!(key = %key, "ignoring palette entry: bad tile value");
            }
        }
        palette
    }

    /// Background color for a tile value.
    pub fn tile_color(&self, value: u32) -> Color {
        self.colors.get(&value).copied().unwrap_or(self.fallback)
    }

    /// Foreground color for the number printed on a tile.
    pub fn text_color(value: u32) -> Color {
        if value >= 8 { TEXT_LIGHT } else { TEXT_DARK }
    }
}

impl Default for Palette {
    fn default() -> Self {
        let colors = DEFAULTS
            .iter()
            .filter_map(|&(v, hex)| parse_hex(hex).map(|c| (v, c)))
            .collect();
        Palette {
            colors,
            fallback: parse_hex(DEFAULT_SUPER).unwrap_or(Color::DarkGrey),
        }
    }
}

/// Parse `rrggbb` (optionally prefixed with `#`) into an RGB color.
pub fn parse_hex(s: &str) -> Option<Color> {
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 || !s.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
    Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
}

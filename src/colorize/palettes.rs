//! Categorical palettes for feature coloring
//!
//! Two sources of colors:
//! - a generator producing evenly spaced hues for any number of categories
//! - named palettes loaded from palettes.json (embedded at compile time)
//!
//! Either way a palette for `n` categories has exactly `n` entries. Past the
//! distinct-color budget colors repeat cyclically.

use super::error::{DisplayError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, error, warn};

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Number of distinct hues the generator spreads around the color wheel
pub const MAX_DISTINCT_COLORS: usize = 24;

/// Saturation of generated colors
const GENERATED_SATURATION: f64 = 0.7;

/// Lightness of generated colors; odd positions use the second value so
/// neighbouring hues stay apart
const GENERATED_LIGHTNESS: [f64; 2] = [0.45, 0.6];

/// Palette name selecting the hue generator instead of a named palette
pub const GENERATED_PALETTE: &str = "generated";

/// An RGB color
pub type Rgb = [u8; 3];

/// Generate `count` colors with the default distinct-color budget
///
/// Pure and deterministic: the same count always gives the same colors.
pub fn generate_palette(count: usize) -> Vec<Rgb> {
    generate_palette_with_budget(count, MAX_DISTINCT_COLORS)
}

/// Generate `count` colors, at most `max_distinct` of them distinct
///
/// Hues are spaced evenly over `min(count, max_distinct)` slots; position
/// `i` beyond the budget reuses slot `i % max_distinct`.
pub fn generate_palette_with_budget(count: usize, max_distinct: usize) -> Vec<Rgb> {
    let slots = count.min(max_distinct.max(1));
    (0..count)
        .map(|i| {
            let slot = i % slots;
            let hue = slot as f64 * 360.0 / slots as f64;
            hsl_to_rgb(
                hue,
                GENERATED_SATURATION,
                GENERATED_LIGHTNESS[slot % GENERATED_LIGHTNESS.len()],
            )
        })
        .collect()
}

/// Convert HSL (hue in degrees, saturation and lightness in [0, 1]) to RGB
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> Rgb {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - chroma / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

/// Which colors to hand to the expression compiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteChoice {
    /// Evenly spaced hues, at most `max_distinct` distinct colors
    Generated { max_distinct: usize },
    /// A palette from palettes.json, looked up by name
    Named(String),
}

impl Default for PaletteChoice {
    fn default() -> Self {
        PaletteChoice::Generated {
            max_distinct: MAX_DISTINCT_COLORS,
        }
    }
}

impl PaletteChoice {
    /// Parse a `palette` property value
    ///
    /// `generated` selects the generator; anything else must name a palette
    /// in the registry.
    pub fn parse(name: &str, max_distinct: usize) -> Result<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(GENERATED_PALETTE) {
            return Ok(PaletteChoice::Generated { max_distinct });
        }
        match registry().get(name) {
            Some(def) => Ok(PaletteChoice::Named(def.name.clone())),
            None => Err(DisplayError::Config(format!(
                "Unknown palette '{}' (available: {}, {})",
                name,
                GENERATED_PALETTE,
                registry().names().join(", ")
            ))),
        }
    }

    /// Exactly `count` colors from this source
    pub fn palette_for(&self, count: usize) -> Vec<Rgb> {
        match self {
            PaletteChoice::Generated { max_distinct } => {
                generate_palette_with_budget(count, *max_distinct)
            }
            PaletteChoice::Named(name) => match registry().get(name) {
                Some(def) => (0..count).map(|i| def.get_color(i)).collect(),
                None => {
                    warn!(palette = %name, "named palette missing, generating colors instead");
                    generate_palette(count)
                }
            },
        }
    }
}

/// Raw palette entry in palettes.json
#[derive(Debug, Deserialize)]
struct RawPalette {
    name: String,
    colors: Vec<String>,
}

/// A named categorical palette
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<Rgb>,
}

impl PaletteDefinition {
    /// Get a color by index (wraps around)
    pub fn get_color(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Registry of named categorical palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// Palettes by lowercase name (case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    /// Names in file order (for listing)
    names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from a JSON array of `{name, colors}` objects
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawPalette> = serde_json::from_str(json)
            .map_err(|e| DisplayError::Palette(format!("Failed to parse palettes JSON: {}", e)))?;

        let mut registry = Self::default();
        for entry in raw {
            let colors = entry
                .colors
                .iter()
                .map(|hex| {
                    parse_hex_color(hex).ok_or_else(|| {
                        DisplayError::Palette(format!(
                            "Palette '{}' has invalid color '{}'",
                            entry.name, hex
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            if colors.is_empty() {
                return Err(DisplayError::Palette(format!(
                    "Palette '{}' has no colors",
                    entry.name
                )));
            }

            registry.names.push(entry.name.clone());
            registry.palettes.insert(
                entry.name.to_lowercase(),
                PaletteDefinition {
                    name: entry.name,
                    colors,
                },
            );
        }

        debug!(count = registry.names.len(), "loaded palette registry");
        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Palette names in definition order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Global palette registry, loaded from the embedded JSON on first access
pub fn registry() -> &'static PaletteRegistry {
    static REGISTRY: OnceLock<PaletteRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
            error!(error = %e, "failed to load palettes.json");
            PaletteRegistry::default()
        })
    })
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` and `RRGGBBAA` (without #)
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if (hex.len() != 6 && hex.len() != 8) || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}

/// Format an RGB color as lowercase `#rrggbb`
pub fn format_hex_color(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

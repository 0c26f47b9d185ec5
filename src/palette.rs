//! Colour palettes and muted styling.
//!
//! Palettes are resolved from names such as `"Category10_10"` into a fixed
//! table of hex colours, then handed out in an endless cycle:
//!
//! ```
//! let mut colors = figkit::palette::palette("Category10_10").unwrap();
//! assert_eq!(colors.next(), Some("#1f77b4"));
//! assert_eq!(colors.next(), Some("#ff7f0e"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{FigureError, Result};
use crate::setting::Settings;

/// Muted alpha used when none is given
pub const DEFAULT_MUTED_ALPHA: f32 = 0.2;

/// Palette used when none is named
pub const DEFAULT_PALETTE: PaletteName = PaletteName {
    family: PaletteFamily::Category10,
    size: 10,
};

pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c",
    "#98df8a", "#d62728", "#ff9896", "#9467bd", "#c5b0d5",
    "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f",
    "#c7c7c7", "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

pub const COLORBLIND: [&str; 8] = [
    "#0072B2", "#E69F00", "#F0E442", "#009E73",
    "#56B4E9", "#D55E00", "#CC79A7", "#000000",
];

/// Supported palette families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteFamily {
    Category10,
    Category20,
    Colorblind,
}

impl PaletteFamily {
    /// All supported families
    pub fn all() -> [PaletteFamily; 3] {
        [
            PaletteFamily::Category10,
            PaletteFamily::Category20,
            PaletteFamily::Colorblind,
        ]
    }

    /// Family prefix as it appears in palette names
    pub fn prefix(&self) -> &'static str {
        match self {
            PaletteFamily::Category10 => "Category10",
            PaletteFamily::Category20 => "Category20",
            PaletteFamily::Colorblind => "Colorblind",
        }
    }

    /// Full colour table of the family
    fn table(&self) -> &'static [&'static str] {
        match self {
            PaletteFamily::Category10 => &CATEGORY10,
            PaletteFamily::Category20 => &CATEGORY20,
            PaletteFamily::Colorblind => &COLORBLIND,
        }
    }

    /// Smallest size the family is published in
    pub fn min_size(&self) -> usize {
        3
    }

    /// Largest size the family is published in
    pub fn max_size(&self) -> usize {
        self.table().len()
    }
}

/// A palette family together with its size, e.g. `Category20_3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaletteName {
    family: PaletteFamily,
    size: usize,
}

impl PaletteName {
    /// Build a palette name, rejecting sizes the family doesn't publish
    pub fn new(family: PaletteFamily, size: usize) -> Result<Self> {
        if size < family.min_size() || size > family.max_size() {
            return Err(FigureError::UnknownPalette(format!("{}_{}", family.prefix(), size)));
        }
        Ok(Self { family, size })
    }

    pub fn family(&self) -> PaletteFamily {
        self.family
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Colours of this palette, in order
    pub fn colors(&self) -> &'static [&'static str] {
        &self.family.table()[..self.size]
    }

    /// Start a fresh cycle over the palette
    pub fn cycle(&self) -> PaletteCycle {
        PaletteCycle::new(self.colors())
    }
}

impl Default for PaletteName {
    fn default() -> Self {
        DEFAULT_PALETTE
    }
}

impl fmt::Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.family.prefix(), self.size)
    }
}

impl FromStr for PaletteName {
    type Err = FigureError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || FigureError::UnknownPalette(s.to_string());

        let (prefix, size) = s.rsplit_once('_').ok_or_else(unknown)?;
        let family = PaletteFamily::all()
            .into_iter()
            .find(|family| family.prefix() == prefix)
            .ok_or_else(unknown)?;
        let size: usize = size.parse().map_err(|_| unknown())?;

        PaletteName::new(family, size).map_err(|_| unknown())
    }
}

/// Endless iterator over a palette's colours
#[derive(Debug, Clone)]
pub struct PaletteCycle {
    colors: &'static [&'static str],
    cursor: usize,
}

impl PaletteCycle {
    fn new(colors: &'static [&'static str]) -> Self {
        Self { colors, cursor: 0 }
    }

    /// Number of distinct colours before the cycle wraps
    pub fn period(&self) -> usize {
        self.colors.len()
    }
}

impl Iterator for PaletteCycle {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.colors.is_empty() {
            return None;
        }
        let color = self.colors[self.cursor];
        self.cursor = (self.cursor + 1) % self.colors.len();
        Some(color)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.colors.is_empty() {
            (0, Some(0))
        } else {
            (usize::MAX, None)
        }
    }
}

/// Return the named palette as an endless colour cycle
pub fn palette(name: &str) -> Result<PaletteCycle> {
    let name: PaletteName = name.parse()?;
    tracing::debug!("palette resolved: {}", name);
    Ok(name.cycle())
}

/// Return the default palette (`Category10_10`) as an endless colour cycle
pub fn default_palette() -> PaletteCycle {
    DEFAULT_PALETTE.cycle()
}

/// Return the palette configured under `palette.default`
pub fn palette_from_settings(settings: &Settings) -> Result<PaletteCycle> {
    match settings.get_string("palette.default") {
        Some(name) => palette(&name),
        None => Ok(default_palette()),
    }
}

/// Colour, muted colour and muted alpha of one glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutedStyle {
    pub color: String,
    pub muted_color: String,
    pub muted_alpha: f32,
}

/// Style drawing with `color`, fading to the same colour at the default alpha when muted
pub fn muted_color(color: &str) -> MutedStyle {
    muted_color_with_alpha(color, DEFAULT_MUTED_ALPHA)
}

/// Style drawing with `color`, fading to the same colour at `alpha` when muted
pub fn muted_color_with_alpha(color: &str, alpha: f32) -> MutedStyle {
    MutedStyle {
        color: color.to_string(),
        muted_color: color.to_string(),
        muted_alpha: alpha,
    }
}

/// Style drawing with `color`, fading at the alpha configured under `palette.muted_alpha`
pub fn muted_color_from_settings(color: &str, settings: &Settings) -> MutedStyle {
    let alpha = settings
        .get_float("palette.muted_alpha")
        .map_or(DEFAULT_MUTED_ALPHA, |a| a as f32);
    muted_color_with_alpha(color, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette() {
        let mut colors = palette("Category10_10").unwrap();
        assert_eq!(colors.next(), Some("#1f77b4"));
        assert_eq!(colors.next(), Some("#ff7f0e"));

        let mut colors = default_palette();
        assert_eq!(colors.next(), Some("#1f77b4"));
    }

    #[test]
    fn test_named_palette() {
        let mut colors = palette("Category20_3").unwrap();
        assert_eq!(colors.next(), Some("#1f77b4"));
        assert_eq!(colors.next(), Some("#aec7e8"));
        assert_eq!(colors.next(), Some("#ff7f0e"));
        assert_eq!(colors.next(), Some("#1f77b4"));
    }

    #[test]
    fn test_cycle_wraps_after_full_length() {
        let mut colors = default_palette();
        let period = colors.period();
        assert_eq!(period, 10);
        let first = colors.next();
        for _ in 1..period {
            colors.next();
        }
        assert_eq!(colors.next(), first);
    }

    #[test]
    fn test_each_call_restarts() {
        let mut a = default_palette();
        a.next();
        a.next();
        let mut b = default_palette();
        assert_eq!(b.next(), Some("#1f77b4"));
    }

    #[test]
    fn test_unknown_palette() {
        for name in ["Category10", "Category10_2", "Category10_11", "Viridis_5", "Category10_x", ""] {
            let err = palette(name).unwrap_err();
            assert!(matches!(err, FigureError::UnknownPalette(ref n) if n == name), "{name}");
        }
    }

    #[test]
    fn test_palette_name_display_round_trip() {
        let name: PaletteName = "Colorblind_8".parse().unwrap();
        assert_eq!(name.family(), PaletteFamily::Colorblind);
        assert_eq!(name.size(), 8);
        assert_eq!(name.to_string(), "Colorblind_8");
        assert_eq!(name.colors().last(), Some(&"#000000"));
    }

    #[test]
    fn test_palette_from_settings() {
        let settings = Settings::with_defaults();
        settings.set("palette.default", crate::setting::SettingValue::String("Category20_20".to_string()));
        let colors = palette_from_settings(&settings).unwrap();
        assert_eq!(colors.period(), 20);
    }

    #[test]
    fn test_muted_color() {
        let c = default_palette().next().unwrap();
        let style = muted_color(c);
        assert_eq!(style.color, "#1f77b4");
        assert_eq!(style.muted_color, "#1f77b4");
        assert_eq!(style.muted_alpha, 0.2);

        let style = muted_color_with_alpha(c, 0.5);
        assert_eq!(style.muted_alpha, 0.5);
    }

    #[test]
    fn test_muted_color_from_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(muted_color_from_settings("#2ca02c", &settings).muted_alpha, 0.2);

        settings.set("palette.muted_alpha", crate::setting::SettingValue::Float(0.35));
        let style = muted_color_from_settings("#2ca02c", &settings);
        assert_eq!(style.color, "#2ca02c");
        assert_eq!(style.muted_alpha, 0.35);
    }

    #[test]
    fn test_muted_color_serializes_as_mapping() {
        let value = serde_json::to_value(muted_color("#ff7f0e")).unwrap();
        assert_eq!(value["color"], "#ff7f0e");
        assert_eq!(value["muted_color"], "#ff7f0e");
        assert!((value["muted_alpha"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }
}

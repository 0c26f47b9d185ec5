//! Base constants and utility functions for the chart module.

use egui::{Color32, Pos2, Rect};

use crate::error::{FigureError, Result};

// Chart colors
pub const WHITE_COLOR: Color32 = Color32::from_rgb(255, 255, 255);
pub const BLACK_COLOR: Color32 = Color32::from_rgb(0, 0, 0);
pub const GREY_COLOR: Color32 = Color32::from_rgb(100, 100, 100);
pub const GRID_COLOR: Color32 = Color32::from_rgb(230, 230, 230);
pub const BACKGROUND_COLOR: Color32 = Color32::from_rgb(255, 255, 255);

// Default glyph color when none is given
pub const DEFAULT_GLYPH_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);

// Layout constants
pub const MARGIN: f32 = 5.0;
pub const TITLE_HEIGHT: f32 = 22.0;
pub const AXIS_X_HEIGHT: f32 = 32.0;
pub const AXIS_Y_WIDTH: f32 = 64.0;
pub const LEGEND_ROW_HEIGHT: f32 = 18.0;
pub const LEGEND_SWATCH_WIDTH: f32 = 18.0;
pub const TOOLTIP_PADDING: f32 = 6.0;

/// Fraction of the data span added on each side when auto-ranging
pub const RANGE_PADDING: f64 = 0.05;

/// Pixel distance within which the pointer hits a line point
pub const HIT_TOLERANCE: f32 = 8.0;

/// Parse `#rrggbb`, `#rrggbbaa` or a basic colour name
pub fn parse_color(color: &str) -> Result<Color32> {
    let invalid = || FigureError::InvalidColor(color.to_string());

    if let Some(hex) = color.strip_prefix('#') {
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(invalid)
        };
        return match hex.len() {
            6 => Ok(Color32::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color32::from_rgba_unmultiplied(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        };
    }

    match color.to_ascii_lowercase().as_str() {
        "black" => Ok(BLACK_COLOR),
        "white" => Ok(WHITE_COLOR),
        "red" => Ok(Color32::from_rgb(255, 0, 0)),
        "green" => Ok(Color32::from_rgb(0, 128, 0)),
        "blue" => Ok(Color32::from_rgb(0, 0, 255)),
        "grey" | "gray" => Ok(Color32::from_rgb(128, 128, 128)),
        "orange" => Ok(Color32::from_rgb(255, 165, 0)),
        "navy" => Ok(Color32::from_rgb(0, 0, 128)),
        _ => Err(invalid()),
    }
}

/// Apply an opacity in `0.0..=1.0` to a colour
pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    color.gamma_multiply(alpha.clamp(0.0, 1.0))
}

/// Insert thousands separators into the integer part of a formatted number
pub fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.find('.') {
        Some(pos) => rest.split_at(pos),
        None => (rest, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}{}", sign, grouped, frac_part)
}

/// Format a number with fixed decimals
pub fn format_number(value: f64, decimals: usize) -> String {
    format!("{:.prec$}", value, prec = decimals)
}

/// Format a number with units (K, M, B) for axis labels
pub fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if magnitude >= 10_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else if value == value.trunc() {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.3}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Calculate nice axis tick values
pub fn calculate_axis_ticks(min_val: f64, max_val: f64, max_ticks: usize) -> Vec<f64> {
    if min_val >= max_val || max_ticks == 0 {
        return vec![min_val];
    }

    let range = max_val - min_val;
    let rough_step = range / max_ticks as f64;

    // Find the magnitude of the step
    let magnitude = 10.0_f64.powf(rough_step.log10().floor());
    let residual = rough_step / magnitude;

    // Choose a nice step value
    let nice_step = if residual <= 1.5 {
        magnitude
    } else if residual <= 3.0 {
        2.0 * magnitude
    } else if residual <= 7.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    };

    let mut ticks = Vec::new();
    let start = (min_val / nice_step).ceil() * nice_step;
    let mut i = 0;
    loop {
        let value = start + nice_step * i as f64;
        if value > max_val {
            break;
        }
        ticks.push(value);
        i += 1;
    }

    ticks
}

/// Data-space rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    /// Empty bounds that any point will extend
    pub fn nothing() -> Self {
        Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.x_min.is_finite() && self.x_max.is_finite() && self.y_min.is_finite() && self.y_max.is_finite()
    }

    pub fn extend_x(&mut self, x: f64) {
        if x.is_finite() {
            self.x_min = self.x_min.min(x);
            self.x_max = self.x_max.max(x);
        }
    }

    pub fn extend_y(&mut self, y: f64) {
        if y.is_finite() {
            self.y_min = self.y_min.min(y);
            self.y_max = self.y_max.max(y);
        }
    }

    pub fn extend(&mut self, x: f64, y: f64) {
        self.extend_x(x);
        self.extend_y(y);
    }

    pub fn union(&mut self, other: &Bounds) {
        self.extend(other.x_min, other.y_min);
        self.extend(other.x_max, other.y_max);
    }

    /// Widen by `fraction` of the span on each side; zero spans get ±0.5
    pub fn padded(&self, fraction: f64) -> Bounds {
        let pad = |min: f64, max: f64| {
            let span = max - min;
            if span == 0.0 {
                (min - 0.5, max + 0.5)
            } else {
                (min - span * fraction, max + span * fraction)
            }
        };
        let (x_min, x_max) = pad(self.x_min, self.x_max);
        let (y_min, y_max) = pad(self.y_min, self.y_max);
        Bounds { x_min, x_max, y_min, y_max }
    }
}

/// Maps data coordinates into a screen rectangle and back
#[derive(Debug, Clone, Copy)]
pub struct PlotTransform {
    pub rect: Rect,
    pub bounds: Bounds,
}

impl PlotTransform {
    pub fn new(rect: Rect, bounds: Bounds) -> Self {
        Self { rect, bounds }
    }

    pub fn x_to_screen(&self, x: f64) -> f32 {
        let span = self.bounds.x_max - self.bounds.x_min;
        if span == 0.0 {
            return self.rect.center().x;
        }
        let normalized = (x - self.bounds.x_min) / span;
        self.rect.left() + normalized as f32 * self.rect.width()
    }

    pub fn y_to_screen(&self, y: f64) -> f32 {
        let span = self.bounds.y_max - self.bounds.y_min;
        if span == 0.0 {
            return self.rect.center().y;
        }
        let normalized = (y - self.bounds.y_min) / span;
        self.rect.bottom() - normalized as f32 * self.rect.height()
    }

    pub fn to_screen(&self, x: f64, y: f64) -> Pos2 {
        Pos2::new(self.x_to_screen(x), self.y_to_screen(y))
    }

    /// Screen position back to data coordinates
    pub fn to_data(&self, pos: Pos2) -> (f64, f64) {
        let nx = ((pos.x - self.rect.left()) / self.rect.width()) as f64;
        let ny = ((self.rect.bottom() - pos.y) / self.rect.height()) as f64;
        (
            self.bounds.x_min + nx * (self.bounds.x_max - self.bounds.x_min),
            self.bounds.y_min + ny * (self.bounds.y_max - self.bounds.y_min),
        )
    }

    /// Screen length of a data-space width along x
    pub fn dx_to_screen(&self, dx: f64) -> f32 {
        let span = self.bounds.x_max - self.bounds.x_min;
        if span == 0.0 {
            return 0.0;
        }
        (dx / span) as f32 * self.rect.width()
    }

    /// Screen length of a data-space height along y
    pub fn dy_to_screen(&self, dy: f64) -> f32 {
        let span = self.bounds.y_max - self.bounds.y_min;
        if span == 0.0 {
            return 0.0;
        }
        (dy / span) as f32 * self.rect.height()
    }
}

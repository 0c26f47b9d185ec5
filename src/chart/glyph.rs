//! Glyph primitives and the renderers that bind them to data sources.

use egui::{Color32, TextureHandle};

use crate::error::{FigureError, Result};
use crate::palette::{MutedStyle, DEFAULT_MUTED_ALPHA};
use crate::source::{read_source, ColumnDataSource, SharedSource};
use super::base::{parse_color, Bounds, DEFAULT_GLYPH_COLOR};

/// A glyph coordinate: either a column of the source or a constant
#[derive(Debug, Clone, PartialEq)]
pub enum Coord {
    Field(String),
    Value(f64),
}

impl Coord {
    /// Resolve the coordinate for one row
    pub fn resolve(&self, source: &ColumnDataSource, row: usize) -> Option<f64> {
        match self {
            Coord::Field(name) => source.value(name, row),
            Coord::Value(v) => Some(*v),
        }
    }

    /// Column name, if the coordinate reads one
    pub fn field(&self) -> Option<&str> {
        match self {
            Coord::Field(name) => Some(name),
            Coord::Value(_) => None,
        }
    }
}

impl From<&str> for Coord {
    fn from(name: &str) -> Self {
        Coord::Field(name.to_string())
    }
}

impl From<String> for Coord {
    fn from(name: String) -> Self {
        Coord::Field(name)
    }
}

impl From<f64> for Coord {
    fn from(value: f64) -> Self {
        Coord::Value(value)
    }
}

/// Drawing primitives a figure understands
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// Polyline through `(x, y)` rows; gaps break the line
    Line { x: Coord, y: Coord },
    /// One straight segment per row
    Segment { x0: Coord, y0: Coord, x1: Coord, y1: Coord },
    /// Vertical bars centred on `x`
    VBar { x: Coord, width: Coord, top: Coord, bottom: Coord },
    /// Horizontal bars centred on `y`
    HBar { y: Coord, height: Coord, right: Coord, left: Coord },
    /// Packed RGBA image of `cols × rows` pixels, stored bottom row first
    ImageRgba {
        image: String,
        cols: usize,
        rows: usize,
        x: f64,
        y: f64,
        dw: f64,
        dh: f64,
    },
}

impl Glyph {
    /// Short glyph kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Glyph::Line { .. } => "line",
            Glyph::Segment { .. } => "segment",
            Glyph::VBar { .. } => "vbar",
            Glyph::HBar { .. } => "hbar",
            Glyph::ImageRgba { .. } => "image_rgba",
        }
    }

    /// Column names this glyph reads
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Glyph::Line { x, y } => [x, y].into_iter().filter_map(Coord::field).collect(),
            Glyph::Segment { x0, y0, x1, y1 } => {
                [x0, y0, x1, y1].into_iter().filter_map(Coord::field).collect()
            }
            Glyph::VBar { x, width, top, bottom } => {
                [x, width, top, bottom].into_iter().filter_map(Coord::field).collect()
            }
            Glyph::HBar { y, height, right, left } => {
                [y, height, right, left].into_iter().filter_map(Coord::field).collect()
            }
            Glyph::ImageRgba { image, .. } => vec![image.as_str()],
        }
    }

    /// Rows drawable from `source`, limited by the columns this glyph reads
    pub fn row_count(&self, source: &ColumnDataSource) -> usize {
        source.row_count_of(self.fields())
    }

    /// Data-space extent of the glyph over all rows
    pub fn bounds(&self, source: &ColumnDataSource) -> Bounds {
        let mut bounds = Bounds::nothing();
        let rows = self.row_count(source);
        match self {
            Glyph::Line { x, y } => {
                for row in 0..rows {
                    if let (Some(x), Some(y)) = (x.resolve(source, row), y.resolve(source, row)) {
                        bounds.extend(x, y);
                    }
                }
            }
            Glyph::Segment { x0, y0, x1, y1 } => {
                for row in 0..rows {
                    if let (Some(a), Some(b)) = (x0.resolve(source, row), y0.resolve(source, row)) {
                        bounds.extend(a, b);
                    }
                    if let (Some(a), Some(b)) = (x1.resolve(source, row), y1.resolve(source, row)) {
                        bounds.extend(a, b);
                    }
                }
            }
            Glyph::VBar { x, width, top, bottom } => {
                for row in 0..rows {
                    if let Some((left, right, bottom, top)) = vbar_rect(source, row, x, width, top, bottom) {
                        bounds.extend(left, bottom);
                        bounds.extend(right, top);
                    }
                }
            }
            Glyph::HBar { y, height, right, left } => {
                for row in 0..rows {
                    if let Some((left, right, bottom, top)) = hbar_rect(source, row, y, height, right, left) {
                        bounds.extend(left, bottom);
                        bounds.extend(right, top);
                    }
                }
            }
            Glyph::ImageRgba { x, y, dw, dh, .. } => {
                bounds.extend(*x, *y);
                bounds.extend(x + dw, y + dh);
            }
        }
        bounds
    }

    /// Row under a data-space point.
    ///
    /// Bars hit when the point falls inside them; lines and segments hit the
    /// row whose x is nearest, within `x_tolerance` data units.
    pub fn hit_test(&self, source: &ColumnDataSource, x: f64, y: f64, x_tolerance: f64) -> Option<usize> {
        let rows = self.row_count(source);
        let nearest = |coord: &Coord| {
            (0..rows)
                .filter_map(|row| coord.resolve(source, row).map(|v| (row, (v - x).abs())))
                .filter(|(_, d)| *d <= x_tolerance)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(row, _)| row)
        };
        match self {
            Glyph::Line { x: xs, .. } => nearest(xs),
            Glyph::Segment { x0, .. } => nearest(x0),
            Glyph::VBar { x: xs, width, top, bottom } => (0..rows).find(|&row| {
                vbar_rect(source, row, xs, width, top, bottom)
                    .is_some_and(|(l, r, b, t)| x >= l && x <= r && y >= b && y <= t)
            }),
            Glyph::HBar { y: ys, height, right, left } => (0..rows).find(|&row| {
                hbar_rect(source, row, ys, height, right, left)
                    .is_some_and(|(l, r, b, t)| x >= l && x <= r && y >= b && y <= t)
            }),
            Glyph::ImageRgba { cols, rows: img_rows, x: x0, y: y0, dw, dh, .. } => {
                if *cols == 0 || *img_rows == 0 || x < *x0 || y < *y0 || x >= x0 + dw || y >= y0 + dh {
                    return None;
                }
                let col = ((x - x0) / dw * *cols as f64) as usize;
                let row = ((y - y0) / dh * *img_rows as f64) as usize;
                Some(row * cols + col)
            }
        }
    }
}

/// `(left, right, bottom, top)` of a vertical bar, normalised so bottom <= top
pub(crate) fn vbar_rect(
    source: &ColumnDataSource,
    row: usize,
    x: &Coord,
    width: &Coord,
    top: &Coord,
    bottom: &Coord,
) -> Option<(f64, f64, f64, f64)> {
    let x = x.resolve(source, row)?;
    let half = width.resolve(source, row)? / 2.0;
    let a = top.resolve(source, row)?;
    let b = bottom.resolve(source, row)?;
    Some((x - half, x + half, a.min(b), a.max(b)))
}

/// `(left, right, bottom, top)` of a horizontal bar, normalised so left <= right
pub(crate) fn hbar_rect(
    source: &ColumnDataSource,
    row: usize,
    y: &Coord,
    height: &Coord,
    right: &Coord,
    left: &Coord,
) -> Option<(f64, f64, f64, f64)> {
    let y = y.resolve(source, row)?;
    let half = height.resolve(source, row)? / 2.0;
    let a = right.resolve(source, row)?;
    let b = left.resolve(source, row)?;
    Some((a.min(b), a.max(b), y - half, y + half))
}

/// Visual properties of a renderer
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphStyle {
    pub line_color: Color32,
    pub fill_color: Option<Color32>,
    pub line_width: f32,
    pub alpha: f32,
    pub muted_color: Color32,
    pub muted_alpha: f32,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            line_color: DEFAULT_GLYPH_COLOR,
            fill_color: None,
            line_width: 1.0,
            alpha: 1.0,
            muted_color: DEFAULT_GLYPH_COLOR,
            muted_alpha: DEFAULT_MUTED_ALPHA,
        }
    }
}

impl GlyphStyle {
    /// Line and muted colour from a colour string
    pub fn color(color: &str) -> Result<Self> {
        let color = parse_color(color)?;
        Ok(Self {
            line_color: color,
            muted_color: color,
            ..Self::default()
        })
    }

    /// Style from a [`MutedStyle`] triple
    pub fn from_muted(style: &MutedStyle) -> Result<Self> {
        Ok(Self {
            line_color: parse_color(&style.color)?,
            muted_color: parse_color(&style.muted_color)?,
            muted_alpha: style.muted_alpha,
            ..Self::default()
        })
    }

    /// Same style with a fill colour
    pub fn with_fill(mut self, fill: &str) -> Result<Self> {
        self.fill_color = Some(parse_color(fill)?);
        Ok(self)
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Colour and opacity to stroke with, given the mute state
    pub fn stroke_color(&self, muted: bool) -> (Color32, f32) {
        if muted {
            (self.muted_color, self.muted_alpha)
        } else {
            (self.line_color, self.alpha)
        }
    }

    /// Fill colour and opacity, given the mute state
    pub fn fill(&self, muted: bool) -> (Color32, f32) {
        let base = self.fill_color.unwrap_or(self.line_color);
        if muted {
            (self.fill_color.map_or(self.muted_color, |_| base), self.muted_alpha)
        } else {
            (base, self.alpha)
        }
    }
}

/// A glyph bound to a data source, with style, name and legend entry
pub struct GlyphRenderer {
    pub(crate) glyph: Glyph,
    pub(crate) source: SharedSource,
    pub(crate) style: GlyphStyle,
    pub(crate) name: Option<String>,
    pub(crate) legend_label: Option<String>,
    pub(crate) muted: bool,
    pub(crate) visible: bool,
    /// Uploaded image and the source revision it was built from
    pub(crate) texture: Option<(u64, TextureHandle)>,
}

impl GlyphRenderer {
    pub fn new(glyph: Glyph, source: SharedSource) -> Self {
        Self {
            glyph,
            source,
            style: GlyphStyle::default(),
            name: None,
            legend_label: None,
            muted: false,
            visible: true,
            texture: None,
        }
    }

    /// Set the renderer name, used by hover tools to select renderers
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Set the legend label; renderers sharing a label share a legend item
    pub fn legend(&mut self, label: impl Into<String>) -> &mut Self {
        self.legend_label = Some(label.into());
        self
    }

    pub fn style(&mut self, style: GlyphStyle) -> &mut Self {
        self.style = style;
        self
    }

    pub fn glyph(&self) -> &Glyph {
        &self.glyph
    }

    /// The data source this renderer draws from
    pub fn source(&self) -> SharedSource {
        self.source.clone()
    }

    pub fn get_style(&self) -> &GlyphStyle {
        &self.style
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn legend_label(&self) -> Option<&str> {
        self.legend_label.as_deref()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Data-space extent of this renderer
    pub fn bounds(&self) -> Result<Bounds> {
        let source = read_source(&self.source)?;
        Ok(self.glyph.bounds(&source))
    }

    /// Check that every column the glyph reads exists in its source
    pub fn check_fields(&self) -> Result<()> {
        let source = read_source(&self.source)?;
        for field in self.glyph.fields() {
            if !source.contains(field) {
                return Err(FigureError::MissingColumn(field.to_string()));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for GlyphRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphRenderer")
            .field("glyph", &self.glyph)
            .field("name", &self.name)
            .field("legend_label", &self.legend_label)
            .field("muted", &self.muted)
            .field("visible", &self.visible)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::muted_color;
    use crate::source::{shared, Column};

    fn bars() -> ColumnDataSource {
        ColumnDataSource::from_columns([
            ("x", Column::from(vec![0.0, 1.0, 2.0])),
            ("top", Column::from(vec![3.0, -2.0, 5.0])),
        ])
    }

    #[test]
    fn test_coord_resolve() {
        let source = bars();
        assert_eq!(Coord::from("x").resolve(&source, 1), Some(1.0));
        assert_eq!(Coord::from(0.5).resolve(&source, 99), Some(0.5));
        assert_eq!(Coord::from("missing").resolve(&source, 0), None);
    }

    #[test]
    fn test_unread_empty_column_does_not_hide_line() {
        let source = ColumnDataSource::from_columns([
            ("x", Column::from(vec![0.0, 1.0, 2.0])),
            ("loss", Column::from(vec![0.9, 0.5, 0.3])),
            ("binary_accuracy", Column::from(Vec::<f64>::new())),
        ]);
        let line = Glyph::Line { x: "x".into(), y: "loss".into() };

        assert_eq!(source.row_count(), 0);
        assert_eq!(line.row_count(&source), 3);
        let bounds = line.bounds(&source);
        assert!(bounds.is_valid());
        assert_eq!(bounds.y_min, 0.3);
        assert_eq!(line.hit_test(&source, 2.1, 0.3, 0.5), Some(2));
    }

    #[test]
    fn test_vbar_bounds_include_negative_bars() {
        let glyph = Glyph::VBar {
            x: "x".into(),
            width: 0.5.into(),
            top: "top".into(),
            bottom: 0.0.into(),
        };
        let bounds = glyph.bounds(&bars());
        assert_eq!(bounds.x_min, -0.25);
        assert_eq!(bounds.x_max, 2.25);
        assert_eq!(bounds.y_min, -2.0);
        assert_eq!(bounds.y_max, 5.0);
    }

    #[test]
    fn test_vbar_hit_test() {
        let glyph = Glyph::VBar {
            x: "x".into(),
            width: 0.5.into(),
            top: "top".into(),
            bottom: 0.0.into(),
        };
        let source = bars();
        assert_eq!(glyph.hit_test(&source, 1.1, -1.0, 0.0), Some(1));
        assert_eq!(glyph.hit_test(&source, 1.1, 1.0, 0.0), None);
        assert_eq!(glyph.hit_test(&source, 0.6, 1.0, 0.0), None);
    }

    #[test]
    fn test_line_hit_test_nearest_within_tolerance() {
        let glyph = Glyph::Line { x: "x".into(), y: "top".into() };
        let source = bars();
        assert_eq!(glyph.hit_test(&source, 1.3, 0.0, 0.5), Some(1));
        assert_eq!(glyph.hit_test(&source, 1.6, 0.0, 0.5), Some(2));
        assert_eq!(glyph.hit_test(&source, 5.0, 0.0, 0.5), None);
    }

    #[test]
    fn test_image_hit_test() {
        let glyph = Glyph::ImageRgba {
            image: "image".to_string(),
            cols: 4,
            rows: 2,
            x: 0.0,
            y: 0.0,
            dw: 4.0,
            dh: 2.0,
        };
        let source = ColumnDataSource::new();
        assert_eq!(glyph.hit_test(&source, 3.5, 1.5, 0.0), Some(7));
        assert_eq!(glyph.hit_test(&source, 4.0, 1.0, 0.0), None);
    }

    #[test]
    fn test_style_from_muted() {
        let style = GlyphStyle::from_muted(&muted_color("#ff7f0e")).unwrap();
        assert_eq!(style.line_color, Color32::from_rgb(0xff, 0x7f, 0x0e));
        assert_eq!(style.stroke_color(true), (style.muted_color, 0.2));
        assert_eq!(style.stroke_color(false), (style.line_color, 1.0));
    }

    #[test]
    fn test_check_fields() {
        let source = shared(bars());
        let mut renderer = GlyphRenderer::new(Glyph::Line { x: "x".into(), y: "y".into() }, source);
        renderer.name("probe").legend("Probe");
        assert_eq!(renderer.get_name(), Some("probe"));
        assert!(matches!(renderer.check_fields(), Err(FigureError::MissingColumn(ref c)) if c == "y"));
    }
}

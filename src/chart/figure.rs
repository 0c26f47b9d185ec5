//! `Figure`: a list of glyph renderers plus tools, legend and axis settings.
//!
//! The chart helpers (`bbands`, `candle`, `hist`, `grayscale`) are extra
//! `impl Figure` blocks in their own modules; painting lives in `widget`.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::setting::Settings;
use crate::source::SharedSource;
use super::base::Bounds;
use super::glyph::{Glyph, GlyphRenderer, Coord};
use super::hover::HoverTool;

/// Axis scale of the x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisType {
    #[default]
    Linear,
    /// Values are epoch milliseconds
    Datetime,
}

/// What a click on a legend item does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickPolicy {
    #[default]
    None,
    Mute,
    Hide,
}

/// Legend settings
#[derive(Debug, Clone, Default)]
pub struct Legend {
    pub click_policy: ClickPolicy,
    pub visible: bool,
}

/// One legend row: a label and the renderers sharing it
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub label: String,
    pub renderers: Vec<usize>,
}

/// Figure construction options
#[derive(Debug, Clone)]
pub struct FigureOptions {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub x_axis_type: AxisType,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            width: 800.0,
            height: 400.0,
            x_axis_type: AxisType::Linear,
        }
    }
}

impl FigureOptions {
    /// Options with width and height taken from `figure.width` / `figure.height`
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        Self {
            width: settings.get_float("figure.width").map_or(defaults.width, |v| v as f32),
            height: settings.get_float("figure.height").map_or(defaults.height, |v| v as f32),
            ..defaults
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn x_axis_type(mut self, axis: AxisType) -> Self {
        self.x_axis_type = axis;
        self
    }
}

/// A plot: renderers drawn over shared data sources
#[derive(Debug)]
pub struct Figure {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub x_axis_type: AxisType,
    pub legend: Legend,
    pub(crate) renderers: Vec<GlyphRenderer>,
    pub(crate) tools: Vec<HoverTool>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::new(FigureOptions::default())
    }
}

impl Figure {
    pub fn new(options: FigureOptions) -> Self {
        Self {
            title: options.title,
            width: options.width,
            height: options.height,
            x_axis_type: options.x_axis_type,
            legend: Legend {
                click_policy: ClickPolicy::None,
                visible: true,
            },
            renderers: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Add a renderer for `glyph` and return it for styling
    pub fn add_glyph(&mut self, glyph: Glyph, source: SharedSource) -> &mut GlyphRenderer {
        tracing::debug!("figure '{}' adds {} renderer", self.title, glyph.kind());
        let index = self.renderers.len();
        self.renderers.push(GlyphRenderer::new(glyph, source));
        &mut self.renderers[index]
    }

    /// Polyline through `(x, y)`
    pub fn line(&mut self, x: impl Into<Coord>, y: impl Into<Coord>, source: SharedSource) -> &mut GlyphRenderer {
        self.add_glyph(Glyph::Line { x: x.into(), y: y.into() }, source)
    }

    /// One segment per row from `(x0, y0)` to `(x1, y1)`
    pub fn segment(
        &mut self,
        x0: impl Into<Coord>,
        y0: impl Into<Coord>,
        x1: impl Into<Coord>,
        y1: impl Into<Coord>,
        source: SharedSource,
    ) -> &mut GlyphRenderer {
        let glyph = Glyph::Segment {
            x0: x0.into(),
            y0: y0.into(),
            x1: x1.into(),
            y1: y1.into(),
        };
        self.add_glyph(glyph, source)
    }

    /// Vertical bars centred on `x`
    pub fn vbar(
        &mut self,
        x: impl Into<Coord>,
        width: impl Into<Coord>,
        top: impl Into<Coord>,
        bottom: impl Into<Coord>,
        source: SharedSource,
    ) -> &mut GlyphRenderer {
        let glyph = Glyph::VBar {
            x: x.into(),
            width: width.into(),
            top: top.into(),
            bottom: bottom.into(),
        };
        self.add_glyph(glyph, source)
    }

    /// Horizontal bars centred on `y`
    pub fn hbar(
        &mut self,
        y: impl Into<Coord>,
        height: impl Into<Coord>,
        right: impl Into<Coord>,
        left: impl Into<Coord>,
        source: SharedSource,
    ) -> &mut GlyphRenderer {
        let glyph = Glyph::HBar {
            y: y.into(),
            height: height.into(),
            right: right.into(),
            left: left.into(),
        };
        self.add_glyph(glyph, source)
    }

    /// Packed RGBA image read from column `image`, placed at `(x, y)` with size `dw × dh`
    #[allow(clippy::too_many_arguments)]
    pub fn image_rgba(
        &mut self,
        image: impl Into<String>,
        cols: usize,
        rows: usize,
        x: f64,
        y: f64,
        dw: f64,
        dh: f64,
        source: SharedSource,
    ) -> &mut GlyphRenderer {
        let glyph = Glyph::ImageRgba {
            image: image.into(),
            cols,
            rows,
            x,
            y,
            dw,
            dh,
        };
        self.add_glyph(glyph, source)
    }

    pub fn add_tools(&mut self, tool: HoverTool) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[HoverTool] {
        &self.tools
    }

    pub fn renderers(&self) -> &[GlyphRenderer] {
        &self.renderers
    }

    pub fn renderers_mut(&mut self) -> &mut [GlyphRenderer] {
        &mut self.renderers
    }

    /// Renderers carrying `name`
    pub fn renderers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a GlyphRenderer> + 'a {
        self.renderers.iter().filter(move |r| r.get_name() == Some(name))
    }

    /// Union of the visible renderers' extents, unpadded
    pub fn data_bounds(&self) -> Result<Bounds> {
        let mut bounds = Bounds::nothing();
        for renderer in self.renderers.iter().filter(|r| r.is_visible()) {
            bounds.union(&renderer.bounds()?);
        }
        Ok(bounds)
    }

    /// Legend rows in first-seen order; renderers with the same label share a row
    pub fn legend_items(&self) -> Vec<LegendItem> {
        let mut items: Vec<LegendItem> = Vec::new();
        for (index, renderer) in self.renderers.iter().enumerate() {
            let Some(label) = renderer.legend_label() else {
                continue;
            };
            match items.iter_mut().find(|item| item.label == label) {
                Some(item) => item.renderers.push(index),
                None => items.push(LegendItem {
                    label: label.to_string(),
                    renderers: vec![index],
                }),
            }
        }
        items
    }

    /// Apply the click policy to every renderer under `label`.
    ///
    /// Returns whether anything changed.
    pub fn toggle_legend_item(&mut self, label: &str) -> bool {
        let policy = self.legend.click_policy;
        if policy == ClickPolicy::None {
            return false;
        }

        let mut changed = false;
        for renderer in self.renderers.iter_mut().filter(|r| r.legend_label() == Some(label)) {
            match policy {
                ClickPolicy::Mute => renderer.set_muted(!renderer.is_muted()),
                ClickPolicy::Hide => renderer.set_visible(!renderer.is_visible()),
                ClickPolicy::None => {}
            }
            changed = true;
        }
        if changed {
            tracing::debug!("legend item '{}' toggled ({:?})", label, policy);
        }
        changed
    }

    /// Check every renderer's columns exist in its source
    pub fn validate(&self) -> Result<()> {
        self.renderers.iter().try_for_each(GlyphRenderer::check_fields)
    }
}

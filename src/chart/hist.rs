//! Histogram chart in one of four directions.

use std::fmt;
use std::str::FromStr;

use crate::error::{FigureError, Result};
use crate::series::Series;
use crate::setting::Settings;
use crate::source::{shared, ColumnDataSource, SharedSource};
use crate::stats::Histogram;
use super::figure::Figure;
use super::hover::HoverTool;

pub const HIST_NAME: &str = "hist";

/// Bars are drawn this much thinner than a bin so neighbours do not touch
const BAR_SHRINK: f64 = 1.4;

/// Which edge the bars grow from.
///
/// `Bottom` and `Left` plot negative magnitudes on purpose, so a pair of
/// histograms can be drawn back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistDirection {
    #[default]
    Top,
    Bottom,
    Right,
    Left,
}

impl HistDirection {
    pub fn is_vertical(&self) -> bool {
        matches!(self, HistDirection::Top | HistDirection::Bottom)
    }

    /// Sign applied to the bin counts
    pub fn sign(&self) -> f64 {
        match self {
            HistDirection::Top | HistDirection::Right => 1.0,
            HistDirection::Bottom | HistDirection::Left => -1.0,
        }
    }
}

impl fmt::Display for HistDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistDirection::Top => "top",
            HistDirection::Bottom => "bottom",
            HistDirection::Right => "right",
            HistDirection::Left => "left",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for HistDirection {
    type Err = FigureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "top" | "up" => Ok(HistDirection::Top),
            "bottom" | "down" => Ok(HistDirection::Bottom),
            "right" => Ok(HistDirection::Right),
            "left" => Ok(HistDirection::Left),
            _ => Err(FigureError::InvalidDirection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistOptions {
    pub bins: usize,
    pub direction: HistDirection,
    pub auto_tooltip: bool,
}

impl Default for HistOptions {
    fn default() -> Self {
        Self {
            bins: 10,
            direction: HistDirection::Top,
            auto_tooltip: true,
        }
    }
}

impl HistOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        Self {
            bins: settings.get_usize("hist.bins").unwrap_or(defaults.bins),
            auto_tooltip: settings.get_bool("tooltip.auto").unwrap_or(defaults.auto_tooltip),
            ..defaults
        }
    }

    pub fn direction(mut self, direction: HistDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Columns computed by [`Figure::hist`]
#[derive(Debug, Clone)]
pub struct HistogramData {
    /// Bin midpoints
    pub x: Vec<f64>,
    /// Signed bin counts
    pub y: Vec<f64>,
    pub x_from: Vec<f64>,
    pub x_to: Vec<f64>,
    pub histogram: Histogram,
    pub source: SharedSource,
}

impl Figure {
    /// Plot a histogram of `series` values.
    ///
    /// Columns: `hist_x` (midpoints), `hist_y` (signed counts),
    /// `hist_x_from`, `hist_x_to`.
    pub fn hist(&mut self, series: &Series, options: HistOptions) -> Result<HistogramData> {
        let histogram = Histogram::compute(series.values(), options.bins)?;
        let sign = options.direction.sign();

        let x = histogram.centers();
        let y: Vec<f64> = histogram.counts.iter().map(|&c| sign * c as f64).collect();
        let x_from = histogram.edges[..histogram.edges.len() - 1].to_vec();
        let x_to = histogram.edges[1..].to_vec();

        let source = shared(ColumnDataSource::from_columns([
            ("hist_x", x.clone()),
            ("hist_y", y.clone()),
            ("hist_x_from", x_from.clone()),
            ("hist_x_to", x_to.clone()),
        ]));

        let thickness = histogram.bin_width() / BAR_SHRINK;
        let renderer = if options.direction.is_vertical() {
            self.vbar("hist_x", thickness, "hist_y", 0.0, source.clone())
        } else {
            self.hbar("hist_x", thickness, "hist_y", 0.0, source.clone())
        };
        renderer.name(HIST_NAME);

        if options.auto_tooltip {
            self.add_tools(
                HoverTool::new()
                    .names([HIST_NAME])
                    .tooltip("x", "@hist_x{,.2f}")
                    .tooltip("y", "@hist_y{,}")
                    .tooltip("range", "@hist_x_from{,.2f} - @hist_x_to{,.2f}"),
            );
        }

        tracing::debug!(
            "hist plotted: {} values in {} bins ({})",
            series.len(),
            options.bins,
            options.direction
        );

        Ok(HistogramData {
            x,
            y,
            x_from,
            x_to,
            histogram,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::glyph::Glyph;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample(n: usize) -> Series {
        let mut rng = StdRng::seed_from_u64(42);
        Series::from_values((0..n).map(|i| rng.random_range(1.0..100.0) * (i as f64 * 0.12).sin()).collect())
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("up".parse::<HistDirection>().unwrap(), HistDirection::Top);
        assert_eq!("Down".parse::<HistDirection>().unwrap(), HistDirection::Bottom);
        assert_eq!("left".parse::<HistDirection>().unwrap(), HistDirection::Left);
        assert!(matches!(
            "sideways".parse::<HistDirection>(),
            Err(FigureError::InvalidDirection(_))
        ));
    }

    #[test]
    fn test_counts_sum_and_edges() {
        let series = sample(100);
        let mut fig = Figure::default();
        let data = fig.hist(&series, HistOptions::default()).unwrap();

        assert_eq!(data.y.iter().sum::<f64>(), 100.0);
        assert_eq!(data.x.len(), 10);
        assert!(data.x_from.iter().zip(&data.x_to).all(|(a, b)| a < b));
        assert!(data.histogram.edges.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bottom_and_left_flip_sign() {
        let series = sample(60);
        let top = Figure::default().hist(&series, HistOptions::default()).unwrap();
        let right = Figure::default()
            .hist(&series, HistOptions::default().direction(HistDirection::Right))
            .unwrap();
        let bottom = Figure::default()
            .hist(&series, HistOptions::default().direction(HistDirection::Bottom))
            .unwrap();
        let left = Figure::default()
            .hist(&series, HistOptions::default().direction(HistDirection::Left))
            .unwrap();

        let negated: Vec<f64> = top.y.iter().map(|v| -v).collect();
        assert_eq!(bottom.y, negated);
        assert_eq!(left.y, negated);
        assert_eq!(right.y, top.y);
    }

    #[test]
    fn test_glyph_orientation_and_width() {
        // All-negative data used to produce a negative bar width
        let series = Series::from_values(vec![-10.0, -8.0, -6.0, -4.0, -2.0]);
        let mut fig = Figure::default();
        fig.hist(&series, HistOptions { bins: 4, ..HistOptions::default() }).unwrap();
        fig.hist(&series, HistOptions { bins: 4, ..HistOptions::default() }.direction(HistDirection::Left))
            .unwrap();

        match fig.renderers()[0].glyph() {
            Glyph::VBar { width, .. } => {
                let w = width.resolve(&ColumnDataSource::new(), 0).unwrap();
                assert!((w - 2.0 / 1.4).abs() < 1e-12);
            }
            other => panic!("expected vbar, got {:?}", other),
        }
        assert!(matches!(fig.renderers()[1].glyph(), Glyph::HBar { .. }));
    }

    #[test]
    fn test_tooltip_range_uses_both_edges() {
        let mut fig = Figure::default();
        fig.hist(&sample(20), HistOptions::default()).unwrap();
        let tool = &fig.tools()[0];
        assert_eq!(tool.tooltips[2].1, "@hist_x_from{,.2f} - @hist_x_to{,.2f}");
    }

    #[test]
    fn test_non_finite_input_fails() {
        let series = Series::from_values(vec![1.0, f64::INFINITY]);
        let result = Figure::default().hist(&series, HistOptions::default());
        assert!(matches!(result, Err(FigureError::NonFiniteValue(1))));
    }
}

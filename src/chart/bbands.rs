//! Bollinger bands: rolling mean with ±1σ/2σ/3σ envelopes.

use crate::error::Result;
use crate::palette::muted_color;
use crate::series::{IndexKind, Series};
use crate::setting::Settings;
use crate::source::{shared, Column, ColumnDataSource, SharedSource};
use crate::stats::{rolling_mean, rolling_std};
use super::figure::Figure;
use super::glyph::GlyphStyle;
use super::hover::{Formatter, HoverTool};

pub const BBANDS_NAME: &str = "bbands";

const SIGMA1_COLOR: &str = "#2ca02c";
const SIGMA2_COLOR: &str = "#ff7f0e";
const SIGMA3_COLOR: &str = "#1f77b4";
const MIDDLE_COLOR: &str = "#d62728";

#[derive(Debug, Clone)]
pub struct BbandsOptions {
    pub window: usize,
    pub auto_tooltip: bool,
}

impl Default for BbandsOptions {
    fn default() -> Self {
        Self {
            window: 20,
            auto_tooltip: true,
        }
    }
}

impl BbandsOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let defaults = Self::default();
        Self {
            window: settings.get_usize("bbands.window").unwrap_or(defaults.window),
            auto_tooltip: settings.get_bool("tooltip.auto").unwrap_or(defaults.auto_tooltip),
        }
    }
}

/// Band columns computed by [`Figure::bbands`]; warm-up rows are `None`
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub index: Vec<f64>,
    pub middle: Vec<Option<f64>>,
    /// `upper[k - 1]` is the `m + kσ` band
    pub upper: [Vec<Option<f64>>; 3],
    /// `lower[k - 1]` is the `m - kσ` band
    pub lower: [Vec<Option<f64>>; 3],
    pub source: SharedSource,
}

fn band(middle: &[Option<f64>], std: &[Option<f64>], k: f64) -> Vec<Option<f64>> {
    middle
        .iter()
        .zip(std)
        .map(|(m, s)| Some((*m)? + k * (*s)?))
        .collect()
}

impl Figure {
    /// Plot Bollinger bands of `series`.
    ///
    /// Seven lines named `bbands` share one source with columns
    /// `index, bbands_u1..u3, bbands_l1..l3, bbands_m`.
    pub fn bbands(&mut self, series: &Series, options: BbandsOptions) -> Result<BollingerBands> {
        let middle = rolling_mean(series.values(), options.window)?;
        let std = rolling_std(series.values(), options.window)?;

        let upper = [band(&middle, &std, 1.0), band(&middle, &std, 2.0), band(&middle, &std, 3.0)];
        let lower = [band(&middle, &std, -1.0), band(&middle, &std, -2.0), band(&middle, &std, -3.0)];

        let mut data = ColumnDataSource::new();
        data.insert("index", series.index().to_vec());
        for k in 0..3 {
            data.insert(format!("bbands_u{}", k + 1), Column::from(upper[k].clone()));
            data.insert(format!("bbands_l{}", k + 1), Column::from(lower[k].clone()));
        }
        data.insert("bbands_m", Column::from(middle.clone()));
        let source = shared(data);

        let lines = [
            ("bbands_u3", SIGMA3_COLOR, "BBAND σ3"),
            ("bbands_l3", SIGMA3_COLOR, "BBAND σ3"),
            ("bbands_u2", SIGMA2_COLOR, "BBAND σ2"),
            ("bbands_l2", SIGMA2_COLOR, "BBAND σ2"),
            ("bbands_u1", SIGMA1_COLOR, "BBAND σ1"),
            ("bbands_l1", SIGMA1_COLOR, "BBAND σ1"),
            ("bbands_m", MIDDLE_COLOR, "BBAND"),
        ];
        for (column, color, label) in lines {
            let style = GlyphStyle::from_muted(&muted_color(color))?;
            self.line("index", column, source.clone())
                .name(BBANDS_NAME)
                .legend(label)
                .style(style);
        }

        if options.auto_tooltip {
            let mut tool = HoverTool::new().names([BBANDS_NAME]);
            tool = match series.index_kind() {
                IndexKind::Datetime => tool
                    .tooltip("Date", "@index{%Y-%m-%d}")
                    .formatter("index", Formatter::Datetime),
                IndexKind::Position => tool.tooltip("Index", "@index"),
            };
            self.add_tools(
                tool.tooltip("BB σ3", "@bbands_u3{,}")
                    .tooltip("BB Middle", "@bbands_m{,}")
                    .tooltip("BB -σ3", "@bbands_l3{,}"),
            );
        }

        tracing::debug!("bbands plotted: {} rows, window {}", series.len(), options.window);

        Ok(BollingerBands {
            index: series.index().to_vec(),
            middle,
            upper,
            lower,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FigureError;
    use crate::source::read_source;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn noisy_series(n: usize) -> Series {
        let mut rng = StdRng::seed_from_u64(7);
        let values = (0..n)
            .map(|i| rng.random_range(1.0..100.0) * (i as f64 * 0.12).sin())
            .collect();
        Series::from_values(values)
    }

    #[test]
    fn test_bands_are_mean_plus_k_sigma() {
        let series = noisy_series(100);
        let mut fig = Figure::default();
        let bands = fig.bbands(&series, BbandsOptions::default()).unwrap();

        let mean = rolling_mean(series.values(), 20).unwrap();
        let std = rolling_std(series.values(), 20).unwrap();
        assert_eq!(bands.middle, mean);
        assert!(bands.middle[..19].iter().all(Option::is_none));

        for row in 19..100 {
            let (m, s) = (mean[row].unwrap(), std[row].unwrap());
            for k in 1..=3 {
                let kf = k as f64;
                assert!((bands.upper[k - 1][row].unwrap() - (m + kf * s)).abs() < 1e-9);
                assert!((bands.lower[k - 1][row].unwrap() - (m - kf * s)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_renderers_legend_and_tooltip() {
        let mut fig = Figure::default();
        fig.bbands(&noisy_series(30), BbandsOptions::default()).unwrap();

        assert_eq!(fig.renderers_named(BBANDS_NAME).count(), 7);
        let labels: Vec<String> = fig.legend_items().into_iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["BBAND σ3", "BBAND σ2", "BBAND σ1", "BBAND"]);
        assert!(fig.renderers().iter().all(|r| r.get_style().muted_alpha == 0.2));

        assert_eq!(fig.tools().len(), 1);
        assert_eq!(fig.tools()[0].tooltips[0].1, "@index");
        assert!(fig.validate().is_ok());
    }

    #[test]
    fn test_source_columns() {
        let mut fig = Figure::default();
        let bands = fig.bbands(&noisy_series(25), BbandsOptions { window: 5, auto_tooltip: false }).unwrap();
        let source = read_source(&bands.source).unwrap();
        let names: Vec<&str> = source.column_names().collect();
        for name in ["index", "bbands_m", "bbands_u1", "bbands_u3", "bbands_l2"] {
            assert!(names.contains(&name));
        }
        assert_eq!(source.value("bbands_m", 0), None);
        assert!(source.value("bbands_m", 4).is_some());
        assert!(fig.tools().is_empty());
    }

    #[test]
    fn test_bands_recover_after_gap() {
        let mut values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        values[5] = f64::NAN;
        let mut fig = Figure::default();
        let bands = fig
            .bbands(&Series::from_values(values), BbandsOptions { window: 3, ..BbandsOptions::default() })
            .unwrap();

        assert_eq!(bands.middle[6], None);
        assert_eq!(bands.upper[0][7], None);
        assert_eq!(bands.middle[29], Some(28.0));
        assert_eq!(bands.upper[0][29], Some(29.0));
        assert_eq!(bands.lower[2][29], Some(25.0));
    }

    #[test]
    fn test_zero_window_fails() {
        let mut fig = Figure::default();
        let result = fig.bbands(&noisy_series(10), BbandsOptions { window: 0, auto_tooltip: true });
        assert!(matches!(result, Err(FigureError::InvalidWindow(_))));
        assert!(fig.renderers().is_empty());
    }
}

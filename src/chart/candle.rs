//! Candlestick chart: rows split into increasing and decreasing bundles.

use crate::error::Result;
use crate::series::{IndexKind, OhlcFrame};
use crate::setting::Settings;
use crate::source::{shared, ColumnDataSource, SharedSource};
use super::figure::Figure;
use super::glyph::GlyphStyle;
use super::hover::{Formatter, HoverTool};

pub const CANDLE_NAME: &str = "candle";

/// Half a day in milliseconds
pub const HALF_DAY_MS: f64 = 12.0 * 60.0 * 60.0 * 1000.0;

const INC_FILL: &str = "#D5E1DD";
const DEC_FILL: &str = "#F2583E";

#[derive(Debug, Clone)]
pub struct CandleOptions {
    pub auto_tooltip: bool,
    /// Body width in index units; `None` picks half a day for datetime
    /// indexes and 0.5 otherwise
    pub bar_width: Option<f64>,
}

impl Default for CandleOptions {
    fn default() -> Self {
        Self {
            auto_tooltip: true,
            bar_width: None,
        }
    }
}

impl CandleOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            auto_tooltip: settings.get_bool("tooltip.auto").unwrap_or(true),
            bar_width: None,
        }
    }
}

/// The two data bundles behind a candlestick chart
#[derive(Debug, Clone)]
pub struct CandleSplit {
    /// Rows with `close >= open`
    pub increasing: SharedSource,
    /// Rows with `open > close`
    pub decreasing: SharedSource,
    pub increasing_rows: usize,
    pub decreasing_rows: usize,
}

fn candle_source(frame: &OhlcFrame) -> ColumnDataSource {
    ColumnDataSource::from_columns([
        ("index", frame.index().to_vec()),
        ("candle_open", frame.open().to_vec()),
        ("candle_close", frame.close().to_vec()),
        ("candle_high", frame.high().to_vec()),
        ("candle_low", frame.low().to_vec()),
    ])
}

impl Figure {
    /// Plot a candlestick chart of `frame`.
    ///
    /// Wicks are segments from high to low; bodies are bars from open to
    /// close. All four renderers are named `candle`.
    pub fn candle(&mut self, frame: &OhlcFrame, options: CandleOptions) -> Result<CandleSplit> {
        let inc = frame.filter_rows(|open, close| close >= open);
        let dec = frame.filter_rows(|open, close| open > close);
        let width = options.bar_width.unwrap_or(match frame.index_kind() {
            IndexKind::Datetime => HALF_DAY_MS,
            IndexKind::Position => 0.5,
        });

        let source_inc = shared(candle_source(&inc));
        let source_dec = shared(candle_source(&dec));

        self.segment("index", "candle_high", "index", "candle_low", source_inc.clone())
            .name(CANDLE_NAME)
            .style(GlyphStyle::color("black")?);
        self.segment("index", "candle_high", "index", "candle_low", source_dec.clone())
            .name(CANDLE_NAME)
            .style(GlyphStyle::color("red")?);
        self.vbar("index", width, "candle_open", "candle_close", source_inc.clone())
            .name(CANDLE_NAME)
            .style(GlyphStyle::color("black")?.with_fill(INC_FILL)?);
        self.vbar("index", width, "candle_open", "candle_close", source_dec.clone())
            .name(CANDLE_NAME)
            .style(GlyphStyle::color("red")?.with_fill(DEC_FILL)?);

        if options.auto_tooltip {
            let mut tool = HoverTool::new().names([CANDLE_NAME]);
            tool = match frame.index_kind() {
                IndexKind::Datetime => tool
                    .tooltip("Date", "@index{%Y-%m-%d}")
                    .formatter("index", Formatter::Datetime),
                IndexKind::Position => tool.tooltip("Index", "@index"),
            };
            self.add_tools(
                tool.tooltip("Open", "@candle_open{,.2f}")
                    .tooltip("Close", "@candle_close{,.2f}")
                    .tooltip("High", "@candle_high{,.2f}")
                    .tooltip("Low", "@candle_low{,.2f}"),
            );
        }

        tracing::debug!("candle plotted: {} up, {} down", inc.len(), dec.len());

        Ok(CandleSplit {
            increasing: source_inc,
            decreasing: source_dec,
            increasing_rows: inc.len(),
            decreasing_rows: dec.len(),
        })
    }
}

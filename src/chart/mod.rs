//! Chart module: figures, glyphs and the drawing helpers built on them.
//!
//! This module provides:
//! - `Figure` - Renderers over shared data sources, with legend and hover tools
//! - `bbands`, `candle`, `hist`, `grayscale` - Chart helpers on `Figure`
//! - `Figure::show` - egui painting with legend clicks and tooltips
//!
//! # Example
//!
//! ```ignore
//! use figkit::chart::{Figure, FigureOptions, HistOptions};
//! use figkit::series::Series;
//!
//! let mut fig = Figure::new(FigureOptions::default().title("Returns"));
//! fig.hist(&Series::from_values(returns), HistOptions::default())?;
//! fig.show(ui);
//! ```

mod base;
mod bbands;
mod candle;
mod figure;
mod glyph;
mod hist;
mod hover;
mod image;
mod widget;

pub use base::*;
pub use bbands::{BbandsOptions, BollingerBands, BBANDS_NAME};
pub use candle::{CandleOptions, CandleSplit, CANDLE_NAME, HALF_DAY_MS};
pub use figure::{AxisType, ClickPolicy, Figure, FigureOptions, Legend, LegendItem};
pub use glyph::{Coord, Glyph, GlyphRenderer, GlyphStyle};
pub use hist::{HistDirection, HistOptions, HistogramData, HIST_NAME};
pub use hover::{Formatter, HoverPoint, HoverTool};
pub use image::{pack_grayscale, GrayscaleOptions, IntensityImage, RgbaImage, IMAGE_COLUMN};

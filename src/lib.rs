//! figkit - chart helpers and live training plots on top of egui
//!
//! This crate provides:
//!
//! - Cyclic colour palettes and muted glyph styles
//! - Named columnar data sources shared between figures and producers
//! - A `Figure` with line/segment/bar/image glyphs, legend and hover tools
//! - Chart helpers: Bollinger bands, candlesticks, histograms, grayscale images
//! - A training callback that pushes epoch metrics into live plots
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use figkit::chart::{BbandsOptions, ClickPolicy, Figure, FigureOptions};
//! use figkit::series::Series;
//!
//! let mut fig = Figure::new(FigureOptions::default().title("Price"));
//! let series = Series::from_values((0..100).map(|i| (i as f64 * 0.1).sin()).collect());
//! fig.bbands(&series, BbandsOptions::default()).unwrap();
//! fig.legend.click_policy = ClickPolicy::Mute;
//! // Inside an egui frame: fig.show(ui);
//! ```

pub mod callback;
pub mod chart;
pub mod error;
pub mod logger;
pub mod palette;
pub mod series;
pub mod setting;
pub mod source;
pub mod stats;
pub mod utility;

pub use callback::{fit, Callback, CallbackAction, History, HistoryPlotter, Logs, MetricHistory, PushHandle};
pub use chart::{Figure, FigureOptions};
pub use error::{FigureError, Result};
pub use palette::{default_palette, muted_color, palette, MutedStyle, PaletteCycle, PaletteName};
pub use setting::{Settings, SETTINGS};
pub use source::{shared, ColumnDataSource, SharedSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

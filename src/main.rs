//! figkit demo - every chart helper plus a live training plot.

use std::error::Error;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use eframe::egui;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use figkit::callback::{fit, HistoryPlotter, Logs, RepaintHandle};
use figkit::chart::{
    AxisType, BbandsOptions, CandleOptions, ClickPolicy, Figure, FigureOptions, GlyphStyle, GrayscaleOptions,
    HistDirection, HistOptions, IntensityImage,
};
use figkit::logger::init_logger;
use figkit::palette::{muted_color_from_settings, palette_from_settings};
use figkit::series::{Bar, OhlcFrame, Series};
use figkit::source::{shared, ColumnDataSource, SharedSource};
use figkit::SETTINGS;

const TRAINING_EPOCHS: usize = 60;

/// Demo window state
struct FigkitApp {
    figures: Vec<Figure>,
    training: Figure,
    worker: Option<thread::JoinHandle<()>>,
}

/// The four chart helpers on synthetic data
fn build_figures() -> Result<Vec<Figure>, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(2019);
    let bars = random_walk_bars(&mut rng, 120);
    let closes = Series::from_datetimes(
        &bars.iter().map(|b| b.datetime).collect::<Vec<_>>(),
        bars.iter().map(|b| b.close).collect(),
    )?;
    let datetime_options = || FigureOptions::from_settings(&SETTINGS).x_axis_type(AxisType::Datetime);

    let mut bbands = Figure::new(datetime_options().title("Bollinger bands"));
    bbands.bbands(&closes, BbandsOptions::from_settings(&SETTINGS))?;
    let close_source = shared(ColumnDataSource::from_columns([
        ("index", closes.index().to_vec()),
        ("close", closes.values().to_vec()),
    ]));
    bbands
        .line("index", "close", close_source)
        .style(GlyphStyle::color("black")?)
        .legend("Close");
    bbands.legend.click_policy = ClickPolicy::Mute;

    let mut candle = Figure::new(datetime_options().title("Candlesticks"));
    candle.candle(&OhlcFrame::from_bars(&bars), CandleOptions::from_settings(&SETTINGS))?;

    let returns: Vec<f64> = closes.values().windows(2).map(|w| (w[1] / w[0]).ln() * 100.0).collect();
    let returns = Series::from_values(returns);
    let mut hist = Figure::new(FigureOptions::from_settings(&SETTINGS).title("Daily returns (%)"));
    hist.hist(&returns, HistOptions::from_settings(&SETTINGS))?;
    hist.hist(&returns, HistOptions::from_settings(&SETTINGS).direction(HistDirection::Bottom))?;

    let digit: Vec<i64> = (0..64)
        .map(|i| {
            let (r, c) = (i / 8, i % 8);
            let ring = ((r as f64 - 3.5).powi(2) + (c as f64 - 3.5).powi(2)).sqrt();
            if (2.0..3.5).contains(&ring) { 15 } else { 0 }
        })
        .collect();
    let mut grayscale = Figure::new(FigureOptions::from_settings(&SETTINGS).title("Grayscale"));
    grayscale.width = 300.0;
    grayscale.height = 300.0;
    grayscale.grayscale(&IntensityImage::from_flat(digit, 8, 8)?, GrayscaleOptions::from_settings(&SETTINGS))?;

    Ok(vec![bbands, candle, hist, grayscale])
}

/// Random-walk daily bars
fn random_walk_bars(rng: &mut StdRng, n: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2019, 5, 1, 0, 0, 0).single().unwrap_or_default();
    let mut close = 100.0;
    (0..n)
        .map(|i| {
            let open = close;
            close = open * (1.0 + rng.random_range(-0.03..0.03));
            Bar {
                datetime: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * (1.0 + rng.random_range(0.0..0.01)),
                low: open.min(close) * (1.0 - rng.random_range(0.0..0.01)),
                close,
                volume: rng.random_range(1000.0..5000.0),
            }
        })
        .collect()
}

/// Loss plot over an empty source the training loop will fill
fn training_figure() -> Result<(Figure, SharedSource), Box<dyn Error>> {
    let source = shared(ColumnDataSource::from_columns([
        ("x", Vec::<f64>::new()),
        ("loss", Vec::new()),
        ("val_loss", Vec::new()),
    ]));

    let mut figure = Figure::new(FigureOptions::from_settings(&SETTINGS).title("Training history"));
    figure.legend.click_policy = ClickPolicy::Hide;
    let mut colors = palette_from_settings(&SETTINGS)?;
    for metric in ["loss", "val_loss"] {
        let color = colors.next().unwrap_or("#1f77b4");
        figure
            .line("x", metric, source.clone())
            .style(GlyphStyle::from_muted(&muted_color_from_settings(color, &SETTINGS))?.with_line_width(2.0))
            .legend(metric);
    }
    Ok((figure, source))
}

/// Run a synthetic training loop on a worker thread, plotting through a [`HistoryPlotter`]
fn spawn_training(ctx: &egui::Context, source: SharedSource) -> thread::JoinHandle<()> {
    let handle = RepaintHandle::new(ctx.clone());
    thread::spawn(move || {
        let mut plotter = HistoryPlotter::new(handle, vec![source]);
        let mut rng = StdRng::seed_from_u64(7);
        let result = fit(TRAINING_EPOCHS, &mut [&mut plotter], |epoch| {
            thread::sleep(Duration::from_millis(150));
            let base = (-(epoch as f64) / 12.0).exp();
            let logs: Logs = [
                ("loss".to_string(), base + rng.random_range(0.0..0.03)),
                ("val_loss".to_string(), base * 1.1 + rng.random_range(0.0..0.05)),
            ]
            .into_iter()
            .collect();
            Ok(logs)
        });
        match result {
            Ok(history) => info!("training finished after {} epochs", history.epochs.len()),
            Err(e) => warn!("training failed: {}", e),
        }
    })
}

impl eframe::App for FigkitApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Live training");
                self.training.show(ui);
                ui.separator();
                for figure in &mut self.figures {
                    ui.heading(figure.title.clone());
                    figure.show(ui);
                    ui.add_space(8.0);
                }
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            } else {
                info!("closing while training is still running");
            }
        }
    }
}

/// Create native window options
fn create_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("figkit demo")
            .with_inner_size([900.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger(&SETTINGS)?;
    info!("starting figkit demo {}", figkit::VERSION);

    let figures = build_figures()?;
    let (training, source) = training_figure()?;
    info!("demo ready with {} figures", figures.len() + 1);

    eframe::run_native(
        "figkit demo",
        create_native_options(),
        Box::new(move |cc| {
            let worker = spawn_training(&cc.egui_ctx, source);
            Ok(Box::new(FigkitApp {
                figures,
                training,
                worker: Some(worker),
            }))
        }),
    )
    .map_err(|e| format!("Failed to run application: {}", e))?;

    Ok(())
}

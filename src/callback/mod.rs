//! Training-loop callbacks and a minimal epoch driver.
//!
//! A training loop reports one [`Logs`] map per epoch. [`fit`] runs the loop,
//! collects a [`History`] and dispatches the hooks of every [`Callback`] in
//! order. [`HistoryPlotter`] is the callback that feeds live plots.

mod history;
mod push;

pub use history::{HistoryPlotter, PlotterState};
pub use push::{JsonLinesHandle, PushHandle, RepaintHandle};

use std::collections::BTreeMap;

use crate::error::Result;

/// Metric name to value for one epoch
pub type Logs = BTreeMap<String, f64>;

/// Whether training should go on after a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallbackAction {
    #[default]
    Continue,
    Stop,
}

/// Hooks a training loop calls around each epoch
pub trait Callback {
    /// Name used in logs
    fn name(&self) -> &str {
        "callback"
    }

    fn on_train_begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_epoch_begin(&mut self, _epoch: usize) -> Result<()> {
        Ok(())
    }

    /// Called with the epoch index and that epoch's metrics
    fn on_epoch_end(&mut self, epoch: usize, logs: &Logs) -> Result<CallbackAction>;

    fn on_train_end(&mut self, _history: &History) -> Result<()> {
        Ok(())
    }
}

/// Growing per-metric sequences, one value appended per report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricHistory {
    metrics: BTreeMap<String, Vec<f64>>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every value of `logs`; unseen metrics start a new sequence
    pub fn record(&mut self, logs: &Logs) {
        for (name, value) in logs {
            self.metrics.entry(name.clone()).or_default().push(*value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(Vec::as_slice)
    }

    pub fn metrics(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// What [`fit`] returns: completed epochs and the recorded metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub epochs: Vec<usize>,
    pub metrics: MetricHistory,
}

/// Run `step` for up to `epochs` epochs, dispatching callback hooks.
///
/// Stops early after an epoch in which any callback returns
/// [`CallbackAction::Stop`]. Every callback still sees that epoch's end.
pub fn fit<F>(epochs: usize, callbacks: &mut [&mut dyn Callback], mut step: F) -> Result<History>
where
    F: FnMut(usize) -> Result<Logs>,
{
    let mut history = History::default();
    for callback in callbacks.iter_mut() {
        callback.on_train_begin()?;
    }
    tracing::info!("training started: {} epochs, {} callbacks", epochs, callbacks.len());

    for epoch in 0..epochs {
        for callback in callbacks.iter_mut() {
            callback.on_epoch_begin(epoch)?;
        }

        let logs = step(epoch)?;
        history.epochs.push(epoch);
        history.metrics.record(&logs);

        let mut stop = false;
        for callback in callbacks.iter_mut() {
            if callback.on_epoch_end(epoch, &logs)? == CallbackAction::Stop {
                tracing::info!("callback '{}' stopped training at epoch {}", callback.name(), epoch);
                stop = true;
            }
        }
        if stop {
            break;
        }
    }

    for callback in callbacks.iter_mut() {
        callback.on_train_end(&history)?;
    }
    tracing::info!("training finished after {} epochs", history.epochs.len());
    Ok(history)
}

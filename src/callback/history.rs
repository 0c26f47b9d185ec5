//! Live training-history plotting callback.

use crate::error::Result;
use crate::logger::Logger;
use crate::source::{write_source, Column, SharedSource};
use super::push::PushHandle;
use super::{Callback, CallbackAction, History, Logs, MetricHistory};

/// Lifecycle of a [`HistoryPlotter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotterState {
    /// No epoch has ended yet
    Idle,
    /// At least one epoch has been recorded
    Accumulating,
}

/// Callback that plots training history live.
///
/// After every epoch it appends the epoch's metrics, writes `x = 0..=epoch`
/// and one column per metric into each target source, then pushes them
/// through the handle. Figures drawing `line("x", "loss", source)` pick the
/// new rows up on their next paint.
pub struct HistoryPlotter<H: PushHandle> {
    handle: H,
    sources: Vec<SharedSource>,
    history: MetricHistory,
    state: PlotterState,
    logger: Logger,
}

impl<H: PushHandle> HistoryPlotter<H> {
    pub fn new(handle: H, sources: Vec<SharedSource>) -> Self {
        Self {
            handle,
            sources,
            history: MetricHistory::new(),
            state: PlotterState::Idle,
            logger: Logger::new("history_plotter"),
        }
    }

    pub fn history(&self) -> &MetricHistory {
        &self.history
    }

    pub fn state(&self) -> PlotterState {
        self.state
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn sources(&self) -> &[SharedSource] {
        &self.sources
    }
}

impl<H: PushHandle> Callback for HistoryPlotter<H> {
    fn name(&self) -> &str {
        "history_plotter"
    }

    /// Starts a fresh history so the plotter can be reused across runs
    fn on_train_begin(&mut self) -> Result<()> {
        if self.sources.is_empty() {
            self.logger.warn("no target sources, metrics will only be recorded");
        }
        self.history = MetricHistory::new();
        self.state = PlotterState::Idle;
        Ok(())
    }

    fn on_epoch_end(&mut self, epoch: usize, logs: &Logs) -> Result<CallbackAction> {
        self.history.record(logs);
        self.state = PlotterState::Accumulating;

        let x: Vec<f64> = (0..=epoch).map(|e| e as f64).collect();
        for source in &self.sources {
            let mut source = write_source(source)?;
            let metrics = self
                .history
                .metrics()
                .map(|(name, values)| (name.to_string(), Column::from(values.to_vec())));
            source.update(std::iter::once(("x".to_string(), Column::from(x.clone()))).chain(metrics));
        }

        self.handle.push(&self.sources)?;
        self.logger.debug(&format!("epoch {} pushed to {} sources", epoch, self.sources.len()));
        Ok(CallbackAction::Continue)
    }

    fn on_train_end(&mut self, history: &History) -> Result<()> {
        self.logger.info(&format!(
            "training ended after {} epochs, {} metrics plotted",
            history.epochs.len(),
            self.history.len()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{fit, JsonLinesHandle};
    use crate::source::{read_source, shared, ColumnDataSource};

    /// Counts pushes
    #[derive(Default)]
    struct CountingHandle {
        pushes: usize,
    }

    impl PushHandle for CountingHandle {
        fn push(&mut self, _sources: &[SharedSource]) -> Result<()> {
            self.pushes += 1;
            Ok(())
        }
    }

    fn empty_source() -> SharedSource {
        shared(ColumnDataSource::from_columns([
            ("x", Vec::<f64>::new()),
            ("loss", Vec::new()),
        ]))
    }

    #[test]
    fn test_loss_history_after_n_epochs() {
        let losses = [0.9, 0.6, 0.4, 0.35, 0.3];
        let sources = vec![empty_source(), empty_source()];
        let mut plotter = HistoryPlotter::new(CountingHandle::default(), sources.clone());
        assert_eq!(plotter.state(), PlotterState::Idle);

        for (epoch, loss) in losses.iter().enumerate() {
            let logs: Logs = [("loss".to_string(), *loss)].into_iter().collect();
            plotter.on_epoch_end(epoch, &logs).unwrap();
        }

        assert_eq!(plotter.state(), PlotterState::Accumulating);
        assert_eq!(plotter.history().get("loss"), Some(&losses[..]));
        assert_eq!(plotter.handle().pushes, 5);

        for source in &sources {
            let source = read_source(source).unwrap();
            assert_eq!(source.get("x"), Some(&Column::from(vec![0.0, 1.0, 2.0, 3.0, 4.0])));
            assert_eq!(source.get("loss"), Some(&Column::from(losses.to_vec())));
        }
    }

    #[test]
    fn test_new_metrics_start_new_columns() {
        let source = empty_source();
        let mut plotter = HistoryPlotter::new(CountingHandle::default(), vec![source.clone()]);

        let first: Logs = [("loss".to_string(), 1.0)].into_iter().collect();
        let second: Logs = [("loss".to_string(), 0.5), ("val_loss".to_string(), 0.8)].into_iter().collect();
        plotter.on_epoch_end(0, &first).unwrap();
        plotter.on_epoch_end(1, &second).unwrap();

        let source = read_source(&source).unwrap();
        assert_eq!(source.get("val_loss").map(Column::len), Some(1));
        assert_eq!(source.get("loss").map(Column::len), Some(2));
        // Unequal lengths are left as they are; drawing uses the shortest
        assert!(source.validate().is_err());
        assert_eq!(source.row_count(), 1);
    }

    #[test]
    fn test_with_fit_and_json_handle() {
        let source = empty_source();
        let mut plotter = HistoryPlotter::new(JsonLinesHandle::new(Vec::new()), vec![source.clone()]);
        let history = fit(3, &mut [&mut plotter], |epoch| {
            Ok([("loss".to_string(), 1.0 - epoch as f64 * 0.25)].into_iter().collect())
        })
        .unwrap();

        assert_eq!(history.epochs.len(), 3);
        assert_eq!(plotter.handle().seq(), 3);
        assert_eq!(read_source(&source).unwrap().value("loss", 2), Some(0.5));
    }

    #[test]
    fn test_second_fit_starts_fresh() {
        let source = empty_source();
        let mut plotter = HistoryPlotter::new(CountingHandle::default(), vec![source.clone()]);
        let losses = |epoch: usize| -> Result<Logs> {
            Ok([("loss".to_string(), 1.0 / (epoch + 1) as f64)].into_iter().collect())
        };

        fit(4, &mut [&mut plotter], losses).unwrap();
        fit(2, &mut [&mut plotter], losses).unwrap();

        assert_eq!(plotter.history().get("loss"), Some(&[1.0, 0.5][..]));
        assert_eq!(plotter.handle().pushes, 6);
        assert_eq!(read_source(&source).unwrap().row_count(), 2);
    }
}

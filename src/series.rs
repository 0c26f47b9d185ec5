//! Caller-owned input shapes: indexed series, OHLC frames and bars.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FigureError, Result};

/// How index values should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexKind {
    /// Plain numeric positions
    #[default]
    Position,
    /// Milliseconds since the Unix epoch
    Datetime,
}

/// Convert a datetime to epoch milliseconds, the unit used by datetime indexes
pub fn datetime_to_ms(dt: &DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64
}

/// Convert epoch milliseconds back to a datetime
pub fn ms_to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if !ms.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(ms.round() as i64)
}

fn check_len(name: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(FigureError::LengthMismatch {
            name: name.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// A single numeric series with an ordered index
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    index: Vec<f64>,
    values: Vec<f64>,
    index_kind: IndexKind,
}

impl Series {
    /// Series over an explicit numeric index
    pub fn new(index: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        check_len("values", index.len(), values.len())?;
        Ok(Self {
            index,
            values,
            index_kind: IndexKind::Position,
        })
    }

    /// Series indexed by position `0..n`
    pub fn from_values(values: Vec<f64>) -> Self {
        let index = (0..values.len()).map(|i| i as f64).collect();
        Self {
            index,
            values,
            index_kind: IndexKind::Position,
        }
    }

    /// Series indexed by datetimes
    pub fn from_datetimes(index: &[DateTime<Utc>], values: Vec<f64>) -> Result<Self> {
        check_len("values", index.len(), values.len())?;
        Ok(Self {
            index: index.iter().map(datetime_to_ms).collect(),
            values,
            index_kind: IndexKind::Datetime,
        })
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn index_kind(&self) -> IndexKind {
        self.index_kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One OHLCV record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Table of open/high/low/close columns sharing one index
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcFrame {
    index: Vec<f64>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
    index_kind: IndexKind,
}

impl OhlcFrame {
    /// Frame over a numeric index; all columns must match the index length
    pub fn new(
        index: Vec<f64>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    ) -> Result<Self> {
        let n = index.len();
        check_len("open", n, open.len())?;
        check_len("high", n, high.len())?;
        check_len("low", n, low.len())?;
        check_len("close", n, close.len())?;
        Ok(Self {
            index,
            open,
            high,
            low,
            close,
            index_kind: IndexKind::Position,
        })
    }

    /// Frame indexed by bar datetimes
    pub fn from_bars(bars: &[Bar]) -> Self {
        Self {
            index: bars.iter().map(|b| datetime_to_ms(&b.datetime)).collect(),
            open: bars.iter().map(|b| b.open).collect(),
            high: bars.iter().map(|b| b.high).collect(),
            low: bars.iter().map(|b| b.low).collect(),
            close: bars.iter().map(|b| b.close).collect(),
            index_kind: IndexKind::Datetime,
        }
    }

    /// Rows where `keep` returns true for `(open, close)`
    pub fn filter_rows<F>(&self, mut keep: F) -> OhlcFrame
    where
        F: FnMut(f64, f64) -> bool,
    {
        let rows: Vec<usize> = (0..self.len())
            .filter(|&i| keep(self.open[i], self.close[i]))
            .collect();
        let pick = |column: &[f64]| rows.iter().map(|&i| column[i]).collect::<Vec<f64>>();
        OhlcFrame {
            index: pick(&self.index),
            open: pick(&self.open),
            high: pick(&self.high),
            low: pick(&self.low),
            close: pick(&self.close),
            index_kind: self.index_kind,
        }
    }

    pub fn index(&self) -> &[f64] {
        &self.index
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn index_kind(&self) -> IndexKind {
        self.index_kind
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_series_length_check() {
        let err = Series::new(vec![0.0, 1.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, FigureError::LengthMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_series_from_values() {
        let series = Series::from_values(vec![3.0, 4.0, 5.0]);
        assert_eq!(series.index(), &[0.0, 1.0, 2.0]);
        assert_eq!(series.index_kind(), IndexKind::Position);
    }

    #[test]
    fn test_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2019, 5, 1, 0, 0, 0).unwrap();
        let series = Series::from_datetimes(&[dt], vec![1.0]).unwrap();
        assert_eq!(series.index_kind(), IndexKind::Datetime);
        assert_eq!(ms_to_datetime(series.index()[0]), Some(dt));
        assert_eq!(ms_to_datetime(f64::NAN), None);
    }

    #[test]
    fn test_frame_from_bars_and_filter() {
        let start = Utc.with_ymd_and_hms(2019, 5, 1, 0, 0, 0).unwrap();
        let bars: Vec<Bar> = [(10.0, 12.0), (12.0, 11.0), (11.0, 11.0)]
            .iter()
            .enumerate()
            .map(|(i, &(open, close))| Bar {
                datetime: start + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 0.0,
            })
            .collect();

        let frame = OhlcFrame::from_bars(&bars);
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.index_kind(), IndexKind::Datetime);

        let up = frame.filter_rows(|open, close| close >= open);
        assert_eq!(up.close(), &[12.0, 11.0]);
        assert_eq!(up.high(), &[13.0, 12.0]);
        assert_eq!(up.index_kind(), IndexKind::Datetime);
    }

    #[test]
    fn test_frame_length_check() {
        let err = OhlcFrame::new(vec![0.0], vec![1.0], vec![1.0], vec![], vec![1.0]).unwrap_err();
        assert!(matches!(err, FigureError::LengthMismatch { ref name, .. } if name == "low"));
    }
}

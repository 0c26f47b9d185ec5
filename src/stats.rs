//! Rolling statistics and equal-width histogram binning.

use ta::indicators::SimpleMovingAverage;
use ta::{Next, Reset};

use crate::error::{FigureError, Result};

fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(FigureError::InvalidWindow("window must be at least 1".to_string()));
    }
    Ok(())
}

/// Rolling mean over `window` values; `None` until the window is full.
///
/// A window holding a non-finite value yields `None`. The average restarts
/// after the gap, so later windows recover.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window)?;
    let mut sma = SimpleMovingAverage::new(window)
        .map_err(|e| FigureError::InvalidWindow(format!("{:?}", e)))?;

    let mut filled = 0;
    Ok(values
        .iter()
        .map(|&value| {
            if !value.is_finite() {
                sma.reset();
                filled = 0;
                return None;
            }
            let mean = sma.next(value);
            filled += 1;
            (filled >= window).then_some(mean)
        })
        .collect())
}

/// Rolling sample standard deviation (ddof = 1); `None` until the window is full.
///
/// A window of one has no sample deviation and yields `None` throughout,
/// as does any window holding a non-finite value.
pub fn rolling_std(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    check_window(window)?;
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return Ok(out);
    }

    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        out[i] = Some(variance.sqrt());
    }
    Ok(out)
}

/// Counts and edges of an equal-width histogram
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// One count per bin
    pub counts: Vec<u64>,
    /// `counts.len() + 1` increasing edges
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Bin `values` into `bins` equal-width bins spanning their min and max.
    ///
    /// The last bin includes its right edge. A constant input is widened to
    /// `value ± 0.5`, an empty one uses the range `0..1`.
    pub fn compute(values: &[f64], bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(FigureError::InvalidBins(bins));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(FigureError::NonFiniteValue(pos));
        }

        let (mut first, mut last) = if values.is_empty() {
            (0.0, 1.0)
        } else {
            values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
        };
        if first == last {
            first -= 0.5;
            last += 0.5;
        }

        let step = (last - first) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| first + step * i as f64).collect();
        edges[bins] = last;

        let norm = bins as f64 / (last - first);
        let mut counts = vec![0u64; bins];
        for &v in values {
            let mut ix = (((v - first) * norm) as usize).min(bins - 1);
            // Float error can land one bin off the edges
            if v < edges[ix] && ix > 0 {
                ix -= 1;
            } else if ix + 1 < bins && v >= edges[ix + 1] {
                ix += 1;
            }
            counts[ix] += 1;
        }

        Ok(Self { counts, edges })
    }

    /// Bin midpoints
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect()
    }

    /// Width of one bin
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) if !self.counts.is_empty() => {
                (last - first) / self.counts.len() as f64
            }
            _ => 0.0,
        }
    }

    /// Total number of binned observations
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

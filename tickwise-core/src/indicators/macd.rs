//! Moving Average Convergence/Divergence (MACD).
//!
//! Three lines (separate Indicator instances):
//! - Macd: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(macd, signal)
//! - Histogram: macd - signal
//!
//! Lookback: slow - 1 for the MACD line, slow + signal - 2 for signal and histogram.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(line: MacdLine, fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be below slow period");
        let label = match line {
            MacdLine::Macd => "line",
            MacdLine::Signal => "signal",
            MacdLine::Histogram => "histogram",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("macd_{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// Compute all three lines at once: (macd, signal, histogram).
    pub fn compute_all(&self, bars: &[Bar]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        // NaN - x stays NaN, so warmup carries through
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
        (macd, signal, histogram)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let (macd, signal, histogram) = self.compute_all(bars);
        match self.line {
            MacdLine::Macd => macd,
            MacdLine::Signal => signal,
            MacdLine::Histogram => histogram,
        }
    }
}

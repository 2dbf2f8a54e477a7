//! Stochastic Oscillator.
//!
//! %K = 100 * (close - lowest_low(period)) / (highest_high(period) - lowest_low(period))
//! %D = SMA(%K, smoothing)
//!
//! A window with zero range (highest high == lowest low) leaves %K undefined (NaN),
//! and any %D window touching it is undefined as well.
//! Lookback: period - 1 for %K, period + smoothing - 2 for %D.

use super::{sma_of_series, Indicator};
use crate::domain::Bar;

/// Which stochastic line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StochasticLine {
    K,
    D,
}

#[derive(Debug, Clone)]
pub struct Stochastic {
    period: usize,
    smoothing: usize,
    line: StochasticLine,
    name: String,
}

impl Stochastic {
    pub fn new(line: StochasticLine, period: usize, smoothing: usize) -> Self {
        assert!(period >= 1, "Stochastic period must be >= 1");
        assert!(smoothing >= 1, "Stochastic smoothing must be >= 1");
        let label = match line {
            StochasticLine::K => "k",
            StochasticLine::D => "d",
        };
        Self {
            period,
            smoothing,
            line,
            name: format!("stochastic_{label}_{period}_{smoothing}"),
        }
    }

    fn percent_k(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        for i in (self.period - 1)..n {
            let window = &bars[(i + 1 - self.period)..=i];
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let range = highest - lowest;
            if range > 0.0 {
                result[i] = 100.0 * (bars[i].close - lowest) / range;
            }
        }
        result
    }
}

impl Indicator for Stochastic {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            StochasticLine::K => self.period - 1,
            StochasticLine::D => self.period + self.smoothing - 2,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let k = self.percent_k(bars);
        match self.line {
            StochasticLine::K => k,
            StochasticLine::D => sma_of_series(&k, self.smoothing),
        }
    }
}

//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses sample stddev (divide by N-1).
//! Lookback: period - 1.

use super::{rolling_std, sma_of_series, Indicator};
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(band: BollingerBand, period: usize, multiplier: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Upper, period, multiplier)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Middle, period, multiplier)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(BollingerBand::Lower, period, multiplier)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = sma_of_series(&closes, self.period);
        if self.band == BollingerBand::Middle {
            return middle;
        }

        let sign = match self.band {
            BollingerBand::Upper => 1.0,
            _ => -1.0,
        };
        let std = rolling_std(&closes, self.period);
        middle
            .iter()
            .zip(&std)
            .map(|(m, s)| m + sign * self.multiplier * s)
            .collect()
    }
}

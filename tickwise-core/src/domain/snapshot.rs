//! Price and volume snapshot at the latest bar.

use serde::{Deserialize, Serialize};

use super::BarSeries;

/// Look-back used for the medium-range change and the average volume.
pub const SNAPSHOT_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub current_price: f64,
    /// Percent change over the last bar; 0 with a single bar.
    pub change_1_bar_pct: f64,
    /// Percent change over the last 20 bars; 0 with 20 bars or fewer.
    pub change_20_bar_pct: f64,
    pub current_volume: u64,
    /// Mean volume over the last 20 bars (or all bars when fewer).
    pub average_volume_20: f64,
}

impl PriceSnapshot {
    pub fn from_series(series: &BarSeries) -> Self {
        let bars = series.bars();
        let last = series.last();
        let n = bars.len();

        let pct_change = |back: usize| {
            if n > back {
                (last.close / bars[n - 1 - back].close - 1.0) * 100.0
            } else {
                0.0
            }
        };

        let tail = &bars[n.saturating_sub(SNAPSHOT_WINDOW)..];
        let average_volume_20 =
            tail.iter().map(|b| b.volume as f64).sum::<f64>() / tail.len() as f64;

        Self {
            current_price: last.close,
            change_1_bar_pct: pct_change(1),
            change_20_bar_pct: pct_change(SNAPSHOT_WINDOW),
            current_volume: last.volume,
            average_volume_20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn single_bar_has_zero_changes() {
        let series = BarSeries::new("ONE", make_bars(&[50.0])).unwrap();
        let snap = PriceSnapshot::from_series(&series);
        assert_approx(snap.current_price, 50.0, 1e-12);
        assert_eq!(snap.change_1_bar_pct, 0.0);
        assert_eq!(snap.change_20_bar_pct, 0.0);
        assert_approx(snap.average_volume_20, 1000.0, 1e-12);
    }

    #[test]
    fn changes_are_percentages() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let series = BarSeries::new("UP", make_bars(&closes)).unwrap();
        let snap = PriceSnapshot::from_series(&series);
        // 124 vs 123, 124 vs 104
        assert_approx(snap.change_1_bar_pct, (124.0 / 123.0 - 1.0) * 100.0, 1e-10);
        assert_approx(snap.change_20_bar_pct, (124.0 / 104.0 - 1.0) * 100.0, 1e-10);
        assert_eq!(snap.current_volume, 1000);
    }
}

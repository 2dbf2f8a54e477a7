//! The default indicator battery and its packed result.
//!
//! `compute_indicators` runs every configured indicator over a validated
//! series, keeps the full history of each line for charting, and tags the
//! latest value through the signal classifier.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{
    latest, Bollinger, BollingerBand, Ema, Indicator, Macd, MacdLine, Rsi, Sma, Stochastic,
    StochasticLine,
};
use crate::domain::BarSeries;
use crate::signals::{
    classify_bollinger, classify_macd, classify_price, classify_rsi, classify_stochastic,
    classify_trend, BandSignal, MacdSignal, PriceSignal, RsiSignal, StochasticSignal, TrendSignal,
};

/// Window sizes for every indicator in the battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub sma_short: usize,
    pub sma_medium: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
    pub stochastic_period: usize,
    pub stochastic_smoothing: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_medium: 50,
            sma_long: 200,
            ema_fast: 12,
            ema_slow: 26,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std: 2.0,
            stochastic_period: 14,
            stochastic_smoothing: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("indicator parameter `{field}` must be {requirement}")]
    Invalid {
        field: &'static str,
        requirement: &'static str,
    },
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        let windows = [
            ("sma_short", self.sma_short),
            ("sma_medium", self.sma_medium),
            ("sma_long", self.sma_long),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("stochastic_period", self.stochastic_period),
            ("stochastic_smoothing", self.stochastic_smoothing),
        ];
        if let Some((field, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(ParamsError::Invalid {
                field,
                requirement: ">= 1",
            });
        }
        if self.macd_fast >= self.macd_slow {
            return Err(ParamsError::Invalid {
                field: "macd_fast",
                requirement: "below macd_slow",
            });
        }
        if self.bollinger_period < 2 {
            return Err(ParamsError::Invalid {
                field: "bollinger_period",
                requirement: ">= 2",
            });
        }
        if !(self.bollinger_std.is_finite() && self.bollinger_std > 0.0) {
            return Err(ParamsError::Invalid {
                field: "bollinger_std",
                requirement: "a positive number",
            });
        }
        Ok(())
    }
}

/// A single-line indicator: full history, latest value, and its tag.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorReading<T> {
    pub name: String,
    pub latest: Option<f64>,
    pub tag: T,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacdReading {
    pub name: String,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    pub tag: MacdSignal,
    pub macd_values: Vec<f64>,
    pub signal_values: Vec<f64>,
    pub histogram_values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BollingerReading {
    pub name: String,
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
    pub tag: BandSignal,
    pub upper_values: Vec<f64>,
    pub middle_values: Vec<f64>,
    pub lower_values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StochasticReading {
    pub name: String,
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub tag: StochasticSignal,
    pub k_values: Vec<f64>,
    pub d_values: Vec<f64>,
}

/// Every indicator computed for one series, tagged at the latest bar.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub close: f64,
    pub bar_count: usize,
    pub sma_short: IndicatorReading<PriceSignal>,
    pub sma_medium: IndicatorReading<PriceSignal>,
    pub sma_long: IndicatorReading<PriceSignal>,
    pub ema_fast: IndicatorReading<PriceSignal>,
    pub ema_slow: IndicatorReading<PriceSignal>,
    pub rsi: IndicatorReading<RsiSignal>,
    pub macd: MacdReading,
    pub bollinger: BollingerReading,
    pub stochastic: StochasticReading,
    pub trend: TrendSignal,
    /// Names of indicators whose window exceeds the available history.
    pub insufficient_history: Vec<String>,
}

impl IndicatorSet {
    /// `(indicator name, tag label)` pairs in a fixed order.
    pub fn tags(&self) -> Vec<(&str, &'static str)> {
        vec![
            ("trend", self.trend.label()),
            (self.rsi.name.as_str(), self.rsi.tag.label()),
            (self.macd.name.as_str(), self.macd.tag.label()),
            (self.bollinger.name.as_str(), self.bollinger.tag.label()),
            (self.stochastic.name.as_str(), self.stochastic.tag.label()),
            (self.sma_short.name.as_str(), self.sma_short.tag.label()),
            (self.sma_medium.name.as_str(), self.sma_medium.tag.label()),
            (self.sma_long.name.as_str(), self.sma_long.tag.label()),
            (self.ema_fast.name.as_str(), self.ema_fast.tag.label()),
            (self.ema_slow.name.as_str(), self.ema_slow.tag.label()),
        ]
    }

    /// True when no indicator reports `NoSignal`.
    pub fn all_signalled(&self) -> bool {
        self.trend != TrendSignal::NoSignal
            && self.rsi.tag != RsiSignal::NoSignal
            && self.macd.tag != MacdSignal::NoSignal
            && self.bollinger.tag != BandSignal::NoSignal
            && self.stochastic.tag != StochasticSignal::NoSignal
            && [
                &self.sma_short,
                &self.sma_medium,
                &self.sma_long,
                &self.ema_fast,
                &self.ema_slow,
            ]
            .iter()
            .all(|r| r.tag != PriceSignal::NoSignal)
    }
}

fn price_reading<I: Indicator>(
    indicator: &I,
    series: &BarSeries,
    close: f64,
    missing: &mut Vec<String>,
) -> IndicatorReading<PriceSignal> {
    note_history(indicator, series.len(), missing);
    let values = indicator.compute(series.bars());
    let last = latest(&values);
    IndicatorReading {
        name: indicator.name().to_string(),
        latest: last,
        tag: classify_price(close, last),
        values,
    }
}

fn note_history<I: Indicator>(indicator: &I, available: usize, missing: &mut Vec<String>) {
    if available <= indicator.lookback() {
        debug!(
            indicator = indicator.name(),
            lookback = indicator.lookback(),
            available,
            "insufficient history"
        );
        missing.push(indicator.name().to_string());
    }
}

/// Run the full indicator battery over `series`.
pub fn compute_indicators(
    series: &BarSeries,
    params: &IndicatorParams,
) -> Result<IndicatorSet, ParamsError> {
    params.validate()?;

    let bars = series.bars();
    let close = series.last().close;
    let mut missing = Vec::new();

    let sma_short = price_reading(&Sma::new(params.sma_short), series, close, &mut missing);
    let sma_medium = price_reading(&Sma::new(params.sma_medium), series, close, &mut missing);
    let sma_long = price_reading(&Sma::new(params.sma_long), series, close, &mut missing);
    let ema_fast = price_reading(&Ema::new(params.ema_fast), series, close, &mut missing);
    let ema_slow = price_reading(&Ema::new(params.ema_slow), series, close, &mut missing);

    let rsi_ind = Rsi::new(params.rsi_period);
    note_history(&rsi_ind, bars.len(), &mut missing);
    let rsi_values = rsi_ind.compute(bars);
    let rsi_latest = latest(&rsi_values);
    let rsi = IndicatorReading {
        name: rsi_ind.name().to_string(),
        latest: rsi_latest,
        tag: classify_rsi(rsi_latest),
        values: rsi_values,
    };

    let macd_ind = Macd::new(
        MacdLine::Histogram,
        params.macd_fast,
        params.macd_slow,
        params.macd_signal,
    );
    note_history(&macd_ind, bars.len(), &mut missing);
    let (macd_values, signal_values, histogram_values) = macd_ind.compute_all(bars);
    let (m, s, h) = (
        latest(&macd_values),
        latest(&signal_values),
        latest(&histogram_values),
    );
    let macd = MacdReading {
        name: format!(
            "macd_{}_{}_{}",
            params.macd_fast, params.macd_slow, params.macd_signal
        ),
        macd: m,
        signal: s,
        histogram: h,
        tag: classify_macd(m, s, h),
        macd_values,
        signal_values,
        histogram_values,
    };

    let (period, mult) = (params.bollinger_period, params.bollinger_std);
    let upper_ind = Bollinger::new(BollingerBand::Upper, period, mult);
    note_history(&upper_ind, bars.len(), &mut missing);
    let upper_values = upper_ind.compute(bars);
    let middle_values = Bollinger::middle(period, mult).compute(bars);
    let lower_values = Bollinger::lower(period, mult).compute(bars);
    let (upper, lower) = (latest(&upper_values), latest(&lower_values));
    let bollinger = BollingerReading {
        name: format!("bollinger_{period}_{mult}"),
        upper,
        middle: latest(&middle_values),
        lower,
        tag: classify_bollinger(close, upper, lower),
        upper_values,
        middle_values,
        lower_values,
    };

    let k_ind = Stochastic::new(
        StochasticLine::K,
        params.stochastic_period,
        params.stochastic_smoothing,
    );
    note_history(&k_ind, bars.len(), &mut missing);
    let k_values = k_ind.compute(bars);
    let d_values = Stochastic::new(
        StochasticLine::D,
        params.stochastic_period,
        params.stochastic_smoothing,
    )
    .compute(bars);
    let k = latest(&k_values);
    let stochastic = StochasticReading {
        name: format!(
            "stochastic_{}_{}",
            params.stochastic_period, params.stochastic_smoothing
        ),
        k,
        d: latest(&d_values),
        tag: classify_stochastic(k),
        k_values,
        d_values,
    };

    let trend = classify_trend(close, sma_short.latest, sma_medium.latest, sma_long.latest);

    debug!(
        symbol = series.symbol(),
        bars = bars.len(),
        insufficient = missing.len(),
        trend = trend.label(),
        "indicators computed"
    );

    Ok(IndicatorSet {
        close,
        bar_count: bars.len(),
        sma_short,
        sma_medium,
        sma_long,
        ema_fast,
        ema_slow,
        rsi,
        macd,
        bollinger,
        stochastic,
        trend,
        insufficient_history: missing,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    fn series(closes: &[f64]) -> BarSeries {
        BarSeries::new("TEST", make_bars(closes)).unwrap()
    }

    #[test]
    fn defaults_match_documented_windows() {
        let p = IndicatorParams::default();
        assert_eq!((p.sma_short, p.sma_medium, p.sma_long), (20, 50, 200));
        assert_eq!((p.ema_fast, p.ema_slow), (12, 26));
        assert_eq!(p.rsi_period, 14);
        assert_eq!((p.macd_fast, p.macd_slow, p.macd_signal), (12, 26, 9));
        assert_eq!(p.bollinger_period, 20);
        assert_approx(p.bollinger_std, 2.0, 1e-12);
        assert_eq!((p.stochastic_period, p.stochastic_smoothing), (14, 3));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_windows() {
        let p = IndicatorParams {
            rsi_period: 0,
            ..Default::default()
        };
        assert_eq!(
            p.validate(),
            Err(ParamsError::Invalid {
                field: "rsi_period",
                requirement: ">= 1"
            })
        );

        let p = IndicatorParams {
            macd_fast: 26,
            ..Default::default()
        };
        assert!(p.validate().is_err());

        let p = IndicatorParams {
            bollinger_std: 0.0,
            ..Default::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn short_series_reports_insufficient_history() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let set = compute_indicators(&series(&closes), &IndicatorParams::default()).unwrap();

        assert!(set.insufficient_history.contains(&"sma_50".to_string()));
        assert!(set.insufficient_history.contains(&"sma_200".to_string()));
        assert!(!set.insufficient_history.contains(&"sma_20".to_string()));
        assert_eq!(set.sma_long.tag, PriceSignal::NoSignal);
        assert_eq!(set.trend, TrendSignal::NoSignal);
        assert_ne!(set.rsi.tag, RsiSignal::NoSignal);
        assert!(!set.all_signalled());
    }

    #[test]
    fn full_history_is_kept_for_charting() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let set = compute_indicators(&series(&closes), &IndicatorParams::default()).unwrap();
        assert_eq!(set.sma_short.values.len(), 60);
        assert_eq!(set.macd.histogram_values.len(), 60);
        assert_eq!(set.bollinger.lower_values.len(), 60);
        assert_eq!(set.stochastic.d_values.len(), 60);
        assert_approx(set.close, 159.0, 1e-12);
        assert_eq!(set.bar_count, 60);
    }

    #[test]
    fn tags_start_with_trend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let set = compute_indicators(&series(&closes), &IndicatorParams::default()).unwrap();
        let tags = set.tags();
        assert_eq!(tags[0], ("trend", "Moderate Bullish"));
        assert_eq!(tags[1].0, "rsi_14");
        assert_eq!(tags.len(), 10);
    }

    #[test]
    fn invalid_params_are_rejected_before_computing() {
        let p = IndicatorParams {
            bollinger_period: 1,
            ..Default::default()
        };
        assert!(compute_indicators(&series(&[1.0, 2.0, 3.0]), &p).is_err());
    }
}

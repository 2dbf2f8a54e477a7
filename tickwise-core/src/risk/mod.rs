//! Risk Library: volatility, Sharpe, drawdown, VaR and beta for one series.
//!
//! `compute_risk` is the single entry point. Returns are timestamped so the
//! optional benchmark can be aligned by date before beta is estimated.

pub mod metrics;

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use metrics::{
    annual_volatility, beta, daily_volatility, max_drawdown, mean_f64, sharpe_ratio,
    value_at_risk,
};

/// A daily return keyed by the timestamp of the bar it ends on.
pub type DatedReturn = (DateTime<Utc>, f64);

/// Knobs for the risk computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub risk_free_rate: f64,
    pub trading_days: usize,
    /// Fewer aligned benchmark points than this and beta falls back to 1.0.
    pub beta_min_overlap: usize,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            trading_days: 252,
            beta_min_overlap: 50,
        }
    }
}

/// Risk band derived from annualized volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskRating {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskRating {
    pub fn from_volatility(volatility_annual: f64) -> Self {
        if volatility_annual < 0.15 {
            Self::Low
        } else if volatility_annual < 0.25 {
            Self::Moderate
        } else if volatility_annual < 0.40 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for RiskRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub volatility_daily: f64,
    pub volatility_annual: f64,
    pub mean_return_annual: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub var_95: f64,
    pub var_99: f64,
    pub beta: f64,
    /// Number of date-aligned benchmark pairs beta was estimated from.
    pub beta_overlap: usize,
    pub risk_rating: RiskRating,
    /// Number of daily returns the profile is based on.
    pub sample_size: usize,
}

impl RiskProfile {
    /// Zero volatility: the return series carries no dispersion, so Sharpe and
    /// the volatility band say nothing about the instrument.
    pub fn is_degenerate(&self) -> bool {
        self.volatility_annual == 0.0
    }
}

/// Compute the risk profile of `returns`, with beta against `benchmark` when given.
pub fn compute_risk(
    returns: &[DatedReturn],
    benchmark: Option<&[DatedReturn]>,
    params: &RiskParams,
) -> RiskProfile {
    let values: Vec<f64> = returns.iter().map(|(_, r)| *r).collect();
    let days = params.trading_days;

    let volatility_annual = annual_volatility(&values, days);
    let (beta, beta_overlap) = match benchmark {
        Some(bench) => {
            let (asset, bench) = align_by_date(returns, bench);
            (beta(&asset, &bench, params.beta_min_overlap), asset.len())
        }
        None => (1.0, 0),
    };

    let profile = RiskProfile {
        volatility_daily: daily_volatility(&values),
        volatility_annual,
        mean_return_annual: mean_f64(&values) * days as f64,
        sharpe_ratio: sharpe_ratio(&values, params.risk_free_rate, days),
        max_drawdown: max_drawdown(&values),
        var_95: value_at_risk(&values, 95.0),
        var_99: value_at_risk(&values, 99.0),
        beta,
        beta_overlap,
        risk_rating: RiskRating::from_volatility(volatility_annual),
        sample_size: values.len(),
    };

    debug!(
        sample_size = profile.sample_size,
        beta_overlap,
        volatility_annual,
        rating = profile.risk_rating.label(),
        "risk computed"
    );
    profile
}

/// Intersect two timestamp-sorted return series, keeping paired values.
fn align_by_date(asset: &[DatedReturn], bench: &[DatedReturn]) -> (Vec<f64>, Vec<f64>) {
    let (mut a, mut b) = (Vec::new(), Vec::new());
    let (mut i, mut j) = (0, 0);
    while i < asset.len() && j < bench.len() {
        match asset[i].0.cmp(&bench[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                a.push(asset[i].1);
                b.push(bench[j].1);
                i += 1;
                j += 1;
            }
        }
    }
    (a, b)
}

// ─── Tests ───────────────────────────────────────────────────────────

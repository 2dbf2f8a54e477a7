//! Risk metrics: pure functions over a daily return series.
//!
//! Every function takes plain `f64` slices and returns a scalar. Degenerate
//! inputs (too few observations, zero variance) resolve to documented
//! sentinel values instead of NaN or infinity.

/// Daily standard deviation below this is treated as exactly zero.
pub const VOLATILITY_FLOOR: f64 = 1e-15;

// ─── Individual metric functions ────────────────────────────────────

/// Sample standard deviation of daily returns (divide by N-1).
///
/// Returns 0.0 for fewer than 2 observations or when the result falls
/// below [`VOLATILITY_FLOOR`].
pub fn daily_volatility(returns: &[f64]) -> f64 {
    let std = std_dev(returns);
    if std < VOLATILITY_FLOOR {
        0.0
    } else {
        std
    }
}

/// Annualized volatility: daily volatility * sqrt(trading_days).
pub fn annual_volatility(returns: &[f64], trading_days: usize) -> f64 {
    daily_volatility(returns) * (trading_days as f64).sqrt()
}

/// Annualized Sharpe ratio.
///
/// Sharpe = (mean(daily returns) * trading_days - rf) / annual volatility.
/// Returns 0.0 when volatility is zero.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, trading_days: usize) -> f64 {
    let vol = annual_volatility(returns, trading_days);
    if vol == 0.0 {
        return 0.0;
    }
    (mean_f64(returns) * trading_days as f64 - risk_free_rate) / vol
}

/// Maximum drawdown of the compounded return path, as a non-positive fraction
/// (e.g., -0.15 = 15% drawdown).
///
/// The running peak starts at the first compounded value, so a loss on the
/// very first return is not a drawdown. Returns 0.0 for a monotonically
/// rising path or fewer than 2 returns.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let curve = cumulative_curve(returns);
    if curve.len() < 2 {
        return 0.0;
    }
    let mut peak = curve[0];
    let mut max_dd = 0.0_f64;

    for &value in &curve {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = value / peak - 1.0;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Historical Value-at-Risk at `confidence` percent (e.g., 95.0).
///
/// The `(100 - confidence)`-th percentile of the return distribution, so a
/// loss threshold is reported as a negative return. 0.0 with no returns.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> f64 {
    percentile(returns, 100.0 - confidence)
}

/// Beta of `returns` against `benchmark` (pairs already aligned by date).
///
/// beta = cov(r, b) / var(b), both with N-1 denominators. Returns 1.0 when
/// there are fewer than `min_overlap` pairs or the benchmark has zero variance.
pub fn beta(returns: &[f64], benchmark: &[f64], min_overlap: usize) -> f64 {
    let n = returns.len().min(benchmark.len());
    if n < min_overlap.max(2) {
        return 1.0;
    }
    let (r, b) = (&returns[..n], &benchmark[..n]);
    let (mean_r, mean_b) = (mean_f64(r), mean_f64(b));

    let denom = (n - 1) as f64;
    let cov = r
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_r) * (y - mean_b))
        .sum::<f64>()
        / denom;
    let var = b.iter().map(|y| (y - mean_b).powi(2)).sum::<f64>() / denom;

    if var < VOLATILITY_FLOOR * VOLATILITY_FLOOR {
        return 1.0;
    }
    cov / var
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Compounded growth of one unit: cumprod(1 + r).
pub fn cumulative_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}

/// Percentile `p` in [0, 100] with linear interpolation between order
/// statistics (rank = p/100 * (n-1)).
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

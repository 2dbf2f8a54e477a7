//! Scoring policy: factor weights and decision thresholds.
//!
//! The defaults reproduce the classic table (trend +3/+2/-2/-1, RSI +/-2,
//! Sharpe +/-2, rating +1/-2, volatility +/-1; StrongBuy at 4, Buy at 2,
//! Sell at -2, StrongSell at -4). Nothing here claims to be an optimized
//! trading rule; callers may load their own table from configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Decision;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error(
        "decision thresholds must satisfy strong_sell_at <= sell_at < buy_at <= strong_buy_at \
         (got {strong_sell_at}, {sell_at}, {buy_at}, {strong_buy_at})"
    )]
    NonMonotonicThresholds {
        strong_sell_at: i32,
        sell_at: i32,
        buy_at: i32,
        strong_buy_at: i32,
    },

    #[error("volatility band is inverted: low {low} must not exceed high {high}")]
    InvertedVolatilityBand { low: f64, high: f64 },

    #[error("sharpe band is inverted: negative cutoff {negative} must not exceed high cutoff {high}")]
    InvertedSharpeBand { negative: f64, high: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub trend_strong_bullish: i32,
    pub trend_moderate_bullish: i32,
    pub trend_moderate_bearish: i32,
    pub trend_strong_bearish: i32,

    pub rsi_oversold: i32,
    pub rsi_overbought: i32,

    pub sharpe_high_above: f64,
    pub sharpe_high: i32,
    pub sharpe_negative_below: f64,
    pub sharpe_negative: i32,

    pub rating_low: i32,
    pub rating_very_high: i32,

    pub volatility_low_below: f64,
    pub volatility_low: i32,
    pub volatility_high_above: f64,
    pub volatility_high: i32,

    pub strong_buy_at: i32,
    pub buy_at: i32,
    pub sell_at: i32,
    pub strong_sell_at: i32,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            trend_strong_bullish: 3,
            trend_moderate_bullish: 2,
            trend_moderate_bearish: -1,
            trend_strong_bearish: -2,
            rsi_oversold: 2,
            rsi_overbought: -2,
            sharpe_high_above: 1.0,
            sharpe_high: 2,
            sharpe_negative_below: 0.0,
            sharpe_negative: -2,
            rating_low: 1,
            rating_very_high: -2,
            volatility_low_below: 0.2,
            volatility_low: 1,
            volatility_high_above: 0.4,
            volatility_high: -1,
            strong_buy_at: 4,
            buy_at: 2,
            sell_at: -2,
            strong_sell_at: -4,
        }
    }
}

impl ScoringPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        let ordered = self.strong_sell_at <= self.sell_at
            && self.sell_at < self.buy_at
            && self.buy_at <= self.strong_buy_at;
        if !ordered {
            return Err(PolicyError::NonMonotonicThresholds {
                strong_sell_at: self.strong_sell_at,
                sell_at: self.sell_at,
                buy_at: self.buy_at,
                strong_buy_at: self.strong_buy_at,
            });
        }
        if self.volatility_low_below > self.volatility_high_above {
            return Err(PolicyError::InvertedVolatilityBand {
                low: self.volatility_low_below,
                high: self.volatility_high_above,
            });
        }
        if self.sharpe_negative_below > self.sharpe_high_above {
            return Err(PolicyError::InvertedSharpeBand {
                negative: self.sharpe_negative_below,
                high: self.sharpe_high_above,
            });
        }
        Ok(())
    }

    /// Map a score to a decision. Buy thresholds are checked first; with a
    /// validated policy the buy and sell ranges never overlap.
    pub fn decide(&self, score: i32) -> Decision {
        if score >= self.strong_buy_at {
            Decision::StrongBuy
        } else if score >= self.buy_at {
            Decision::Buy
        } else if score <= self.strong_sell_at {
            Decision::StrongSell
        } else if score <= self.sell_at {
            Decision::Sell
        } else {
            Decision::Hold
        }
    }
}

//! Recommendation Scorer.
//!
//! Adds up integer points from the trend tag, the RSI tag, the Sharpe ratio,
//! the risk rating and annualized volatility, then maps the total to a
//! decision through the [`ScoringPolicy`] threshold table.
//!
//! Factors are always evaluated in that order, and every evaluated factor
//! leaves a [`ReasonTag`] (including zero-point ones), so identical inputs
//! always produce identical explanations. A factor is excluded (no tag, no
//! points) when its input is unavailable:
//! - trend / RSI reporting `NoSignal`
//! - risk rating and volatility when the return series has zero volatility

pub mod policy;

pub use policy::{PolicyError, ScoringPolicy};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::IndicatorSet;
use crate::risk::{RiskProfile, RiskRating};
use crate::signals::{RsiSignal, TrendSignal};

/// Final call, ordered from most bearish to most bullish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Decision {
    StrongSell,
    Sell,
    Hold,
    Buy,
    StrongBuy,
}

impl Decision {
    pub const ALL: [Decision; 5] = [
        Decision::StrongSell,
        Decision::Sell,
        Decision::Hold,
        Decision::Buy,
        Decision::StrongBuy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::StrongSell => "STRONG SELL",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
            Self::Buy => "BUY",
            Self::StrongBuy => "STRONG BUY",
        }
    }

    /// One-line justification attached to each decision.
    pub fn rationale(self) -> &'static str {
        match self {
            Self::StrongBuy => "Multiple positive technical and risk indicators align",
            Self::Buy => "Favorable technical outlook with acceptable risk",
            Self::Hold => "Mixed signals suggest cautious approach",
            Self::Sell => "Unfavorable risk-return profile",
            Self::StrongSell => "Multiple negative indicators suggest high risk",
        }
    }

    pub fn risk_level(self) -> RiskLevel {
        match self {
            Self::StrongBuy | Self::Buy | Self::Hold => RiskLevel::Moderate,
            Self::Sell | Self::StrongSell => RiskLevel::High,
        }
    }

    pub fn is_bullish(self) -> bool {
        self > Self::Hold
    }

    pub fn is_bearish(self) -> bool {
        self < Self::Hold
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// 1-2 months, for volatile instruments.
    ShortTerm,
    /// 3-6 months.
    MediumTerm,
}

impl Horizon {
    /// Annualized volatility above which the short horizon is suggested.
    pub const SHORT_TERM_ABOVE: f64 = 0.30;

    pub fn from_volatility(volatility_annual: f64) -> Self {
        if volatility_annual > Self::SHORT_TERM_ABOVE {
            Self::ShortTerm
        } else {
            Self::MediumTerm
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ShortTerm => "1-2 months",
            Self::MediumTerm => "3-6 months",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    Trend,
    Rsi,
    Sharpe,
    RiskRating,
    Volatility,
}

/// One scored factor, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonTag {
    pub factor: Factor,
    pub label: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecommendation {
    pub score: i32,
    pub decision: Decision,
    pub risk_level: RiskLevel,
    pub rationale: String,
    pub horizon: Horizon,
    pub reasoning: Vec<ReasonTag>,
    /// Factors left out because their input was unavailable or degenerate.
    pub excluded: Vec<Factor>,
}

impl ScoredRecommendation {
    pub fn reasoning_labels(&self) -> Vec<&str> {
        self.reasoning.iter().map(|t| t.label.as_str()).collect()
    }

    pub fn is_partial(&self) -> bool {
        !self.excluded.is_empty()
    }
}

/// Score an indicator set and risk profile under `policy`.
pub fn score(
    indicators: &IndicatorSet,
    risk: &RiskProfile,
    policy: &ScoringPolicy,
) -> ScoredRecommendation {
    let mut reasoning = Vec::with_capacity(5);
    let mut excluded = Vec::new();

    // Trend
    let trend_points = match indicators.trend {
        TrendSignal::StrongBullish => Some(policy.trend_strong_bullish),
        TrendSignal::ModerateBullish => Some(policy.trend_moderate_bullish),
        TrendSignal::ModerateBearish => Some(policy.trend_moderate_bearish),
        TrendSignal::StrongBearish => Some(policy.trend_strong_bearish),
        TrendSignal::Sideways => Some(0),
        TrendSignal::NoSignal => None,
    };
    match trend_points {
        Some(points) => reasoning.push(ReasonTag {
            factor: Factor::Trend,
            label: format!("{} trend", indicators.trend.label()),
            points,
        }),
        None => excluded.push(Factor::Trend),
    }

    // RSI
    match (indicators.rsi.tag, indicators.rsi.latest) {
        (RsiSignal::NoSignal, _) | (_, None) => excluded.push(Factor::Rsi),
        (tag, Some(value)) => {
            let points = if tag.is_oversold() {
                policy.rsi_oversold
            } else if tag.is_overbought() {
                policy.rsi_overbought
            } else {
                0
            };
            reasoning.push(ReasonTag {
                factor: Factor::Rsi,
                label: format!("RSI {} at {value:.1}", tag.label().to_lowercase()),
                points,
            });
        }
    }

    // Sharpe
    let sharpe = risk.sharpe_ratio;
    let (points, label) = if sharpe > policy.sharpe_high_above {
        (
            policy.sharpe_high,
            format!("Strong risk-adjusted return (Sharpe {sharpe:.2})"),
        )
    } else if sharpe < policy.sharpe_negative_below {
        (
            policy.sharpe_negative,
            format!("Negative risk-adjusted return (Sharpe {sharpe:.2})"),
        )
    } else {
        (0, format!("Modest risk-adjusted return (Sharpe {sharpe:.2})"))
    };
    reasoning.push(ReasonTag {
        factor: Factor::Sharpe,
        label,
        points,
    });

    // Risk rating and volatility
    if risk.is_degenerate() {
        excluded.push(Factor::RiskRating);
        excluded.push(Factor::Volatility);
    } else {
        let points = match risk.risk_rating {
            RiskRating::Low => policy.rating_low,
            RiskRating::VeryHigh => policy.rating_very_high,
            RiskRating::Moderate | RiskRating::High => 0,
        };
        reasoning.push(ReasonTag {
            factor: Factor::RiskRating,
            label: format!("{} risk rating", risk.risk_rating.label()),
            points,
        });

        let vol = risk.volatility_annual;
        let (points, band) = if vol < policy.volatility_low_below {
            (policy.volatility_low, "Low")
        } else if vol > policy.volatility_high_above {
            (policy.volatility_high, "High")
        } else {
            (0, "Moderate")
        };
        reasoning.push(ReasonTag {
            factor: Factor::Volatility,
            label: format!("{band} volatility ({:.1}% annualized)", vol * 100.0),
            points,
        });
    }

    let total: i32 = reasoning.iter().map(|t| t.points).sum();
    let decision = policy.decide(total);

    debug!(
        score = total,
        decision = decision.label(),
        excluded = excluded.len(),
        "recommendation scored"
    );

    ScoredRecommendation {
        score: total,
        decision,
        risk_level: decision.risk_level(),
        rationale: decision.rationale().to_string(),
        horizon: Horizon::from_volatility(risk.volatility_annual),
        reasoning,
        excluded,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

//! Signal Classifier: maps the latest indicator values to discrete tags.
//!
//! Every classifier takes `Option<f64>` inputs; `None` means the indicator is
//! undefined at the latest bar (insufficient history or a degenerate window)
//! and always yields the `NoSignal` variant. Tags never look at anything other
//! than the values handed to them.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const RSI_SEVERELY_OVERBOUGHT: f64 = 75.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_SEVERELY_OVERSOLD: f64 = 25.0;

pub const STOCHASTIC_OVERBOUGHT: f64 = 80.0;
pub const STOCHASTIC_OVERSOLD: f64 = 20.0;

macro_rules! labelled {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsiSignal {
    SeverelyOverbought,
    Overbought,
    Neutral,
    Oversold,
    SeverelyOversold,
    NoSignal,
}

labelled!(RsiSignal {
    SeverelyOverbought => "Severely Overbought",
    Overbought => "Overbought",
    Neutral => "Neutral",
    Oversold => "Oversold",
    SeverelyOversold => "Severely Oversold",
    NoSignal => "No Signal",
});

impl RsiSignal {
    pub fn is_overbought(self) -> bool {
        matches!(self, Self::Overbought | Self::SeverelyOverbought)
    }

    pub fn is_oversold(self) -> bool {
        matches!(self, Self::Oversold | Self::SeverelyOversold)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MacdSignal {
    BullishMomentum,
    BearishMomentum,
    Mixed,
    NoSignal,
}

labelled!(MacdSignal {
    BullishMomentum => "Bullish Momentum",
    BearishMomentum => "Bearish Momentum",
    Mixed => "Mixed",
    NoSignal => "No Signal",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandSignal {
    AboveUpperBand,
    WithinBands,
    BelowLowerBand,
    NoSignal,
}

labelled!(BandSignal {
    AboveUpperBand => "Above Upper Band",
    WithinBands => "Within Bands",
    BelowLowerBand => "Below Lower Band",
    NoSignal => "No Signal",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendSignal {
    StrongBullish,
    ModerateBullish,
    Sideways,
    ModerateBearish,
    StrongBearish,
    NoSignal,
}

labelled!(TrendSignal {
    StrongBullish => "Strong Bullish",
    ModerateBullish => "Moderate Bullish",
    Sideways => "Sideways",
    ModerateBearish => "Moderate Bearish",
    StrongBearish => "Strong Bearish",
    NoSignal => "No Signal",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StochasticSignal {
    Overbought,
    Neutral,
    Oversold,
    NoSignal,
}

labelled!(StochasticSignal {
    Overbought => "Overbought",
    Neutral => "Neutral",
    Oversold => "Oversold",
    NoSignal => "No Signal",
});

/// Close relative to a single moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceSignal {
    PriceAbove,
    PriceBelow,
    NoSignal,
}

labelled!(PriceSignal {
    PriceAbove => "Price Above",
    PriceBelow => "Price Below",
    NoSignal => "No Signal",
});

pub fn classify_rsi(rsi: Option<f64>) -> RsiSignal {
    match rsi {
        None => RsiSignal::NoSignal,
        Some(v) if v > RSI_SEVERELY_OVERBOUGHT => RsiSignal::SeverelyOverbought,
        Some(v) if v > RSI_OVERBOUGHT => RsiSignal::Overbought,
        Some(v) if v < RSI_SEVERELY_OVERSOLD => RsiSignal::SeverelyOversold,
        Some(v) if v < RSI_OVERSOLD => RsiSignal::Oversold,
        Some(_) => RsiSignal::Neutral,
    }
}

pub fn classify_macd(macd: Option<f64>, signal: Option<f64>, histogram: Option<f64>) -> MacdSignal {
    let (Some(macd), Some(signal), Some(histogram)) = (macd, signal, histogram) else {
        return MacdSignal::NoSignal;
    };
    if macd > signal && histogram > 0.0 {
        MacdSignal::BullishMomentum
    } else if macd < signal && histogram < 0.0 {
        MacdSignal::BearishMomentum
    } else {
        MacdSignal::Mixed
    }
}

pub fn classify_bollinger(close: f64, upper: Option<f64>, lower: Option<f64>) -> BandSignal {
    let (Some(upper), Some(lower)) = (upper, lower) else {
        return BandSignal::NoSignal;
    };
    if close > upper {
        BandSignal::AboveUpperBand
    } else if close < lower {
        BandSignal::BelowLowerBand
    } else {
        BandSignal::WithinBands
    }
}

/// Moving-average trend from the short/medium/long SMAs.
///
/// The long SMA only distinguishes Strong from Moderate; without it the
/// classification tops out at Moderate.
pub fn classify_trend(
    close: f64,
    short: Option<f64>,
    medium: Option<f64>,
    long: Option<f64>,
) -> TrendSignal {
    let (Some(short), Some(medium)) = (short, medium) else {
        return TrendSignal::NoSignal;
    };

    if close > short && short > medium {
        match long {
            Some(long) if medium > long => TrendSignal::StrongBullish,
            _ => TrendSignal::ModerateBullish,
        }
    } else if close < short && short < medium {
        match long {
            Some(long) if medium < long => TrendSignal::StrongBearish,
            _ => TrendSignal::ModerateBearish,
        }
    } else {
        TrendSignal::Sideways
    }
}

pub fn classify_stochastic(k: Option<f64>) -> StochasticSignal {
    match k {
        None => StochasticSignal::NoSignal,
        Some(v) if v > STOCHASTIC_OVERBOUGHT => StochasticSignal::Overbought,
        Some(v) if v < STOCHASTIC_OVERSOLD => StochasticSignal::Oversold,
        Some(_) => StochasticSignal::Neutral,
    }
}

pub fn classify_price(close: f64, average: Option<f64>) -> PriceSignal {
    match average {
        None => PriceSignal::NoSignal,
        Some(avg) if close > avg => PriceSignal::PriceAbove,
        Some(_) => PriceSignal::PriceBelow,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_threshold_table() {
        assert_eq!(classify_rsi(Some(80.0)), RsiSignal::SeverelyOverbought);
        assert_eq!(classify_rsi(Some(75.0)), RsiSignal::Overbought);
        assert_eq!(classify_rsi(Some(72.0)), RsiSignal::Overbought);
        assert_eq!(classify_rsi(Some(70.0)), RsiSignal::Neutral);
        assert_eq!(classify_rsi(Some(50.0)), RsiSignal::Neutral);
        assert_eq!(classify_rsi(Some(30.0)), RsiSignal::Neutral);
        assert_eq!(classify_rsi(Some(27.0)), RsiSignal::Oversold);
        assert_eq!(classify_rsi(Some(25.0)), RsiSignal::Oversold);
        assert_eq!(classify_rsi(Some(10.0)), RsiSignal::SeverelyOversold);
        assert_eq!(classify_rsi(None), RsiSignal::NoSignal);
    }

    #[test]
    fn macd_requires_agreement() {
        assert_eq!(
            classify_macd(Some(1.0), Some(0.5), Some(0.5)),
            MacdSignal::BullishMomentum
        );
        assert_eq!(
            classify_macd(Some(-1.0), Some(-0.5), Some(-0.5)),
            MacdSignal::BearishMomentum
        );
        assert_eq!(classify_macd(Some(0.0), Some(0.0), Some(0.0)), MacdSignal::Mixed);
        assert_eq!(classify_macd(Some(1.0), None, None), MacdSignal::NoSignal);
    }

    #[test]
    fn bollinger_positions() {
        assert_eq!(classify_bollinger(111.0, Some(110.0), Some(90.0)), BandSignal::AboveUpperBand);
        assert_eq!(classify_bollinger(89.0, Some(110.0), Some(90.0)), BandSignal::BelowLowerBand);
        assert_eq!(classify_bollinger(110.0, Some(110.0), Some(90.0)), BandSignal::WithinBands);
        assert_eq!(classify_bollinger(100.0, None, Some(90.0)), BandSignal::NoSignal);
    }

    #[test]
    fn trend_orderings() {
        let t = |c, s, m, l| classify_trend(c, Some(s), Some(m), l);
        assert_eq!(t(104.0, 103.0, 102.0, Some(101.0)), TrendSignal::StrongBullish);
        assert_eq!(t(104.0, 103.0, 102.0, Some(105.0)), TrendSignal::ModerateBullish);
        assert_eq!(t(104.0, 103.0, 102.0, None), TrendSignal::ModerateBullish);
        assert_eq!(t(100.0, 101.0, 102.0, Some(103.0)), TrendSignal::StrongBearish);
        assert_eq!(t(100.0, 101.0, 102.0, Some(99.0)), TrendSignal::ModerateBearish);
        assert_eq!(t(100.0, 100.0, 100.0, Some(100.0)), TrendSignal::Sideways);
        assert_eq!(t(103.0, 101.0, 102.0, Some(100.0)), TrendSignal::Sideways);
        assert_eq!(classify_trend(100.0, Some(99.0), None, None), TrendSignal::NoSignal);
    }

    #[test]
    fn stochastic_and_price() {
        assert_eq!(classify_stochastic(Some(85.0)), StochasticSignal::Overbought);
        assert_eq!(classify_stochastic(Some(15.0)), StochasticSignal::Oversold);
        assert_eq!(classify_stochastic(Some(50.0)), StochasticSignal::Neutral);
        assert_eq!(classify_stochastic(None), StochasticSignal::NoSignal);

        assert_eq!(classify_price(101.0, Some(100.0)), PriceSignal::PriceAbove);
        assert_eq!(classify_price(100.0, Some(100.0)), PriceSignal::PriceBelow);
        assert_eq!(classify_price(100.0, None), PriceSignal::NoSignal);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(TrendSignal::StrongBullish.to_string(), "Strong Bullish");
        assert_eq!(RsiSignal::SeverelyOversold.label(), "Severely Oversold");
        assert!(RsiSignal::SeverelyOverbought.is_overbought());
        assert!(!RsiSignal::Neutral.is_oversold());
    }
}

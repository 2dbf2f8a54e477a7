//! BarSeries: a validated, immutable, time-ordered sequence of bars.
//!
//! Construction is the only place input validation happens. Every downstream
//! computation can assume: at least one bar, strictly increasing timestamps,
//! and sane OHLC values on every bar.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bar;

/// Fatal input problems. These are the only errors the engine reports to callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("bar series for '{symbol}' is empty")]
    EmptySeries { symbol: String },

    #[error("invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("timestamps not increasing at index {index}")]
    NonMonotonicTimestamp { index: usize },

    #[error("duplicate timestamp at index {index}")]
    DuplicateTimestamp { index: usize },
}

/// Content hash of a bar series (BLAKE3, hex encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesFingerprint(pub String);

impl fmt::Display for SeriesFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated bar series for one symbol.
///
/// Fields are private so an invalid series cannot be assembled by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap a bar sequence.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, InputError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(InputError::EmptySeries { symbol });
        }

        for (index, bar) in bars.iter().enumerate() {
            if let Some(reason) = bar.defect() {
                return Err(InputError::InvalidBar { index, reason });
            }
            if index > 0 {
                let prev = bars[index - 1].timestamp;
                if bar.timestamp == prev {
                    return Err(InputError::DuplicateTimestamp { index });
                }
                if bar.timestamp < prev {
                    return Err(InputError::NonMonotonicTimestamp { index });
                }
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar. A validated series always has one.
    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Simple returns `close[t] / close[t-1] - 1`, keyed by the timestamp of bar `t`.
    ///
    /// A series of n bars yields n-1 returns.
    pub fn returns(&self) -> Vec<(chrono::DateTime<chrono::Utc>, f64)> {
        self.bars
            .windows(2)
            .map(|w| (w[1].timestamp, w[1].close / w[0].close - 1.0))
            .collect()
    }

    /// Deterministic content hash over symbol and every bar field.
    pub fn fingerprint(&self) -> SeriesFingerprint {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        for bar in &self.bars {
            hasher.update(&bar.timestamp.timestamp_millis().to_le_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        SeriesFingerprint(hasher.finalize().to_hex().to_string())
    }
}

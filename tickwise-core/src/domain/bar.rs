//! Bar: the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single instrument over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any price field is NaN or infinite (missing data).
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Explains why the bar is not a valid OHLC bar, or `None` when it is.
    ///
    /// Checks: finite prices, positive open/close, high is the maximum and low
    /// is the minimum of the four prices.
    pub fn defect(&self) -> Option<&'static str> {
        if self.is_void() {
            return Some("non-finite price field");
        }
        if self.open <= 0.0 || self.close <= 0.0 || self.low <= 0.0 {
            return Some("non-positive price");
        }
        if self.high < self.low {
            return Some("high below low");
        }
        if self.high < self.open || self.high < self.close {
            return Some("high below open/close");
        }
        if self.low > self.open || self.low > self.close {
            return Some("low above open/close");
        }
        None
    }

    /// Basic OHLCV sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        self.defect().is_none()
    }
}

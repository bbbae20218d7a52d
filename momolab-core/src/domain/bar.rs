//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single symbol.
///
/// The `date` is the bar's timestamp; the replay delivers bars in
/// non-decreasing date order across all symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Bar with every price set to `close`. Handy for feeds that only carry closes.
    pub fn from_close(symbol: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }

    /// A close the engine can score: finite and strictly positive.
    pub fn has_valid_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            symbol: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_has_valid_close() {
        assert!(sample_bar().has_valid_close());
    }

    #[test]
    fn zero_negative_and_nan_closes_are_invalid() {
        for close in [0.0, -1.5, f64::NAN, f64::INFINITY] {
            let mut bar = sample_bar();
            bar.close = close;
            assert!(!bar.has_valid_close(), "close {close} should be invalid");
        }
    }

    #[test]
    fn from_close_fills_ohlc() {
        let bar = Bar::from_close("QQQ", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 42.0);
        assert_eq!(bar.open, 42.0);
        assert_eq!(bar.high, 42.0);
        assert_eq!(bar.low, 42.0);
        assert_eq!(bar.volume, 0);
    }
}

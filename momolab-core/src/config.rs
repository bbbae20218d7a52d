//! Strategy parameters, resolved once at startup and borrowed by the core.

use serde::{Deserialize, Serialize};

use crate::gate::TradingWindow;

pub const DEFAULT_LOOKBACK: usize = 42;
pub const DEFAULT_MIN_LEN: usize = 300;
pub const DEFAULT_TOP_COUNT: usize = 4;
pub const DEFAULT_WARMUP_DAYS: u32 = 5;

/// Immutable configuration of the momentum rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// ROC window length. Must be >= 1.
    pub lookback: usize,
    /// A score is rankable only once more than this many bars were recorded.
    pub min_len: usize,
    /// Maximum number of instruments held long.
    pub top_count: usize,
    /// Day transitions skipped before the first rebalance may fire.
    pub warmup_days: u32,
    pub window: TradingWindow,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_LOOKBACK,
            min_len: DEFAULT_MIN_LEN,
            top_count: DEFAULT_TOP_COUNT,
            warmup_days: DEFAULT_WARMUP_DAYS,
            window: TradingWindow::unbounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RotationConfig::default();
        assert_eq!(config.lookback, 42);
        assert_eq!(config.min_len, 300);
        assert_eq!(config.top_count, 4);
        assert_eq!(config.warmup_days, 5);
        assert_eq!(config.window, TradingWindow::unbounded());
    }
}

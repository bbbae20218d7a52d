//! Rate of Change (ROC).
//!
//! ROC[t] = close[t] / close[t-lookback] - 1
//! Undefined for the first `lookback` observations.

use std::collections::VecDeque;

/// Incremental rate of change over a fixed lookback.
///
/// Holds the last `lookback + 1` prices so the oldest one is exactly
/// `lookback` observations behind the newest. The lookback is fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct Roc {
    lookback: usize,
    window: VecDeque<f64>,
    last: Option<f64>,
}

impl Roc {
    pub fn new(lookback: usize) -> Self {
        assert!(lookback >= 1, "ROC lookback must be >= 1");
        Self {
            lookback,
            window: VecDeque::new(),
            last: None,
        }
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Feed the next price and return the updated ROC, if defined.
    ///
    /// Callers must reject non-positive prices before feeding them.
    pub fn update(&mut self, price: f64) -> Option<f64> {
        if self.window.len() == self.lookback + 1 {
            self.window.pop_front();
        }
        self.window.push_back(price);

        self.last = if self.window.len() == self.lookback + 1 {
            let base = self.window[0];
            Some(price / base - 1.0)
        } else {
            None
        };
        self.last
    }

    /// Most recent ROC value.
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

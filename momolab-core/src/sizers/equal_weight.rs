//! Equal-weight sizer: every allocated slot gets the same notional.

use std::num::NonZeroUsize;

use crate::sizers::Sizer;

#[derive(Debug, Clone, Copy, Default)]
pub struct EqualWeightSizer;

impl Sizer for EqualWeightSizer {
    fn notional_per_slot(&self, equity: f64, allocated: NonZeroUsize) -> f64 {
        equity / allocated.get() as f64
    }

    fn quantity(&self, notional: f64, price: f64) -> u64 {
        if !notional.is_finite() || !price.is_finite() || notional <= 0.0 || price <= 0.0 {
            return 0;
        }
        // Fractional shares are not supported: truncate toward zero.
        (notional / price).floor() as u64
    }

    fn name(&self) -> &str {
        "EqualWeight"
    }
}

//! Position sizers: from account equity to share quantity.
//!
//! Sizers translate account equity into a notional per allocation slot and
//! then into whole-share quantities. They never decide which instruments
//! are held; that is the scheduler's job.

pub mod equal_weight;

pub use equal_weight::EqualWeightSizer;

use std::num::NonZeroUsize;

/// Position sizing logic
///
/// # Responsibilities
/// - Split equity across the slots actually allocated
/// - Convert a notional into a whole-share quantity
///
/// # Non-Responsibilities
/// - Sizers do NOT pick instruments (ranking does)
/// - Sizers do NOT decide entry/exit (the translator does)
pub trait Sizer: Send + Sync {
    /// Notional per allocated slot. A zero allocation cannot be expressed, so
    /// callers short-circuit before sizing when nothing qualifies.
    fn notional_per_slot(&self, equity: f64, allocated: NonZeroUsize) -> f64;

    /// Whole shares for `notional` at `price`. Returns 0 for unusable inputs.
    fn quantity(&self, notional: f64, price: f64) -> u64;

    /// Sizer name for logging
    fn name(&self) -> &str;
}

//! Order intent translator: diff current vs desired sign into intents.
//!
//! | current | desired | intents                     |
//! |---------|---------|-----------------------------|
//! |  0      |  0      | none                        |
//! |  0      |  1      | enter-long(qty)             |
//! |  0      | -1      | enter-short(qty)            |
//! |  1      |  1      | none                        |
//! |  1      |  0      | exit-long                   |
//! |  1      | -1      | exit-long, enter-short(qty) |
//! | -1      | -1      | none                        |
//! | -1      |  0      | exit-short                  |
//! | -1      |  1      | exit-short, enter-long(qty) |
//!
//! Flips stay two separate intents, exit first.

use crate::domain::{IntentReason, OrderIntent, Sign};

/// Minimal ordered intents that move `current` to `desired`.
///
/// `entry_quantity` is only used by rows that enter a position.
pub fn translate(
    symbol: &str,
    current: Sign,
    desired: Sign,
    entry_quantity: u64,
    reason: IntentReason,
) -> Vec<OrderIntent> {
    match (current, desired) {
        (Sign::Flat, Sign::Flat) | (Sign::Long, Sign::Long) | (Sign::Short, Sign::Short) => {
            Vec::new()
        }
        (Sign::Flat, Sign::Long) => vec![OrderIntent::enter_long(symbol, entry_quantity, reason)],
        (Sign::Flat, Sign::Short) => {
            vec![OrderIntent::enter_short(symbol, entry_quantity, reason)]
        }
        (Sign::Long, Sign::Flat) => vec![OrderIntent::exit_long(symbol, reason)],
        (Sign::Long, Sign::Short) => vec![
            OrderIntent::exit_long(symbol, reason),
            OrderIntent::enter_short(symbol, entry_quantity, reason),
        ],
        (Sign::Short, Sign::Flat) => vec![OrderIntent::exit_short(symbol, reason)],
        (Sign::Short, Sign::Long) => vec![
            OrderIntent::exit_short(symbol, reason),
            OrderIntent::enter_long(symbol, entry_quantity, reason),
        ],
    }
}

/// Exit intent for whatever the instrument currently holds, if anything.
pub fn liquidate(symbol: &str, current: Sign, reason: IntentReason) -> Option<OrderIntent> {
    translate(symbol, current, Sign::Flat, 0, reason).pop()
}

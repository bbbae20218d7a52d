//! Order intents: what the engine asks the execution collaborator to do.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::Sign;

/// Direction of an order intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentDirection {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

impl IntentDirection {
    pub fn is_entry(self) -> bool {
        matches!(self, IntentDirection::EnterLong | IntentDirection::EnterShort)
    }

    pub fn is_exit(self) -> bool {
        !self.is_entry()
    }

    /// Position sign once the intent is executed.
    pub fn resulting_sign(self) -> Sign {
        match self {
            IntentDirection::EnterLong => Sign::Long,
            IntentDirection::EnterShort => Sign::Short,
            IntentDirection::ExitLong | IntentDirection::ExitShort => Sign::Flat,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntentDirection::EnterLong => "enter-long",
            IntentDirection::EnterShort => "enter-short",
            IntentDirection::ExitLong => "exit-long",
            IntentDirection::ExitShort => "exit-short",
        }
    }
}

/// Why an intent was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentReason {
    /// Desired position changed at a monthly rebalance.
    Rebalance,
    /// Hard liquidation after the trading-stop date.
    TradingStop,
}

/// A single position-change request.
///
/// Entries carry a whole-share quantity. Exits carry none: they close the
/// entire position held at the venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub direction: IntentDirection,
    pub quantity: Option<u64>,
    pub reason: IntentReason,
}

impl OrderIntent {
    pub fn enter_long(symbol: impl Into<String>, quantity: u64, reason: IntentReason) -> Self {
        Self::entry(symbol, IntentDirection::EnterLong, quantity, reason)
    }

    pub fn enter_short(symbol: impl Into<String>, quantity: u64, reason: IntentReason) -> Self {
        Self::entry(symbol, IntentDirection::EnterShort, quantity, reason)
    }

    pub fn exit_long(symbol: impl Into<String>, reason: IntentReason) -> Self {
        Self::exit(symbol, IntentDirection::ExitLong, reason)
    }

    pub fn exit_short(symbol: impl Into<String>, reason: IntentReason) -> Self {
        Self::exit(symbol, IntentDirection::ExitShort, reason)
    }

    fn entry(
        symbol: impl Into<String>,
        direction: IntentDirection,
        quantity: u64,
        reason: IntentReason,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            quantity: Some(quantity),
            reason,
        }
    }

    fn exit(symbol: impl Into<String>, direction: IntentDirection, reason: IntentReason) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            quantity: None,
            reason,
        }
    }
}

impl fmt::Display for OrderIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantity {
            Some(qty) => write!(f, "{} {} x{}", self.direction.as_str(), self.symbol, qty),
            None => write!(f, "{} {}", self.direction.as_str(), self.symbol),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_carry_quantity_exits_do_not() {
        let entry = OrderIntent::enter_long("SPY", 100, IntentReason::Rebalance);
        assert_eq!(entry.quantity, Some(100));
        assert!(entry.direction.is_entry());

        let exit = OrderIntent::exit_short("SPY", IntentReason::TradingStop);
        assert_eq!(exit.quantity, None);
        assert!(exit.direction.is_exit());
    }

    #[test]
    fn resulting_sign() {
        assert_eq!(IntentDirection::EnterLong.resulting_sign(), Sign::Long);
        assert_eq!(IntentDirection::EnterShort.resulting_sign(), Sign::Short);
        assert_eq!(IntentDirection::ExitLong.resulting_sign(), Sign::Flat);
        assert_eq!(IntentDirection::ExitShort.resulting_sign(), Sign::Flat);
    }

    #[test]
    fn display_format() {
        let entry = OrderIntent::enter_short("QQQ", 7, IntentReason::Rebalance);
        assert_eq!(entry.to_string(), "enter-short QQQ x7");
        let exit = OrderIntent::exit_long("QQQ", IntentReason::Rebalance);
        assert_eq!(exit.to_string(), "exit-long QQQ");
    }

    #[test]
    fn serializes_kebab_case() {
        let intent = OrderIntent::exit_long("IWM", IntentReason::TradingStop);
        let json = serde_json::to_string(&intent).unwrap();
        assert!(json.contains("\"exit-long\""));
        assert!(json.contains("\"trading-stop\""));
    }
}

//! momolab core: the momentum-rotation decision engine.
//!
//! This crate contains everything that decides what to hold:
//! - Domain types (bars, instruments, signs, intents, fills, trades)
//! - Streaming rate-of-change indicator
//! - Instrument state registry (one record per subscribed symbol)
//! - Trading-window gate with warm-up counter
//! - Monthly rebalance scheduler, equal-weight sizer, intent translator
//! - Collaborator contracts (broker, account, instrument resolver)
//!
//! Replay, execution simulation and reporting live in `momolab-runner`.

pub mod config;
pub mod domain;
pub mod error;
pub mod gate;
pub mod indicators;
pub mod rebalance;
pub mod registry;
pub mod sizers;
pub mod strategy;
pub mod translator;
pub mod venue;

pub use config::RotationConfig;
pub use error::StrategyError;
pub use rebalance::{RankingEntry, RebalanceOutcome};
pub use strategy::{MomentumRotation, Strategy};
pub use venue::{Account, Broker, BrokerError, InstrumentResolver, Venue};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core value types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::OrderIntent>();
        require_sync::<domain::OrderIntent>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<registry::InstrumentRegistry>();
        require_sync::<registry::InstrumentRegistry>();
        require_send::<RotationConfig>();
        require_sync::<RotationConfig>();
        require_send::<RebalanceOutcome>();
        require_sync::<RebalanceOutcome>();
    }

    /// Architecture contract: the translator is a pure function of signs.
    ///
    /// It takes no registry, broker or account, so it cannot see anything
    /// but the (current, desired) pair it is handed.
    #[test]
    fn translator_has_no_venue_parameter() {
        fn _check(
            current: domain::Sign,
            desired: domain::Sign,
        ) -> Vec<domain::OrderIntent> {
            translator::translate("SPY", current, desired, 1, domain::IntentReason::Rebalance)
        }
    }
}

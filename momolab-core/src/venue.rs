//! Collaborator contracts the engine calls into.
//!
//! The core never implements these. The runner ships a paper broker, a live
//! deployment would wrap a real brokerage API.

use thiserror::Error;

use crate::domain::{Instrument, OrderIntent};

/// Errors reported by execution or data collaborators.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("unknown instrument '{0}'")]
    UnknownInstrument(String),

    #[error("order rejected for {symbol}: {reason}")]
    Rejected { symbol: String, reason: String },
}

/// Execution side: position lookup, order placement, cancellation.
pub trait Broker {
    /// Signed position quantity (positive long, negative short, zero flat).
    fn position(&self, symbol: &str) -> i64;

    /// Place one intent. Exits close the whole position.
    fn submit(&mut self, intent: &OrderIntent) -> Result<(), BrokerError>;

    /// Drop every outstanding (unfilled) order.
    fn cancel_all_orders(&mut self);
}

/// Account ledger.
pub trait Account {
    /// Equity at the most recent end-of-day mark.
    fn end_equity(&self) -> f64;
}

/// Symbol resolution supplied by the data feed.
pub trait InstrumentResolver {
    fn resolve(&self, symbol: &str) -> Result<Instrument, BrokerError>;
}

/// Everything the strategy talks to during a run.
pub trait Venue: Broker + Account {}

impl<T: Broker + Account> Venue for T {}

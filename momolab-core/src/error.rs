use chrono::NaiveDate;
use thiserror::Error;

use crate::venue::BrokerError;

/// Errors raised by the strategy core. All of them abort the run.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("non-positive close for [{symbol} {date}]: {close}")]
    NonPositiveClose {
        symbol: String,
        date: NaiveDate,
        close: f64,
    },

    #[error("symbol '{0}' is not subscribed")]
    UnknownSymbol(String),

    #[error("symbol '{0}' subscribed twice")]
    DuplicateSymbol(String),

    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),
}

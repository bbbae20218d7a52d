//! Shared fixtures for core integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;

use momolab_core::domain::{Bar, Instrument, OrderIntent};
use momolab_core::{Account, Broker, BrokerError, InstrumentResolver};

/// What the broker saw, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerCall {
    Cancel,
    Submit(OrderIntent),
}

/// In-memory broker that records every call and never fills anything.
///
/// Positions are set by the test; submissions do not move them.
#[derive(Debug, Default)]
pub struct RecordingBroker {
    pub positions: HashMap<String, i64>,
    pub equity: f64,
    pub calls: Vec<BrokerCall>,
}

impl RecordingBroker {
    pub fn with_equity(equity: f64) -> Self {
        Self {
            equity,
            ..Self::default()
        }
    }

    pub fn set_position(&mut self, symbol: &str, quantity: i64) {
        self.positions.insert(symbol.to_string(), quantity);
    }

    pub fn submitted(&self) -> Vec<OrderIntent> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BrokerCall::Submit(intent) => Some(intent.clone()),
                BrokerCall::Cancel => None,
            })
            .collect()
    }

    pub fn cancel_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BrokerCall::Cancel))
            .count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }
}

impl Broker for RecordingBroker {
    fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    fn submit(&mut self, intent: &OrderIntent) -> Result<(), BrokerError> {
        self.calls.push(BrokerCall::Submit(intent.clone()));
        Ok(())
    }

    fn cancel_all_orders(&mut self) {
        self.calls.push(BrokerCall::Cancel);
    }
}

impl Account for RecordingBroker {
    fn end_equity(&self) -> f64 {
        self.equity
    }
}

/// Resolver that knows a fixed symbol list.
pub struct ListResolver(pub Vec<&'static str>);

impl InstrumentResolver for ListResolver {
    fn resolve(&self, symbol: &str) -> Result<Instrument, BrokerError> {
        if self.0.contains(&symbol) {
            Ok(Instrument::on_venue(symbol, "paper"))
        } else {
            Err(BrokerError::UnknownInstrument(symbol.to_string()))
        }
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn instruments(symbols: &[&str]) -> Vec<Instrument> {
    symbols
        .iter()
        .map(|s| Instrument::on_venue(s, "paper"))
        .collect()
}

pub fn bar(symbol: &str, date: NaiveDate, close: f64) -> Bar {
    Bar::from_close(symbol, date, close)
}

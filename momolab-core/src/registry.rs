//! Instrument state registry: one record per subscribed symbol for the whole run.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::{Fill, Instrument, Sign};
use crate::error::StrategyError;
use crate::indicators::Roc;

/// Mutable per-instrument state.
///
/// Updated on every bar close, every rebalance and every entry fill. Never
/// removed mid-run.
#[derive(Debug, Clone)]
pub struct InstrumentState {
    pub instrument: Instrument,
    roc: Roc,
    /// Bars recorded so far (the "history length" eligibility is measured on).
    pub bar_count: usize,
    /// Score for the next ranking. `None` means not eligible.
    pub score: Option<f64>,
    pub last_close: Option<f64>,
    pub last_date: Option<NaiveDate>,
    /// Signed quantity cached from the broker on the last bar close.
    pub position: i64,
    pub desired: Sign,
    /// Most recent entry fill.
    pub entry_price: Option<f64>,
    pub entry_date: Option<NaiveDate>,
}

impl InstrumentState {
    pub fn new(instrument: Instrument, lookback: usize) -> Self {
        Self {
            instrument,
            roc: Roc::new(lookback),
            bar_count: 0,
            score: None,
            last_close: None,
            last_date: None,
            position: 0,
            desired: Sign::Flat,
            entry_price: None,
            entry_date: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.instrument.symbol
    }

    /// Record a validated close: feeds the indicator and bumps the history.
    pub fn record_close(&mut self, date: NaiveDate, close: f64) -> Option<f64> {
        self.last_close = Some(close);
        self.last_date = Some(date);
        self.bar_count += 1;
        self.roc.update(close)
    }

    pub fn roc(&self) -> Option<f64> {
        self.roc.last()
    }

    pub fn current_sign(&self) -> Sign {
        Sign::from_quantity(self.position)
    }

    pub fn record_entry(&mut self, fill: &Fill) {
        self.entry_price = Some(fill.price);
        self.entry_date = Some(fill.date);
    }
}

/// Owned mapping from symbol to state, in subscription order.
///
/// The key set is fixed at construction. Iteration order is subscription
/// order, which is also the ranking tie-break order.
#[derive(Debug, Clone, Default)]
pub struct InstrumentRegistry {
    states: Vec<InstrumentState>,
    index: HashMap<String, usize>,
}

impl InstrumentRegistry {
    pub fn from_instruments(
        lookback: usize,
        instruments: impl IntoIterator<Item = Instrument>,
    ) -> Result<Self, StrategyError> {
        let mut registry = Self::default();
        for instrument in instruments {
            if registry.index.contains_key(&instrument.symbol) {
                return Err(StrategyError::DuplicateSymbol(instrument.symbol));
            }
            registry
                .index
                .insert(instrument.symbol.clone(), registry.states.len());
            registry
                .states
                .push(InstrumentState::new(instrument, lookback));
        }
        Ok(registry)
    }

    pub fn get(&self, symbol: &str) -> Option<&InstrumentState> {
        self.index.get(symbol).map(|&i| &self.states[i])
    }

    pub fn get_mut(&mut self, symbol: &str) -> Result<&mut InstrumentState, StrategyError> {
        match self.index.get(symbol) {
            Some(&i) => Ok(&mut self.states[i]),
            None => Err(StrategyError::UnknownSymbol(symbol.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstrumentState> {
        self.states.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut InstrumentState> {
        self.states.iter_mut()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.symbol())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Instruments whose desired position is long.
    pub fn desired_long_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| s.desired == Sign::Long)
            .count()
    }
}

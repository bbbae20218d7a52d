//! Paper broker and account ledger used by the replay driver.
//!
//! Orders are market-on-open: an intent submitted during day D fills at the
//! open of the symbol's next bar. Exits close the whole holding. Equity is
//! cash plus holdings marked at their last close, snapshotted once per day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use momolab_core::domain::{Bar, Fill, IntentDirection, OrderIntent, Sign, Trade};
use momolab_core::{Account, Broker, BrokerError};

/// Single point in the equity curve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone)]
struct Holding {
    /// Signed share count.
    quantity: i64,
    entry_price: f64,
    entry_date: NaiveDate,
    mark: f64,
}

#[derive(Debug, Clone)]
pub struct PaperBroker {
    initial_equity: f64,
    cash: f64,
    holdings: HashMap<String, Holding>,
    pending: Vec<OrderIntent>,
    end_equity: f64,
    equity_curve: Vec<EquityPoint>,
    trades: Vec<Trade>,
    fills: Vec<Fill>,
}

impl PaperBroker {
    /// Ledger seeded with `initial_equity` in cash.
    pub fn new(initial_equity: f64) -> Self {
        Self {
            initial_equity,
            cash: initial_equity,
            holdings: HashMap::new(),
            pending: Vec::new(),
            end_equity: initial_equity,
            equity_curve: Vec::new(),
            trades: Vec::new(),
            fills: Vec::new(),
        }
    }

    /// Execute this symbol's pending orders at the bar's open, in submission order.
    ///
    /// Falls back to the close when the open is unusable. A bar with no usable
    /// price leaves the orders pending.
    pub fn fill_pending(&mut self, bar: &Bar) -> Vec<Fill> {
        let Some(price) = fill_price(bar) else {
            return Vec::new();
        };
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|intent| intent.symbol == bar.symbol);
        self.pending = rest;

        let mut fills = Vec::new();
        for intent in due {
            if let Some(fill) = self.execute(&intent, price, bar.date) {
                fills.push(fill);
            }
        }
        self.fills.extend(fills.iter().cloned());
        fills
    }

    fn execute(&mut self, intent: &OrderIntent, price: f64, date: NaiveDate) -> Option<Fill> {
        let held = self.position(&intent.symbol);
        let quantity = match intent.direction {
            IntentDirection::EnterLong | IntentDirection::EnterShort => intent.quantity?,
            IntentDirection::ExitLong if held > 0 => held.unsigned_abs(),
            IntentDirection::ExitShort if held < 0 => held.unsigned_abs(),
            _ => {
                debug!(intent = %intent, held, "nothing to exit");
                return None;
            }
        };

        match intent.direction {
            IntentDirection::EnterLong => self.open(&intent.symbol, quantity as i64, price, date),
            IntentDirection::EnterShort => {
                self.open(&intent.symbol, -(quantity as i64), price, date)
            }
            IntentDirection::ExitLong | IntentDirection::ExitShort => {
                self.close(&intent.symbol, price, date)
            }
        }

        trace!(intent = %intent, price, %date, "filled");
        Some(Fill {
            symbol: intent.symbol.clone(),
            direction: intent.direction,
            quantity,
            price,
            date,
        })
    }

    fn open(&mut self, symbol: &str, signed_qty: i64, price: f64, date: NaiveDate) {
        let held = self.position(symbol);
        if held != 0 && held.signum() != signed_qty.signum() {
            self.close(symbol, price, date);
        }
        self.cash -= signed_qty as f64 * price;

        let holding = self.holdings.entry(symbol.to_string()).or_insert(Holding {
            quantity: 0,
            entry_price: price,
            entry_date: date,
            mark: price,
        });
        if holding.quantity != 0 {
            // Adding to a holding averages the entry price.
            let total = holding.quantity + signed_qty;
            holding.entry_price = (holding.entry_price * holding.quantity as f64
                + price * signed_qty as f64)
                / total as f64;
        }
        holding.quantity += signed_qty;
        holding.mark = price;
    }

    fn close(&mut self, symbol: &str, price: f64, date: NaiveDate) {
        let Some(holding) = self.holdings.remove(symbol) else {
            return;
        };
        self.cash += holding.quantity as f64 * price;
        self.trades.push(Trade {
            symbol: symbol.to_string(),
            side: Sign::from_quantity(holding.quantity),
            quantity: holding.quantity.unsigned_abs(),
            entry_date: holding.entry_date,
            entry_price: holding.entry_price,
            exit_date: date,
            exit_price: price,
        });
    }

    /// Mark the symbol's holding at the bar's close.
    pub fn mark(&mut self, bar: &Bar) {
        if !bar.has_valid_close() {
            return;
        }
        if let Some(holding) = self.holdings.get_mut(&bar.symbol) {
            holding.mark = bar.close;
        }
    }

    /// Cash plus holdings at their latest marks.
    pub fn equity(&self) -> f64 {
        self.cash
            + self
                .holdings
                .values()
                .map(|h| h.quantity as f64 * h.mark)
                .sum::<f64>()
    }

    /// Snapshot end-of-day equity for `date`.
    pub fn record_end_of_day(&mut self, date: NaiveDate) {
        self.end_equity = self.equity();
        self.equity_curve.push(EquityPoint {
            date,
            equity: self.end_equity,
        });
    }

    pub fn initial_equity(&self) -> f64 {
        self.initial_equity
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn pending(&self) -> &[OrderIntent] {
        &self.pending
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }
}

fn fill_price(bar: &Bar) -> Option<f64> {
    [bar.open, bar.close]
        .into_iter()
        .find(|p| p.is_finite() && *p > 0.0)
}

impl Broker for PaperBroker {
    fn position(&self, symbol: &str) -> i64 {
        self.holdings.get(symbol).map_or(0, |h| h.quantity)
    }

    fn submit(&mut self, intent: &OrderIntent) -> Result<(), BrokerError> {
        if intent.direction.is_entry() && intent.quantity.unwrap_or(0) == 0 {
            return Err(BrokerError::Rejected {
                symbol: intent.symbol.clone(),
                reason: "entry without a positive quantity".into(),
            });
        }
        debug!(intent = %intent, reason = ?intent.reason, "order accepted");
        self.pending.push(intent.clone());
        Ok(())
    }

    fn cancel_all_orders(&mut self) {
        if !self.pending.is_empty() {
            debug!(cancelled = self.pending.len(), "pending orders cancelled");
        }
        self.pending.clear();
    }
}

impl Account for PaperBroker {
    fn end_equity(&self) -> f64 {
        self.end_equity
    }
}

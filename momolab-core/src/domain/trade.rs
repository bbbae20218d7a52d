//! Trade: a completed round trip, entry to exit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::position::Sign;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub side: Sign,
    pub quantity: u64,

    pub entry_date: NaiveDate,
    pub entry_price: f64,

    pub exit_date: NaiveDate,
    pub exit_price: f64,
}

impl Trade {
    /// Realized PnL: positive when a long rose or a short fell.
    pub fn pnl(&self) -> f64 {
        let direction = self.side.as_i8() as f64;
        direction * (self.exit_price - self.entry_price) * self.quantity as f64
    }

    pub fn is_winner(&self) -> bool {
        self.pnl() > 0.0
    }

    /// Return on the trade as a fraction of entry cost.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.quantity == 0 {
            return 0.0;
        }
        self.pnl() / (self.entry_price * self.quantity as f64)
    }
}

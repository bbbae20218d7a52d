use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::intent::IntentDirection;

/// Execution report for an intent, delivered through `Strategy::on_order_filled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub symbol: String,
    pub direction: IntentDirection,
    pub quantity: u64,
    pub price: f64,
    pub date: NaiveDate,
}

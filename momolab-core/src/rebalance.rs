//! Rebalance scheduler: monthly cross-sectional ranking and re-allocation.
//!
//! One pass runs Ranking → Sizing → Emitting and keeps nothing between
//! passes except the desired positions written into the registry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

use crate::domain::{IntentReason, OrderIntent, Sign};
use crate::error::StrategyError;
use crate::registry::InstrumentRegistry;
use crate::sizers::Sizer;
use crate::translator::translate;
use crate::venue::{Account, Broker, Venue};

/// (symbol, score) pair; exists only for the duration of one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub symbol: String,
    pub score: f64,
}

/// Everything one rebalance pass decided and sent.
#[derive(Debug, Clone, Serialize)]
pub struct RebalanceOutcome {
    pub date: NaiveDate,
    /// Every eligible instrument, best first.
    pub ranking: Vec<RankingEntry>,
    /// Instruments allocated a long slot.
    pub selected: Vec<RankingEntry>,
    pub equity: f64,
    /// `None` when nothing was allocated.
    pub notional_per_slot: Option<f64>,
    /// Intents submitted to the broker, in submission order.
    pub intents: Vec<OrderIntent>,
    /// Human-readable selection line; `None` when the selection did not change.
    pub summary: Option<String>,
}

/// Rank every instrument holding an eligible score, best first.
///
/// Instruments without a score are left out entirely. Equal scores keep
/// subscription order.
pub fn rank(registry: &InstrumentRegistry) -> Vec<RankingEntry> {
    let mut ranking: Vec<RankingEntry> = registry
        .iter()
        .filter_map(|state| {
            state.score.map(|score| RankingEntry {
                symbol: state.symbol().to_string(),
                score,
            })
        })
        .collect();
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranking
}

/// Run one rebalance pass on `date`.
///
/// Resets every desired position, allocates up to `top_count` long slots to
/// the best strictly positive scores, cancels outstanding orders, sizes
/// against account equity and submits the intents that move each cached
/// position to its desired sign.
pub fn rebalance(
    date: NaiveDate,
    registry: &mut InstrumentRegistry,
    top_count: usize,
    sizer: &dyn Sizer,
    venue: &mut dyn Venue,
) -> Result<RebalanceOutcome, StrategyError> {
    // Ranking
    let ranking = rank(registry);
    let previous: Vec<Sign> = registry.iter().map(|s| s.desired).collect();
    for state in registry.iter_mut() {
        state.desired = Sign::Flat;
    }

    let mut selected = Vec::new();
    for entry in ranking.iter().take(top_count) {
        // A top slot is not a guarantee of allocation.
        if entry.score > 0.0 {
            registry.get_mut(&entry.symbol)?.desired = Sign::Long;
            selected.push(entry.clone());
        }
    }
    debug!(%date, ranked = ranking.len(), selected = selected.len(), "ranking complete");

    // Sizing
    venue.cancel_all_orders();
    let equity = venue.end_equity();
    let notional_per_slot =
        NonZeroUsize::new(selected.len()).map(|slots| sizer.notional_per_slot(equity, slots));
    debug!(%date, equity, ?notional_per_slot, sizer = sizer.name(), "sizing complete");

    // Emitting
    let mut intents = Vec::new();
    for state in registry.iter() {
        let entry_quantity = match (notional_per_slot, state.last_close) {
            (Some(notional), Some(close)) => sizer.quantity(notional, close),
            _ => 0,
        };
        for intent in translate(
            state.symbol(),
            state.current_sign(),
            state.desired,
            entry_quantity,
            IntentReason::Rebalance,
        ) {
            if intent.quantity == Some(0) {
                warn!(symbol = state.symbol(), ?notional_per_slot, last_close = ?state.last_close,
                    "entry rounds to zero shares, not submitted");
                continue;
            }
            venue.submit(&intent)?;
            intents.push(intent);
        }
    }

    let changed = registry
        .iter()
        .zip(&previous)
        .any(|(state, before)| state.desired != *before);
    let summary = changed.then(|| summary_line(date, &selected));
    if let Some(line) = &summary {
        info!("{line}");
    }

    Ok(RebalanceOutcome {
        date,
        ranking,
        selected,
        equity,
        notional_per_slot,
        intents,
        summary,
    })
}

/// `2020-03-02 [Mon]: Long: SPY: 0.12; QQQ: 0.08; `
fn summary_line(date: NaiveDate, selected: &[RankingEntry]) -> String {
    let head = date.format("%Y-%m-%d [%a]");
    if selected.is_empty() {
        return format!("{head}: Long: none");
    }
    let longs: String = selected
        .iter()
        .map(|e| format!("{}: {:.2}; ", e.symbol, e.score))
        .collect();
    format!("{head}: Long: {longs}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Instrument;

    fn registry_with_scores(scores: &[(&str, Option<f64>)]) -> InstrumentRegistry {
        let mut registry = InstrumentRegistry::from_instruments(
            1,
            scores.iter().map(|(s, _)| Instrument::on_venue(s, "ib")),
        )
        .unwrap();
        for (symbol, score) in scores {
            registry.get_mut(symbol).unwrap().score = *score;
        }
        registry
    }

    #[test]
    fn rank_orders_descending_and_drops_ineligible() {
        let registry =
            registry_with_scores(&[("A", Some(0.1)), ("B", None), ("C", Some(0.3))]);
        let ranking = rank(&registry);
        let symbols: Vec<_> = ranking.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "A"]);
    }

    #[test]
    fn rank_ties_keep_subscription_order() {
        let registry =
            registry_with_scores(&[("X", Some(0.2)), ("Y", Some(0.5)), ("Z", Some(0.2))]);
        let symbols: Vec<_> = rank(&registry).into_iter().map(|e| e.symbol).collect();
        assert_eq!(symbols, vec!["Y", "X", "Z"]);
    }

    #[test]
    fn summary_line_format() {
        let date = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
        let line = summary_line(
            date,
            &[
                RankingEntry { symbol: "SPY".into(), score: 0.1234 },
                RankingEntry { symbol: "QQQ".into(), score: 0.08 },
            ],
        );
        assert_eq!(line, "2020-03-02 [Mon]: Long: SPY: 0.12; QQQ: 0.08; ");
        assert_eq!(summary_line(date, &[]), "2020-03-02 [Mon]: Long: none");
    }
}

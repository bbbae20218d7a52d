//! Historical replay driver.
//!
//! Merges per-symbol bar series into one date-ordered event stream and feeds
//! it to a strategy against the paper broker.
//!
//! Per date:
//! 1. Record end-of-day equity for the previous date
//! 2. `DayBoundary(previous, new)` → `on_day_boundary`
//! 3. For each bar of the date, in subscription order: fill that symbol's
//!    pending orders at the open (`on_order_filled` per fill), then
//!    `on_bar_closed`, then mark the holding at the close
//!
//! The final date's equity is recorded once the stream is exhausted.

use chrono::NaiveDate;
use tracing::{debug, info};

use momolab_core::domain::{Bar, OrderIntent};
use momolab_core::{RebalanceOutcome, Strategy, StrategyError};

use crate::paper::PaperBroker;

/// One step of the replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplayEvent<'a> {
    DayBoundary {
        previous: NaiveDate,
        new: NaiveDate,
    },
    Bar(&'a Bar),
}

/// What the replay observed, apart from the broker's own ledger.
#[derive(Debug, Clone, Default)]
pub struct ReplaySummary {
    pub days: usize,
    pub bars: usize,
    pub rebalances: Vec<RebalanceOutcome>,
    /// Intents emitted from bar closes (trading-stop liquidations).
    pub liquidations: Vec<OrderIntent>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Date-ordered events. Bars sharing a date keep subscription order.
pub fn merge_events(series: &[(String, Vec<Bar>)]) -> Vec<ReplayEvent<'_>> {
    let mut bars: Vec<&Bar> = series.iter().flat_map(|(_, bars)| bars.iter()).collect();
    bars.sort_by_key(|b| b.date);

    let mut events = Vec::with_capacity(bars.len() * 2);
    let mut current: Option<NaiveDate> = None;
    for bar in bars {
        if let Some(previous) = current {
            if bar.date != previous {
                events.push(ReplayEvent::DayBoundary {
                    previous,
                    new: bar.date,
                });
            }
        }
        current = Some(bar.date);
        events.push(ReplayEvent::Bar(bar));
    }
    events
}

/// Drive `strategy` through `series`. The first strategy error stops the replay.
pub fn replay(
    strategy: &mut dyn Strategy,
    broker: &mut PaperBroker,
    series: &[(String, Vec<Bar>)],
) -> Result<ReplaySummary, StrategyError> {
    let mut summary = ReplaySummary::default();

    for event in merge_events(series) {
        match event {
            ReplayEvent::DayBoundary { previous, new } => {
                broker.record_end_of_day(previous);
                summary.days += 1;
                if let Some(outcome) = strategy.on_day_boundary(previous, new, broker)? {
                    debug!(date = %new, intents = outcome.intents.len(), "rebalanced");
                    summary.rebalances.push(outcome);
                }
            }
            ReplayEvent::Bar(bar) => {
                for fill in broker.fill_pending(bar) {
                    strategy.on_order_filled(&fill)?;
                }
                let intents = strategy.on_bar_closed(bar, broker)?;
                summary.liquidations.extend(intents);
                broker.mark(bar);

                summary.bars += 1;
                summary.first_date.get_or_insert(bar.date);
                summary.last_date = Some(bar.date);
            }
        }
    }

    if let Some(last) = summary.last_date {
        broker.record_end_of_day(last);
        summary.days += 1;
    }

    info!(
        strategy = strategy.name(),
        days = summary.days,
        bars = summary.bars,
        rebalances = summary.rebalances.len(),
        "replay complete"
    );
    Ok(summary)
}

//! Strategy hooks and the momentum rotation that implements them.

use chrono::NaiveDate;
use tracing::{debug, info, trace};

use crate::config::RotationConfig;
use crate::domain::{Bar, Fill, Instrument, IntentReason, OrderIntent, Sign};
use crate::error::StrategyError;
use crate::gate::{GateDecision, TradingGate};
use crate::rebalance::{rebalance, RebalanceOutcome};
use crate::registry::InstrumentRegistry;
use crate::sizers::EqualWeightSizer;
use crate::translator::liquidate;
use crate::venue::{Broker, InstrumentResolver, Venue};

/// Callbacks a replay driver invokes, in event order.
///
/// # Ordering contract
/// All bars of a calendar day are delivered before the day-boundary event
/// that leaves that day. Any error returned aborts the run.
pub trait Strategy {
    fn name(&self) -> &str;

    /// Transition from `previous_day` to `new_day`, before any bar of `new_day`.
    fn on_day_boundary(
        &mut self,
        previous_day: NaiveDate,
        new_day: NaiveDate,
        venue: &mut dyn Venue,
    ) -> Result<Option<RebalanceOutcome>, StrategyError>;

    /// One closed bar. Returns the intents it submitted (trading-stop exits).
    fn on_bar_closed(
        &mut self,
        bar: &Bar,
        venue: &mut dyn Venue,
    ) -> Result<Vec<OrderIntent>, StrategyError>;

    fn on_order_filled(&mut self, fill: &Fill) -> Result<(), StrategyError>;
}

/// Monthly top-N momentum rotation over a fixed universe.
pub struct MomentumRotation<'a> {
    config: &'a RotationConfig,
    registry: InstrumentRegistry,
    gate: TradingGate,
    sizer: EqualWeightSizer,
    rebalance_count: usize,
}

impl<'a> MomentumRotation<'a> {
    pub fn new(
        config: &'a RotationConfig,
        instruments: impl IntoIterator<Item = Instrument>,
    ) -> Result<Self, StrategyError> {
        let registry = InstrumentRegistry::from_instruments(config.lookback, instruments)?;
        debug!(
            instruments = registry.len(),
            lookback = config.lookback,
            min_len = config.min_len,
            top_count = config.top_count,
            "momentum rotation subscribed"
        );
        Ok(Self {
            config,
            registry,
            gate: TradingGate::new(config.window, config.warmup_days),
            sizer: EqualWeightSizer,
            rebalance_count: 0,
        })
    }

    /// Resolve every symbol through the feed, then subscribe.
    pub fn subscribe<S: AsRef<str>>(
        config: &'a RotationConfig,
        symbols: &[S],
        resolver: &dyn InstrumentResolver,
    ) -> Result<Self, StrategyError> {
        let instruments = symbols
            .iter()
            .map(|s| resolver.resolve(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(config, instruments)
    }

    pub fn config(&self) -> &RotationConfig {
        self.config
    }

    pub fn registry(&self) -> &InstrumentRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &TradingGate {
        &self.gate
    }

    pub fn rebalance_count(&self) -> usize {
        self.rebalance_count
    }
}

impl Strategy for MomentumRotation<'_> {
    fn name(&self) -> &str {
        "momentum-rotation"
    }

    fn on_day_boundary(
        &mut self,
        previous_day: NaiveDate,
        new_day: NaiveDate,
        venue: &mut dyn Venue,
    ) -> Result<Option<RebalanceOutcome>, StrategyError> {
        match self.gate.check(previous_day, new_day) {
            GateDecision::Skip(reason) => {
                trace!(%previous_day, %new_day, ?reason, "rebalance skipped");
                Ok(None)
            }
            GateDecision::Proceed => {
                let outcome = rebalance(
                    new_day,
                    &mut self.registry,
                    self.config.top_count,
                    &self.sizer,
                    venue,
                )?;
                self.rebalance_count += 1;
                Ok(Some(outcome))
            }
        }
    }

    fn on_bar_closed(
        &mut self,
        bar: &Bar,
        venue: &mut dyn Venue,
    ) -> Result<Vec<OrderIntent>, StrategyError> {
        if !bar.has_valid_close() {
            return Err(StrategyError::NonPositiveClose {
                symbol: bar.symbol.clone(),
                date: bar.date,
                close: bar.close,
            });
        }

        let window = self.config.window;
        let min_len = self.config.min_len;
        let state = self.registry.get_mut(&bar.symbol)?;

        state.record_close(bar.date, bar.close);
        state.position = venue.position(&bar.symbol);

        if window.contains(bar.date) {
            state.score = if state.bar_count > min_len {
                state.roc()
            } else {
                None
            };
        }

        let mut intents = Vec::new();
        if window.is_after_stop(bar.date) {
            state.desired = Sign::Flat;
            if let Some(intent) =
                liquidate(&bar.symbol, state.current_sign(), IntentReason::TradingStop)
            {
                info!(symbol = %bar.symbol, date = %bar.date, position = state.position,
                    "past trading stop, liquidating");
                venue.submit(&intent)?;
                intents.push(intent);
            }
        }
        Ok(intents)
    }

    fn on_order_filled(&mut self, fill: &Fill) -> Result<(), StrategyError> {
        let state = self.registry.get_mut(&fill.symbol)?;
        if fill.direction.is_entry() {
            state.record_entry(fill);
        }
        debug!(symbol = %fill.symbol, direction = fill.direction.as_str(),
            quantity = fill.quantity, price = fill.price, "order filled");
        Ok(())
    }
}

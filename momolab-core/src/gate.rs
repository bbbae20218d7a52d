//! Trading-window gate: decides whether a day transition may rebalance.
//!
//! Checks run in a fixed order: trading start, trading stop, warm-up,
//! month change. The warm-up counter is only consumed by transitions that
//! got past the window checks.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Active trading period. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    pub start: Option<NaiveDate>,
    pub stop: Option<NaiveDate>,
}

impl TradingWindow {
    pub fn new(start: Option<NaiveDate>, stop: Option<NaiveDate>) -> Self {
        Self { start, stop }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start) && !self.is_after_stop(date)
    }

    pub fn is_after_stop(&self, date: NaiveDate) -> bool {
        self.stop.is_some_and(|stop| date > stop)
    }

    /// The first possible rebalance day is strictly after the start date.
    fn is_on_or_before_start(&self, date: NaiveDate) -> bool {
        self.start.is_some_and(|start| date <= start)
    }
}

/// Why a transition was not allowed to rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BeforeStart,
    AfterStop,
    /// Warm-up consumed one day; `remaining` is what is left after this one.
    WarmingUp { remaining: u32 },
    SameMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Skip(SkipReason),
}

impl GateDecision {
    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed)
    }
}

/// Window predicate plus the warm-up counter it owns.
#[derive(Debug, Clone)]
pub struct TradingGate {
    window: TradingWindow,
    warmup_remaining: u32,
}

impl TradingGate {
    pub fn new(window: TradingWindow, warmup_days: u32) -> Self {
        Self {
            window,
            warmup_remaining: warmup_days,
        }
    }

    /// Consult the gate for one calendar-day transition.
    ///
    /// Must be called exactly once per transition, however many bars that
    /// day carried.
    pub fn check(&mut self, previous_day: NaiveDate, new_day: NaiveDate) -> GateDecision {
        if self.window.is_on_or_before_start(new_day) {
            return GateDecision::Skip(SkipReason::BeforeStart);
        }
        if self.window.is_after_stop(new_day) {
            return GateDecision::Skip(SkipReason::AfterStop);
        }

        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return GateDecision::Skip(SkipReason::WarmingUp {
                remaining: self.warmup_remaining,
            });
        }

        if (previous_day.year(), previous_day.month()) == (new_day.year(), new_day.month()) {
            return GateDecision::Skip(SkipReason::SameMonth);
        }

        GateDecision::Proceed
    }

    pub fn window(&self) -> &TradingWindow {
        &self.window
    }

    pub fn warmup_remaining(&self) -> u32 {
        self.warmup_remaining
    }

    pub fn is_warm(&self) -> bool {
        self.warmup_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn window() -> TradingWindow {
        TradingWindow::new(Some(d(2020, 1, 10)), Some(d(2020, 12, 31)))
    }

    #[test]
    fn skips_on_or_before_start() {
        let mut gate = TradingGate::new(window(), 0);
        assert_eq!(
            gate.check(d(2019, 12, 31), d(2020, 1, 10)),
            GateDecision::Skip(SkipReason::BeforeStart)
        );
        assert_eq!(
            gate.check(d(2019, 11, 29), d(2019, 12, 2)),
            GateDecision::Skip(SkipReason::BeforeStart)
        );
    }

    #[test]
    fn skips_strictly_after_stop() {
        let mut gate = TradingGate::new(window(), 0);
        assert_eq!(
            gate.check(d(2020, 12, 31), d(2021, 1, 4)),
            GateDecision::Skip(SkipReason::AfterStop)
        );
        // The stop date itself is still inside the window.
        assert_eq!(gate.check(d(2020, 11, 30), d(2020, 12, 31)), GateDecision::Proceed);
    }

    #[test]
    fn warmup_consumed_once_per_transition() {
        let mut gate = TradingGate::new(window(), 2);
        assert_eq!(
            gate.check(d(2020, 1, 31), d(2020, 2, 3)),
            GateDecision::Skip(SkipReason::WarmingUp { remaining: 1 })
        );
        assert_eq!(
            gate.check(d(2020, 2, 3), d(2020, 2, 4)),
            GateDecision::Skip(SkipReason::WarmingUp { remaining: 0 })
        );
        assert!(gate.is_warm());
        assert_eq!(
            gate.check(d(2020, 2, 4), d(2020, 2, 5)),
            GateDecision::Skip(SkipReason::SameMonth)
        );
    }

    #[test]
    fn window_skips_do_not_consume_warmup() {
        let mut gate = TradingGate::new(window(), 1);
        gate.check(d(2020, 1, 2), d(2020, 1, 3));
        assert_eq!(gate.warmup_remaining(), 1);
    }

    #[test]
    fn proceeds_on_month_change() {
        let mut gate = TradingGate::new(window(), 0);
        assert_eq!(gate.check(d(2020, 2, 28), d(2020, 3, 2)), GateDecision::Proceed);
    }

    #[test]
    fn same_month_different_year_proceeds() {
        let mut gate = TradingGate::new(TradingWindow::unbounded(), 0);
        assert!(gate.check(d(2020, 3, 31), d(2021, 3, 1)).is_proceed());
    }

    #[test]
    fn window_contains_is_inclusive() {
        let w = window();
        assert!(w.contains(d(2020, 1, 10)));
        assert!(w.contains(d(2020, 12, 31)));
        assert!(!w.contains(d(2020, 1, 9)));
        assert!(!w.contains(d(2021, 1, 1)));
        assert!(TradingWindow::unbounded().contains(d(1990, 1, 1)));
    }
}

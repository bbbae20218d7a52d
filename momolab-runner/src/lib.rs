//! MomoLab Runner: historical replay of the momentum rotation.
//!
//! This crate builds on `momolab-core` to provide:
//! - TOML run configuration with deterministic run ids
//! - Per-symbol CSV bar loading
//! - A paper broker and account ledger (market-on-open fills)
//! - The replay driver that feeds day boundaries and bars to a strategy
//! - Performance reports, notification delivery and artifact export
//! - Structured logging setup

pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod notify;
pub mod paper;
pub mod replay;
pub mod report;
pub mod runner;

pub use config::{ConfigError, RunConfig, RunId};
pub use data_loader::{load_symbol, load_universe, LoadError, LoadOptions, LoadedData};
pub use export::save_artifacts;
pub use logging::{init_logging, LoggingError};
pub use notify::{deliver, report_subject, ConsoleNotifier, Notifier, NotifyError};
pub use paper::{EquityPoint, PaperBroker};
pub use replay::{replay, ReplaySummary};
pub use report::{PerformanceReport, PositionLine};
pub use runner::{run_backtest, run_backtest_from_data, BacktestResult, RunError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<RunConfig>();
        assert_sync::<RunConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn paper_broker_is_send_sync() {
        assert_send::<PaperBroker>();
        assert_sync::<PaperBroker>();
    }

    #[test]
    fn performance_report_is_send_sync() {
        assert_send::<PerformanceReport>();
        assert_sync::<PerformanceReport>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}

//! Backtest runner: wires config, data, strategy, paper broker and report.
//!
//! Two entry points:
//! - `run_backtest()`: loads CSV bars per the config, then runs. Used by the CLI.
//! - `run_backtest_from_data()`: takes pre-loaded data. Used by tests.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use momolab_core::domain::{OrderIntent, Trade};
use momolab_core::{Broker, MomentumRotation, RebalanceOutcome, Strategy, StrategyError};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::{load_universe, LoadError, LoadOptions, LoadedData};
use crate::paper::{EquityPoint, PaperBroker};
use crate::replay::replay;
use crate::report::{PerformanceReport, PositionLine};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub schema_version: u32,
    pub run_id: RunId,
    pub strategy: String,
    pub config: RunConfig,
    pub dataset_hash: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: usize,
    pub day_count: usize,
    pub report: PerformanceReport,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    pub rebalances: Vec<RebalanceOutcome>,
    pub liquidations: Vec<OrderIntent>,
}

impl BacktestResult {
    /// Summary lines of the rebalances that changed the selection.
    pub fn selection_changes(&self) -> impl Iterator<Item = &str> {
        self.rebalances.iter().filter_map(|r| r.summary.as_deref())
    }
}

/// Load data per `config` and run.
pub fn run_backtest(config: &RunConfig) -> Result<BacktestResult, RunError> {
    let opts = LoadOptions {
        data_dir: config.backtest.data_dir.clone(),
        start: config.backtest.load_start,
        end: config.backtest.load_end,
    };
    let data = load_universe(config.backtest.symbols.as_slice(), &opts)?;
    run_backtest_from_data(config, &data)
}

/// Run against pre-loaded data: no I/O.
pub fn run_backtest_from_data(
    config: &RunConfig,
    data: &LoadedData,
) -> Result<BacktestResult, RunError> {
    let run_id = config.run_id()?;
    let rotation = config.to_rotation_config();
    let mut strategy =
        MomentumRotation::subscribe(&rotation, config.backtest.symbols.as_slice(), data)?;
    let mut broker = PaperBroker::new(config.backtest.initial_equity);

    info!(
        run_id = %run_id,
        symbols = config.backtest.symbols.len(),
        bars = data.bar_count(),
        initial_equity = config.backtest.initial_equity,
        "starting backtest"
    );

    let summary = replay(&mut strategy, &mut broker, &data.series)?;

    let positions = strategy
        .registry()
        .iter()
        .map(|state| PositionLine {
            symbol: state.symbol().to_string(),
            position: broker.position(state.symbol()),
            desired: state.desired,
            score: state.score,
            last_close: state.last_close,
        })
        .collect();
    let report = PerformanceReport::compute(
        strategy.name(),
        broker.initial_equity(),
        broker.equity_curve(),
        broker.trades(),
        positions,
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        strategy: strategy.name().to_string(),
        config: config.clone(),
        dataset_hash: data.dataset_hash.clone(),
        start_date: summary.first_date,
        end_date: summary.last_date,
        bar_count: summary.bars,
        day_count: summary.days,
        report,
        equity_curve: broker.equity_curve().to_vec(),
        trades: broker.trades().to_vec(),
        rebalances: summary.rebalances,
        liquidations: summary.liquidations,
    })
}

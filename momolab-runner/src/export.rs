//! Artifact export: JSON and CSV files for a finished run.
//!
//! A run directory holds:
//! - `result.json`: the full `BacktestResult`
//! - `trades.csv`: closed round trips
//! - `equity.csv`: end-of-day equity
//! - `rebalances.csv`: one row per rebalance pass
//! - `report.txt`: the rendered performance report

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use momolab_core::domain::Trade;

use crate::paper::EquityPoint;
use crate::runner::BacktestResult;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Columns: symbol, side, quantity, entry_date, entry_price, exit_date,
/// exit_price, pnl, return_pct
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "side",
        "quantity",
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "pnl",
        "return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.symbol,
            &format!("{:?}", t.side),
            &t.quantity.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &format!("{:.2}", t.pnl()),
            &format!("{:.6}", t.return_pct()),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with date and equity columns.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity"])?;
    for point in equity_curve {
        wtr.write_record([&point.date.to_string(), &format!("{:.2}", point.equity)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: date, equity, selected (`SYM:score` joined by `;`), intents
pub fn export_rebalances_csv(result: &BacktestResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity", "selected", "intents"])?;
    for r in &result.rebalances {
        let selected: Vec<String> = r
            .selected
            .iter()
            .map(|e| format!("{}:{:.4}", e.symbol, e.score))
            .collect();
        let intents: Vec<String> = r.intents.iter().map(ToString::to_string).collect();
        wtr.write_record([
            &r.date.to_string(),
            &format!("{:.2}", r.equity),
            &selected.join(";"),
            &intents.join(";"),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set under `output_dir/<run_id>/`.
///
/// Returns the path to the run directory. Re-running an identical config
/// overwrites the same directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(&result.run_id);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let files = [
        ("result.json", export_json(result)?),
        ("trades.csv", export_trades_csv(&result.trades)?),
        ("equity.csv", export_equity_csv(&result.equity_curve)?),
        ("rebalances.csv", export_rebalances_csv(result)?),
        ("report.txt", result.report.render_text()),
    ];
    for (name, contents) in files {
        let path = run_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(run_dir)
}

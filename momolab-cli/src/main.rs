//! MomoLab CLI: replay and inspection commands.
//!
//! Commands:
//! - `run`: replay the momentum rotation over CSV bars from a TOML config
//! - `check`: resolve a config and report what data it would load

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

use momolab_runner::data_loader::{load_universe, LoadOptions};
use momolab_runner::notify::{deliver, report_subject, ConsoleNotifier};
use momolab_runner::{init_logging, run_backtest, save_artifacts, BacktestResult, RunConfig};

#[derive(Parser)]
#[command(
    name = "momolab",
    about = "MomoLab CLI: monthly momentum rotation over daily bars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the rotation from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the full result as JSON instead of the text summary.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Skip writing artifacts.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Resolve a config and report the data it would load.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            json,
            no_artifacts,
        } => run_cmd(&config, &output_dir, json, no_artifacts),
        Commands::Check { config } => check_cmd(&config),
    }
}

fn run_cmd(config_path: &Path, output_dir: &Path, json: bool, no_artifacts: bool) -> Result<()> {
    let config = RunConfig::load(config_path)?;

    let started = Instant::now();
    let result = run_backtest(&config)
        .with_context(|| format!("run from {} failed", config_path.display()))?;
    info!(
        run_id = %result.run_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "run finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    let text = result.report.render_text();
    if config.report.write && !json {
        println!("{text}");
    }
    if config.report.notify {
        let subject = report_subject(&result.strategy, result.report.as_of);
        deliver(&ConsoleNotifier, &subject, &text);
    }

    if !no_artifacts {
        let run_dir = save_artifacts(&result, output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn check_cmd(config_path: &Path) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let rotation = config.to_rotation_config();

    println!("Config:         {}", config_path.display());
    println!("Run id:         {}", config.run_id()?);
    println!(
        "Strategy:       lookback {}, min_len {}, top {}, warm-up {} days",
        rotation.lookback, rotation.min_len, rotation.top_count, rotation.warmup_days
    );
    println!(
        "Trading window: {} to {}",
        date_or_open(rotation.window.start),
        date_or_open(rotation.window.stop)
    );
    println!("Initial equity: {:.2}", config.backtest.initial_equity);
    println!("Data dir:       {}", config.backtest.data_dir.display());
    println!();

    let opts = LoadOptions {
        data_dir: config.backtest.data_dir.clone(),
        start: config.backtest.load_start,
        end: config.backtest.load_end,
    };
    let data = load_universe(config.backtest.symbols.as_slice(), &opts)?;

    println!("{:<8} {:>6}  {:<25}", "Symbol", "Bars", "Date Range");
    println!("{}", "-".repeat(42));
    for (symbol, bars) in &data.series {
        let range = match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => format!("{} to {}", first.date, last.date),
            _ => "(empty)".to_string(),
        };
        println!("{:<8} {:>6}  {:<25}", symbol, bars.len(), range);
    }
    println!();
    match data.date_range() {
        Some((first, last)) => println!("Bars span:      {first} to {last}"),
        None => println!("Bars span:      (no bars)"),
    }
    println!("Dataset hash:   {}", data.dataset_hash);

    Ok(())
}

fn date_or_open(date: Option<chrono::NaiveDate>) -> String {
    date.map_or_else(|| "(open)".to_string(), |d| d.to_string())
}

fn print_summary(result: &BacktestResult) {
    let report = &result.report;
    println!();
    println!("=== Rotation Result ===");
    println!("Run id:         {}", result.run_id);
    println!("Symbols:        {}", result.config.backtest.symbols.join(", "));
    match (result.start_date, result.end_date) {
        (Some(start), Some(end)) => println!("Period:         {start} to {end}"),
        _ => println!("Period:         (no bars)"),
    }
    println!(
        "Bars:           {} over {} days",
        result.bar_count, result.day_count
    );
    println!("Rebalances:     {}", result.rebalances.len());
    println!("Trades:         {}", report.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.2}", report.final_equity);
    println!("Total Return:   {:.2}%", report.total_pnl_pct);
    println!("Max Drawdown:   {:.2}%", report.max_drawdown_pct);
    println!("Win Rate:       {:.1}%", report.win_rate * 100.0);
    match report.gain_to_pain {
        Some(ratio) => println!("Gain to Pain:   {ratio:.2}"),
        None => println!("Gain to Pain:   n/a"),
    }
    let changes: Vec<&str> = result.selection_changes().collect();
    if !changes.is_empty() {
        println!();
        println!("--- Selection Changes ---");
        for line in changes {
            println!("{line}");
        }
    }
    println!();
}

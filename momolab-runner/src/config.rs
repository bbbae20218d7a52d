//! Serializable run configuration, loaded from TOML.
//!
//! Numeric settings are forgiving: a missing or unparsable value falls back to
//! its documented default with a warning. Structural problems (bad TOML, bad
//! dates, an empty universe) are errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use momolab_core::config::{
    RotationConfig, DEFAULT_LOOKBACK, DEFAULT_MIN_LEN, DEFAULT_TOP_COUNT, DEFAULT_WARMUP_DAYS,
};
use momolab_core::gate::TradingWindow;

/// Unique identifier for a run (content-addressable hash of the resolved config).
pub type RunId = String;

pub const DEFAULT_INITIAL_EQUITY: f64 = 1_000_000.0;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Largest accepted `strategy.lookback`; larger values fall back to the default.
pub const MAX_LOOKBACK: usize = u16::MAX as usize;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid date for '{key}': '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { key: &'static str, value: String },

    #[error("trading_start {start} is after trading_stop {stop}")]
    InvertedWindow { start: NaiveDate, stop: NaiveDate },

    #[error("no symbols configured")]
    NoSymbols,

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    pub strategy: StrategySection,
    pub backtest: BacktestSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategySection {
    pub lookback: usize,
    pub min_len: usize,
    pub top_count: usize,
    pub warmup_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestSection {
    pub trading_start: Option<NaiveDate>,
    pub trading_stop: Option<NaiveDate>,
    pub initial_equity: f64,
    pub symbols: Vec<String>,
    pub data_dir: PathBuf,
    pub load_start: Option<NaiveDate>,
    pub load_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportSection {
    /// Print the performance report after the run.
    pub write: bool,
    /// Hand the report to the notifier.
    pub notify: bool,
}

// ─── Raw (as written) form ──────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    strategy: RawStrategy,
    #[serde(default)]
    backtest: RawBacktest,
    #[serde(default)]
    report: ReportSection,
}

#[derive(Debug, Default, Deserialize)]
struct RawStrategy {
    lookback: Option<toml::Value>,
    min_len: Option<toml::Value>,
    top_count: Option<toml::Value>,
    warmup_days: Option<toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBacktest {
    trading_start: Option<String>,
    trading_stop: Option<String>,
    initial_equity: Option<toml::Value>,
    symbols: Option<SymbolList>,
    data_dir: Option<PathBuf>,
    load_start: Option<String>,
    load_end: Option<String>,
}

/// `symbols = ["SPY", "QQQ"]` or `symbols = "SPY, QQQ"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SymbolList {
    List(Vec<String>),
    Joined(String),
}

impl SymbolList {
    fn into_symbols(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            SymbolList::List(list) => list,
            SymbolList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        let mut seen = HashSet::new();
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| {
                let first = seen.insert(s.clone());
                if !first {
                    warn!(symbol = %s, "duplicate symbol ignored");
                }
                first
            })
            .collect()
    }
}

impl RunConfig {
    /// Parse and resolve a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        Self::resolve(raw)
    }

    /// Read a TOML file. A relative `data_dir` is taken relative to the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if config.backtest.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.backtest.data_dir = parent.join(&config.backtest.data_dir);
            }
        }
        Ok(config)
    }

    fn resolve(raw: RawConfig) -> Result<Self, ConfigError> {
        let s = raw.strategy;
        let strategy = StrategySection {
            lookback: count_or_default(
                "strategy.lookback",
                s.lookback,
                DEFAULT_LOOKBACK,
                1..=MAX_LOOKBACK,
            ),
            min_len: count_or_default(
                "strategy.min_len",
                s.min_len,
                DEFAULT_MIN_LEN,
                0..=usize::MAX,
            ),
            top_count: count_or_default(
                "strategy.top_count",
                s.top_count,
                DEFAULT_TOP_COUNT,
                1..=usize::MAX,
            ),
            warmup_days: count_or_default(
                "strategy.warmup_days",
                s.warmup_days,
                DEFAULT_WARMUP_DAYS as usize,
                0..=u32::MAX as usize,
            )
            .try_into()
            .unwrap_or(DEFAULT_WARMUP_DAYS),
        };

        let b = raw.backtest;
        let trading_start = parse_date("backtest.trading_start", b.trading_start)?;
        let trading_stop = parse_date("backtest.trading_stop", b.trading_stop)?;
        if let (Some(start), Some(stop)) = (trading_start, trading_stop) {
            if start > stop {
                return Err(ConfigError::InvertedWindow { start, stop });
            }
        }

        let symbols = b.symbols.map(SymbolList::into_symbols).unwrap_or_default();
        if symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }

        let backtest = BacktestSection {
            trading_start,
            trading_stop,
            initial_equity: equity_or_default(b.initial_equity),
            symbols,
            data_dir: b.data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            load_start: parse_date("backtest.load_start", b.load_start)?,
            load_end: parse_date("backtest.load_end", b.load_end)?,
        };

        Ok(Self {
            strategy,
            backtest,
            report: raw.report,
        })
    }

    /// Deterministic hash of the resolved configuration.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }

    /// The immutable parameter set the strategy borrows.
    pub fn to_rotation_config(&self) -> RotationConfig {
        RotationConfig {
            lookback: self.strategy.lookback,
            min_len: self.strategy.min_len,
            top_count: self.strategy.top_count,
            warmup_days: self.strategy.warmup_days,
            window: TradingWindow::new(self.backtest.trading_start, self.backtest.trading_stop),
        }
    }
}

// ─── Lenient value parsing ──────────────────────────────────────────

fn parse_count(value: &toml::Value) -> Option<usize> {
    match value {
        toml::Value::Integer(i) => usize::try_from(*i).ok(),
        toml::Value::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as usize),
        toml::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_amount(value: &toml::Value) -> Option<f64> {
    let amount = match value {
        toml::Value::Integer(i) => *i as f64,
        toml::Value::Float(f) => *f,
        toml::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn count_or_default(
    key: &str,
    value: Option<toml::Value>,
    default: usize,
    accepted: RangeInclusive<usize>,
) -> usize {
    let Some(value) = value else {
        return default;
    };
    match parse_count(&value) {
        Some(n) if accepted.contains(&n) => n,
        _ => {
            warn!(key, value = %value, default, "invalid setting, using default");
            default
        }
    }
}

fn equity_or_default(value: Option<toml::Value>) -> f64 {
    let Some(value) = value else {
        return DEFAULT_INITIAL_EQUITY;
    };
    parse_amount(&value).unwrap_or_else(|| {
        warn!(
            key = "backtest.initial_equity",
            value = %value,
            default = DEFAULT_INITIAL_EQUITY,
            "invalid setting, using default"
        );
        DEFAULT_INITIAL_EQUITY
    })
}

fn parse_date(key: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, ConfigError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), DATE_FORMAT)
                .map_err(|_| ConfigError::InvalidDate { key, value: v })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[strategy]
lookback = 21
min_len = 100
top_count = 2
warmup_days = 3

[backtest]
trading_start = "2010-01-04"
trading_stop = "2020-12-31"
initial_equity = 250000
symbols = ["SPY", "QQQ"]
data_dir = "bars"

[report]
write = true
"#;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_full_document() {
        let config = RunConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.strategy.lookback, 21);
        assert_eq!(config.strategy.min_len, 100);
        assert_eq!(config.strategy.top_count, 2);
        assert_eq!(config.strategy.warmup_days, 3);
        assert_eq!(config.backtest.trading_start, Some(d(2010, 1, 4)));
        assert_eq!(config.backtest.initial_equity, 250_000.0);
        assert_eq!(config.backtest.symbols, vec!["SPY", "QQQ"]);
        assert_eq!(config.backtest.data_dir, PathBuf::from("bars"));
        assert!(config.report.write);
        assert!(!config.report.notify);
    }

    #[test]
    fn missing_numbers_use_defaults() {
        let config = RunConfig::from_toml_str("[backtest]\nsymbols = [\"SPY\"]\n").unwrap();
        assert_eq!(config.strategy.lookback, 42);
        assert_eq!(config.strategy.min_len, 300);
        assert_eq!(config.strategy.top_count, 4);
        assert_eq!(config.strategy.warmup_days, 5);
        assert_eq!(config.backtest.initial_equity, 1_000_000.0);
        assert_eq!(config.backtest.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn unparsable_numbers_fall_back() {
        let text = r#"
[strategy]
lookback = "abc"
top_count = 0
[backtest]
initial_equity = "lots"
symbols = ["SPY"]
"#;
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.strategy.lookback, DEFAULT_LOOKBACK);
        assert_eq!(config.strategy.top_count, DEFAULT_TOP_COUNT);
        assert_eq!(config.backtest.initial_equity, DEFAULT_INITIAL_EQUITY);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let text = r#"
[strategy]
lookback = " 10 "
[backtest]
initial_equity = "50000.5"
symbols = ["SPY"]
"#;
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.strategy.lookback, 10);
        assert_eq!(config.backtest.initial_equity, 50_000.5);
    }

    #[test]
    fn oversized_lookback_falls_back() {
        let text = "[strategy]\nlookback = 9223372036854775807\n[backtest]\nsymbols = [\"SPY\"]\n";
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.strategy.lookback, DEFAULT_LOOKBACK);

        let text = format!("[strategy]\nlookback = {MAX_LOOKBACK}\n[backtest]\nsymbols = [\"SPY\"]\n");
        let config = RunConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.strategy.lookback, MAX_LOOKBACK);
    }

    #[test]
    fn duplicate_symbols_keep_first_occurrence() {
        let config = RunConfig::from_toml_str("[backtest]\nsymbols = \"SPY, QQQ, SPY\"\n").unwrap();
        assert_eq!(config.backtest.symbols, vec!["SPY", "QQQ"]);

        let text = "[backtest]\nsymbols = [\"IWM\", \"IWM \", \"TLT\"]\n";
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.backtest.symbols, vec!["IWM", "TLT"]);
    }

    #[test]
    fn comma_separated_symbols_are_trimmed() {
        let text = "[backtest]\nsymbols = \" SPY, QQQ ,,IWM \"\n";
        let config = RunConfig::from_toml_str(text).unwrap();
        assert_eq!(config.backtest.symbols, vec!["SPY", "QQQ", "IWM"]);
    }

    #[test]
    fn empty_universe_is_an_error() {
        let err = RunConfig::from_toml_str("[backtest]\nsymbols = \" , \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoSymbols));
    }

    #[test]
    fn bad_date_is_an_error() {
        let text = "[backtest]\nsymbols = [\"SPY\"]\ntrading_start = \"2020/01/01\"\n";
        let err = RunConfig::from_toml_str(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDate { key: "backtest.trading_start", .. }
        ));
    }

    #[test]
    fn inverted_window_is_an_error() {
        let text = r#"
[backtest]
symbols = ["SPY"]
trading_start = "2021-01-01"
trading_stop = "2020-01-01"
"#;
        assert!(matches!(
            RunConfig::from_toml_str(text),
            Err(ConfigError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            RunConfig::from_toml_str("[backtest\nsymbols ="),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn run_id_deterministic_and_sensitive() {
        let config = RunConfig::from_toml_str(FULL).unwrap();
        assert_eq!(config.run_id().unwrap(), config.run_id().unwrap());

        let mut other = config.clone();
        other.strategy.lookback = 22;
        assert_ne!(config.run_id().unwrap(), other.run_id().unwrap());
    }

    #[test]
    fn rotation_config_carries_window() {
        let config = RunConfig::from_toml_str(FULL).unwrap();
        let rotation = config.to_rotation_config();
        assert_eq!(rotation.lookback, 21);
        assert_eq!(
            rotation.window,
            TradingWindow::new(Some(d(2010, 1, 4)), Some(d(2020, 12, 31)))
        );
    }
}

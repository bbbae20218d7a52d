//! Bar loading from per-symbol CSV files.
//!
//! Each symbol lives in `<data_dir>/<SYMBOL>.csv` with the header
//! `date,open,high,low,close,volume`. Bars are filtered to the optional load
//! range and sorted by date. Prices are passed through unvalidated; the
//! strategy decides what a bad close means.

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use momolab_core::domain::{Bar, Instrument};
use momolab_core::{BrokerError, InstrumentResolver};

/// Venue name attached to instruments resolved from CSV files.
pub const CSV_VENUE: &str = "csv";

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data file for '{symbol}' at {}", path.display())]
    MissingFile { symbol: String, path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
}

/// Options controlling where and which bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub data_dir: PathBuf,
    /// First date kept (inclusive).
    pub start: Option<NaiveDate>,
    /// Last date kept (inclusive).
    pub end: Option<NaiveDate>,
}

impl LoadOptions {
    fn keeps(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: u64,
}

/// Bars for the whole universe, in subscription order.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub series: Vec<(String, Vec<Bar>)>,
    /// BLAKE3 over every loaded bar, for provenance in reports.
    pub dataset_hash: String,
}

impl LoadedData {
    pub fn bars(&self, symbol: &str) -> Option<&[Bar]> {
        self.series
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, bars)| bars.as_slice())
    }

    pub fn bar_count(&self) -> usize {
        self.series.iter().map(|(_, bars)| bars.len()).sum()
    }

    /// First and last date across all symbols.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.series.iter().flat_map(|(_, bars)| bars.iter().map(|b| b.date));
        let (mut lo, mut hi) = (None::<NaiveDate>, None::<NaiveDate>);
        for date in dates {
            lo = Some(lo.map_or(date, |l| l.min(date)));
            hi = Some(hi.map_or(date, |h| h.max(date)));
        }
        lo.zip(hi)
    }
}

impl InstrumentResolver for LoadedData {
    fn resolve(&self, symbol: &str) -> Result<Instrument, BrokerError> {
        match self.bars(symbol) {
            Some(_) => Ok(Instrument::on_venue(symbol, CSV_VENUE)),
            None => Err(BrokerError::UnknownInstrument(symbol.to_string())),
        }
    }
}

/// Path of the CSV file for `symbol`.
pub fn symbol_path(data_dir: &Path, symbol: &str) -> PathBuf {
    data_dir.join(format!("{symbol}.csv"))
}

/// Load one symbol's bars.
pub fn load_symbol(symbol: &str, opts: &LoadOptions) -> Result<Vec<Bar>, LoadError> {
    let path = symbol_path(&opts.data_dir, symbol);
    if !path.is_file() {
        return Err(LoadError::MissingFile {
            symbol: symbol.to_string(),
            path,
        });
    }
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(csv_err)?;

    let mut bars = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row.map_err(csv_err)?;
        if !opts.keeps(row.date) {
            continue;
        }
        bars.push(Bar {
            symbol: symbol.to_string(),
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    bars.sort_by_key(|b| b.date);

    if bars.is_empty() {
        warn!(symbol, path = %path.display(), "no bars inside the load range");
    } else {
        debug!(symbol, bars = bars.len(), "loaded bars");
    }
    Ok(bars)
}

/// Load every symbol, in the order given.
pub fn load_universe<S: AsRef<str>>(
    symbols: &[S],
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    let series = symbols
        .iter()
        .map(|s| load_symbol(s.as_ref(), opts).map(|bars| (s.as_ref().to_string(), bars)))
        .collect::<Result<Vec<_>, _>>()?;
    let dataset_hash = compute_dataset_hash(&series);
    Ok(LoadedData {
        series,
        dataset_hash,
    })
}

/// Deterministic BLAKE3 hash over all bar data, in subscription order.
fn compute_dataset_hash(series: &[(String, Vec<Bar>)]) -> String {
    let mut hasher = blake3::Hasher::new();
    for (symbol, bars) in series {
        hasher.update(symbol.as_bytes());
        for bar in bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

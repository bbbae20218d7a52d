//! Performance report: annual statistics, drawdowns and trade totals.
//!
//! Metric helpers are pure functions over an equity series. The report
//! serializes to JSON and renders the plain-text block printed after a run.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use momolab_core::domain::{Sign, Trade};

use crate::paper::EquityPoint;

/// One calendar year of the equity curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnualStats {
    pub year: i32,
    pub pnl: f64,
    /// Percent of the equity the year started with.
    pub pnl_pct: f64,
    pub end_equity: f64,
    /// Largest peak-to-trough loss in dollars (positive magnitude).
    pub max_drawdown: f64,
    /// Largest peak-to-trough loss in percent of the peak (positive magnitude).
    pub max_drawdown_pct: f64,
}

/// Highest equity seen in a span and how far the latest value sits below it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeakDrawdown {
    pub date: NaiveDate,
    pub peak: f64,
    pub drawdown: f64,
    pub drawdown_pct: f64,
}

/// Holding and signal state of one instrument at the end of the run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionLine {
    pub symbol: String,
    pub position: i64,
    pub desired: Sign,
    pub score: Option<f64>,
    pub last_close: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceReport {
    pub strategy: String,
    pub as_of: Option<NaiveDate>,
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_pnl: f64,
    pub total_pnl_pct: f64,
    pub annual: Vec<AnnualStats>,
    pub avg_annual_pnl: f64,
    pub avg_annual_pnl_pct: f64,
    pub avg_drawdown: f64,
    pub avg_drawdown_pct: f64,
    /// Sum of annual PnL over the sum of losing years' PnL; `None` without a losing year.
    pub gain_to_pain: Option<f64>,
    pub total_peak: Option<PeakDrawdown>,
    pub latest_peak: Option<PeakDrawdown>,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
    pub avg_trade_pnl: f64,
    pub win_rate: f64,
    pub positions: Vec<PositionLine>,
}

impl PerformanceReport {
    pub fn compute(
        strategy: &str,
        initial_equity: f64,
        curve: &[EquityPoint],
        trades: &[Trade],
        positions: Vec<PositionLine>,
    ) -> Self {
        let mut series = Vec::with_capacity(curve.len() + 1);
        series.push(initial_equity);
        series.extend(curve.iter().map(|p| p.equity));

        let final_equity = curve.last().map_or(initial_equity, |p| p.equity);
        let total_pnl = final_equity - initial_equity;
        let annual = annual_stats(initial_equity, curve);

        let years = annual.len().max(1) as f64;
        let losses: f64 = annual.iter().filter(|y| y.pnl < 0.0).map(|y| y.pnl).sum();
        let gain_to_pain = (losses < 0.0)
            .then(|| annual.iter().map(|y| y.pnl).sum::<f64>() / losses.abs());

        let latest_peak = curve.last().and_then(|last| {
            let year = last.date.year();
            let start = curve.partition_point(|p| p.date.year() < year);
            peak_drawdown(&curve[start..])
        });

        let trade_pnl: f64 = trades.iter().map(Trade::pnl).sum();
        let (avg_trade_pnl, win_rate) = if trades.is_empty() {
            (0.0, 0.0)
        } else {
            let winners = trades.iter().filter(|t| t.is_winner()).count();
            (
                trade_pnl / trades.len() as f64,
                winners as f64 / trades.len() as f64,
            )
        };

        Self {
            strategy: strategy.to_string(),
            as_of: curve.last().map(|p| p.date),
            initial_equity,
            final_equity,
            total_pnl,
            total_pnl_pct: pct(total_pnl, initial_equity),
            avg_annual_pnl: annual.iter().map(|y| y.pnl).sum::<f64>() / years,
            avg_annual_pnl_pct: annual.iter().map(|y| y.pnl_pct).sum::<f64>() / years,
            avg_drawdown: annual.iter().map(|y| y.max_drawdown).sum::<f64>() / years,
            avg_drawdown_pct: annual.iter().map(|y| y.max_drawdown_pct).sum::<f64>() / years,
            annual,
            gain_to_pain,
            total_peak: peak_drawdown(curve),
            latest_peak,
            max_drawdown: max_drawdown_amount(&series).abs(),
            max_drawdown_pct: max_drawdown(&series).abs() * 100.0,
            trade_count: trades.len(),
            avg_trade_pnl,
            win_rate,
            positions,
        }
    }

    /// The text block printed (and optionally sent) after a run.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if !self.positions.is_empty() {
            out.push_str("Positions & Signals\n");
            for p in &self.positions {
                out.push_str(&format!(
                    "\t{}: position {}, desired {}, score {}, close {}\n",
                    p.symbol,
                    p.position,
                    sign_label(p.desired),
                    p.score.map_or("n/a".to_string(), |s| format!("{s:.4}")),
                    p.last_close.map_or("n/a".to_string(), |c| format!("{c:.2}")),
                ));
            }
            out.push('\n');
        }

        for y in &self.annual {
            out.push_str(&format!(
                "{} PnL: {}, PnL Pct: {:.2}%, End Equity: {}, MaxDD: {}, Pct MaxDD: {:.2}%\n",
                y.year,
                dollars(y.pnl),
                y.pnl_pct,
                dollars(y.end_equity),
                dollars(y.max_drawdown),
                y.max_drawdown_pct,
            ));
        }
        if !self.annual.is_empty() {
            out.push_str(&format!(
                "\nAvg PnL: {}, Pct Avg PnL: {:.2}%, Avg DD: {}, Pct Avg DD: {:.2}%, Gain to Pain: {}\n",
                dollars(self.avg_annual_pnl),
                self.avg_annual_pnl_pct,
                dollars(self.avg_drawdown),
                self.avg_drawdown_pct,
                self.gain_to_pain
                    .map_or("n/a".to_string(), |g| format!("{g:.4}")),
            ));
        }

        if let Some(peak) = &self.total_peak {
            out.push_str(&format!(
                "\nTotal equity peak [{}]: {}\nCurrent Drawdown: {} [{:.2}%]\n",
                peak.date,
                dollars(peak.peak),
                dollars(peak.drawdown),
                peak.drawdown_pct,
            ));
        }
        if let Some(peak) = &self.latest_peak {
            out.push_str(&format!(
                "\n{} equity peak [{}]: {}\nCurrent Drawdown: {} [{:.2}%]\n",
                peak.date.year(),
                peak.date,
                dollars(peak.peak),
                dollars(peak.drawdown),
                peak.drawdown_pct,
            ));
        }

        out.push_str(&format!(
            "\nAvg Trade PnL: {}, Max DD: {}, Max DD Pct: {:.2}%, Num Trades: {}",
            dollars(self.avg_trade_pnl),
            dollars(self.max_drawdown),
            self.max_drawdown_pct,
            self.trade_count,
        ));
        out
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if equity is constant or monotonically increasing.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Maximum drawdown in currency, as a negative number.
pub fn max_drawdown_amount(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &eq in equity_curve {
        peak = peak.max(eq);
        max_dd = max_dd.min(eq - peak);
    }
    max_dd
}

/// Per-year PnL and drawdown. Each year starts from the previous year's close.
pub fn annual_stats(initial_equity: f64, curve: &[EquityPoint]) -> Vec<AnnualStats> {
    let mut stats = Vec::new();
    let mut base = initial_equity;
    let mut rest = curve;

    while let Some(first) = rest.first() {
        let year = first.date.year();
        let len = rest.partition_point(|p| p.date.year() == year);
        let (this_year, tail) = rest.split_at(len);

        let mut series = Vec::with_capacity(len + 1);
        series.push(base);
        series.extend(this_year.iter().map(|p| p.equity));

        let end_equity = series[series.len() - 1];
        let pnl = end_equity - base;
        stats.push(AnnualStats {
            year,
            pnl,
            pnl_pct: pct(pnl, base),
            end_equity,
            max_drawdown: max_drawdown_amount(&series).abs(),
            max_drawdown_pct: max_drawdown(&series).abs() * 100.0,
        });

        base = end_equity;
        rest = tail;
    }
    stats
}

/// Highest point of `curve` (earliest on ties) and the drawdown of its last value.
pub fn peak_drawdown(curve: &[EquityPoint]) -> Option<PeakDrawdown> {
    let last = curve.last()?;
    let peak = curve
        .iter()
        .fold(None::<&EquityPoint>, |best, p| match best {
            Some(b) if b.equity >= p.equity => Some(b),
            _ => Some(p),
        })?;
    let drawdown = peak.equity - last.equity;
    Some(PeakDrawdown {
        date: peak.date,
        peak: peak.equity,
        drawdown,
        drawdown_pct: pct(drawdown, peak.equity),
    })
}

fn sign_label(sign: Sign) -> &'static str {
    match sign {
        Sign::Long => "long",
        Sign::Flat => "flat",
        Sign::Short => "short",
    }
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// `$1,234,567`; negatives render as `-$1,234`.
pub fn dollars(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(y: i32, m: u32, d: u32, equity: f64) -> EquityPoint {
        EquityPoint {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            equity,
        }
    }

    #[test]
    fn test_max_drawdown_peak_to_trough() {
        let eq = vec![100.0, 120.0, 90.0, 110.0];
        assert!((max_drawdown(&eq) - (-0.25)).abs() < 1e-12);
        assert_eq!(max_drawdown_amount(&eq), -30.0);
    }

    #[test]
    fn test_max_drawdown_monotonic() {
        let eq = vec![100.0, 101.0, 102.0];
        assert_eq!(max_drawdown(&eq), 0.0);
        assert_eq!(max_drawdown_amount(&eq), 0.0);
    }

    #[test]
    fn annual_years_chain_from_previous_close() {
        let curve = vec![
            point(2020, 6, 1, 1_100.0),
            point(2020, 12, 31, 1_200.0),
            point(2021, 3, 1, 900.0),
            point(2021, 12, 31, 1_080.0),
        ];
        let stats = annual_stats(1_000.0, &curve);
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].year, 2020);
        assert_eq!(stats[0].pnl, 200.0);
        assert!((stats[0].pnl_pct - 20.0).abs() < 1e-9);
        assert_eq!(stats[0].max_drawdown, 0.0);

        assert_eq!(stats[1].year, 2021);
        assert_eq!(stats[1].pnl, -120.0);
        assert!((stats[1].pnl_pct - (-10.0)).abs() < 1e-9);
        assert_eq!(stats[1].max_drawdown, 300.0);
        assert!((stats[1].max_drawdown_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn peak_and_current_drawdown() {
        let curve = vec![
            point(2020, 1, 2, 100.0),
            point(2020, 1, 3, 150.0),
            point(2020, 1, 6, 150.0),
            point(2020, 1, 7, 120.0),
        ];
        let pd = peak_drawdown(&curve).unwrap();
        assert_eq!(pd.date, NaiveDate::from_ymd_opt(2020, 1, 3).unwrap());
        assert_eq!(pd.peak, 150.0);
        assert_eq!(pd.drawdown, 30.0);
        assert!((pd.drawdown_pct - 20.0).abs() < 1e-9);
        assert!(peak_drawdown(&[]).is_none());
    }

    #[test]
    fn report_totals_and_gain_to_pain() {
        let curve = vec![point(2020, 12, 31, 1_200.0), point(2021, 12, 31, 1_100.0)];
        let trades = vec![Trade {
            symbol: "SPY".into(),
            side: Sign::Long,
            quantity: 10,
            entry_date: NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
            entry_price: 100.0,
            exit_date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            exit_price: 110.0,
        }];
        let report = PerformanceReport::compute("test", 1_000.0, &curve, &trades, Vec::new());

        assert_eq!(report.total_pnl, 100.0);
        assert!((report.total_pnl_pct - 10.0).abs() < 1e-9);
        assert_eq!(report.gain_to_pain, Some(1.0));
        assert_eq!(report.trade_count, 1);
        assert_eq!(report.avg_trade_pnl, 100.0);
        assert_eq!(report.win_rate, 1.0);
        assert_eq!(report.max_drawdown, 100.0);
        assert_eq!(report.latest_peak.as_ref().unwrap().peak, 1_100.0);
        assert_eq!(report.as_of, NaiveDate::from_ymd_opt(2021, 12, 31));
    }

    #[test]
    fn empty_curve_reports_flat() {
        let report = PerformanceReport::compute("test", 5_000.0, &[], &[], Vec::new());
        assert_eq!(report.final_equity, 5_000.0);
        assert!(report.annual.is_empty());
        assert!(report.total_peak.is_none());
        assert_eq!(report.gain_to_pain, None);
        assert!(report.render_text().ends_with("Num Trades: 0"));
    }

    #[test]
    fn rendered_text_lists_years_and_totals() {
        let curve = vec![point(2020, 12, 31, 1_250_000.0)];
        let report = PerformanceReport::compute(
            "test",
            1_000_000.0,
            &curve,
            &[],
            vec![PositionLine {
                symbol: "SPY".into(),
                position: 90,
                desired: Sign::Long,
                score: Some(0.1),
                last_close: Some(110.0),
            }],
        );
        let text = report.render_text();
        assert!(text.starts_with("Positions & Signals\n\tSPY: position 90, desired long"));
        assert!(text.contains(
            "2020 PnL: $250,000, PnL Pct: 25.00%, End Equity: $1,250,000, MaxDD: $0, Pct MaxDD: 0.00%"
        ));
        assert!(text.contains("Total equity peak [2020-12-31]: $1,250,000"));
        assert!(text.contains("Gain to Pain: n/a"));
    }

    #[test]
    fn dollar_formatting() {
        assert_eq!(dollars(0.0), "$0");
        assert_eq!(dollars(999.4), "$999");
        assert_eq!(dollars(1_000.0), "$1,000");
        assert_eq!(dollars(1_234_567.8), "$1,234,568");
        assert_eq!(dollars(-4_321.0), "-$4,321");
    }
}

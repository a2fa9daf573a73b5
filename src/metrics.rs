//! Performance metrics over a time-ordered cumulative PnL series.
//!
//! The formulas deliberately reproduce the original backtester, which
//! deviates from textbook usage in two places:
//! - `sharpe_ratio` divides the final cumulative return by the
//!   population std-dev of the whole cumulative return series (not a
//!   per-period mean/std of returns, not annualized).
//! - `max_drawdown` is global-min minus global-max over capital plus
//!   global-max, not a running peak-to-trough scan.

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::types::{PnlPoint, StrategySummary};

/// Compute the ten-field summary for `pnl` against `initial_value`.
///
/// Pure: same inputs always produce the same summary. Fails on an empty
/// series and on a constant series (zero variance makes the Sharpe-like
/// ratio undefined — surfaced as `ZeroVariance`, never ±inf).
pub fn summarize(initial_value: f64, pnl: &[PnlPoint]) -> Result<StrategySummary> {
    if pnl.is_empty() {
        return Err(AnalysisError::EmptySeries("PnL series".into()));
    }

    let net_pnl: Vec<f64> = pnl.iter().map(|p| p.cumulative_pnl).collect();
    let net_pnl_percent: Vec<f64> = net_pnl.iter().map(|v| v / initial_value).collect();

    let cumulative_returns = net_pnl_percent[net_pnl_percent.len() - 1];
    let pnl_std = population_std(&net_pnl_percent);
    if pnl_std == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }
    let sharpe_ratio = cumulative_returns / pnl_std;

    let max_pnl = net_pnl.iter().cloned().fold(f64::MIN, f64::max);
    let min_pnl = net_pnl.iter().cloned().fold(f64::MAX, f64::min);
    let max_drawdown = (min_pnl - max_pnl) / (initial_value + max_pnl);

    let final_return = net_pnl[net_pnl.len() - 1];
    let final_value = initial_value + final_return;

    debug!(
        points = pnl.len(),
        cumulative_returns, sharpe_ratio, max_drawdown, "summary computed"
    );

    Ok(StrategySummary {
        initial_value,
        final_value,
        begin_time: pnl[0].time.clone(),
        end_time: pnl[pnl.len() - 1].time.clone(),
        final_return,
        max_pnl,
        min_pnl,
        cumulative_returns,
        sharpe_ratio,
        max_drawdown,
    })
}

/// Population standard deviation (denominator N, matching numpy's
/// default `std()`), not the sample estimator.
fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var.sqrt()
}

/// Print the summary the way the original report did: raw currency
/// values plus percent-formatted returns and drawdown.
pub fn print_summary(summary: &StrategySummary) {
    println!("Initial Investment Value:  {}", summary.initial_value);
    println!("Final Investment Value:    {}", summary.final_value);
    println!("Begin at:                  {}", summary.begin_time);
    println!("End at:                    {}", summary.end_time);
    println!("Final return:              {}", summary.final_return);
    println!("Maximum PnL:               {}", summary.max_pnl);
    println!("Minimum PnL:               {}", summary.min_pnl);
    println!(
        "Cumulative Returns:        {:.4}%",
        summary.cumulative_returns * 100.0
    );
    println!("Sharpe Ratio:              {}", summary.sharpe_ratio);
    println!(
        "Maximum Drawdown:          {:.4}%",
        summary.max_drawdown * 100.0
    );
}

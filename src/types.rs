//! Record and summary types shared across the analysis pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ─── Source records (immutable once loaded) ───

/// One executed trade from the fills file. Collection order is the
/// source order — fills are never re-sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRecord {
    pub strategy_name: String,
    pub symbol: String,
    pub trade_time: String,
    pub price: f64,
    pub quantity: i64,
    pub execution_cost: f64,
}

/// One order lifecycle record from the orders file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub strategy_name: String,
    pub last_mod_time: String,
    pub state: String,
    pub symbol: String,
    pub price: f64,
    pub quantity: i64,
    pub display_quantity: i64,
    pub filled_qty: i64,
    pub remains: i64,
    pub avg_fill_price: f64,
    pub execution_cost: f64,
    pub market_center: String,
}

/// Cumulative PnL at a point in time. `name` is the combined
/// `{strategy}_{symbol}` label stamped on every row at load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlPoint {
    pub time: String,
    pub cumulative_pnl: f64,
    pub name: String,
}

/// One market trade print from a tick file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickPoint {
    pub timestamp: String,
    pub price: f64,
}

// ─── Derived aggregates ───

/// OHLC aggregate for one calendar date. The date is the timestamp
/// truncated at its first space. For any bucket produced by the
/// bucketer, low ≤ open ≤ high and low ≤ close ≤ high hold by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DayBucket {
    /// All-zero bucket, used as the alignment seed when a PnL date
    /// precedes every tick date.
    pub fn zero(date: &str) -> Self {
        Self {
            date: date.to_string(),
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
        }
    }

    /// Same OHLC values carried onto a different date (forward-fill).
    pub fn carried_to(&self, date: &str) -> Self {
        Self {
            date: date.to_string(),
            ..self.clone()
        }
    }
}

/// Tick data after day-bucketing: the flat time-sorted series plus the
/// per-date OHLC map. Present on the dataset only after `load_ticks`.
#[derive(Debug, Clone)]
pub struct TickSeries {
    /// (timestamp, price), sorted ascending by timestamp.
    pub series: Vec<(String, f64)>,
    /// Date string → that day's OHLC.
    pub by_date: BTreeMap<String, DayBucket>,
}

// ─── Performance summary ───

/// The ten-field performance summary, recomputed on demand.
/// `sharpe_ratio` and `max_drawdown` intentionally use the original
/// backtester's non-standard definitions (see `metrics`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub initial_value: f64,
    pub final_value: f64,
    pub begin_time: String,
    pub end_time: String,
    pub final_return: f64,
    pub max_pnl: f64,
    pub min_pnl: f64,
    /// Final cumulative return as a fraction of initial capital.
    pub cumulative_returns: f64,
    /// Cumulative return / population std-dev of the return series.
    pub sharpe_ratio: f64,
    /// (global min − global max) / (capital + global max). ≤ 0.
    pub max_drawdown: f64,
}

// ─── Selection ───

/// Result of `StrategyDataset::select`. Unrecognized or absent kinds
/// yield all three collections in (fills, orders, pnl) order.
#[derive(Debug)]
pub enum Selection<'a> {
    Fills(&'a [FillRecord]),
    Orders(&'a [OrderRecord]),
    Pnl(&'a [PnlPoint]),
    All(&'a [FillRecord], &'a [OrderRecord], &'a [PnlPoint]),
}

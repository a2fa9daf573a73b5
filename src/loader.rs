//! CSV ingestion with explicit per-file schemas.
//!
//! Each input kind has a fixed required column set, resolved against
//! the header up front. The first missing column fails the whole load
//! with the offending file name — a partial column set never proceeds.
//! Actual CSV tokenization is delegated to the `csv` crate.

use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::types::{FillRecord, OrderRecord, PnlPoint, TickPoint};

// ─── Required column sets ───

pub const FILL_COLUMNS: [&str; 6] = [
    "StrategyName",
    "Symbol",
    "TradeTime",
    "Price",
    "Quantity",
    "ExecutionCost",
];

pub const ORDER_COLUMNS: [&str; 12] = [
    "StrategyName",
    "LastModTime",
    "State",
    "Symbol",
    "Price",
    "Quantity",
    "DisplayQuantity",
    "FilledQty",
    "Remains",
    "AvgFillPrice",
    "ExecutionCost",
    "MarketCenter",
];

/// The PnL file is free-form; only these two columns are required.
pub const PNL_COLUMNS: [&str; 2] = ["Time", "Cumulative PnL"];

pub const TICK_COLUMNS: [&str; 2] = ["timestamp", "price"];

// ─── Reader plumbing ───

/// Open a CSV reader and resolve the required columns against its
/// header, in one step. Every loader starts here.
fn open_table(path: &str, required: &[&str]) -> Result<(csv::Reader<std::fs::File>, Vec<usize>)> {
    if !Path::new(path).exists() {
        return Err(AnalysisError::MissingFile(path.to_string()));
    }
    let mut reader = csv::Reader::from_path(path).map_err(|source| AnalysisError::Csv {
        file: path.to_string(),
        source,
    })?;
    let headers = reader
        .headers()
        .map_err(|source| AnalysisError::Csv {
            file: path.to_string(),
            source,
        })?
        .clone();
    let idx = resolve_columns(&headers, path, required)?;
    Ok((reader, idx))
}

/// Resolve every required column to its header index, failing on the
/// first one that is absent.
fn resolve_columns(headers: &StringRecord, file: &str, required: &[&str]) -> Result<Vec<usize>> {
    required
        .iter()
        .map(|col| {
            headers
                .iter()
                .position(|h| h.trim() == *col)
                .ok_or_else(|| AnalysisError::MissingColumn {
                    file: file.to_string(),
                    column: col.to_string(),
                })
        })
        .collect()
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_f64(record: &StringRecord, idx: usize, file: &str, row: usize, column: &str) -> Result<f64> {
    field(record, idx)
        .parse()
        .map_err(|_| AnalysisError::BadField {
            file: file.to_string(),
            row,
            column: column.to_string(),
        })
}

fn parse_i64(record: &StringRecord, idx: usize, file: &str, row: usize, column: &str) -> Result<i64> {
    field(record, idx)
        .parse()
        .map_err(|_| AnalysisError::BadField {
            file: file.to_string(),
            row,
            column: column.to_string(),
        })
}

/// Iterate data records, surfacing csv-level errors with the file name.
/// `row` passed to the closure is 1-based over data rows.
fn for_each_record<F>(reader: &mut csv::Reader<std::fs::File>, file: &str, mut f: F) -> Result<()>
where
    F: FnMut(usize, &StringRecord) -> Result<()>,
{
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|source| AnalysisError::Csv {
            file: file.to_string(),
            source,
        })?;
        f(i + 1, &record)?;
    }
    Ok(())
}

// ─── Loaders ───

pub fn load_fills(path: &str) -> Result<Vec<FillRecord>> {
    let (mut reader, idx) = open_table(path, &FILL_COLUMNS)?;

    let mut fills = Vec::new();
    for_each_record(&mut reader, path, |row, rec| {
        fills.push(FillRecord {
            strategy_name: field(rec, idx[0]).to_string(),
            symbol: field(rec, idx[1]).to_string(),
            trade_time: field(rec, idx[2]).to_string(),
            price: parse_f64(rec, idx[3], path, row, "Price")?,
            quantity: parse_i64(rec, idx[4], path, row, "Quantity")?,
            execution_cost: parse_f64(rec, idx[5], path, row, "ExecutionCost")?,
        });
        Ok(())
    })?;

    debug!(file = path, rows = fills.len(), "loaded fills");
    Ok(fills)
}

pub fn load_orders(path: &str) -> Result<Vec<OrderRecord>> {
    let (mut reader, idx) = open_table(path, &ORDER_COLUMNS)?;

    let mut orders = Vec::new();
    for_each_record(&mut reader, path, |row, rec| {
        orders.push(OrderRecord {
            strategy_name: field(rec, idx[0]).to_string(),
            last_mod_time: field(rec, idx[1]).to_string(),
            state: field(rec, idx[2]).to_string(),
            symbol: field(rec, idx[3]).to_string(),
            price: parse_f64(rec, idx[4], path, row, "Price")?,
            quantity: parse_i64(rec, idx[5], path, row, "Quantity")?,
            display_quantity: parse_i64(rec, idx[6], path, row, "DisplayQuantity")?,
            filled_qty: parse_i64(rec, idx[7], path, row, "FilledQty")?,
            remains: parse_i64(rec, idx[8], path, row, "Remains")?,
            avg_fill_price: parse_f64(rec, idx[9], path, row, "AvgFillPrice")?,
            execution_cost: parse_f64(rec, idx[10], path, row, "ExecutionCost")?,
            market_center: field(rec, idx[11]).to_string(),
        });
        Ok(())
    })?;

    debug!(file = path, rows = orders.len(), "loaded orders");
    Ok(orders)
}

/// Load the PnL table. The `name` label on each point is stamped by the
/// dataset once the strategy identity is known.
pub fn load_pnl(path: &str) -> Result<Vec<PnlPoint>> {
    let (mut reader, idx) = open_table(path, &PNL_COLUMNS)?;

    let mut pnl = Vec::new();
    for_each_record(&mut reader, path, |row, rec| {
        pnl.push(PnlPoint {
            time: field(rec, idx[0]).to_string(),
            cumulative_pnl: parse_f64(rec, idx[1], path, row, "Cumulative PnL")?,
            name: String::new(),
        });
        Ok(())
    })?;

    debug!(file = path, rows = pnl.len(), "loaded pnl");
    Ok(pnl)
}

pub fn load_tick_file(path: &str) -> Result<Vec<TickPoint>> {
    let (mut reader, idx) = open_table(path, &TICK_COLUMNS)?;

    let mut ticks = Vec::new();
    for_each_record(&mut reader, path, |row, rec| {
        ticks.push(TickPoint {
            timestamp: field(rec, idx[0]).to_string(),
            price: parse_f64(rec, idx[1], path, row, "price")?,
        });
        Ok(())
    })?;

    debug!(file = path, rows = ticks.len(), "loaded ticks");
    Ok(ticks)
}

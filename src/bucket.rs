//! Calendar-day OHLC bucketing for irregularly-timestamped series.
//! The same pass is applied to tick prices and to cumulative PnL.
//!
//! Timestamps are treated as opaque sortable strings whose date portion
//! precedes the first space. "Mon DD …" style PnL timestamps are made
//! sortable first via `normalize_months`.

use crate::error::{AnalysisError, Result};
use crate::types::DayBucket;

// ─── Timestamp normalization ───

/// Month-name abbreviation → two-digit month. Fixed lookup, applied to
/// every occurrence in a timestamp string.
pub const MONTH_NUMBERS: [(&str, &str); 12] = [
    ("Jan", "01"),
    ("Feb", "02"),
    ("Mar", "03"),
    ("Apr", "04"),
    ("May", "05"),
    ("Jun", "06"),
    ("Jul", "07"),
    ("Aug", "08"),
    ("Sep", "09"),
    ("Oct", "10"),
    ("Nov", "11"),
    ("Dec", "12"),
];

/// Replace month-name abbreviations so the timestamp sorts
/// lexicographically in chronological order.
pub fn normalize_months(ts: &str) -> String {
    let mut out = ts.to_string();
    for (name, num) in MONTH_NUMBERS {
        if out.contains(name) {
            out = out.replace(name, num);
        }
    }
    out
}

/// First 19 characters — the "YYYY-MM-DD HH:MM:SS" prefix used as the
/// x value of the raw PnL line series.
pub fn truncate_seconds(ts: &str) -> &str {
    if ts.len() > 19 { &ts[..19] } else { ts }
}

/// Date portion of a timestamp: everything before the first space.
pub fn date_of(ts: &str) -> &str {
    ts.split(' ').next().unwrap_or(ts)
}

// ─── Day bucketing ───

/// Sort (timestamp, value) pairs and collapse them into one OHLC bucket
/// per calendar date, ascending.
///
/// The *pairs* are sorted, not the columns independently, so each value
/// stays attached to its timestamp. A single-point day yields
/// open = high = low = close. Empty input is an error — an empty bucket
/// list would silently hide a broken upstream file.
pub fn bucket_by_day(mut pairs: Vec<(String, f64)>) -> Result<Vec<DayBucket>> {
    if pairs.is_empty() {
        return Err(AnalysisError::EmptySeries("day bucketing".into()));
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut buckets: Vec<DayBucket> = Vec::new();
    let mut current_date = date_of(&pairs[0].0).to_string();
    let mut values: Vec<f64> = vec![pairs[0].1];

    for (ts, value) in &pairs[1..] {
        let date = date_of(ts);
        if date == current_date {
            values.push(*value);
        } else {
            buckets.push(seal(&current_date, &values));
            current_date = date.to_string();
            values = vec![*value];
        }
    }
    buckets.push(seal(&current_date, &values));

    Ok(buckets)
}

/// Collapse one day's accumulated values. `values` is never empty here.
fn seal(date: &str, values: &[f64]) -> DayBucket {
    DayBucket {
        date: date.to_string(),
        open: values[0],
        high: values.iter().cloned().fold(f64::MIN, f64::max),
        low: values.iter().cloned().fold(f64::MAX, f64::min),
        close: values[values.len() - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, f64)]) -> Vec<(String, f64)> {
        raw.iter().map(|(t, v)| (t.to_string(), *v)).collect()
    }

    #[test]
    fn test_two_day_buckets() {
        let buckets = bucket_by_day(pairs(&[
            ("2023-01-01 09:00", 10.0),
            ("2023-01-01 10:00", 12.0),
            ("2023-01-02 09:00", 8.0),
        ]))
        .unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].date, "2023-01-01");
        assert_eq!(buckets[0].open, 10.0);
        assert_eq!(buckets[0].high, 12.0);
        assert_eq!(buckets[0].low, 10.0);
        assert_eq!(buckets[0].close, 12.0);
        assert_eq!(buckets[1].date, "2023-01-02");
        assert_eq!(buckets[1].open, 8.0);
        assert_eq!(buckets[1].high, 8.0);
        assert_eq!(buckets[1].low, 8.0);
        assert_eq!(buckets[1].close, 8.0);
    }

    #[test]
    fn test_permutation_invariance() {
        let base = [
            ("2023-01-01 09:00", 10.0),
            ("2023-01-01 10:00", 12.0),
            ("2023-01-01 11:00", 9.0),
            ("2023-01-02 09:00", 8.0),
            ("2023-01-02 15:00", 14.0),
        ];
        let sorted = bucket_by_day(pairs(&base)).unwrap();

        // Reversed and interleaved orderings must bucket identically.
        let mut reversed = pairs(&base);
        reversed.reverse();
        assert_eq!(bucket_by_day(reversed).unwrap(), sorted);

        let shuffled = pairs(&[
            ("2023-01-02 09:00", 8.0),
            ("2023-01-01 11:00", 9.0),
            ("2023-01-02 15:00", 14.0),
            ("2023-01-01 09:00", 10.0),
            ("2023-01-01 10:00", 12.0),
        ]);
        assert_eq!(bucket_by_day(shuffled).unwrap(), sorted);
    }

    #[test]
    fn test_single_day_idempotence() {
        let buckets = bucket_by_day(pairs(&[
            ("2023-03-05 09:00:00", 4.0),
            ("2023-03-05 09:00:01", 7.0),
            ("2023-03-05 09:00:02", 1.0),
            ("2023-03-05 09:00:03", 5.0),
        ]))
        .unwrap();

        assert_eq!(buckets.len(), 1);
        let b = &buckets[0];
        assert_eq!(b.open, 4.0);
        assert_eq!(b.close, 5.0);
        assert_eq!(b.high, 7.0);
        assert_eq!(b.low, 1.0);
    }

    #[test]
    fn test_single_point_day() {
        let buckets = bucket_by_day(pairs(&[("2023-01-01 09:00", 42.0)])).unwrap();
        let b = &buckets[0];
        assert_eq!(b.open, 42.0);
        assert_eq!(b.high, 42.0);
        assert_eq!(b.low, 42.0);
        assert_eq!(b.close, 42.0);
    }

    #[test]
    fn test_bucket_consistency() {
        let buckets = bucket_by_day(pairs(&[
            ("2023-01-01 09:00", -3.0),
            ("2023-01-01 10:00", 5.0),
            ("2023-01-01 11:00", 0.0),
            ("2023-01-02 09:00", 2.0),
            ("2023-01-02 10:00", -1.0),
        ]))
        .unwrap();

        for b in &buckets {
            assert!(b.low <= b.open && b.open <= b.high, "bucket {:?}", b);
            assert!(b.low <= b.close && b.close <= b.high, "bucket {:?}", b);
        }
    }

    #[test]
    fn test_empty_input_is_error() {
        match bucket_by_day(Vec::new()) {
            Err(crate::error::AnalysisError::EmptySeries(_)) => {}
            other => panic!("expected EmptySeries, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_values() {
        // PnL series go negative; min/max must not assume positivity.
        let buckets =
            bucket_by_day(pairs(&[("2023-01-01 09:00", -5.0), ("2023-01-01 10:00", -2.0)]))
                .unwrap();
        assert_eq!(buckets[0].low, -5.0);
        assert_eq!(buckets[0].high, -2.0);
    }

    #[test]
    fn test_normalize_months() {
        assert_eq!(normalize_months("2023-Jan-05 09:30:00"), "2023-01-05 09:30:00");
        assert_eq!(normalize_months("Dec 31 23:59:59"), "12 31 23:59:59");
        // Untouched when no month name appears.
        assert_eq!(normalize_months("2023-01-05 09:30:00"), "2023-01-05 09:30:00");
    }

    #[test]
    fn test_normalized_timestamps_sort_chronologically() {
        let mut ts = vec![
            normalize_months("2023-Feb-01 00:00:00"),
            normalize_months("2023-Jan-15 00:00:00"),
            normalize_months("2023-Dec-01 00:00:00"),
        ];
        ts.sort();
        assert_eq!(ts[0], "2023-01-15 00:00:00");
        assert_eq!(ts[1], "2023-02-01 00:00:00");
        assert_eq!(ts[2], "2023-12-01 00:00:00");
    }

    #[test]
    fn test_truncate_seconds() {
        assert_eq!(
            truncate_seconds("2023-01-05 09:30:00.123456"),
            "2023-01-05 09:30:00"
        );
        assert_eq!(truncate_seconds("short"), "short");
    }
}

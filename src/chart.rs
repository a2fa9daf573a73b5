//! Visualization boundary. The core hands labeled day-bucket arrays and
//! a raw line series to a `ChartSink`; what the sink does with them
//! (terminal painting, image export, nothing) is not the core's concern.

use serde::Serialize;

use crate::types::DayBucket;

pub trait ChartSink {
    /// A candlestick-style series: one OHLC bucket per calendar day,
    /// ascending by date.
    fn candles(&mut self, label: &str, days: &[DayBucket]);

    /// A raw (x, y) line series.
    fn line(&mut self, label: &str, points: &[(String, f64)]);
}

// ─── Collector sink ───

#[derive(Debug, Clone, Serialize)]
pub struct CandleSeries {
    pub label: String,
    pub days: Vec<DayBucket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<(String, f64)>,
}

/// In-memory sink: the TUI viewer collects first and paints later, and
/// tests assert on what was emitted.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CollectedCharts {
    pub candle_series: Vec<CandleSeries>,
    pub line_series: Vec<LineSeries>,
}

impl ChartSink for CollectedCharts {
    fn candles(&mut self, label: &str, days: &[DayBucket]) {
        self.candle_series.push(CandleSeries {
            label: label.to_string(),
            days: days.to_vec(),
        });
    }

    fn line(&mut self, label: &str, points: &[(String, f64)]) {
        self.line_series.push(LineSeries {
            label: label.to_string(),
            points: points.to_vec(),
        });
    }
}

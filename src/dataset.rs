//! Strategy dataset: owns the loaded record collections, derives the
//! strategy identity, and orchestrates metrics and visualization.

use std::collections::BTreeMap;

use tracing::info;

use crate::bucket::{bucket_by_day, normalize_months, truncate_seconds};
use crate::chart::ChartSink;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::loader;
use crate::metrics;
use crate::types::{
    DayBucket, FillRecord, OrderRecord, PnlPoint, Selection, StrategySummary, TickSeries,
};

#[derive(Debug)]
pub struct StrategyDataset {
    config: AnalysisConfig,
    fills: Vec<FillRecord>,
    orders: Vec<OrderRecord>,
    pnl: Vec<PnlPoint>,
    /// `{strategy_name}_{symbol}` from the first fill row.
    name: String,
    /// First/last fill timestamps by positional order in the source.
    begin_time: String,
    end_time: String,
    /// Populated only by `load_ticks`.
    ticks: Option<TickSeries>,
}

impl StrategyDataset {
    /// Load the three mandatory sources. Any missing file, missing
    /// column, or unparseable cell fails the whole construction with an
    /// error naming the offending file.
    pub fn load(
        fills_path: &str,
        orders_path: &str,
        pnl_path: &str,
        config: AnalysisConfig,
    ) -> Result<Self> {
        let fills = loader::load_fills(fills_path)?;
        let orders = loader::load_orders(orders_path)?;
        let mut pnl = loader::load_pnl(pnl_path)?;

        // The strategy identity and time range come from the fills, so
        // an empty fills file leaves the dataset undefined.
        let first = fills
            .first()
            .ok_or_else(|| AnalysisError::EmptySeries(format!("{fills_path} has no fill rows")))?;
        let name = format!("{}_{}", first.strategy_name, first.symbol);
        for point in &mut pnl {
            point.name = name.clone();
        }

        let begin_time = first.trade_time.clone();
        let end_time = fills[fills.len() - 1].trade_time.clone();

        info!(
            strategy = %name,
            fills = fills.len(),
            orders = orders.len(),
            pnl_points = pnl.len(),
            "dataset loaded"
        );

        Ok(Self {
            config,
            fills,
            orders,
            pnl,
            name,
            begin_time,
            end_time,
            ticks: None,
        })
    }

    // ─── Accessors ───

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn begin_time(&self) -> &str {
        &self.begin_time
    }

    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn fills(&self) -> &[FillRecord] {
        &self.fills
    }

    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    pub fn pnl(&self) -> &[PnlPoint] {
        &self.pnl
    }

    /// Tick-derived state. Errors when `load_ticks` was never called,
    /// rather than pretending an empty market existed.
    pub fn tick_series(&self) -> Result<&TickSeries> {
        self.ticks.as_ref().ok_or(AnalysisError::TicksNotLoaded)
    }

    /// Case-insensitive selection by kind; anything unrecognized (or
    /// no kind at all) returns all three collections.
    pub fn select(&self, kind: Option<&str>) -> Selection<'_> {
        match kind.map(|k| k.to_lowercase()).as_deref() {
            Some("fill") => Selection::Fills(&self.fills),
            Some("order") => Selection::Orders(&self.orders),
            Some("pnl") => Selection::Pnl(&self.pnl),
            _ => Selection::All(&self.fills, &self.orders, &self.pnl),
        }
    }

    // ─── Ticks ───

    /// Merge one or more tick files, sort the combined series, and
    /// derive per-day OHLC buckets. Replaces any previously loaded tick
    /// state wholesale.
    pub fn load_ticks(&mut self, files: &[String]) -> Result<()> {
        let mut pairs: Vec<(String, f64)> = Vec::new();
        for file in files {
            for tick in loader::load_tick_file(file)? {
                pairs.push((tick.timestamp, tick.price));
            }
        }

        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let buckets = bucket_by_day(pairs.clone())?;
        let by_date: BTreeMap<String, DayBucket> = buckets
            .into_iter()
            .map(|b| (b.date.clone(), b))
            .collect();

        info!(
            files = files.len(),
            ticks = pairs.len(),
            days = by_date.len(),
            "tick data loaded"
        );

        self.ticks = Some(TickSeries {
            series: pairs,
            by_date,
        });
        Ok(())
    }

    // ─── Metrics ───

    /// The ten-field performance summary; `verbose` also prints the
    /// human-readable report.
    pub fn summarize(&self, verbose: bool) -> Result<StrategySummary> {
        let summary = metrics::summarize(self.config.initial_value, &self.pnl)?;
        if verbose {
            metrics::print_summary(&summary);
        }
        Ok(summary)
    }

    // ─── Visualization ───

    /// Emit the raw PnL line, the PnL-per-day candles, and — when tick
    /// data was loaded — the tick candles aligned to the PnL date axis.
    ///
    /// PnL timestamps are month-normalized and re-sorted first so "Mon
    /// DD" style times bucket chronologically. Alignment forward-fills
    /// a missing tick date from the previous tick day, seeding with
    /// all-zero values before the first tick day.
    pub fn render(&self, sink: &mut dyn ChartSink) -> Result<()> {
        let mut normalized: Vec<(String, f64)> = self
            .pnl
            .iter()
            .map(|p| (normalize_months(&p.time), p.cumulative_pnl))
            .collect();
        normalized.sort_by(|a, b| a.0.cmp(&b.0));

        let line: Vec<(String, f64)> = normalized
            .iter()
            .map(|(ts, v)| (truncate_seconds(ts).to_string(), *v))
            .collect();
        sink.line(&format!("{} PnL", self.name), &line);

        let pnl_days = bucket_by_day(normalized)?;
        sink.candles("Profit and Loss", &pnl_days);

        if let Some(ticks) = &self.ticks {
            let aligned = align_to_dates(&pnl_days, &ticks.by_date);
            sink.candles("Tick data", &aligned);
        }

        Ok(())
    }
}

/// For every PnL date, the matching tick-day bucket; dates with no tick
/// data repeat the previous day's values (or zero before any tick day).
fn align_to_dates(
    pnl_days: &[DayBucket],
    tick_by_date: &BTreeMap<String, DayBucket>,
) -> Vec<DayBucket> {
    let mut aligned: Vec<DayBucket> = Vec::with_capacity(pnl_days.len());
    for day in pnl_days {
        let bucket = match tick_by_date.get(&day.date) {
            Some(t) => t.clone(),
            None => aligned
                .last()
                .map(|prev| prev.carried_to(&day.date))
                .unwrap_or_else(|| DayBucket::zero(&day.date)),
        };
        aligned.push(bucket);
    }
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::CollectedCharts;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path.to_string_lossy().to_string()
    }

    fn fixture(dir: &tempfile::TempDir) -> (String, String, String) {
        let fills = write_file(
            dir,
            "fills.csv",
            "StrategyName,Symbol,TradeTime,Price,Quantity,ExecutionCost\n\
             sma_cross,AAPL,2023-01-01 09:30:00,150.0,100,0.5\n\
             sma_cross,AAPL,2023-01-03 15:59:00,151.0,-100,0.5\n",
        );
        let orders = write_file(
            dir,
            "orders.csv",
            "StrategyName,LastModTime,State,Symbol,Price,Quantity,DisplayQuantity,\
             FilledQty,Remains,AvgFillPrice,ExecutionCost,MarketCenter\n\
             sma_cross,2023-01-01 09:30:00,FILLED,AAPL,150.0,100,100,100,0,150.0,0.5,NASDAQ\n",
        );
        let pnl = write_file(
            dir,
            "pnl.csv",
            "Time,Cumulative PnL\n\
             2023-01-01 10:00:00,0\n\
             2023-01-01 16:00:00,10\n\
             2023-01-02 16:00:00,-5\n\
             2023-01-03 16:00:00,20\n",
        );
        (fills, orders, pnl)
    }

    fn dataset(dir: &tempfile::TempDir) -> StrategyDataset {
        let (fills, orders, pnl) = fixture(dir);
        StrategyDataset::load(&fills, &orders, &pnl, AnalysisConfig::with_initial_value(100.0))
            .unwrap()
    }

    #[test]
    fn test_load_derives_identity_and_range() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(&dir);

        assert_eq!(ds.name(), "sma_cross_AAPL");
        assert_eq!(ds.begin_time(), "2023-01-01 09:30:00");
        assert_eq!(ds.end_time(), "2023-01-03 15:59:00");
        // Label stamped on every PnL row.
        assert!(ds.pnl().iter().all(|p| p.name == "sma_cross_AAPL"));
    }

    #[test]
    fn test_empty_fills_fails_construction() {
        let dir = tempfile::tempdir().unwrap();
        let (_, orders, pnl) = fixture(&dir);
        let empty_fills = write_file(
            &dir,
            "empty_fills.csv",
            "StrategyName,Symbol,TradeTime,Price,Quantity,ExecutionCost\n",
        );

        match StrategyDataset::load(&empty_fills, &orders, &pnl, AnalysisConfig::default()) {
            Err(AnalysisError::EmptySeries(msg)) => assert!(msg.contains("empty_fills.csv")),
            other => panic!("expected EmptySeries, got {:?}", other),
        }
    }

    #[test]
    fn test_summarize_matches_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(&dir);
        let s = ds.summarize(false).unwrap();

        assert_eq!(s.final_value, 120.0);
        assert_eq!(s.cumulative_returns, 0.20);
        assert_eq!(s.max_pnl, 20.0);
        assert_eq!(s.min_pnl, -5.0);
        // Repeated calls are pure.
        assert_eq!(ds.summarize(false).unwrap(), s);
    }

    #[test]
    fn test_select_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(&dir);

        assert!(matches!(ds.select(Some("FILL")), Selection::Fills(f) if f.len() == 2));
        assert!(matches!(ds.select(Some("Order")), Selection::Orders(o) if o.len() == 1));
        assert!(matches!(ds.select(Some("pnl")), Selection::Pnl(p) if p.len() == 4));
        assert!(matches!(ds.select(None), Selection::All(..)));
        assert!(matches!(ds.select(Some("bogus")), Selection::All(..)));
    }

    #[test]
    fn test_tick_series_before_load_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(&dir);
        assert!(matches!(
            ds.tick_series(),
            Err(AnalysisError::TicksNotLoaded)
        ));
    }

    #[test]
    fn test_load_ticks_merges_and_sorts_multiple_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut ds = dataset(&dir);
        // Second file's timestamps precede the first file's.
        let t1 = write_file(
            &dir,
            "t1.csv",
            "timestamp,price\n2023-01-03 09:00:00,8.0\n2023-01-03 10:00:00,9.0\n",
        );
        let t2 = write_file(
            &dir,
            "t2.csv",
            "timestamp,price\n2023-01-01 09:00:00,10.0\n2023-01-01 10:00:00,12.0\n",
        );

        ds.load_ticks(&[t1, t2]).unwrap();
        let ticks = ds.tick_series().unwrap();

        assert_eq!(ticks.series.first().unwrap().0, "2023-01-01 09:00:00");
        assert_eq!(ticks.series.last().unwrap().0, "2023-01-03 10:00:00");
        assert_eq!(ticks.by_date.len(), 2);
        let day1 = &ticks.by_date["2023-01-01"];
        assert_eq!(day1.open, 10.0);
        assert_eq!(day1.close, 12.0);
    }

    #[test]
    fn test_render_without_ticks_emits_line_and_pnl_candles() {
        let dir = tempfile::tempdir().unwrap();
        let ds = dataset(&dir);
        let mut charts = CollectedCharts::default();
        ds.render(&mut charts).unwrap();

        assert_eq!(charts.line_series.len(), 1);
        assert_eq!(charts.line_series[0].label, "sma_cross_AAPL PnL");
        assert_eq!(charts.candle_series.len(), 1);
        assert_eq!(charts.candle_series[0].label, "Profit and Loss");
        // Three distinct PnL dates.
        assert_eq!(charts.candle_series[0].days.len(), 3);
        let day1 = &charts.candle_series[0].days[0];
        assert_eq!(day1.open, 0.0);
        assert_eq!(day1.close, 10.0);
    }

    #[test]
    fn test_render_alignment_forward_fills() {
        let dir = tempfile::tempdir().unwrap();
        let mut ds = dataset(&dir);
        // Ticks exist for Jan 1 only; Jan 2 and Jan 3 must repeat
        // Jan 1's OHLC, not drop to zero.
        let t = write_file(
            &dir,
            "ticks.csv",
            "timestamp,price\n2023-01-01 09:00:00,10.0\n2023-01-01 10:00:00,12.0\n",
        );
        ds.load_ticks(&[t]).unwrap();

        let mut charts = CollectedCharts::default();
        ds.render(&mut charts).unwrap();

        let tick_candles = charts
            .candle_series
            .iter()
            .find(|c| c.label == "Tick data")
            .unwrap();
        assert_eq!(tick_candles.days.len(), 3);
        assert_eq!(tick_candles.days[0].date, "2023-01-01");
        for day in &tick_candles.days {
            assert_eq!(day.open, 10.0);
            assert_eq!(day.high, 12.0);
            assert_eq!(day.low, 10.0);
            assert_eq!(day.close, 12.0);
        }
    }

    #[test]
    fn test_render_zero_seed_before_first_tick_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut ds = dataset(&dir);
        // Ticks start on Jan 2; Jan 1 has no previous day to carry.
        let t = write_file(
            &dir,
            "ticks.csv",
            "timestamp,price\n2023-01-02 09:00:00,8.0\n",
        );
        ds.load_ticks(&[t]).unwrap();

        let mut charts = CollectedCharts::default();
        ds.render(&mut charts).unwrap();

        let tick_candles = charts
            .candle_series
            .iter()
            .find(|c| c.label == "Tick data")
            .unwrap();
        assert_eq!(tick_candles.days[0].open, 0.0);
        assert_eq!(tick_candles.days[0].close, 0.0);
        assert_eq!(tick_candles.days[1].open, 8.0);
        // Jan 3 forward-fills Jan 2.
        assert_eq!(tick_candles.days[2].open, 8.0);
    }

    #[test]
    fn test_render_normalizes_month_names() {
        let dir = tempfile::tempdir().unwrap();
        let (fills, orders, _) = fixture(&dir);
        // Month-name timestamps arrive unsorted; Feb must bucket after Jan.
        let pnl = write_file(
            &dir,
            "pnl_months.csv",
            "Time,Cumulative PnL\n\
             2023-Feb-01 10:00:00,15\n\
             2023-Jan-05 10:00:00,3\n\
             2023-Jan-05 16:00:00,7\n",
        );
        let ds = StrategyDataset::load(&fills, &orders, &pnl, AnalysisConfig::default()).unwrap();

        let mut charts = CollectedCharts::default();
        ds.render(&mut charts).unwrap();

        let days = &charts.candle_series[0].days;
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2023-01-05");
        assert_eq!(days[0].open, 3.0);
        assert_eq!(days[0].close, 7.0);
        assert_eq!(days[1].date, "2023-02-01");
        // Line x values are normalized and seconds-truncated.
        assert_eq!(charts.line_series[0].points[0].0, "2023-01-05 10:00:00");
    }
}

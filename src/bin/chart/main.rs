//! Chart TUI: PnL-per-day candles beside aligned tick candles, with the
//! raw cumulative PnL line below.
//!
//! Usage: chart --fills <path> --orders <path> --pnl <path> [--ticks <path>]...
//!              [--capital <value>] [--since YYYY-MM-DD]
//! Keys: [Left/h] scroll back | [Right/l] scroll fwd | [Home/g] start
//!       [End/G] end | [q/Esc] quit

mod render;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use strategy_analysis::chart::{CandleSeries, CollectedCharts, LineSeries};
use strategy_analysis::config::AnalysisConfig;
use strategy_analysis::dataset::StrategyDataset;

// ─── CLI Args ───

struct Args {
    fills: String,
    orders: String,
    pnl: String,
    ticks: Vec<String>,
    capital: Option<f64>,
    since: Option<String>,
}

impl Args {
    fn from_cli() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut fills = None;
        let mut orders = None;
        let mut pnl = None;
        let mut ticks = Vec::new();
        let mut capital = None;
        let mut since = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--fills" => {
                    i += 1;
                    fills = args.get(i).cloned();
                }
                "--orders" => {
                    i += 1;
                    orders = args.get(i).cloned();
                }
                "--pnl" => {
                    i += 1;
                    pnl = args.get(i).cloned();
                }
                "--ticks" => {
                    i += 1;
                    if let Some(t) = args.get(i) {
                        ticks.push(t.clone());
                    }
                }
                "--capital" => {
                    i += 1;
                    capital = Some(
                        args.get(i)
                            .context("--capital needs a value")?
                            .parse()
                            .context("--capital must be numeric")?,
                    );
                }
                "--since" => {
                    i += 1;
                    since = Some(parse_since(args.get(i).context("--since needs a date")?)?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown arg: {}", other);
                    print_usage();
                    std::process::exit(1);
                }
            }
            i += 1;
        }

        let (Some(fills), Some(orders), Some(pnl)) = (fills, orders, pnl) else {
            print_usage();
            bail!("--fills, --orders and --pnl are all required");
        };

        Ok(Args {
            fills,
            orders,
            pnl,
            ticks,
            capital,
            since,
        })
    }
}

fn print_usage() {
    eprintln!(
        "Usage: chart --fills <path> --orders <path> --pnl <path> [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --ticks <path>      Tick CSV (repeatable)\n\
         \x20 --capital <value>   Initial capital\n\
         \x20 --since <date>      Only show days on or after YYYY-MM-DD\n\
         \x20 --help, -h          Show this help"
    );
}

/// Validate the --since date and canonicalize it to the YYYY-MM-DD form
/// the day buckets are keyed by.
fn parse_since(s: &str) -> Result<String> {
    let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("cannot parse date '{}', expected YYYY-MM-DD", s))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

// ─── App state ───

pub struct App {
    pub name: String,
    pub candle_series: Vec<CandleSeries>,
    pub line_series: Vec<LineSeries>,
    pub total_days: usize,
    /// First visible day index into every candle series.
    pub offset: usize,
}

impl App {
    fn new(name: String, mut charts: CollectedCharts, since: Option<&str>) -> Self {
        if let Some(since) = since {
            for series in &mut charts.candle_series {
                series.days.retain(|d| d.date.as_str() >= since);
            }
            for series in &mut charts.line_series {
                series.points.retain(|(ts, _)| ts.as_str() >= since);
            }
        }
        let total_days = charts
            .candle_series
            .iter()
            .map(|c| c.days.len())
            .max()
            .unwrap_or(0);
        Self {
            name,
            candle_series: charts.candle_series,
            line_series: charts.line_series,
            total_days,
            offset: 0,
        }
    }

    fn scroll(&mut self, delta: i64) {
        let max = self.total_days.saturating_sub(1);
        let next = self.offset as i64 + delta;
        self.offset = next.clamp(0, max as i64) as usize;
    }
}

fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Right | KeyCode::Char('l') => app.scroll(1),
        KeyCode::Left | KeyCode::Char('h') => app.scroll(-1),
        KeyCode::Home | KeyCode::Char('g') => app.offset = 0,
        KeyCode::End | KeyCode::Char('G') => app.offset = app.total_days.saturating_sub(1),
        _ => {}
    }
    false
}

// ─── Main ───

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::from_cli()?;
    let config = match args.capital {
        Some(value) => AnalysisConfig::with_initial_value(value),
        None => AnalysisConfig::from_env(),
    };

    eprintln!("Loading backtest output...");
    let mut dataset = StrategyDataset::load(&args.fills, &args.orders, &args.pnl, config)
        .context("loading backtest output")?;
    if !args.ticks.is_empty() {
        dataset
            .load_ticks(&args.ticks)
            .context("loading tick data")?;
    }

    let mut charts = CollectedCharts::default();
    dataset.render(&mut charts).context("building chart series")?;
    eprintln!(
        "Built {} candle series, {} line series. Starting TUI...",
        charts.candle_series.len(),
        charts.line_series.len()
    );

    let app = App::new(dataset.name().to_string(), charts, args.since.as_deref());
    if app.total_days == 0 {
        bail!("nothing to draw after --since filter");
    }

    run_tui(app)
}

fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map_err(Into::into)
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|frame| render::draw(app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if handle_key(app, key) {
                    return Ok(());
                }
            }
        }
    }
}

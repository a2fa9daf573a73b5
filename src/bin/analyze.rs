//! Offline strategy performance report over backtest CSV output.
//!
//! Loads the fill/order/PnL files produced by a backtest run (plus
//! optional tick files), computes the ten-field performance summary,
//! and prints it as a report or JSON.
//!
//! Usage:
//!   analyze --fills <path> --orders <path> --pnl <path> [OPTIONS]
//!     --ticks <path>       Tick CSV, repeatable
//!     --capital <value>    Initial capital (default: env INITIAL_CAPITAL or 10000000)
//!     --json               Emit the summary as JSON instead of the report
//!     --verbose            Also print dataset counts and tick day buckets

use anyhow::{bail, Context, Result};

use strategy_analysis::config::AnalysisConfig;
use strategy_analysis::dataset::StrategyDataset;

// ─── CLI Args ───

struct Args {
    fills: String,
    orders: String,
    pnl: String,
    ticks: Vec<String>,
    capital: Option<f64>,
    json: bool,
    verbose: bool,
}

impl Args {
    fn from_cli() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let mut fills = None;
        let mut orders = None;
        let mut pnl = None;
        let mut ticks = Vec::new();
        let mut capital = None;
        let mut json = false;
        let mut verbose = false;

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
                "--json" => json = true,
                "--verbose" | "-v" => verbose = true,
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
            json,
            verbose,
        })
    }
}

fn print_usage() {
    eprintln!(
        "Usage: analyze --fills <path> --orders <path> --pnl <path> [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --ticks <path>      Tick CSV (repeatable, merged before bucketing)\n\
         \x20 --capital <value>   Initial capital (default: INITIAL_CAPITAL or 10000000)\n\
         \x20 --json              Emit the summary as JSON\n\
         \x20 --verbose, -v       Print dataset counts and tick day buckets\n\
         \x20 --help, -h          Show this help"
    );
}

// ─── Main ───

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::from_cli()?;
    let config = match args.capital {
        Some(value) => AnalysisConfig::with_initial_value(value),
        None => AnalysisConfig::from_env(),
    };

    let mut dataset = StrategyDataset::load(&args.fills, &args.orders, &args.pnl, config)
        .context("loading backtest output")?;
    if !args.ticks.is_empty() {
        dataset
            .load_ticks(&args.ticks)
            .context("loading tick data")?;
    }

    if args.verbose {
        eprintln!(
            "{}: {} fills, {} orders, {} PnL points ({} .. {})",
            dataset.name(),
            dataset.fills().len(),
            dataset.orders().len(),
            dataset.pnl().len(),
            dataset.begin_time(),
            dataset.end_time(),
        );
        if let Ok(ticks) = dataset.tick_series() {
            eprintln!("{} ticks across {} days:", ticks.series.len(), ticks.by_date.len());
            for day in ticks.by_date.values() {
                eprintln!(
                    "  {}  o={:.4} h={:.4} l={:.4} c={:.4}",
                    day.date, day.open, day.high, day.low, day.close
                );
            }
        }
    }

    if args.json {
        let summary = dataset.summarize(false)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("─── {} ───", dataset.name());
        dataset.summarize(true)?;
    }

    Ok(())
}

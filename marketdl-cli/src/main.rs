//! MarketDL CLI — catalog queries and headless downloads.
//!
//! Commands:
//! - `catalog` — paged instrument listing or ranked search
//! - `sources` — source table with supported timeframes
//! - `timeframes` — availability union with per-timeframe source lists
//! - `fetch` — build, validate, and run a download request to completion

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use marketdl_core::availability::AvailabilityTable;
use marketdl_core::backend::{HttpCatalog, LocalJobEngine, StaticCatalog};
use marketdl_core::catalog::{clamp_page, page_count, page_slice, row_number};
use marketdl_core::coordinator::{CoordinatorEvent, JobCoordinator};
use marketdl_core::domain::{Instrument, MarketDataType, MarketType};
use marketdl_core::provider::CatalogProvider;
use marketdl_core::request::{default_window, DownloadRequest};

#[derive(Parser)]
#[command(name = "marketdl", about = "MarketDL CLI — market-data download orchestration")]
struct Cli {
    /// Catalog service base URL (overrides the built-in catalog).
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// TOML catalog file (overrides the built-in catalog).
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List instruments, paged, optionally filtered or searched.
    Catalog {
        /// Market segment: crypto, stock, futures. Ignored with --query,
        /// which searches the whole catalog.
        #[arg(long)]
        market: Option<String>,

        /// Search query (ranked: exact symbol, prefix, substring, fuzzy).
        #[arg(long)]
        query: Option<String>,

        /// 1-based page number; out-of-range values clamp.
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Emit the page as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List sources with their supported timeframes.
    Sources,
    /// Show the timeframe availability union and which sources serve each.
    Timeframes,
    /// Download data for the given symbols and stream progress to stdout.
    Fetch {
        /// Comma-separated symbols, resolved against the catalog.
        #[arg(long, required = true, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Comma-separated data types: ohlcv, spread, orderflow, bidask, news.
        #[arg(long, value_delimiter = ',', default_value = "ohlcv")]
        types: Vec<String>,

        /// Sampling interval; must be served by each symbol's source.
        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Start date (YYYY-MM-DD). Defaults to 30 days before the end date.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD). Defaults to yesterday.
        #[arg(long)]
        end: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let provider = build_provider(&cli)?;

    match &cli.command {
        Commands::Catalog { market, query, page, json } => {
            run_catalog(provider.as_ref(), market.as_deref(), query.as_deref(), *page, *json)
        }
        Commands::Sources => run_sources(provider.as_ref()),
        Commands::Timeframes => run_timeframes(provider.as_ref()),
        Commands::Fetch { symbols, types, timeframe, start, end } => run_fetch(
            provider.as_ref(),
            symbols,
            types,
            timeframe,
            start.as_deref(),
            end.as_deref(),
        ),
    }
}

fn build_provider(cli: &Cli) -> Result<Box<dyn CatalogProvider>> {
    if cli.catalog_url.is_some() && cli.catalog_file.is_some() {
        bail!("--catalog-url and --catalog-file are mutually exclusive");
    }
    if let Some(url) = &cli.catalog_url {
        return Ok(Box::new(HttpCatalog::new(url.clone())?));
    }
    if let Some(path) = &cli.catalog_file {
        return Ok(Box::new(StaticCatalog::from_toml_file(Path::new(path))?));
    }
    Ok(Box::new(StaticCatalog::builtin()))
}

fn parse_market(s: &str) -> Result<MarketType> {
    match s.to_lowercase().as_str() {
        "crypto" => Ok(MarketType::Crypto),
        "stock" | "stocks" => Ok(MarketType::Stock),
        "futures" => Ok(MarketType::Futures),
        other => bail!("unknown market '{other}'. Valid: crypto, stock, futures"),
    }
}

fn parse_data_type(s: &str) -> Result<MarketDataType> {
    match s.to_lowercase().as_str() {
        "ohlcv" => Ok(MarketDataType::Ohlcv),
        "spread" => Ok(MarketDataType::Spread),
        "orderflow" | "order-flow" => Ok(MarketDataType::OrderFlow),
        "bidask" | "bid-ask" => Ok(MarketDataType::BidAsk),
        "news" => Ok(MarketDataType::News),
        other => bail!("unknown data type '{other}'. Valid: ohlcv, spread, orderflow, bidask, news"),
    }
}

fn run_catalog(
    provider: &dyn CatalogProvider,
    market: Option<&str>,
    query: Option<&str>,
    page: usize,
    json: bool,
) -> Result<()> {
    // A query searches the whole catalog; otherwise the market filter
    // applies (default crypto, like the dialog's first tab).
    let listed: Vec<Instrument> = if let Some(query) = query {
        provider.search_instruments(query)?
    } else {
        let market = market.map(parse_market).transpose()?.unwrap_or_default();
        provider
            .list_instruments()?
            .into_iter()
            .filter(|i| i.market_type == market)
            .collect()
    };

    let page = clamp_page(page, listed.len());
    let rows = page_slice(&listed, page);

    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No instruments match.");
        return Ok(());
    }

    println!("{:>4} {:<12} {:<32} {:<14} {}", "#", "Symbol", "Name", "Source", "Market");
    println!("{}", "-".repeat(72));
    for (offset, instrument) in rows.iter().enumerate() {
        println!(
            "{:>4} {:<12} {:<32} {:<14} {}",
            row_number(page, offset),
            instrument.symbol,
            instrument.name,
            instrument.source_name,
            instrument.market_type,
        );
    }
    println!();
    println!(
        "Page {page}/{} — {} instrument(s) total",
        page_count(listed.len()),
        listed.len()
    );
    Ok(())
}

fn run_sources(provider: &dyn CatalogProvider) -> Result<()> {
    let sources = provider.list_sources()?;
    if sources.is_empty() {
        println!("No sources.");
        return Ok(());
    }
    println!("{:<16} {:<30} {}", "Source", "URL", "Timeframes");
    println!("{}", "-".repeat(72));
    for source in &sources {
        println!(
            "{:<16} {:<30} {}",
            source.name,
            source.url,
            source.timeframes.join(" ")
        );
    }
    Ok(())
}

fn run_timeframes(provider: &dyn CatalogProvider) -> Result<()> {
    let sources = provider.list_sources()?;
    let table = AvailabilityTable::build(&sources);
    if table.timeframes().is_empty() {
        println!("No timeframes available.");
        return Ok(());
    }
    for timeframe in table.timeframes() {
        println!(
            "{:<6} {}",
            timeframe,
            table.sources_supporting(timeframe).join(", ")
        );
    }
    Ok(())
}

fn run_fetch(
    provider: &dyn CatalogProvider,
    symbols: &[String],
    types: &[String],
    timeframe: &str,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let instruments = provider.list_instruments()?;
    let sources = provider.list_sources()?;
    let today = chrono::Local::now().date_naive();

    let data_types = types
        .iter()
        .map(|s| parse_data_type(s))
        .collect::<Result<Vec<_>>>()?;

    let resolved = symbols
        .iter()
        .map(|s| resolve_symbol(&instruments, s))
        .collect::<Result<Vec<_>>>()?;

    // Refuse unservable symbols up front instead of letting the engine
    // fail mid-job.
    let table = AvailabilityTable::build(&sources);
    for instrument in &resolved {
        if !table.is_available(instrument, timeframe) {
            let supported = sources
                .iter()
                .find(|s| s.name == instrument.source_name)
                .map(|s| s.timeframes.join(" "))
                .unwrap_or_default();
            bail!(
                "{} ({}) does not serve timeframe {timeframe}; supported: {supported}",
                instrument.symbol,
                instrument.source_name,
            );
        }
    }

    let (default_start, default_end) = default_window(today);
    let start_date = parse_date(start)?.unwrap_or(default_start);
    let end_date = parse_date(end)?.unwrap_or(default_end);

    let request = DownloadRequest {
        instruments: resolved,
        data_types,
        timeframe: timeframe.to_string(),
        start_date,
        end_date,
    };
    request.validate(today)?;

    let engine = LocalJobEngine::new(sources);
    let mut coordinator = JobCoordinator::new();
    let job_id = coordinator.submit(&engine, &request)?;
    println!(
        "Job {job_id}: {} instrument(s), {timeframe}, {start_date} to {end_date}",
        request.instruments.len()
    );

    loop {
        for event in coordinator.pump() {
            match event {
                CoordinatorEvent::Progress(progress) => {
                    println!("  {progress:.0}%");
                }
                CoordinatorEvent::Completed => {
                    println!("Download complete.");
                    return Ok(());
                }
                CoordinatorEvent::Failed(message) => {
                    eprintln!("Download failed: {message}");
                    std::process::exit(1);
                }
            }
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    s.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
    })
    .transpose()
}

/// Case-insensitive symbol lookup; catalog order breaks ties across sources.
fn resolve_symbol(instruments: &[Instrument], symbol: &str) -> Result<Instrument> {
    instruments
        .iter()
        .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
        .cloned()
        .with_context(|| format!("symbol '{symbol}' not found in the catalog"))
}

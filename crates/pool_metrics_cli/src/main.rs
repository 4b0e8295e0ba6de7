//! pool-metrics CLI: pool TVL/volume, OHLCV, and TVL history.

use clap::{Parser, Subcommand};
use pool_metrics::{GeckoTerminalClient, OhlcvQuery, TvlQuery, YieldSamuraiClient};
use pool_metrics_export::{export_tvl_history, write_ohlcv_csv, write_pool_metrics_csv};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let rt = Runtime::new()?;
    match cli.command {
        Command::Pool(args) => run_pool(args, &rt),
        Command::Pools(args) => run_pools(args, &rt),
        Command::Ohlcv(args) => run_ohlcv(args, &rt),
        Command::Tvl(args) => run_tvl(args, &rt),
    }
}

#[derive(Parser)]
#[command(name = "pool-metrics")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "DEX pool TVL, volume, and OHLCV from GeckoTerminal and YieldSamurai")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// TVL and 24h volume for one pool (GeckoTerminal).
    Pool(PoolArgs),
    /// TVL and 24h volume for several pools on one network (GeckoTerminal).
    Pools(PoolsArgs),
    /// OHLCV candles for one pool (GeckoTerminal).
    Ohlcv(OhlcvArgs),
    /// Historical TVL for one pool (YieldSamurai).
    Tvl(TvlArgs),
}

#[derive(Parser)]
struct PoolArgs {
    #[arg(long)]
    network: String,
    #[arg(long)]
    address: String,
}

#[derive(Parser)]
struct PoolsArgs {
    #[arg(long)]
    network: String,
    /// Repeat or comma-separate.
    #[arg(long = "address", required = true, value_delimiter = ',')]
    addresses: Vec<String>,
    /// Also write the records to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct OhlcvArgs {
    #[arg(long)]
    network: String,
    #[arg(long)]
    address: String,
    #[arg(long, default_value = "day")]
    timeframe: String,
    #[arg(long, default_value_t = 1)]
    aggregate: u32,
    /// Only candles before this Unix timestamp.
    #[arg(long)]
    before: Option<i64>,
    #[arg(long, default_value_t = 100)]
    limit: u32,
    #[arg(long, default_value = "usd")]
    currency: String,
    #[arg(long, default_value = "base")]
    token: String,
    /// Also write the candles to this CSV file.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser)]
struct TvlArgs {
    #[arg(long)]
    chain: String,
    #[arg(long)]
    address: String,
    #[arg(long, default_value_t = 7)]
    days: u32,
    #[arg(long, default_value = "hourly")]
    interval: String,
    /// Falls back to the demo token when unset.
    #[arg(long, env = "YIELDSAMURAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Save `yieldsamurai_tvl_{chain}_{pool}.csv` into this directory.
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn run_pool(args: PoolArgs, rt: &Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let client = GeckoTerminalClient::new()?;
    let metrics = rt.block_on(client.pool_metrics(&args.network, &args.address));
    match metrics {
        Some(m) => println!("{}", serde_json::to_string_pretty(&m)?),
        None => not_found(&format!("pool {} on {}", args.address, args.network)),
    }
    Ok(())
}

fn run_pools(args: PoolsArgs, rt: &Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let client = GeckoTerminalClient::new()?;
    let metrics = rt.block_on(client.multi_pool_metrics(&args.network, &args.addresses));
    if let Some(out) = &args.out {
        write_pool_metrics_csv(&metrics, out)?;
        info!(path = %out.display(), rows = metrics.len(), "pool metrics saved");
    }
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

fn run_ohlcv(args: OhlcvArgs, rt: &Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let client = GeckoTerminalClient::new()?;
    let query = OhlcvQuery {
        timeframe: args.timeframe,
        aggregate: args.aggregate,
        before_timestamp: args.before,
        limit: args.limit,
        currency: args.currency,
        token: args.token,
    };
    let candles = rt.block_on(client.pool_ohlcv(&args.network, &args.address, &query));
    let Some(candles) = candles else {
        not_found(&format!("OHLCV for pool {} on {}", args.address, args.network));
    };
    if let Some(out) = &args.out {
        write_ohlcv_csv(&candles, out)?;
        info!(path = %out.display(), rows = candles.len(), "OHLCV saved");
    }
    println!("{}", serde_json::to_string_pretty(&candles)?);
    Ok(())
}

fn run_tvl(args: TvlArgs, rt: &Runtime) -> Result<(), Box<dyn std::error::Error>> {
    let client = YieldSamuraiClient::new(args.api_key.as_deref())?;
    let query = TvlQuery {
        days: args.days,
        interval: args.interval,
    };
    let points = rt.block_on(client.tvl_history(&args.chain, &args.address, &query));
    let Some(points) = points else {
        not_found(&format!("TVL for pool {} on {}", args.address, args.chain));
    };
    if let Some(dir) = &args.export_dir {
        if let Some(path) = export_tvl_history(dir, &args.chain, &args.address, &points)? {
            eprintln!("YieldSamurai TVL saved to {}", path.display());
        }
    }
    println!("{}", serde_json::to_string_pretty(&points)?);
    Ok(())
}

fn not_found(what: &str) -> ! {
    eprintln!("no data found for {what}");
    std::process::exit(1);
}

//! artify CLI — scan contract event logs and list gallery mints.
//!
//! Usage:
//! ```bash
//! # Scan the last 30 days of Transfer logs for a collection
//! artify scan --url https://rpc.example.org --address 0x5FbD... \
//!     --topic 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! # List minted pieces and their current owners
//! artify mints --url https://rpc.example.org --address 0x5FbD... --lookback-days 7
//! ```

mod args;
mod logging;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use artify_core::config::{DEFAULT_BLOCK_TIME_MS, DEFAULT_LOOKBACK_SECS, DEFAULT_MAX_CHUNK_WIDTH};
use artify_core::{FetchReport, LogFilter};
use artify_evm::nft::{decode_transfers, latest_owners};
use artify_evm::{mint_filter, ChunkedLogFetcher, FetcherBuilder, RawLog, RpcLogProvider};
use artify_rpc::{HttpTransport, HttpTransportConfig};

use crate::args::{Cli, Commands, ScanArgs};
use crate::logging::{init_tracing, LogConfig};

type HttpFetcher = ChunkedLogFetcher<RpcLogProvider<HttpTransport>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(&LogConfig {
        level: if cli.verbose { "info".into() } else { "warn".into() },
        json: cli.log_json,
    });

    let result = match cli.command {
        Commands::Scan { topics, scan } => cmd_scan(&scan, &topics).await,
        Commands::Mints { scan } => cmd_mints(&scan).await,
        Commands::Info => {
            cmd_info();
            Ok(())
        }
        Commands::Version => {
            println!("artify {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn cmd_info() {
    println!("artify v{}", env!("CARGO_PKG_VERSION"));
    println!("  Default lookback:     {} days", DEFAULT_LOOKBACK_SECS / 86_400);
    println!("  Default block time:   {DEFAULT_BLOCK_TIME_MS}ms");
    println!("  Default chunk width:  {DEFAULT_MAX_CHUNK_WIDTH} blocks/call");
    println!("  Failed chunks:        skipped and reported, scan continues");
    println!("  RPC URL env:          {}", args::RPC_URL_ENV);
    println!("  Log filter env:       {} (falls back to RUST_LOG)", logging::LOG_ENV);
}

fn build_fetcher(a: &ScanArgs) -> Result<HttpFetcher> {
    let config = a.fetch_config();
    let transport = HttpTransport::new(
        &a.url,
        HttpTransportConfig::within(config.chunk_timeout()),
    )
    .context("creating RPC transport")?;
    let fetcher = FetcherBuilder::new()
        .provider(RpcLogProvider::new(transport))
        .config(config)
        .build()?;
    Ok(fetcher)
}

async fn run_scan(
    fetcher: &HttpFetcher,
    filter: &LogFilter,
    to_block: Option<u64>,
) -> Result<FetchReport<RawLog>> {
    let report = match to_block {
        Some(head) => fetcher.fetch_with_config(filter, head).await?,
        None => fetcher.fetch_recent(filter).await?,
    };
    Ok(report)
}

async fn cmd_scan(a: &ScanArgs, topics: &[String]) -> Result<()> {
    let filter = topics
        .iter()
        .fold(LogFilter::address(&a.address), |f, t| f.topic0(t.as_str()));

    let fetcher = build_fetcher(a)?;
    let report = run_scan(&fetcher, &filter, a.to_block).await?;

    if a.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report);
    for log in report.logs() {
        println!(
            "  {:>10}  {:>4}  {}  {}",
            log.block_number().map_or_else(|| log.block_number.clone(), |n| n.to_string()),
            log.log_index().map_or_else(|| log.log_index.clone(), |n| n.to_string()),
            log.tx_hash,
            log.topics.first().map(String::as_str).unwrap_or("-"),
        );
    }
    Ok(())
}

async fn cmd_mints(a: &ScanArgs) -> Result<()> {
    let filter = mint_filter(&a.address);

    let fetcher = build_fetcher(a)?;
    let report = run_scan(&fetcher, &filter, a.to_block).await?;
    let mints = decode_transfers(report.logs());

    if a.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "range": report.range,
                "complete": report.is_complete(),
                "mints": mints,
                "owners": latest_owners(&mints),
            }))?
        );
        return Ok(());
    }

    print_summary(&report);
    println!("  Mints:         {}", mints.len());
    for m in &mints {
        println!(
            "  token {:<10} → {}  (block {}, tx {})",
            m.token_id_u128().map_or_else(|| m.token_id.clone(), |n| n.to_string()),
            m.to,
            m.block_number,
            m.tx_hash,
        );
    }
    Ok(())
}

fn print_summary<L>(report: &FetchReport<L>) {
    println!(
        "Scanned blocks {} in {} chunks ({}ms)",
        report.range,
        report.chunks.len(),
        report.elapsed_ms()
    );
    println!("  Logs:          {}", report.log_count());
    if !report.is_complete() {
        println!("  Failed chunks: {} (result is partial)", report.failed());
        for (range, err) in report.failed_chunks() {
            println!("    {range}  {err}");
        }
    }
}

//! Command-line surface of `artify`.

use clap::{Args, Parser, Subcommand};

use artify_core::config::{
    FetchConfig, Lookback, DEFAULT_BLOCK_TIME_MS, DEFAULT_CHUNK_TIMEOUT_MS, DEFAULT_LOOKBACK_SECS,
    DEFAULT_MAX_CHUNK_WIDTH,
};

/// Env var used when `--url` is not given.
pub const RPC_URL_ENV: &str = "ARTIFY_RPC_URL";

#[derive(Debug, Parser)]
#[command(
    name = "artify",
    about = "Chunked on-chain event log scanner for AIArtify collections",
    long_about = "
Chunked on-chain event log scanner for AIArtify collections.

Splits the lookback window into bounded eth_getLogs calls. A chunk that
fails or times out is reported and skipped; the scan always finishes.

ENVIRONMENT VARIABLES:
  ARTIFY_RPC_URL   RPC endpoint used when --url is not given
  ARTIFY_LOG       Log filter (falls back to RUST_LOG)
",
    version
)]
pub struct Cli {
    /// Log scan progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch logs emitted by a contract over a lookback window
    Scan {
        /// topic0 filter (event signature hash), repeatable
        #[arg(long = "topic")]
        topics: Vec<String>,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// List ERC-721 mints and current owners for a collection
    Mints {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Show default scan settings
    Info,

    /// Print version
    Version,
}

/// Flags shared by `scan` and `mints`.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// RPC endpoint
    #[arg(long, env = RPC_URL_ENV)]
    pub url: String,

    /// Contract address
    #[arg(long)]
    pub address: String,

    /// Scan up to this block instead of the chain head
    #[arg(long)]
    pub to_block: Option<u64>,

    /// Window size in blocks
    #[arg(long, conflicts_with = "lookback_days")]
    pub lookback_blocks: Option<u64>,

    /// Window size in days (see --block-time-ms)
    #[arg(long)]
    pub lookback_days: Option<u64>,

    /// Assumed block time used to turn days into blocks
    #[arg(long, default_value_t = DEFAULT_BLOCK_TIME_MS)]
    pub block_time_ms: u64,

    /// Max blocks per eth_getLogs call
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_WIDTH)]
    pub chunk_size: u64,

    /// Chunks queried at once
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Per-chunk timeout, retries included
    #[arg(long, default_value_t = DEFAULT_CHUNK_TIMEOUT_MS / 1_000)]
    pub timeout_secs: u64,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub fn lookback(&self) -> Lookback {
        match (self.lookback_blocks, self.lookback_days) {
            (Some(n), _) => Lookback::Blocks(n),
            (None, Some(d)) => Lookback::days(d, self.block_time_ms),
            (None, None) => Lookback::Duration {
                secs: DEFAULT_LOOKBACK_SECS,
                block_time_ms: self.block_time_ms,
            },
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            lookback: self.lookback(),
            max_chunk_width: self.chunk_size,
            chunk_timeout_ms: self.timeout_secs.saturating_mul(1_000),
            concurrency: self.concurrency,
        }
    }
}

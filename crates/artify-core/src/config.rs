//! Fetch configuration and the lookback window policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Default maximum blocks per provider query. Stays under the range limits
/// most hosted providers enforce on `eth_getLogs`.
pub const DEFAULT_MAX_CHUNK_WIDTH: u64 = 50_000;

/// Default lookback duration: 30 days.
pub const DEFAULT_LOOKBACK_SECS: u64 = 30 * 24 * 60 * 60;

/// Default assumed block time (2 seconds).
pub const DEFAULT_BLOCK_TIME_MS: u64 = 2_000;

/// Default per-chunk query timeout.
pub const DEFAULT_CHUNK_TIMEOUT_MS: u64 = 30_000;

// ─── Lookback ────────────────────────────────────────────────────────────────

/// How far back from the current head a scan reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookback {
    /// A fixed number of blocks.
    Blocks(u64),
    /// A wall-clock span converted using an assumed block time.
    Duration { secs: u64, block_time_ms: u64 },
}

impl Default for Lookback {
    /// 30 days at 2-second blocks (1,296,000 blocks).
    fn default() -> Self {
        Self::Duration {
            secs: DEFAULT_LOOKBACK_SECS,
            block_time_ms: DEFAULT_BLOCK_TIME_MS,
        }
    }
}

impl Lookback {
    /// `days` of history on a chain producing a block every `block_time_ms`.
    pub fn days(days: u64, block_time_ms: u64) -> Self {
        Self::Duration {
            secs: days.saturating_mul(24 * 60 * 60),
            block_time_ms,
        }
    }

    /// The window expressed in blocks.
    pub fn blocks(&self) -> Result<u64, FetchError> {
        match *self {
            Self::Blocks(n) => Ok(n),
            Self::Duration { secs, block_time_ms } => {
                if block_time_ms == 0 {
                    return Err(FetchError::invalid_config("block_time_ms must be at least 1"));
                }
                Ok(secs.saturating_mul(1_000) / block_time_ms)
            }
        }
    }
}

// ─── FetchConfig ─────────────────────────────────────────────────────────────

/// Configuration for a chunked log fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Scan window behind the current head.
    #[serde(default)]
    pub lookback: Lookback,
    /// Maximum blocks per provider query.
    #[serde(default = "default_max_chunk_width")]
    pub max_chunk_width: u64,
    /// Per-chunk query timeout in milliseconds. A timed-out chunk counts as
    /// failed; the scan continues.
    #[serde(default = "default_chunk_timeout_ms")]
    pub chunk_timeout_ms: u64,
    /// Chunks queried at once. 1 means strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_max_chunk_width() -> u64 {
    DEFAULT_MAX_CHUNK_WIDTH
}

fn default_chunk_timeout_ms() -> u64 {
    DEFAULT_CHUNK_TIMEOUT_MS
}

fn default_concurrency() -> usize {
    1
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            lookback: Lookback::default(),
            max_chunk_width: DEFAULT_MAX_CHUNK_WIDTH,
            chunk_timeout_ms: DEFAULT_CHUNK_TIMEOUT_MS,
            concurrency: 1,
        }
    }
}

impl FetchConfig {
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_millis(self.chunk_timeout_ms)
    }

    /// Check every field; returns the lookback in blocks on success.
    pub fn validate(&self) -> Result<u64, FetchError> {
        if self.max_chunk_width == 0 {
            return Err(FetchError::invalid_config("max_chunk_width must be at least 1"));
        }
        if self.chunk_timeout_ms == 0 {
            return Err(FetchError::invalid_config("chunk_timeout_ms must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(FetchError::invalid_config("concurrency must be at least 1"));
        }
        self.lookback.blocks()
    }
}

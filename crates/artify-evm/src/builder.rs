//! Fluent builder for [`ChunkedLogFetcher`].
//!
//! # Example
//!
//! ```rust,no_run
//! use artify_core::Lookback;
//! use artify_evm::{FetcherBuilder, RpcLogProvider};
//! use artify_rpc::HttpTransport;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = RpcLogProvider::new(HttpTransport::default_for("https://rpc.example.org")?);
//! let fetcher = FetcherBuilder::new()
//!     .provider(provider)
//!     .lookback(Lookback::days(30, 2_000))
//!     .max_chunk_width(50_000)
//!     .build()?;
//! # let _ = fetcher;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use artify_core::config::{FetchConfig, Lookback};
use artify_core::error::FetchError;

use crate::fetcher::ChunkedLogFetcher;
use crate::provider::LogProvider;

pub struct FetcherBuilder<P> {
    provider: Option<P>,
    config: FetchConfig,
}

impl<P> Default for FetcherBuilder<P> {
    fn default() -> Self {
        Self {
            provider: None,
            config: FetchConfig::default(),
        }
    }
}

impl<P: LogProvider> FetcherBuilder<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chain provider the fetcher queries.
    pub fn provider(mut self, provider: P) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: FetchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lookback(mut self, lookback: Lookback) -> Self {
        self.config.lookback = lookback;
        self
    }

    pub fn lookback_blocks(mut self, blocks: u64) -> Self {
        self.config.lookback = Lookback::Blocks(blocks);
        self
    }

    /// Maximum blocks per `eth_getLogs` call.
    pub fn max_chunk_width(mut self, width: u64) -> Self {
        self.config.max_chunk_width = width;
        self
    }

    pub fn chunk_timeout(mut self, timeout: Duration) -> Self {
        self.config.chunk_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Number of chunks queried at once (1 = sequential).
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n;
        self
    }

    /// Build the fetcher. Fails with [`FetchError::NoProvider`] if no
    /// provider was set, or `InvalidConfig` for out-of-range settings.
    pub fn build(self) -> Result<ChunkedLogFetcher<P>, FetchError> {
        let provider = self.provider.ok_or(FetchError::NoProvider)?;
        ChunkedLogFetcher::new(provider, self.config)
    }
}

//! Chunked, failure-tolerant retrieval of historical EVM logs.
//!
//! A scan window is split into chunks no wider than `max_chunk_width` so that
//! no single `eth_getLogs` call exceeds provider range limits. A chunk that
//! fails (provider error or timeout) is recorded in the [`FetchReport`] and
//! skipped; the scan always runs to the last chunk.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use artify_core::chunk::{lookback_range, ChunkIter};
use artify_core::config::FetchConfig;
use artify_core::error::{ChunkError, FetchError};
use artify_core::report::{ChunkOutcome, FetchReport};
use artify_core::types::{BlockRange, LogFilter};

use crate::log::RawLog;
use crate::provider::LogProvider;

/// Splits large log scans into provider-sized chunks.
pub struct ChunkedLogFetcher<P> {
    provider: P,
    config: FetchConfig,
}

impl<P: LogProvider> ChunkedLogFetcher<P> {
    /// Create a fetcher, validating `config` up front.
    pub fn new(provider: P, config: FetchConfig) -> Result<Self, FetchError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Scan `[max(0, current_block - lookback_blocks), current_block]` in
    /// chunks of at most `max_chunk_width` blocks.
    ///
    /// Only a bad `max_chunk_width` (0) makes this return `Err`; chunk
    /// failures are reported through [`FetchReport::failed_chunks`].
    pub async fn fetch(
        &self,
        filter: &LogFilter,
        current_block: u64,
        lookback_blocks: u64,
        max_chunk_width: u64,
    ) -> Result<FetchReport<RawLog>, FetchError> {
        let range = lookback_range(current_block, lookback_blocks);
        self.scan(filter, range, max_chunk_width).await
    }

    /// [`fetch`](Self::fetch) with the configured lookback and chunk width.
    pub async fn fetch_with_config(
        &self,
        filter: &LogFilter,
        current_block: u64,
    ) -> Result<FetchReport<RawLog>, FetchError> {
        let lookback = self.config.lookback.blocks()?;
        self.fetch(filter, current_block, lookback, self.config.max_chunk_width)
            .await
    }

    /// Ask the provider for the current head, then scan the configured
    /// lookback window behind it.
    ///
    /// Failing to read the head is fatal: there is no window to scan.
    pub async fn fetch_recent(&self, filter: &LogFilter) -> Result<FetchReport<RawLog>, FetchError> {
        let head = self.provider.block_number().await.map_err(|e| {
            warn!(error = %e, "failed to read current block number");
            FetchError::Rpc(e.to_string())
        })?;
        self.fetch_with_config(filter, head).await
    }

    /// Scan an explicit block range with the configured chunk width.
    pub async fn fetch_range(
        &self,
        filter: &LogFilter,
        range: BlockRange,
    ) -> Result<FetchReport<RawLog>, FetchError> {
        self.scan(filter, range, self.config.max_chunk_width).await
    }

    async fn scan(
        &self,
        filter: &LogFilter,
        range: BlockRange,
        max_chunk_width: u64,
    ) -> Result<FetchReport<RawLog>, FetchError> {
        let chunks = ChunkIter::new(range, max_chunk_width)?;
        let total = chunks.total();
        let started_at = Utc::now();

        info!(
            from = range.start,
            to = range.end,
            chunks = total,
            max_chunk_width,
            concurrency = self.config.concurrency,
            "starting chunked log scan"
        );

        // `buffered` keeps outcomes in chunk order even when several chunks
        // are in flight.
        let outcomes: Vec<ChunkOutcome<RawLog>> = stream::iter(chunks.enumerate())
            .map(|(index, chunk)| self.fetch_chunk(filter, index, total, chunk))
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let report = FetchReport::new(range, outcomes, started_at);

        if report.is_complete() {
            info!(
                from = range.start,
                to = range.end,
                logs = report.log_count(),
                chunks = report.chunks.len(),
                elapsed_ms = report.elapsed_ms(),
                "chunked log scan complete"
            );
        } else {
            warn!(
                from = range.start,
                to = range.end,
                logs = report.log_count(),
                failed = report.failed(),
                succeeded = report.succeeded(),
                elapsed_ms = report.elapsed_ms(),
                "chunked log scan finished with failed chunks; result is partial"
            );
        }

        Ok(report)
    }

    async fn fetch_chunk(
        &self,
        filter: &LogFilter,
        index: usize,
        total: u64,
        chunk: BlockRange,
    ) -> ChunkOutcome<RawLog> {
        debug!(
            chunk = index + 1,
            total,
            from = chunk.start,
            to = chunk.end,
            "querying chunk"
        );

        let timeout = self.config.chunk_timeout();
        let query = self.provider.query_logs(filter, chunk.start, chunk.end);

        let result = match tokio::time::timeout(timeout, query).await {
            Ok(Ok(mut logs)) => {
                logs.sort_by_key(RawLog::position);
                debug!(
                    chunk = index + 1,
                    from = chunk.start,
                    to = chunk.end,
                    logs = logs.len(),
                    "chunk complete"
                );
                Ok(logs)
            }
            Ok(Err(e)) => {
                warn!(
                    chunk = index + 1,
                    from = chunk.start,
                    to = chunk.end,
                    error = %e,
                    "chunk query failed, continuing"
                );
                Err(ChunkError::Provider(e.to_string()))
            }
            Err(_) => {
                let ms = self.config.chunk_timeout_ms;
                warn!(
                    chunk = index + 1,
                    from = chunk.start,
                    to = chunk.end,
                    timeout_ms = ms,
                    "chunk query timed out, continuing"
                );
                Err(ChunkError::Timeout { ms })
            }
        };

        ChunkOutcome {
            index,
            range: chunk,
            result,
        }
    }
}

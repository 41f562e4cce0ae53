//! Per-chunk outcomes and the aggregated fetch report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ChunkError;
use crate::types::BlockRange;

/// Result of querying one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkOutcome<L> {
    /// Position of the chunk in the scan, 0-based, ascending by block.
    pub index: usize,
    pub range: BlockRange,
    pub result: Result<Vec<L>, ChunkError>,
}

impl<L> ChunkOutcome<L> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Number of records retrieved (0 for a failed chunk).
    pub fn log_count(&self) -> usize {
        self.result.as_ref().map_or(0, Vec::len)
    }
}

/// Outcome of a whole scan.
///
/// `logs()` is the best-effort result: the concatenation of every successful
/// chunk in ascending block order. Use `is_complete()` / `failed_chunks()`
/// when completeness matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchReport<L> {
    /// The full window that was scanned.
    pub range: BlockRange,
    /// One entry per chunk, ordered by `index`.
    pub chunks: Vec<ChunkOutcome<L>>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl<L> FetchReport<L> {
    /// Assemble a report, putting outcomes back into chunk order.
    pub fn new(
        range: BlockRange,
        mut chunks: Vec<ChunkOutcome<L>>,
        started_at: DateTime<Utc>,
    ) -> Self {
        chunks.sort_by_key(|c| c.index);
        Self {
            range,
            chunks,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// All retrieved records, in chunk order.
    pub fn logs(&self) -> impl Iterator<Item = &L> {
        self.chunks
            .iter()
            .filter_map(|c| c.result.as_ref().ok())
            .flatten()
    }

    /// Consume the report, keeping only the records.
    pub fn into_logs(self) -> Vec<L> {
        self.chunks
            .into_iter()
            .filter_map(|c| c.result.ok())
            .flatten()
            .collect()
    }

    pub fn log_count(&self) -> usize {
        self.chunks.iter().map(ChunkOutcome::log_count).sum()
    }

    /// Chunks whose query failed, with the reason.
    pub fn failed_chunks(&self) -> impl Iterator<Item = (BlockRange, &ChunkError)> {
        self.chunks
            .iter()
            .filter_map(|c| c.result.as_ref().err().map(|e| (c.range, e)))
    }

    pub fn succeeded(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.chunks.len() - self.succeeded()
    }

    /// `true` when every chunk was retrieved.
    pub fn is_complete(&self) -> bool {
        self.chunks.iter().all(ChunkOutcome::is_ok)
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

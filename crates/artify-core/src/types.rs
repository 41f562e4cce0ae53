//! Shared types for log retrieval.

use serde::{Deserialize, Serialize};

use crate::error::FetchError;

// ─── BlockRange ──────────────────────────────────────────────────────────────

/// A closed interval of block numbers, `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    pub start: u64,
    pub end: u64,
}

impl BlockRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: u64, end: u64) -> Result<Self, FetchError> {
        if start > end {
            return Err(FetchError::invalid_config(format!(
                "block range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// A range covering exactly one block.
    pub fn single(block: u64) -> Self {
        Self {
            start: block,
            end: block,
        }
    }

    /// Number of blocks in the range (both ends inclusive). An inverted
    /// range built by hand is empty.
    pub fn width(&self) -> u64 {
        self.end
            .checked_sub(self.start)
            .map_or(0, |span| span.saturating_add(1))
    }

    pub fn contains(&self, block: u64) -> bool {
        (self.start..=self.end).contains(&block)
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// ─── LogFilter ───────────────────────────────────────────────────────────────

/// Criteria for which logs a query should return.
///
/// Empty `addresses` / `topic0_values` match everything. `indexed[i]` pins
/// topic `i + 1` to an exact value when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    /// Only match logs emitted by these contract addresses.
    pub addresses: Vec<String>,
    /// Only match logs whose topic[0] (event signature hash) is one of these.
    pub topic0_values: Vec<String>,
    /// Exact-match constraints on topics 1..=3.
    pub indexed: [Option<String>; 3],
}

impl LogFilter {
    /// Create a filter for a single contract address.
    pub fn address(addr: impl Into<String>) -> Self {
        Self {
            addresses: vec![addr.into()],
            ..Default::default()
        }
    }

    /// Add a topic0 filter (event signature hash).
    pub fn topic0(mut self, topic: impl Into<String>) -> Self {
        self.topic0_values.push(topic.into());
        self
    }

    /// Pin indexed topic `position` (1, 2 or 3) to `value`.
    ///
    /// Positions outside `1..=3` are ignored.
    pub fn indexed_topic(mut self, position: usize, value: impl Into<String>) -> Self {
        if (1..=3).contains(&position) {
            self.indexed[position - 1] = Some(value.into());
        }
        self
    }

    /// Returns `true` if `address` matches this filter.
    pub fn matches_address(&self, address: &str) -> bool {
        self.addresses.is_empty()
            || self.addresses.iter().any(|a| a.eq_ignore_ascii_case(address))
    }

    /// Returns `true` if `topic0` matches this filter.
    pub fn matches_topic0(&self, topic0: &str) -> bool {
        self.topic0_values.is_empty()
            || self.topic0_values.iter().any(|t| t.eq_ignore_ascii_case(topic0))
    }

    /// Returns `true` if a log with this address and topics would be selected.
    pub fn matches(&self, address: &str, topics: &[String]) -> bool {
        if !self.matches_address(address) {
            return false;
        }
        if !self.topic0_values.is_empty() {
            match topics.first() {
                Some(t0) if self.matches_topic0(t0) => {}
                _ => return false,
            }
        }
        self.indexed.iter().enumerate().all(|(i, want)| match want {
            None => true,
            Some(want) => topics
                .get(i + 1)
                .is_some_and(|got| got.eq_ignore_ascii_case(want)),
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

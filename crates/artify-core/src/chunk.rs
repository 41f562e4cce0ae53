//! Splitting a block range into provider-sized chunks.

use tracing::debug;

use crate::error::FetchError;
use crate::types::BlockRange;

/// Compute the scan window `[max(0, current - lookback), current]`.
pub fn lookback_range(current_block: u64, lookback_blocks: u64) -> BlockRange {
    BlockRange {
        start: current_block.saturating_sub(lookback_blocks),
        end: current_block,
    }
}

/// Partition `range` into chunks no wider than `max_width`.
pub fn plan_chunks(range: BlockRange, max_width: u64) -> Result<Vec<BlockRange>, FetchError> {
    Ok(ChunkIter::new(range, max_width)?.collect())
}

/// Forward iterator over consecutive chunks of a block range, oldest first.
///
/// Chunks never overlap, leave no gaps, and are at most `max_width` wide.
/// The final chunk ends exactly at `range.end` and may be narrower.
#[derive(Debug, Clone)]
pub struct ChunkIter {
    current: u64,
    end: u64,
    width: u64,
    yielded: u64,
    total: u64,
}

impl ChunkIter {
    /// Fails with `InvalidConfig` when `max_width` is 0.
    pub fn new(range: BlockRange, max_width: u64) -> Result<Self, FetchError> {
        if max_width == 0 {
            return Err(FetchError::invalid_config(
                "max_chunk_width must be at least 1",
            ));
        }
        let total = if range.start > range.end {
            0
        } else {
            (range.end - range.start) / max_width + 1
        };
        Ok(Self {
            current: range.start,
            end: range.end,
            width: max_width,
            yielded: 0,
            total,
        })
    }

    /// Total number of chunks this iterator produces.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of chunks yielded so far.
    pub fn yielded(&self) -> u64 {
        self.yielded
    }
}

impl Iterator for ChunkIter {
    type Item = BlockRange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.yielded >= self.total {
            return None;
        }
        self.yielded += 1;
        if self.yielded % 10 == 0 {
            debug!(chunks = self.yielded, total = self.total, "chunk planning progress");
        }

        let start = self.current;
        let end = start.saturating_add(self.width - 1).min(self.end);
        self.current = end.saturating_add(1);

        Some(BlockRange { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.total - self.yielded) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(start: u64, end: u64, width: u64) -> Vec<(u64, u64)> {
        plan_chunks(BlockRange { start, end }, width)
            .unwrap()
            .into_iter()
            .map(|c| (c.start, c.end))
            .collect()
    }

    fn assert_partition(range: BlockRange, width: u64) {
        let plan = plan_chunks(range, width).unwrap();
        assert_eq!(plan.first().map(|c| c.start), Some(range.start));
        assert_eq!(plan.last().map(|c| c.end), Some(range.end));
        for c in &plan {
            assert!(c.start <= c.end);
            assert!(c.width() <= width, "{c} wider than {width}");
        }
        for pair in plan.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start, "gap or overlap");
        }
    }

    #[test]
    fn reference_example() {
        let range = lookback_range(120_000, 100_000);
        assert_eq!(
            chunks(range.start, range.end, 50_000),
            vec![(20_000, 69_999), (70_000, 119_999), (120_000, 120_000)]
        );
    }

    #[test]
    fn lookback_clamps_to_genesis() {
        let range = lookback_range(1_000, 1_296_000);
        assert_eq!(range, BlockRange { start: 0, end: 1_000 });
        assert_eq!(chunks(range.start, range.end, 50_000), vec![(0, 1_000)]);
    }

    #[test]
    fn exact_boundary() {
        assert_eq!(chunks(100, 199, 50), vec![(100, 149), (150, 199)]);
    }

    #[test]
    fn single_block_range() {
        assert_eq!(chunks(0, 0, 50_000), vec![(0, 0)]);
    }

    #[test]
    fn width_one_yields_every_block() {
        assert_eq!(chunks(5, 8, 1), vec![(5, 5), (6, 6), (7, 7), (8, 8)]);
    }

    #[test]
    fn zero_width_rejected() {
        let err = ChunkIter::new(BlockRange::single(1), 0).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn total_matches_yielded() {
        let mut it = ChunkIter::new(BlockRange { start: 0, end: 1_296_000 }, 50_000).unwrap();
        assert_eq!(it.total(), 26);
        assert_eq!(it.size_hint(), (26, Some(26)));
        let n = it.by_ref().count();
        assert_eq!(n, 26);
        assert_eq!(it.yielded(), 26);
        assert!(it.next().is_none());
    }

    #[test]
    fn range_ending_at_u64_max() {
        let plan = chunks(u64::MAX - 4, u64::MAX, 2);
        assert_eq!(
            plan,
            vec![
                (u64::MAX - 4, u64::MAX - 3),
                (u64::MAX - 2, u64::MAX - 1),
                (u64::MAX, u64::MAX)
            ]
        );
    }

    #[test]
    fn partitions_hold_across_shapes() {
        for current in [0u64, 1, 49_999, 50_000, 120_000, 1_296_001, 9_999_999] {
            for lookback in [0u64, 1, 100_000, 1_296_000] {
                for width in [1u64, 7, 50_000, 2_000_000] {
                    if width == 1 && current > 200_000 && lookback > 200_000 {
                        continue;
                    }
                    assert_partition(lookback_range(current, lookback), width);
                }
            }
        }
    }
}

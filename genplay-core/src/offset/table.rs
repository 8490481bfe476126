use serde::{Deserialize, Serialize};

use super::record::OffsetRecord;
use crate::types::GenomicPos;

/// Finalized, read-only offset table of one allele on one chromosome.
///
/// Records are sorted by genome position; lookups are binary searches.
/// The table is never mutated after construction, so it can be shared
/// between threads freely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable {
    records: Box<[OffsetRecord]>,
}

impl OffsetTable {
    /// Table with no variants; translates every position to itself
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from already accumulated records (e.g. restored from a
    /// saved project). Records are sorted by genome position.
    pub fn from_records(mut records: Vec<OffsetRecord>) -> Self {
        records.sort_by_key(|r| r.genome_position);
        Self {
            records: records.into_boxed_slice(),
        }
    }

    pub(crate) fn from_sorted(records: Vec<OffsetRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].genome_position < w[1].genome_position));
        Self {
            records: records.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OffsetRecord] {
        &self.records
    }

    pub fn last_genome_position(&self) -> Option<GenomicPos> {
        self.records.last().map(|r| r.genome_position)
    }

    /// Record governing `genome_position`: the last one at or before it
    pub fn record_at(&self, genome_position: GenomicPos) -> Option<&OffsetRecord> {
        let idx = self
            .records
            .partition_point(|r| r.genome_position <= genome_position);
        idx.checked_sub(1).map(|i| &self.records[i])
    }

    /// Translate a native position into meta-genome coordinates
    pub fn meta_genome_position(&self, genome_position: GenomicPos) -> GenomicPos {
        match self.record_at(genome_position) {
            Some(record) => genome_position + record.extra_offset,
            None => genome_position,
        }
    }

    /// Translate a meta-genome position back into native coordinates.
    ///
    /// Meta positions inside a segment that has no native counterpart
    /// resolve to the last native base before that segment.
    ///
    /// A deletion of `d` bases at native position `g` gives the meta
    /// positions of `[g - d, g)` two native owners: the bases just before
    /// the deletion and the `d` bases from `g` on. Those meta positions
    /// resolve to the native side after the deletion, so a round trip from
    /// `[g - d, g)` lands `d` bases further and is exact everywhere else.
    /// The search assumes meta positions grow with genome positions, which
    /// holds for every insertion chain and for deletions shorter than the
    /// distance to the previous breakpoint.
    pub fn genome_position(&self, meta_genome_position: GenomicPos) -> GenomicPos {
        let idx = self
            .records
            .partition_point(|r| r.meta_genome_position <= meta_genome_position);

        let extra_offset = idx
            .checked_sub(1)
            .map(|i| self.records[i].extra_offset)
            .unwrap_or(0);
        let genome_position = meta_genome_position - extra_offset;

        match self.records.get(idx) {
            Some(next) if genome_position >= next.genome_position => next.genome_position - 1,
            _ => genome_position,
        }
    }
}

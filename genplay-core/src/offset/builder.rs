use super::record::{OffsetRecord, PendingOffset};
use super::table::OffsetTable;
use crate::types::GenomicPos;

/// Import-phase side of an offset table.
///
/// Variants are appended in whatever order the importer sees them. Nothing
/// can be queried until [`OffsetTableBuilder::finalize`] turns the builder
/// into an [`OffsetTable`].
#[derive(Debug, Clone, Default)]
pub struct OffsetTableBuilder {
    pending: Vec<PendingOffset>,
    sorted: bool,
}

impl OffsetTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            sorted: false,
        }
    }

    /// Record a variant: `length_delta > 0` for insertions, `< 0` for deletions
    pub fn add_offset(&mut self, genome_position: GenomicPos, length_delta: GenomicPos) {
        self.pending.push(PendingOffset {
            genome_position,
            length_delta,
        });
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Stable ascending sort by genome position
    pub fn sort(&mut self) {
        if !self.sorted {
            self.pending.sort_by_key(|p| p.genome_position);
            self.sorted = true;
        }
    }

    /// Merge variants sharing a position, drop those with no net length
    /// change, and release spare capacity. Sorts first if needed.
    pub fn compact(&mut self) {
        self.sort();

        let mut compacted: Vec<PendingOffset> = Vec::with_capacity(self.pending.len());
        for offset in self.pending.drain(..) {
            match compacted.last_mut() {
                Some(last) if last.genome_position == offset.genome_position => {
                    last.length_delta += offset.length_delta;
                }
                _ => compacted.push(offset),
            }
        }
        compacted.retain(|p| p.length_delta != 0);
        compacted.shrink_to_fit();

        self.pending = compacted;
    }

    /// Sort, compact and accumulate the offsets into a queryable table
    pub fn finalize(mut self) -> OffsetTable {
        self.compact();

        let mut extra_offset = 0;
        let records: Vec<OffsetRecord> = self
            .pending
            .iter()
            .map(|p| {
                extra_offset += p.length_delta;
                OffsetRecord::new(p.genome_position, extra_offset)
            })
            .collect();

        OffsetTable::from_sorted(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_accumulates_offsets() {
        let mut builder = OffsetTableBuilder::new();
        builder.add_offset(500, -3);
        builder.add_offset(200, 5);
        builder.add_offset(900, 10);

        let table = builder.finalize();
        let extras: Vec<_> = table.records().iter().map(|r| r.extra_offset).collect();
        assert_eq!(extras, vec![5, 2, 12]);
        assert_eq!(table.records()[2].meta_genome_position, 912);
    }

    #[test]
    fn test_compact_merges_and_drops() {
        let mut builder = OffsetTableBuilder::new();
        builder.add_offset(100, 0);
        builder.add_offset(300, 4);
        builder.add_offset(300, -1);
        builder.add_offset(400, 2);
        builder.add_offset(400, -2);
        builder.compact();

        assert_eq!(builder.len(), 1);
        let table = builder.finalize();
        assert_eq!(table.records(), &[OffsetRecord::new(300, 3)]);
    }

    #[test]
    fn test_insertion_table_example() {
        let mut builder = OffsetTableBuilder::new();
        builder.add_offset(100, 0);
        builder.add_offset(200, 5);
        let table = builder.finalize();

        assert_eq!(table.meta_genome_position(150), 150);
        assert_eq!(table.meta_genome_position(250), 255);
        assert_eq!(table.genome_position(255), 250);
    }

    #[test]
    fn test_empty_builder() {
        let builder = OffsetTableBuilder::with_capacity(16);
        assert!(builder.is_empty());
        assert!(builder.finalize().is_empty());
    }
}

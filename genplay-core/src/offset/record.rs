use serde::{Deserialize, Serialize};

use crate::types::GenomicPos;

/// Breakpoint entry of an offset table.
///
/// `extra_offset` is the net length delta of every variant up to and
/// including this one, so `meta_genome_position == genome_position + extra_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetRecord {
    pub genome_position: GenomicPos,
    pub meta_genome_position: GenomicPos,
    pub extra_offset: GenomicPos,
}

impl OffsetRecord {
    pub fn new(genome_position: GenomicPos, extra_offset: GenomicPos) -> Self {
        Self {
            genome_position,
            meta_genome_position: genome_position + extra_offset,
            extra_offset,
        }
    }
}

/// Raw variant as collected during import, before offsets are accumulated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingOffset {
    pub genome_position: GenomicPos,
    pub length_delta: GenomicPos,
}

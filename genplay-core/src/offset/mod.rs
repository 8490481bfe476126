//! Offset tables mapping native genome positions onto the meta-genome
//!
//! A table is built in two phases: [`OffsetTableBuilder`] collects variants
//! during import, and `finalize()` produces the immutable [`OffsetTable`]
//! used for translation.

pub mod builder;
pub mod record;
pub mod table;

pub use builder::OffsetTableBuilder;
pub use record::OffsetRecord;
pub use table::OffsetTable;

//! GenPlay Core Library
//!
//! Offset tables and coordinate translation for multi-genome projects, and
//! the parallel chromosome-window operations computed over scored tracks.

pub mod types;
pub mod offset;
pub mod genome;
pub mod pool;
pub mod window;
pub mod operation;
pub mod io;

// Re-export commonly used types and functions
pub use types::{AlleleType, GenomicPos, Score, ScoredWindow, INVALID_POSITION, META_GENOME_NAME};
pub use offset::{OffsetRecord, OffsetTable, OffsetTableBuilder};
pub use genome::{Genome, MultiGenome, MultiGenomeBuilder, TranslationError, TranslationResult};
pub use pool::{CancellationToken, OperationPool, PoolConfig, Progress, Task, TaskContext};
pub use window::{ChromosomeWindows, WindowList};
pub use operation::{
    ChromosomeSelection, OperationError, OperationResult, ScalarOperation, TransformOperation,
    TwoTrackMethod, TwoTrackOperation,
};

/// Version information for the GenPlay core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Window lists: per-chromosome ordered collections of scored windows

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::types::{Score, ScoredWindow};

/// Scored windows of one chromosome, ordered by start.
///
/// The fields are only reachable through [`ChromosomeWindows::new`] and
/// deserialization, both of which sort the windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UnsortedWindows")]
pub struct ChromosomeWindows {
    name: String,
    windows: Vec<ScoredWindow>,
}

/// Serialized form, sorted on the way in
#[derive(Deserialize)]
struct UnsortedWindows {
    name: String,
    windows: Vec<ScoredWindow>,
}

impl From<UnsortedWindows> for ChromosomeWindows {
    fn from(raw: UnsortedWindows) -> Self {
        ChromosomeWindows::new(raw.name, raw.windows)
    }
}

impl ChromosomeWindows {
    pub fn new(name: impl Into<String>, mut windows: Vec<ScoredWindow>) -> Self {
        windows.sort_by_key(|w| w.start);
        Self {
            name: name.into(),
            windows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn windows(&self) -> &[ScoredWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Genome-wide extrema memoized once computed over every chromosome
#[derive(Debug, Clone, Default)]
struct ExtremaCache {
    min: OnceLock<Option<Score>>,
    max: OnceLock<Option<Score>>,
}

/// One list of scored windows per chromosome, in chromosome order.
///
/// Operations never modify a list in place; they build a new one. This
/// makes it safe to read the same list from several operations at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowList {
    chromosomes: Vec<ChromosomeWindows>,
    #[serde(skip)]
    cache: ExtremaCache,
}

impl PartialEq for WindowList {
    fn eq(&self, other: &Self) -> bool {
        self.chromosomes == other.chromosomes
    }
}

impl WindowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_chromosomes(chromosomes: Vec<ChromosomeWindows>) -> Self {
        Self {
            chromosomes,
            cache: ExtremaCache::default(),
        }
    }

    /// Append a chromosome; windows are sorted by start
    pub fn push_chromosome(&mut self, name: impl Into<String>, windows: Vec<ScoredWindow>) {
        self.chromosomes.push(ChromosomeWindows::new(name, windows));
        self.cache = ExtremaCache::default();
    }

    pub fn chromosome_count(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn chromosome(&self, index: usize) -> Option<&ChromosomeWindows> {
        self.chromosomes.get(index)
    }

    pub fn chromosome_by_name(&self, name: &str) -> Option<&ChromosomeWindows> {
        self.chromosomes.iter().find(|c| c.name == name)
    }

    pub fn chromosomes(&self) -> &[ChromosomeWindows] {
        &self.chromosomes
    }

    pub fn chromosome_names(&self) -> impl Iterator<Item = &str> {
        self.chromosomes.iter().map(|c| c.name.as_str())
    }

    /// Windows of chromosome `index`, empty when out of range
    pub fn windows(&self, index: usize) -> &[ScoredWindow] {
        self.chromosomes
            .get(index)
            .map(|c| c.windows.as_slice())
            .unwrap_or(&[])
    }

    pub fn window_count(&self) -> usize {
        self.chromosomes.iter().map(ChromosomeWindows::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.window_count() == 0
    }

    /// Same chromosome names in the same order
    pub fn has_same_chromosomes(&self, other: &WindowList) -> bool {
        self.chromosome_names().eq(other.chromosome_names())
    }

    /// Genome-wide minimum if it has already been computed
    pub fn cached_min(&self) -> Option<Option<Score>> {
        self.cache.min.get().copied()
    }

    /// Genome-wide maximum if it has already been computed
    pub fn cached_max(&self) -> Option<Option<Score>> {
        self.cache.max.get().copied()
    }

    pub(crate) fn min_cell(&self) -> &OnceLock<Option<Score>> {
        &self.cache.min
    }

    pub(crate) fn max_cell(&self) -> &OnceLock<Option<Score>> {
        &self.cache.max
    }
}

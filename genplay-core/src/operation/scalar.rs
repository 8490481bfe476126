//! Reductions of a window list to a single number

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{run_per_chromosome, OperationResult};
use crate::pool::{CancellationToken, OperationPool, TaskContext};
use crate::types::{Score, ScoredWindow};
use crate::window::WindowList;

/// Chromosomes taking part in a scalar operation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChromosomeSelection {
    #[default]
    All,
    Named(BTreeSet<String>),
}

impl ChromosomeSelection {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ChromosomeSelection::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, chromosome: &str) -> bool {
        match self {
            ChromosomeSelection::All => true,
            ChromosomeSelection::Named(names) => names.contains(chromosome),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ChromosomeSelection::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarOperation {
    Min,
    Max,
    Sum,
    /// Length-weighted mean of the non-zero windows
    Average,
    /// Length-weighted population standard deviation of the non-zero windows
    StandardDeviation,
    NonZeroWindowCount,
    NonZeroBaseCount,
}

/// Per-chromosome accumulator, merged in chromosome order
#[derive(Debug, Clone, Copy, Default)]
struct Partial {
    min: Option<Score>,
    max: Option<Score>,
    sum: Score,
    weighted_sum: Score,
    weighted_squares: Score,
    windows: u64,
    bases: i64,
}

impl Partial {
    fn scan(ctx: &TaskContext<'_>, windows: &[ScoredWindow]) -> Self {
        let mut partial = Partial::default();
        for (i, window) in windows.iter().enumerate() {
            if ctx.checkpoint(i) {
                break;
            }
            if !window.has_data() {
                continue;
            }
            let score = window.score;
            let len = window.len();
            partial.min = Some(partial.min.map_or(score, |m| m.min(score)));
            partial.max = Some(partial.max.map_or(score, |m| m.max(score)));
            partial.sum += score;
            partial.weighted_sum += score * len as Score;
            partial.weighted_squares += score * score * len as Score;
            partial.windows += 1;
            partial.bases += len;
        }
        partial
    }

    fn merge(mut self, other: Partial) -> Self {
        self.min = match (self.min, other.min) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max = match (self.max, other.max) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self.sum += other.sum;
        self.weighted_sum += other.weighted_sum;
        self.weighted_squares += other.weighted_squares;
        self.windows += other.windows;
        self.bases += other.bases;
        self
    }

    fn average(&self) -> Score {
        if self.bases == 0 {
            0.0
        } else {
            self.weighted_sum / self.bases as Score
        }
    }

    fn standard_deviation(&self) -> Score {
        if self.bases == 0 {
            return 0.0;
        }
        let mean = self.average();
        let variance = self.weighted_squares / self.bases as Score - mean * mean;
        variance.max(0.0).sqrt()
    }
}

impl ScalarOperation {
    /// Number of windows the operation will visit, for progress display
    pub fn step_count(&self, list: &WindowList, selection: &ChromosomeSelection) -> usize {
        list.chromosomes()
            .iter()
            .filter(|c| selection.includes(c.name()))
            .map(|c| c.len())
            .sum()
    }

    /// Reduce the selected chromosomes of `list`.
    ///
    /// A selection without any non-zero window yields `0.0`, the score that
    /// already stands for "no data". `None` means the batch was stopped.
    /// Genome-wide min and max are memoized on the list.
    pub fn compute(
        &self,
        list: &WindowList,
        selection: &ChromosomeSelection,
        pool: &OperationPool,
        token: &CancellationToken,
    ) -> OperationResult<Option<Score>> {
        if selection.is_all() {
            let cached = match self {
                ScalarOperation::Min => list.cached_min(),
                ScalarOperation::Max => list.cached_max(),
                _ => None,
            };
            if let Some(value) = cached {
                log::trace!("Returning memoized {}", self);
                return Ok(Some(value.unwrap_or(0.0)));
            }
        }

        log::debug!("Computing {} over {} chromosomes", self, list.chromosome_count());
        let partials = run_per_chromosome(pool, token, list, |ctx, windows| {
            let selected = list
                .chromosome(ctx.chromosome_index())
                .map_or(false, |c| selection.includes(c.name()));
            Ok(if selected {
                Partial::scan(ctx, windows)
            } else {
                Partial::default()
            })
        })?;

        let Some(partials) = partials else {
            return Ok(None);
        };
        let total = partials.into_iter().fold(Partial::default(), Partial::merge);

        if selection.is_all() {
            // a concurrent run may already have stored the same value
            let _ = list.min_cell().set(total.min);
            let _ = list.max_cell().set(total.max);
        }

        let value = match self {
            ScalarOperation::Min => total.min.unwrap_or(0.0),
            ScalarOperation::Max => total.max.unwrap_or(0.0),
            ScalarOperation::Sum => total.sum,
            ScalarOperation::Average => total.average(),
            ScalarOperation::StandardDeviation => total.standard_deviation(),
            ScalarOperation::NonZeroWindowCount => total.windows as Score,
            ScalarOperation::NonZeroBaseCount => total.bases as Score,
        };
        Ok(Some(value))
    }
}

impl fmt::Display for ScalarOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarOperation::Min => "minimum",
            ScalarOperation::Max => "maximum",
            ScalarOperation::Sum => "sum",
            ScalarOperation::Average => "average",
            ScalarOperation::StandardDeviation => "standard deviation",
            ScalarOperation::NonZeroWindowCount => "non-zero window count",
            ScalarOperation::NonZeroBaseCount => "non-zero base count",
        };
        f.write_str(name)
    }
}

impl FromStr for ScalarOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "min" | "minimum" => Ok(ScalarOperation::Min),
            "max" | "maximum" => Ok(ScalarOperation::Max),
            "sum" => Ok(ScalarOperation::Sum),
            "average" | "avg" | "mean" => Ok(ScalarOperation::Average),
            "stddev" | "sd" => Ok(ScalarOperation::StandardDeviation),
            "windows" => Ok(ScalarOperation::NonZeroWindowCount),
            "bases" => Ok(ScalarOperation::NonZeroBaseCount),
            other => Err(format!("unknown scalar operation: {}", other)),
        }
    }
}

//! Island finding: runs of enriched windows tolerating short gaps

use serde::{Deserialize, Serialize};

use super::{OperationError, OperationResult};
use crate::pool::TaskContext;
use crate::types::{GenomicPos, Score, ScoredWindow};

/// What an island search emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IslandResult {
    /// The eligible windows of every kept island, scores unchanged
    #[default]
    WindowScores,
    /// One window per island scored with the sum of its window scores
    IslandSum,
    /// One window per island scored with its length-weighted mean score
    IslandAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IslandParams {
    /// Minimum score of a window to join an island
    pub threshold: Score,
    /// Largest number of bases allowed between two windows of one island
    pub max_gap: GenomicPos,
    /// Islands spanning fewer bases are discarded
    pub min_island_length: GenomicPos,
    #[serde(default)]
    pub result: IslandResult,
}

impl Default for IslandParams {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            max_gap: 0,
            min_island_length: 1,
            result: IslandResult::WindowScores,
        }
    }
}

/// An island under construction: windows `first..=last` of the chromosome
struct Island {
    first: usize,
    last: usize,
    start: GenomicPos,
    stop: GenomicPos,
    sum: Score,
    weighted_sum: Score,
    covered: GenomicPos,
}

impl Island {
    fn open(index: usize, window: &ScoredWindow) -> Self {
        Self {
            first: index,
            last: index,
            start: window.start,
            stop: window.stop,
            sum: window.score,
            weighted_sum: window.score * window.len() as Score,
            covered: window.len(),
        }
    }

    fn extend(&mut self, index: usize, window: &ScoredWindow) {
        self.last = index;
        self.stop = self.stop.max(window.stop);
        self.sum += window.score;
        self.weighted_sum += window.score * window.len() as Score;
        self.covered += window.len();
    }

    fn len(&self) -> GenomicPos {
        self.stop - self.start
    }
}

impl IslandParams {
    pub fn validate(&self) -> OperationResult<()> {
        if !self.threshold.is_finite() {
            return Err(OperationError::InvalidParameter(format!(
                "island threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.max_gap < 0 {
            return Err(OperationError::InvalidParameter(format!(
                "maximum gap cannot be negative, got {}",
                self.max_gap
            )));
        }
        if self.min_island_length < 0 {
            return Err(OperationError::InvalidParameter(format!(
                "minimum island length cannot be negative, got {}",
                self.min_island_length
            )));
        }
        Ok(())
    }

    fn is_eligible(&self, window: &ScoredWindow) -> bool {
        window.has_data() && window.score >= self.threshold
    }

    pub(crate) fn apply(&self, ctx: &TaskContext<'_>, windows: &[ScoredWindow]) -> Vec<ScoredWindow> {
        let mut output = Vec::new();
        let mut current: Option<Island> = None;

        for (i, window) in windows.iter().enumerate() {
            if ctx.checkpoint(i) {
                return output;
            }
            if !self.is_eligible(window) {
                continue;
            }
            match current.as_mut() {
                Some(island) if window.start - island.stop <= self.max_gap => {
                    island.extend(i, window);
                }
                _ => {
                    if let Some(island) = current.take() {
                        self.emit(&island, windows, &mut output);
                    }
                    current = Some(Island::open(i, window));
                }
            }
        }

        if let Some(island) = current {
            self.emit(&island, windows, &mut output);
        }
        output
    }

    fn emit(&self, island: &Island, windows: &[ScoredWindow], output: &mut Vec<ScoredWindow>) {
        if island.len() < self.min_island_length {
            return;
        }
        match self.result {
            IslandResult::WindowScores => output.extend(
                windows[island.first..=island.last]
                    .iter()
                    .filter(|w| self.is_eligible(w))
                    .copied(),
            ),
            IslandResult::IslandSum => {
                output.push(ScoredWindow::new(island.start, island.stop, island.sum));
            }
            IslandResult::IslandAverage => {
                let average = if island.covered > 0 {
                    island.weighted_sum / island.covered as Score
                } else {
                    island.sum / (island.last - island.first + 1) as Score
                };
                output.push(ScoredWindow::new(island.start, island.stop, average));
            }
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{OperationError, OperationResult};
use crate::pool::TaskContext;
use crate::types::{GenomicPos, Score, ScoredWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BinningMethod {
    /// Score integrated over the covered bases
    Sum,
    /// Length-weighted mean over the covered bases
    #[default]
    Average,
    /// Largest overlapping score
    Maximum,
}

/// Re-tile a chromosome into fixed-size bins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinningParams {
    pub bin_size: GenomicPos,
    #[serde(default)]
    pub method: BinningMethod,
}

#[derive(Default)]
struct Bin {
    weighted_sum: Score,
    covered: GenomicPos,
    maximum: Option<Score>,
}

impl Bin {
    fn add(&mut self, score: Score, overlap: GenomicPos) {
        self.weighted_sum += score * overlap as Score;
        self.covered += overlap;
        self.maximum = Some(self.maximum.map_or(score, |m| m.max(score)));
    }

    fn score(&self, method: BinningMethod) -> Score {
        match method {
            BinningMethod::Sum => self.weighted_sum,
            BinningMethod::Average if self.covered > 0 => self.weighted_sum / self.covered as Score,
            BinningMethod::Average => 0.0,
            BinningMethod::Maximum => self.maximum.unwrap_or(0.0),
        }
    }
}

impl BinningParams {
    pub fn new(bin_size: GenomicPos, method: BinningMethod) -> Self {
        Self { bin_size, method }
    }

    pub fn validate(&self) -> OperationResult<()> {
        if self.bin_size <= 0 {
            return Err(OperationError::InvalidParameter(format!(
                "bin size must be positive, got {}",
                self.bin_size
            )));
        }
        Ok(())
    }

    pub(crate) fn apply(&self, ctx: &TaskContext<'_>, windows: &[ScoredWindow]) -> Vec<ScoredWindow> {
        let size = self.bin_size;
        let mut bins: BTreeMap<GenomicPos, Bin> = BTreeMap::new();

        // one step per window and one per bin it touches
        let mut step = 0usize;
        'windows: for window in windows {
            if ctx.checkpoint(step) {
                break;
            }
            step += 1;
            if !window.has_data() || window.is_empty() {
                continue;
            }
            let first = window.start.div_euclid(size);
            let last = (window.stop - 1).div_euclid(size);
            for bin in first..=last {
                if ctx.checkpoint(step) {
                    break 'windows;
                }
                step += 1;
                let overlap = window.stop.min((bin + 1) * size) - window.start.max(bin * size);
                bins.entry(bin).or_default().add(window.score, overlap);
            }
        }

        bins.into_iter()
            .map(|(bin, acc)| ScoredWindow::new(bin * size, (bin + 1) * size, acc.score(self.method)))
            .filter(ScoredWindow::has_data)
            .collect()
    }
}

use serde::{Deserialize, Serialize};

use super::{OperationError, OperationResult};
use crate::pool::TaskContext;
use crate::types::{Score, ScoredWindow};

/// Quantity compared against the threshold bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterQuantity {
    #[default]
    Score,
    /// Score divided by window length
    ScorePerBase,
}

/// Keep windows whose quantity lies in `[low, high]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFilter {
    pub low: Score,
    pub high: Score,
    #[serde(default)]
    pub quantity: FilterQuantity,
}

impl ThresholdFilter {
    pub fn new(low: Score, high: Score) -> Self {
        Self {
            low,
            high,
            quantity: FilterQuantity::Score,
        }
    }

    pub fn per_base(mut self) -> Self {
        self.quantity = FilterQuantity::ScorePerBase;
        self
    }

    pub fn validate(&self) -> OperationResult<()> {
        if self.low.is_nan() || self.high.is_nan() {
            return Err(OperationError::InvalidParameter(
                "threshold bounds must be numbers".to_string(),
            ));
        }
        if self.low > self.high {
            return Err(OperationError::InvalidParameter(format!(
                "low threshold {} is above high threshold {}",
                self.low, self.high
            )));
        }
        Ok(())
    }

    fn quantity_of(&self, window: &ScoredWindow) -> Option<Score> {
        match self.quantity {
            FilterQuantity::Score => Some(window.score),
            FilterQuantity::ScorePerBase if window.is_empty() => None,
            FilterQuantity::ScorePerBase => Some(window.score / window.len() as Score),
        }
    }

    pub fn accepts(&self, window: &ScoredWindow) -> bool {
        self.quantity_of(window)
            .map_or(false, |q| q >= self.low && q <= self.high)
    }

    pub(crate) fn apply(&self, ctx: &TaskContext<'_>, windows: &[ScoredWindow]) -> Vec<ScoredWindow> {
        let mut kept = Vec::new();
        for (i, window) in windows.iter().enumerate() {
            if ctx.checkpoint(i) {
                break;
            }
            if self.accepts(window) {
                kept.push(*window);
            }
        }
        kept
    }
}

//! Window operations built on the chromosome-window pool
//!
//! Every operation splits its input into one task per chromosome, runs the
//! tasks on an [`OperationPool`] and stitches the partial results back
//! together. Operations are closed enums: [`ScalarOperation`] reduces a list
//! to one number, [`TransformOperation`] builds a new list from one list and
//! [`TwoTrackOperation`] combines two lists.

pub mod binning;
pub mod constant;
pub mod density;
pub mod filter;
pub mod islands;
pub mod scalar;
pub mod two_track;

pub use binning::{BinningMethod, BinningParams};
pub use constant::ArithmeticOp;
pub use filter::{FilterQuantity, ThresholdFilter};
pub use islands::{IslandParams, IslandResult};
pub use scalar::{ChromosomeSelection, ScalarOperation};
pub use two_track::{TwoTrackMethod, TwoTrackOperation};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::pool::{CancellationToken, OperationPool, Task, TaskContext};
use crate::types::{Score, ScoredWindow};
use crate::window::{ChromosomeWindows, WindowList};

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Window lists do not cover the same chromosomes: {0}")]
    MismatchedChromosomes(String),

    #[error("Operation pool error: {0}")]
    Pool(String),
}

pub type OperationResult<T> = Result<T, OperationError>;

/// Run `f` once per chromosome of `list` and collect the results in
/// chromosome order. `None` means the batch was stopped.
pub(crate) fn run_per_chromosome<R, F>(
    pool: &OperationPool,
    token: &CancellationToken,
    list: &WindowList,
    f: F,
) -> OperationResult<Option<Vec<R>>>
where
    R: Send,
    F: Fn(&TaskContext<'_>, &[ScoredWindow]) -> OperationResult<R> + Sync,
{
    let f = &f;
    let mut tasks: Vec<Task<'_, R>> = Vec::with_capacity(list.chromosome_count());
    for index in 0..list.chromosome_count() {
        let windows = list.windows(index);
        tasks.push(Box::new(move |ctx: &TaskContext<'_>| f(ctx, windows)));
    }

    pool.start_pool(tasks, token)
}

/// Like [`run_per_chromosome`] for operations producing a new window list
pub(crate) fn transform_per_chromosome<F>(
    pool: &OperationPool,
    token: &CancellationToken,
    list: &WindowList,
    f: F,
) -> OperationResult<Option<WindowList>>
where
    F: Fn(&TaskContext<'_>, &[ScoredWindow]) -> OperationResult<Vec<ScoredWindow>> + Sync,
{
    let results = match run_per_chromosome(pool, token, list, f)? {
        Some(results) => results,
        None => return Ok(None),
    };

    let chromosomes = list
        .chromosome_names()
        .zip(results)
        .map(|(name, windows)| ChromosomeWindows::new(name, windows))
        .collect();

    Ok(Some(WindowList::from_chromosomes(chromosomes)))
}

/// Operations turning one window list into another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransformOperation {
    /// Apply `score op value` to every window
    Constant { op: ArithmeticOp, value: Score },
    /// Keep windows whose quantity lies in an inclusive range
    Threshold(ThresholdFilter),
    /// Fraction of non-zero windows around each window
    Density { half_width: usize },
    Islands(IslandParams),
    Binning(BinningParams),
}

impl TransformOperation {
    pub fn validate(&self) -> OperationResult<()> {
        match self {
            TransformOperation::Constant { op, value } => constant::validate(*op, *value),
            TransformOperation::Threshold(filter) => filter.validate(),
            TransformOperation::Density { half_width } => density::validate(*half_width),
            TransformOperation::Islands(params) => params.validate(),
            TransformOperation::Binning(params) => params.validate(),
        }
    }

    /// Number of windows the operation will visit, for progress display
    pub fn step_count(&self, list: &WindowList) -> usize {
        list.window_count()
    }

    pub fn compute(
        &self,
        list: &WindowList,
        pool: &OperationPool,
        token: &CancellationToken,
    ) -> OperationResult<Option<WindowList>> {
        self.validate()?;
        log::debug!("Computing {} over {} windows", self, list.window_count());

        match self {
            TransformOperation::Constant { op, value } if op.is_identity(*value) => {
                log::debug!("Identity constant, returning a copy of the input");
                Ok(Some(WindowList::from_chromosomes(list.chromosomes().to_vec())))
            }
            TransformOperation::Constant { op, value } => {
                transform_per_chromosome(pool, token, list, |ctx, windows| {
                    Ok(constant::apply(*op, *value, ctx, windows))
                })
            }
            TransformOperation::Threshold(filter) => {
                transform_per_chromosome(pool, token, list, |ctx, windows| {
                    Ok(filter.apply(ctx, windows))
                })
            }
            TransformOperation::Density { half_width } => {
                transform_per_chromosome(pool, token, list, |ctx, windows| {
                    Ok(density::apply(*half_width, ctx, windows))
                })
            }
            TransformOperation::Islands(params) => {
                transform_per_chromosome(pool, token, list, |ctx, windows| {
                    Ok(params.apply(ctx, windows))
                })
            }
            TransformOperation::Binning(params) => {
                transform_per_chromosome(pool, token, list, |ctx, windows| {
                    Ok(params.apply(ctx, windows))
                })
            }
        }
    }
}

impl fmt::Display for TransformOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformOperation::Constant { op, value } => write!(f, "{} constant {}", op, value),
            TransformOperation::Threshold(filter) => {
                write!(f, "threshold filter [{}, {}] on {:?}", filter.low, filter.high, filter.quantity)
            }
            TransformOperation::Density { half_width } => write!(f, "density (half width {})", half_width),
            TransformOperation::Islands(params) => {
                write!(f, "island finder (threshold {}, max gap {})", params.threshold, params.max_gap)
            }
            TransformOperation::Binning(params) => {
                write!(f, "{:?} binning ({} bp)", params.method, params.bin_size)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WindowList {
        let mut list = WindowList::new();
        list.push_chromosome(
            "chr1",
            vec![ScoredWindow::new(0, 10, 1.0), ScoredWindow::new(10, 20, 4.0)],
        );
        list.push_chromosome("chr2", vec![ScoredWindow::new(0, 5, -2.0)]);
        list
    }

    #[test]
    fn test_identity_constant_is_deep_copy() {
        let list = sample();
        let op = TransformOperation::Constant { op: ArithmeticOp::Add, value: 0.0 };
        let copy = op
            .compute(&list, &OperationPool::sequential(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        assert_eq!(copy, list);
    }

    #[test]
    fn test_identity_ignores_stop() {
        let token = CancellationToken::new();
        token.cancel();
        let op = TransformOperation::Constant { op: ArithmeticOp::Multiply, value: 1.0 };
        assert!(op.compute(&sample(), &OperationPool::sequential(), &token).unwrap().is_some());
    }

    #[test]
    fn test_transform_keeps_chromosome_order() {
        let list = sample();
        let op = TransformOperation::Constant { op: ArithmeticOp::Multiply, value: 2.0 };
        let doubled = op
            .compute(&list, &OperationPool::sequential(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        let names: Vec<_> = doubled.chromosome_names().collect();
        assert_eq!(names, vec!["chr1", "chr2"]);
        assert_eq!(doubled.windows(0)[1].score, 8.0);
        assert_eq!(doubled.windows(1)[0].score, -4.0);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let op = TransformOperation::Constant { op: ArithmeticOp::Divide, value: 0.0 };
        let err = op
            .compute(&sample(), &OperationPool::sequential(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, OperationError::InvalidParameter(_)));
    }

    #[test]
    fn test_cancelled_transform_returns_none() {
        let token = CancellationToken::new();
        token.cancel();
        let op = TransformOperation::Density { half_width: 1 };
        assert!(op.compute(&sample(), &OperationPool::sequential(), &token).unwrap().is_none());
    }
}

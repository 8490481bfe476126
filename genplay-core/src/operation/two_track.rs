//! Arithmetic between two window lists
//!
//! Both lists are walked over the union of their window boundaries. Each
//! resulting sub-interval is scored from the window of each list covering
//! it, a gap in one list counting as a zero score.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{transform_per_chromosome, OperationError, OperationResult};
use crate::pool::{CancellationToken, OperationPool, TaskContext};
use crate::types::{GenomicPos, Score, ScoredWindow};
use crate::window::WindowList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TwoTrackMethod {
    Add,
    Subtract,
    Multiply,
    Divide,
    Average,
    Minimum,
    Maximum,
    /// Number of lists with data over the sub-interval
    OverlapCount,
}

impl TwoTrackMethod {
    /// Combined score, `None` when the result is undefined
    pub fn combine(self, first: Score, second: Score) -> Option<Score> {
        match self {
            TwoTrackMethod::Add => Some(first + second),
            TwoTrackMethod::Subtract => Some(first - second),
            TwoTrackMethod::Multiply => Some(first * second),
            TwoTrackMethod::Divide if second == 0.0 => None,
            TwoTrackMethod::Divide => Some(first / second),
            TwoTrackMethod::Average => Some((first + second) / 2.0),
            TwoTrackMethod::Minimum => Some(first.min(second)),
            TwoTrackMethod::Maximum => Some(first.max(second)),
            TwoTrackMethod::OverlapCount => {
                Some(f64::from(u8::from(first != 0.0) + u8::from(second != 0.0)))
            }
        }
    }
}

impl fmt::Display for TwoTrackMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TwoTrackMethod::Add => "addition",
            TwoTrackMethod::Subtract => "subtraction",
            TwoTrackMethod::Multiply => "multiplication",
            TwoTrackMethod::Divide => "division",
            TwoTrackMethod::Average => "average",
            TwoTrackMethod::Minimum => "minimum",
            TwoTrackMethod::Maximum => "maximum",
            TwoTrackMethod::OverlapCount => "overlap count",
        };
        f.write_str(name)
    }
}

impl FromStr for TwoTrackMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(TwoTrackMethod::Add),
            "subtract" | "sub" => Ok(TwoTrackMethod::Subtract),
            "multiply" | "mul" => Ok(TwoTrackMethod::Multiply),
            "divide" | "div" => Ok(TwoTrackMethod::Divide),
            "average" | "avg" => Ok(TwoTrackMethod::Average),
            "min" | "minimum" => Ok(TwoTrackMethod::Minimum),
            "max" | "maximum" => Ok(TwoTrackMethod::Maximum),
            "overlap" | "count" => Ok(TwoTrackMethod::OverlapCount),
            other => Err(format!("unknown two-track method: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoTrackOperation {
    pub method: TwoTrackMethod,
}

/// Cursor over one sorted window list
struct Cursor<'a> {
    windows: &'a [ScoredWindow],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(windows: &'a [ScoredWindow]) -> Self {
        Self { windows, index: 0 }
    }

    /// Score of the window covering `[start, _)`, `None` in a gap
    fn score_at(&mut self, start: GenomicPos) -> Option<Score> {
        while self.index < self.windows.len() && self.windows[self.index].stop <= start {
            self.index += 1;
        }
        self.windows
            .get(self.index)
            .filter(|w| w.start <= start)
            .map(|w| w.score)
    }
}

impl TwoTrackOperation {
    pub fn new(method: TwoTrackMethod) -> Self {
        Self { method }
    }

    /// Number of windows the operation will visit, for progress display
    pub fn step_count(&self, first: &WindowList, second: &WindowList) -> usize {
        first.window_count() + second.window_count()
    }

    pub fn compute(
        &self,
        first: &WindowList,
        second: &WindowList,
        pool: &OperationPool,
        token: &CancellationToken,
    ) -> OperationResult<Option<WindowList>> {
        if !first.has_same_chromosomes(second) {
            let first_names: Vec<_> = first.chromosome_names().collect();
            let second_names: Vec<_> = second.chromosome_names().collect();
            return Err(OperationError::MismatchedChromosomes(format!(
                "{:?} vs {:?}",
                first_names, second_names
            )));
        }

        log::debug!(
            "Computing two-track {} over {} + {} windows",
            self.method,
            first.window_count(),
            second.window_count()
        );

        transform_per_chromosome(pool, token, first, |ctx, windows| {
            Ok(self.combine_chromosome(ctx, windows, second.windows(ctx.chromosome_index())))
        })
    }

    fn combine_chromosome(
        &self,
        ctx: &TaskContext<'_>,
        first: &[ScoredWindow],
        second: &[ScoredWindow],
    ) -> Vec<ScoredWindow> {
        let mut boundaries: Vec<GenomicPos> = first
            .iter()
            .chain(second)
            .flat_map(|w| [w.start, w.stop])
            .collect();
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut first = Cursor::new(first);
        let mut second = Cursor::new(second);
        let mut result: Vec<ScoredWindow> = Vec::new();

        for (i, pair) in boundaries.windows(2).enumerate() {
            if ctx.checkpoint(i) {
                break;
            }
            let (start, stop) = (pair[0], pair[1]);
            let a = first.score_at(start);
            let b = second.score_at(start);
            if a.is_none() && b.is_none() {
                continue;
            }

            let score = match self.method.combine(a.unwrap_or(0.0), b.unwrap_or(0.0)) {
                Some(score) if score != 0.0 => score,
                _ => continue,
            };

            match result.last_mut() {
                Some(last) if last.stop == start && last.score == score => last.stop = stop,
                _ => result.push(ScoredWindow::new(start, stop, score)),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(windows: Vec<ScoredWindow>) -> WindowList {
        let mut list = WindowList::new();
        list.push_chromosome("chr1", windows);
        list
    }

    fn run(method: TwoTrackMethod, a: Vec<ScoredWindow>, b: Vec<ScoredWindow>) -> Vec<ScoredWindow> {
        TwoTrackOperation::new(method)
            .compute(&list(a), &list(b), &OperationPool::sequential(), &CancellationToken::new())
            .unwrap()
            .unwrap()
            .windows(0)
            .to_vec()
    }

    #[test]
    fn test_addition_over_partial_overlap() {
        let result = run(
            TwoTrackMethod::Add,
            vec![ScoredWindow::new(0, 10, 2.0)],
            vec![ScoredWindow::new(5, 15, 3.0)],
        );
        assert_eq!(
            result,
            vec![
                ScoredWindow::new(0, 5, 2.0),
                ScoredWindow::new(5, 10, 5.0),
                ScoredWindow::new(10, 15, 3.0),
            ]
        );
    }

    #[test]
    fn test_equal_scores_are_coalesced() {
        let result = run(
            TwoTrackMethod::Maximum,
            vec![ScoredWindow::new(0, 10, 4.0)],
            vec![ScoredWindow::new(5, 15, 1.0), ScoredWindow::new(15, 20, 4.0)],
        );
        assert_eq!(result, vec![ScoredWindow::new(0, 10, 4.0), ScoredWindow::new(10, 15, 1.0), ScoredWindow::new(15, 20, 4.0)]);
    }

    #[test]
    fn test_uncovered_gaps_are_skipped() {
        let result = run(
            TwoTrackMethod::Add,
            vec![ScoredWindow::new(0, 5, 1.0)],
            vec![ScoredWindow::new(10, 15, 1.0)],
        );
        assert_eq!(result, vec![ScoredWindow::new(0, 5, 1.0), ScoredWindow::new(10, 15, 1.0)]);
    }

    #[test]
    fn test_division_by_gap_emits_nothing() {
        let result = run(
            TwoTrackMethod::Divide,
            vec![ScoredWindow::new(0, 10, 6.0)],
            vec![ScoredWindow::new(5, 10, 2.0)],
        );
        assert_eq!(result, vec![ScoredWindow::new(5, 10, 3.0)]);
    }

    #[test]
    fn test_subtraction_to_zero_is_dropped() {
        let result = run(
            TwoTrackMethod::Subtract,
            vec![ScoredWindow::new(0, 10, 2.0)],
            vec![ScoredWindow::new(0, 5, 2.0)],
        );
        assert_eq!(result, vec![ScoredWindow::new(5, 10, 2.0)]);
    }

    #[test]
    fn test_overlap_count() {
        let result = run(
            TwoTrackMethod::OverlapCount,
            vec![ScoredWindow::new(0, 10, 7.0)],
            vec![ScoredWindow::new(5, 15, -3.0)],
        );
        assert_eq!(
            result,
            vec![
                ScoredWindow::new(0, 5, 1.0),
                ScoredWindow::new(5, 10, 2.0),
                ScoredWindow::new(10, 15, 1.0),
            ]
        );
    }

    #[test]
    fn test_mismatched_chromosomes_are_rejected() {
        let mut other = WindowList::new();
        other.push_chromosome("chr2", vec![]);
        let err = TwoTrackOperation::new(TwoTrackMethod::Add)
            .compute(&list(vec![]), &other, &OperationPool::sequential(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, OperationError::MismatchedChromosomes(_)));
    }
}

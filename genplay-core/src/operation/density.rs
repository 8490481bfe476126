//! Density of non-zero windows in an index neighbourhood

use super::{OperationError, OperationResult};
use crate::pool::TaskContext;
use crate::types::{Score, ScoredWindow};

/// Default number of neighbours taken on each side
pub const DEFAULT_HALF_WIDTH: usize = 2;

/// Neighbourhood size `2 * half_width + 1`, `None` when it does not fit a `usize`
fn neighbourhood(half_width: usize) -> Option<usize> {
    half_width.checked_mul(2)?.checked_add(1)
}

pub(crate) fn validate(half_width: usize) -> OperationResult<()> {
    if neighbourhood(half_width).is_none() {
        return Err(OperationError::InvalidParameter(format!(
            "density half width {} is too large",
            half_width
        )));
    }
    Ok(())
}

/// Replace each score by the fraction of non-zero windows among the
/// `2 * half_width + 1` windows centred on it.
///
/// The neighbourhood is counted by index, not by genomic distance. Near the
/// chromosome ends the missing neighbours count as empty, so the divisor is
/// always the full width and results stay in `[0, 1]`.
pub(crate) fn apply(
    half_width: usize,
    ctx: &TaskContext<'_>,
    windows: &[ScoredWindow],
) -> Vec<ScoredWindow> {
    let width = neighbourhood(half_width).unwrap_or(usize::MAX) as Score;

    // prefix[i] = non-zero windows among windows[..i]
    let mut prefix = Vec::with_capacity(windows.len() + 1);
    prefix.push(0usize);
    for window in windows {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + usize::from(window.has_data()));
    }

    let mut result = Vec::with_capacity(windows.len());
    for (i, window) in windows.iter().enumerate() {
        if ctx.checkpoint(i) {
            break;
        }
        let from = i.saturating_sub(half_width);
        let to = i.saturating_add(half_width).saturating_add(1).min(windows.len());
        let count = prefix[to] - prefix[from];
        result.push(window.with_score(count as Score / width));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::TransformOperation;
    use crate::pool::{CancellationToken, OperationPool};
    use crate::window::WindowList;

    fn run(half_width: usize, scores: &[Score]) -> Vec<Score> {
        let mut list = WindowList::new();
        let windows = scores
            .iter()
            .enumerate()
            .map(|(i, s)| ScoredWindow::new(i as i64 * 10, i as i64 * 10 + 10, *s))
            .collect();
        list.push_chromosome("chr1", windows);
        let result = TransformOperation::Density { half_width }
            .compute(&list, &OperationPool::sequential(), &CancellationToken::new())
            .unwrap()
            .unwrap();
        result.windows(0).iter().map(|w| w.score).collect()
    }

    #[test]
    fn test_density_half_width_one() {
        let scores = run(1, &[1.0, 0.0, 2.0, 3.0, 0.0]);
        let third = 1.0 / 3.0;
        assert_eq!(scores, vec![third, 2.0 * third, 2.0 * third, 2.0 * third, third]);
    }

    #[test]
    fn test_density_zero_width_is_indicator() {
        assert_eq!(run(0, &[5.0, 0.0, -1.0]), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_oversized_half_width_is_rejected() {
        let op = TransformOperation::Density { half_width: usize::MAX };
        assert!(op.validate().is_err());

        let mut list = WindowList::new();
        list.push_chromosome("chr1", vec![ScoredWindow::new(0, 10, 1.0)]);
        let err = op
            .compute(&list, &OperationPool::sequential(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, OperationError::InvalidParameter(_)));
    }

    #[test]
    fn test_largest_valid_half_width_does_not_overflow() {
        let half_width = usize::MAX / 2;
        assert!(TransformOperation::Density { half_width }.validate().is_ok());
        let scores = run(half_width, &[1.0, 0.0, 2.0]);
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| *s > 0.0 && *s < 1e-15));
    }

    #[test]
    fn test_density_stays_in_unit_range() {
        for score in run(3, &[1.0; 20]) {
            assert!((0.0..=1.0).contains(&score));
        }
    }
}

//! Transform commands - build a new track from one input track

use anyhow::{Context, Result};
use genplay_core::io::BedGraphWriter;
use genplay_core::operation::{ArithmeticOp, ThresholdFilter};
use genplay_core::{Score, TransformOperation};
use std::path::PathBuf;

use super::{completed, load_track, Session};
use crate::error::CliError;

/// Constant arithmetic from its command-line spelling
pub fn constant(op: &str, value: Score) -> Result<TransformOperation> {
    let op: ArithmeticOp = op
        .parse()
        .map_err(|e: String| CliError::validation("--op".to_string(), e))?;
    Ok(TransformOperation::Constant { op, value })
}

pub fn threshold(low: Score, high: Score, per_base: bool) -> TransformOperation {
    let filter = ThresholdFilter::new(low, high);
    TransformOperation::Threshold(if per_base { filter.per_base() } else { filter })
}

pub fn execute(session: &Session, input: PathBuf, out: PathBuf, op: TransformOperation) -> Result<()> {
    op.validate().map_err(CliError::from)?;

    let track = load_track(&input)?;
    log::info!("Applying {} to {} windows", op, op.step_count(&track));

    let result = session
        .with_progress(&op.to_string(), |pool, token| op.compute(&track, pool, token))
        .map_err(CliError::from)
        .and_then(completed)?;

    BedGraphWriter::write_file(&result, &out)
        .with_context(|| format!("Failed to write track: {}", out.display()))?;
    log::info!(
        "Wrote {} windows on {} chromosomes to {}",
        result.window_count(),
        result.chromosome_count(),
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_parsing() {
        assert_eq!(
            constant("multiply", 2.0).unwrap(),
            TransformOperation::Constant { op: ArithmeticOp::Multiply, value: 2.0 }
        );
        assert!(constant("modulo", 2.0).is_err());
    }

    #[test]
    fn test_per_base_threshold() {
        match threshold(0.0, 1.0, true) {
            TransformOperation::Threshold(filter) => {
                assert_eq!(filter.quantity, genplay_core::operation::FilterQuantity::ScorePerBase)
            }
            other => panic!("unexpected operation {}", other),
        }
    }
}

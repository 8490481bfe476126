//! Combine command - arithmetic between two tracks

use anyhow::{Context, Result};
use genplay_core::io::BedGraphWriter;
use genplay_core::{TwoTrackMethod, TwoTrackOperation};
use std::path::PathBuf;

use super::{completed, load_track, Session};
use crate::error::CliError;

pub fn execute(session: &Session, first: PathBuf, second: PathBuf, out: PathBuf, method: &str) -> Result<()> {
    let method: TwoTrackMethod = method
        .parse()
        .map_err(|e: String| CliError::validation("--method".to_string(), e))?;
    let op = TwoTrackOperation::new(method);

    let first_track = load_track(&first)?;
    let second_track = load_track(&second)?;
    log::info!(
        "Combining {} and {} ({} windows) by {}",
        first.display(),
        second.display(),
        op.step_count(&first_track, &second_track),
        method
    );

    let result = session
        .with_progress(&method.to_string(), |pool, token| {
            op.compute(&first_track, &second_track, pool, token)
        })
        .map_err(CliError::from)
        .and_then(completed)?;

    BedGraphWriter::write_file(&result, &out)
        .with_context(|| format!("Failed to write track: {}", out.display()))?;
    Ok(())
}

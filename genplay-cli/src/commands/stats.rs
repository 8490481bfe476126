//! Stats command - reduce a track to a single number

use anyhow::Result;
use genplay_core::{ChromosomeSelection, ScalarOperation};
use std::path::PathBuf;

use super::{completed, load_track, Session};
use crate::error::CliError;

pub fn execute(session: &Session, input: PathBuf, op: &str, chromosomes: Vec<String>) -> Result<()> {
    let op: ScalarOperation = op
        .parse()
        .map_err(|e: String| CliError::validation("--op".to_string(), e))?;
    let selection = if chromosomes.is_empty() {
        ChromosomeSelection::All
    } else {
        ChromosomeSelection::named(chromosomes)
    };

    let track = load_track(&input)?;
    log::info!(
        "Computing {} over {} windows",
        op,
        op.step_count(&track, &selection)
    );

    let value = session
        .with_progress(&op.to_string(), |pool, token| {
            op.compute(&track, &selection, pool, token)
        })
        .map_err(CliError::from)
        .and_then(completed)?;

    println!("{}\t{}", op, value);
    Ok(())
}

//! Translate command - move positions between genome coordinate systems

use anyhow::Result;
use genplay_core::io::OffsetReader;
use genplay_core::{AlleleType, GenomicPos, MultiGenome, INVALID_POSITION};
use std::path::PathBuf;

use crate::error::CliError;

pub fn execute(
    offsets: PathBuf,
    genome: &str,
    allele: &str,
    chromosome: &str,
    positions: &[GenomicPos],
    to: &str,
) -> Result<()> {
    let allele: AlleleType = allele
        .parse()
        .map_err(|e: String| CliError::validation("--allele".to_string(), e))?;

    if !offsets.exists() {
        return Err(CliError::file_not_found(offsets).into());
    }
    let project = OffsetReader::read_file(&offsets)
        .map_err(|e| CliError::parse(offsets.display().to_string(), e.to_string()))?;

    for (position, translated) in translate_all(&project, genome, allele, chromosome, positions, to)? {
        println!("{}\t{}", position, translated);
    }
    Ok(())
}

/// Translate every position, stopping at the first failure
fn translate_all(
    project: &MultiGenome,
    genome: &str,
    allele: AlleleType,
    chromosome: &str,
    positions: &[GenomicPos],
    to: &str,
) -> Result<Vec<(GenomicPos, GenomicPos)>, CliError> {
    positions
        .iter()
        .map(|&position| {
            if position == INVALID_POSITION {
                return Err(CliError::validation(
                    "--position".to_string(),
                    format!("{} is the invalid-position sentinel", position),
                ));
            }
            let translated = project.try_position(genome, allele, position, chromosome, to)?;
            Ok((position, translated))
        })
        .collect()
}

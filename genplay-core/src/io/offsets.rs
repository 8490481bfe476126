//! Offset table import
//!
//! One variant per line: `genome allele chromosome position delta`,
//! whitespace separated. `delta` is the net length change of the variant,
//! positive for insertions and negative for deletions. Reference genomes
//! use the `reference` allele.

use std::io::BufRead;
use std::path::Path;

use super::{open_reader, parse_field, IoError, IoResult};
use crate::genome::{MultiGenome, MultiGenomeBuilder};
use crate::types::{AlleleType, GenomicPos};

pub struct OffsetReader;

impl OffsetReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> IoResult<MultiGenome> {
        let mut builder = MultiGenomeBuilder::new();
        let count = Self::read_into(open_reader(&path)?, &mut builder)?;
        log::info!(
            "Imported {} variants for {} genomes from {}",
            count,
            builder.genome_count(),
            path.as_ref().display()
        );
        Ok(builder.finalize())
    }

    /// Feed every variant of `reader` into `builder`, returning how many
    /// were read
    pub fn read_into<R: BufRead>(reader: R, builder: &mut MultiGenomeBuilder) -> IoResult<usize> {
        let mut count = 0;

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            if fields.len() < 5 {
                return Err(IoError::MissingFields {
                    line: line_num,
                    expected: 5,
                    found: fields.len(),
                });
            }

            let allele: AlleleType = parse_field(fields[1], "allele", line_num)?;
            let position: GenomicPos = parse_field(fields[3], "position", line_num)?;
            let delta: GenomicPos = parse_field(fields[4], "delta", line_num)?;
            if position < 0 {
                return Err(IoError::InvalidField {
                    line: line_num,
                    field: "position",
                    value: fields[3].to_string(),
                });
            }

            builder
                .add_offset(fields[0], allele, fields[2], position, delta)
                .map_err(|source| IoError::Translation { line: line_num, source })?;
            count += 1;
        }

        Ok(count)
    }
}

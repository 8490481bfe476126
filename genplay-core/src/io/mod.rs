//! Line-oriented readers and writers feeding the engine
//!
//! bedGraph files load into a [`WindowList`](crate::window::WindowList) and
//! offset tables load into a [`MultiGenomeBuilder`](crate::genome::MultiGenomeBuilder).

#[cfg(feature = "io-bedgraph")] pub mod bedgraph;
#[cfg(feature = "io-offsets")] pub mod offsets;

#[cfg(feature = "io-bedgraph")] pub use bedgraph::{BedGraphReader, BedGraphWriter};
#[cfg(feature = "io-offsets")] pub use offsets::OffsetReader;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: expected {expected} fields, got {found}")]
    MissingFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: invalid {field} '{value}'")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("Line {line}: {source}")]
    Translation {
        line: usize,
        #[source]
        source: crate::genome::TranslationError,
    },
}

pub type IoResult<T> = Result<T, IoError>;

/// Open `path` for line reading, transparently decompressing `.gz` files
pub fn open_reader<P: AsRef<Path>>(path: P) -> IoResult<Box<dyn BufRead>> {
    let file = File::open(&path)?;
    let path_str = path.as_ref().to_string_lossy();

    if path_str.ends_with(".gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
) -> IoResult<T> {
    value.parse::<T>().map_err(|_| IoError::InvalidField {
        line,
        field,
        value: value.to_string(),
    })
}

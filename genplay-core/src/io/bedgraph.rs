//! bedGraph reader and writer
//!
//! Each data line is `chrom start stop score`, whitespace separated, with a
//! half-open zero-based interval. `track`, `browser` and `#` lines are skipped.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use super::{open_reader, parse_field, IoError, IoResult};
use crate::types::{GenomicPos, Score, ScoredWindow};
use crate::window::{ChromosomeWindows, WindowList};

pub struct BedGraphReader;

impl BedGraphReader {
    /// Read a bedGraph file, gzip-compressed when its name ends in `.gz`
    pub fn read_file<P: AsRef<Path>>(path: P) -> IoResult<WindowList> {
        let list = Self::read(open_reader(&path)?)?;
        log::info!(
            "Loaded {} windows on {} chromosomes from {}",
            list.window_count(),
            list.chromosome_count(),
            path.as_ref().display()
        );
        Ok(list)
    }

    /// Chromosomes keep the order they first appear in
    pub fn read<R: BufRead>(reader: R) -> IoResult<WindowList> {
        let mut order: HashMap<String, usize> = HashMap::new();
        let mut chromosomes: Vec<(String, Vec<ScoredWindow>)> = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = line_num + 1;
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with("track")
                || trimmed.starts_with("browser")
            {
                continue;
            }

            let (chromosome, window) = Self::parse_line(trimmed, line_num)?;
            let index = match order.get(chromosome) {
                Some(&index) => index,
                None => {
                    order.insert(chromosome.to_string(), chromosomes.len());
                    chromosomes.push((chromosome.to_string(), Vec::new()));
                    chromosomes.len() - 1
                }
            };
            chromosomes[index].1.push(window);
        }

        Ok(WindowList::from_chromosomes(
            chromosomes
                .into_iter()
                .map(|(name, windows)| ChromosomeWindows::new(name, windows))
                .collect(),
        ))
    }

    fn parse_line(line: &str, line_num: usize) -> IoResult<(&str, ScoredWindow)> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(IoError::MissingFields {
                line: line_num,
                expected: 4,
                found: fields.len(),
            });
        }

        let start: GenomicPos = parse_field(fields[1], "start", line_num)?;
        let stop: GenomicPos = parse_field(fields[2], "stop", line_num)?;
        let score: Score = parse_field(fields[3], "score", line_num)?;
        if start < 0 || stop < start {
            return Err(IoError::InvalidField {
                line: line_num,
                field: "interval",
                value: format!("{}-{}", start, stop),
            });
        }

        Ok((fields[0], ScoredWindow::new(start, stop, score)))
    }
}

pub struct BedGraphWriter;

impl BedGraphWriter {
    /// Write `list` to `path`, gzip-compressed when the name ends in `.gz`
    pub fn write_file<P: AsRef<Path>>(list: &WindowList, path: P) -> IoResult<()> {
        let file = File::create(&path)?;
        if path.as_ref().to_string_lossy().ends_with(".gz") {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            Self::write(list, &mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            Self::write(list, &mut writer)?;
            writer.flush()?;
        }
        log::info!("Wrote {} windows to {}", list.window_count(), path.as_ref().display());
        Ok(())
    }

    pub fn write<W: Write>(list: &WindowList, writer: &mut W) -> IoResult<()> {
        for chromosome in list.chromosomes() {
            for window in chromosome.windows() {
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}",
                    chromosome.name(), window.start, window.stop, window.score
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "track type=bedGraph name=test\n\
        # comment\n\
        chr2\t100\t200\t1.5\n\
        chr1\t50\t60\t-2\n\
        chr2\t0\t100\t3\n\
        \n";

    #[test]
    fn test_read_keeps_first_seen_order() {
        let list = BedGraphReader::read(Cursor::new(SAMPLE)).unwrap();
        let names: Vec<_> = list.chromosome_names().collect();
        assert_eq!(names, vec!["chr2", "chr1"]);
        assert_eq!(list.windows(0)[0], ScoredWindow::new(0, 100, 3.0));
        assert_eq!(list.windows(0)[1], ScoredWindow::new(100, 200, 1.5));
        assert_eq!(list.windows(1)[0].score, -2.0);
    }

    #[test]
    fn test_malformed_lines() {
        let err = BedGraphReader::read(Cursor::new("chr1\t0\t10\n")).unwrap_err();
        assert!(matches!(err, IoError::MissingFields { line: 1, found: 3, .. }));

        let err = BedGraphReader::read(Cursor::new("chr1\t0\t10\t1\nchr1\tx\t10\t1\n")).unwrap_err();
        assert!(matches!(err, IoError::InvalidField { line: 2, field: "start", .. }));

        let err = BedGraphReader::read(Cursor::new("chr1\t20\t10\t1\n")).unwrap_err();
        assert!(matches!(err, IoError::InvalidField { field: "interval", .. }));
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let list = BedGraphReader::read(Cursor::new(SAMPLE)).unwrap();

        for name in ["out.bedgraph", "out.bedgraph.gz"] {
            let path = dir.path().join(name);
            BedGraphWriter::write_file(&list, &path).unwrap();
            assert_eq!(BedGraphReader::read_file(&path).unwrap(), list);
        }
    }
}

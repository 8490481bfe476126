use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type GenomicPos = i64;
pub type Score = f64;

/// Returned by the translator when a position cannot be mapped.
pub const INVALID_POSITION: GenomicPos = -1;

/// Name under which the shared coordinate system is addressed.
pub const META_GENOME_NAME: &str = "Meta genome";

pub fn is_meta_genome(name: &str) -> bool {
    name == META_GENOME_NAME
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlleleType {
    /// Single allele of the reference genome
    Reference,
    Allele01,
    Allele02,
}

impl AlleleType {
    pub fn is_reference(&self) -> bool {
        matches!(self, AlleleType::Reference)
    }
}

impl fmt::Display for AlleleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlleleType::Reference => write!(f, "reference"),
            AlleleType::Allele01 => write!(f, "allele01"),
            AlleleType::Allele02 => write!(f, "allele02"),
        }
    }
}

impl FromStr for AlleleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reference" | "ref" | "0" => Ok(AlleleType::Reference),
            "allele01" | "a1" | "1" => Ok(AlleleType::Allele01),
            "allele02" | "a2" | "2" => Ok(AlleleType::Allele02),
            other => Err(format!("unknown allele type: {}", other)),
        }
    }
}

/// A half-open `[start, stop)` interval on one chromosome carrying a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredWindow {
    pub start: GenomicPos,
    pub stop: GenomicPos,
    pub score: Score,
}

impl ScoredWindow {
    pub fn new(start: GenomicPos, stop: GenomicPos, score: Score) -> Self {
        Self { start, stop, score }
    }

    pub fn len(&self) -> GenomicPos {
        (self.stop - self.start).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    /// Windows scored exactly zero carry no data
    pub fn has_data(&self) -> bool {
        self.score != 0.0
    }

    pub fn contains(&self, position: GenomicPos) -> bool {
        position >= self.start && position < self.stop
    }

    pub fn with_score(&self, score: Score) -> Self {
        Self { score, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allele_parsing() {
        assert_eq!("allele01".parse::<AlleleType>().unwrap(), AlleleType::Allele01);
        assert_eq!("A2".parse::<AlleleType>().unwrap(), AlleleType::Allele02);
        assert_eq!("ref".parse::<AlleleType>().unwrap(), AlleleType::Reference);
        assert!("paternal".parse::<AlleleType>().is_err());
    }

    #[test]
    fn test_window_geometry() {
        let w = ScoredWindow::new(10, 20, 1.5);
        assert_eq!(w.len(), 10);
        assert!(w.contains(10));
        assert!(!w.contains(20));
        assert!(w.has_data());
        assert!(!w.with_score(0.0).has_data());
        assert!(ScoredWindow::new(5, 5, 1.0).is_empty());
    }
}

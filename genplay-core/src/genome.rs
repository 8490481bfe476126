//! Multi-genome projects and coordinate translation
//!
//! Every genome owns one offset table per allele and chromosome. Positions
//! move between genomes only through the meta-genome: a genome-to-genome
//! query is always answered as `A -> meta -> B`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::offset::{OffsetTable, OffsetTableBuilder};
use crate::types::{is_meta_genome, AlleleType, GenomicPos, INVALID_POSITION, META_GENOME_NAME};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Unknown genome: {0}")]
    UnknownGenome(String),

    #[error("Genome {genome} has no offset table for {allele}")]
    MissingAllele { genome: String, allele: AlleleType },

    #[error("'{0}' is reserved for the meta-genome")]
    ReservedGenomeName(String),
}

pub type TranslationResult<T> = Result<T, TranslationError>;

/// Offset tables of one genome, keyed by allele then chromosome name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    name: String,
    alleles: BTreeMap<AlleleType, BTreeMap<String, OffsetTable>>,
}

impl Genome {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alleles(&self) -> impl Iterator<Item = AlleleType> + '_ {
        self.alleles.keys().copied()
    }

    pub fn has_allele(&self, allele: AlleleType) -> bool {
        self.alleles.contains_key(&allele)
    }

    /// A reference genome carries nothing but its `Reference` allele
    pub fn is_reference(&self) -> bool {
        !self.alleles.is_empty() && self.alleles.keys().all(AlleleType::is_reference)
    }

    /// Table for `allele` on `chromosome`.
    ///
    /// `Ok(None)` means the allele exists but saw no variant on that
    /// chromosome, which translates as identity.
    pub fn table(
        &self,
        allele: AlleleType,
        chromosome: &str,
    ) -> TranslationResult<Option<&OffsetTable>> {
        let allele = self.resolve_allele(allele);
        let chromosomes = self
            .alleles
            .get(&allele)
            .ok_or_else(|| TranslationError::MissingAllele {
                genome: self.name.clone(),
                allele,
            })?;
        Ok(chromosomes.get(chromosome))
    }

    pub fn offset_count(&self) -> usize {
        self.alleles
            .values()
            .flat_map(|chromosomes| chromosomes.values())
            .map(OffsetTable::len)
            .sum()
    }

    fn resolve_allele(&self, requested: AlleleType) -> AlleleType {
        if self.is_reference() {
            AlleleType::Reference
        } else {
            requested
        }
    }
}

/// Import-phase container collecting variants for every genome
#[derive(Debug, Default)]
pub struct MultiGenomeBuilder {
    genomes: BTreeMap<String, BTreeMap<AlleleType, BTreeMap<String, OffsetTableBuilder>>>,
}

impl MultiGenomeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a genome and the alleles it carries, even before any variant
    /// is seen for them
    pub fn add_genome(&mut self, name: &str, alleles: &[AlleleType]) -> TranslationResult<()> {
        if is_meta_genome(name) {
            return Err(TranslationError::ReservedGenomeName(name.to_string()));
        }
        let entry = self.genomes.entry(name.to_string()).or_default();
        for allele in alleles {
            entry.entry(*allele).or_default();
        }
        Ok(())
    }

    pub fn add_reference_genome(&mut self, name: &str) -> TranslationResult<()> {
        self.add_genome(name, &[AlleleType::Reference])
    }

    pub fn add_offset(
        &mut self,
        genome: &str,
        allele: AlleleType,
        chromosome: &str,
        genome_position: GenomicPos,
        length_delta: GenomicPos,
    ) -> TranslationResult<()> {
        if is_meta_genome(genome) {
            return Err(TranslationError::ReservedGenomeName(genome.to_string()));
        }
        self.genomes
            .entry(genome.to_string())
            .or_default()
            .entry(allele)
            .or_default()
            .entry(chromosome.to_string())
            .or_default()
            .add_offset(genome_position, length_delta);
        Ok(())
    }

    pub fn genome_count(&self) -> usize {
        self.genomes.len()
    }

    /// Sort and compact every table and freeze the project for querying
    pub fn finalize(self) -> MultiGenome {
        let mut genomes = BTreeMap::new();

        for (name, alleles) in self.genomes {
            let alleles: BTreeMap<_, _> = alleles
                .into_iter()
                .map(|(allele, chromosomes)| {
                    let tables = chromosomes
                        .into_iter()
                        .map(|(chromosome, builder)| (chromosome, builder.finalize()))
                        .collect::<BTreeMap<_, _>>();
                    (allele, tables)
                })
                .collect();

            let genome = Genome {
                name: name.clone(),
                alleles,
            };
            log::debug!(
                "Finalized genome {} with {} offset records",
                genome.name,
                genome.offset_count()
            );
            genomes.insert(name, genome);
        }

        MultiGenome { genomes }
    }
}

/// Finalized multi-genome project answering coordinate queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiGenome {
    genomes: BTreeMap<String, Genome>,
}

impl MultiGenome {
    pub fn genome(&self, name: &str) -> Option<&Genome> {
        self.genomes.get(name)
    }

    pub fn genome_names(&self) -> impl Iterator<Item = &str> {
        self.genomes.keys().map(String::as_str)
    }

    pub fn genome_count(&self) -> usize {
        self.genomes.len()
    }

    fn lookup(&self, name: &str) -> TranslationResult<&Genome> {
        self.genomes
            .get(name)
            .ok_or_else(|| TranslationError::UnknownGenome(name.to_string()))
    }

    /// Native position of `genome` to meta-genome position
    pub fn meta_genome_position(
        &self,
        genome: &str,
        allele: AlleleType,
        chromosome: &str,
        genome_position: GenomicPos,
    ) -> TranslationResult<GenomicPos> {
        let table = self.lookup(genome)?.table(allele, chromosome)?;
        Ok(table.map_or(genome_position, |t| t.meta_genome_position(genome_position)))
    }

    /// Meta-genome position to native position of `genome`
    pub fn genome_position(
        &self,
        genome: &str,
        allele: AlleleType,
        chromosome: &str,
        meta_genome_position: GenomicPos,
    ) -> TranslationResult<GenomicPos> {
        let table = self.lookup(genome)?.table(allele, chromosome)?;
        Ok(table.map_or(meta_genome_position, |t| t.genome_position(meta_genome_position)))
    }

    /// Translate a position between any two coordinate systems.
    ///
    /// The output genome is read with the same allele as the input, except
    /// that a reference genome always answers with its single allele.
    pub fn try_position(
        &self,
        input_genome: &str,
        input_allele: AlleleType,
        input_position: GenomicPos,
        chromosome: &str,
        output_genome: &str,
    ) -> TranslationResult<GenomicPos> {
        if input_genome == output_genome || input_position == INVALID_POSITION {
            return Ok(input_position);
        }

        if is_meta_genome(output_genome) {
            return self.meta_genome_position(input_genome, input_allele, chromosome, input_position);
        }

        if is_meta_genome(input_genome) {
            return self.genome_position(output_genome, input_allele, chromosome, input_position);
        }

        let meta_position =
            self.meta_genome_position(input_genome, input_allele, chromosome, input_position)?;
        self.genome_position(output_genome, input_allele, chromosome, meta_position)
    }

    /// Like [`MultiGenome::try_position`] but reports failures as a warning
    /// and [`INVALID_POSITION`]; callers must check for the sentinel.
    pub fn get_position(
        &self,
        input_genome: &str,
        input_allele: AlleleType,
        input_position: GenomicPos,
        chromosome: &str,
        output_genome: &str,
    ) -> GenomicPos {
        match self.try_position(input_genome, input_allele, input_position, chromosome, output_genome) {
            Ok(position) => position,
            Err(e) => {
                log::warn!(
                    "Cannot translate {}:{} from {} to {}: {}",
                    chromosome,
                    input_position,
                    input_genome,
                    output_genome,
                    e
                );
                INVALID_POSITION
            }
        }
    }

    /// Name of the shared coordinate system, usable as input or output genome
    pub fn meta_genome_name(&self) -> &'static str {
        META_GENOME_NAME
    }
}

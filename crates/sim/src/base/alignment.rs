//! Aligned species sequences.
//!
//! The alignment is the read-only data every tree is scored against. It is
//! validated once on construction so that scoring only has to deal with
//! structurally sound input.

use std::collections::HashMap;
use std::sync::Arc;

use crate::base::Symbol;
use crate::errors::{AlignmentError, InvalidSymbol};

/// An immutable (species name, aligned sequence) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesGenome {
    name: Arc<str>,
    sequence: Vec<Symbol>,
}

impl SpeciesGenome {
    /// Create a genome from already decoded symbols.
    pub fn new(name: impl Into<Arc<str>>, sequence: Vec<Symbol>) -> Self {
        Self {
            name: name.into(),
            sequence,
        }
    }

    /// Parse a genome from its textual sequence (case-insensitive).
    pub fn parse(name: impl Into<Arc<str>>, sequence: &str) -> Result<Self, AlignmentError> {
        let name = name.into();
        let sequence = sequence
            .bytes()
            .enumerate()
            .map(|(position, byte)| {
                Symbol::from_ascii(byte).ok_or_else(|| AlignmentError::InvalidSymbol {
                    species: name.to_string(),
                    position,
                    symbol: InvalidSymbol(byte),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { name, sequence })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Symbol at a site, if the site is inside the sequence.
    #[inline]
    pub fn get(&self, site: usize) -> Option<Symbol> {
        self.sequence.get(site).copied()
    }
}

/// A validated set of aligned sequences, ordered and keyed by species name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    genomes: Vec<SpeciesGenome>,
    index: HashMap<Arc<str>, usize>,
}

impl Alignment {
    /// Build an alignment, checking that names are unique, there are at
    /// least two species, and every sequence has the same non-zero length.
    pub fn new(genomes: Vec<SpeciesGenome>) -> Result<Self, AlignmentError> {
        if genomes.len() < 2 {
            return Err(AlignmentError::TooFewSpecies(genomes.len()));
        }

        let expected = genomes[0].len();
        let mut index = HashMap::with_capacity(genomes.len());
        for (i, genome) in genomes.iter().enumerate() {
            if genome.is_empty() {
                return Err(AlignmentError::EmptySequence(genome.name().to_string()));
            }
            if genome.len() != expected {
                return Err(AlignmentError::LengthMismatch {
                    species: genome.name().to_string(),
                    expected,
                    found: genome.len(),
                });
            }
            if index.insert(genome.name.clone(), i).is_some() {
                return Err(AlignmentError::DuplicateSpecies(genome.name().to_string()));
            }
        }

        Ok(Self { genomes, index })
    }

    /// Convenience constructor from `(name, sequence)` string pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, AlignmentError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let genomes = pairs
            .into_iter()
            .map(|(name, seq)| SpeciesGenome::parse(name, seq))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(genomes)
    }

    /// Species in input order.
    pub fn genomes(&self) -> &[SpeciesGenome] {
        &self.genomes
    }

    /// Look up a species by name.
    pub fn get(&self, name: &str) -> Option<&SpeciesGenome> {
        self.index.get(name).map(|&i| &self.genomes[i])
    }

    pub fn num_species(&self) -> usize {
        self.genomes.len()
    }

    /// Number of aligned sites (shared sequence length).
    pub fn sequence_len(&self) -> usize {
        self.genomes[0].len()
    }

    /// Species names in input order.
    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.genomes.iter().map(|g| g.name())
    }
}

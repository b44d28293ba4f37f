//! Subtree crossover between trees.
//!
//! A receiving tree takes a random subtree from a donor of the previous
//! generation. The species of the donated subtree are first pruned from the
//! receiver so that every species stays on exactly one leaf.

use rand::Rng;

use crate::errors::{ConfigError, TreeError};
use crate::evolution::mutation::check_probability;
use crate::tree::{acceptance_probability, fresh_branch_length, PhyloTree};

/// Crossover probability between trees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecombinationModel {
    crossover_prob: f64,
}

impl RecombinationModel {
    pub fn new(crossover_prob: f64) -> Result<Self, ConfigError> {
        check_probability("crossover_prob", crossover_prob)?;
        Ok(Self { crossover_prob })
    }

    pub fn crossover_prob(&self) -> f64 {
        self.crossover_prob
    }

    /// With probability `crossover_prob`, graft a copy of a random donor
    /// subtree into `receiver`. Returns whether a graft took place.
    ///
    /// The donor is chosen uniformly from `donors`. Its subtree is copied
    /// together with its incoming branch length, the matching species are
    /// detached from the receiver, and the copy is inserted at a random
    /// location. The receiver keeps one leaf per species and is compacted.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        receiver: &mut PhyloTree,
        donors: &[PhyloTree],
        num_species: usize,
        rng: &mut R,
    ) -> Result<bool, TreeError> {
        if donors.is_empty() || !rng.random_bool(self.crossover_prob) {
            return Ok(false);
        }

        let donor = &donors[rng.random_range(0..donors.len())];
        if donor.node(donor.root())?.is_leaf() {
            return Ok(false);
        }

        let accept = acceptance_probability(num_species);
        let picked = donor.sample_non_root(accept, rng)?;
        let carried = match donor.incoming_length(picked)? {
            Some(length) => length,
            None => fresh_branch_length(rng),
        };
        let piece = donor.extract(picked)?;
        let species = piece.capture_species(piece.root())?;

        if species.len() >= receiver.leaf_count() {
            // the donated piece would replace the whole receiver
            *receiver = piece;
            return Ok(true);
        }

        receiver.remove_species(&species)?;
        let grafted = receiver.absorb(piece);
        receiver.insert_subtree(grafted, carried, accept, rng)?;
        receiver.compact();
        Ok(true)
    }
}

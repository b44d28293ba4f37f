//! Mutation operators on phylogenetic trees.
//!
//! Three independent operators act on a tree in place:
//!
//! ## Branch lengths
//! Each branch is, with probability `branch_rate`, multiplied by a draw from
//! a Gamma distribution with mean 1 and a small variance, then clamped back
//! into `[0.001, 1.0]`.
//!
//! ## Substitution parameters
//! Every frequency and matrix cell of every node is, with probability
//! `parameter_rate`, multiplied by the same kind of Gamma draw. Frequencies
//! and matrix rows are renormalized afterwards.
//!
//! ## Topology
//! With probability `topology_rate` a random non-root subtree is detached and
//! reinserted elsewhere in the tree (a subtree prune and regraft move).

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::errors::{ConfigError, TreeError};
use crate::tree::{acceptance_probability, clamp_branch_length, PhyloTree, Side};

/// Shape (and rate) of the multiplicative Gamma perturbation.
pub const GAMMA_SHAPE: f64 = 500.0;

/// Probabilities driving the three mutation operators.
#[derive(Debug, Clone)]
pub struct MutationModel {
    branch_rate: f64,
    parameter_rate: f64,
    topology_rate: f64,
    gamma: Gamma<f64>,
}

impl MutationModel {
    /// Create a mutation model. Every rate must lie in `[0, 1]`.
    pub fn new(branch_rate: f64, parameter_rate: f64, topology_rate: f64) -> Result<Self, ConfigError> {
        check_probability("branch_rate", branch_rate)?;
        check_probability("parameter_rate", parameter_rate)?;
        check_probability("topology_rate", topology_rate)?;

        // rand_distr takes (shape, scale); scale = 1 / rate gives mean 1.
        let gamma = Gamma::new(GAMMA_SHAPE, 1.0 / GAMMA_SHAPE)
            .map_err(|e| ConfigError::InvalidDistribution(e.to_string()))?;

        Ok(Self {
            branch_rate,
            parameter_rate,
            topology_rate,
            gamma,
        })
    }

    pub fn branch_rate(&self) -> f64 {
        self.branch_rate
    }

    pub fn parameter_rate(&self) -> f64 {
        self.parameter_rate
    }

    pub fn topology_rate(&self) -> f64 {
        self.topology_rate
    }

    /// Multiplicative perturbation with mean 1.
    #[inline]
    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.gamma.sample(rng)
    }

    /// Perturb branch lengths in place. Returns the number of branches
    /// changed.
    pub fn mutate_branches<R: Rng + ?Sized>(&self, tree: &mut PhyloTree, rng: &mut R) -> usize {
        let mut changed = 0;
        for id in tree.preorder() {
            let Ok(node) = tree.node_mut(id) else { continue };
            if node.is_leaf() {
                continue;
            }
            for side in [Side::Left, Side::Right] {
                if rng.random_bool(self.branch_rate) {
                    let length = node.distance(side) * self.jitter(rng);
                    node.set_distance(side, clamp_branch_length(length));
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Perturb frequencies and conversion ratios of every node in place,
    /// then renormalize them.
    pub fn mutate_parameters<R: Rng + ?Sized>(&self, tree: &mut PhyloTree, rng: &mut R) {
        for id in tree.preorder() {
            let Ok(node) = tree.node_mut(id) else { continue };
            let params = node.params_mut();
            for f in params.frequencies.iter_mut() {
                if rng.random_bool(self.parameter_rate) {
                    *f *= self.jitter(rng);
                }
            }
            for cell in params.matrix.iter_mut().flatten() {
                if rng.random_bool(self.parameter_rate) {
                    *cell *= self.jitter(rng);
                }
            }
            params.normalize();
        }
    }

    /// With probability `topology_rate`, move a random non-root subtree to a
    /// random location. Returns whether a move took place.
    ///
    /// Leaf and internal counts are unchanged and the arena is compacted.
    pub fn mutate_topology<R: Rng + ?Sized>(
        &self,
        tree: &mut PhyloTree,
        num_species: usize,
        rng: &mut R,
    ) -> Result<bool, TreeError> {
        if !rng.random_bool(self.topology_rate) || tree.node(tree.root())?.is_leaf() {
            return Ok(false);
        }

        let accept = acceptance_probability(num_species);
        let subtree = tree.sample_non_root(accept, rng)?;
        let carried = tree.detach(subtree)?;
        tree.insert_subtree(subtree, carried, accept, rng)?;
        tree.compact();
        Ok(true)
    }
}

pub(crate) fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability(name, value))
    }
}

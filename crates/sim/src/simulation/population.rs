//! Population management and operations.
//!
//! This module provides the fixed-size generation of trees the genetic
//! algorithm evolves, with scoring and survivor copying.

use rand::Rng;

use crate::base::LogLikelihood;
use crate::errors::{LikelihoodError, TreeError};
use crate::evolution::{rank_by_score, LikelihoodEngine, SelectionModel};
use crate::tree::PhyloTree;

/// A generation of candidate trees. Each slot owns its tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    /// The trees in this generation
    trees: Vec<PhyloTree>,
    /// Generation counter
    generation: usize,
}

impl Population {
    /// Create a new population from trees.
    pub fn new(trees: Vec<PhyloTree>) -> Self {
        Self {
            trees,
            generation: 0,
        }
    }

    /// `size` independent random topologies over `species`.
    pub fn random<S, R>(size: usize, species: &[S], rng: &mut R) -> Result<Self, TreeError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let trees = (0..size)
            .map(|_| PhyloTree::random(species, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(trees))
    }

    /// Get the current generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Increment the generation counter.
    pub fn increment_generation(&mut self) {
        self.generation += 1;
    }

    /// Get the number of trees in the population.
    pub fn size(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn trees(&self) -> &[PhyloTree] {
        &self.trees
    }

    pub fn trees_mut(&mut self) -> &mut [PhyloTree] {
        &mut self.trees
    }

    /// Replace the entire generation.
    pub fn set_trees(&mut self, trees: Vec<PhyloTree>) {
        self.trees = trees;
    }

    pub fn get(&self, index: usize) -> Option<&PhyloTree> {
        self.trees.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PhyloTree> {
        self.trees.get_mut(index)
    }

    /// Score every tree, in slot order.
    pub fn score_all(&self, engine: &LikelihoodEngine<'_>) -> Result<Vec<LogLikelihood>, LikelihoodError> {
        self.trees.iter().map(|tree| engine.score(tree)).collect()
    }

    /// Deep copies of the survivors that seed the next generation.
    ///
    /// Slot 0 (and the rest of the elite block) holds copies of the best
    /// tree; the remaining slots are filled by the rank sweep of
    /// [`SelectionModel::survivor_ranks`].
    pub fn select_survivors<R: Rng + ?Sized>(
        &self,
        scores: &[LogLikelihood],
        selection: &SelectionModel,
        rng: &mut R,
    ) -> Vec<PhyloTree> {
        let ranking = rank_by_score(scores);
        selection
            .survivor_ranks(ranking.len(), rng)
            .into_iter()
            .map(|rank| self.trees[ranking[rank]].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    const SPECIES: [&str; 4] = ["w", "x", "y", "z"];

    fn tagged(tag: f64) -> PhyloTree {
        PhyloTree::join(PhyloTree::leaf("x"), PhyloTree::leaf("y"), [tag, tag])
    }

    #[test]
    fn test_population_new() {
        let pop = Population::new(vec![tagged(0.1), tagged(0.2)]);
        assert_eq!(pop.size(), 2);
        assert_eq!(pop.generation(), 0);
        assert!(!pop.is_empty());
        assert!(pop.get(2).is_none());
    }

    #[test]
    fn test_population_increment_generation() {
        let mut pop = Population::new(Vec::new());
        assert!(pop.is_empty());
        pop.increment_generation();
        pop.increment_generation();
        assert_eq!(pop.generation(), 2);
    }

    #[test]
    fn test_population_random() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        let pop = Population::random(5, &SPECIES, &mut rng).unwrap();
        assert_eq!(pop.size(), 5);
        for tree in pop.trees() {
            tree.validate_species(&SPECIES).unwrap();
        }
    }

    #[test]
    fn test_select_survivors_puts_best_first() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let pop = Population::new(vec![tagged(0.1), tagged(0.2), tagged(0.3), tagged(0.4)]);
        let scores: Vec<LogLikelihood> = [-9.0, -2.0, -5.0, -7.0]
            .into_iter()
            .map(LogLikelihood::new)
            .collect();
        let selection = SelectionModel::new(0.5).unwrap();

        let next = pop.select_survivors(&scores, &selection, &mut rng);
        assert_eq!(next.len(), 4);
        assert_eq!(next[0], tagged(0.2));
        assert_eq!(next[1], tagged(0.2));
        for tree in &next[2..] {
            assert_ne!(*tree, tagged(0.2));
        }
    }

    #[test]
    fn test_score_all_in_slot_order() {
        let aln = crate::base::Alignment::from_pairs([("x", "ACGT"), ("y", "ACGA")]).unwrap();
        let engine = LikelihoodEngine::new(&aln, 4);
        let pop = Population::new(vec![tagged(0.01), tagged(0.5)]);
        let scores = pop.score_all(&engine).unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0].same_bits(engine.score(&tagged(0.01)).unwrap()));
        assert!(scores[1].same_bits(engine.score(&tagged(0.5)).unwrap()));
    }
}

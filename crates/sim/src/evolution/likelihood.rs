//! Tree scoring by Felsenstein pruning.
//!
//! For every site of the alignment the engine walks the tree bottom-up,
//! computing a 5-vector of partial likelihoods per node. Leaves emit a
//! one-hot vector on the observed symbol weighted by the leaf's own base
//! frequency. An internal node combines its children through the linear
//! transition model of [`SubstitutionParams::transition`]. Entry `j` of an
//! internal vector is the term for parent symbol `j` alone, and the site
//! likelihood is the sum of the root's entries. With every frequency and
//! transition probability at most one, each site likelihood is at most one
//! and the log-likelihood is never positive.
//!
//! [`SubstitutionParams::transition`]: crate::tree::SubstitutionParams::transition

use crate::base::{Alignment, LogLikelihood, SpeciesGenome, Symbol, NUM_SYMBOLS};
use crate::errors::{LikelihoodError, TreeError};
use crate::tree::{NodeId, PhyloTree, Side};

/// Partial likelihood vector of one node at one site.
pub type Partial = [f64; NUM_SYMBOLS];

/// Memoized partials of one site, indexed by node id.
#[derive(Debug, Default)]
struct ScoreCache {
    partials: Vec<Option<Partial>>,
}

impl ScoreCache {
    fn reset(&mut self, arena_len: usize) {
        self.partials.clear();
        self.partials.resize(arena_len, None);
    }

    #[inline]
    fn get(&self, id: NodeId) -> Option<&Partial> {
        self.partials.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    fn insert(&mut self, id: NodeId, partial: Partial) {
        self.partials[id.index()] = Some(partial);
    }
}

/// Scores trees against a fixed alignment.
///
/// The engine borrows the alignment and holds no other state, so scoring is
/// free of side effects and the same tree always yields the same score.
#[derive(Debug, Clone, Copy)]
pub struct LikelihoodEngine<'a> {
    alignment: &'a Alignment,
    sites: usize,
}

impl<'a> LikelihoodEngine<'a> {
    /// Create an engine scoring at most `site_limit` leading sites.
    pub fn new(alignment: &'a Alignment, site_limit: usize) -> Self {
        Self {
            alignment,
            sites: site_limit.min(alignment.sequence_len()),
        }
    }

    /// Number of sites actually scored.
    pub fn sites(&self) -> usize {
        self.sites
    }

    pub fn alignment(&self) -> &'a Alignment {
        self.alignment
    }

    /// Log-likelihood of the alignment given `tree`.
    pub fn score(&self, tree: &PhyloTree) -> Result<LogLikelihood, LikelihoodError> {
        if tree.node(tree.root())?.is_leaf() {
            return Err(TreeError::Malformed("cannot score a tree whose root is a leaf".into()).into());
        }

        // Children come after their parent in preorder, so walking it
        // backwards fills every child before it is needed.
        let mut order = tree.preorder();
        order.reverse();
        let genomes = self.leaf_genomes(tree, &order)?;

        let mut cache = ScoreCache::default();
        let mut total = LogLikelihood::ZERO;
        for site in 0..self.sites {
            cache.reset(tree.arena_len());
            for &id in &order {
                let partial = match genomes[id.index()] {
                    Some(genome) => self.leaf_partial(tree, id, genome, site)?,
                    None => Self::internal_partial(tree, id, &cache)?,
                };
                cache.insert(id, partial);
            }
            let root = cache
                .get(tree.root())
                .ok_or(TreeError::MissingNode(tree.root()))?;
            total = total + LogLikelihood::from_probability(root.iter().sum());
        }
        Ok(total)
    }

    /// Resolve each reachable leaf to its genome, indexed by node id.
    fn leaf_genomes(
        &self,
        tree: &PhyloTree,
        order: &[NodeId],
    ) -> Result<Vec<Option<&'a SpeciesGenome>>, LikelihoodError> {
        let mut genomes = vec![None; tree.arena_len()];
        for &id in order {
            let node = tree.node(id)?;
            if node.is_leaf() {
                let genome = self
                    .alignment
                    .get(node.name())
                    .ok_or_else(|| LikelihoodError::UnknownSpecies(node.name().to_string()))?;
                genomes[id.index()] = Some(genome);
            }
        }
        Ok(genomes)
    }

    fn leaf_partial(
        &self,
        tree: &PhyloTree,
        id: NodeId,
        genome: &SpeciesGenome,
        site: usize,
    ) -> Result<Partial, LikelihoodError> {
        let node = tree.node(id)?;
        let observed: Symbol = genome.get(site).ok_or_else(|| LikelihoodError::SiteOutOfRange {
            species: genome.name().to_string(),
            site,
            len: genome.len(),
        })?;
        let mut partial = [0.0; NUM_SYMBOLS];
        partial[observed.index()] = node.params().frequency(observed);
        Ok(partial)
    }

    fn internal_partial(
        tree: &PhyloTree,
        id: NodeId,
        cache: &ScoreCache,
    ) -> Result<Partial, LikelihoodError> {
        let node = tree.node(id)?;
        let [left, right] = node
            .children()
            .ok_or_else(|| TreeError::Malformed(format!("node {id} has no children")))?;
        let l = cache.get(left).ok_or(TreeError::MissingNode(left))?;
        let r = cache.get(right).ok_or(TreeError::MissingNode(right))?;

        let mut partial = [0.0; NUM_SYMBOLS];
        for (j, slot) in partial.iter_mut().enumerate() {
            let mut left_sum = 0.0;
            let mut right_sum = 0.0;
            for k in 0..NUM_SYMBOLS {
                left_sum += node.transition(Side::Left, j, k) * l[k];
                right_sum += node.transition(Side::Right, j, k) * r[k];
            }
            *slot = node.params().frequencies[j] * left_sum * right_sum;
        }
        Ok(partial)
    }
}

use std::fmt;
use std::sync::Arc;

use crate::base::{Symbol, NUM_SYMBOLS};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Label carried by every internal node.
pub const ANCESTOR_LABEL: &str = "Ancestor";

/// Shortest branch length a tree may carry.
pub const MIN_BRANCH_LENGTH: f64 = 0.001;
/// Longest branch length a tree may carry.
pub const MAX_BRANCH_LENGTH: f64 = 1.0;

/// Clamp a branch length into `[MIN_BRANCH_LENGTH, MAX_BRANCH_LENGTH]`.
#[inline]
pub fn clamp_branch_length(length: f64) -> f64 {
    length.clamp(MIN_BRANCH_LENGTH, MAX_BRANCH_LENGTH)
}

/// Index of a node inside the arena of one `PhyloTree`.
///
/// Ids are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which child slot of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Fair coin flip between the two sides.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random::<f64>() < 0.5 {
            Self::Left
        } else {
            Self::Right
        }
    }
}

/// Per-node substitution model: base frequencies and conversion ratios over
/// the 5-symbol alphabet.
///
/// `frequencies` is a probability simplex and every row of `matrix` sums to
/// one. Mutation operators perturb these values and then call
/// [`SubstitutionParams::normalize`] to restore both invariants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionParams {
    /// Prior probability of each symbol, indexed by `Symbol::index`.
    pub frequencies: [f64; NUM_SYMBOLS],
    /// `matrix[from][to]` conversion ratio between symbols.
    pub matrix: [[f64; NUM_SYMBOLS]; NUM_SYMBOLS],
}

impl Default for SubstitutionParams {
    /// Diagonal-heavy starting point; gaps are rare and sticky.
    fn default() -> Self {
        Self {
            frequencies: [0.24, 0.24, 0.24, 0.24, 0.04],
            matrix: [
                // A     C     G     T    gap
                [0.94, 0.02, 0.01, 0.02, 0.01], // A
                [0.02, 0.94, 0.02, 0.01, 0.01], // C
                [0.01, 0.02, 0.94, 0.02, 0.01], // G
                [0.02, 0.01, 0.02, 0.94, 0.01], // T
                [0.01, 0.01, 0.01, 0.01, 0.96], // gap
            ],
        }
    }
}

impl SubstitutionParams {
    /// Probability of moving from `from` to `to` along a branch of the given
    /// length.
    ///
    /// This is a linear model rather than a matrix exponential: staying put
    /// is weighted by `1 - length`, changing by `length`, and either is then
    /// scaled by the conversion ratio.
    #[inline]
    pub fn transition(&self, branch_length: f64, from: usize, to: usize) -> f64 {
        let base = if from == to {
            1.0 - branch_length
        } else {
            branch_length
        };
        base * self.matrix[from][to]
    }

    /// Base frequency of a symbol.
    #[inline]
    pub fn frequency(&self, symbol: Symbol) -> f64 {
        self.frequencies[symbol.index()]
    }

    pub fn frequency_sum(&self) -> f64 {
        self.frequencies.iter().sum()
    }

    pub fn row_sum(&self, row: usize) -> f64 {
        self.matrix[row].iter().sum()
    }

    /// Rescale frequencies and every matrix row to sum to one.
    pub fn normalize(&mut self) {
        let total = self.frequency_sum();
        for f in self.frequencies.iter_mut() {
            *f /= total;
        }
        for row in self.matrix.iter_mut() {
            let sum: f64 = row.iter().sum();
            for cell in row.iter_mut() {
                *cell /= sum;
            }
        }
    }
}

/// One node of a rooted binary phylogenetic tree.
///
/// A node is either a leaf (no children) or strictly binary; the two child
/// ids and their branch lengths are stored together so a one-child node
/// cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    name: Arc<str>,
    params: SubstitutionParams,
    children: Option<[NodeId; 2]>,
    distances: [f64; 2],
    parent: Option<NodeId>,
}

impl TreeNode {
    /// A leaf for the named species with default parameters.
    pub fn leaf(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            params: SubstitutionParams::default(),
            children: None,
            distances: [0.0; 2],
            parent: None,
        }
    }

    /// An internal node over two children.
    pub fn internal(
        left: NodeId,
        right: NodeId,
        distances: [f64; 2],
        params: SubstitutionParams,
    ) -> Self {
        Self {
            name: Arc::from(ANCESTOR_LABEL),
            params,
            children: Some([left, right]),
            distances,
            parent: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }

    pub fn params(&self) -> &SubstitutionParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SubstitutionParams {
        &mut self.params
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Both child ids, or `None` for a leaf.
    #[inline]
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    #[inline]
    pub fn child(&self, side: Side) -> Option<NodeId> {
        self.children.map(|c| c[side.index()])
    }

    /// Branch length to the child on `side` (meaningless for leaves).
    #[inline]
    pub fn distance(&self, side: Side) -> f64 {
        self.distances[side.index()]
    }

    pub fn distances(&self) -> [f64; 2] {
        self.distances
    }

    pub fn set_distance(&mut self, side: Side, length: f64) {
        self.distances[side.index()] = length;
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_child(&mut self, side: Side, child: NodeId) {
        if let Some(children) = self.children.as_mut() {
            children[side.index()] = child;
        }
    }

    pub(crate) fn set_children(&mut self, children: Option<[NodeId; 2]>) {
        self.children = children;
    }

    /// Transition probability along the branch on `side`.
    #[inline]
    pub fn transition(&self, side: Side, from: usize, to: usize) -> f64 {
        self.params.transition(self.distances[side.index()], from, to)
    }
}

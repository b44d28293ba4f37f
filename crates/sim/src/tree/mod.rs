//! Rooted binary phylogenetic trees.
//!
//! A [`PhyloTree`] owns its nodes in an arena and links them with
//! [`NodeId`] indices. Rearrangements may leave unreachable nodes behind in
//! the arena; [`PhyloTree::compact`] rebuilds the arena from the root.

mod node;
mod rearrange;

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::TreeError;

pub use node::{
    clamp_branch_length, NodeId, Side, SubstitutionParams, TreeNode, ANCESTOR_LABEL,
    MAX_BRANCH_LENGTH, MIN_BRANCH_LENGTH,
};
pub use rearrange::{acceptance_probability, MAX_SELECTION_ATTEMPTS};

/// Upper bound (exclusive) for freshly drawn branch lengths.
pub const FRESH_BRANCH_MAX: f64 = 0.1;

/// Draw a branch length for a newly created branch.
#[inline]
pub fn fresh_branch_length<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(MIN_BRANCH_LENGTH..FRESH_BRANCH_MAX)
}

/// A rooted binary tree whose leaves are species.
///
/// `Clone` produces a fully independent deep copy: node ids are local to the
/// arena, so the copy shares nothing with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhyloTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl PhyloTree {
    /// A tree made of a single species leaf.
    pub fn leaf(name: impl Into<Arc<str>>) -> Self {
        Self {
            nodes: vec![TreeNode::leaf(name)],
            root: NodeId::new(0),
        }
    }

    /// Join two trees under a new default-parameter root.
    pub fn join(left: PhyloTree, right: PhyloTree, distances: [f64; 2]) -> Self {
        let mut tree = left;
        let l = tree.root;
        let r = tree.absorb(right);
        let root = tree.push(TreeNode::internal(
            l,
            r,
            distances,
            SubstitutionParams::default(),
        ));
        tree.nodes[l.index()].set_parent(Some(root));
        tree.nodes[r.index()].set_parent(Some(root));
        tree.root = root;
        tree
    }

    /// Build a random topology over the given species.
    ///
    /// Starting from one leaf per species, two parentless nodes are picked
    /// at random and joined under a new ancestor until a single root is left.
    /// Every new branch gets a fresh length in `[0.001, 0.1)`.
    pub fn random<S, R>(species: &[S], rng: &mut R) -> Result<Self, TreeError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        if species.is_empty() {
            return Err(TreeError::NoSpecies);
        }

        let mut nodes: Vec<TreeNode> = Vec::with_capacity(2 * species.len() - 1);
        let mut pool: Vec<NodeId> = Vec::with_capacity(species.len());
        for name in species {
            pool.push(NodeId::new(nodes.len()));
            nodes.push(TreeNode::leaf(name.as_ref()));
        }

        while pool.len() > 1 {
            let left = pool.swap_remove(rng.random_range(0..pool.len()));
            let right = pool.swap_remove(rng.random_range(0..pool.len()));
            let distances = [fresh_branch_length(rng), fresh_branch_length(rng)];

            let id = NodeId::new(nodes.len());
            nodes.push(TreeNode::internal(
                left,
                right,
                distances,
                SubstitutionParams::default(),
            ));
            nodes[left.index()].set_parent(Some(id));
            nodes[right.index()].set_parent(Some(id));
            pool.push(id);
        }

        Ok(Self {
            nodes,
            root: pool[0],
        })
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node, failing if the id is outside the arena.
    #[inline]
    pub fn node(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.nodes.get(id.index()).ok_or(TreeError::MissingNode(id))
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, TreeError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(TreeError::MissingNode(id))
    }

    /// Number of slots in the arena, reachable or not.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids reachable from `start`, parents before children, left before
    /// right.
    pub fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id.index()) else {
                continue;
            };
            order.push(id);
            if order.len() > self.nodes.len() {
                // cycle; validate() reports it
                break;
            }
            if let Some([left, right]) = node.children() {
                stack.push(right);
                stack.push(left);
            }
        }
        order
    }

    /// Node ids reachable from the root in preorder.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root)
    }

    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.preorder().len()
    }

    /// Leaves reachable from the root, left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.nodes[id.index()].is_leaf())
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    pub fn internal_count(&self) -> usize {
        self.node_count() - self.leaf_count()
    }

    /// Species names at the leaves, left to right.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .map(|id| self.nodes[id.index()].name())
            .collect()
    }

    /// All branch lengths of the reachable tree.
    pub fn branch_lengths(&self) -> Vec<f64> {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.nodes[id.index()].children().map(|_| id))
            .flat_map(|id| self.nodes[id.index()].distances())
            .collect()
    }

    /// Which side of `parent` holds `child`.
    pub fn side_of(&self, parent: NodeId, child: NodeId) -> Result<Side, TreeError> {
        match self.node(parent)?.children() {
            Some([left, _]) if left == child => Ok(Side::Left),
            Some([_, right]) if right == child => Ok(Side::Right),
            _ => Err(TreeError::Malformed(format!(
                "node {child} is not a child of {parent}"
            ))),
        }
    }

    /// Length of the branch leading into `id`, or `None` for a root.
    pub fn incoming_length(&self, id: NodeId) -> Result<Option<f64>, TreeError> {
        match self.node(id)?.parent() {
            None => Ok(None),
            Some(parent) => {
                let side = self.side_of(parent, id)?;
                Ok(Some(self.nodes[parent.index()].distance(side)))
            }
        }
    }

    /// Drop every node unreachable from the root and renumber the rest in
    /// preorder. Ids issued before this call are invalidated.
    pub fn compact(&mut self) {
        let nodes = self.copy_nodes_from(self.root);
        self.nodes = nodes;
        self.root = NodeId::new(0);
    }

    /// Independent copy of the subtree rooted at `id`.
    ///
    /// The copy's root has no parent; the incoming branch length is available
    /// from [`PhyloTree::incoming_length`] on the source tree.
    pub fn extract(&self, id: NodeId) -> Result<PhyloTree, TreeError> {
        self.node(id)?;
        Ok(Self {
            nodes: self.copy_nodes_from(id),
            root: NodeId::new(0),
        })
    }

    /// Move every node of `other` into this arena. Returns the new id of
    /// `other`'s root, which is left detached (no parent).
    pub fn absorb(&mut self, other: PhyloTree) -> NodeId {
        let offset = self.nodes.len();
        let shift = |id: NodeId| NodeId::new(id.index() + offset);
        for mut node in other.nodes {
            node.set_children(node.children().map(|[l, r]| [shift(l), shift(r)]));
            node.set_parent(node.parent().map(shift));
            self.nodes.push(node);
        }
        let root = shift(other.root);
        self.nodes[root.index()].set_parent(None);
        root
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TreeNode] {
        &mut self.nodes
    }

    fn copy_nodes_from(&self, start: NodeId) -> Vec<TreeNode> {
        let order = self.preorder_from(start);
        let mut remap = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeId::new(new));
        }

        order
            .iter()
            .map(|old| {
                let mut node = self.nodes[old.index()].clone();
                let parent = if *old == start {
                    None
                } else {
                    node.parent().and_then(|p| remap[p.index()])
                };
                node.set_parent(parent);
                let children = node.children().and_then(|[l, r]| {
                    Some([remap[l.index()]?, remap[r.index()]?])
                });
                node.set_children(children);
                node
            })
            .collect()
    }

    /// Check the structural invariants of the reachable tree: parent links
    /// agree with child links, there are no cycles, branch lengths are in
    /// range, leaf names are unique and internal nodes are exactly one fewer
    /// than leaves.
    pub fn validate(&self) -> Result<(), TreeError> {
        let root = self.node(self.root)?;
        if root.parent().is_some() {
            return Err(TreeError::Malformed("root has a parent".into()));
        }

        let mut visited = vec![false; self.nodes.len()];
        let mut names: HashSet<&str> = HashSet::new();
        let mut leaves = 0usize;
        let mut internals = 0usize;
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if std::mem::replace(&mut visited[id.index()], true) {
                return Err(TreeError::Malformed(format!("node {id} is reachable twice")));
            }

            match node.children() {
                None => {
                    leaves += 1;
                    if !names.insert(node.name()) {
                        return Err(TreeError::Malformed(format!(
                            "species '{}' appears on more than one leaf",
                            node.name()
                        )));
                    }
                }
                Some(children) => {
                    internals += 1;
                    for (child, length) in children.into_iter().zip(node.distances()) {
                        if self.node(child)?.parent() != Some(id) {
                            return Err(TreeError::Malformed(format!(
                                "node {child} does not point back to its parent {id}"
                            )));
                        }
                        if !(MIN_BRANCH_LENGTH..=MAX_BRANCH_LENGTH).contains(&length) {
                            return Err(TreeError::Malformed(format!(
                                "branch {id} -> {child} has length {length}"
                            )));
                        }
                        stack.push(child);
                    }
                }
            }
        }

        if internals + 1 != leaves {
            return Err(TreeError::Malformed(format!(
                "{leaves} leaves but {internals} internal nodes"
            )));
        }
        Ok(())
    }

    /// [`PhyloTree::validate`], plus a check that the leaves are exactly the
    /// given species.
    pub fn validate_species<S: AsRef<str>>(&self, species: &[S]) -> Result<(), TreeError> {
        self.validate()?;
        let expected: HashSet<&str> = species.iter().map(AsRef::as_ref).collect();
        let found: HashSet<&str> = self.leaf_names().into_iter().collect();
        if expected != found || species.len() != found.len() {
            return Err(TreeError::Malformed(format!(
                "tree has {} species, expected {}",
                found.len(),
                species.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    const SPECIES: [&str; 6] = ["homo", "pan", "gorilla", "pongo", "hylobates", "macaca"];

    fn three_species() -> PhyloTree {
        let ab = PhyloTree::join(PhyloTree::leaf("a"), PhyloTree::leaf("b"), [0.1, 0.2]);
        PhyloTree::join(ab, PhyloTree::leaf("c"), [0.3, 0.4])
    }

    #[test]
    fn test_random_tree_shape() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        for _ in 0..20 {
            let tree = PhyloTree::random(&SPECIES, &mut rng).unwrap();
            assert_eq!(tree.leaf_count(), SPECIES.len());
            assert_eq!(tree.internal_count(), SPECIES.len() - 1);
            tree.validate_species(&SPECIES).unwrap();
            for b in tree.branch_lengths() {
                assert!((MIN_BRANCH_LENGTH..FRESH_BRANCH_MAX).contains(&b));
            }
        }
    }

    #[test]
    fn test_random_tree_edge_cases() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let empty: [&str; 0] = [];
        assert_eq!(PhyloTree::random(&empty, &mut rng), Err(TreeError::NoSpecies));

        let single = PhyloTree::random(&["solo"], &mut rng).unwrap();
        assert_eq!(single.node_count(), 1);
        assert_eq!(single.leaf_names(), vec!["solo"]);
    }

    #[test]
    fn test_join_layout() {
        let tree = three_species();
        tree.validate().unwrap();
        assert_eq!(tree.leaf_names(), vec!["a", "b", "c"]);
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.distances(), [0.3, 0.4]);
        assert_eq!(root.name(), ANCESTOR_LABEL);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = three_species();
        let mut copy = original.clone();
        let root = copy.root();
        copy.node_mut(root).unwrap().set_distance(Side::Left, 0.9);
        copy.node_mut(root).unwrap().params_mut().frequencies[0] = 0.5;

        let src = original.node(original.root()).unwrap();
        assert_eq!(src.distance(Side::Left), 0.3);
        assert_eq!(src.params().frequencies[0], 0.24);
    }

    #[test]
    fn test_extract_and_absorb() {
        let tree = three_species();
        let root = tree.node(tree.root()).unwrap();
        let ab = root.child(Side::Left).unwrap();

        let piece = tree.extract(ab).unwrap();
        assert_eq!(piece.leaf_names(), vec!["a", "b"]);
        assert_eq!(piece.node(piece.root()).unwrap().parent(), None);
        assert_eq!(tree.incoming_length(ab).unwrap(), Some(0.3));

        let mut host = PhyloTree::leaf("z");
        let new_root = host.absorb(piece);
        assert_eq!(host.arena_len(), 4);
        assert_eq!(host.preorder_from(new_root).len(), 3);
        assert_eq!(host.node(new_root).unwrap().parent(), None);
    }

    #[test]
    fn test_compact_drops_unreachable() {
        let mut tree = three_species();
        let orphan = tree.absorb(PhyloTree::leaf("ghost"));
        assert!(tree.node(orphan).is_ok());
        assert_eq!(tree.arena_len(), 6);

        tree.compact();
        assert_eq!(tree.arena_len(), 5);
        assert_eq!(tree.root(), NodeId::new(0));
        tree.validate().unwrap();
        assert_eq!(tree.leaf_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_validate_rejects_bad_branch() {
        let mut tree = three_species();
        let root = tree.root();
        tree.node_mut(root).unwrap().set_distance(Side::Right, 0.0);
        assert!(matches!(tree.validate(), Err(TreeError::Malformed(_))));
    }

    #[test]
    fn test_validate_species_mismatch() {
        let tree = three_species();
        assert!(tree.validate_species(&["a", "b", "c"]).is_ok());
        assert!(tree.validate_species(&["a", "b", "d"]).is_err());
        assert!(tree.validate_species(&["a", "b"]).is_err());
    }

    #[test]
    fn test_missing_node() {
        let tree = three_species();
        let id = NodeId::new(99);
        assert_eq!(tree.node(id).unwrap_err(), TreeError::MissingNode(id));
    }
}

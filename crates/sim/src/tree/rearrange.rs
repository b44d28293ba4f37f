//! Structural primitives behind topology mutation and crossover: random
//! node sampling, subtree detachment and reinsertion, and species pruning.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use super::{fresh_branch_length, NodeId, PhyloTree, Side, SubstitutionParams, TreeNode};
use crate::errors::TreeError;

/// Retry bound for the random node sampler.
pub const MAX_SELECTION_ATTEMPTS: usize = 1_000_000;

/// Per-node acceptance probability that makes a full tree over
/// `num_species` leaves roughly uniform to sample: `1 / (2n - 1)`.
pub fn acceptance_probability(num_species: usize) -> f64 {
    1.0 / (2 * num_species.max(1) - 1) as f64
}

impl PhyloTree {
    /// One randomized walk from the root.
    ///
    /// Each visited node is returned with probability `accept`; otherwise a
    /// fair coin picks which child to descend into first, and the other child
    /// is tried if that branch yields nothing. Returns `None` when the walk
    /// falls off every leaf without accepting.
    pub fn pick_random_node<R: Rng + ?Sized>(&self, accept: f64, rng: &mut R) -> Option<NodeId> {
        self.walk(self.root(), accept, rng)
    }

    fn walk<R: Rng + ?Sized>(&self, id: NodeId, accept: f64, rng: &mut R) -> Option<NodeId> {
        if rng.random::<f64>() < accept {
            return Some(id);
        }
        let [left, right] = self.node(id).ok()?.children()?;
        let (first, second) = match Side::random(rng) {
            Side::Left => (left, right),
            Side::Right => (right, left),
        };
        self.walk(first, accept, rng)
            .or_else(|| self.walk(second, accept, rng))
    }

    /// Repeat [`PhyloTree::pick_random_node`] until it yields a node.
    pub fn sample_node<R: Rng + ?Sized>(
        &self,
        accept: f64,
        rng: &mut R,
    ) -> Result<NodeId, TreeError> {
        self.sample_where(accept, rng, |_| true)
    }

    /// Repeat [`PhyloTree::pick_random_node`] until it yields a node other
    /// than the root.
    pub fn sample_non_root<R: Rng + ?Sized>(
        &self,
        accept: f64,
        rng: &mut R,
    ) -> Result<NodeId, TreeError> {
        if self.node(self.root())?.is_leaf() {
            return Err(TreeError::Malformed(
                "a single-leaf tree has no non-root node".into(),
            ));
        }
        let root = self.root();
        self.sample_where(accept, rng, |id| id != root)
    }

    fn sample_where<R, F>(&self, accept: f64, rng: &mut R, keep: F) -> Result<NodeId, TreeError>
    where
        R: Rng + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        for _ in 0..MAX_SELECTION_ATTEMPTS {
            if let Some(id) = self.pick_random_node(accept, rng) {
                if keep(id) {
                    return Ok(id);
                }
            }
        }
        Err(TreeError::SelectionExhausted {
            attempts: MAX_SELECTION_ATTEMPTS,
        })
    }

    /// Cut `id` out of the tree and return the length of its old incoming
    /// branch.
    ///
    /// The sibling of `id` takes its parent's place. When the parent was the
    /// root the sibling becomes the new root; otherwise the branch from the
    /// grandparent becomes the mean of the grandparent-to-parent and
    /// parent-to-sibling lengths. The detached subtree and the old parent stay
    /// in the arena, unreachable, until the next [`PhyloTree::compact`].
    pub fn detach(&mut self, id: NodeId) -> Result<f64, TreeError> {
        let parent = self
            .node(id)?
            .parent()
            .ok_or_else(|| TreeError::Malformed(format!("cannot detach the root {id}")))?;
        let side = self.side_of(parent, id)?;
        let parent_node = self.node(parent)?;
        let carried = parent_node.distance(side);
        let sibling = parent_node
            .child(side.opposite())
            .ok_or_else(|| TreeError::Malformed(format!("parent {parent} is a leaf")))?;
        let sibling_length = parent_node.distance(side.opposite());
        let grandparent = parent_node.parent();

        match grandparent {
            None => {
                self.node_mut(sibling)?.set_parent(None);
                self.set_root(sibling);
            }
            Some(gp) => {
                let gp_side = self.side_of(gp, parent)?;
                let gp_node = self.node_mut(gp)?;
                let merged = (gp_node.distance(gp_side) + sibling_length) / 2.0;
                gp_node.set_child(gp_side, sibling);
                gp_node.set_distance(gp_side, merged);
                self.node_mut(sibling)?.set_parent(Some(gp));
            }
        }

        self.node_mut(parent)?.set_parent(None);
        self.node_mut(id)?.set_parent(None);
        Ok(carried)
    }

    /// Attach the parentless subtree `subtree` at a randomly sampled point of
    /// the reachable tree, with `carried` as its incoming branch length.
    pub fn insert_subtree<R: Rng + ?Sized>(
        &mut self,
        subtree: NodeId,
        carried: f64,
        accept: f64,
        rng: &mut R,
    ) -> Result<(), TreeError> {
        let location = self.sample_node(accept, rng)?;
        self.insert_at(subtree, location, carried, rng)
    }

    /// Attach the parentless subtree `subtree` next to `location`.
    ///
    /// A non-root leaf location is replaced by its parent. A root leaf gets
    /// a new default-parameter root over `(subtree, old root)`. Otherwise a
    /// coin picks one child slot of the location; a new node copying the
    /// location's parameters takes the slot and adopts `(subtree, bumped
    /// child)`, with the bumped child keeping its old branch length.
    pub fn insert_at<R: Rng + ?Sized>(
        &mut self,
        subtree: NodeId,
        location: NodeId,
        carried: f64,
        rng: &mut R,
    ) -> Result<(), TreeError> {
        if self.node(subtree)?.parent().is_some() {
            return Err(TreeError::Malformed(format!(
                "subtree {subtree} is still attached"
            )));
        }

        let mut location = location;
        let loc_node = self.node(location)?;
        if loc_node.is_leaf() {
            if let Some(parent) = loc_node.parent() {
                location = parent;
            }
        }

        let loc_node = self.node(location)?;
        let Some(children) = loc_node.children() else {
            // root leaf
            let old_root = location;
            let new_root = self.push(TreeNode::internal(
                subtree,
                old_root,
                [carried, fresh_branch_length(rng)],
                SubstitutionParams::default(),
            ));
            self.node_mut(subtree)?.set_parent(Some(new_root));
            self.node_mut(old_root)?.set_parent(Some(new_root));
            self.set_root(new_root);
            return Ok(());
        };

        let side = Side::random(rng);
        let bumped = children[side.index()];
        let bumped_length = loc_node.distance(side);
        let params = *loc_node.params();

        let inserted = self.push(TreeNode::internal(
            subtree,
            bumped,
            [carried, bumped_length],
            params,
        ));
        let inserted_node = self.node_mut(inserted)?;
        inserted_node.set_parent(Some(location));
        self.node_mut(location)?.set_child(side, inserted);
        self.node_mut(subtree)?.set_parent(Some(inserted));
        self.node_mut(bumped)?.set_parent(Some(inserted));
        Ok(())
    }

    /// Names of every species in the subtree rooted at `id`.
    pub fn capture_species(&self, id: NodeId) -> Result<Vec<Arc<str>>, TreeError> {
        self.node(id)?;
        Ok(self
            .preorder_from(id)
            .into_iter()
            .filter_map(|n| {
                let node = self.node(n).ok()?;
                node.is_leaf().then(|| node.name_arc().clone())
            })
            .collect())
    }

    /// Detach every leaf whose species is in `species`. Returns how many
    /// leaves were removed. The arena is compacted afterwards.
    pub fn remove_species<S: AsRef<str>>(&mut self, species: &[S]) -> Result<usize, TreeError> {
        let wanted: HashSet<&str> = species.iter().map(AsRef::as_ref).collect();
        let doomed: Vec<NodeId> = self
            .leaves()
            .into_iter()
            .filter(|&id| {
                self.node(id)
                    .map(|n| wanted.contains(n.name()))
                    .unwrap_or(false)
            })
            .collect();

        for &leaf in &doomed {
            self.detach(leaf)?;
        }
        self.compact();
        Ok(doomed.len())
    }
}

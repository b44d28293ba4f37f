//! Newick rendering of trees.
//!
//! A leaf is written as its species name. An internal node is written as
//! `(left:dl,right:dr)` with both branch lengths at five decimals, and the
//! whole tree is terminated by `;`.

use phylevo_sim::errors::TreeError;
use phylevo_sim::tree::{NodeId, PhyloTree, Side};

/// Render `tree` in Newick format.
pub fn to_newick(tree: &PhyloTree) -> Result<String, TreeError> {
    let mut out = String::with_capacity(16 * tree.arena_len());
    write_node(tree, tree.root(), &mut out)?;
    out.push(';');
    Ok(out)
}

fn write_node(tree: &PhyloTree, id: NodeId, out: &mut String) -> Result<(), TreeError> {
    let node = tree.node(id)?;
    match node.children() {
        None => out.push_str(node.name()),
        Some([left, right]) => {
            out.push('(');
            write_node(tree, left, out)?;
            out.push_str(&format!(":{:.5},", node.distance(Side::Left)));
            write_node(tree, right, out)?;
            out.push_str(&format!(":{:.5})", node.distance(Side::Right)));
        }
    }
    Ok(())
}

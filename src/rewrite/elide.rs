//! Unary combinator elision.
//!
//! `OP(child)|t` is replaced by `child` with threshold `max(t, child)`.
//! Chains of unary combinators are folded in one go.

use crate::rewrite::RewriteError;
use crate::spec::{NodeId, NodeKind, SpecTree};
use log::debug;

pub fn elide_unary(tree: &mut SpecTree) -> Result<(), RewriteError> {
    let root = tree.root();
    let root = lift(tree, root);
    tree.set_root(root);
    elide_children(tree, root)
}

/// Follow unary combinators down from `id`, carrying the strictest threshold,
/// and return the first node that is not one.
fn lift(tree: &mut SpecTree, mut id: NodeId) -> NodeId {
    loop {
        let node = tree.node(id);
        let child = match (&node.kind, node.children.as_slice()) {
            (NodeKind::Combinator(_), &[child]) => child,
            _ => return id,
        };
        let threshold = node.threshold.max(tree.node(child).threshold);
        debug!("elide: {} folded into {} at threshold {}", id, child, threshold);
        tree.node_mut(child).threshold = threshold;
        id = child;
    }
}

fn elide_children(tree: &mut SpecTree, id: NodeId) -> Result<(), RewriteError> {
    let node = tree.node(id);
    if let NodeKind::Combinator(op) = node.kind {
        if node.children.is_empty() {
            return Err(RewriteError::shape(id, format!("{} without children", op)));
        }
    }

    let children = node.children.clone();
    for (i, child) in children.into_iter().enumerate() {
        let survivor = lift(tree, child);
        tree.node_mut(id).children[i] = survivor;
        elide_children(tree, survivor)?;
    }
    Ok(())
}

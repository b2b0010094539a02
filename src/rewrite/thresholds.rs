//! Threshold normalization.
//!
//! A combinator whose threshold is no stricter than its weakest child cannot
//! reject a pair the children let through, so its threshold is reset to 0.

use crate::rewrite::RewriteError;
use crate::spec::{NodeId, NodeKind, SpecTree};
use log::debug;

pub fn normalize(tree: &mut SpecTree) -> Result<(), RewriteError> {
    let root = tree.root();
    normalize_node(tree, root)
}

fn normalize_node(tree: &mut SpecTree, id: NodeId) -> Result<(), RewriteError> {
    let node = tree.node(id);
    if !(0.0..=1.0).contains(&node.threshold) {
        return Err(RewriteError::shape(
            id,
            format!("threshold {} outside [0,1]", node.threshold),
        ));
    }

    match node.kind {
        NodeKind::Atomic { .. } | NodeKind::Empty => Ok(()),
        NodeKind::Combinator(op) => {
            let children = node.children.clone();
            let min = children
                .iter()
                .map(|&c| tree.node(c).threshold)
                .reduce(f64::min)
                .ok_or_else(|| RewriteError::shape(id, format!("{} without children", op)))?;

            let threshold = tree.node(id).threshold;
            if threshold > 0.0 && threshold <= min {
                debug!("thresholds: {} {} {} -> 0 (children min {})", op, id, threshold, min);
                tree.node_mut(id).threshold = 0.0;
            }

            for child in children {
                normalize_node(tree, child)?;
            }
            Ok(())
        }
    }
}

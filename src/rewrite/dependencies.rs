//! Containment analysis between nodes.
//!
//! `a` depends on `b` when every link `b` produces is also produced by `a`.
//! Leaves get their edges by comparing measures over identical property
//! paths; combinators inherit edges from their children:
//! - AND: edges shared by all children (the intersection still contains `b`)
//! - OR: edges of any child (the union contains whatever one child contains)
//!
//! This pass only writes `dependencies`; it never touches `children`.

use crate::rewrite::{MeasureRules, RewriteError};
use crate::spec::{Comparison, NodeId, NodeKind, Operator, SpecTree};
use log::debug;
use std::collections::BTreeSet;

pub fn compute(tree: &mut SpecTree, rules: &MeasureRules) -> Result<(), RewriteError> {
    compute_atomic(tree, rules)?;
    let root = tree.root();
    propagate(tree, root);
    Ok(())
}

/// Reset every node's edges and derive leaf-to-leaf edges.
pub fn compute_atomic(tree: &mut SpecTree, rules: &MeasureRules) -> Result<(), RewriteError> {
    tree.clear_dependencies();

    let mut leaves: Vec<(NodeId, Comparison, f64)> = Vec::new();
    for id in tree.all_leaves() {
        let node = tree.node(id);
        let filter = node
            .filter()
            .ok_or_else(|| RewriteError::shape(id, "leaf without filter"))?;
        leaves.push((id, Comparison::parse(filter)?, node.threshold));
    }

    for (source, src_cmp, t_source) in &leaves {
        for (target, dst_cmp, t_target) in &leaves {
            if source == target || src_cmp.properties() != dst_cmp.properties() {
                continue;
            }
            if rules.contains(&src_cmp.measure, *t_source, &dst_cmp.measure, *t_target) {
                debug!(
                    "dependencies: {}({}) {} contains {}({}) {}",
                    src_cmp.measure, t_source, source, dst_cmp.measure, t_target, target
                );
                tree.add_dependency(*source, *target);
            }
        }
    }
    Ok(())
}

/// Post-order propagation of leaf edges to combinators.
pub fn propagate(tree: &mut SpecTree, id: NodeId) {
    let op = match tree.node(id).kind {
        NodeKind::Combinator(op) => op,
        NodeKind::Atomic { .. } | NodeKind::Empty => return,
    };

    let children = tree.node(id).children.clone();
    for &child in &children {
        propagate(tree, child);
    }

    let mut child_sets = children.iter().map(|&c| &tree.node(c).dependencies);
    let candidates: BTreeSet<NodeId> = match op {
        Operator::And => match child_sets.next() {
            Some(first) => child_sets.fold(first.clone(), |acc, deps| {
                acc.intersection(deps).copied().collect()
            }),
            None => BTreeSet::new(),
        },
        Operator::Or => child_sets.flatten().copied().collect(),
        Operator::Minus | Operator::Xor => BTreeSet::new(),
    };

    let threshold = tree.node(id).threshold;
    let kept: BTreeSet<NodeId> = candidates
        .into_iter()
        .filter(|&d| threshold == 0.0 || tree.node(d).threshold > threshold)
        .collect();

    if !kept.is_empty() {
        debug!("dependencies: {} {} inherits {:?}", op, id, kept);
    }
    tree.node_mut(id).dependencies = kept;
}

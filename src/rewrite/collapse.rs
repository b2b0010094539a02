//! Drop AND/OR children made redundant by the dependency relation.
//!
//! With `a` depending on `b` (links of `b` ⊆ links of `a`) and both children
//! of the same node:
//! - AND: `a` adds no constraint beyond `b`, so `a` goes.
//! - OR: `a` already yields every link of `b`, so `b` goes.
//!
//! Only surviving children are considered, and the last child of a node is
//! never removed, which keeps dependency cycles from emptying a node.

use crate::rewrite::RewriteError;
use crate::spec::{NodeId, NodeKind, Operator, SpecTree};
use log::debug;

/// Expects dependencies computed on the current shape of `tree`.
pub fn collapse(tree: &mut SpecTree) -> Result<(), RewriteError> {
    let root = tree.root();
    collapse_node(tree, root)
}

fn collapse_node(tree: &mut SpecTree, id: NodeId) -> Result<(), RewriteError> {
    let op = match tree.node(id).kind {
        NodeKind::Combinator(op) => op,
        NodeKind::Atomic { .. } | NodeKind::Empty => return Ok(()),
    };

    let children = tree.node(id).children.clone();
    if children.is_empty() {
        return Err(RewriteError::shape(id, format!("{} without children", op)));
    }

    let mut alive = children.clone();
    match op {
        Operator::And => {
            for &child in &children {
                if alive.len() <= 1 {
                    break;
                }
                let redundant = tree
                    .node(child)
                    .dependencies
                    .iter()
                    .any(|&d| d != child && alive.contains(&d));
                if redundant {
                    debug!("collapse: AND {} drops {}", id, child);
                    alive.retain(|&c| c != child);
                }
            }
        }
        Operator::Or => {
            for &child in &children {
                if !alive.contains(&child) {
                    continue;
                }
                for &dep in &tree.node(child).dependencies {
                    if alive.len() <= 1 {
                        break;
                    }
                    if dep != child && alive.contains(&dep) {
                        debug!("collapse: OR {} drops {} (covered by {})", id, dep, child);
                        alive.retain(|&c| c != dep);
                    }
                }
            }
        }
        Operator::Minus | Operator::Xor => {}
    }

    tree.node_mut(id).children = alive.clone();
    for child in alive {
        collapse_node(tree, child)?;
    }
    Ok(())
}

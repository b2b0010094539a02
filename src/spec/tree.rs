//! Arena-backed link specification tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by `NodeId`. Rewrite
//! passes detach nodes by dropping them from a parent's `children`; the node
//! itself stays in the arena, so dependency edges that still name it remain
//! valid ids that simply no longer match any sibling.

use crate::Result;
use crate::spec::NodeId;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Set operator of a combinator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
    Minus,
    Xor,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Minus => "MINUS",
            Operator::Xor => "XOR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf comparing one measure over two property paths.
    Atomic { filter: String },
    Combinator(Operator),
    /// Degenerate sentinel, left alone by every pass.
    Empty,
}

#[derive(Debug, Clone)]
pub struct SpecNode {
    pub kind: NodeKind,
    pub threshold: f64,
    pub children: Vec<NodeId>,
    /// Nodes whose link set is known to be contained in this node's link set.
    pub dependencies: BTreeSet<NodeId>,
}

impl SpecNode {
    fn new(kind: NodeKind, threshold: f64, children: Vec<NodeId>) -> Self {
        Self {
            kind,
            threshold,
            children,
            dependencies: BTreeSet::new(),
        }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self.kind, NodeKind::Atomic { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, NodeKind::Empty)
    }

    pub fn filter(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Atomic { filter } => Some(filter),
            _ => None,
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self.kind {
            NodeKind::Combinator(op) => Some(op),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpecTree {
    nodes: Vec<SpecNode>,
    root: NodeId,
}

impl SpecTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn node(&self, id: NodeId) -> &SpecNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SpecNode {
        &mut self.nodes[id.index()]
    }

    /// Number of slots in the arena, detached nodes included.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_atomic(&self, id: NodeId) -> bool {
        self.node(id).is_atomic()
    }

    /// True when the root is the `Empty` sentinel.
    pub fn is_empty(&self) -> bool {
        self.node(self.root).is_empty()
    }

    /// Number of nodes reachable from the root.
    pub fn size(&self) -> usize {
        self.reachable().len()
    }

    /// Reachable nodes in depth-first pre-order.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    /// Every reachable atomic node, depth-first, left to right.
    pub fn all_leaves(&self) -> Vec<NodeId> {
        self.reachable()
            .into_iter()
            .filter(|&id| self.is_atomic(id))
            .collect()
    }

    /// Record that `to`'s link set is contained in `from`'s. Idempotent.
    pub fn add_dependency(&mut self, from: NodeId, to: NodeId) -> bool {
        self.node_mut(from).dependencies.insert(to)
    }

    pub fn clear_dependencies(&mut self) {
        for node in &mut self.nodes {
            node.dependencies.clear();
        }
    }

    /// Copy of the tree holding only reachable nodes, renumbered in
    /// pre-order. Dependencies are not carried over.
    pub fn compact(&self) -> SpecTree {
        let order = self.reachable();
        let remap: BTreeMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, NodeId::new(i)))
            .collect();

        let nodes = order
            .iter()
            .map(|&id| {
                let node = self.node(id);
                SpecNode::new(
                    node.kind.clone(),
                    node.threshold,
                    node.children.iter().map(|c| remap[c]).collect(),
                )
            })
            .collect();

        SpecTree {
            nodes,
            root: NodeId::new(0),
        }
    }

    fn fmt_node(&self, id: NodeId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node(id);
        match &node.kind {
            NodeKind::Atomic { filter } => write!(f, "{}", filter)?,
            NodeKind::Empty => f.write_str("EMPTY")?,
            NodeKind::Combinator(op) => {
                write!(f, "{}(", op)?;
                for (i, &child) in node.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    self.fmt_node(child, f)?;
                }
                f.write_str(")")?;
            }
        }
        write!(f, "|{}", node.threshold)
    }
}

/// Canonical text form, e.g. `AND(trigram(x.a,y.a)|0.5,jaccard(x.b,y.b)|0.4)|0`.
impl fmt::Display for SpecTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(self.root, f)
    }
}

/// Incremental constructor; `finish` checks the tree invariants.
#[derive(Debug, Default)]
pub struct SpecBuilder {
    nodes: Vec<SpecNode>,
}

impl SpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: SpecNode) -> NodeId {
        self.nodes.push(node);
        NodeId::new(self.nodes.len() - 1)
    }

    pub fn atomic(&mut self, filter: impl Into<String>, threshold: f64) -> NodeId {
        let kind = NodeKind::Atomic {
            filter: filter.into(),
        };
        self.push(SpecNode::new(kind, threshold, Vec::new()))
    }

    pub fn combinator(&mut self, op: Operator, threshold: f64, children: Vec<NodeId>) -> NodeId {
        self.push(SpecNode::new(NodeKind::Combinator(op), threshold, children))
    }

    pub fn empty(&mut self, threshold: f64) -> NodeId {
        self.push(SpecNode::new(NodeKind::Empty, threshold, Vec::new()))
    }

    /// Validate and seal the tree rooted at `root`:
    /// - every threshold is a number in [0,1]
    /// - atomic and empty nodes have no children, combinators have some
    /// - child ids exist and every node has at most one parent
    /// - the root is nobody's child
    pub fn finish(self, root: NodeId) -> Result<SpecTree> {
        let nodes = self.nodes;
        if root.index() >= nodes.len() {
            bail!("root {} is not a node of this builder", root);
        }

        let mut parent: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for (i, node) in nodes.iter().enumerate() {
            let id = NodeId::new(i);

            if !(0.0..=1.0).contains(&node.threshold) {
                bail!("node {} has threshold {} outside [0,1]", id, node.threshold);
            }

            match &node.kind {
                NodeKind::Atomic { filter } => {
                    if filter.trim().is_empty() {
                        bail!("atomic node {} has an empty filter", id);
                    }
                    if !node.children.is_empty() {
                        bail!("atomic node {} must not have children", id);
                    }
                }
                NodeKind::Empty => {
                    if !node.children.is_empty() {
                        bail!("empty node {} must not have children", id);
                    }
                }
                NodeKind::Combinator(op) => {
                    if node.children.is_empty() {
                        bail!("{} node {} has no children", op, id);
                    }
                }
            }

            for &child in &node.children {
                if child.index() >= nodes.len() {
                    bail!("node {} references missing child {}", id, child);
                }
                if child == root {
                    bail!("root {} is used as a child of node {}", root, id);
                }
                if let Some(prev) = parent.insert(child, id) {
                    bail!(
                        "node {} is shared by parents {} and {}",
                        child,
                        prev,
                        id
                    );
                }
            }
        }

        Ok(SpecTree { nodes, root })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> SpecTree {
        let mut b = SpecBuilder::new();
        let l1 = b.atomic("trigram(x.label,y.label)", 0.5);
        let l2 = b.atomic("jaccard(x.authors,y.authors)", 0.4);
        let l3 = b.atomic("cosine(x.title,y.title)", 0.8);
        let or = b.combinator(Operator::Or, 0.0, vec![l2, l3]);
        let root = b.combinator(Operator::And, 0.3, vec![l1, or]);
        b.finish(root).unwrap()
    }

    #[test]
    fn size_counts_leaves_and_combinators() {
        assert_eq!(sample().size(), 5);
    }

    #[test]
    fn leaves_are_collected_depth_first() {
        let tree = sample();
        let filters: Vec<&str> = tree
            .all_leaves()
            .into_iter()
            .filter_map(|id| tree.node(id).filter())
            .collect();
        assert_eq!(
            filters,
            vec![
                "trigram(x.label,y.label)",
                "jaccard(x.authors,y.authors)",
                "cosine(x.title,y.title)",
            ]
        );
    }

    #[test]
    fn add_dependency_is_idempotent() {
        let mut tree = sample();
        let leaves = tree.all_leaves();
        assert!(tree.add_dependency(leaves[0], leaves[1]));
        assert!(!tree.add_dependency(leaves[0], leaves[1]));
        assert_eq!(tree.node(leaves[0]).dependencies.len(), 1);
    }

    #[test]
    fn display_is_canonical_text() {
        assert_eq!(
            sample().to_string(),
            "AND(trigram(x.label,y.label)|0.5,OR(jaccard(x.authors,y.authors)|0.4,cosine(x.title,y.title)|0.8)|0)|0.3"
        );
    }

    #[test]
    fn compact_drops_detached_nodes() {
        let mut tree = sample();
        let root = tree.root();
        let first = tree.node(root).children[0];
        tree.node_mut(root).children = vec![first];
        tree.add_dependency(first, first);

        let compacted = tree.compact();
        assert_eq!(compacted.arena_len(), 2);
        assert_eq!(compacted.to_string(), "AND(trigram(x.label,y.label)|0.5)|0.3");
        assert!(compacted.reachable().iter().all(|&id| compacted.node(id).dependencies.is_empty()));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut b = SpecBuilder::new();
        let leaf = b.atomic("trigram(x.a,y.a)", 1.5);
        assert!(b.finish(leaf).is_err());

        let mut b = SpecBuilder::new();
        let leaf = b.atomic("trigram(x.a,y.a)", f64::NAN);
        assert!(b.finish(leaf).is_err());
    }

    #[test]
    fn rejects_childless_combinator() {
        let mut b = SpecBuilder::new();
        let root = b.combinator(Operator::Or, 0.0, vec![]);
        assert!(b.finish(root).is_err());
    }

    #[test]
    fn rejects_shared_children() {
        let mut b = SpecBuilder::new();
        let leaf = b.atomic("trigram(x.a,y.a)", 0.5);
        let left = b.combinator(Operator::And, 0.0, vec![leaf]);
        let right = b.combinator(Operator::Or, 0.0, vec![leaf]);
        let root = b.combinator(Operator::And, 0.0, vec![left, right]);
        let err = b.finish(root).unwrap_err();
        assert!(err.to_string().contains("shared"));
    }

    #[test]
    fn empty_root_is_reported() {
        let mut b = SpecBuilder::new();
        let root = b.empty(0.0);
        let tree = b.finish(root).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.to_string(), "EMPTY|0");
    }
}

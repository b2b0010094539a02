//! Report model: serializable views of a rewrite run and of the dependency
//! relation of a specification.

use crate::rewrite::{RewritePassFailure, Rewritten};
use crate::spec::{Comparison, NodeKind, RawSpec, SpecTree};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FailureView {
    pub pass: String,
    pub iteration: usize,
    pub message: String,
}

impl From<&RewritePassFailure> for FailureView {
    fn from(failure: &RewritePassFailure) -> Self {
        Self {
            pass: failure.pass.to_string(),
            iteration: failure.iteration,
            message: failure.source.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RewriteReport {
    pub input: String,
    pub output: String,
    pub input_size: usize,
    pub output_size: usize,
    pub iterations: usize,
    pub failure: Option<FailureView>,

    /// Rewritten tree in document form, ready to be loaded again.
    pub spec: RawSpec,
}

pub fn build_rewrite_report(input: &SpecTree, out: &Rewritten) -> RewriteReport {
    RewriteReport {
        input: input.to_string(),
        output: out.tree.to_string(),
        input_size: input.size(),
        output_size: out.tree.size(),
        iterations: out.iterations,
        failure: out.failure.as_ref().map(FailureView::from),
        spec: RawSpec::from_tree(&out.tree),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: String,
    /// Filter token for leaves, operator name for combinators.
    pub label: String,
    pub threshold: f64,
    pub measure: Option<String>,
    pub properties: Option<[String; 2]>,
    /// Ids of the nodes whose links this node is known to contain.
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub spec: String,
    pub size: usize,
    pub nodes: Vec<NodeView>,
}

/// Expects `tree` to have gone through `Rewriter::analyze`.
pub fn build_inspect_report(tree: &SpecTree) -> InspectReport {
    let nodes = tree
        .reachable()
        .into_iter()
        .map(|id| {
            let node = tree.node(id);
            let label = match &node.kind {
                NodeKind::Atomic { filter } => filter.clone(),
                NodeKind::Combinator(op) => op.to_string(),
                NodeKind::Empty => "EMPTY".to_string(),
            };
            let comparison = node.filter().and_then(|f| Comparison::parse(f).ok());

            NodeView {
                id: id.to_string(),
                label,
                threshold: node.threshold,
                measure: comparison.as_ref().map(|c| c.measure.clone()),
                properties: comparison.map(|c| [c.left, c.right]),
                dependencies: node.dependencies.iter().map(|d| d.to_string()).collect(),
            }
        })
        .collect();

    InspectReport {
        spec: tree.to_string(),
        size: tree.size(),
        nodes,
    }
}

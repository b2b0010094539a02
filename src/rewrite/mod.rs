//! Fixed-point rewriter for link specification trees.
//!
//! One iteration runs four passes over a working copy of the tree:
//! 1) thresholds: zero combinator thresholds that cannot reject anything
//! 2) dependencies: recompute the containment relation between nodes
//! 3) collapse: drop AND/OR children made redundant by that relation
//! 4) elide: fold unary combinators into their only child
//!
//! Iterations repeat while the tree keeps shrinking. A failing pass ends the
//! loop; the caller still gets the last tree that came out of a complete
//! iteration, plus a diagnostic.

pub mod collapse;
pub mod dependencies;
pub mod elide;
pub mod rules;
pub mod thresholds;

pub use rules::{Bound, MeasureRule, MeasureRules};

use crate::spec::{MalformedFilterError, NodeId, SpecTree};
use log::{debug, info, warn};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewriteError {
    #[error(transparent)]
    MalformedFilter(#[from] MalformedFilterError),

    #[error("inconsistent node {node}: {reason}")]
    Shape { node: NodeId, reason: String },
}

impl RewriteError {
    pub(crate) fn shape(node: NodeId, reason: impl Into<String>) -> Self {
        RewriteError::Shape {
            node,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Thresholds,
    Dependencies,
    Collapse,
    Elide,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Thresholds => "thresholds",
            Pass::Dependencies => "dependencies",
            Pass::Collapse => "collapse",
            Pass::Elide => "elide",
        })
    }
}

/// Which pass failed, in which iteration, and why.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{pass} pass failed in iteration {iteration}: {source}")]
pub struct RewritePassFailure {
    pub pass: Pass,
    pub iteration: usize,
    #[source]
    pub source: RewriteError,
}

#[derive(Debug, Clone, Default)]
pub struct RewriterConfig {
    /// Stop after this many iterations even if the tree still shrinks.
    pub max_iterations: Option<usize>,
    pub rules: MeasureRules,
}

/// Result of a rewrite session. `tree` is always a valid specification.
#[derive(Debug, Clone)]
pub struct Rewritten {
    pub tree: SpecTree,
    /// Iterations that ran to completion.
    pub iterations: usize,
    pub failure: Option<RewritePassFailure>,
}

impl Rewritten {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    config: RewriterConfig,
}

impl Rewriter {
    pub fn new(config: RewriterConfig) -> Self {
        Self { config }
    }

    /// Rewrite `tree` until it stops shrinking.
    pub fn rewrite(&self, tree: SpecTree) -> Rewritten {
        if tree.is_empty() {
            debug!("rewrite: empty specification, nothing to do");
            return Rewritten {
                tree,
                iterations: 0,
                failure: None,
            };
        }

        let input_size = tree.size();
        let mut best = tree;
        let mut size = input_size;
        let mut iterations = 0;

        loop {
            let iteration = iterations + 1;
            let mut candidate = best.clone();

            if let Err(failure) = self.run_iteration(&mut candidate, iteration) {
                warn!("rewrite aborted: {}", failure);
                // Untouched input when nothing completed.
                let tree = if iterations == 0 { best } else { best.compact() };
                return Rewritten {
                    tree,
                    iterations,
                    failure: Some(failure),
                };
            }

            let new_size = candidate.size();
            debug!(
                "rewrite: iteration {} size {} -> {}: {}",
                iteration, size, new_size, candidate
            );
            best = candidate;
            iterations = iteration;

            if new_size >= size {
                break;
            }
            size = new_size;

            if self.config.max_iterations.is_some_and(|max| iterations >= max) {
                debug!("rewrite: iteration cap {} reached", iterations);
                break;
            }
        }

        let tree = best.compact();
        info!(
            "rewrite: size {} -> {} after {} iteration(s)",
            input_size,
            tree.size(),
            iterations
        );
        Rewritten {
            tree,
            iterations,
            failure: None,
        }
    }

    /// Normalize thresholds and compute dependencies without changing the
    /// tree's shape, so the relation the collapse pass would use can be read
    /// off the nodes.
    pub fn analyze(&self, tree: &mut SpecTree) -> Result<(), RewritePassFailure> {
        if tree.is_empty() {
            return Ok(());
        }
        run_pass(Pass::Thresholds, 0, || thresholds::normalize(tree))?;
        run_pass(Pass::Dependencies, 0, || {
            dependencies::compute(tree, &self.config.rules)
        })
    }

    fn run_iteration(&self, tree: &mut SpecTree, iteration: usize) -> Result<(), RewritePassFailure> {
        run_pass(Pass::Thresholds, iteration, || thresholds::normalize(tree))?;
        run_pass(Pass::Dependencies, iteration, || {
            dependencies::compute(tree, &self.config.rules)
        })?;
        run_pass(Pass::Collapse, iteration, || collapse::collapse(tree))?;
        run_pass(Pass::Elide, iteration, || elide::elide_unary(tree))
    }
}

fn run_pass<F>(pass: Pass, iteration: usize, f: F) -> Result<(), RewritePassFailure>
where
    F: FnOnce() -> Result<(), RewriteError>,
{
    f().map_err(|source| RewritePassFailure {
        pass,
        iteration,
        source,
    })
}

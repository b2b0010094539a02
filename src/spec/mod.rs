//! Spec layer: JSON schema + validated in-memory tree.
//!
//! This module is intentionally separate from the rewrite passes.
//! It owns:
//! - NodeId (arena index)
//! - SpecTree / SpecBuilder (arena model and invariants)
//! - the filter-token accessor
//! - RawSpec (JSON document)

pub mod filter;
pub mod id;
pub mod raw;
pub mod tree;

pub use filter::{Comparison, MalformedFilterError};
pub use id::NodeId;
pub use raw::RawSpec;
pub use tree::{NodeKind, Operator, SpecBuilder, SpecNode, SpecTree};

//! Node identifiers for the specification arena.
//!
//! Example: the third node pushed into a tree  =>  NodeId(2)
//!
//! Ids are plain indices and stay valid for the lifetime of the arena, even
//! after the node they name has been detached from the tree.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//! Algebraic rewriting of link specifications.
//!
//! A link specification is a tree of similarity comparisons combined with
//! set operators. [`rewrite::Rewriter`] shrinks such a tree without changing
//! the links it produces; [`spec`] holds the tree model and its JSON form.

pub mod model;
pub mod render;
pub mod rewrite;
pub mod spec;

pub type Result<T> = anyhow::Result<T>;

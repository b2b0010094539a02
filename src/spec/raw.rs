//! JSON form of a link specification tree.
//!
//! JSON shape:
//! {
//!   "op": "AND",                  // AND | OR | MINUS | XOR, combinators only
//!   "threshold": 0.3,             // defaults to 0
//!   "children": [
//!     { "filter": "trigram(x.label,y.label)", "threshold": 0.5 },
//!     { "filter": "jaccard(x.authors,y.authors)", "threshold": 0.4 }
//!   ]
//! }
//!
//! A node with neither `op` nor `filter` and no children is the empty
//! sentinel. We validate the shape node by node, then hand the arena to
//! `SpecBuilder::finish` for the tree-wide invariants.

use crate::Result;
use crate::spec::{NodeId, NodeKind, Operator, SpecBuilder, SpecTree};
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<Operator>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    #[serde(default)]
    pub threshold: f64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawSpec>,
}

impl RawSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parse specification JSON")
    }

    /// Check every node's shape and build the arena tree.
    pub fn validate_and_build(&self) -> Result<SpecTree> {
        let mut builder = SpecBuilder::new();
        let root = self.build_into(&mut builder, "root")?;
        builder.finish(root)
    }

    fn build_into(&self, builder: &mut SpecBuilder, path: &str) -> Result<NodeId> {
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("{}: threshold {} outside [0,1]", path, self.threshold);
        }

        match (self.op, &self.filter) {
            (Some(op), Some(filter)) => {
                bail!("{}: node has both op {} and filter {:?}", path, op, filter)
            }
            (None, Some(filter)) => {
                if !self.children.is_empty() {
                    bail!("{}: atomic node {:?} must not have children", path, filter);
                }
                if filter.trim().is_empty() {
                    bail!("{}: filter is empty", path);
                }
                Ok(builder.atomic(filter.as_str(), self.threshold))
            }
            (Some(op), None) => {
                if self.children.is_empty() {
                    bail!("{}: {} node needs at least one child", path, op);
                }
                let mut children = Vec::with_capacity(self.children.len());
                for (i, child) in self.children.iter().enumerate() {
                    let child_path = format!("{}.children[{}]", path, i);
                    children.push(child.build_into(builder, &child_path)?);
                }
                Ok(builder.combinator(op, self.threshold, children))
            }
            (None, None) => {
                if !self.children.is_empty() {
                    bail!("{}: node with children needs an op", path);
                }
                Ok(builder.empty(self.threshold))
            }
        }
    }

    /// Document form of the tree reachable from the root.
    pub fn from_tree(tree: &SpecTree) -> Self {
        Self::from_node(tree, tree.root())
    }

    fn from_node(tree: &SpecTree, id: NodeId) -> Self {
        let node = tree.node(id);
        let (op, filter) = match &node.kind {
            NodeKind::Atomic { filter } => (None, Some(filter.clone())),
            NodeKind::Combinator(op) => (Some(*op), None),
            NodeKind::Empty => (None, None),
        };
        RawSpec {
            op,
            filter,
            threshold: node.threshold,
            children: node
                .children
                .iter()
                .map(|&child| Self::from_node(tree, child))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"{
        "op": "AND",
        "threshold": 0.3,
        "children": [
            { "filter": "trigram(x.label,y.label)", "threshold": 0.5 },
            { "op": "OR", "children": [
                { "filter": "jaccard(x.authors,y.authors)", "threshold": 0.4 },
                { "filter": "cosine(x.title,y.title)", "threshold": 0.8 }
            ] }
        ]
    }"#;

    #[test]
    fn builds_tree_from_document() {
        let tree = RawSpec::from_json(DOC).unwrap().validate_and_build().unwrap();
        assert_eq!(tree.size(), 5);
        assert_eq!(
            tree.to_string(),
            "AND(trigram(x.label,y.label)|0.5,OR(jaccard(x.authors,y.authors)|0.4,cosine(x.title,y.title)|0.8)|0)|0.3"
        );
    }

    #[test]
    fn tree_converts_back_to_document() {
        let raw = RawSpec::from_json(DOC).unwrap();
        let tree = raw.validate_and_build().unwrap();
        assert_eq!(RawSpec::from_tree(&tree), raw);
    }

    #[test]
    fn filter_tokens_are_kept_verbatim() {
        let raw = RawSpec::from_json(r#"{ "filter": " trigram (x.a, y.a) ", "threshold": 0.5 }"#)
            .unwrap();
        let tree = raw.validate_and_build().unwrap();
        assert_eq!(tree.node(tree.root()).filter(), Some(" trigram (x.a, y.a) "));
        assert_eq!(RawSpec::from_tree(&tree), raw);
    }

    #[test]
    fn empty_object_is_the_empty_sentinel() {
        let tree = RawSpec::from_json("{}").unwrap().validate_and_build().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn errors_name_the_offending_node() {
        let doc = r#"{ "op": "OR", "children": [
            { "filter": "trigram(x.a,y.a)", "threshold": 0.5 },
            { "filter": "trigram(x.a,y.a)", "threshold": 2.0 }
        ] }"#;
        let err = RawSpec::from_json(doc).unwrap().validate_and_build().unwrap_err();
        assert!(err.to_string().starts_with("root.children[1]"), "{err}");
    }

    #[test]
    fn rejects_inconsistent_nodes() {
        for doc in [
            r#"{ "op": "AND", "filter": "trigram(x.a,y.a)" }"#,
            r#"{ "op": "AND", "children": [] }"#,
            r#"{ "filter": "trigram(x.a,y.a)", "children": [ {} ] }"#,
            r#"{ "children": [ { "filter": "trigram(x.a,y.a)" } ] }"#,
            r#"{ "filter": "  " }"#,
        ] {
            let raw = RawSpec::from_json(doc).unwrap();
            assert!(raw.validate_and_build().is_err(), "{doc} should be rejected");
        }
    }

    #[test]
    fn unknown_operator_fails_to_parse() {
        assert!(RawSpec::from_json(r#"{ "op": "NAND", "children": [ {} ] }"#).is_err());
    }
}

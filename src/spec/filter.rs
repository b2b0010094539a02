//! Accessor for the comparison encoded in an atomic node's filter token.
//!
//! Grammar (case-sensitive, no nesting):
//! measure "(" propertyA "," propertyB ")"
//!
//! Example:
//! trigram(x.label, y.label)  =>  measure "trigram", properties ("x.label", "y.label")

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Capture:
// 1) measure: everything up to the first '('
// 2) left operand: up to the comma
// 3) right operand: up to the closing ')'
static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([^(),\s]+)\s*\(\s*([^(),]*?)\s*,\s*([^(),]*?)\s*\)\s*$"#)
        .expect("filter grammar is a valid regex")
});

/// The filter token of an atomic node does not follow the comparison grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed filter {filter:?}: {reason}")]
pub struct MalformedFilterError {
    pub filter: String,
    pub reason: &'static str,
}

impl MalformedFilterError {
    fn new(filter: &str, reason: &'static str) -> Self {
        Self {
            filter: filter.to_string(),
            reason,
        }
    }
}

/// Measure name and the two property paths it compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub measure: String,
    pub left: String,
    pub right: String,
}

impl Comparison {
    pub fn parse(filter: &str) -> Result<Self, MalformedFilterError> {
        // Same precondition as `measure`, checked first so the reason is precise.
        measure(filter)?;

        let caps = FILTER_RE
            .captures(filter)
            .ok_or_else(|| MalformedFilterError::new(filter, "expected measure(left,right)"))?;

        let left = &caps[2];
        let right = &caps[3];
        if left.is_empty() || right.is_empty() {
            return Err(MalformedFilterError::new(filter, "empty property path"));
        }

        Ok(Self {
            measure: caps[1].to_string(),
            left: left.to_string(),
            right: right.to_string(),
        })
    }

    /// Both property paths, in the order they are compared.
    pub fn properties(&self) -> (&str, &str) {
        (&self.left, &self.right)
    }
}

/// Measure name of a filter token: the text before the first parenthesis.
pub fn measure(filter: &str) -> Result<&str, MalformedFilterError> {
    let open = filter
        .find('(')
        .ok_or_else(|| MalformedFilterError::new(filter, "missing '('"))?;
    let name = filter[..open].trim();
    if name.is_empty() {
        return Err(MalformedFilterError::new(filter, "missing measure name"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_measure_and_properties() {
        let cmp = Comparison::parse("trigram(x.label, y.label)").unwrap();
        assert_eq!(cmp.measure, "trigram");
        assert_eq!(cmp.properties(), ("x.label", "y.label"));
    }

    #[test]
    fn operand_order_is_kept() {
        let cmp = Comparison::parse("cosine(y.conf,x.conf)").unwrap();
        assert_eq!(cmp.properties(), ("y.conf", "x.conf"));
    }

    #[test]
    fn measure_is_text_before_first_paren() {
        assert_eq!(measure("jaccard(x.authors,y.authors)").unwrap(), "jaccard");
    }

    #[test]
    fn space_before_paren_is_accepted_by_both_accessors() {
        let filter = "trigram (x.a, y.a)";
        assert_eq!(measure(filter).unwrap(), "trigram");
        let cmp = Comparison::parse(filter).unwrap();
        assert_eq!(cmp.measure, "trigram");
        assert_eq!(cmp.properties(), ("x.a", "y.a"));
    }

    #[test]
    fn missing_open_paren_is_malformed() {
        let err = Comparison::parse("trigram x.label,y.label)").unwrap_err();
        assert_eq!(err.reason, "missing '('");
        assert_eq!(err.filter, "trigram x.label,y.label)");
    }

    #[test]
    fn bad_operand_lists_are_malformed() {
        for filter in [
            "trigram(x.label)",
            "trigram(x.label,y.label",
            "(x.label,y.label)",
            "trigram(,y.label)",
            "trigram(f(x.label),y.label)",
        ] {
            assert!(Comparison::parse(filter).is_err(), "{filter} should be rejected");
        }
    }

    #[test]
    fn measure_names_are_case_sensitive() {
        let a = Comparison::parse("Trigram(x.a,y.a)").unwrap();
        let b = Comparison::parse("trigram(x.a,y.a)").unwrap();
        assert!(a.measure != b.measure);
    }
}

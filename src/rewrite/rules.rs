//! Known containment rules between different similarity measures.
//!
//! A rule `source ⊇ target` says: over the same pair of property paths, the
//! links of `target` at threshold `t` are all produced by `source` at any
//! threshold up to `bound(t)`. A rule is only valid if `source` scores every
//! pair at least as high as `target` does; combinators mix child scores with
//! min/max, and the collapse pass relies on that ordering to keep them intact.
//!
//! The built-in rules follow from overlap >= dice >= jaccard and
//! dice = 2j / (1 + j).

/// Largest source threshold that still contains the target's links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// bound(t) = t
    Same,
    /// bound(t) = 2t / (1 + t), jaccard threshold seen through dice
    DiceOfJaccard,
}

impl Bound {
    pub fn apply(self, target: f64) -> f64 {
        match self {
            Bound::Same => target,
            Bound::DiceOfJaccard => 2.0 * target / (1.0 + target),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRule {
    pub source: String,
    pub target: String,
    pub bound: Bound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRules {
    rules: Vec<MeasureRule>,
}

impl Default for MeasureRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl MeasureRules {
    /// No cross-measure knowledge; only identical measures are compared.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn builtin() -> Self {
        Self::none()
            .with_rule("overlap", "jaccard", Bound::Same)
            .with_rule("overlap", "dice", Bound::Same)
            .with_rule("dice", "jaccard", Bound::DiceOfJaccard)
    }

    pub fn with_rule(mut self, source: &str, target: &str, bound: Bound) -> Self {
        self.rules.push(MeasureRule {
            source: source.to_string(),
            target: target.to_string(),
            bound,
        });
        self
    }

    /// Whether `source` at `t_source` contains every link of `target` at
    /// `t_target`, both comparing the same property paths.
    pub fn contains(&self, source: &str, t_source: f64, target: &str, t_target: f64) -> bool {
        if source == target {
            return t_source <= t_target;
        }
        self.rules
            .iter()
            .filter(|r| r.source == source && r.target == target)
            .any(|r| t_source <= r.bound.apply(t_target))
    }
}

//! Output rendering for reports and rewritten specifications.

pub mod json;

pub use json::{render_inspect_report, render_rewrite_report};

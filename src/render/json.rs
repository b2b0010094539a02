use crate::Result;
use crate::model::{InspectReport, RewriteReport};

/// Render a rewrite report as pretty-printed JSON.
pub fn render_rewrite_report(data: &RewriteReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    Ok(json)
}

pub fn render_inspect_report(data: &InspectReport) -> Result<String> {
    let mut json = serde_json::to_string_pretty(data)?;
    json.push('\n');
    Ok(json)
}

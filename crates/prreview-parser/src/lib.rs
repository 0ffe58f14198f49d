//! Response Parser (C2): extracts a list of issue records from
//! heterogeneous LLM responses (spec §4.2).
//!
//! Strategies are tried in order and the first one that yields at least one
//! issue wins (spec §4.2). The parser never throws: malformed input yields
//! an empty sequence plus an optional `parse_diagnostics` string, matching
//! spec §7's "Parse" error kind ("never fatal on its own").

mod model;
mod normalize;
mod placeholder;
mod strategies;

pub use model::{BranchContext, ParseOutcome, ParsedIssue};
pub use normalize::heuristic_severity;
pub use placeholder::is_placeholder as is_placeholder_path;

use prreview_llm::RawResponse;

/// Parses `raw` into a list of issues, trying each strategy from spec §4.2
/// in order and stopping at the first that yields ≥ 1 issue.
#[must_use]
pub fn parse(raw: &RawResponse, ctx: &BranchContext) -> ParseOutcome {
    let text = raw.as_text();

    let strategies: [(&str, fn(&str) -> Vec<ParsedIssue>); 5] = [
        ("json", strategies::json::parse_json),
        ("template", strategies::template::parse_template),
        ("numbered_prose", strategies::numbered_prose::parse_numbered_prose),
        ("csv_xml", strategies::csv_xml::parse_csv_xml),
        ("status_tagged", strategies::status_tagged::parse_status_tagged),
    ];

    for (name, strategy) in strategies {
        let mut issues = strategy(&text);
        if issues.is_empty() {
            continue;
        }
        for issue in &mut issues {
            normalize::finish(issue);
        }
        issues.retain(|i| !placeholder::is_placeholder(&i.file));
        if issues.is_empty() {
            continue;
        }
        tracing::debug!(branch = %ctx.branch_ref, strategy = name, count = issues.len(), "parsed issues");
        return ParseOutcome {
            issues,
            diagnostics: None,
        };
    }

    ParseOutcome {
        issues: Vec::new(),
        diagnostics: Some(format!(
            "no parser strategy extracted any issue from a {} byte response for branch {}",
            text.len(),
            ctx.branch_ref
        )),
    }
}

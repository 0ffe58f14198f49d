//! Post-extraction normalization applied uniformly after any strategy
//! (spec §4.2): severity backfill, snippet trimming.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ParsedIssue;
use prreview_types::issue::Severity;

const MAX_SNIPPET_BYTES: usize = 4 * 1024;

static CRITICAL_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)injection|vulnerab").unwrap());
static HIGH_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)leak|race").unwrap());
static LOW_WORDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)unused|style|docstring").unwrap());

/// Fills a missing severity from keyword heuristics on the title (spec
/// §4.2). Falls back to `Medium` when no keyword matches: the parser must
/// never leave severity unset, since I1 requires every issue to carry one
/// by the time it reaches the validator.
#[must_use]
pub fn heuristic_severity(title: &str) -> Severity {
    if CRITICAL_WORDS.is_match(title) {
        Severity::Critical
    } else if HIGH_WORDS.is_match(title) {
        Severity::High
    } else if LOW_WORDS.is_match(title) {
        Severity::Low
    } else {
        Severity::Medium
    }
}

/// Truncates a code snippet to ≤ 4 KiB (spec §4.2), cutting at a char
/// boundary.
#[must_use]
pub fn trim_snippet(snippet: &str) -> String {
    if snippet.len() <= MAX_SNIPPET_BYTES {
        return snippet.to_string();
    }
    let mut end = MAX_SNIPPET_BYTES;
    while !snippet.is_char_boundary(end) {
        end -= 1;
    }
    snippet[..end].to_string()
}

/// Applies severity backfill and snippet trimming in place.
pub fn finish(issue: &mut ParsedIssue) {
    if issue.severity.is_none() {
        issue.severity = Some(heuristic_severity(&issue.title));
    }
    if let Some(snippet) = &issue.code_snippet {
        issue.code_snippet = Some(trim_snippet(snippet));
    }
}

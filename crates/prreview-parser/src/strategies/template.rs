//! Strategy 2 (spec §4.2): template blocks delimited by `ISSUE:`/`---`
//! separators, each a flat list of `Key: value` lines.

use crate::model::ParsedIssue;
use prreview_types::issue::{Category, Severity};

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.eq_ignore_ascii_case("ISSUE:") || trimmed == "---"
}

fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if is_separator(line) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn field<'a>(block: &'a [&str], keys: &[&str]) -> Option<&'a str> {
    for line in block {
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_ascii_lowercase();
            if keys.contains(&key.as_str()) {
                return Some(value.trim());
            }
        }
    }
    None
}

fn issue_from_block(block: &[&str]) -> Option<ParsedIssue> {
    let file = field(block, &["file", "path"])?.to_string();
    let line: i64 = field(block, &["line"])?.parse().ok()?;
    let title = field(block, &["title"]).unwrap_or("untitled issue").to_string();

    let mut issue = ParsedIssue::new(file, line, title);
    issue.description = field(block, &["description"]).unwrap_or_default().to_string();
    issue.severity = field(block, &["severity"]).and_then(Severity::parse);
    issue.category = field(block, &["category"]).map(Category::parse).unwrap_or(Category::Other);
    issue.code_snippet = field(block, &["snippet", "code"]).map(str::to_string);
    issue.suggested_fix = field(block, &["fix", "suggestedfix"]).map(str::to_string);
    Some(issue)
}

pub(crate) fn parse_template(text: &str) -> Vec<ParsedIssue> {
    split_blocks(text)
        .iter()
        .filter_map(|block| issue_from_block(block))
        .collect()
}

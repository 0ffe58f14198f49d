//! Strategy 3 (spec §4.2): numbered prose matching
//! `N. **File Path: <p>** Line <k>` or `File: <p>, Line: <k>`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ParsedIssue;

static BOLD_FILE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\d+\.\s*\*\*File Path:\s*([^*]+?)\*\*\s*Line\s*(\d+)\s*:?\s*(.*)$").unwrap()
});
static PLAIN_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*\d+\.\s*File:\s*([^,]+?),\s*Line:\s*(\d+)\s*-?\s*(.*)$").unwrap()
});

fn title_from_rest(rest: &str) -> String {
    let trimmed = rest.trim().trim_start_matches('-').trim();
    if trimmed.is_empty() {
        "untitled issue".to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn parse_numbered_prose(text: &str) -> Vec<ParsedIssue> {
    // Each line can only match one of the two shapes; walk line-by-line so
    // the result preserves the response's original ordering regardless of
    // which shape each item used.
    let mut issues = Vec::new();
    for line in text.lines() {
        if let Some(caps) = BOLD_FILE_PATH.captures(line) {
            let file = caps[1].trim().to_string();
            let Ok(line_no) = caps[2].parse::<i64>() else { continue };
            issues.push(ParsedIssue::new(file, line_no, title_from_rest(&caps[3])));
        } else if let Some(caps) = PLAIN_FILE.captures(line) {
            let file = caps[1].trim().to_string();
            let Ok(line_no) = caps[2].parse::<i64>() else { continue };
            issues.push(ParsedIssue::new(file, line_no, title_from_rest(&caps[3])));
        }
    }
    issues
}

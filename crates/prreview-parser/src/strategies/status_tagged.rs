//! Strategy 5 (spec §4.2): status-tagged sections, where the model marks
//! each item with an explicit `[NEW]`, `[FIXED]`, or `[UNCHANGED]` tag
//! instead of relying on the categorizer's own cross-branch matching.
//!
//! This is the last-resort strategy: it only fires on responses that
//! explicitly volunteer a status, which is rare but occasionally produced by
//! models asked to "diff" two branches in one pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ParsedIssue;
use prreview_types::issue::Status;

static TAGGED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*\[(NEW|FIXED|UNCHANGED)\]\s*([^\n:]+?)(?:\s*[:\-]\s*(.*))?$").unwrap()
});
static FILE_LINE_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([\w./-]+\.[a-zA-Z0-9]+)\s*(?:,|:)?\s*(?:line)?\s*#?(\d+)").unwrap());

fn status_from_tag(tag: &str) -> Status {
    match tag.to_ascii_uppercase().as_str() {
        "NEW" => Status::New,
        "FIXED" => Status::Fixed,
        _ => Status::Unchanged,
    }
}

pub(crate) fn parse_status_tagged(text: &str) -> Vec<ParsedIssue> {
    let mut issues = Vec::new();
    for caps in TAGGED_LINE.captures_iter(text) {
        let status = status_from_tag(&caps[1]);
        let head = caps[2].trim();
        let rest = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");

        // The file/line pair may be embedded in the head ("src/a.rs:10 bad
        // loop") or in the trailing detail ("missing check in src/a.rs:10").
        let Some(loc) = FILE_LINE_HINT.captures(head).or_else(|| FILE_LINE_HINT.captures(rest)) else {
            continue;
        };
        let file = loc[1].to_string();
        let Ok(line) = loc[2].parse::<i64>() else { continue };

        let title = if rest.is_empty() { head } else { rest };
        let title = FILE_LINE_HINT.replace(title, "").trim().trim_matches(|c| c == '-' || c == ':').trim().to_string();
        let title = if title.is_empty() { "untitled issue".to_string() } else { title };

        let mut issue = ParsedIssue::new(file, line, title);
        issue.status_hint = Some(status);
        issues.push(issue);
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracket_tagged_sections() {
        let text = "\
[UNCHANGED] src/api.rs:42 - still missing input validation
[FIXED] src/util.rs:7 - null check added
[NEW] src/handler.rs:15 - unbounded recursion
";
        let issues = parse_status_tagged(text);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].status_hint, Some(Status::Unchanged));
        assert_eq!(issues[0].file, "src/api.rs");
        assert_eq!(issues[0].line, 42);
        assert_eq!(issues[1].status_hint, Some(Status::Fixed));
        assert_eq!(issues[2].status_hint, Some(Status::New));
    }

    #[test]
    fn tagged_lines_without_a_location_are_skipped() {
        let text = "[NEW] this tag has no resolvable file or line\n";
        assert!(parse_status_tagged(text).is_empty());
    }
}

//! Strategy 1 (spec §4.2): JSON object/array after trimming prose
//! prefix/suffix, with aliased key normalization.

use serde_json::Value;

use crate::model::ParsedIssue;
use prreview_types::issue::{Category, Severity};

/// Scans `text` for the first top-level JSON array or object, respecting
/// string quoting and escapes, and returns its substring. LLMs routinely
/// wrap JSON in prose ("Here's my analysis:\n\n[...]\n\nLet me know!"); this
/// trims that prose without requiring the whole response to be valid JSON.
fn extract_json_substring(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|b| *b == b'[' || *b == b'{')?;
    let open = bytes[start];
    let close = if open == b'[' { b']' } else { b'}' };

    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return std::str::from_utf8(&bytes[start..=i]).ok();
                }
            }
            _ => {}
        }
    }
    None
}

fn first_of<'a>(obj: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k))
}

fn issue_from_object(obj: &serde_json::Map<String, Value>) -> Option<ParsedIssue> {
    let file = first_of(obj, &["file", "path", "filepath"])?.as_str()?.to_string();
    let line = first_of(obj, &["line", "lineNumber"])?.as_i64()?;
    let title = first_of(obj, &["title", "message", "issue"])
        .and_then(Value::as_str)
        .unwrap_or("untitled issue")
        .to_string();

    let mut issue = ParsedIssue::new(file, line, title);
    issue.column = obj.get("column").and_then(Value::as_i64);
    issue.description = obj
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    issue.severity = obj
        .get("severity")
        .and_then(Value::as_str)
        .and_then(Severity::parse);
    issue.category = obj
        .get("category")
        .and_then(Value::as_str)
        .map(Category::parse)
        .unwrap_or(Category::Other);
    issue.code_snippet = first_of(obj, &["codeSnippet", "code", "snippet"])
        .and_then(Value::as_str)
        .map(str::to_string);
    issue.suggested_fix = first_of(obj, &["suggestedFix", "fix", "remediation"])
        .and_then(Value::as_str)
        .map(str::to_string);
    Some(issue)
}

fn issues_from_value(value: &Value) -> Vec<ParsedIssue> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_object().and_then(issue_from_object))
            .collect(),
        Value::Object(obj) => {
            // A top-level object may itself be a single issue, or wrap a
            // list under a common key.
            for key in ["issues", "results", "items"] {
                if let Some(Value::Array(items)) = obj.get(key) {
                    return items
                        .iter()
                        .filter_map(|v| v.as_object().and_then(issue_from_object))
                        .collect();
                }
            }
            issue_from_object(obj).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

pub(crate) fn parse_json(text: &str) -> Vec<ParsedIssue> {
    let Some(json_text) = extract_json_substring(text) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(json_text) {
        Ok(value) => issues_from_value(&value),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_array_wrapped_in_prose() {
        let text = "Sure, here you go:\n[{\"file\":\"a.rs\",\"line\":1,\"title\":\"x\"}]\nHope that helps!";
        let issues = parse_json(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].file, "a.rs");
    }

    #[test]
    fn normalizes_aliased_keys() {
        let text = r#"{"path": "b.rs", "lineNumber": 5, "message": "bad", "code": "fn f() {}", "fix": "fn f() -> i32 { 0 }"}"#;
        let issues = parse_json(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].file, "b.rs");
        assert_eq!(issues[0].line, 5);
        assert_eq!(issues[0].code_snippet.as_deref(), Some("fn f() {}"));
    }

    #[test]
    fn wrapped_issues_key_is_unwrapped() {
        let text = r#"{"issues": [{"file": "c.rs", "line": 2, "title": "y"}]}"#;
        let issues = parse_json(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].file, "c.rs");
    }

    #[test]
    fn non_json_text_yields_nothing() {
        assert!(parse_json("just a plain sentence with no structure").is_empty());
    }
}

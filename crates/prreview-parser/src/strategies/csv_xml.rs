//! Strategy 4 (spec §4.2): CSV with a header row, or simple `<issue>` XML
//! elements with child tags.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::ParsedIssue;
use prreview_types::issue::{Category, Severity};

fn split_csv_row(row: &str) -> Vec<String> {
    // No embedded commas or quoted fields in practice for this format; a
    // naive split keeps this strategy simple and dependency-free.
    row.split(',').map(|cell| cell.trim().to_string()).collect()
}

fn parse_csv(text: &str) -> Vec<ParsedIssue> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<String> = split_csv_row(header_line)
        .into_iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    let file_idx = header.iter().position(|h| h == "file" || h == "path");
    let line_idx = header.iter().position(|h| h == "line" || h == "linenumber");
    let (Some(file_idx), Some(line_idx)) = (file_idx, line_idx) else {
        return Vec::new();
    };
    let title_idx = header.iter().position(|h| h == "title" || h == "message");
    let severity_idx = header.iter().position(|h| h == "severity");
    let category_idx = header.iter().position(|h| h == "category");

    let mut issues = Vec::new();
    for row in lines {
        let cells = split_csv_row(row);
        if cells.len() <= file_idx.max(line_idx) {
            continue;
        }
        let file = cells[file_idx].clone();
        let Ok(line) = cells[line_idx].parse::<i64>() else {
            continue;
        };
        if file.is_empty() {
            continue;
        }
        let title = title_idx
            .and_then(|i| cells.get(i))
            .cloned()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "untitled issue".to_string());
        let mut issue = ParsedIssue::new(file, line, title);
        issue.severity = severity_idx
            .and_then(|i| cells.get(i))
            .and_then(|s| Severity::parse(s));
        issue.category = category_idx
            .and_then(|i| cells.get(i))
            .map(|s| Category::parse(s))
            .unwrap_or(Category::Other);
        issues.push(issue);
    }
    issues
}

static ISSUE_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<issue\b[^>]*>(.*?)</issue>").unwrap());

fn xml_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let re = Regex::new(&format!(r"(?is)<{tag}>(.*?)</{tag}>")).ok()?;
    re.captures(body).map(|c| c.get(1).unwrap().as_str().trim())
}

fn issue_from_xml_element(body: &str) -> Option<ParsedIssue> {
    let file = xml_tag(body, "file").or_else(|| xml_tag(body, "path"))?.to_string();
    let line: i64 = xml_tag(body, "line")?.parse().ok()?;
    let title = xml_tag(body, "title").unwrap_or("untitled issue").to_string();

    let mut issue = ParsedIssue::new(file, line, title);
    issue.description = xml_tag(body, "description").unwrap_or_default().to_string();
    issue.severity = xml_tag(body, "severity").and_then(Severity::parse);
    issue.category = xml_tag(body, "category").map(Category::parse).unwrap_or(Category::Other);
    Some(issue)
}

fn parse_xml(text: &str) -> Vec<ParsedIssue> {
    ISSUE_ELEMENT
        .captures_iter(text)
        .filter_map(|caps| issue_from_xml_element(caps.get(1).unwrap().as_str()))
        .collect()
}

pub(crate) fn parse_csv_xml(text: &str) -> Vec<ParsedIssue> {
    let xml_issues = parse_xml(text);
    if !xml_issues.is_empty() {
        return xml_issues;
    }
    parse_csv(text)
}

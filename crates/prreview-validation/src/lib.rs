//! Issue Validator (C3): resolves parsed issues against a repository
//! checkout and assigns each surviving issue a confidence score.
//!
//! A single `validate` entry point backed by private per-rule helpers,
//! with static regexes for the cheap lexical checks.

pub mod error;

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use prreview_parser::ParsedIssue;
use prreview_types::issue::{Issue, IssueBuilder, Location};

pub use error::ValidationError;

const MAX_SNIPPET_LINE_DRIFT: i64 = 5;

static GENERIC_TITLES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(issue|bug|problem|improvement)\s*(found)?$").unwrap());

/// Why a candidate issue was dropped (spec §4.3's `filterReasons`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterReason {
    InvalidLocation,
    PlaceholderPath,
    FileNotFound { suggestion: Option<String> },
    LineOutOfRange,
    LowConfidence(u8),
}

impl FilterReason {
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            Self::InvalidLocation => "invalid-location".to_string(),
            Self::PlaceholderPath => "placeholder-path".to_string(),
            Self::FileNotFound { suggestion: Some(s) } => format!("file-not-found (did you mean {s}?)"),
            Self::FileNotFound { suggestion: None } => "file-not-found".to_string(),
            Self::LineOutOfRange => "line-out-of-range".to_string(),
            Self::LowConfidence(score) => format!("low-confidence ({score})"),
        }
    }
}

/// A candidate that did not survive validation.
#[derive(Debug, Clone)]
pub struct FilteredIssue {
    pub file: String,
    pub title: String,
    pub reasons: Vec<FilterReason>,
}

/// Aggregate counters for observability (spec §4.3: "to support
/// observability").
#[derive(Debug, Clone, Default)]
pub struct ValidationStats {
    pub total: usize,
    pub valid: usize,
    pub filtered: usize,
}

/// Result of a `validate` call.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub valid: Vec<Issue>,
    pub filtered: Vec<FilteredIssue>,
    pub stats: ValidationStats,
}

fn find_basename_suggestion(checkout: &Path, file: &str) -> Option<String> {
    let basename = Path::new(file).file_name()?.to_str()?;
    let mut found = None;
    visit_dirs(checkout, &mut |path| {
        if found.is_none() && path.file_name().and_then(|n| n.to_str()) == Some(basename) {
            found = path
                .strip_prefix(checkout)
                .ok()
                .and_then(|p| p.to_str())
                .map(str::to_string);
        }
    });
    found
}

/// Best-effort recursive walk; skips unreadable directories rather than
/// failing the whole validation pass over one bad entry.
fn visit_dirs(dir: &Path, visit: &mut impl FnMut(&Path)) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().and_then(|n| n.to_str()) == Some(".git") {
                continue;
            }
            visit_dirs(&path, visit);
        } else {
            visit(&path);
        }
    }
}

fn normalize_for_substring_search(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Checks whether `snippet` (whitespace-collapsed) appears in `contents`
/// within `MAX_SNIPPET_LINE_DRIFT` lines of `line` (spec §4.3 step 4).
fn snippet_matches_nearby(contents: &str, snippet: &str, line: i64) -> bool {
    let normalized_snippet = normalize_for_substring_search(snippet);
    if normalized_snippet.is_empty() {
        return false;
    }
    let lines: Vec<&str> = contents.lines().collect();
    let lo = (line - 1 - MAX_SNIPPET_LINE_DRIFT).max(0) as usize;
    let hi = ((line - 1 + MAX_SNIPPET_LINE_DRIFT) as usize).min(lines.len().saturating_sub(1));
    if lo > hi {
        return false;
    }
    let window = lines[lo..=hi].join(" ");
    normalize_for_substring_search(&window).contains(&normalized_snippet)
}

/// Validates `issues` against `checkout`, returning surviving issues with
/// confidence scores plus the rejected set with reasons (spec §4.3).
#[must_use]
pub fn validate(issues: Vec<ParsedIssue>, checkout: &Path) -> ValidationOutcome {
    let mut outcome = ValidationOutcome {
        stats: ValidationStats {
            total: issues.len(),
            ..Default::default()
        },
        ..Default::default()
    };

    for parsed in issues {
        match validate_one(&parsed, checkout) {
            Ok(issue) => outcome.valid.push(issue),
            Err(reasons) => {
                tracing::debug!(file = %parsed.file, reasons = ?reasons, "issue filtered during validation");
                outcome.filtered.push(FilteredIssue {
                    file: parsed.file,
                    title: parsed.title,
                    reasons,
                });
            }
        }
    }

    outcome.stats.valid = outcome.valid.len();
    outcome.stats.filtered = outcome.filtered.len();
    outcome
}

fn validate_one(parsed: &ParsedIssue, checkout: &Path) -> Result<Issue, Vec<FilterReason>> {
    if prreview_parser::is_placeholder_path(&parsed.file) {
        return Err(vec![FilterReason::PlaceholderPath]);
    }

    let location = Location::new(parsed.file.clone(), parsed.line, parsed.column)
        .map_err(|_| vec![FilterReason::InvalidLocation])?;

    let full_path = checkout.join(&location.file);
    let contents = match fs::read_to_string(&full_path) {
        Ok(c) => c,
        Err(_) => {
            let suggestion = find_basename_suggestion(checkout, &location.file);
            return Err(vec![FilterReason::FileNotFound { suggestion }]);
        }
    };

    let line_count = contents.lines().count() as i64;
    if location.line > line_count {
        return Err(vec![FilterReason::LineOutOfRange]);
    }

    let mut confidence: i32 = 100;
    let heuristic_severity = parsed.severity.is_none();
    let severity = parsed.severity.unwrap_or(prreview_parser::heuristic_severity(&parsed.title));

    match &parsed.code_snippet {
        None => confidence -= 15,
        Some(snippet) if !snippet_matches_nearby(&contents, snippet, location.line) => {
            confidence -= 20;
        }
        Some(_) => {}
    }
    if GENERIC_TITLES.is_match(parsed.title.trim()) {
        confidence -= 10;
    }
    if heuristic_severity {
        confidence -= 10;
    }

    let confidence = confidence.clamp(0, 100) as u8;
    if confidence < 40 {
        return Err(vec![FilterReason::LowConfidence(confidence)]);
    }

    let mut builder = IssueBuilder::new(
        parsed.title.clone(),
        parsed.description.clone(),
        severity,
        parsed.category,
        location,
    );
    if let Some(snippet) = &parsed.code_snippet {
        builder = builder.code_snippet(snippet.clone());
    }
    if let Some(fix) = &parsed.suggested_fix {
        builder = builder.suggested_fix(fix.clone());
    }
    let mut issue = builder.build();
    issue.confidence = Some(confidence);
    Ok(issue)
}

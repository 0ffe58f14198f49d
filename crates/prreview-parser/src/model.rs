use prreview_types::issue::{Category, Severity, Status};

/// Context passed to the parser about which branch is being analyzed; used
/// for diagnostics only (no parsing behavior depends on it).
#[derive(Debug, Clone)]
pub struct BranchContext {
    pub branch_ref: String,
}

impl BranchContext {
    #[must_use]
    pub fn new(branch_ref: impl Into<String>) -> Self {
        Self {
            branch_ref: branch_ref.into(),
        }
    }
}

/// A single item extracted by a parser strategy, before validation (C3)
/// resolves it against a checkout and assigns confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIssue {
    pub file: String,
    pub line: i64,
    pub column: Option<i64>,
    pub title: String,
    pub description: String,
    /// `None` until the severity heuristic (spec §4.2) fills it.
    pub severity: Option<Severity>,
    pub category: Category,
    pub code_snippet: Option<String>,
    pub suggested_fix: Option<String>,
    /// Present only for strategy 5 (status-tagged PR prose), spec §4.2.
    pub status_hint: Option<Status>,
}

impl ParsedIssue {
    #[must_use]
    pub fn new(file: impl Into<String>, line: i64, title: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
            title: title.into(),
            description: String::new(),
            severity: None,
            category: Category::Other,
            code_snippet: None,
            suggested_fix: None,
            status_hint: None,
        }
    }
}

/// Result of a `parse` call: either ≥ 1 issue, or an empty list with an
/// optional diagnostic string (spec §4.2, §7 "Parse" kind).
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub issues: Vec<ParsedIssue>,
    pub diagnostics: Option<String>,
}

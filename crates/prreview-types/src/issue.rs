//! The canonical `Issue` record (spec §3) and its constituent types.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::InvariantError;
use crate::fingerprint::Fingerprint;

/// Schema version embedded in every serialized `ComparisonResult` (spec §6).
pub const ISSUE_SCHEMA_VERSION: &str = "v1";

static FILE_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_./-]+$").unwrap());

/// Severity tiers (I1: no value outside this set is accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Parses a severity from free-form LLM output, returning `None` for
    /// anything outside the allowed set (I1) rather than guessing.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Descending rank used for the severity-first ordering required by I7
    /// and §3's `BranchAnalysis.issues` ordering rule. Lower rank sorts
    /// first.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// Issue category (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Security,
    Performance,
    CodeQuality,
    Dependencies,
    Architecture,
    Testing,
    Documentation,
    BreakingChange,
    Other,
}

impl Category {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "security" => Self::Security,
            "performance" => Self::Performance,
            "code-quality" => Self::CodeQuality,
            "dependencies" => Self::Dependencies,
            "architecture" => Self::Architecture,
            "testing" => Self::Testing,
            "documentation" => Self::Documentation,
            "breaking-change" => Self::BreakingChange,
            _ => Self::Other,
        }
    }
}

/// Location of an issue within the checked-out repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Repo-relative path; must match `[A-Za-z0-9_./-]+` (I2).
    pub file: String,
    /// 1-based line number (I2).
    pub line: i64,
    pub column: Option<i64>,
}

impl Location {
    /// Validates I2 and constructs a `Location`.
    ///
    /// # Errors
    /// Returns `InvariantError::InvalidLocation` if `file` is empty, does
    /// not match the allowed path pattern, or `line < 1`.
    pub fn new(file: impl Into<String>, line: i64, column: Option<i64>) -> Result<Self, InvariantError> {
        let file = file.into();
        if file.is_empty() || !FILE_PATH_RE.is_match(&file) || line < 1 {
            return Err(InvariantError::InvalidLocation { file, line });
        }
        Ok(Self { file, line, column })
    }

    /// Basename of `file`, used by the categorizer's fingerprint (§4.7).
    #[must_use]
    pub fn basename(&self) -> &str {
        self.file.rsplit('/').next().unwrap_or(&self.file)
    }
}

/// Status assigned to an issue by the categorizer (C7); absent until then
/// (I4: never set elsewhere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    New,
    Fixed,
    Unchanged,
}

/// Fix-type classification produced by the classifier (C8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixType {
    /// Signature-preserving; safe to copy-paste.
    A,
    /// Signature-changing; callers must migrate.
    B,
}

/// The canonical issue record (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub category: Category,
    pub location: Location,
    pub code_snippet: Option<String>,
    pub suggested_fix: Option<String>,
    /// 0–100, set by the validator (C3); absent before validation.
    pub confidence: Option<u8>,
    /// Set only by the categorizer (C7); I4.
    pub status: Option<Status>,
    /// Set only by the classifier (C8).
    pub fix_type: Option<FixType>,
    /// Required iff `fix_type == Some(FixType::B)` (I5).
    pub adjustment_notes: Option<String>,
    /// Count of occurrences collapsed into this record during
    /// post-categorization dedup (§4.7); `1` if never merged.
    pub occurrences: u32,
}

impl Issue {
    /// Computes the stable fingerprint-derived id for this issue (I3
    /// uniqueness is enforced by whoever inserts into an accumulated set,
    /// e.g. the analyzer's merge step; this method is pure).
    #[must_use]
    pub fn compute_id(&self) -> String {
        Fingerprint::of(&self.title, &self.description, &self.location, self.category).id()
    }

    /// Validates invariants I1, I2, I5 that apply to a single record in
    /// isolation (I3, I6, I7 are cross-record/collection invariants checked
    /// by the component assembling a collection).
    ///
    /// # Errors
    /// Returns the first violated invariant found.
    pub fn validate_self(&self) -> Result<(), InvariantError> {
        if self.location.file.is_empty()
            || !FILE_PATH_RE.is_match(&self.location.file)
            || self.location.line < 1
        {
            return Err(InvariantError::InvalidLocation {
                file: self.location.file.clone(),
                line: self.location.line,
            });
        }
        if self.fix_type == Some(FixType::B)
            && self.adjustment_notes.as_deref().unwrap_or("").is_empty()
        {
            return Err(InvariantError::MissingAdjustmentNotes(self.id.clone()));
        }
        Ok(())
    }
}

/// Builder for `Issue`, preferring explicit construction over a public-field
/// struct literal at call sites far from the definition.
#[derive(Debug, Clone)]
pub struct IssueBuilder {
    title: String,
    description: String,
    severity: Severity,
    category: Category,
    location: Location,
    code_snippet: Option<String>,
    suggested_fix: Option<String>,
}

impl IssueBuilder {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        category: Category,
        location: Location,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            category,
            location,
            code_snippet: None,
            suggested_fix: None,
        }
    }

    #[must_use]
    pub fn code_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.code_snippet = Some(snippet.into());
        self
    }

    #[must_use]
    pub fn suggested_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Builds the issue, computing its fingerprint-derived id.
    #[must_use]
    pub fn build(self) -> Issue {
        let fp = Fingerprint::of(&self.title, &self.description, &self.location, self.category);
        Issue {
            id: fp.id(),
            title: self.title,
            description: self.description,
            severity: self.severity,
            category: self.category,
            location: self.location,
            code_snippet: self.code_snippet,
            suggested_fix: self.suggested_fix,
            confidence: None,
            status: None,
            fix_type: None,
            adjustment_notes: None,
            occurrences: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parse_rejects_unknown_values() {
        assert_eq!(Severity::parse("critical"), Some(Severity::Critical));
        assert_eq!(Severity::parse("SEVERE"), None);
    }

    #[test]
    fn location_rejects_empty_and_bad_lines() {
        assert!(Location::new("", 1, None).is_err());
        assert!(Location::new("src/main.rs", 0, None).is_err());
        assert!(Location::new("src/main.rs", 1, None).is_ok());
    }

    #[test]
    fn location_rejects_disallowed_characters() {
        assert!(Location::new("src/main.rs; rm -rf", 1, None).is_err());
    }

    #[test]
    fn builder_computes_stable_id() {
        let loc = Location::new("src/api/client.ts", 45, None).unwrap();
        let a = IssueBuilder::new(
            "Missing error handling",
            "The fetch call has no catch clause.",
            Severity::High,
            Category::CodeQuality,
            loc.clone(),
        )
        .build();
        let loc2 = Location::new("src/api/client.ts", 247, None).unwrap();
        let b = IssueBuilder::new(
            "Missing error handling",
            "The fetch call has no catch clause.",
            Severity::High,
            Category::CodeQuality,
            loc2,
        )
        .build();
        assert_eq!(a.id, b.id, "id must not depend on line number");
        let _ = loc;
    }

    #[test]
    fn validate_self_requires_notes_for_type_b() {
        let loc = Location::new("src/main.rs", 1, None).unwrap();
        let mut issue = IssueBuilder::new("t", "d", Severity::Low, Category::Other, loc).build();
        issue.fix_type = Some(FixType::B);
        assert!(issue.validate_self().is_err());
        issue.adjustment_notes = Some("added parameter `connection`".into());
        assert!(issue.validate_self().is_ok());
    }
}

//! `BranchAnalysis`, `CachedAnalysis`, and `ComparisonResult` (spec §3).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::issue::{Issue, Severity, Status, ISSUE_SCHEMA_VERSION};

/// Orders issues by severity descending, then file ascending, then line
/// ascending. The ordering rule for `BranchAnalysis.issues` (spec §3) and
/// the baseline ordering within a `ComparisonResult` bucket before stable
/// insertion order takes over (spec §5).
#[must_use]
pub fn compare_issues(a: &Issue, b: &Issue) -> Ordering {
    a.severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| a.location.file.cmp(&b.location.file))
        .then_with(|| a.location.line.cmp(&b.location.line))
}

/// Sorts `issues` in place per the rule above. Stable, so ties preserve
/// insertion order (needed for the bucket ordering guarantee in spec §5).
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(compare_issues);
}

/// Result of analyzing a single branch (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchAnalysis {
    pub branch_ref: String,
    pub issues: Vec<Issue>,
    pub iterations: u32,
    pub converged: bool,
    pub completeness: u8,
    pub model_id: String,
    /// Degradations observed while producing this branch's analysis (e.g.
    /// `HighFilterRate`), surfaced by the caller alongside pair-level ones.
    pub warnings: Vec<Warning>,
}

impl BranchAnalysis {
    /// `completeness = min(100, round(100 * |withSnippet| / |accumulated|))`
    /// (spec §4.5 step 4). Returns 100 for an empty issue set: there is
    /// nothing left incomplete.
    #[must_use]
    pub fn compute_completeness(issues: &[Issue]) -> u8 {
        if issues.is_empty() {
            return 100;
        }
        let with_snippet = issues.iter().filter(|i| i.code_snippet.is_some()).count();
        let pct = (100.0 * with_snippet as f64 / issues.len() as f64).round();
        pct.min(100.0) as u8
    }
}

/// A cached branch analysis entry (spec §3, §4.4).
#[derive(Debug, Clone)]
pub struct CachedAnalysis {
    pub key: String,
    pub value: BranchAnalysis,
    pub expires_at: SystemTime,
    /// Schema version the value was stored with; a hit whose version
    /// differs from `ISSUE_SCHEMA_VERSION` is treated as a miss (spec §4.4).
    pub schema_version: String,
}

impl CachedAnalysis {
    #[must_use]
    pub fn new(key: String, value: BranchAnalysis, ttl: Duration) -> Self {
        Self {
            key,
            value,
            expires_at: SystemTime::now() + ttl,
            schema_version: ISSUE_SCHEMA_VERSION.to_string(),
        }
    }

    #[must_use]
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        self.schema_version == ISSUE_SCHEMA_VERSION && now < self.expires_at
    }
}

/// Discriminant for a pipeline-level degradation reported in
/// `ComparisonResult.warnings` (spec §7 "User-visible failure").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    CacheDegraded,
    BranchFailed,
    HighFilterRate,
    FallbackModel,
    PartialConvergence,
}

/// A single degraded-but-non-fatal condition observed during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    #[must_use]
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Per-severity and per-status counts plus the derived quality score and
/// decision (spec §4.7).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub by_severity: HashMap<Severity, usize>,
    pub by_status: HashMap<Status, usize>,
    pub quality_score: u8,
    pub net_impact: i64,
    pub decision: Decision,
}

/// Approve/review/decline recommendation (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    #[default]
    Approve,
    Review,
    Decline,
}

/// Output of the pipeline (spec §3, §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub schema_version: String,
    pub new_issues: Vec<Issue>,
    pub fixed_issues: Vec<Issue>,
    pub unchanged_issues: Vec<Issue>,
    pub summary: Summary,
    pub warnings: Vec<Warning>,
}

impl ComparisonResult {
    #[must_use]
    pub fn new(
        new_issues: Vec<Issue>,
        fixed_issues: Vec<Issue>,
        unchanged_issues: Vec<Issue>,
        summary: Summary,
        warnings: Vec<Warning>,
    ) -> Self {
        Self {
            schema_version: ISSUE_SCHEMA_VERSION.to_string(),
            new_issues,
            fixed_issues,
            unchanged_issues,
            summary,
            warnings,
        }
    }
}

//! Per-severity/per-status counts, quality score, and decision (spec §4.7).

use std::collections::HashMap;

use prreview_types::issue::{Issue, Severity, Status};
use prreview_types::result::{Decision, Summary};

fn count_severity(issues: &[Issue], severity: Severity) -> i64 {
    issues.iter().filter(|i| i.severity == severity).count() as i64
}

/// Builds the `Summary` for a finished categorization: per-severity and
/// per-status counts across the union of all three buckets, the
/// bonus-inclusive quality score, net impact, and the approve/review/
/// decline decision (spec §4.7; bonus-inclusive formula per the open
/// question resolution in SPEC_FULL.md).
#[must_use]
pub fn compute(new_issues: &[Issue], fixed_issues: &[Issue], unchanged_issues: &[Issue]) -> Summary {
    let mut by_severity: HashMap<Severity, usize> = HashMap::new();
    let mut by_status: HashMap<Status, usize> = HashMap::new();

    for (issues, status) in [
        (new_issues, Status::New),
        (fixed_issues, Status::Fixed),
        (unchanged_issues, Status::Unchanged),
    ] {
        by_status.insert(status, issues.len());
        for issue in issues {
            *by_severity.entry(issue.severity).or_insert(0) += 1;
        }
    }

    let new_critical = count_severity(new_issues, Severity::Critical);
    let new_high = count_severity(new_issues, Severity::High);
    let new_medium = count_severity(new_issues, Severity::Medium);
    let new_low = count_severity(new_issues, Severity::Low);

    let fixed_critical = count_severity(fixed_issues, Severity::Critical);
    let fixed_high = count_severity(fixed_issues, Severity::High);
    let fixed_medium = count_severity(fixed_issues, Severity::Medium);

    let raw_score = 100 - 25 * new_critical - 10 * new_high - 5 * new_medium - 2 * new_low
        + 5 * fixed_critical
        + 3 * fixed_high
        + fixed_medium;
    let quality_score = raw_score.clamp(0, 100) as u8;

    let decision = if new_critical > 0 {
        Decision::Decline
    } else if new_high > 2 {
        Decision::Review
    } else {
        Decision::Approve
    };

    Summary {
        by_severity,
        by_status,
        quality_score,
        net_impact: new_issues.len() as i64 - fixed_issues.len() as i64,
        decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_types::issue::{Category, IssueBuilder, Location};

    fn issue(sev: Severity) -> Issue {
        IssueBuilder::new("t", "d", sev, Category::Other, Location::new("a.rs", 1, None).unwrap()).build()
    }

    #[test]
    fn any_new_critical_forces_decline() {
        let new = vec![issue(Severity::Critical)];
        let summary = compute(&new, &[], &[]);
        assert_eq!(summary.decision, Decision::Decline);
    }

    #[test]
    fn more_than_two_new_high_forces_review() {
        let new = vec![issue(Severity::High), issue(Severity::High), issue(Severity::High)];
        let summary = compute(&new, &[], &[]);
        assert_eq!(summary.decision, Decision::Review);
    }

    #[test]
    fn clean_pr_is_approved_with_full_score() {
        let summary = compute(&[], &[], &[]);
        assert_eq!(summary.decision, Decision::Approve);
        assert_eq!(summary.quality_score, 100);
    }

    #[test]
    fn fixed_issues_grant_bonus_points() {
        let fixed = vec![issue(Severity::Critical)];
        let summary = compute(&[], &fixed, &[]);
        assert_eq!(summary.quality_score, 100); // clamped, bonus would exceed 100
        assert_eq!(summary.net_impact, -1);
    }

    #[test]
    fn score_is_clamped_to_zero() {
        let new = vec![issue(Severity::Critical); 10];
        let summary = compute(&new, &[], &[]);
        assert_eq!(summary.quality_score, 0);
    }
}

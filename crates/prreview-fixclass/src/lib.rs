//! Fix-Type Classifier (C8): labels each suggested fix as Type A
//! (signature-preserving) or Type B (signature-changing), deterministically
//! and without invoking the LLM (spec §4.8).

mod classify;
mod signature;

pub use classify::Classification;
pub use signature::Signature;

use prreview_types::issue::Issue;

/// Annotates `issue` with `fix_type`/`adjustment_notes` if it carries both
/// `code_snippet` and `suggested_fix`; otherwise leaves it unchanged (spec
/// §4.8: "For each issue with both codeSnippet and suggestedFix").
#[must_use]
pub fn classify_issue(mut issue: Issue) -> Issue {
    if let (Some(snippet), Some(fix)) = (issue.code_snippet.as_deref(), issue.suggested_fix.as_deref()) {
        let result = classify::classify(snippet, fix);
        if result.low_confidence {
            tracing::debug!(issue = %issue.id, "fix-type extraction failed on one side, defaulting to Type A");
        }
        issue.fix_type = Some(result.fix_type);
        issue.adjustment_notes = result.adjustment_notes;
    }
    issue
}

/// Annotates every issue in `issues` in place order, returning the updated
/// vector. Runs in bounded time and performs no I/O (spec §4.8: "must not
/// invoke the LLM; it is deterministic and runs in bounded time").
#[must_use]
pub fn classify_all(issues: Vec<Issue>) -> Vec<Issue> {
    issues.into_iter().map(classify_issue).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_types::issue::{Category, IssueBuilder, Location, Severity};

    #[test]
    fn leaves_issues_without_both_fields_unclassified() {
        let issue = IssueBuilder::new("t", "d", Severity::Low, Category::Other, Location::new("a.rs", 1, None).unwrap())
            .code_snippet("fn f() {}")
            .build();
        let classified = classify_issue(issue);
        assert!(classified.fix_type.is_none());
    }

    #[test]
    fn classified_type_b_issue_satisfies_invariant_i5() {
        let issue = IssueBuilder::new("t", "d", Severity::Low, Category::Other, Location::new("a.rs", 1, None).unwrap())
            .code_snippet("function f(a) { return a; }")
            .suggested_fix("function f(a, b) { return a + b; }")
            .build();
        let classified = classify_issue(issue);
        assert!(classified.validate_self().is_ok());
        assert_eq!(classified.fix_type, Some(prreview_types::issue::FixType::B));
    }
}

//! Greedy cross-branch matching (spec §4.7).
//!
//! Builds every candidate `(main, pr)` pair whose fingerprints satisfy the
//! match predicate, then consumes candidates highest-confidence-first so
//! each issue on either side is paired at most once. Line numbers never
//! enter the predicate (P5): `Fingerprint::matches` already drops them.

use prreview_types::issue::Issue;
use prreview_types::Fingerprint;

/// A single accepted cross-branch match, kept around for observability and
/// for `categorize`'s greedy consumption bookkeeping.
#[derive(Debug, Clone)]
pub struct MatchedPair {
    pub main_index: usize,
    pub pr_index: usize,
    pub confidence: u8,
}

/// Trigram Jaccard similarity restricted to one field's tokens, used only
/// to weight match confidence. The match predicate itself (`Fingerprint::
/// matches`) already decided these two issues correspond.
fn field_similarity(a: &str, b: &str) -> f64 {
    let ta: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let tb: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// `100 * (title_weight + description_weight + file_weight) / total` (spec
/// §4.7), where an exact title match or a full-path match outweighs a
/// similarity-only title match or a basename-only file match.
fn match_confidence(main_fp: &Fingerprint, pr_fp: &Fingerprint) -> u8 {
    const TITLE_EXACT: f64 = 2.0;
    const FILE_FULL: f64 = 2.0;
    const FILE_BASENAME: f64 = 1.0;
    const DESC_MAX: f64 = 1.0;
    const TOTAL: f64 = TITLE_EXACT + FILE_FULL + DESC_MAX;

    let title_weight = if main_fp.normalized_title == pr_fp.normalized_title {
        TITLE_EXACT
    } else {
        TITLE_EXACT * field_similarity(&main_fp.normalized_title, &pr_fp.normalized_title)
    };
    let file_weight = if main_fp.full_path == pr_fp.full_path {
        FILE_FULL
    } else {
        FILE_BASENAME
    };
    let description_weight =
        DESC_MAX * field_similarity(&main_fp.normalized_description, &pr_fp.normalized_description);

    let score = 100.0 * (title_weight + description_weight + file_weight) / TOTAL;
    score.clamp(0.0, 100.0).round() as u8
}

fn fingerprint_of(issue: &Issue) -> Fingerprint {
    Fingerprint::of(&issue.title, &issue.description, &issue.location, issue.category)
}

/// Computes all candidate matches between `main_issues` and `pr_issues`,
/// then greedily consumes them highest-confidence-first, breaking ties by
/// severity (critical first), per spec §4.7: "greedy by highest confidence,
/// then by severity".
#[must_use]
pub fn greedy_match(main_issues: &[Issue], pr_issues: &[Issue]) -> Vec<MatchedPair> {
    let main_fps: Vec<Fingerprint> = main_issues.iter().map(fingerprint_of).collect();
    let pr_fps: Vec<Fingerprint> = pr_issues.iter().map(fingerprint_of).collect();

    let mut candidates: Vec<MatchedPair> = Vec::new();
    for (mi, main_fp) in main_fps.iter().enumerate() {
        for (pi, pr_fp) in pr_fps.iter().enumerate() {
            if main_fp.matches(pr_fp) {
                candidates.push(MatchedPair {
                    main_index: mi,
                    pr_index: pi,
                    confidence: match_confidence(main_fp, pr_fp),
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.confidence.cmp(&a.confidence).then_with(|| {
            let sev_a = main_issues[a.main_index].severity.rank();
            let sev_b = main_issues[b.main_index].severity.rank();
            sev_a.cmp(&sev_b)
        })
    });

    let mut main_taken = vec![false; main_issues.len()];
    let mut pr_taken = vec![false; pr_issues.len()];
    let mut accepted = Vec::new();
    for candidate in candidates {
        if main_taken[candidate.main_index] || pr_taken[candidate.pr_index] {
            continue;
        }
        main_taken[candidate.main_index] = true;
        pr_taken[candidate.pr_index] = true;
        accepted.push(candidate);
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_types::issue::{Category, IssueBuilder, Location, Severity};

    fn issue(title: &str, file: &str, line: i64, sev: Severity) -> Issue {
        IssueBuilder::new(title, "same description text", sev, Category::Security, Location::new(file, line, None).unwrap())
            .build()
    }

    #[test]
    fn matches_ignoring_line_drift() {
        let main = vec![issue("Missing error handling", "src/api/client.ts", 45, Severity::High)];
        let pr = vec![issue("Missing error handling", "src/api/client.ts", 247, Severity::High)];
        let pairs = greedy_match(&main, &pr);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].main_index, 0);
        assert_eq!(pairs[0].pr_index, 0);
    }

    #[test]
    fn each_side_consumed_at_most_once() {
        let main = vec![
            issue("leak", "src/a.rs", 1, Severity::High),
            issue("leak", "src/a.rs", 2, Severity::High),
        ];
        let pr = vec![issue("leak", "src/a.rs", 1, Severity::High)];
        let pairs = greedy_match(&main, &pr);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn no_match_across_different_files() {
        let main = vec![issue("leak", "src/a.rs", 1, Severity::High)];
        let pr = vec![issue("leak", "src/b.rs", 1, Severity::High)];
        assert!(greedy_match(&main, &pr).is_empty());
    }
}

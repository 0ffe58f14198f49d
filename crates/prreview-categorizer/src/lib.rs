//! Issue Matcher / Categorizer (C7): fingerprint-based matching across
//! branches, producing NEW / FIXED / UNCHANGED buckets with confidence
//! (spec §4.7).
//!
//! Pure and deterministic: given the same two issue lists (same order, same
//! content), `categorize` always produces the same bucket membership (P4).
//! It never touches the network, the filesystem, or the LLM.

mod dedupe;
mod match_engine;
mod summary;

pub use match_engine::MatchedPair;

use prreview_types::issue::{Issue, Status};
use prreview_types::result::{sort_issues, ComparisonResult};

/// Categorizes `main_issues` against `pr_issues` (spec §4.7):
///
/// - `unchanged`: greedily matched pairs, one issue consumed from each side.
/// - `fixed`: `main_issues` left unmatched.
/// - `new`: `pr_issues` left unmatched.
///
/// Each bucket is then deduplicated by fingerprint (keeping the
/// highest-confidence record and an `occurrences` count) and sorted per
/// spec §3/§5. `warnings` is left empty; the pipeline coordinator appends
/// pipeline-level warnings afterward.
#[must_use]
pub fn categorize(main_issues: &[Issue], pr_issues: &[Issue]) -> ComparisonResult {
    let pairs = match_engine::greedy_match(main_issues, pr_issues);

    let mut main_taken = vec![false; main_issues.len()];
    let mut pr_taken = vec![false; pr_issues.len()];

    let mut unchanged: Vec<Issue> = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        main_taken[pair.main_index] = true;
        pr_taken[pair.pr_index] = true;
        // Unchanged issues surface the PR-side record: it reflects the
        // code as it stands now, with the same fingerprint as main's.
        let mut issue = pr_issues[pair.pr_index].clone();
        issue.status = Some(Status::Unchanged);
        unchanged.push(issue);
    }

    let mut fixed: Vec<Issue> = main_issues
        .iter()
        .enumerate()
        .filter(|(i, _)| !main_taken[*i])
        .map(|(_, issue)| {
            let mut issue = issue.clone();
            issue.status = Some(Status::Fixed);
            issue
        })
        .collect();

    let mut new: Vec<Issue> = pr_issues
        .iter()
        .enumerate()
        .filter(|(i, _)| !pr_taken[*i])
        .map(|(_, issue)| {
            let mut issue = issue.clone();
            issue.status = Some(Status::New);
            issue
        })
        .collect();

    let mut unchanged = dedupe::dedupe_bucket(unchanged);
    fixed = dedupe::dedupe_bucket(fixed);
    new = dedupe::dedupe_bucket(new);

    sort_issues(&mut new);
    sort_issues(&mut fixed);
    sort_issues(&mut unchanged);

    let summary = summary::compute(&new, &fixed, &unchanged);

    ComparisonResult::new(new, fixed, unchanged, summary, Vec::new())
}

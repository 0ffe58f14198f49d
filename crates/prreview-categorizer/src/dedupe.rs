//! Post-categorization deduplication (spec §4.7): within a single bucket,
//! collapse issues whose fingerprints match, keeping the highest-confidence
//! record and recording how many occurrences were merged into it.

use prreview_types::issue::Issue;
use prreview_types::Fingerprint;

fn fingerprint_of(issue: &Issue) -> Fingerprint {
    Fingerprint::of(&issue.title, &issue.description, &issue.location, issue.category)
}

/// Collapses fingerprint-matching issues within `bucket` in place. The
/// surviving record's `confidence` is the highest among the group it
/// absorbed; its `occurrences` counts how many records were merged.
#[must_use]
pub fn dedupe_bucket(bucket: Vec<Issue>) -> Vec<Issue> {
    let mut kept: Vec<(Fingerprint, Issue)> = Vec::new();

    for issue in bucket {
        let fp = fingerprint_of(&issue);
        if let Some((_, existing)) = kept.iter_mut().find(|(existing_fp, _)| existing_fp.matches(&fp)) {
            existing.occurrences += issue.occurrences;
            if issue.confidence.unwrap_or(0) > existing.confidence.unwrap_or(0) {
                let occurrences = existing.occurrences;
                *existing = issue;
                existing.occurrences = occurrences;
            }
        } else {
            kept.push((fp, issue));
        }
    }

    kept.into_iter().map(|(_, issue)| issue).collect()
}

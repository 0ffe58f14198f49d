//! Deterministic fingerprinting used to identify an issue without relying on
//! line numbers (spec §4.7, Glossary: "Fingerprint").
//!
//! The same fingerprint drives two consumers: the adaptive analyzer's
//! intra-branch dedup (§4.5 step 3d) and the categorizer's cross-branch
//! match function (§4.7). Both need `normalizedTitle`, a normalized
//! description prefix, the file basename, and the category; only the
//! categorizer additionally looks at the full file path and 3-gram
//! similarity, which is why `Fingerprint` exposes those pieces individually
//! rather than collapsing straight to a boolean.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::issue::{Category, Location};

static SEVERITY_WORDS: &[&str] = &["critical", "high", "medium", "low", "severe", "minor"];
static PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercases, strips punctuation, collapses whitespace, and removes bare
/// severity words. The normalization rule shared by title and description
/// (§4.7).
#[must_use]
pub fn normalize(s: &str) -> String {
    let lower = s.to_ascii_lowercase();
    let no_punct = PUNCT_RE.replace_all(&lower, " ");
    let collapsed = WS_RE.replace_all(no_punct.trim(), " ");
    collapsed
        .split(' ')
        .filter(|w| !SEVERITY_WORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The fingerprint tuple from §4.7, plus a derived stable id for I3
/// uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub normalized_title: String,
    pub normalized_description: String,
    pub file_basename: String,
    pub full_path: String,
    pub category: Category,
}

impl Fingerprint {
    /// Builds a fingerprint from an issue's title/description/location/category.
    #[must_use]
    pub fn of(title: &str, description: &str, location: &Location, category: Category) -> Self {
        let normalized_description: String = normalize(description).chars().take(120).collect();
        Self {
            normalized_title: normalize(title),
            normalized_description,
            file_basename: location.basename().to_string(),
            full_path: location.file.clone(),
            category,
        }
    }

    /// A stable content-addressed id (blake3 hex).
    #[must_use]
    pub fn id(&self) -> String {
        let payload = format!(
            "{:?}|{}|{}",
            self.category, self.normalized_title, self.file_basename
        );
        blake3::hash(payload.as_bytes()).to_hex().to_string()
    }

    fn trigrams(&self) -> HashSet<String> {
        let joined = format!("{} {}", self.normalized_title, self.normalized_description);
        let tokens: Vec<&str> = joined.split_whitespace().collect();
        if tokens.len() < 3 {
            return tokens
                .windows(1)
                .map(|w| w.join(" "))
                .collect::<HashSet<_>>();
        }
        tokens
            .windows(3)
            .map(|w| w.join(" "))
            .collect::<HashSet<_>>()
    }

    /// Jaccard similarity of 3-gram token sets over
    /// `normalizedTitle + normalizedDescription` (§4.7).
    #[must_use]
    pub fn jaccard_similarity(&self, other: &Self) -> f64 {
        let a = self.trigrams();
        let b = other.trigrams();
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        let intersection = a.intersection(&b).count();
        let union = a.union(&b).count();
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }

    /// The match predicate from §4.7: same category, AND (title equal OR
    /// trigram similarity ≥ 0.75), AND (basename equal OR full path equal).
    /// Deliberately ignores line numbers (P5).
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        if self.category != other.category {
            return false;
        }
        let title_match =
            self.normalized_title == other.normalized_title || self.jaccard_similarity(other) >= 0.75;
        if !title_match {
            return false;
        }
        self.file_basename == other.file_basename || self.full_path == other.full_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Location;

    fn fp(title: &str, desc: &str, file: &str, cat: Category) -> Fingerprint {
        Fingerprint::of(title, desc, &Location::new(file, 1, None).unwrap(), cat)
    }

    #[test]
    fn normalize_strips_severity_words_and_punctuation() {
        assert_eq!(normalize("Critical: SQL Injection!"), "sql injection");
    }

    #[test]
    fn matches_ignores_line_number() {
        let a = fp(
            "Missing error handling",
            "no catch clause",
            "src/api/client.ts",
            Category::CodeQuality,
        );
        let b = fp(
            "Missing error handling",
            "no catch clause",
            "src/api/client.ts",
            Category::CodeQuality,
        );
        assert!(a.matches(&b));
    }

    #[test]
    fn matches_requires_same_category() {
        let a = fp("leak", "memory leak in loop", "src/a.rs", Category::Performance);
        let b = fp("leak", "memory leak in loop", "src/a.rs", Category::Security);
        assert!(!a.matches(&b));
    }

    #[test]
    fn matches_falls_back_to_trigram_similarity() {
        let a = fp(
            "unused import detected here",
            "the module is imported but never referenced anywhere",
            "src/a.rs",
            Category::CodeQuality,
        );
        let b = fp(
            "unused import found here",
            "the module is imported but never referenced anywhere",
            "src/a.rs",
            Category::CodeQuality,
        );
        assert!(a.matches(&b));
    }

    #[test]
    fn matches_rejects_different_files() {
        let a = fp("x", "y", "src/a.rs", Category::Other);
        let b = fp("x", "y", "src/b.rs", Category::Other);
        assert!(!a.matches(&b));
    }
}

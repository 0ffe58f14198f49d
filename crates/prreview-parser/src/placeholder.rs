//! Placeholder-path rejection shared by the parser and the validator (spec
//! §4.2, §4.3, Glossary: "Placeholder path").
//!
//! Deliberately conservative: a path that merely *resembles* a placeholder
//! but doesn't match one of these patterns is left for the validator (C3)
//! to reject via filesystem resolution instead of being guessed at here
//! (spec §9: "never silent fabrication of a plausible one").

use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^unknown$").unwrap(),
        Regex::new(r"(?i)^example[./].*").unwrap(),
        Regex::new(r"(?i)^src/main\.\w+$").unwrap(),
        Regex::new(r"^YOUR_.*").unwrap(),
    ]
});

/// Returns true if `file` matches one of the recognized placeholder
/// patterns (`unknown`, `example.*`, `src/main.<lang>`, `YOUR_*`).
#[must_use]
pub fn is_placeholder(file: &str) -> bool {
    PLACEHOLDER_PATTERNS.iter().any(|re| re.is_match(file))
}

//! Fix-Type Classifier (C8) decision logic (spec §4.8 steps 2-3).

use std::collections::HashSet;

use crate::signature::{extract, Signature};
use prreview_types::issue::FixType;

/// Outcome of classifying one `(codeSnippet, suggestedFix)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub fix_type: FixType,
    /// Non-empty iff `fix_type == FixType::B` (I5).
    pub adjustment_notes: Option<String>,
    /// Set when signature extraction failed on either side, per spec §4.8
    /// step 1: "emit `fixType=A` with a low-confidence flag".
    pub low_confidence: bool,
}

fn describe_param_diff(old: &[String], new: &[String]) -> Vec<String> {
    let mut notes = Vec::new();
    let old_set: HashSet<&String> = old.iter().collect();
    let new_set: HashSet<&String> = new.iter().collect();

    let added: Vec<&String> = new.iter().filter(|p| !old_set.contains(p)).collect();
    let removed: Vec<&String> = old.iter().filter(|p| !new_set.contains(p)).collect();

    if !added.is_empty() {
        let names: Vec<&str> = added.iter().map(|s| s.as_str()).collect();
        notes.push(format!("added parameter(s): {}", names.join(", ")));
    }
    if !removed.is_empty() {
        let names: Vec<&str> = removed.iter().map(|s| s.as_str()).collect();
        notes.push(format!("removed parameter(s): {}", names.join(", ")));
    }
    if added.is_empty() && removed.is_empty() && old.len() == new.len() {
        for (o, n) in old.iter().zip(new.iter()) {
            if o != n {
                notes.push(format!("renamed parameter `{o}` to `{n}`"));
            }
        }
    }
    notes
}

fn signatures_equivalent(old: &Signature, new: &Signature) -> bool {
    old.name == new.name
        && old.params == new.params
        && old.return_type == new.return_type
        && old.is_async == new.is_async
}

/// Compares two extracted signatures and builds the Type-B migration notes
/// (spec §4.8 step 3): added/removed/renamed parameters, async-ness change,
/// return-type change, and a generic caller-impact hint.
fn describe_signature_change(old: &Signature, new: &Signature) -> String {
    let mut notes = describe_param_diff(&old.params, &new.params);

    if old.is_async != new.is_async {
        if new.is_async {
            notes.push("function is now async".to_string());
        } else {
            notes.push("function is no longer async".to_string());
        }
    }
    if old.return_type != new.return_type {
        notes.push(format!(
            "return type changed from {} to {}",
            old.return_type.as_deref().unwrap_or("inferred"),
            new.return_type.as_deref().unwrap_or("inferred"),
        ));
    }
    if old.name != new.name {
        notes.push(format!("function renamed from `{}` to `{}`", old.name, new.name));
    }

    notes.push(format!("all callers of `{}` must be updated", old.name));
    notes.join("; ")
}

/// Classifies a suggested fix against its original code (spec §4.8).
///
/// A byte-identical `suggested_fix` is always Type A with no notes (the
/// round-trip law in spec §8). Otherwise: extraction failure on either
/// side yields Type A with `low_confidence = true`; successful extraction
/// on both sides compares name/params/return-type/async-ness and yields
/// Type A only if all four are unchanged.
#[must_use]
pub fn classify(code_snippet: &str, suggested_fix: &str) -> Classification {
    if code_snippet.trim() == suggested_fix.trim() {
        return Classification {
            fix_type: FixType::A,
            adjustment_notes: None,
            low_confidence: false,
        };
    }

    let (Some(old_sig), Some(new_sig)) = (extract(code_snippet), extract(suggested_fix)) else {
        return Classification {
            fix_type: FixType::A,
            adjustment_notes: None,
            low_confidence: true,
        };
    };

    if signatures_equivalent(&old_sig, &new_sig) {
        return Classification {
            fix_type: FixType::A,
            adjustment_notes: None,
            low_confidence: false,
        };
    }

    Classification {
        fix_type: FixType::B,
        adjustment_notes: Some(describe_signature_change(&old_sig, &new_sig)),
        low_confidence: false,
    }
}

//! Regex-based callable signature extraction.
//!
//! Cheap pattern counting over the major language families, not a full
//! parser: count well-formed patterns reliably, avoid complex parsing that
//! might break on edge cases. Extraction failure is a normal, expected
//! outcome (free-form LLM-suggested code rarely parses as a full AST) and
//! is handled by the caller, not here.

use once_cell::sync::Lazy;
use regex::Regex;

/// A callable's signature, extracted well enough to diff across a
/// suggested fix (spec §4.8 step 2): name, parameter names (in order),
/// return type text, and async-ness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<String>,
    pub return_type: Option<String>,
    pub is_async: bool,
}

static JS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(async\s+)?function\s+(\w+)\s*\(([^)]*)\)\s*(?::\s*([\w<>\[\]., ]+?))?\s*\{").unwrap()
});
static JS_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(?:const|let|var)\s+(\w+)\s*=\s*(async\s+)?\(([^)]*)\)\s*(?::\s*([\w<>\[\]., ]+?))?\s*=>").unwrap()
});
static PYTHON_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(async\s+)?def\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*([\w\[\]., ]+?))?\s*:").unwrap()
});
static GO_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)func\s+(\w+)\s*\(([^)]*)\)\s*([\w\[\]*.]+)?\s*\{").unwrap()
});
static C_LIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*([\w<>\[\]:,* ]+?)\s+(\w+)\s*\(([^)]*)\)\s*\{").unwrap()
});

/// Splits a parameter list into bare names, stripping type annotations
/// (`name: Type`), default values (`name = default`), and leading type
/// tokens (`int name`).
fn param_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            let without_default = p.split('=').next().unwrap_or(p).trim();
            let without_type_annotation = without_default.split(':').next().unwrap_or(without_default).trim();
            without_type_annotation
                .split_whitespace()
                .last()
                .unwrap_or(without_type_annotation)
                .trim_start_matches('*')
                .trim_start_matches('&')
                .to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Extracts the first recognizable callable signature from `code` (spec
/// §4.8 step 1: "recognizable patterns for the major families"). Tries
/// JS/TS function declarations, JS/TS arrow functions, Python `def`, Go
/// `func`, then a generic C-like/Java-like `ReturnType name(params) {`
/// fallback, in that order. Returns `None` if nothing matches.
#[must_use]
pub fn extract(code: &str) -> Option<Signature> {
    if let Some(caps) = JS_FUNCTION.captures(code) {
        return Some(Signature {
            name: caps[2].to_string(),
            params: param_names(&caps[3]),
            return_type: caps.get(4).map(|m| m.as_str().trim().to_string()),
            is_async: caps.get(1).is_some(),
        });
    }
    if let Some(caps) = JS_ARROW.captures(code) {
        return Some(Signature {
            name: caps[1].to_string(),
            params: param_names(&caps[3]),
            return_type: caps.get(4).map(|m| m.as_str().trim().to_string()),
            is_async: caps.get(2).is_some(),
        });
    }
    if let Some(caps) = PYTHON_DEF.captures(code) {
        return Some(Signature {
            name: caps[2].to_string(),
            params: param_names(&caps[3]),
            return_type: caps.get(4).map(|m| m.as_str().trim().to_string()),
            is_async: caps.get(1).is_some(),
        });
    }
    if let Some(caps) = GO_FUNC.captures(code) {
        return Some(Signature {
            name: caps[1].to_string(),
            params: param_names(&caps[2]),
            return_type: caps.get(3).map(|m| m.as_str().trim().to_string()),
            is_async: false,
        });
    }
    if let Some(caps) = C_LIKE.captures(code.trim()) {
        let return_type = caps[1].trim().to_string();
        if return_type == "return" || return_type.ends_with(')') {
            return None;
        }
        return Some(Signature {
            name: caps[2].to_string(),
            params: param_names(&caps[3]),
            return_type: Some(return_type),
            is_async: false,
        });
    }
    None
}

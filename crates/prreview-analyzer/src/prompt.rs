//! Prompt construction (spec §4.5 step 3a).

use prreview_types::issue::Issue;

const BASE_TEMPLATE: &str = "\
You are reviewing a single branch of a repository. List every code-quality, \
security, performance, and architectural issue you can find. For each issue \
report: file path, line number, a short title, a description, severity \
(low/medium/high/critical), category, a code snippet, and a suggested fix.";

/// Builds the prompt for iteration `iter` against the issues accumulated so
/// far. Iteration 0 gets the base template verbatim; later iterations
/// append the three directives from spec §4.5 step 3a.
#[must_use]
pub fn build_prompt(iter: u32, accumulated: &[Issue]) -> String {
    if iter == 0 {
        return BASE_TEMPLATE.to_string();
    }

    let mut known_titles: Vec<&str> = accumulated.iter().map(|i| i.title.as_str()).collect();
    known_titles.dedup();

    let missing_snippet_files: Vec<&str> = accumulated
        .iter()
        .filter(|i| i.code_snippet.is_none())
        .map(|i| i.location.file.as_str())
        .collect();

    let mut prompt = String::from(BASE_TEMPLATE);
    prompt.push_str("\n\nThis is a follow-up pass. Continue the review with these constraints:\n");

    if !known_titles.is_empty() {
        prompt.push_str("- Do not repeat any of these already-reported issues:\n");
        for title in &known_titles {
            prompt.push_str(&format!("  - {title}\n"));
        }
    }

    if !missing_snippet_files.is_empty() {
        prompt.push_str("- Provide the exact code snippet for issues previously reported without one, in these files:\n");
        for file in &missing_snippet_files {
            prompt.push_str(&format!("  - {file}\n"));
        }
    }

    prompt.push_str("- Prefer responding with a structured JSON array of issue objects.\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_types::issue::{Category, IssueBuilder, Location, Severity};

    #[test]
    fn first_iteration_uses_base_template_only() {
        let prompt = build_prompt(0, &[]);
        assert_eq!(prompt, BASE_TEMPLATE);
    }

    #[test]
    fn later_iterations_append_dedup_and_snippet_directives() {
        let issue = IssueBuilder::new(
            "Missing bounds check",
            "desc",
            Severity::High,
            Category::Security,
            Location::new("src/a.rs", 10, None).unwrap(),
        )
        .build();
        let prompt = build_prompt(1, &[issue]);
        assert!(prompt.contains("Missing bounds check"));
        assert!(prompt.contains("src/a.rs"));
        assert!(prompt.contains("structured JSON"));
    }
}

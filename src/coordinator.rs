//! Pipeline Coordinator (C9): the library's single public entry point.
//!
//! Wires C6 (branch orchestration) into C7 (categorization) into C8 (fix
//! classification) and owns the run's cancellation signal (spec §4.9).

use std::path::PathBuf;
use std::sync::Arc;

use prreview_analyzer::AnalyzerConfig;
use prreview_cache::Cache;
use prreview_categorizer::categorize;
use prreview_fixclass::classify_all;
use prreview_llm::LlmBackend;
use prreview_orchestrator::Orchestrator;
use prreview_types::issue::Issue;
use prreview_types::request::PipelineRequest;
use prreview_types::result::{ComparisonResult, Warning, WarningKind};
use prreview_types::{CancelToken, PrReviewError};

/// A pair of local checkouts for the two branches under comparison.
/// Materializing these (cloning, fetching, worktree setup) is explicitly
/// the caller's responsibility; git mechanics sit outside this pipeline's
/// contract (spec §1 "deliberately out of scope").
#[derive(Debug, Clone)]
pub struct Checkouts {
    pub main: PathBuf,
    pub pr: PathBuf,
}

impl Checkouts {
    #[must_use]
    pub fn new(main: impl Into<PathBuf>, pr: impl Into<PathBuf>) -> Self {
        Self {
            main: main.into(),
            pr: pr.into(),
        }
    }
}

pub struct Coordinator {
    orchestrator: Orchestrator,
    cache: Arc<Cache>,
    cancel: CancelToken,
}

impl Coordinator {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmBackend>, cache: Arc<Cache>, max_in_flight: usize) -> Self {
        Self {
            orchestrator: Orchestrator::new(llm, cache.clone(), max_in_flight),
            cache,
            cancel: CancelToken::new(),
        }
    }

    /// The cancel signal for this coordinator. Cloning it and calling
    /// `cancel()` from another task propagates into C6 and transitively
    /// into each C5 run (spec §4.9).
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs the full pipeline for `request` against `checkouts` (spec §4.9
    /// sequence: orchestrate, categorize, classify, return).
    ///
    /// # Errors
    /// Propagates `PrReviewError` from C6 (branch analysis / pair timeout
    /// failures).
    #[tracing::instrument(skip(self, checkouts), fields(repo = %request.repo_url, pr = request.pr_number))]
    pub async fn run(&self, request: &PipelineRequest, checkouts: &Checkouts) -> Result<ComparisonResult, PrReviewError> {
        let mut main_cfg = AnalyzerConfig::new(checkouts.main.clone(), request.model_config.clone(), request.options.clone());
        main_cfg.cancel = self.cancel.clone();
        let mut pr_cfg = AnalyzerConfig::new(checkouts.pr.clone(), request.model_config.clone(), request.options.clone());
        pr_cfg.cancel = self.cancel.clone();

        tracing::info!(main_ref = %request.main_ref, pr_ref = %request.pr_ref, "starting branch orchestration");

        let outcome = self
            .orchestrator
            .analyze_pair(&request.repo_url, &request.main_ref, &request.pr_ref, &main_cfg, &pr_cfg)
            .await?;

        let main_issues: Vec<Issue> = outcome.main.map(|a| a.issues).unwrap_or_default();
        let pr_issues: Vec<Issue> = outcome.pr.map(|a| a.issues).unwrap_or_default();

        tracing::info!(
            main_issue_count = main_issues.len(),
            pr_issue_count = pr_issues.len(),
            "branch analysis complete, categorizing"
        );

        let mut result = categorize(&main_issues, &pr_issues);
        result.new_issues = classify_all(result.new_issues);
        result.fixed_issues = classify_all(result.fixed_issues);
        result.unchanged_issues = classify_all(result.unchanged_issues);

        result.warnings.extend(outcome.warnings);
        if self.cache.remote_degraded() {
            result.warnings.push(Warning::new(
                WarningKind::CacheDegraded,
                "remote cache tier unreachable during this run, local tier only".to_string(),
            ));
        }
        if main_issues.is_empty() && pr_issues.is_empty() {
            result.warnings.push(Warning::new(
                WarningKind::PartialConvergence,
                "both branches produced zero issues".to_string(),
            ));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_llm::MockLlmBackend;
    use prreview_types::request::{ModelConfig, PipelineOptions};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    fn checkout_with(file: &str, contents: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(file), contents).unwrap();
        dir
    }

    fn fast_options() -> PipelineOptions {
        PipelineOptions {
            max_iterations: 1,
            per_iteration_timeout: Duration::from_secs(5),
            pair_timeout: Duration::from_secs(10),
            use_cache: false,
            ..PipelineOptions::default()
        }
    }

    #[tokio::test]
    async fn end_to_end_categorizes_and_classifies() {
        let main_dir = checkout_with("auth.js", "function login(u, p) { return u === p; }\n");
        let pr_dir = checkout_with("auth.js", "function login(u, p) { return u === p; }\n");

        let mock = MockLlmBackend::new();
        mock.push_json(
            "main",
            json!([{
                "title": "Plaintext password comparison",
                "description": "Passwords compared without hashing",
                "severity": "high",
                "category": "security",
                "file": "auth.js",
                "line": 1,
            }]),
        );
        mock.push_json("pull/7/head", json!([]));

        let cache = Arc::new(Cache::new(None));
        let coordinator = Coordinator::new(Arc::new(mock), cache, 4);

        let request = PipelineRequest::new(
            "https://example.com/repo",
            7,
            "main",
            "pull/7/head",
            ModelConfig::new("gpt-5"),
        )
        .with_options(fast_options());
        let checkouts = Checkouts::new(main_dir.path(), pr_dir.path());

        let result = coordinator.run(&request, &checkouts).await.unwrap();
        assert_eq!(result.fixed_issues.len(), 1);
        assert!(result.new_issues.is_empty());
    }

    #[tokio::test]
    async fn empty_both_branches_emits_partial_convergence_warning() {
        let main_dir = checkout_with("a.rs", "fn main() {}\n");
        let pr_dir = checkout_with("a.rs", "fn main() {}\n");

        let mock = MockLlmBackend::new();
        mock.push_json("main", json!([]));
        mock.push_json("pull/1/head", json!([]));

        let coordinator = Coordinator::new(Arc::new(mock), Arc::new(Cache::new(None)), 4);
        let request = PipelineRequest::new(
            "https://example.com/repo",
            1,
            "main",
            "pull/1/head",
            ModelConfig::new("gpt-5"),
        )
        .with_options(fast_options());
        let checkouts = Checkouts::new(main_dir.path(), pr_dir.path());

        let result = coordinator.run(&request, &checkouts).await.unwrap();
        assert!(result.warnings.iter().any(|w| w.kind == WarningKind::PartialConvergence));
    }
}

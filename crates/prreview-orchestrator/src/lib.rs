//! Branch Orchestrator (C6): runs the two branch analyzer tasks in
//! parallel, reconciles partial failure, and composes the final issue sets
//! (spec §4.6).
//!
//! No shared mutable state crosses the two tasks beyond the cache (which
//! already shards its own locking, spec §5) and the `max_in_flight`
//! semaphore gating both tasks' LLM calls. Neither task observes the
//! other's progress.

mod gated_backend;

pub use gated_backend::SemaphoreGatedBackend;

use std::sync::Arc;

use tokio::time::timeout;

use prreview_analyzer::{Analyzer, AnalyzerConfig};
use prreview_cache::Cache;
use prreview_llm::LlmBackend;
use prreview_types::result::{BranchAnalysis, Warning, WarningKind};
use prreview_types::PrReviewError;

/// Output of `analyze_pair`: both branch analyses (a missing one means that
/// branch failed and `cfg.require_both_branches` was `false`) plus any
/// degradation warnings observed while producing them.
pub struct PairOutcome {
    pub main: Option<BranchAnalysis>,
    pub pr: Option<BranchAnalysis>,
    pub warnings: Vec<Warning>,
}

pub struct Orchestrator {
    analyzer: Arc<Analyzer>,
}

impl Orchestrator {
    /// Builds an orchestrator whose LLM calls from both branch tasks share
    /// one semaphore bounding `cfg.max_in_flight` (spec §5).
    #[must_use]
    pub fn new(llm: Arc<dyn LlmBackend>, cache: Arc<Cache>, max_in_flight: usize) -> Self {
        let gated: Arc<dyn LlmBackend> = Arc::new(SemaphoreGatedBackend::new(llm, max_in_flight));
        Self {
            analyzer: Arc::new(Analyzer::new(gated, cache)),
        }
    }

    /// Launches two concurrent analyzer tasks, one for `main_ref` against
    /// `main_cfg` and one for `pr_ref` against `pr_cfg`. Each branch gets
    /// its own `repo_checkout_path` since git-checkout mechanics sit outside
    /// this crate's contract (spec §9 "git cloning mechanics" is an external
    /// collaborator). Waits for both, bounded by `pair_timeout` (taken from
    /// `main_cfg.options`; callers are expected to use matching `options` on
    /// both configs), and reconciles partial failure per spec §4.6.
    ///
    /// # Errors
    /// Returns `PrReviewError::PipelineFailed` if both branches fail, if one
    /// branch fails while `require_both_branches` is `true`, or if the pair
    /// timeout elapses before both tasks finish.
    pub async fn analyze_pair(
        &self,
        repo_url: &str,
        main_ref: &str,
        pr_ref: &str,
        main_cfg: &AnalyzerConfig,
        pr_cfg: &AnalyzerConfig,
    ) -> Result<PairOutcome, PrReviewError> {
        let repo_url_main = repo_url.to_string();
        let repo_url_pr = repo_url.to_string();
        let main_ref_owned = main_ref.to_string();
        let pr_ref_owned = pr_ref.to_string();
        let analyzer_main = self.analyzer.clone();
        let analyzer_pr = self.analyzer.clone();
        let cfg_main = main_cfg.clone();
        let cfg_pr = pr_cfg.clone();
        let pair_timeout = main_cfg.options.pair_timeout;
        let require_both_branches = main_cfg.options.require_both_branches;
        let cancel_main = main_cfg.cancel.clone();
        let cancel_pr = pr_cfg.cancel.clone();

        let main_task = tokio::spawn(async move {
            analyzer_main.analyze_branch(&repo_url_main, &main_ref_owned, &cfg_main).await
        });
        let pr_task = tokio::spawn(async move {
            analyzer_pr.analyze_branch(&repo_url_pr, &pr_ref_owned, &cfg_pr).await
        });

        let joined = timeout(pair_timeout, async {
            let (main_result, pr_result) = tokio::join!(main_task, pr_task);
            (
                main_result.unwrap_or_else(|e| {
                    Err(PrReviewError::BranchAnalysisFailed {
                        branch_ref: main_ref.to_string(),
                        cause: format!("analyzer task panicked: {e}"),
                    })
                }),
                pr_result.unwrap_or_else(|e| {
                    Err(PrReviewError::BranchAnalysisFailed {
                        branch_ref: pr_ref.to_string(),
                        cause: format!("analyzer task panicked: {e}"),
                    })
                }),
            )
        })
        .await;

        let (main_result, pr_result) = match joined {
            Ok(pair) => pair,
            Err(_elapsed) => {
                cancel_main.cancel();
                cancel_pr.cancel();
                return Err(PrReviewError::PipelineFailed(format!(
                    "pair timeout ({pair_timeout:?}) exceeded before both branches finished"
                )));
            }
        };

        reconcile(main_result, pr_result, require_both_branches)
    }
}

fn reconcile(
    main_result: Result<BranchAnalysis, PrReviewError>,
    pr_result: Result<BranchAnalysis, PrReviewError>,
    require_both: bool,
) -> Result<PairOutcome, PrReviewError> {
    let mut warnings = Vec::new();

    match (main_result, pr_result) {
        (Ok(main), Ok(pr)) => {
            warnings.extend(main.warnings.clone());
            warnings.extend(pr.warnings.clone());
            Ok(PairOutcome {
                main: Some(main),
                pr: Some(pr),
                warnings,
            })
        }
        (Ok(main), Err(pr_err)) => {
            if require_both {
                return Err(PrReviewError::PipelineFailed(format!(
                    "pr branch analysis failed: {pr_err}"
                )));
            }
            warnings.extend(main.warnings.clone());
            warnings.push(Warning::new(
                WarningKind::BranchFailed,
                format!("pr branch analysis failed: {pr_err}"),
            ));
            Ok(PairOutcome {
                main: Some(main),
                pr: None,
                warnings,
            })
        }
        (Err(main_err), Ok(pr)) => {
            if require_both {
                return Err(PrReviewError::PipelineFailed(format!(
                    "main branch analysis failed: {main_err}"
                )));
            }
            warnings.extend(pr.warnings.clone());
            warnings.push(Warning::new(
                WarningKind::BranchFailed,
                format!("main branch analysis failed: {main_err}"),
            ));
            Ok(PairOutcome {
                main: None,
                pr: Some(pr),
                warnings,
            })
        }
        (Err(main_err), Err(pr_err)) => Err(PrReviewError::PipelineFailed(format!(
            "both branches failed: main={main_err}, pr={pr_err}"
        ))),
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

    fn checkout() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\n").unwrap();
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
    async fn both_branches_succeed_independently() {
        let dir = checkout();
        let mock = MockLlmBackend::new();
        mock.push_json("main", json!([]));
        mock.push_json("pull/1/head", json!([]));

        let orchestrator = Orchestrator::new(Arc::new(mock), Arc::new(Cache::new(None)), 4);
        let main_cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());
        let pr_cfg = main_cfg.clone();

        let outcome = orchestrator
            .analyze_pair("https://example.com/repo", "main", "pull/1/head", &main_cfg, &pr_cfg)
            .await
            .unwrap();
        assert!(outcome.main.is_some());
        assert!(outcome.pr.is_some());
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn one_branch_failure_surfaces_as_warning_when_not_required() {
        let dir = checkout();
        let mock = MockLlmBackend::new();
        mock.push_json("main", json!([]));
        mock.push_error("pull/1/head", prreview_llm::LlmError::Misconfiguration("bad key".into()));

        let orchestrator = Orchestrator::new(Arc::new(mock), Arc::new(Cache::new(None)), 4);
        let mut options = fast_options();
        options.require_both_branches = false;
        let main_cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), options);
        let pr_cfg = main_cfg.clone();

        let outcome = orchestrator
            .analyze_pair("https://example.com/repo", "main", "pull/1/head", &main_cfg, &pr_cfg)
            .await
            .unwrap();
        assert!(outcome.main.is_some());
        assert!(outcome.pr.is_none());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, WarningKind::BranchFailed);
    }

    #[tokio::test]
    async fn one_branch_failure_fails_fast_when_required() {
        let dir = checkout();
        let mock = MockLlmBackend::new();
        mock.push_json("main", json!([]));
        mock.push_error("pull/1/head", prreview_llm::LlmError::Misconfiguration("bad key".into()));

        let orchestrator = Orchestrator::new(Arc::new(mock), Arc::new(Cache::new(None)), 4);
        let main_cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());
        let pr_cfg = main_cfg.clone();

        let result = orchestrator
            .analyze_pair("https://example.com/repo", "main", "pull/1/head", &main_cfg, &pr_cfg)
            .await;
        assert!(matches!(result, Err(PrReviewError::PipelineFailed(_))));
    }

    #[tokio::test]
    async fn both_branches_failing_is_always_an_error() {
        let dir = checkout();
        let mock = MockLlmBackend::new();
        mock.push_error("main", prreview_llm::LlmError::ConnRefused);
        mock.push_error("pull/1/head", prreview_llm::LlmError::ConnRefused);

        let orchestrator = Orchestrator::new(Arc::new(mock), Arc::new(Cache::new(None)), 4);
        let mut options = fast_options();
        options.require_both_branches = false;
        let main_cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), options);
        let pr_cfg = main_cfg.clone();

        let result = orchestrator
            .analyze_pair("https://example.com/repo", "main", "pull/1/head", &main_cfg, &pr_cfg)
            .await;
        assert!(matches!(result, Err(PrReviewError::PipelineFailed(_))));
    }
}

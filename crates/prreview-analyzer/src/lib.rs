//! Adaptive Analyzer (C5): the per-branch iterative LLM → parse → validate →
//! merge loop (spec §4.5).

mod prompt;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use prreview_cache::{cache_key, Cache};
use prreview_llm::{LlmBackend, LlmInvocation, LlmOpts};
use prreview_parser::{parse, BranchContext};
use prreview_types::issue::Issue;
use prreview_types::request::{ModelConfig, PipelineOptions};
use prreview_types::result::{BranchAnalysis, Warning, WarningKind};
use prreview_types::{CancelToken, Fingerprint, PrReviewError};
use prreview_validation::validate;

/// Validation filtering out at least this fraction of raw issues across a
/// branch's run is a user-visible degradation (spec §7).
const HIGH_FILTER_RATE_THRESHOLD: f64 = 0.5;

/// Configuration for a single `analyze_branch` call (spec §4.5 `cfg`).
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub repo_checkout_path: PathBuf,
    pub model_config: ModelConfig,
    pub options: PipelineOptions,
    /// Part of the cache key tuple (spec §4.4); bumped whenever the prompt
    /// template changes in a way that would invalidate prior cached output.
    pub prompt_version: String,
    pub cancel: CancelToken,
}

impl AnalyzerConfig {
    #[must_use]
    pub fn new(repo_checkout_path: PathBuf, model_config: ModelConfig, options: PipelineOptions) -> Self {
        Self {
            repo_checkout_path,
            model_config,
            options,
            prompt_version: "v1".to_string(),
            cancel: CancelToken::new(),
        }
    }
}

pub struct Analyzer {
    llm: Arc<dyn LlmBackend>,
    cache: Arc<Cache>,
}

impl Analyzer {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmBackend>, cache: Arc<Cache>) -> Self {
        Self { llm, cache }
    }

    /// Runs the adaptive loop for one branch (spec §4.5).
    ///
    /// # Errors
    /// Returns `PrReviewError::BranchAnalysisFailed` if the first iteration
    /// fails outright with no prior accumulated results to fall back on.
    pub async fn analyze_branch(
        &self,
        repo_url: &str,
        branch_ref: &str,
        cfg: &AnalyzerConfig,
    ) -> Result<BranchAnalysis, PrReviewError> {
        let key = cache_key(repo_url, branch_ref, &cfg.model_config.model_id, &cfg.prompt_version);

        if cfg.options.use_cache {
            if let Some(hit) = self.cache.get(&key).await {
                tracing::debug!(branch = branch_ref, "branch analysis cache hit");
                return Ok(hit);
            }
        }

        let mut accumulated: Vec<Issue> = Vec::new();
        let mut iter: u32 = 0;
        let mut consecutive_zero_delta: u32 = 0;
        let mut stable_runs: u32 = 0;
        let mut converged = false;
        let mut raw_total: usize = 0;
        let mut valid_total: usize = 0;

        while iter < cfg.options.max_iterations.max(1) {
            if cfg.cancel.is_cancelled() {
                tracing::info!(branch = branch_ref, iter, "analysis cancelled at iteration boundary");
                break;
            }

            let prompt = prompt::build_prompt(iter, &accumulated);
            let opts = LlmOpts::new(0.2, 4096, cfg.options.per_iteration_timeout);
            let invocation =
                LlmInvocation::new(repo_url, branch_ref, prompt, &cfg.model_config.model_id, opts);

            let call = timeout(cfg.options.per_iteration_timeout, self.llm.analyze(invocation));
            let raw = match call.await {
                Ok(Ok(raw)) => raw,
                Ok(Err(err)) => {
                    if iter == 0 && accumulated.is_empty() {
                        return Err(PrReviewError::BranchAnalysisFailed {
                            branch_ref: branch_ref.to_string(),
                            cause: err.to_string(),
                        });
                    }
                    tracing::warn!(branch = branch_ref, iter, error = %err, "iteration failed, preserving partial results");
                    break;
                }
                Err(_elapsed) => {
                    if iter == 0 && accumulated.is_empty() {
                        return Err(PrReviewError::BranchAnalysisFailed {
                            branch_ref: branch_ref.to_string(),
                            cause: "iteration timed out".to_string(),
                        });
                    }
                    tracing::warn!(branch = branch_ref, iter, "iteration timed out, preserving partial results");
                    break;
                }
            };

            let ctx = BranchContext::new(branch_ref);
            let outcome = parse(&raw, &ctx);
            let validated = validate(outcome.issues, &cfg.repo_checkout_path);
            raw_total += validated.stats.total;
            valid_total += validated.stats.valid;

            let (new_unique, snippet_filled) = merge(&mut accumulated, validated.valid);

            if new_unique == 0 {
                consecutive_zero_delta += 1;
                if snippet_filled > 0 {
                    stable_runs += 1;
                }
            } else {
                consecutive_zero_delta = 0;
            }

            iter += 1;

            if consecutive_zero_delta >= 2 || stable_runs >= 2 {
                converged = true;
                break;
            }
        }

        prreview_types::result::sort_issues(&mut accumulated);
        let completeness = BranchAnalysis::compute_completeness(&accumulated);

        let mut warnings = Vec::new();
        if raw_total > 0 {
            let filtered = raw_total - valid_total;
            let filtered_fraction = filtered as f64 / raw_total as f64;
            if filtered_fraction >= HIGH_FILTER_RATE_THRESHOLD {
                tracing::warn!(branch = branch_ref, filtered, raw_total, "validation filtered a high fraction of raw issues");
                warnings.push(Warning::new(
                    WarningKind::HighFilterRate,
                    format!(
                        "validation filtered {filtered}/{raw_total} raw issues ({:.0}%) for branch {branch_ref}",
                        filtered_fraction * 100.0
                    ),
                ));
            }
        }

        let analysis = BranchAnalysis {
            branch_ref: branch_ref.to_string(),
            issues: accumulated,
            iterations: iter,
            converged,
            completeness,
            model_id: cfg.model_config.model_id.clone(),
            warnings,
        };

        if cfg.options.use_cache {
            self.cache.put(&key, analysis.clone(), cfg.options.cache_ttl).await;
        }

        Ok(analysis)
    }
}

/// Merges newly validated issues into `accumulated` by fingerprint (spec
/// §4.5 step 3d). Returns `(new_unique, snippet_filled)`.
fn merge(accumulated: &mut Vec<Issue>, incoming: Vec<Issue>) -> (usize, usize) {
    let mut new_unique = 0;
    let mut snippet_filled = 0;

    for issue in incoming {
        let incoming_fp = Fingerprint::of(&issue.title, &issue.description, &issue.location, issue.category);
        let existing = accumulated.iter_mut().find(|existing| {
            let existing_fp =
                Fingerprint::of(&existing.title, &existing.description, &existing.location, existing.category);
            existing_fp.matches(&incoming_fp)
        });

        match existing {
            None => {
                accumulated.push(issue);
                new_unique += 1;
            }
            Some(existing) if existing.code_snippet.is_none() && issue.code_snippet.is_some() => {
                existing.code_snippet = issue.code_snippet;
                snippet_filled += 1;
            }
            Some(_) => {
                // Duplicate with nothing new to contribute; discarded per spec §4.5 step 3d.
            }
        }
    }

    (new_unique, snippet_filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prreview_llm::MockLlmBackend;
    use prreview_types::request::PipelineOptions;
    use serde_json::json;
    use tempfile::tempdir;

    fn checkout_with(file: &str, contents: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let path = dir.path().join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        dir
    }

    fn fast_options() -> PipelineOptions {
        PipelineOptions {
            max_iterations: 3,
            per_iteration_timeout: Duration::from_secs(5),
            ..PipelineOptions::default()
        }
    }

    #[tokio::test]
    async fn converges_after_two_zero_delta_iterations() {
        let dir = checkout_with("src/a.rs", "fn main() {\n    let x = 1;\n}\n");
        let mock = MockLlmBackend::new();
        mock.push_json(
            "pr/7",
            json!([{"file": "src/a.rs", "line": 2, "title": "unused var", "severity": "low"}]),
        );
        // Second and third calls repeat nothing new -> converge before iter 3.
        mock.push_json("pr/7", json!([]));
        mock.push_json("pr/7", json!([]));

        let analyzer = Analyzer::new(Arc::new(mock), Arc::new(Cache::new(None)));
        let mut cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());
        cfg.options.use_cache = false;

        let result = analyzer.analyze_branch("https://example.com/repo", "pr/7", &cfg).await.unwrap();
        assert_eq!(result.issues.len(), 1);
        assert!(result.converged);
        assert!(result.iterations <= 3);
    }

    #[tokio::test]
    async fn first_iteration_failure_with_no_accumulated_issues_is_an_error() {
        let dir = checkout_with("src/a.rs", "fn main() {}\n");
        let mock = MockLlmBackend::new();
        mock.push_error("pr/1", prreview_llm::LlmError::Misconfiguration("bad key".into()));

        let analyzer = Analyzer::new(Arc::new(mock), Arc::new(Cache::new(None)));
        let mut cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());
        cfg.options.use_cache = false;

        let result = analyzer.analyze_branch("https://example.com/repo", "pr/1", &cfg).await;
        assert!(matches!(result, Err(PrReviewError::BranchAnalysisFailed { .. })));
    }

    #[tokio::test]
    async fn later_iteration_failure_preserves_partial_results() {
        let dir = checkout_with("src/a.rs", "fn main() {\n    let x = 1;\n}\n");
        let mock = MockLlmBackend::new();
        mock.push_json(
            "pr/2",
            json!([{"file": "src/a.rs", "line": 2, "title": "unused var", "severity": "low"}]),
        );
        mock.push_error("pr/2", prreview_llm::LlmError::ConnRefused);

        let analyzer = Analyzer::new(Arc::new(mock), Arc::new(Cache::new(None)));
        let mut cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());
        cfg.options.use_cache = false;
        cfg.options.max_iterations = 5;

        let result = analyzer.analyze_branch("https://example.com/repo", "pr/2", &cfg).await.unwrap();
        assert_eq!(result.issues.len(), 1);
        assert!(!result.converged);
    }

    #[tokio::test]
    async fn high_filter_rate_is_reported_as_a_warning() {
        let dir = checkout_with("src/a.rs", "fn main() {\n    let x = 1;\n}\n");
        let mock = MockLlmBackend::new();
        mock.push_json(
            "pr/4",
            json!([
                {"file": "src/a.rs", "line": 2, "title": "unused var", "severity": "low"},
                {"file": "src/missing.rs", "line": 1, "title": "ghost issue", "severity": "low"},
            ]),
        );

        let analyzer = Analyzer::new(Arc::new(mock), Arc::new(Cache::new(None)));
        let mut cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());
        cfg.options.use_cache = false;
        cfg.options.max_iterations = 1;

        let result = analyzer.analyze_branch("https://example.com/repo", "pr/4", &cfg).await.unwrap();
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::HighFilterRate);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_llm_entirely() {
        let dir = checkout_with("src/a.rs", "fn main() {}\n");
        let mock = MockLlmBackend::new();
        mock.push_json("pr/3", json!([]));

        let cache = Arc::new(Cache::new(None));
        let analyzer = Analyzer::new(Arc::new(mock), cache.clone());
        let cfg = AnalyzerConfig::new(dir.path().to_path_buf(), ModelConfig::new("gpt-5"), fast_options());

        let first = analyzer.analyze_branch("https://example.com/repo", "pr/3", &cfg).await.unwrap();
        let key = cache_key("https://example.com/repo", "pr/3", "gpt-5", &cfg.prompt_version);
        assert!(cache.get(&key).await.is_some());
        let _ = first;

        // A fresh analyzer instance still observes the cache hit.
        let mock2 = MockLlmBackend::new();
        let analyzer2 = Analyzer::new(Arc::new(mock2), cache);
        let second = analyzer2.analyze_branch("https://example.com/repo", "pr/3", &cfg).await.unwrap();
        assert_eq!(second.issues.len(), 0);
    }
}

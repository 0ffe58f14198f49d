//! Pipeline Coordinator (C9) input types (spec §4.9, §3 addition).

use std::time::Duration;

/// Opaque model identifier handed to the coordinator by the external
/// model-selection collaborator (spec §1, §6). The coordinator forwards it
/// to C1 without interpreting it further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_id: String,
    pub fallback_model_id: Option<String>,
}

impl ModelConfig {
    #[must_use]
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            fallback_model_id: None,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback_model_id = Some(fallback.into());
        self
    }
}

/// Tunable knobs enumerated in spec §6 ("Environment inputs"), surfaced as a
/// typed struct so both env-var loading and direct library callers populate
/// the same type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub use_cache: bool,
    pub require_both_branches: bool,
    pub max_iterations: u32,
    pub per_iteration_timeout: Duration,
    pub pair_timeout: Duration,
    pub max_in_flight: usize,
    pub cache_ttl: Duration,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        let per_iteration_timeout = Duration::from_secs(120);
        Self {
            use_cache: true,
            require_both_branches: true,
            max_iterations: 5,
            per_iteration_timeout,
            pair_timeout: per_iteration_timeout * 2,
            max_in_flight: 4,
            cache_ttl: Duration::from_secs(3600),
        }
    }
}

/// The `request` argument of the Pipeline Coordinator's public contract
/// (spec §4.9).
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub repo_url: String,
    pub pr_number: u64,
    pub main_ref: String,
    pub pr_ref: String,
    pub model_config: ModelConfig,
    pub options: PipelineOptions,
}

impl PipelineRequest {
    #[must_use]
    pub fn new(
        repo_url: impl Into<String>,
        pr_number: u64,
        main_ref: impl Into<String>,
        pr_ref: impl Into<String>,
        model_config: ModelConfig,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            pr_number,
            main_ref: main_ref.into(),
            pr_ref: pr_ref.into(),
            model_config,
            options: PipelineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }
}

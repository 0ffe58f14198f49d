//! Typed configuration for the PR analysis pipeline.
//!
//! Explicit env vars take precedence over a `prreview.toml` file, which
//! takes precedence over built-in defaults. Nothing reads a process-wide
//! global; callers construct a `Config` once and thread it through
//! explicitly.

mod error;
mod file;

pub use error::ConfigError;

use std::env;
use std::time::Duration;

use prreview_types::request::PipelineOptions;

/// Top-level configuration, assembled from env vars, an optional TOML file,
/// and defaults, in that precedence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub llm_url: String,
    pub llm_key: String,
    pub cache_url: Option<String>,
    pub options: PipelineOptions,
}

impl Config {
    /// Loads configuration from environment variables, falling back to an
    /// optional `prreview.toml` in `config_dir` (if provided) and then to
    /// built-in defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingRequired` if `LLM_URL` or `LLM_KEY` is
    /// absent from both the environment and the file, and
    /// `ConfigError::InvalidValue` if a numeric/duration field fails to
    /// parse.
    pub fn load(config_dir: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let file_config = config_dir
            .map(|dir| dir.join("prreview.toml"))
            .filter(|p| p.exists())
            .map(|p| file::FileConfig::load(&p))
            .transpose()?
            .unwrap_or_default();

        let llm_url = env::var("LLM_URL")
            .ok()
            .or(file_config.llm_url)
            .ok_or(ConfigError::MissingRequired("LLM_URL"))?;
        let llm_key = env::var("LLM_KEY")
            .ok()
            .or(file_config.llm_key)
            .ok_or(ConfigError::MissingRequired("LLM_KEY"))?;
        let cache_url = env::var("CACHE_URL").ok().or(file_config.cache_url);

        let mut options = PipelineOptions::default();
        if let Some(v) = parse_env_u32("MAX_ITERATIONS")? {
            options.max_iterations = v;
        } else if let Some(v) = file_config.max_iterations {
            options.max_iterations = v;
        }
        if let Some(v) = parse_env_duration_ms("PER_ITERATION_TIMEOUT_MS")? {
            options.per_iteration_timeout = v;
        } else if let Some(v) = file_config.per_iteration_timeout_ms {
            options.per_iteration_timeout = Duration::from_millis(v);
        }
        if let Some(v) = parse_env_duration_ms("PAIR_TIMEOUT_MS")? {
            options.pair_timeout = v;
        } else if let Some(v) = file_config.pair_timeout_ms {
            options.pair_timeout = Duration::from_millis(v);
        } else {
            options.pair_timeout = options.per_iteration_timeout * 2;
        }
        if let Some(v) = parse_env_usize("MAX_IN_FLIGHT")? {
            options.max_in_flight = v;
        } else if let Some(v) = file_config.max_in_flight {
            options.max_in_flight = v;
        }
        if let Some(v) = parse_env_u64("CACHE_TTL_S")? {
            options.cache_ttl = Duration::from_secs(v);
        } else if let Some(v) = file_config.cache_ttl_s {
            options.cache_ttl = Duration::from_secs(v);
        }

        Ok(Self {
            llm_url,
            llm_key,
            cache_url,
            options,
        })
    }

    /// Builds a `Config` programmatically, bypassing env/file discovery.
    /// The preferred path for embedding the pipeline in another application
    /// or in tests.
    #[must_use]
    pub fn builder(llm_url: impl Into<String>, llm_key: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(llm_url.into(), llm_key.into())
    }
}

fn parse_env_u32(key: &'static str) -> Result<Option<u32>, ConfigError> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
        Err(_) => Ok(None),
    }
}

fn parse_env_u64(key: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
        Err(_) => Ok(None),
    }
}

fn parse_env_usize(key: &'static str) -> Result<Option<usize>, ConfigError> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
        Err(_) => Ok(None),
    }
}

fn parse_env_duration_ms(key: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(key) {
        Ok(v) => v
            .parse::<u64>()
            .map(Duration::from_millis)
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: v }),
        Err(_) => Ok(None),
    }
}

/// Fluent builder for programmatic configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    llm_url: String,
    llm_key: String,
    cache_url: Option<String>,
    options: PipelineOptions,
}

impl ConfigBuilder {
    fn new(llm_url: String, llm_key: String) -> Self {
        Self {
            llm_url,
            llm_key,
            cache_url: None,
            options: PipelineOptions::default(),
        }
    }

    #[must_use]
    pub fn cache_url(mut self, url: impl Into<String>) -> Self {
        self.cache_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn build(self) -> Config {
        Config {
            llm_url: self.llm_url,
            llm_key: self.llm_key,
            cache_url: self.cache_url,
            options: self.options,
        }
    }
}

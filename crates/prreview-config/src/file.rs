use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// On-disk shape of `prreview.toml`. Every field is optional; absent fields
/// fall through to env vars or defaults in `Config::load`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct FileConfig {
    pub llm_url: Option<String>,
    pub llm_key: Option<String>,
    pub cache_url: Option<String>,
    pub max_iterations: Option<u32>,
    pub per_iteration_timeout_ms: Option<u64>,
    pub pair_timeout_ms: Option<u64>,
    pub max_in_flight: Option<usize>,
    pub cache_ttl_s: Option<u64>,
}

impl FileConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::FileParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prreview.toml");
        std::fs::write(&path, "llm_url = \"https://x\"\nmax_iterations = 7\n").unwrap();
        let cfg = FileConfig::load(&path).unwrap();
        assert_eq!(cfg.llm_url.as_deref(), Some("https://x"));
        assert_eq!(cfg.max_iterations, Some(7));
        assert!(cfg.cache_url.is_none());
    }

    #[test]
    fn missing_file_is_an_error_not_a_panic() {
        let result = FileConfig::load(Path::new("/nonexistent/prreview.toml"));
        assert!(result.is_err());
    }
}

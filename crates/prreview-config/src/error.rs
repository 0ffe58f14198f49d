use thiserror::Error;

/// Configuration-layer error. Never panics on bad input; always returned to
/// the caller for handling (spec §9 "Exception-for-control-flow").
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    MissingRequired(&'static str),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("failed to read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("failed to parse config file {path}: {reason}")]
    FileParse { path: String, reason: String },
}

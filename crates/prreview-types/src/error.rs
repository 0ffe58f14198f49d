//! Library-level error type shared across the pipeline.
//!
//! `PrReviewError` is one aggregating enum with `#[from]` conversions from
//! each component's own error type, plus a `kind()` method that maps every
//! variant onto a coarse taxonomy (Transport / Protocol / Parse /
//! Validation / Analysis / Orchestration / Programming). Only Analysis,
//! Orchestration, and Programming kinds are meant to reach a caller of the
//! Pipeline Coordinator; Transport/Protocol are local to the LLM client,
//! and Parse/Validation degrade into warnings rather than propagating as
//! errors.

use thiserror::Error;

/// Coarse-grained error category used for programmatic dispatch (not
/// serialized; callers `match` on it rather than on the wrapped variant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network-level failure talking to the LLM backend.
    Transport,
    /// Non-retryable HTTP status from the LLM backend.
    Protocol,
    /// No parser strategy extracted any issue; never fatal on its own.
    Parse,
    /// All candidate issues were filtered by validation.
    Validation,
    /// An analyzer run failed to produce any result.
    Analysis,
    /// The orchestrator could not produce a usable pair of analyses.
    Orchestration,
    /// An invariant (I1–I7) was violated; always a bug, never swallowed.
    Programming,
}

/// Aggregated pipeline error.
#[derive(Error, Debug)]
pub enum PrReviewError {
    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("branch analysis failed for {branch_ref}: {cause}")]
    BranchAnalysisFailed { branch_ref: String, cause: String },

    #[error("pipeline failed: {0}")]
    PipelineFailed(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(#[from] InvariantError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl PrReviewError {
    /// Maps this error onto the coarse taxonomy from spec §7.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Llm(e) => e.kind(),
            Self::BranchAnalysisFailed { .. } => ErrorKind::Analysis,
            Self::PipelineFailed(_) => ErrorKind::Orchestration,
            Self::InvariantViolation(_) => ErrorKind::Programming,
            Self::Config(_) => ErrorKind::Orchestration,
        }
    }

    /// User-facing rendering with sensitive detail already redacted by the
    /// component that raised the error. Never includes raw secrets.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        format!("{self}")
    }
}

/// Transport/protocol errors raised by the LLM client (C1).
#[derive(Error, Debug, Clone)]
pub enum LlmError {
    #[error("connection refused")]
    ConnRefused,

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<std::time::Duration> },

    #[error("http status {0}")]
    HttpStatus(u16),

    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl LlmError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConnRefused | Self::Timeout(_) | Self::RateLimited { .. } | Self::Transport(_) => {
                ErrorKind::Transport
            }
            Self::HttpStatus(_) | Self::Misconfiguration(_) => ErrorKind::Protocol,
        }
    }

    /// Whether the retry policy in §4.1 applies to this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnRefused | Self::Timeout(_) => true,
            Self::RateLimited { .. } => true,
            Self::HttpStatus(code) => matches!(code, 429 | 502 | 503 | 504),
            Self::Misconfiguration(_) | Self::Transport(_) => false,
        }
    }
}

/// A violated data-model invariant (I1–I7 in spec §3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("I1 violated: severity '{0}' is not in the allowed set")]
    InvalidSeverity(String),

    #[error("I2 violated: location {file}:{line} is invalid")]
    InvalidLocation { file: String, line: i64 },

    #[error("I3 violated: duplicate issue id '{0}' within one analysis")]
    DuplicateId(String),

    #[error("I4 violated: status set outside the categorizer")]
    StatusSetOutsideCategorizer,

    #[error("I5 violated: fixType=B but adjustmentNotes is empty for issue '{0}'")]
    MissingAdjustmentNotes(String),

    #[error("I6 violated: iterations {iterations} out of bounds [1, {max}]")]
    IterationsOutOfBounds { iterations: u32, max: u32 },
}

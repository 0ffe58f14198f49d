//! Core data model and error taxonomy shared by every stage of the PR
//! analysis pipeline.
//!
//! This crate has no knowledge of HTTP, the filesystem, or the LLM backend.
//! It only defines the shapes that flow between components (C1-C9) and the
//! deterministic fingerprinting used to identify an issue without relying on
//! line numbers (§4.7).

pub mod cancel;
pub mod error;
pub mod fingerprint;
pub mod issue;
pub mod request;
pub mod result;

pub use cancel::CancelToken;
pub use error::{ErrorKind, PrReviewError};
pub use fingerprint::Fingerprint;
pub use issue::{
    Category, FixType, Issue, IssueBuilder, Location, Severity, Status, ISSUE_SCHEMA_VERSION,
};
pub use request::{ModelConfig, PipelineOptions, PipelineRequest};
pub use result::{BranchAnalysis, CachedAnalysis, ComparisonResult, Summary, Warning, WarningKind};

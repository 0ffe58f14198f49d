use thiserror::Error;

/// Errors from the validator itself, as opposed to a per-issue rejection
/// (which is represented as a `FilteredIssue`, not an `Err`).
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("repo checkout path does not exist: {0}")]
    CheckoutNotFound(String),
}

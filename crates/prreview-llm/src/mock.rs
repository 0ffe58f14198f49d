//! Test double for `LlmBackend`.
//!
//! A scriptable stand-in swapped in via the trait, never via global
//! mutation: a fixed script of responses is consumed one per call, in
//! order, per branch ref. Used by the analyzer's own tests and by this
//! workspace's end-to-end integration tests so none of them touch the
//! network.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::types::{LlmBackend, LlmInvocation, RawResponse};
use crate::LlmError;

/// A scripted backend: each branch ref has its own queue of responses
/// (or errors) consumed in call order.
pub struct MockLlmBackend {
    scripts: Mutex<HashMap<String, Vec<MockStep>>>,
    pub calls: Mutex<Vec<LlmInvocation>>,
}

enum MockStep {
    Response(RawResponse),
    Error(LlmError),
}

impl Default for MockLlmBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a text response to return the next time `branch_ref` is
    /// analyzed.
    pub fn push_text(&self, branch_ref: impl Into<String>, body: impl Into<String>) {
        self.scripts
            .lock()
            .entry(branch_ref.into())
            .or_default()
            .push(MockStep::Response(RawResponse::Text(body.into())));
    }

    /// Queues a JSON response.
    pub fn push_json(&self, branch_ref: impl Into<String>, value: serde_json::Value) {
        self.scripts
            .lock()
            .entry(branch_ref.into())
            .or_default()
            .push(MockStep::Response(RawResponse::Json(value)));
    }

    /// Queues a terminal error.
    pub fn push_error(&self, branch_ref: impl Into<String>, error: LlmError) {
        self.scripts
            .lock()
            .entry(branch_ref.into())
            .or_default()
            .push(MockStep::Error(error));
    }

    #[must_use]
    pub fn call_count(&self, branch_ref: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|inv| inv.branch_ref == branch_ref)
            .count()
    }
}

#[async_trait]
impl LlmBackend for MockLlmBackend {
    async fn analyze(&self, invocation: LlmInvocation) -> Result<RawResponse, LlmError> {
        let branch_ref = invocation.branch_ref.clone();
        self.calls.lock().push(invocation);

        let mut scripts = self.scripts.lock();
        let queue = scripts.entry(branch_ref.clone()).or_default();
        if queue.is_empty() {
            return Ok(RawResponse::Text(String::new()));
        }
        match queue.remove(0) {
            MockStep::Response(r) => Ok(r),
            MockStep::Error(e) => Err(e),
        }
    }
}

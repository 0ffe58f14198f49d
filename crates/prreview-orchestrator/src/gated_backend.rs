//! Bounds LLM concurrency across both branch analyzer tasks with a single
//! shared semaphore (spec §5: "`cfg.max_in_flight` enforced via a
//! `tokio::sync::Semaphore` shared by both branch analyzer tasks").

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use prreview_llm::{LlmBackend, LlmError, LlmInvocation, RawResponse};

pub struct SemaphoreGatedBackend {
    inner: Arc<dyn LlmBackend>,
    permits: Arc<Semaphore>,
}

impl SemaphoreGatedBackend {
    #[must_use]
    pub fn new(inner: Arc<dyn LlmBackend>, max_in_flight: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }
}

#[async_trait]
impl LlmBackend for SemaphoreGatedBackend {
    async fn analyze(&self, invocation: LlmInvocation) -> Result<RawResponse, LlmError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("semaphore is never closed while the backend is alive");
        self.inner.analyze(invocation).await
    }
}

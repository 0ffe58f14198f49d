//! LLM Client (C1): a typed, retrying HTTP client to the remote analysis
//! backend.
//!
//! All production code depends on the `LlmBackend` trait, never on a
//! concrete implementation: the orchestrator (and, in tests, the analyzer)
//! is handed a `Box<dyn LlmBackend>` at construction time, so there is no
//! process-wide handle to swap for a mock.

mod http_client;
mod jitter;
#[cfg(feature = "test-utils")]
mod mock;
mod types;

#[cfg(feature = "test-utils")]
pub use mock::MockLlmBackend;
pub use prreview_types::error::LlmError;
pub use types::{LlmBackend, LlmInvocation, LlmOpts, RawResponse};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Production backend talking to the remote LLM HTTP service described in
/// spec §6.
pub struct HttpLlmBackend {
    client: Arc<reqwest::Client>,
    base_url: String,
    api_key: String,
}

impl HttpLlmBackend {
    /// Constructs a backend against `base_url`, authenticating with
    /// `api_key` via a `Bearer` header (spec §6).
    ///
    /// # Errors
    /// Returns `LlmError::Misconfiguration` if the underlying HTTP client
    /// cannot be built.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl LlmBackend for HttpLlmBackend {
    async fn analyze(&self, invocation: LlmInvocation) -> Result<RawResponse, LlmError> {
        let url = format!("{}/chat/completions/stream", self.base_url.trim_end_matches('/'));
        let body = serde_json::json!({
            "repo_url": invocation.repo_url,
            "messages": [{"role": "user", "content": invocation.prompt}],
            "stream": false,
            "provider": "prreview",
            "model": invocation.model_id,
            "temperature": invocation.opts.temperature,
            "max_tokens": invocation.opts.max_tokens,
        });

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response = http_client::execute_with_retry(
            &self.client,
            request,
            invocation.opts.timeout,
            "prreview-llm",
        )
        .await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/plain")
            .to_string();

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("failed to read response body: {e}")))?;

        Ok(RawResponse::from_body(&text, &content_type))
    }
}

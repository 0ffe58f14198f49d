//! Core types for the LLM Client (spec §4.1).

use async_trait::async_trait;
use std::time::Duration;

use crate::LlmError;

/// Per-invocation options (spec §4.1 bounds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LlmOpts {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl LlmOpts {
    /// Clamps `temperature` to `[0,1]`, `max_tokens` to `8192`, and
    /// `timeout` to `[1s, 300s]` per spec §4.1.
    #[must_use]
    pub fn new(temperature: f32, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            temperature: temperature.clamp(0.0, 1.0),
            max_tokens: max_tokens.min(8192),
            timeout: timeout.clamp(Duration::from_secs(1), Duration::from_secs(300)),
        }
    }
}

impl Default for LlmOpts {
    fn default() -> Self {
        Self::new(0.2, 4096, Duration::from_secs(120))
    }
}

/// Input to a single `LlmBackend::analyze` call.
#[derive(Debug, Clone)]
pub struct LlmInvocation {
    pub repo_url: String,
    pub branch_ref: String,
    /// Bounded to ≤ 32 KiB per spec §4.1; callers are responsible for
    /// truncating upstream (the analyzer does this when building prompts).
    pub prompt: String,
    pub model_id: String,
    pub opts: LlmOpts,
}

impl LlmInvocation {
    #[must_use]
    pub fn new(
        repo_url: impl Into<String>,
        branch_ref: impl Into<String>,
        prompt: impl Into<String>,
        model_id: impl Into<String>,
        opts: LlmOpts,
    ) -> Self {
        const MAX_PROMPT_BYTES: usize = 32 * 1024;
        let mut prompt = prompt.into();
        if prompt.len() > MAX_PROMPT_BYTES {
            prompt.truncate(MAX_PROMPT_BYTES);
        }
        Self {
            repo_url: repo_url.into(),
            branch_ref: branch_ref.into(),
            prompt,
            model_id: model_id.into(),
            opts,
        }
    }
}

/// Opaque response body from the LLM backend. Modeled as a tagged variant
/// rather than duck-typed JSON so callers can match on shape instead of
/// probing fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Json(serde_json::Value),
    Text(String),
}

impl RawResponse {
    /// Classifies a response body as JSON or opaque text based on a best
    /// effort parse. The backend never assumes the server's declared
    /// `Content-Type` is accurate, matching spec §4.2's acceptance of either
    /// shape.
    #[must_use]
    pub fn from_body(body: &str, _content_type: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body.trim()) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(body.to_string()),
        }
    }

    /// Returns the response as a single string for parsers that treat JSON
    /// and text uniformly (response parser strategy 2-5, spec §4.2).
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Json(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Public contract of the LLM Client (spec §4.1): `analyze(repoUrl,
/// branchRef, prompt, modelId, opts) -> RawResponse`.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn analyze(&self, invocation: LlmInvocation) -> Result<RawResponse, LlmError>;
}

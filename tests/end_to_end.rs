//! End-to-end pipeline scenarios run through the public `Coordinator`
//! entry point, against a scripted `MockLlmBackend` so nothing touches the
//! network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tempfile::TempDir;

use prreview::{Checkouts, Coordinator};
use prreview_cache::remote::{RemoteCache, RemoteCacheError};
use prreview_cache::Cache;
use prreview_llm::MockLlmBackend;
use prreview_types::issue::Status;
use prreview_types::request::{ModelConfig, PipelineOptions, PipelineRequest};
use prreview_types::result::WarningKind;

fn checkout_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
    dir
}

fn fast_options() -> PipelineOptions {
    PipelineOptions {
        max_iterations: 1,
        per_iteration_timeout: Duration::from_secs(5),
        pair_timeout: Duration::from_secs(10),
        ..PipelineOptions::default()
    }
}

fn request(options: PipelineOptions) -> PipelineRequest {
    PipelineRequest::new(
        "https://example.com/repo",
        101,
        "main",
        "pull/101/head",
        ModelConfig::new("gpt-5"),
    )
    .with_options(options)
}

/// Scenario 1: line drift. Same issue, different line number, yields
/// exactly one UNCHANGED and nothing else.
#[tokio::test]
async fn line_drift_yields_one_unchanged() {
    let main_dir = checkout_with(&[("src/api/client.ts", "x".repeat(60).as_str())]);
    let pr_dir = checkout_with(&[("src/api/client.ts", "x".repeat(260).as_str())]);

    let mock = MockLlmBackend::new();
    mock.push_json(
        "main",
        json!([{
            "title": "Missing error handling",
            "description": "The fetch call has no catch block",
            "severity": "high",
            "category": "code-quality",
            "file": "src/api/client.ts",
            "line": 45,
        }]),
    );
    mock.push_json(
        "pull/101/head",
        json!([{
            "title": "Missing error handling",
            "description": "The fetch call has no catch block",
            "severity": "high",
            "category": "code-quality",
            "file": "src/api/client.ts",
            "line": 247,
        }]),
    );

    let mut options = fast_options();
    options.use_cache = false;
    let coordinator = Coordinator::new(Arc::new(mock), Arc::new(Cache::new(None)), 4);
    let checkouts = Checkouts::new(main_dir.path(), pr_dir.path());

    let result = coordinator.run(&request(options), &checkouts).await.unwrap();

    assert_eq!(result.unchanged_issues.len(), 1);
    assert!(result.new_issues.is_empty());
    assert!(result.fixed_issues.is_empty());
    assert_eq!(result.unchanged_issues[0].status, Some(Status::Unchanged));
}

/// Signature-change, async-conversion, and null-check fix-type scenarios
/// are owned by `prreview-fixclass`'s own unit tests, which exercise the
/// classifier directly against representative before/after snippets.
/// The parser's prose-fallback scenario is owned by `prreview-parser`'s
/// `numbered_prose` strategy tests.

/// Scenario 6: an unreachable remote cache tier degrades gracefully. The
/// run still completes and the result carries a `CacheDegraded` warning.
#[tokio::test]
async fn unreachable_remote_cache_degrades_gracefully() {
    struct AlwaysDown;

    #[async_trait]
    impl RemoteCache for AlwaysDown {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, RemoteCacheError> {
            Err(RemoteCacheError::Unreachable("connection refused".into()))
        }
        async fn put(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), RemoteCacheError> {
            Err(RemoteCacheError::Unreachable("connection refused".into()))
        }
        async fn invalidate(&self, _key_prefix: &str) -> Result<(), RemoteCacheError> {
            Err(RemoteCacheError::Unreachable("connection refused".into()))
        }
    }

    let main_dir = checkout_with(&[("a.rs", "fn main() {}\n")]);
    let pr_dir = checkout_with(&[("a.rs", "fn main() {}\n")]);

    let mock = MockLlmBackend::new();
    mock.push_json("main", json!([]));
    mock.push_json("pull/101/head", json!([]));

    let cache = Arc::new(Cache::new(Some(Box::new(AlwaysDown))));
    let coordinator = Coordinator::new(Arc::new(mock), cache, 4);
    let checkouts = Checkouts::new(main_dir.path(), pr_dir.path());

    let result = coordinator.run(&request(fast_options()), &checkouts).await.unwrap();

    assert!(result.warnings.iter().any(|w| w.kind == WarningKind::CacheDegraded));
}

/// P8: an immediate second `analyze_branch` with identical inputs and
/// `useCache=true` returns without invoking the LLM again.
#[tokio::test]
async fn cache_round_trip_skips_the_second_llm_call() {
    let dir = checkout_with(&[("a.rs", "fn main() {}\n")]);

    let mock = Arc::new(MockLlmBackend::new());
    mock.push_json("main", json!([]));

    let cache = Arc::new(Cache::new(None));
    let analyzer = prreview_analyzer::Analyzer::new(mock.clone(), cache);
    let cfg = prreview_analyzer::AnalyzerConfig::new(
        dir.path().to_path_buf(),
        ModelConfig::new("gpt-5"),
        fast_options(),
    );

    let first = analyzer.analyze_branch("https://example.com/repo", "main", &cfg).await.unwrap();
    let second = analyzer.analyze_branch("https://example.com/repo", "main", &cfg).await.unwrap();

    assert_eq!(first.issues, second.issues);
    assert_eq!(mock.call_count("main"), 1);
}

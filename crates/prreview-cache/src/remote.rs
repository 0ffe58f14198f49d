//! The optional remote tier (spec §4.4, §6: "opaque key/value interface").
//! Values cross this boundary as opaque bytes; only the in-process tier
//! deals in typed `BranchAnalysis` values.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteCacheError {
    #[error("remote cache unreachable: {0}")]
    Unreachable(String),
    #[error("remote cache rejected the write: {0}")]
    WriteFailed(String),
}

/// A remote key-value tier. Implementations are expected to be cheap to
/// clone (an `Arc` around a pooled client).
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RemoteCacheError>;
    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), RemoteCacheError>;
    async fn invalidate(&self, key_prefix: &str) -> Result<(), RemoteCacheError>;
}

//! Short-lived result cache for the context pipeline.
//!
//! The pipeline talks to any key-value service through [`CacheStore`]:
//! `get(key)` and `set(key, value, expire)`, both asynchronous and both
//! allowed to fail. Failures are the caller's to swallow.
//!
//! ```text
//!             ┌──────────────┐
//!  pipeline ─▶│  CacheStore  │  (trait)
//!             └──────┬───────┘
//!        ┌───────────┼────────────┐
//!        ▼           ▼            ▼
//!   ┌─────────┐ ┌──────────┐ ┌──────────┐
//!   │ Memory  │ │  Remote  │ │ Disabled │
//!   │ (local) │ │ (daemon) │ │ (no-op)  │
//!   └─────────┘ └──────────┘ └──────────┘
//! ```

pub mod clock;
pub mod memory;
pub mod remote;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quillpad_config::{CacheBackend, CacheConfig};
use serde::{Deserialize, Serialize};

use crate::BoxFuture;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::MemoryCacheStore;
pub use remote::RemoteCacheStore;

/// Errors from cache store calls.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    #[error("cache request failed: {0}")]
    Request(String),

    #[error("cache entry is corrupt: {0}")]
    Corrupt(String),
}

/// An asynchronous string key-value store with per-write expiry.
///
/// Implementations must be `Send + Sync`; one store is shared by every
/// in-flight request.
pub trait CacheStore: Send + Sync {
    /// Store display name (e.g. "memory", "remote").
    fn name(&self) -> &str;

    /// Fetch a value. `Ok(None)` is a miss.
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, CacheError>>;

    /// Store a value, replacing any existing one, expiring after `expire`.
    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        expire: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>>;
}

/// A store that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCacheStore;

impl CacheStore for DisabledCacheStore {
    fn name(&self) -> &str {
        "disabled"
    }

    fn get<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, Result<Option<String>, CacheError>> {
        Box::pin(async { Ok(None) })
    }

    fn set<'a>(
        &'a self,
        _key: &'a str,
        _value: String,
        _expire: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async { Ok(()) })
    }
}

/// The stored payload of a processed context.
///
/// Serialized as `{"processedText": ..., "timestamp": <ms since epoch>}`.
/// The key is the slot it lives in and is not repeated in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub processed_text: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl CacheEntry {
    pub fn new(processed_text: impl Into<String>, timestamp: u64) -> Self {
        Self {
            processed_text: processed_text.into(),
            timestamp,
        }
    }

    /// Whether the entry is younger than `ttl` at `now_ms`. Entries stamped
    /// in the future count as fresh.
    pub fn is_fresh(&self, now_ms: u64, ttl: Duration) -> bool {
        u128::from(now_ms.saturating_sub(self.timestamp)) < ttl.as_millis()
    }

    pub fn encode(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::Corrupt(e.to_string()))
    }

    pub fn decode(payload: &str) -> Result<Self, CacheError> {
        serde_json::from_str(payload).map_err(|e| CacheError::Corrupt(e.to_string()))
    }
}

/// Build the store selected by `config`.
///
/// The remote store connects once here and keeps that connection; a failed
/// connect is logged and the store is returned anyway, degrading to misses
/// until the peer comes up.
pub async fn build_store(config: &CacheConfig, clock: Arc<dyn Clock>) -> Arc<dyn CacheStore> {
    match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new(config.capacity, clock)),
        CacheBackend::Remote => {
            // Validation guarantees a socket path for the remote backend.
            let socket = config
                .socket_path
                .as_deref()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(crate::ipc::DEFAULT_SOCKET_PATH));
            Arc::new(RemoteCacheStore::connect(socket).await)
        }
        CacheBackend::Disabled => Arc::new(DisabledCacheStore),
    }
}

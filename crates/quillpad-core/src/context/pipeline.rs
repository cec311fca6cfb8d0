//! Request-scoped orchestration: fingerprint, cache, parse, flatten, budget.
//!
//! ```text
//! raw ─▶ cache_key ─▶ store.get ──fresh──▶ return cached
//!                        │
//!                     miss/stale/error
//!                        ▼
//!                   parse_blocks ──err──▶ truncate(raw)  (not cached)
//!                        │
//!                        ▼
//!                  flatten + budget ─▶ store.set (best effort) ─▶ return
//! ```
//!
//! [`ContextPipeline::process`] never fails: every error path degrades to
//! some text.

use std::sync::Arc;
use std::time::Duration;

use quillpad_config::{CacheConfig, ContextConfig};
use tracing::{debug, warn};

use super::budget::TokenBudget;
use super::fingerprint::cache_key;
use crate::cache::{CacheEntry, CacheStore, Clock};
use crate::document::parse_blocks;

/// How a [`ProcessedContext`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextOutcome {
    /// Served from a fresh cache entry.
    CacheHit,
    /// Computed from parsed blocks; `enforced` when the importance filter ran.
    Computed { enforced: bool },
    /// Input did not parse; the raw text was truncated instead.
    Fallback,
}

impl ContextOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextOutcome::CacheHit => "cache-hit",
            ContextOutcome::Computed { enforced: false } => "computed",
            ContextOutcome::Computed { enforced: true } => "enforced",
            ContextOutcome::Fallback => "fallback",
        }
    }
}

/// Bounded context text plus how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedContext {
    pub text: String,
    pub outcome: ContextOutcome,
}

/// The context pipeline. Cheap to clone; clones share the store and clock.
#[derive(Clone)]
pub struct ContextPipeline {
    budget: TokenBudget,
    ttl: Duration,
    store_ttl: Duration,
    key_prefix: String,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl ContextPipeline {
    pub fn new(
        context: &ContextConfig,
        cache: &CacheConfig,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            budget: TokenBudget::from_config(context),
            ttl: context.cache_ttl(),
            store_ttl: cache.store_ttl(),
            key_prefix: context.cache_key_prefix.clone(),
            store,
            clock,
        }
    }

    pub fn budget(&self) -> &TokenBudget {
        &self.budget
    }

    /// Name of the backing cache store.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Turn a serialized block array into bounded context text.
    pub async fn process(&self, raw: &str) -> ProcessedContext {
        let key = cache_key(&self.key_prefix, raw);

        if let Some(text) = self.lookup(&key).await {
            debug!(%key, "context cache hit");
            return ProcessedContext {
                text,
                outcome: ContextOutcome::CacheHit,
            };
        }

        let processed = self.process_uncached(raw);
        if let ContextOutcome::Computed { enforced } = processed.outcome {
            debug!(%key, enforced, chars = processed.text.len(), "context computed");
            self.persist(&key, &processed.text).await;
        }
        processed
    }

    /// Parse, flatten and bound `raw` without touching the cache.
    pub fn process_uncached(&self, raw: &str) -> ProcessedContext {
        match parse_blocks(raw) {
            Ok(blocks) => {
                let bounded = self.budget.bound(&blocks);
                ProcessedContext {
                    text: bounded.text,
                    outcome: ContextOutcome::Computed {
                        enforced: bounded.enforced,
                    },
                }
            }
            Err(e) => {
                warn!(error = %e, "context is not a block array, truncating raw input");
                ProcessedContext {
                    text: self.budget.truncate(raw).to_string(),
                    outcome: ContextOutcome::Fallback,
                }
            }
        }
    }

    async fn lookup(&self, key: &str) -> Option<String> {
        let payload = match self.store.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!(store = self.store.name(), %key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry = match CacheEntry::decode(&payload) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%key, error = %e, "ignoring unreadable cache entry");
                return None;
            }
        };

        if entry.is_fresh(self.clock.now_millis(), self.ttl) {
            Some(entry.processed_text)
        } else {
            debug!(%key, "context cache entry stale");
            None
        }
    }

    async fn persist(&self, key: &str, text: &str) {
        let entry = CacheEntry::new(text, self.clock.now_millis());
        let payload = match entry.encode() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%key, error = %e, "failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.store.set(key, payload, self.store_ttl).await {
            warn!(store = self.store.name(), %key, error = %e, "cache write failed");
        }
    }
}

impl std::fmt::Debug for ContextPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPipeline")
            .field("budget", &self.budget)
            .field("ttl", &self.ttl)
            .field("store_ttl", &self.store_ttl)
            .field("key_prefix", &self.key_prefix)
            .field("store", &self.store.name())
            .finish()
    }
}

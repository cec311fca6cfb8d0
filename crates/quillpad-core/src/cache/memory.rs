//! In-process cache store with store-level expiry and a size cap.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::trace;

use super::{CacheError, CacheStore, Clock};
use crate::BoxFuture;

struct Slot {
    value: String,
    expires_at: u64,
}

/// A bounded in-memory store.
///
/// Expired slots are dropped lazily on read and eagerly when the store is
/// full; if it is still full, the slot closest to expiry is evicted.
pub struct MemoryCacheStore {
    slots: Mutex<HashMap<String, Slot>>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheStore {
    /// Create a store holding at most `capacity` live entries (minimum 1).
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Number of slots currently held, expired or not.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now_millis();
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| CacheError::Unavailable("memory store lock poisoned".to_string()))?;

        match slots.get(key) {
            Some(slot) if slot.expires_at > now => Ok(Some(slot.value.clone())),
            Some(_) => {
                trace!(key, "memory store slot expired");
                slots.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn store(&self, key: &str, value: String, expire: Duration) -> Result<(), CacheError> {
        let now = self.clock.now_millis();
        let expires_at = now.saturating_add(u64::try_from(expire.as_millis()).unwrap_or(u64::MAX));
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| CacheError::Unavailable("memory store lock poisoned".to_string()))?;

        if !slots.contains_key(key) && slots.len() >= self.capacity {
            slots.retain(|_, slot| slot.expires_at > now);
            if slots.len() >= self.capacity
                && let Some(oldest) = slots
                    .iter()
                    .min_by_key(|(_, slot)| slot.expires_at)
                    .map(|(k, _)| k.clone())
            {
                trace!(evicted = %oldest, "memory store full");
                slots.remove(&oldest);
            }
        }

        slots.insert(key.to_string(), Slot { value, expires_at });
        Ok(())
    }
}

impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<String>, CacheError>> {
        Box::pin(async move { self.lookup(key) })
    }

    fn set<'a>(
        &'a self,
        key: &'a str,
        value: String,
        expire: Duration,
    ) -> BoxFuture<'a, Result<(), CacheError>> {
        Box::pin(async move { self.store(key, value, expire) })
    }
}

//! Single-value cache with a staleness window
//!
//! Replaces a process-wide "last fetched at" global: the cache owns its value,
//! its timestamp and the clock it measures staleness with.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use aria_core::clock::has_elapsed;
use aria_core::Clock;
use chrono::{DateTime, Utc};

/// Default staleness window
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Cached value stamped with the time it was stored
pub struct TtlCache<T> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entry: Mutex<Option<(T, DateTime<Utc>)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            entry: Mutex::new(None),
        }
    }

    /// Cached value, or `None` when empty or older than the TTL
    pub fn get(&self) -> Option<T> {
        let entry = self.entry.lock().ok()?;
        let (value, stored_at) = entry.as_ref()?;
        if has_elapsed(*stored_at, self.clock.now(), self.ttl) {
            return None;
        }
        Some(value.clone())
    }

    /// Store a value, restarting the staleness window
    pub fn put(&self, value: T) {
        if let Ok(mut entry) = self.entry.lock() {
            *entry = Some((value, self.clock.now()));
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut entry) = self.entry.lock() {
            *entry = None;
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<T> std::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

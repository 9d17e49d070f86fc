//! Local statistics service
//!
//! Keeps play counts, likes and visit counters in a [`KeyValueStore`].
//! Reads never fail: a missing or corrupt document reads as defaults and is
//! replaced on the next write. Writes report store failures to the caller.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use aria_core::{Clock, StatsRecorder, SystemClock, TrackId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{TtlCache, DEFAULT_CACHE_TTL};
use crate::error::{Result, StatsError};
use crate::store::{KeyValueStore, SITE_STATS_KEY, SONG_STATS_KEY, USER_LIKES_KEY};
use crate::types::{SiteStats, SongStats};

type SongStatsMap = BTreeMap<String, SongStats>;

/// Statistics service backed by a key-value store
pub struct StatsService {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    site_cache: TtlCache<SiteStats>,
    // Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl StatsService {
    /// Create a service using the system clock and the default cache TTL
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), DEFAULT_CACHE_TTL)
    }

    /// Create a service with an explicit clock and site-stats cache TTL
    pub fn with_clock(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            site_cache: TtlCache::new(clock.clone(), cache_ttl),
            clock,
            write_lock: Mutex::new(()),
        }
    }

    // ===== Songs =====

    /// Counters for a track (zeroes if never recorded)
    pub fn song_stats(&self, id: &TrackId) -> SongStats {
        self.read_song_map()
            .remove(id.as_str())
            .unwrap_or_default()
    }

    /// Count one play and stamp the play time
    pub fn increment_play_count(&self, id: &TrackId) -> Result<SongStats> {
        let _guard = self.lock()?;
        let now = self.clock.now();
        self.update_song(id, |stats| {
            stats.play_count = stats.play_count.saturating_add(1);
            stats.last_played = Some(now);
        })
    }

    // ===== Likes =====

    /// Flip the like state of a track
    ///
    /// Returns the new state.
    pub fn toggle_like(&self, id: &TrackId) -> Result<bool> {
        let _guard = self.lock()?;
        let liked = !self.is_liked(id);
        self.apply_like(id, liked)?;
        Ok(liked)
    }

    /// Set the like state of a track
    ///
    /// Returns whether anything changed; repeating the current state is a no-op.
    pub fn set_liked(&self, id: &TrackId, liked: bool) -> Result<bool> {
        let _guard = self.lock()?;
        if self.is_liked(id) == liked {
            return Ok(false);
        }
        self.apply_like(id, liked)?;
        Ok(true)
    }

    pub fn is_liked(&self, id: &TrackId) -> bool {
        self.user_likes().contains(id)
    }

    /// Liked track ids, oldest like first
    pub fn user_likes(&self) -> Vec<TrackId> {
        self.read_json(USER_LIKES_KEY).unwrap_or_default()
    }

    fn apply_like(&self, id: &TrackId, liked: bool) -> Result<()> {
        let mut likes = self.user_likes();
        if liked {
            likes.push(id.clone());
        } else {
            likes.retain(|liked_id| liked_id != id);
        }
        self.write_json(USER_LIKES_KEY, &likes)?;

        self.update_song(id, |stats| {
            stats.likes = if liked {
                stats.likes.saturating_add(1)
            } else {
                stats.likes.saturating_sub(1)
            };
        })?;
        debug!(track_id = %id, liked, "Like state changed");
        Ok(())
    }

    // ===== Site =====

    /// Site-wide counters
    ///
    /// Served from the cache while it is fresh. On first use the counters are
    /// initialized and persisted.
    pub fn site_stats(&self) -> SiteStats {
        if let Some(stats) = self.site_cache.get() {
            return stats;
        }

        let _guard = self.write_lock.lock().ok();
        let stats = self.load_or_init_site_stats();
        self.site_cache.put(stats.clone());
        stats
    }

    /// Count one visit and stamp the visit time
    pub fn increment_visit(&self) -> Result<SiteStats> {
        let _guard = self.lock()?;
        let now = self.clock.now();
        self.update_site(|stats| {
            stats.total_visits = stats.total_visits.saturating_add(1);
            stats.last_visit = now;
        })
    }

    /// Count one play across the whole site
    pub fn increment_total_plays(&self) -> Result<SiteStats> {
        let _guard = self.lock()?;
        self.update_site(|stats| {
            stats.total_plays = stats.total_plays.saturating_add(1);
        })
    }

    fn load_or_init_site_stats(&self) -> SiteStats {
        if let Some(stats) = self.read_json(SITE_STATS_KEY) {
            return stats;
        }

        let initial = SiteStats::initial(self.clock.now());
        if let Err(e) = self.write_json(SITE_STATS_KEY, &initial) {
            warn!("Failed to persist initial site stats: {}", e);
        }
        initial
    }

    fn update_site(&self, update: impl FnOnce(&mut SiteStats)) -> Result<SiteStats> {
        let mut stats = self
            .read_json(SITE_STATS_KEY)
            .unwrap_or_else(|| SiteStats::initial(self.clock.now()));
        update(&mut stats);
        self.write_json(SITE_STATS_KEY, &stats)?;
        self.site_cache.put(stats.clone());
        Ok(stats)
    }

    // ===== Storage helpers =====

    fn read_song_map(&self) -> SongStatsMap {
        self.read_json(SONG_STATS_KEY).unwrap_or_default()
    }

    fn update_song(&self, id: &TrackId, update: impl FnOnce(&mut SongStats)) -> Result<SongStats> {
        let mut all = self.read_song_map();
        let stats = all.entry(id.to_string()).or_default();
        update(stats);
        let updated = stats.clone();
        self.write_json(SONG_STATS_KEY, &all)?;
        Ok(updated)
    }

    /// Decode the document under `key`; absent, unreadable and corrupt all read as `None`
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, "Failed to read stats: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, "Ignoring corrupt stats document: {}", e);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StatsError::store("stats write lock poisoned"))
    }
}

impl std::fmt::Debug for StatsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsService")
            .field("site_cache", &self.site_cache)
            .finish_non_exhaustive()
    }
}

impl StatsRecorder for StatsService {
    fn record_play(&self, track_id: &TrackId) -> aria_core::Result<()> {
        self.increment_play_count(track_id)?;
        self.increment_total_plays()?;
        Ok(())
    }

    fn record_like(&self, track_id: &TrackId, liked: bool) -> aria_core::Result<()> {
        self.set_liked(track_id, liked)?;
        Ok(())
    }

    fn record_visit(&self) -> aria_core::Result<()> {
        self.increment_visit()?;
        Ok(())
    }
}

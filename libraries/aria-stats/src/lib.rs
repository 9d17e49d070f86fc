//! Aria Stats
//!
//! Local play counts, likes and site counters for the Aria player.
//!
//! The playback engine only sees this crate through
//! [`aria_core::StatsRecorder`]; hosts that render like buttons or counters
//! talk to [`StatsService`] directly.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use aria_core::TrackId;
//! use aria_stats::{MemoryStore, StatsService};
//!
//! let stats = StatsService::new(Arc::new(MemoryStore::new()));
//! let id = TrackId::new("intro");
//!
//! stats.increment_play_count(&id).unwrap();
//! assert!(stats.toggle_like(&id).unwrap());
//!
//! let song = stats.song_stats(&id);
//! assert_eq!((song.play_count, song.likes), (1, 1));
//! ```

#![forbid(unsafe_code)]

mod cache;
mod error;
mod service;
mod store;
mod types;

pub use cache::{TtlCache, DEFAULT_CACHE_TTL};
pub use error::{Result, StatsError};
pub use service::StatsService;
pub use store::{
    FileStore, KeyValueStore, MemoryStore, SITE_STATS_KEY, SONG_STATS_KEY, USER_LIKES_KEY,
};
pub use types::{SiteStats, SongStats};

//! Statistics records
//!
//! Timestamps are stored as Unix milliseconds so the documents stay
//! compatible with what a browser build writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-track counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongStats {
    #[serde(default)]
    pub likes: u32,

    #[serde(default)]
    pub play_count: u64,

    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_played: Option<DateTime<Utc>>,
}

/// Site-wide counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStats {
    #[serde(default)]
    pub total_visits: u64,

    /// Time of the most recent visit (or of initialization)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_visit: DateTime<Utc>,

    #[serde(default)]
    pub total_plays: u64,
}

impl SiteStats {
    /// Fresh counters stamped with `now`
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            total_visits: 0,
            last_visit: now,
            total_plays: 0,
        }
    }
}

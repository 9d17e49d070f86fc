//! Generation tokens
//!
//! Every track switch mints a new [`Generation`]. Asynchronous resource
//! operations carry the generation they were issued under; when they complete
//! the engine compares it against the live one and drops anything stale.
//! There is no cancellation, only this check.

use aria_core::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one load/play attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    /// Monotonic per-engine counter
    pub serial: u64,

    /// Track the attempt was issued for
    pub track_id: TrackId,
}

impl Generation {
    /// Whether a completion tagged `self` is still relevant under `live`
    pub fn is_current(&self, live: Option<&Generation>) -> bool {
        live == Some(self)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.track_id, self.serial)
    }
}

/// Mints generations with strictly increasing serials
#[derive(Debug, Default)]
pub(crate) struct GenerationCounter {
    last: u64,
}

impl GenerationCounter {
    pub(crate) fn next(&mut self, track_id: TrackId) -> Generation {
        self.last += 1;
        Generation {
            serial: self.last,
            track_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serials_increase() {
        let mut counter = GenerationCounter::default();
        let a = counter.next(TrackId::new("a"));
        let b = counter.next(TrackId::new("a"));
        assert!(b.serial > a.serial);
        assert_ne!(a, b);
    }

    #[test]
    fn same_track_new_attempt_is_not_current() {
        let mut counter = GenerationCounter::default();
        let first = counter.next(TrackId::new("a"));
        let second = counter.next(TrackId::new("a"));

        assert!(!first.is_current(Some(&second)));
        assert!(second.is_current(Some(&second)));
    }

    #[test]
    fn nothing_is_current_without_live_generation() {
        let mut counter = GenerationCounter::default();
        let generation = counter.next(TrackId::new("a"));
        assert!(!generation.is_current(None));
    }

    #[test]
    fn display_shows_track_and_serial() {
        let generation = Generation {
            serial: 3,
            track_id: TrackId::new("song-7"),
        };
        assert_eq!(generation.to_string(), "song-7#3");
    }
}

//! Playback Events
//!
//! Event-based communication for UI synchronization. The engine queues events
//! as transitions happen; hosts collect them with
//! [`crate::PlaybackEngine::drain_events`]:
//! - State changes (play/pause/stop)
//! - Track changes
//! - Position updates (each poll while playing)
//! - Failures of the live generation

use crate::error::PlaybackError;
use crate::transport::TransportState;
use crate::types::RepeatMode;
use aria_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackStateEvent,
    },

    /// Current track changed (or was cleared)
    #[serde(rename_all = "camelCase")]
    TrackChanged {
        /// ID of the new track, `None` once the queue ran out
        track_id: Option<TrackId>,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Position update
    #[serde(rename_all = "camelCase")]
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration
        duration_ms: u64,
    },

    /// Volume or mute changed
    #[serde(rename_all = "camelCase")]
    VolumeChanged {
        /// New volume level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Repeat or shuffle changed
    ModeChanged {
        /// Repeat mode
        repeat: RepeatMode,
        /// Shuffle flag
        shuffle: bool,
    },

    /// Queue contents changed
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// The audio resource failed for the live generation
    ///
    /// Playback degrades silently; this is the observable record of it.
    #[serde(rename_all = "camelCase")]
    Failure {
        /// Track the failure belongs to
        track_id: TrackId,
        /// What went wrong
        error: PlaybackError,
    },
}

/// Playback state for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStateEvent {
    /// No track selected
    Stopped,
    /// Track selected and playing
    Playing,
    /// Track selected, not playing
    Paused,
}

impl From<&TransportState> for PlaybackStateEvent {
    fn from(state: &TransportState) -> Self {
        match (state.current_track(), state.is_playing()) {
            (None, _) => PlaybackStateEvent::Stopped,
            (Some(_), true) => PlaybackStateEvent::Playing,
            (Some(_), false) => PlaybackStateEvent::Paused,
        }
    }
}

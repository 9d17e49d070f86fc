//! Error types for playback management

use aria_core::TrackId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
///
/// `NotFound`, `QueueExhausted` and `StaleCompletion` are control-flow signals
/// handled inside the engine. Resource failures for the live generation are
/// reported through [`crate::PlaybackEvent::Failure`] and never abort playback.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlaybackError {
    /// Requested track is not in the queue
    #[error("Track not in queue: {0}")]
    NotFound(TrackId),

    /// Advanced past the end of the queue without repeat-all
    #[error("Queue exhausted")]
    QueueExhausted,

    /// No track is currently selected
    #[error("No track loaded")]
    NoTrackLoaded,

    /// The audio resource failed to load the track
    #[error("Failed to load {track_id}: {message}")]
    ResourceLoad { track_id: TrackId, message: String },

    /// The audio resource refused to start playback
    #[error("Playback of {track_id} rejected: {message}")]
    ResourcePlayRejected { track_id: TrackId, message: String },

    /// The automatic reload also failed; the track stays selected but stopped
    #[error("Reload of {track_id} failed: {message}")]
    RetryExhausted { track_id: TrackId, message: String },

    /// A completion arrived for a superseded generation
    #[error("Stale completion for {track_id} (generation {serial})")]
    StaleCompletion { track_id: TrackId, serial: u64 },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

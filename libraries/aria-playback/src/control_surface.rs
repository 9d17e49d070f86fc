//! Control-surface boundary
//!
//! The OS lock screen / hardware media keys talk to the engine through this
//! module: commands come in as [`ControlCommand`]s and are executed as if they
//! were local user actions; the engine pushes [`NowPlaying`] metadata and
//! [`SurfaceSnapshot`]s back out through a [`ControlSurface`].

use aria_core::{duration_from_secs, Track};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Artwork sizes advertised to the surface
pub const DEFAULT_ARTWORK_SIZES: [u32; 6] = [96, 128, 192, 256, 384, 512];

/// Sink for state pushed to an external control surface
pub trait ControlSurface {
    /// Replace the displayed metadata; `None` clears it
    fn set_metadata(&mut self, now_playing: Option<&NowPlaying>);

    /// Update play state and position
    fn set_playback_state(&mut self, snapshot: &SurfaceSnapshot);
}

/// Command issued by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommand {
    /// Start if paused
    Play,
    /// Pause if playing
    Pause,
    /// Flip play/pause
    PlayPause,
    /// Skip forward
    Next,
    /// Skip back
    Previous,
    /// Relative seek backwards, default offset when `None`
    SeekBackward(Option<Duration>),
    /// Relative seek forwards, default offset when `None`
    SeekForward(Option<Duration>),
    /// Absolute seek
    SeekTo(Duration),
}

impl ControlCommand {
    /// Build a command from a media-session action name
    ///
    /// Offsets and times are in seconds; negative, non-finite or out-of-range
    /// values are treated as absent. Unknown actions yield `None`.
    pub fn from_action(action: &str, seek_offset: Option<f64>, seek_time: Option<f64>) -> Option<Self> {
        let secs = |v: Option<f64>| v.and_then(duration_from_secs);

        match action {
            "play" => Some(Self::Play),
            "pause" => Some(Self::Pause),
            "playpause" => Some(Self::PlayPause),
            "nexttrack" => Some(Self::Next),
            "previoustrack" => Some(Self::Previous),
            "seekbackward" => Some(Self::SeekBackward(secs(seek_offset))),
            "seekforward" => Some(Self::SeekForward(secs(seek_offset))),
            "seekto" => secs(seek_time).map(Self::SeekTo),
            _ => None,
        }
    }
}

/// One artwork entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    /// Image URL
    pub src: String,
    /// Size hint, e.g. `"96x96"`
    pub sizes: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Metadata shown on the control surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork: Vec<Artwork>,
}

impl NowPlaying {
    /// Describe `track`, advertising its artwork at each of `sizes`
    pub fn from_track(track: &Track, sizes: &[u32]) -> Self {
        let artwork = if track.artwork.is_empty() {
            Vec::new()
        } else {
            sizes
                .iter()
                .map(|size| Artwork {
                    src: track.artwork.clone(),
                    sizes: format!("{size}x{size}"),
                    mime_type: "image/png".to_string(),
                })
                .collect()
        };

        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            artwork,
        }
    }
}

/// Play state and position pushed to the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    pub is_playing: bool,
    pub position: Duration,
    pub duration: Duration,
}

//! Transport state machine
//!
//! Owns the player-wide fields (current track, play flag, position, volume,
//! repeat, shuffle). Every mutation goes through [`TransportState::apply`];
//! transitions are atomic and side-effect free. Commanding the audio resource
//! is the engine's job.

use crate::types::RepeatMode;
use crate::volume::Volume;
use aria_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single transport transition
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Select `track`, start playing from zero
    Play(Track),

    /// Flip the play flag
    TogglePlayPause,

    /// Clear the play flag, keeping the track selected
    Pause,

    /// Set the position (clamped to the track's duration)
    Tick(Duration),

    /// Set the volume level; zero also mutes
    SetVolume(f32),

    /// Flip mute
    ToggleMute,

    /// Flip shuffle
    ToggleShuffle,

    /// none -> all -> one -> none
    CycleRepeat,

    /// Queue ran out: no track, not playing
    EndOfQueue,
}

/// Player-wide transport state
#[derive(Debug, Clone, PartialEq)]
pub struct TransportState {
    current_track: Option<Track>,
    is_playing: bool,
    current_time: Duration,
    volume: Volume,
    repeat: RepeatMode,
    shuffle: bool,
}

impl TransportState {
    /// Create state with defaults: nothing selected, not playing, volume 0.7
    pub fn new() -> Self {
        Self::with_settings(Volume::default(), RepeatMode::Off, false)
    }

    /// Create state with explicit initial settings
    pub fn with_settings(volume: Volume, repeat: RepeatMode, shuffle: bool) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            current_time: Duration::ZERO,
            volume,
            repeat,
            shuffle,
        }
    }

    /// Apply a transition
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Play(track) => {
                self.current_track = Some(track);
                self.is_playing = true;
                self.current_time = Duration::ZERO;
            }
            Transition::TogglePlayPause => {
                self.is_playing = !self.is_playing;
            }
            Transition::Pause => {
                self.is_playing = false;
            }
            Transition::Tick(time) => {
                self.current_time = self
                    .current_track
                    .as_ref()
                    .map_or(Duration::ZERO, |t| t.clamp_position(time));
            }
            Transition::SetVolume(level) => {
                self.volume.set_level(level);
            }
            Transition::ToggleMute => {
                self.volume.toggle_mute();
            }
            Transition::ToggleShuffle => {
                self.shuffle = !self.shuffle;
            }
            Transition::CycleRepeat => {
                self.repeat = self.repeat.cycled();
            }
            Transition::EndOfQueue => {
                self.current_track = None;
                self.is_playing = false;
                self.current_time = Duration::ZERO;
            }
        }
    }

    /// Reset track and position, keeping volume and modes
    pub fn reset(&mut self) {
        self.apply(Transition::EndOfQueue);
    }

    /// Currently selected track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Whether playback is intended to be running
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Position within the current track
    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    /// Volume state
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Shuffle flag
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Serializable copy for observers
    pub fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            current_track: self.current_track.clone(),
            is_playing: self.is_playing,
            current_time: self.current_time.as_secs_f64(),
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            repeat: self.repeat,
            shuffle: self.shuffle,
        }
    }
}

impl Default for TransportState {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of [`TransportState`] for UI observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportSnapshot {
    /// Selected track
    pub current_track: Option<Track>,
    /// Play flag
    pub is_playing: bool,
    /// Position in seconds
    pub current_time: f64,
    /// Volume level
    pub volume: f32,
    /// Mute flag
    pub is_muted: bool,
    /// Repeat mode
    pub repeat: RepeatMode,
    /// Shuffle flag
    pub shuffle: bool,
}

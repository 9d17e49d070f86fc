//! Audio resource handle
//!
//! Abstracts the one playable media resource the engine drives (an HTML audio
//! element in the browser, a decoder/output pair elsewhere). `load` and `play`
//! are fire-and-forget: their outcomes come back later as [`ResourceEvent`]s,
//! tagged with the [`Generation`] they were issued under.

use crate::generation::Generation;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Platform audio resource
///
/// The engine is the only caller. Implementations must not block; every
/// completion is reported back through [`crate::PlaybackEngine::handle_resource_event`].
pub trait AudioResource {
    /// Point the resource at `url` and start loading
    ///
    /// Reports [`ResourceEventKind::Ready`] or [`ResourceEventKind::Error`]
    /// tagged with `generation`.
    fn load(&mut self, url: &str, generation: &Generation);

    /// Request playback
    ///
    /// Reports [`ResourceEventKind::PlayResolved`] or
    /// [`ResourceEventKind::PlayRejected`] tagged with `generation`.
    fn play(&mut self, generation: &Generation);

    /// Pause output
    fn pause(&mut self);

    /// Set the playback position
    fn seek(&mut self, position: Duration);

    /// Set the output level (0.0-1.0)
    fn set_volume(&mut self, level: f32);

    /// Set the muted flag
    fn set_muted(&mut self, muted: bool);

    /// Current position, or `None` when the resource cannot tell
    fn current_time(&self) -> Option<Duration>;

    /// Pause and rewind
    fn stop(&mut self) {
        self.pause();
        self.seek(Duration::ZERO);
    }
}

/// Completion or lifecycle notification from the resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEvent {
    /// Generation the originating operation was issued under
    pub generation: Generation,

    /// What happened
    pub kind: ResourceEventKind,
}

impl ResourceEvent {
    /// Create an event
    pub fn new(generation: Generation, kind: ResourceEventKind) -> Self {
        Self { generation, kind }
    }
}

/// Kinds of resource notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "camelCase")]
pub enum ResourceEventKind {
    /// Enough data is buffered to start playback
    Ready,

    /// A `play()` request succeeded
    PlayResolved,

    /// A `play()` request was refused (autoplay policy, interrupted load)
    PlayRejected(String),

    /// Loading or decoding failed
    Error(String),

    /// Playback reached the end of the track
    Ended,

    /// Native position notification
    TimeUpdate(Duration),
}

//! Aria - Playback Engine
//!
//! Platform-agnostic playback engine and transport state machine for Aria.
//!
//! This crate provides:
//! - Queue with cursor (linear and shuffled advance, repeat modes)
//! - Transport state machine (play/pause, position, volume, mute)
//! - Generation-tagged resource operations so late completions never leak
//! - Single automatic reload after a resource error
//! - Control-surface boundary (lock screen, media keys)
//!
//! # Architecture
//!
//! `aria-playback` never touches audio itself. The host supplies an
//! [`AudioResource`] (an HTML audio element under the `wasm` feature) and feeds
//! its completions back through [`PlaybackEngine::handle_resource_event`].
//! Every completion carries the [`Generation`] it was issued under; anything
//! from a superseded generation is discarded.
//!
//! # Example
//!
//! ```rust
//! use aria_core::Track;
//! use aria_playback::{
//!     AudioResource, EngineConfig, Generation, PlaybackEngine, ResourceEvent,
//!     ResourceEventKind,
//! };
//! use std::time::Duration;
//!
//! #[derive(Default)]
//! struct Silent {
//!     loaded: Option<Generation>,
//! }
//!
//! impl AudioResource for Silent {
//!     fn load(&mut self, _url: &str, generation: &Generation) {
//!         self.loaded = Some(generation.clone());
//!     }
//!     fn play(&mut self, _generation: &Generation) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration) {}
//!     fn set_volume(&mut self, _level: f32) {}
//!     fn set_muted(&mut self, _muted: bool) {}
//!     fn current_time(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//!
//! let mut engine = PlaybackEngine::new(Silent::default(), EngineConfig::default());
//! let a = Track::new("a", "First", "/music/a.mp3").with_duration(Duration::from_secs(180));
//! let b = Track::new("b", "Second", "/music/b.mp3").with_duration(Duration::from_secs(200));
//! engine.set_queue(vec![a.clone(), b.clone()], false);
//!
//! engine.play_track(&a);
//! let stale = engine.generation().cloned().unwrap();
//! engine.play_track(&b);
//!
//! // A late "ready" for the first track changes nothing
//! engine.handle_resource_event(ResourceEvent::new(stale, ResourceEventKind::Ready));
//! assert_eq!(engine.current_track().unwrap().id.as_str(), "b");
//! ```

mod config;
mod control_surface;
mod engine;
mod error;
mod events;
mod generation;
mod queue;
mod resource;
mod shuffle;
mod transport;
pub mod types;
mod volume;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use config::EngineConfig;
pub use control_surface::{
    Artwork, ControlCommand, ControlSurface, NowPlaying, SurfaceSnapshot, DEFAULT_ARTWORK_SIZES,
};
pub use engine::{EventDisposition, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, PlaybackStateEvent};
pub use generation::Generation;
pub use queue::{AdvanceOutcome, Queue};
pub use resource::{AudioResource, ResourceEvent, ResourceEventKind};
pub use shuffle::pick_next_index;
pub use transport::{Transition, TransportSnapshot, TransportState};
pub use types::{Direction, RepeatMode};
pub use volume::{Volume, DEFAULT_VOLUME};

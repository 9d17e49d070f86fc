//! WASM bindings for aria-playback
//!
//! This module provides WebAssembly bindings for the PlaybackEngine, driving
//! an HTML audio element and the Media Session API through small JS objects.

pub mod manager;
pub mod types;

pub use manager::WasmPlaybackEngine;
pub use types::{JsAudioResource, JsControlSurface};

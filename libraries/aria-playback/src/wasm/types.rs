//! JavaScript-backed collaborators
//!
//! The page owns the actual `<audio>` element and the `navigator.mediaSession`
//! hooks. These adapters forward engine commands to plain JS objects.

use crate::{AudioResource, ControlSurface, Generation, NowPlaying, SurfaceSnapshot};
use aria_core::duration_from_secs;
use js_sys::{Array, Function, Reflect};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Call `target[name](...args)`, ignoring missing methods and JS exceptions
fn call_method(target: &JsValue, name: &str, args: &Array) -> Option<JsValue> {
    let method = Reflect::get(target, &JsValue::from_str(name))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    method.apply(target, args).ok()
}

/// Audio resource implemented by a JS object
///
/// Expected shape:
///
/// ```js
/// {
///   load(url, trackId, serial) {},
///   play(trackId, serial) {},
///   pause() {},
///   seek(seconds) {},
///   setVolume(level) {},
///   setMuted(muted) {},
///   currentTime() { return audio.currentTime },
/// }
/// ```
///
/// The object reports outcomes with `engine.handleResourceEvent(trackId, serial, kind, detail)`.
pub struct JsAudioResource {
    target: JsValue,
}

impl JsAudioResource {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }
}

impl AudioResource for JsAudioResource {
    fn load(&mut self, url: &str, generation: &Generation) {
        call_method(
            &self.target,
            "load",
            &Array::of3(
                &JsValue::from_str(url),
                &JsValue::from_str(generation.track_id.as_str()),
                &JsValue::from_f64(generation.serial as f64),
            ),
        );
    }

    fn play(&mut self, generation: &Generation) {
        call_method(
            &self.target,
            "play",
            &Array::of2(
                &JsValue::from_str(generation.track_id.as_str()),
                &JsValue::from_f64(generation.serial as f64),
            ),
        );
    }

    fn pause(&mut self) {
        call_method(&self.target, "pause", &Array::new());
    }

    fn seek(&mut self, position: Duration) {
        call_method(
            &self.target,
            "seek",
            &Array::of1(&JsValue::from_f64(position.as_secs_f64())),
        );
    }

    fn set_volume(&mut self, level: f32) {
        call_method(
            &self.target,
            "setVolume",
            &Array::of1(&JsValue::from_f64(f64::from(level))),
        );
    }

    fn set_muted(&mut self, muted: bool) {
        call_method(&self.target, "setMuted", &Array::of1(&JsValue::from_bool(muted)));
    }

    fn current_time(&self) -> Option<Duration> {
        call_method(&self.target, "currentTime", &Array::new())?
            .as_f64()
            .and_then(duration_from_secs)
    }
}

/// Control surface implemented by a JS object
///
/// Expected shape: `{ setMetadata(metadataOrNull) {}, setPlaybackState(isPlaying, position, duration) {} }`.
pub struct JsControlSurface {
    target: JsValue,
}

impl JsControlSurface {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }
}

impl ControlSurface for JsControlSurface {
    fn set_metadata(&mut self, now_playing: Option<&NowPlaying>) {
        let metadata = now_playing
            .and_then(|np| serde_wasm_bindgen::to_value(np).ok())
            .unwrap_or(JsValue::NULL);
        call_method(&self.target, "setMetadata", &Array::of1(&metadata));
    }

    fn set_playback_state(&mut self, snapshot: &SurfaceSnapshot) {
        call_method(
            &self.target,
            "setPlaybackState",
            &Array::of3(
                &JsValue::from_bool(snapshot.is_playing),
                &JsValue::from_f64(snapshot.position.as_secs_f64()),
                &JsValue::from_f64(snapshot.duration.as_secs_f64()),
            ),
        );
    }
}

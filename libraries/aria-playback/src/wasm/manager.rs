//! WASM-compatible PlaybackEngine wrapper

use super::types::{JsAudioResource, JsControlSurface};
use crate::{
    ControlCommand, EngineConfig, EventDisposition, Generation, PlaybackEngine, PlaybackError,
    ResourceEvent, ResourceEventKind,
};
use aria_core::{duration_from_secs, JsonCatalog, Track, TrackId};
use js_sys::Function;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// WASM-compatible playback engine
///
/// This wraps the core PlaybackEngine with a JavaScript-friendly API. Queued
/// engine events are delivered to the `onEvent` callback after every call.
#[wasm_bindgen]
pub struct WasmPlaybackEngine {
    inner: PlaybackEngine<JsAudioResource>,

    // Event callback
    on_event: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlaybackEngine {
    /// Create an engine driving the JS audio object `resource`
    ///
    /// `config` is an optional plain object with `EngineConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(resource: JsValue, config: JsValue) -> Result<WasmPlaybackEngine, JsValue> {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        config.validate().map_err(to_js)?;

        Ok(Self {
            inner: PlaybackEngine::new(JsAudioResource::new(resource), config),
            on_event: None,
        })
    }

    /// Attach the lock-screen / media-key surface
    #[wasm_bindgen(js_name = setControlSurface)]
    pub fn set_control_surface(&mut self, surface: JsValue) {
        self.inner
            .set_control_surface(Box::new(JsControlSurface::new(surface)));
    }

    // ===== Catalog & Queue =====

    /// Load the catalog from a JSON document (array of tracks)
    #[wasm_bindgen(js_name = loadCatalog)]
    pub fn load_catalog(&mut self, json: &str) -> usize {
        self.inner.load_catalog(&JsonCatalog::new(json))
    }

    /// Replace the queue
    #[wasm_bindgen(js_name = setQueue)]
    pub fn set_queue(&mut self, tracks: JsValue, preserve_current: bool) -> Result<(), JsValue> {
        let tracks: Vec<Track> = serde_wasm_bindgen::from_value(tracks)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse tracks: {}", e)))?;
        self.inner.set_queue(tracks, preserve_current);
        self.flush();
        Ok(())
    }

    /// Append a track unless already queued
    #[wasm_bindgen(js_name = addToQueue)]
    pub fn add_to_queue(&mut self, track: JsValue) -> Result<bool, JsValue> {
        let added = self.inner.add_to_queue(parse_track(track)?);
        self.flush();
        Ok(added)
    }

    /// Get all tracks in queue
    #[wasm_bindgen(js_name = getQueue)]
    pub fn get_queue(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.queue().tracks()).unwrap_or(JsValue::NULL)
    }

    // ===== Playback Control =====

    /// Play a track object
    #[wasm_bindgen(js_name = playTrack)]
    pub fn play_track(&mut self, track: JsValue) -> Result<(), JsValue> {
        let track = parse_track(track)?;
        self.inner.play_track(&track);
        self.flush();
        Ok(())
    }

    /// Play a queued or catalog track by id
    #[wasm_bindgen(js_name = playTrackById)]
    pub fn play_track_by_id(&mut self, id: &str) -> Result<(), JsValue> {
        let result = self.inner.play_track_by_id(&TrackId::new(id));
        self.flush();
        result.map_err(to_js)
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) -> Result<(), JsValue> {
        let result = self.inner.toggle_play_pause();
        self.flush();
        result.map_err(to_js)
    }

    pub fn next(&mut self) {
        self.inner.next();
        self.flush();
    }

    pub fn previous(&mut self) {
        self.inner.previous();
        self.flush();
    }

    /// Seek to position in seconds
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, position_secs: f64) -> Result<(), JsValue> {
        // Past-the-end values clamp to the track end inside the engine
        let position = if position_secs.is_finite() {
            duration_from_secs(position_secs.max(0.0)).unwrap_or(Duration::MAX)
        } else {
            Duration::ZERO
        };
        let result = self.inner.seek_to(position);
        self.flush();
        result.map_err(to_js)
    }

    /// Seek relative to the current position
    #[wasm_bindgen(js_name = seekBy)]
    pub fn seek_by(&mut self, offset_secs: f64) -> Result<(), JsValue> {
        let result = self.inner.seek_by(offset_secs);
        self.flush();
        result.map_err(to_js)
    }

    /// Seek to a fraction (0.0 - 1.0) of the track, e.g. a progress-bar click
    #[wasm_bindgen(js_name = seekToFraction)]
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<(), JsValue> {
        let result = self.inner.seek_to_fraction(fraction);
        self.flush();
        result.map_err(to_js)
    }

    // ===== Volume & Modes =====

    /// Set volume (0.0 - 1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, level: f32) {
        self.inner.set_volume(level);
        self.flush();
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&mut self) {
        self.inner.toggle_mute();
        self.flush();
    }

    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) {
        self.inner.toggle_shuffle();
        self.flush();
    }

    /// Cycle repeat ("none" -> "all" -> "one"), returning the new mode
    #[wasm_bindgen(js_name = cycleRepeat)]
    pub fn cycle_repeat(&mut self) -> String {
        self.inner.cycle_repeat();
        self.flush();
        self.inner.repeat().to_string()
    }

    pub fn reset(&mut self) {
        self.inner.reset();
        self.flush();
    }

    // ===== Host hooks =====

    /// Report a resource outcome
    ///
    /// `kind` is one of `ready`, `playResolved`, `playRejected`, `error`,
    /// `ended`, `timeUpdate`. `detail` carries the message for rejections and
    /// errors, and the position in seconds for `timeUpdate`. Returns
    /// `applied`, `ignored` or `discarded`.
    #[wasm_bindgen(js_name = handleResourceEvent)]
    pub fn handle_resource_event(
        &mut self,
        track_id: &str,
        serial: f64,
        kind: &str,
        detail: JsValue,
    ) -> Result<String, JsValue> {
        let message = || detail.as_string().unwrap_or_default();
        let kind = match kind {
            "ready" => ResourceEventKind::Ready,
            "playResolved" => ResourceEventKind::PlayResolved,
            "playRejected" => ResourceEventKind::PlayRejected(message()),
            "error" => ResourceEventKind::Error(message()),
            "ended" => ResourceEventKind::Ended,
            "timeUpdate" => match detail.as_f64().and_then(duration_from_secs) {
                Some(position) => ResourceEventKind::TimeUpdate(position),
                None => return Ok("ignored".to_string()),
            },
            other => return Err(JsValue::from_str(&format!("Unknown resource event: {}", other))),
        };

        let generation = Generation {
            serial: serial as u64,
            track_id: TrackId::new(track_id),
        };
        let disposition = self
            .inner
            .handle_resource_event(ResourceEvent::new(generation, kind));
        self.flush();

        Ok(match disposition {
            EventDisposition::Applied => "applied",
            EventDisposition::Ignored => "ignored",
            EventDisposition::Discarded(_) => "discarded",
        }
        .to_string())
    }

    /// Execute a media-session action (`play`, `pause`, `nexttrack`,
    /// `previoustrack`, `seekbackward`, `seekforward`, `seekto`)
    #[wasm_bindgen(js_name = handleAction)]
    pub fn handle_action(
        &mut self,
        action: &str,
        seek_offset: Option<f64>,
        seek_time: Option<f64>,
    ) -> Result<(), JsValue> {
        let Some(command) = ControlCommand::from_action(action, seek_offset, seek_time) else {
            return Ok(());
        };
        let result = self.inner.handle_command(command);
        self.flush();
        result.map_err(to_js)
    }

    /// Timer tick; call every `pollIntervalMs`
    pub fn poll(&mut self) {
        self.inner.poll();
        self.flush();
    }

    #[wasm_bindgen(getter, js_name = pollIntervalMs)]
    pub fn poll_interval_ms(&self) -> f64 {
        self.inner.config().position_poll_interval_ms as f64
    }

    // ===== State Queries =====

    /// Current transport snapshot
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).unwrap_or(JsValue::NULL)
    }

    // ===== Event Listeners =====

    /// Register the event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        self.on_event = Some(callback);
    }

    // ===== Internal Event Emitters =====

    fn flush(&mut self) {
        let events = self.inner.drain_events();
        if let Some(ref cb) = self.on_event {
            for event in events {
                if let Ok(value) = serde_wasm_bindgen::to_value(&event) {
                    cb.call1(&JsValue::NULL, &value).ok();
                }
            }
        }
    }
}

fn parse_track(value: JsValue) -> Result<Track, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {}", e)))
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

//! Playback engine - core orchestration
//!
//! Coordinates queue, transport state and the audio resource. Every user or
//! control-surface command updates state synchronously first and only then
//! issues resource work; every resource completion is checked against the
//! live [`Generation`] before it may touch state.

use crate::{
    config::EngineConfig,
    control_surface::{ControlCommand, ControlSurface, NowPlaying, SurfaceSnapshot},
    error::{PlaybackError, Result},
    events::{PlaybackEvent, PlaybackStateEvent},
    generation::{Generation, GenerationCounter},
    queue::{AdvanceOutcome, Queue},
    resource::{AudioResource, ResourceEvent, ResourceEventKind},
    transport::{Transition, TransportSnapshot, TransportState},
    types::{Direction, RepeatMode},
    volume::Volume,
};
use aria_core::{
    clock::has_elapsed, duration_from_secs, CatalogProvider, Clock, NoopStats, StatsRecorder,
    SystemClock, Track, TrackId,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What the engine did with a resource event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event changed state or drove the resource
    Applied,

    /// Current, but irrelevant in the present state (e.g. ready while paused)
    Ignored,

    /// Tagged with a superseded generation and dropped
    Discarded(PlaybackError),
}

/// Origin of the outstanding `play()` request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayOrigin {
    /// Issued by the engine once the resource became ready
    Autoplay,
    /// Issued by a user play/pause flip; a rejection reverts the flip
    Toggle,
}

/// Automatic reload budget of the live generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    Available,
    Scheduled { since: DateTime<Utc> },
    Reloading,
    Spent,
}

/// Per-generation bookkeeping
#[derive(Debug, Clone, Copy)]
struct Attempt {
    play_origin: Option<PlayOrigin>,
    retry: RetryState,
}

impl Attempt {
    fn fresh() -> Self {
        Self {
            play_origin: None,
            retry: RetryState::Available,
        }
    }
}

/// Playback engine
///
/// Exclusively owns the audio resource, the queue and the transport state.
/// Single-threaded: hosts call commands, feed resource events through
/// [`PlaybackEngine::handle_resource_event`], call [`PlaybackEngine::poll`]
/// on a short timer and collect [`PlaybackEvent`]s with
/// [`PlaybackEngine::drain_events`].
pub struct PlaybackEngine<R: AudioResource> {
    config: EngineConfig,
    resource: R,
    queue: Queue,
    transport: TransportState,

    /// Full catalog, used to build a queue around a track that is not queued
    catalog: Vec<Track>,

    generation: Option<Generation>,
    generations: GenerationCounter,
    attempt: Attempt,

    stats: Arc<dyn StatsRecorder>,
    clock: Arc<dyn Clock>,
    surface: Option<Box<dyn ControlSurface>>,
    rng: StdRng,

    events: Vec<PlaybackEvent>,
}

impl<R: AudioResource> PlaybackEngine<R> {
    /// Create an engine driving `resource`
    ///
    /// Statistics go nowhere and time comes from the system clock until
    /// replaced with [`Self::with_stats`] / [`Self::with_clock`].
    pub fn new(mut resource: R, config: EngineConfig) -> Self {
        let volume = Volume::new(config.volume);
        resource.set_volume(volume.effective_level());
        resource.set_muted(volume.is_muted());

        let rng = config
            .shuffle_seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Self {
            transport: TransportState::with_settings(volume, config.repeat, config.shuffle),
            config,
            resource,
            queue: Queue::new(),
            catalog: Vec::new(),
            generation: None,
            generations: GenerationCounter::default(),
            attempt: Attempt::fresh(),
            stats: Arc::new(NoopStats),
            clock: Arc::new(SystemClock),
            surface: None,
            rng,
            events: Vec::new(),
        }
    }

    /// Use `stats` for play/like/visit notifications
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<dyn StatsRecorder>) -> Self {
        self.stats = stats;
        self
    }

    /// Use `clock` for retry scheduling
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Mirror state to an external control surface
    #[must_use]
    pub fn with_control_surface(mut self, surface: Box<dyn ControlSurface>) -> Self {
        self.set_control_surface(surface);
        self
    }

    /// Replace the control surface, bringing it up to date immediately
    pub fn set_control_surface(&mut self, mut surface: Box<dyn ControlSurface>) {
        if let Some(track) = self.transport.current_track() {
            surface.set_metadata(Some(&NowPlaying::from_track(
                track,
                &self.config.artwork_sizes,
            )));
        }
        self.surface = Some(surface);
        self.push_surface_state();
    }

    // ===== Catalog & queue =====

    /// Replace the catalog from `provider`
    ///
    /// A failing provider is treated like an empty one.
    pub fn load_catalog(&mut self, provider: &dyn CatalogProvider) -> usize {
        self.catalog = provider.tracks().unwrap_or_else(|e| {
            warn!("Catalog unavailable, continuing without tracks: {}", e);
            Vec::new()
        });
        self.catalog.len()
    }

    /// Replace the queue
    ///
    /// A current track that is also in the new queue keeps the cursor, so
    /// playback continues from it regardless of `preserve_current`.
    pub fn set_queue(&mut self, tracks: Vec<Track>, preserve_current: bool) {
        self.queue.set_queue(tracks, preserve_current);
        if let Some(id) = self.current_id().cloned() {
            let _ = self.queue.select(&id);
        }
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    /// Append `track` unless already queued
    pub fn add_to_queue(&mut self, track: Track) -> bool {
        let added = self.queue.add_unique(track);
        if added {
            self.emit(PlaybackEvent::QueueChanged {
                length: self.queue.len(),
            });
        }
        added
    }

    // ===== Transport commands =====

    /// Play `track` from the start
    ///
    /// No-op when `track` is already current and playing. Otherwise the
    /// previous attempt is torn down, state switches to `track` immediately,
    /// and the resource is asked to load it under a fresh generation. Counts
    /// as one play.
    pub fn play_track(&mut self, track: &Track) {
        if self.transport.is_playing() && self.current_id() == Some(&track.id) {
            return;
        }

        if self.queue.select(&track.id).is_err() {
            // Fresh queue: this track first, then the rest of the catalog
            let tracks = std::iter::once(track.clone())
                .chain(self.catalog.iter().filter(|t| t.id != track.id).cloned())
                .collect();
            self.set_queue(tracks, false);
            let _ = self.queue.select(&track.id);
        }

        self.start(track.clone());

        if let Err(e) = self.stats.record_play(&track.id) {
            warn!("Failed to record play of {}: {}", track.id, e);
        }
    }

    /// Play the queued or catalog track with `id`
    pub fn play_track_by_id(&mut self, id: &TrackId) -> Result<()> {
        let track = self
            .queue
            .position_of(id)
            .and_then(|i| self.queue.get(i))
            .or_else(|| self.catalog.iter().find(|t| &t.id == id))
            .cloned()
            .ok_or_else(|| PlaybackError::NotFound(id.clone()))?;

        self.play_track(&track);
        Ok(())
    }

    /// Flip play/pause
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        let generation = self.generation.clone().ok_or(PlaybackError::NoTrackLoaded)?;
        let was_playing = self.transport.is_playing();

        self.transport.apply(Transition::TogglePlayPause);

        if was_playing {
            self.attempt.play_origin = None;
            self.resource.pause();
        } else {
            self.attempt.play_origin = Some(PlayOrigin::Toggle);
            self.resource.play(&generation);
        }

        self.notify_state();
        Ok(())
    }

    /// Skip to the next track (shuffle-aware)
    ///
    /// Running off the end without repeat-all stops playback and clears the
    /// current track.
    pub fn next(&mut self) {
        // Right after a queue replacement the cursor names a track that has
        // not been started yet
        if self.transport.current_track().is_none() {
            if let Some(track) = self.queue.current().cloned() {
                self.start(track);
                return;
            }
        }

        self.advance_next();
    }

    /// Step back to the previous track
    ///
    /// At the start of the queue this stays put unless repeat-all is set.
    pub fn previous(&mut self) {
        let outcome = self.queue.advance(
            Direction::Previous,
            false,
            self.transport.repeat(),
            &mut self.rng,
        );

        if let Ok(AdvanceOutcome::Moved(index)) = outcome {
            if let Some(track) = self.queue.get(index).cloned() {
                self.start(track);
            }
        }
    }

    /// Seek to `position`, clamped to the current track
    pub fn seek_to(&mut self, position: Duration) -> Result<()> {
        let position = self
            .transport
            .current_track()
            .ok_or(PlaybackError::NoTrackLoaded)?
            .clamp_position(position);

        self.resource.seek(position);
        self.transport.apply(Transition::Tick(position));
        self.emit_position();
        self.push_surface_state();
        Ok(())
    }

    /// Seek relative to the current position
    ///
    /// Negative offsets seek backwards; the result is clamped to the track.
    pub fn seek_by(&mut self, offset_secs: f64) -> Result<()> {
        if !offset_secs.is_finite() {
            return Ok(());
        }

        let target = (self.position().as_secs_f64() + offset_secs).max(0.0);
        // Too large to represent means past the end; seek_to clamps it
        self.seek_to(duration_from_secs(target).unwrap_or(Duration::MAX))
    }

    /// Seek to a fraction (0.0-1.0) of the current track
    pub fn seek_to_fraction(&mut self, fraction: f64) -> Result<()> {
        let duration = self
            .transport
            .current_track()
            .ok_or(PlaybackError::NoTrackLoaded)?
            .duration;

        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek_to(duration.mul_f64(fraction))
    }

    /// Set volume level (0.0-1.0); zero also mutes
    pub fn set_volume(&mut self, level: f32) {
        self.transport.apply(Transition::SetVolume(level));
        self.sync_volume();
    }

    /// Flip mute
    pub fn toggle_mute(&mut self) {
        self.transport.apply(Transition::ToggleMute);
        self.sync_volume();
    }

    /// Flip shuffle
    pub fn toggle_shuffle(&mut self) {
        self.transport.apply(Transition::ToggleShuffle);
        self.emit_mode();
    }

    /// Cycle repeat: none -> all -> one -> none
    pub fn cycle_repeat(&mut self) {
        self.transport.apply(Transition::CycleRepeat);
        self.emit_mode();
    }

    /// Return to "no track playing"
    ///
    /// Keeps the queue, volume and modes.
    pub fn reset(&mut self) {
        let previous = self.current_id().cloned();

        self.resource.stop();
        self.generation = None;
        self.attempt = Attempt::fresh();
        self.transport.reset();
        self.queue.deselect();

        if previous.is_some() {
            self.emit(PlaybackEvent::TrackChanged {
                track_id: None,
                previous_track_id: previous,
            });
        }
        self.notify_state();
        if let Some(surface) = self.surface.as_mut() {
            surface.set_metadata(None);
        }
    }

    // ===== Stats pass-through =====

    /// Record a like/unlike
    pub fn record_like(&self, id: &TrackId, liked: bool) {
        if let Err(e) = self.stats.record_like(id, liked) {
            warn!("Failed to record like of {}: {}", id, e);
        }
    }

    /// Record a site visit
    pub fn record_visit(&self) {
        if let Err(e) = self.stats.record_visit() {
            warn!("Failed to record visit: {}", e);
        }
    }

    // ===== Control surface =====

    /// Execute a control-surface command as a local user action
    pub fn handle_command(&mut self, command: ControlCommand) -> Result<()> {
        debug!("Control command: {:?}", command);

        match command {
            ControlCommand::Play if !self.transport.is_playing() => self.toggle_play_pause(),
            ControlCommand::Pause if self.transport.is_playing() => self.toggle_play_pause(),
            ControlCommand::Play | ControlCommand::Pause => Ok(()),
            ControlCommand::PlayPause => self.toggle_play_pause(),
            ControlCommand::Next => {
                self.next();
                Ok(())
            }
            ControlCommand::Previous => {
                self.previous();
                Ok(())
            }
            ControlCommand::SeekBackward(offset) => {
                let offset = offset.unwrap_or_else(|| self.config.default_seek_offset());
                self.seek_to(self.position().saturating_sub(offset))
            }
            ControlCommand::SeekForward(offset) => {
                let offset = offset.unwrap_or_else(|| self.config.default_seek_offset());
                self.seek_to(self.position().saturating_add(offset))
            }
            ControlCommand::SeekTo(position) => self.seek_to(position),
        }
    }

    // ===== Resource events =====

    /// Single entry point for every resource notification
    pub fn handle_resource_event(&mut self, event: ResourceEvent) -> EventDisposition {
        let ResourceEvent { generation, kind } = event;

        if !generation.is_current(self.generation.as_ref()) {
            debug!("Discarding {:?} for stale generation {}", kind, generation);

            // A stale play that still started the shared resource must not
            // be audible while the engine is stopped
            if kind == ResourceEventKind::PlayResolved && !self.transport.is_playing() {
                self.resource.pause();
            }

            return EventDisposition::Discarded(PlaybackError::StaleCompletion {
                track_id: generation.track_id,
                serial: generation.serial,
            });
        }

        match kind {
            ResourceEventKind::Ready => self.on_ready(&generation),
            ResourceEventKind::PlayResolved => self.on_play_resolved(),
            ResourceEventKind::PlayRejected(message) => self.on_play_rejected(&generation, message),
            ResourceEventKind::Error(message) => self.on_error(&generation, message),
            ResourceEventKind::Ended => self.on_ended(&generation),
            ResourceEventKind::TimeUpdate(position) => {
                if !self.transport.is_playing() {
                    return EventDisposition::Ignored;
                }
                self.transport.apply(Transition::Tick(position));
                self.emit_position();
                self.push_surface_state();
                EventDisposition::Applied
            }
        }
    }

    /// Periodic timer tick
    ///
    /// Runs a due reload and, while playing, samples the resource position.
    pub fn poll(&mut self) {
        if let RetryState::Scheduled { since } = self.attempt.retry {
            if has_elapsed(since, self.clock.now(), self.config.retry_delay()) {
                self.reload();
            }
        }

        if self.transport.is_playing() && self.transport.current_track().is_some() {
            if let Some(position) = self.resource.current_time() {
                self.transport.apply(Transition::Tick(position));
                self.emit_position();
                self.push_surface_state();
            }
        }

        self.ensure_consistent();
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    // ===== Accessors =====

    pub fn transport(&self) -> &TransportState {
        &self.transport
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        self.transport.snapshot()
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn catalog(&self) -> &[Track] {
        &self.catalog
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.transport.current_track()
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn current_time(&self) -> Duration {
        self.transport.current_time()
    }

    pub fn repeat(&self) -> RepeatMode {
        self.transport.repeat()
    }

    pub fn shuffle(&self) -> bool {
        self.transport.shuffle()
    }

    /// Live generation, `None` when nothing is loaded
    pub fn generation(&self) -> Option<&Generation> {
        self.generation.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    // ===== Internals =====

    /// Tear down the previous attempt and start `track` under a new generation
    fn start(&mut self, track: Track) {
        let previous = self.current_id().cloned();

        self.resource.stop();

        self.transport.apply(Transition::Play(track.clone()));
        let generation = self.generations.next(track.id.clone());
        self.generation = Some(generation.clone());
        self.attempt = Attempt::fresh();

        info!("Playing {} ({})", track.title, generation);

        if previous.as_ref() != Some(&track.id) {
            self.emit(PlaybackEvent::TrackChanged {
                track_id: Some(track.id.clone()),
                previous_track_id: previous,
            });
        }
        self.notify_state();
        if let Some(surface) = self.surface.as_mut() {
            let now_playing = NowPlaying::from_track(&track, &self.config.artwork_sizes);
            surface.set_metadata(Some(&now_playing));
        }

        self.resource.load(&track.audio_url, &generation);
    }

    /// Linear or shuffled next; stops at the end of the queue
    fn advance_next(&mut self) {
        let shuffle = self.transport.shuffle() && self.queue.len() > 1;

        match self.queue.advance(
            Direction::Next,
            shuffle,
            self.transport.repeat(),
            &mut self.rng,
        ) {
            Ok(AdvanceOutcome::Moved(index)) => {
                if let Some(track) = self.queue.get(index).cloned() {
                    self.start(track);
                }
            }
            Ok(AdvanceOutcome::Stayed) => {}
            Err(PlaybackError::QueueExhausted) => self.end_of_queue(),
            Err(e) => warn!("Unexpected advance failure: {}", e),
        }
    }

    fn end_of_queue(&mut self) {
        info!("Reached end of queue");
        self.reset();
    }

    fn on_ready(&mut self, generation: &Generation) -> EventDisposition {
        if self.attempt.retry == RetryState::Reloading {
            self.attempt.retry = RetryState::Spent;
        }

        // A user play issued before the load finished is still pending and
        // owns the outcome
        if !self.transport.is_playing() || self.attempt.play_origin == Some(PlayOrigin::Toggle) {
            return EventDisposition::Ignored;
        }

        self.attempt.play_origin = Some(PlayOrigin::Autoplay);
        self.resource.play(generation);
        EventDisposition::Applied
    }

    fn on_play_resolved(&mut self) -> EventDisposition {
        self.attempt.play_origin = None;

        // Paused while the request was in flight
        if !self.transport.is_playing() {
            self.resource.pause();
        }
        EventDisposition::Applied
    }

    fn on_play_rejected(&mut self, generation: &Generation, message: String) -> EventDisposition {
        let origin = self.attempt.play_origin.take();
        debug!("Play of {} rejected: {}", generation, message);

        self.emit(PlaybackEvent::Failure {
            track_id: generation.track_id.clone(),
            error: PlaybackError::ResourcePlayRejected {
                track_id: generation.track_id.clone(),
                message,
            },
        });

        if origin == Some(PlayOrigin::Toggle) && self.transport.is_playing() {
            self.transport.apply(Transition::Pause);
            self.notify_state();
        }
        EventDisposition::Applied
    }

    fn on_error(&mut self, generation: &Generation, message: String) -> EventDisposition {
        match self.attempt.retry {
            RetryState::Available => {
                warn!("Failed to load {}, retrying once: {}", generation, message);
                self.attempt.retry = RetryState::Scheduled {
                    since: self.clock.now(),
                };
                self.emit(PlaybackEvent::Failure {
                    track_id: generation.track_id.clone(),
                    error: PlaybackError::ResourceLoad {
                        track_id: generation.track_id.clone(),
                        message,
                    },
                });
                EventDisposition::Applied
            }
            RetryState::Scheduled { .. } => EventDisposition::Ignored,
            RetryState::Reloading | RetryState::Spent => {
                warn!("Reload of {} failed, stopping: {}", generation, message);
                self.attempt.retry = RetryState::Spent;
                self.attempt.play_origin = None;
                self.resource.pause();
                self.emit(PlaybackEvent::Failure {
                    track_id: generation.track_id.clone(),
                    error: PlaybackError::RetryExhausted {
                        track_id: generation.track_id.clone(),
                        message,
                    },
                });
                if self.transport.is_playing() {
                    self.transport.apply(Transition::Pause);
                    self.notify_state();
                }
                EventDisposition::Applied
            }
        }
    }

    fn on_ended(&mut self, generation: &Generation) -> EventDisposition {
        if self.transport.repeat() == RepeatMode::One {
            if let Some(track) = self.transport.current_track().cloned() {
                let was_playing = self.transport.is_playing();
                self.transport.apply(Transition::Play(track));
                self.resource.seek(Duration::ZERO);
                self.attempt.play_origin = Some(PlayOrigin::Autoplay);
                self.resource.play(generation);
                if !was_playing {
                    self.notify_state();
                }
                self.emit_position();
                return EventDisposition::Applied;
            }
        }

        self.advance_next();
        EventDisposition::Applied
    }

    /// Reload the live generation after a failed load
    fn reload(&mut self) {
        let Some(generation) = self.generation.clone() else {
            self.attempt.retry = RetryState::Spent;
            return;
        };
        let Some(url) = self.transport.current_track().map(|t| t.audio_url.clone()) else {
            self.attempt.retry = RetryState::Spent;
            return;
        };

        debug!("Reloading {}", generation);
        self.attempt.retry = RetryState::Reloading;
        self.resource.load(&url, &generation);
    }

    /// Fall back to "no track playing" if the cursor lost the current track
    fn ensure_consistent(&mut self) {
        let Some(current) = self.current_id() else {
            return;
        };
        let Some(position) = self.queue.position_of(current) else {
            return;
        };

        if self.queue.cursor() != Some(position) {
            warn!(
                "Queue cursor {:?} does not match current track at {}, resetting",
                self.queue.cursor(),
                position
            );
            self.reset();
        }
    }

    fn current_id(&self) -> Option<&TrackId> {
        self.transport.current_track().map(|t| &t.id)
    }

    /// Best known position: the resource's, else the last tick
    fn position(&self) -> Duration {
        self.resource
            .current_time()
            .unwrap_or_else(|| self.transport.current_time())
    }

    fn sync_volume(&mut self) {
        let volume = *self.transport.volume();
        self.resource.set_volume(volume.effective_level());
        self.resource.set_muted(volume.is_muted());
        self.emit(PlaybackEvent::VolumeChanged {
            level: volume.level(),
            is_muted: volume.is_muted(),
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.events.push(event);
    }

    fn emit_mode(&mut self) {
        self.emit(PlaybackEvent::ModeChanged {
            repeat: self.transport.repeat(),
            shuffle: self.transport.shuffle(),
        });
    }

    fn emit_position(&mut self) {
        if let Some(track) = self.transport.current_track() {
            let event = PlaybackEvent::PositionUpdate {
                position_ms: self.transport.current_time().as_millis() as u64,
                duration_ms: track.duration.as_millis() as u64,
            };
            self.emit(event);
        }
    }

    /// Queue a state event and mirror it to the surface
    fn notify_state(&mut self) {
        self.emit(PlaybackEvent::StateChanged {
            state: PlaybackStateEvent::from(&self.transport),
        });
        self.push_surface_state();
    }

    fn push_surface_state(&mut self) {
        let Some(track) = self.transport.current_track() else {
            return;
        };
        let snapshot = SurfaceSnapshot {
            is_playing: self.transport.is_playing(),
            position: self.transport.current_time(),
            duration: track.duration,
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.set_playback_state(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::recording::{Call, RecordingResource};
    use aria_core::{ManualClock, StaticCatalog};
    use mockall::predicate::eq;

    mockall::mock! {
        pub Stats {}
        impl StatsRecorder for Stats {
            fn record_play(&self, track_id: &TrackId) -> aria_core::Result<()>;
            fn record_like(&self, track_id: &TrackId, liked: bool) -> aria_core::Result<()>;
            fn record_visit(&self) -> aria_core::Result<()>;
        }
    }

    fn track(id: &str, secs: u64) -> Track {
        Track::new(id, format!("Track {}", id), format!("/music/{}.mp3", id))
            .with_duration(Duration::from_secs(secs))
    }

    fn config() -> EngineConfig {
        EngineConfig {
            shuffle_seed: Some(42),
            ..EngineConfig::default()
        }
    }

    fn engine_with(ids: &[&str]) -> PlaybackEngine<RecordingResource> {
        let mut engine = PlaybackEngine::new(RecordingResource::default(), config())
            .with_clock(Arc::new(ManualClock::default()));
        engine.set_queue(ids.iter().map(|id| track(id, 180)).collect(), false);
        engine
    }

    fn live(engine: &PlaybackEngine<RecordingResource>) -> Generation {
        engine.generation().cloned().unwrap()
    }

    fn event(generation: &Generation, kind: ResourceEventKind) -> ResourceEvent {
        ResourceEvent::new(generation.clone(), kind)
    }

    #[test]
    fn new_engine_applies_initial_volume() {
        let engine = PlaybackEngine::new(RecordingResource::default(), config());
        assert_eq!(
            engine.resource().calls,
            vec![Call::SetVolume(0.7), Call::SetMuted(false)]
        );
        assert!(engine.current_track().is_none());
    }

    #[test]
    fn play_track_updates_state_before_load_completes() {
        let mut engine = engine_with(&["a", "b"]);
        engine.play_track(&track("b", 180));

        assert_eq!(engine.current_track().unwrap().id.as_str(), "b");
        assert!(engine.is_playing());
        assert_eq!(engine.queue().cursor(), Some(1));
        assert_eq!(live(&engine).track_id.as_str(), "b");
        assert_eq!(engine.resource().load_count(), 1);
        // No play until the resource reports ready
        assert_eq!(engine.resource().play_count(), 0);
    }

    #[test]
    fn ready_starts_playback_for_live_generation() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        let generation = live(&engine);

        let outcome = engine.handle_resource_event(event(&generation, ResourceEventKind::Ready));
        assert_eq!(outcome, EventDisposition::Applied);
        assert_eq!(engine.resource().calls.last(), Some(&Call::Play(generation)));
    }

    #[test]
    fn ready_while_paused_is_ignored() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        engine.toggle_play_pause().unwrap();
        let generation = live(&engine);
        let plays = engine.resource().play_count();

        let outcome = engine.handle_resource_event(event(&generation, ResourceEventKind::Ready));
        assert_eq!(outcome, EventDisposition::Ignored);
        assert_eq!(engine.resource().play_count(), plays);
    }

    #[test]
    fn stale_ready_is_discarded() {
        let mut engine = engine_with(&["a", "b"]);
        engine.play_track(&track("a", 180));
        let stale = live(&engine);
        engine.play_track(&track("b", 180));

        let outcome = engine.handle_resource_event(event(&stale, ResourceEventKind::Ready));
        assert!(matches!(
            outcome,
            EventDisposition::Discarded(PlaybackError::StaleCompletion { .. })
        ));
        assert_eq!(engine.resource().play_count(), 0);
        assert_eq!(engine.current_track().unwrap().id.as_str(), "b");
    }

    #[test]
    fn play_track_is_idempotent_while_playing() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        let generation = live(&engine);

        engine.play_track(&track("a", 180));
        assert_eq!(live(&engine), generation);
        assert_eq!(engine.resource().load_count(), 1);
    }

    #[test]
    fn play_track_restarts_paused_track() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        let first = live(&engine);
        engine.toggle_play_pause().unwrap();

        engine.play_track(&track("a", 180));
        assert!(engine.is_playing());
        assert_ne!(live(&engine), first);
    }

    #[test]
    fn play_track_outside_queue_builds_fresh_queue() {
        let mut engine = engine_with(&[]);
        engine.load_catalog(&StaticCatalog::new(vec![
            track("a", 180),
            track("b", 180),
            track("c", 180),
        ]));

        engine.play_track(&track("b", 180));
        let ids: Vec<_> = engine.queue().tracks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(engine.queue().cursor(), Some(0));
    }

    #[test]
    fn play_track_by_id_looks_in_catalog() {
        let mut engine = engine_with(&["a"]);
        engine.load_catalog(&StaticCatalog::new(vec![track("a", 180), track("z", 90)]));

        engine.play_track_by_id(&TrackId::new("z")).unwrap();
        assert_eq!(engine.current_track().unwrap().id.as_str(), "z");

        let err = engine.play_track_by_id(&TrackId::new("missing")).unwrap_err();
        assert_eq!(err, PlaybackError::NotFound(TrackId::new("missing")));
    }

    #[test]
    fn play_track_records_exactly_one_play() {
        let mut stats = MockStats::new();
        stats
            .expect_record_play()
            .with(eq(TrackId::new("a")))
            .times(1)
            .returning(|_| Ok(()));

        let mut engine = engine_with(&["a", "b"]).with_stats(Arc::new(stats));
        engine.play_track(&track("a", 180));
        // Idempotent call and resume are not plays
        engine.play_track(&track("a", 180));
        engine.toggle_play_pause().unwrap();
        engine.toggle_play_pause().unwrap();
        // Skips are not plays either
        engine.next();
    }

    #[test]
    fn stats_failures_do_not_affect_playback() {
        let mut stats = MockStats::new();
        stats
            .expect_record_play()
            .returning(|_| Err(aria_core::AriaError::stats("backend down")));

        let mut engine = engine_with(&["a"]).with_stats(Arc::new(stats));
        engine.play_track(&track("a", 180));
        assert!(engine.is_playing());
    }

    #[test]
    fn toggle_without_track_fails() {
        let mut engine = engine_with(&["a"]);
        assert_eq!(engine.toggle_play_pause(), Err(PlaybackError::NoTrackLoaded));
        assert!(!engine.is_playing());
    }

    #[test]
    fn toggle_rejection_reverts_flip() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        engine.toggle_play_pause().unwrap();
        engine.toggle_play_pause().unwrap();
        assert!(engine.is_playing());

        let generation = live(&engine);
        engine.handle_resource_event(event(
            &generation,
            ResourceEventKind::PlayRejected("NotAllowedError".into()),
        ));
        assert!(!engine.is_playing());
    }

    #[test]
    fn user_play_rejected_after_ready_reverts_flip() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        engine.toggle_play_pause().unwrap();
        engine.toggle_play_pause().unwrap();
        let generation = live(&engine);

        let outcome = engine.handle_resource_event(event(&generation, ResourceEventKind::Ready));
        assert_eq!(outcome, EventDisposition::Ignored);
        assert_eq!(engine.resource().play_count(), 1);

        engine.handle_resource_event(event(
            &generation,
            ResourceEventKind::PlayRejected("NotAllowedError".into()),
        ));
        assert!(!engine.is_playing());

        engine.handle_resource_event(event(
            &generation,
            ResourceEventKind::PlayRejected("NotAllowedError".into()),
        ));
        assert!(!engine.is_playing());
    }

    #[test]
    fn autoplay_rejection_is_swallowed_but_observable() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        let generation = live(&engine);
        engine.handle_resource_event(event(&generation, ResourceEventKind::Ready));
        engine.drain_events();

        let outcome = engine.handle_resource_event(event(
            &generation,
            ResourceEventKind::PlayRejected("NotAllowedError".into()),
        ));
        assert_eq!(outcome, EventDisposition::Applied);
        assert!(engine.is_playing());
        assert!(engine
            .drain_events()
            .iter()
            .any(|e| matches!(e, PlaybackEvent::Failure { .. })));
    }

    #[test]
    fn resolved_play_after_pause_is_paused_again() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        let generation = live(&engine);
        engine.handle_resource_event(event(&generation, ResourceEventKind::Ready));
        engine.toggle_play_pause().unwrap();

        engine.handle_resource_event(event(&generation, ResourceEventKind::PlayResolved));
        assert_eq!(engine.resource().calls.last(), Some(&Call::Pause));
        assert!(!engine.is_playing());
    }

    #[test]
    fn error_schedules_single_reload() {
        let clock = Arc::new(ManualClock::default());
        let mut engine = engine_with(&["a"]).with_clock(clock.clone());
        engine.play_track(&track("a", 180));
        let generation = live(&engine);

        engine.handle_resource_event(event(&generation, ResourceEventKind::Error("net".into())));
        engine.poll();
        assert_eq!(engine.resource().load_count(), 1, "reload waits for the delay");

        clock.advance(Duration::from_millis(100));
        engine.poll();
        assert_eq!(engine.resource().load_count(), 2);
        assert_eq!(engine.resource().last_load(), Some(&generation));

        engine.poll();
        assert_eq!(engine.resource().load_count(), 2);
    }

    #[test]
    fn second_error_leaves_track_selected_but_stopped() {
        let clock = Arc::new(ManualClock::default());
        let mut engine = engine_with(&["a"]).with_clock(clock.clone());
        engine.play_track(&track("a", 180));
        let generation = live(&engine);

        engine.handle_resource_event(event(&generation, ResourceEventKind::Error("net".into())));
        clock.advance(Duration::from_millis(100));
        engine.poll();
        engine.drain_events();
        engine.handle_resource_event(event(&generation, ResourceEventKind::Error("net".into())));

        assert!(!engine.is_playing());
        assert_eq!(engine.current_track().unwrap().id.as_str(), "a");
        assert!(engine.drain_events().iter().any(|e| matches!(
            e,
            PlaybackEvent::Failure {
                error: PlaybackError::RetryExhausted { .. },
                ..
            }
        )));

        clock.advance(Duration::from_secs(5));
        engine.poll();
        assert_eq!(engine.resource().load_count(), 2);
    }

    #[test]
    fn stale_error_does_not_schedule_reload() {
        let clock = Arc::new(ManualClock::default());
        let mut engine = engine_with(&["a", "b"]).with_clock(clock.clone());
        engine.play_track(&track("a", 180));
        let stale = live(&engine);
        engine.play_track(&track("b", 180));

        engine.handle_resource_event(event(&stale, ResourceEventKind::Error("net".into())));
        clock.advance(Duration::from_secs(1));
        engine.poll();
        assert_eq!(engine.resource().load_count(), 2);
    }

    #[test]
    fn ended_with_repeat_one_replays_same_track() {
        let mut engine = engine_with(&["a", "b"]);
        engine.play_track(&track("a", 180));
        engine.cycle_repeat();
        engine.cycle_repeat();
        assert_eq!(engine.repeat(), RepeatMode::One);

        let generation = live(&engine);
        engine.handle_resource_event(event(
            &generation,
            ResourceEventKind::TimeUpdate(Duration::from_secs(179)),
        ));
        engine.handle_resource_event(event(&generation, ResourceEventKind::Ended));

        assert_eq!(engine.current_track().unwrap().id.as_str(), "a");
        assert_eq!(engine.current_time(), Duration::ZERO);
        assert!(engine.is_playing());
        assert_eq!(live(&engine), generation);
        assert_eq!(engine.resource().calls.last(), Some(&Call::Play(generation)));
    }

    #[test]
    fn ended_at_last_track_clears_current() {
        let mut engine = engine_with(&["a", "b"]);
        engine.play_track(&track("b", 180));
        let generation = live(&engine);

        engine.handle_resource_event(event(&generation, ResourceEventKind::Ended));
        assert!(engine.current_track().is_none());
        assert!(!engine.is_playing());
        assert!(engine.generation().is_none());
    }

    #[test]
    fn next_after_set_queue_starts_cursor_track() {
        let mut engine = engine_with(&["a", "b"]);
        engine.next();
        assert_eq!(engine.current_track().unwrap().id.as_str(), "a");
    }

    #[test]
    fn previous_at_start_keeps_playing() {
        let mut engine = engine_with(&["a", "b"]);
        engine.play_track(&track("a", 180));
        let generation = live(&engine);

        engine.previous();
        assert_eq!(live(&engine), generation);
        assert!(engine.is_playing());
    }

    #[test]
    fn shuffle_with_single_track_falls_back_to_linear() {
        let mut engine = engine_with(&["a"]);
        engine.toggle_shuffle();
        engine.play_track(&track("a", 180));

        engine.next();
        assert!(engine.current_track().is_none());
    }

    #[test]
    fn seek_clamps_and_is_idempotent() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));

        engine.seek_to(Duration::from_secs(500)).unwrap();
        assert_eq!(engine.current_time(), Duration::from_secs(180));

        engine.seek_to(Duration::from_secs(30)).unwrap();
        let first = engine.snapshot();
        engine.seek_to(Duration::from_secs(30)).unwrap();
        assert_eq!(engine.snapshot(), first);
    }

    #[test]
    fn seek_without_track_fails() {
        let mut engine = engine_with(&["a"]);
        assert_eq!(
            engine.seek_to(Duration::from_secs(1)),
            Err(PlaybackError::NoTrackLoaded)
        );
    }

    #[test]
    fn seek_to_fraction_uses_duration() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 200));
        engine.seek_to_fraction(0.25).unwrap();
        assert_eq!(engine.current_time(), Duration::from_secs(50));
    }

    #[test]
    fn volume_reaches_resource() {
        let mut engine = engine_with(&["a"]);
        engine.set_volume(0.0);
        assert!(engine.transport().volume().is_muted());
        assert!(engine.resource().calls.ends_with(&[Call::SetVolume(0.0), Call::SetMuted(true)]));

        engine.set_volume(0.5);
        engine.toggle_mute();
        assert!(engine.resource().calls.ends_with(&[Call::SetVolume(0.5), Call::SetMuted(false)]));
    }

    #[test]
    fn poll_samples_position_while_playing() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        engine.resource_mut().position = Some(Duration::from_secs(12));

        engine.poll();
        assert_eq!(engine.current_time(), Duration::from_secs(12));

        engine.toggle_play_pause().unwrap();
        engine.resource_mut().position = Some(Duration::from_secs(40));
        engine.poll();
        assert_eq!(engine.current_time(), Duration::from_secs(12));
    }

    #[test]
    fn time_update_is_clamped() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 60));
        let generation = live(&engine);

        engine.handle_resource_event(event(
            &generation,
            ResourceEventKind::TimeUpdate(Duration::from_secs(61)),
        ));
        assert_eq!(engine.current_time(), Duration::from_secs(60));
    }

    #[test]
    fn control_play_and_pause_are_conditional() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));

        engine.handle_command(ControlCommand::Play).unwrap();
        assert!(engine.is_playing());

        engine.handle_command(ControlCommand::Pause).unwrap();
        assert!(!engine.is_playing());
        engine.handle_command(ControlCommand::Pause).unwrap();
        assert!(!engine.is_playing());
    }

    #[test]
    fn control_seek_uses_default_offset() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));
        engine.seek_to(Duration::from_secs(30)).unwrap();

        engine.handle_command(ControlCommand::SeekForward(None)).unwrap();
        assert_eq!(engine.current_time(), Duration::from_secs(40));

        engine
            .handle_command(ControlCommand::SeekBackward(Some(Duration::from_secs(100))))
            .unwrap();
        assert_eq!(engine.current_time(), Duration::ZERO);
    }

    #[test]
    fn set_queue_during_playback_keeps_current_track() {
        let mut engine = engine_with(&["a", "b", "c"]);
        engine.play_track(&track("b", 180));

        engine.set_queue(
            ["a", "b", "c", "d"].iter().map(|id| track(id, 180)).collect(),
            false,
        );
        assert_eq!(engine.queue().cursor(), Some(1));

        engine.poll();
        assert!(engine.is_playing());
        assert_eq!(engine.current_track().unwrap().id.as_str(), "b");

        engine.next();
        assert_eq!(engine.current_track().unwrap().id.as_str(), "c");
    }

    #[test]
    fn huge_relative_seeks_clamp_to_track_end() {
        let mut engine = engine_with(&["a"]);
        engine.play_track(&track("a", 180));

        engine.seek_by(1e30).unwrap();
        assert_eq!(engine.current_time(), Duration::from_secs(180));

        engine.seek_by(-1e30).unwrap();
        assert_eq!(engine.current_time(), Duration::ZERO);

        engine
            .handle_command(ControlCommand::SeekForward(Some(Duration::MAX)))
            .unwrap();
        assert_eq!(engine.current_time(), Duration::from_secs(180));
    }

    #[test]
    fn catalog_with_oversized_duration_is_empty() {
        let mut engine = engine_with(&[]);
        let catalog = aria_core::JsonCatalog::new(
            r#"[{"id":"a","title":"A","artist":"X","duration":1e30,"audioUrl":"/a.mp3"}]"#,
        );
        assert_eq!(engine.load_catalog(&catalog), 0);
    }

    #[test]
    fn failing_catalog_is_empty() {
        struct Broken;
        impl CatalogProvider for Broken {
            fn tracks(&self) -> aria_core::Result<Vec<Track>> {
                Err(aria_core::AriaError::catalog("unreachable"))
            }
        }

        let mut engine = engine_with(&[]);
        assert_eq!(engine.load_catalog(&Broken), 0);
    }

    #[test]
    fn reset_returns_to_no_track() {
        let mut engine = engine_with(&["a", "b"]);
        engine.play_track(&track("a", 180));
        engine.reset();

        assert!(engine.current_track().is_none());
        assert!(!engine.is_playing());
        assert_eq!(engine.queue().len(), 2);
        assert_eq!(engine.queue().cursor(), None);
    }
}

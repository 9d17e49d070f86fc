//! Shared helpers for integration tests

#![allow(dead_code)]

use aria_core::{ManualClock, Track};
use aria_playback::{
    AudioResource, EngineConfig, EventDisposition, Generation, PlaybackEngine, ResourceEvent,
    ResourceEventKind,
};
use std::sync::Arc;
use std::time::Duration;

/// Command received by [`FakeResource`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String, Generation),
    Play(Generation),
    Pause,
    Seek(Duration),
    Volume(f32),
    Muted(bool),
}

/// Audio resource that records commands and never completes on its own
#[derive(Debug, Default)]
pub struct FakeResource {
    pub commands: Vec<Command>,
    pub position: Option<Duration>,
}

impl FakeResource {
    pub fn plays(&self) -> Vec<&Generation> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Play(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<&Generation> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Load(_, g) => Some(g),
                _ => None,
            })
            .collect()
    }
}

impl AudioResource for FakeResource {
    fn load(&mut self, url: &str, generation: &Generation) {
        self.commands
            .push(Command::Load(url.to_string(), generation.clone()));
    }

    fn play(&mut self, generation: &Generation) {
        self.commands.push(Command::Play(generation.clone()));
    }

    fn pause(&mut self) {
        self.commands.push(Command::Pause);
    }

    fn seek(&mut self, position: Duration) {
        self.position = Some(position);
        self.commands.push(Command::Seek(position));
    }

    fn set_volume(&mut self, level: f32) {
        self.commands.push(Command::Volume(level));
    }

    fn set_muted(&mut self, muted: bool) {
        self.commands.push(Command::Muted(muted));
    }

    fn current_time(&self) -> Option<Duration> {
        self.position
    }
}

/// Route engine logs to the test harness; set `RUST_LOG=aria_playback=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn create_test_track(id: &str, secs: u64) -> Track {
    Track::new(id, format!("Track {}", id), format!("/music/{}.mp3", id))
        .with_artist("Test Artist")
        .with_album("Test Album")
        .with_duration(Duration::from_secs(secs))
}

pub fn seeded_config() -> EngineConfig {
    EngineConfig {
        shuffle_seed: Some(7),
        ..EngineConfig::default()
    }
}

/// Engine over a fresh queue of 180 s tracks
pub fn engine_with(ids: &[&str]) -> (PlaybackEngine<FakeResource>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let mut engine =
        PlaybackEngine::new(FakeResource::default(), seeded_config()).with_clock(clock.clone());
    engine.set_queue(ids.iter().map(|id| create_test_track(id, 180)).collect(), false);
    engine.drain_events();
    (engine, clock)
}

/// Live generation; panics when nothing is loaded
pub fn live(engine: &PlaybackEngine<FakeResource>) -> Generation {
    engine
        .generation()
        .cloned()
        .expect("a generation should be live")
}

/// Deliver `kind` tagged with `generation`
pub fn deliver(
    engine: &mut PlaybackEngine<FakeResource>,
    generation: &Generation,
    kind: ResourceEventKind,
) -> EventDisposition {
    engine.handle_resource_event(ResourceEvent::new(generation.clone(), kind))
}

pub fn current_id(engine: &PlaybackEngine<FakeResource>) -> Option<String> {
    engine.current_track().map(|t| t.id.to_string())
}

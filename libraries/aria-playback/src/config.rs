//! Engine configuration
use crate::control_surface::DEFAULT_ARTWORK_SIZES;
use crate::error::{PlaybackError, Result};
use crate::types::RepeatMode;
use crate::volume::DEFAULT_VOLUME;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Playback engine settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Initial volume level (0.0-1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Initial repeat mode
    #[serde(default)]
    pub repeat: RepeatMode,

    /// Initial shuffle flag
    #[serde(default)]
    pub shuffle: bool,

    /// Delay before the single automatic reload after a resource error
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Recommended cadence for [`crate::PlaybackEngine::poll`]
    #[serde(default = "default_position_poll_interval_ms")]
    pub position_poll_interval_ms: u64,

    /// Offset for relative control-surface seeks without an explicit offset
    #[serde(default = "default_seek_offset_secs")]
    pub default_seek_offset_secs: u64,

    /// Artwork sizes advertised to the control surface
    #[serde(default = "default_artwork_sizes")]
    pub artwork_sizes: Vec<u32>,

    /// Fixed RNG seed for shuffle (reproducible order); entropy when unset
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl EngineConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Variables prefixed with `ARIA_` (e.g. `ARIA_VOLUME=0.5`,
    /// `ARIA_REPEAT=all`, `ARIA_ARTWORK_SIZES=96,512`) override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix("ARIA"))
    }

    /// Load with an explicit environment source
    pub fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        // Load from config file if it exists
        if let Some(path) = path.filter(|p| p.exists()) {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            env.try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("artwork_sizes"),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::Config(format!(
                "volume must be within 0.0-1.0, got {}",
                self.volume
            )));
        }

        if self.position_poll_interval_ms == 0 {
            return Err(PlaybackError::Config(
                "position_poll_interval_ms must be positive".to_string(),
            ));
        }

        if self.artwork_sizes.contains(&0) {
            return Err(PlaybackError::Config(
                "artwork sizes must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn position_poll_interval(&self) -> Duration {
        Duration::from_millis(self.position_poll_interval_ms)
    }

    pub fn default_seek_offset(&self) -> Duration {
        Duration::from_secs(self.default_seek_offset_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            repeat: RepeatMode::Off,
            shuffle: false,
            retry_delay_ms: default_retry_delay_ms(),
            position_poll_interval_ms: default_position_poll_interval_ms(),
            default_seek_offset_secs: default_seek_offset_secs(),
            artwork_sizes: default_artwork_sizes(),
            shuffle_seed: None,
        }
    }
}

// Default values
fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_position_poll_interval_ms() -> u64 {
    100
}

fn default_seek_offset_secs() -> u64 {
    10
}

fn default_artwork_sizes() -> Vec<u32> {
    DEFAULT_ARTWORK_SIZES.to_vec()
}

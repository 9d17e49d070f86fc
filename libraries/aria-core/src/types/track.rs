//! Track record as supplied by the catalog
use super::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable track record
///
/// Field names follow the catalog JSON document (`cover`, `audioUrl`,
/// `duration` in seconds) so a catalog file deserializes directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique, stable identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    #[serde(default)]
    pub album: String,

    /// Declared duration
    #[serde(with = "duration_secs")]
    pub duration: Duration,

    /// Artwork locator
    #[serde(rename = "cover", default)]
    pub artwork: String,

    /// Opaque audio resource locator
    pub audio_url: String,

    /// Genre (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    /// Release year (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

impl Track {
    /// Create a track with empty metadata and zero duration
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, audio_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: String::new(),
            album: String::new(),
            duration: Duration::ZERO,
            artwork: String::new(),
            audio_url: audio_url.into(),
            genre: None,
            year: None,
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = album.into();
        self
    }

    /// Set the declared duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the artwork locator
    #[must_use]
    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = artwork.into();
        self
    }

    /// Clamp a position into `[0, duration]`
    pub fn clamp_position(&self, position: Duration) -> Duration {
        position.min(self.duration)
    }
}

/// Convert fractional seconds to a `Duration`
///
/// Returns `None` for negative, non-finite or unrepresentably large values.
pub fn duration_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// Serde adapter: `Duration` as fractional seconds
mod duration_secs {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        super::duration_from_secs(secs)
            .ok_or_else(|| D::Error::custom(format!("invalid duration: {secs}")))
    }
}

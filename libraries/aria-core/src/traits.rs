//! Collaborator traits for Aria
use crate::error::{AriaError, Result};
use crate::types::{Track, TrackId};

/// Catalog provider
///
/// Supplies the ordered list of playable tracks. The player only consumes the
/// list; it never fetches or parses it itself. Consumers treat an error the
/// same as an empty catalog.
pub trait CatalogProvider {
    /// Read the full track list, in catalog order
    ///
    /// # Errors
    /// Returns an error if the catalog cannot be read
    fn tracks(&self) -> Result<Vec<Track>>;
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tracks: Vec<Track>,
}

impl StaticCatalog {
    /// Create a catalog over an existing track list
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

impl CatalogProvider for StaticCatalog {
    fn tracks(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }
}

/// Catalog backed by a JSON array document (the `songs.json` shape)
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    document: String,
}

impl JsonCatalog {
    /// Wrap a JSON document
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl CatalogProvider for JsonCatalog {
    fn tracks(&self) -> Result<Vec<Track>> {
        let value: serde_json::Value = serde_json::from_str(&self.document)?;
        if !value.is_array() {
            return Err(AriaError::catalog("catalog document is not an array"));
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Persistence/statistics sink
///
/// Fire-and-forget notifications. Callers never block on, retry, or surface
/// failures from these; a failed recording is invisible to playback.
pub trait StatsRecorder: Send + Sync {
    /// A track started through an explicit play request
    ///
    /// # Errors
    /// Returns an error if the play could not be recorded
    fn record_play(&self, track_id: &TrackId) -> Result<()>;

    /// The user liked or unliked a track
    ///
    /// # Errors
    /// Returns an error if the like could not be recorded
    fn record_like(&self, track_id: &TrackId, liked: bool) -> Result<()>;

    /// A new visit (session) started
    ///
    /// # Errors
    /// Returns an error if the visit could not be recorded
    fn record_visit(&self) -> Result<()>;
}

/// Stats sink that records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStats;

impl StatsRecorder for NoopStats {
    fn record_play(&self, _track_id: &TrackId) -> Result<()> {
        Ok(())
    }

    fn record_like(&self, _track_id: &TrackId, _liked: bool) -> Result<()> {
        Ok(())
    }

    fn record_visit(&self) -> Result<()> {
        Ok(())
    }
}

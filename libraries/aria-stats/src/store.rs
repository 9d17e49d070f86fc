//! Key-value persistence seam
//!
//! Statistics are stored as JSON documents under a handful of fixed keys,
//! the same shape a browser keeps in `localStorage`. Hosts plug in their own
//! [`KeyValueStore`]; [`MemoryStore`] and [`FileStore`] cover tests and
//! desktop use.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Result, StatsError};

/// Per-song statistics document
pub const SONG_STATS_KEY: &str = "music_song_stats";

/// Site-wide statistics document
pub const SITE_STATS_KEY: &str = "music_site_stats";

/// Liked track ids document
pub const USER_LIKES_KEY: &str = "music_user_likes";

/// String key-value store
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    ///
    /// # Errors
    /// Returns an error if the store cannot be read
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    ///
    /// # Errors
    /// Returns an error if the store cannot be written
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StatsError::store("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StatsError::store("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StatsError::store(format!("invalid store key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(path, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(SONG_STATS_KEY).unwrap(), None);

        store.set(SONG_STATS_KEY, "{}").unwrap();
        store.set(SONG_STATS_KEY, r#"{"a":{}}"#).unwrap();
        assert_eq!(
            store.get(SONG_STATS_KEY).unwrap().as_deref(),
            Some(r#"{"a":{}}"#)
        );
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("stats"));

        assert_eq!(store.get(USER_LIKES_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_creates_directory_on_write() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("stats"));

        store.set(USER_LIKES_KEY, r#"["a"]"#).unwrap();

        assert!(store.dir().join("music_user_likes.json").exists());
        assert_eq!(
            store.get(USER_LIKES_KEY).unwrap().as_deref(),
            Some(r#"["a"]"#)
        );
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());

        assert!(matches!(store.set("../escape", "x"), Err(StatsError::Store(_))));
        assert!(matches!(store.get(""), Err(StatsError::Store(_))));
    }
}

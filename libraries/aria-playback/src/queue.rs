//! Queue manager
//!
//! An ordered, duplicate-free sequence of tracks plus a cursor:
//!
//! ```text
//!   tracks:  [ A ][ B ][ C ][ D ]
//!   cursor:         ^
//!                   current track (None = nothing selected)
//! ```
//!
//! Navigation is non-destructive: advancing only moves the cursor.

use crate::error::{PlaybackError, Result};
use crate::shuffle::pick_next_index;
use crate::types::{Direction, RepeatMode};
use aria_core::{Track, TrackId};
use rand::Rng;
use std::collections::HashSet;

/// Result of a successful advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Cursor moved to this index
    Moved(usize),

    /// Cursor did not move (previous at the start, or nothing to shuffle to)
    Stayed,
}

/// Playback queue with cursor
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Tracks in play order, unique by id
    tracks: Vec<Track>,

    /// Index of the current track
    cursor: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sequence
    ///
    /// Duplicate ids are dropped (first occurrence wins). With
    /// `preserve_current`, the cursor follows the current track into the new
    /// sequence when it is still present; otherwise it lands on the first
    /// track, or nowhere when the new sequence is empty.
    pub fn set_queue(&mut self, tracks: Vec<Track>, preserve_current: bool) {
        let current_id = self.current().map(|t| t.id.clone());

        let mut seen = HashSet::with_capacity(tracks.len());
        self.tracks = tracks
            .into_iter()
            .filter(|t| seen.insert(t.id.clone()))
            .collect();

        let preserved = if preserve_current {
            current_id.and_then(|id| self.position_of(&id))
        } else {
            None
        };

        self.cursor = preserved.or(if self.tracks.is_empty() { None } else { Some(0) });
    }

    /// Move the cursor to the track with `id`
    pub fn select(&mut self, id: &TrackId) -> Result<&Track> {
        let index = self
            .position_of(id)
            .ok_or_else(|| PlaybackError::NotFound(id.clone()))?;
        self.cursor = Some(index);
        Ok(&self.tracks[index])
    }

    /// Advance the cursor
    ///
    /// - Linear next wraps to the start only with repeat-all, otherwise
    ///   reports [`PlaybackError::QueueExhausted`] and leaves the cursor alone.
    /// - Linear previous wraps to the end only with repeat-all, otherwise stays
    ///   on the first track.
    /// - Shuffled next draws uniformly from every other track; with one track
    ///   or fewer it stays.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        shuffle: bool,
        repeat: RepeatMode,
        rng: &mut R,
    ) -> Result<AdvanceOutcome> {
        if self.tracks.is_empty() {
            return Ok(AdvanceOutcome::Stayed);
        }

        let len = self.tracks.len();

        let target = match direction {
            Direction::Next if shuffle => pick_next_index(len, self.cursor, rng),
            Direction::Next => {
                let next = self.cursor.map_or(0, |c| c + 1);
                if next < len {
                    Some(next)
                } else if repeat == RepeatMode::All {
                    Some(0)
                } else {
                    return Err(PlaybackError::QueueExhausted);
                }
            }
            Direction::Previous => match self.cursor {
                Some(c) if c > 0 => Some(c - 1),
                Some(_) if repeat == RepeatMode::All => Some(len - 1),
                Some(_) => None,
                // Nothing selected: stepping back lands on the last track
                None => Some(len - 1),
            },
        };

        Ok(match target {
            Some(index) => {
                self.cursor = Some(index);
                AdvanceOutcome::Moved(index)
            }
            None => AdvanceOutcome::Stayed,
        })
    }

    /// Append a track unless its id is already queued
    ///
    /// Returns whether the track was added.
    pub fn add_unique(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Clear the cursor (nothing selected)
    pub fn deselect(&mut self) {
        self.cursor = None;
    }

    /// Remove every track
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// Track under the cursor
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    /// Cursor index
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Track at index
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index of the track with `id`
    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Whether a track with `id` is queued
    pub fn contains(&self, id: &TrackId) -> bool {
        self.position_of(id).is_some()
    }

    /// All tracks in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of queued tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

//! Volume control
//!
//! Linear level in `[0, 1]` as understood by media elements, plus a mute flag.
//! Setting the level to zero mutes; raising it again does not unmute; only
//! an explicit toggle clears mute.

/// Default level for a fresh player
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Volume controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Volume level (0.0-1.0)
    level: f32,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial level, clamped to `[0, 1]`
    pub fn new(level: f32) -> Self {
        let mut volume = Self {
            level: DEFAULT_VOLUME,
            muted: false,
        };
        volume.set_level(level);
        volume
    }

    /// Set volume level
    ///
    /// Non-finite input is ignored. A level of zero also mutes.
    pub fn set_level(&mut self, level: f32) {
        if !level.is_finite() {
            return;
        }
        self.level = level.clamp(0.0, 1.0);
        if self.level == 0.0 {
            self.muted = true;
        }
    }

    /// Get current volume level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level to hand to the audio resource
    ///
    /// Returns 0.0 if muted, otherwise the stored level
    pub fn effective_level(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    #[serde(rename = "none")]
    Off,

    /// Loop entire queue
    #[serde(rename = "all")]
    All,

    /// Loop current track only
    #[serde(rename = "one")]
    One,
}

impl RepeatMode {
    /// Next mode in the cycle `none -> all -> one -> none`
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    /// String representation used by the UI layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "none",
            Self::All => "all",
            Self::One => "one",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" | "off" => Some(Self::Off),
            "all" => Some(Self::All),
            "one" => Some(Self::One),
            _ => None,
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a queue advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Towards the end of the queue
    Next,

    /// Towards the start of the queue
    Previous,
}

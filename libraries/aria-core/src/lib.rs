//! Aria Core
//!
//! Platform-agnostic domain types and collaborator traits shared by the
//! playback engine and the statistics service.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`
//! - **Collaborator Traits**: `CatalogProvider`, `StatsRecorder`, `Clock`
//! - **Error Handling**: Unified `AriaError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use aria_core::{CatalogProvider, JsonCatalog};
//!
//! let catalog = JsonCatalog::new(
//!     r#"[{"id":"1","title":"Intro","artist":"Band","album":"First",
//!         "duration":180,"cover":"/covers/1.png","audioUrl":"/music/1.mp3"}]"#,
//! );
//!
//! let tracks = catalog.tracks().unwrap();
//! assert_eq!(tracks[0].title, "Intro");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AriaError, Result};
pub use traits::{CatalogProvider, JsonCatalog, NoopStats, StaticCatalog, StatsRecorder};
pub use types::{duration_from_secs, Track, TrackId};

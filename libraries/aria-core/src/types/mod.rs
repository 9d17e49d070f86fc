mod ids;
mod track;

pub use ids::TrackId;
pub use track::{duration_from_secs, Track};

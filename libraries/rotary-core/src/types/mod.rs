//! Domain types shared across Rotary Player crates

mod ids;
mod media;
mod track;

pub use ids::TrackPath;
pub use media::{AudioQuality, ImageQuality, Lyrics, MediaPayload, TrackFilters};
pub use track::Track;

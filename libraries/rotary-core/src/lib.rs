//! Rotary Player Core
//!
//! Platform-agnostic types, collaborator traits and error handling shared by
//! the Rotary Player crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackPath`, media payloads and quality profiles
//! - **Collaborator Traits**: `TrackFetcher`, `PlaybackReporter`
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use rotary_core::types::{Track, TrackPath};
//!
//! let track = Track::new("Rock/Artist - Song.ogg", "Rock", 215);
//! assert_eq!(track.display_title(), "Artist - Song");
//! assert_eq!(track.path, TrackPath::new("Rock/Artist - Song.ogg"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CoreError, Result};
pub use traits::{PlaybackReporter, TrackFetcher};
pub use types::{
    AudioQuality, ImageQuality, Lyrics, MediaPayload, Track, TrackFilters, TrackPath,
};

//! Rotary Player - Playback Queue
//!
//! Platform-agnostic queue management for Rotary Player.
//!
//! This crate provides:
//! - Two-tier play queue (manual + automatic)
//! - Background prefetch that keeps the automatic queue at a target depth
//! - Playlist rotation with removal overrides
//! - Bounded history with back navigation
//! - Explicit release of fetched media (object URLs)
//! - Scrobble timer and now-playing reporting
//!
//! # Architecture
//!
//! `rotary-playback` never talks to the network itself. Tracks and media
//! come from a [`TrackFetcher`](rotary_core::TrackFetcher) and listening
//! activity goes to a [`PlaybackReporter`](rotary_core::PlaybackReporter),
//! so the scheduler runs unchanged against the HTTP client or a test double.
//!
//! # Example
//!
//! ```rust,no_run
//! use rotary_playback::{QueueScheduler, QueueSettings, QueueEvent};
//! # use std::sync::Arc;
//! # async fn run(fetcher: Arc<dyn rotary_core::TrackFetcher>) {
//! let scheduler = QueueScheduler::new(fetcher, QueueSettings::default());
//! scheduler.set_enabled_playlists(vec!["Rock".to_string(), "Jazz".to_string()]);
//!
//! let mut events = scheduler.subscribe();
//! scheduler.start();
//!
//! while let Ok(event) = events.recv().await {
//!     if let QueueEvent::QueueChanged { automatic, .. } = event {
//!         if automatic > 0 {
//!             scheduler.advance();
//!             break;
//!         }
//!     }
//! }
//! # }
//! ```

mod error;
pub mod events;
mod fetch;
mod history;
mod queue;
pub mod resources;
mod rotation;
mod scheduler;
pub mod scrobble;
pub mod types;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::{EntrySummary, QueueEvent, QueueSnapshot};
pub use fetch::{fetch_bundle, fetch_from_playlist};
pub use history::{History, DEFAULT_HISTORY_SIZE};
pub use queue::{Queue, Tier};
pub use resources::{BlobStore, EntryId, MediaHandle, ResourceBundle, INFO_UNAVAILABLE};
pub use rotation::{next_playlist, PlaylistRotation, Selection};
pub use scheduler::QueueScheduler;
pub use scrobble::{
    PlaybackTransport, PlayedReport, ScrobbleService, ScrobbleSettings, ScrobbleTimer,
};
pub use types::{AdvanceOutcome, FillPhase, QueueSettings, RemovalPolicy, SchedulerTimings};

/// Collaborator traits implemented by platform code
///
/// The playback scheduler only talks to the backend through these traits,
/// so it can run against the HTTP client, an in-memory library, or a test
/// double.
use crate::error::Result;
use crate::types::{AudioQuality, ImageQuality, Lyrics, MediaPayload, Track, TrackFilters, TrackPath};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Retrieves tracks and their media from the backend
#[async_trait]
pub trait TrackFetcher: Send + Sync {
    /// Ask the backend for a random track from `playlist`
    ///
    /// # Errors
    /// Returns `CoreError::EmptyPlaylist` when nothing matches the filters
    async fn choose_random_track(&self, playlist: &str, filters: &TrackFilters) -> Result<TrackPath>;

    /// Fetch track metadata
    async fn fetch_track(&self, path: &TrackPath) -> Result<Track>;

    /// Fetch the audio, either as bytes or as a stream URL
    async fn fetch_audio(&self, path: &TrackPath, quality: AudioQuality) -> Result<MediaPayload>;

    /// Fetch the cover image
    async fn fetch_cover(
        &self,
        path: &TrackPath,
        quality: ImageQuality,
        meme: bool,
    ) -> Result<MediaPayload>;

    /// Fetch lyrics; `Ok(None)` when the track has none
    async fn fetch_lyrics(&self, path: &TrackPath) -> Result<Option<Lyrics>>;
}

/// Receives listening activity
#[async_trait]
pub trait PlaybackReporter: Send + Sync {
    /// Presence signal; may be sent redundantly
    async fn report_now_playing(&self, path: &TrackPath, paused: bool, position_percent: f32) -> Result<()>;

    /// The track counts as played; `started_at` is when playback began
    async fn report_played(&self, path: &TrackPath, started_at: DateTime<Utc>) -> Result<()>;
}

//! Track resource fetching
//!
//! Builds a [`ResourceBundle`] from the collaborator fetch operations.
//! Payloads are registered in the blob store only once every required
//! fetch succeeded, so a failed fetch never leaves buffered bytes behind.

use crate::error::Result;
use crate::resources::{BlobStore, ResourceBundle};
use crate::types::QueueSettings;
use rotary_core::{TrackFetcher, TrackPath};
use tracing::{debug, warn};

/// Fetch metadata, audio, cover and lyrics for `path`
///
/// Lyrics are best effort: a failed lyrics fetch yields a bundle without
/// lyrics rather than an error.
pub async fn fetch_bundle(
    fetcher: &dyn TrackFetcher,
    store: &BlobStore,
    path: &TrackPath,
    settings: &QueueSettings,
) -> Result<ResourceBundle> {
    debug!(path = %path, "Fetching track resources");

    let (track, audio, cover, lyrics) = tokio::join!(
        fetcher.fetch_track(path),
        fetcher.fetch_audio(path, settings.audio_quality),
        fetcher.fetch_cover(path, settings.image_quality, settings.meme_covers),
        fetcher.fetch_lyrics(path),
    );

    let track = track?;
    let audio = audio?;
    let cover = cover?;
    let lyrics = lyrics.unwrap_or_else(|e| {
        warn!(path = %path, error = %e, "Lyrics unavailable");
        None
    });

    let bundle = ResourceBundle::new(track, store.register(audio), store.register(cover), lyrics);
    debug!(
        path = %path,
        entry = %bundle.id(),
        has_lyrics = bundle.lyrics().is_some(),
        "Track resources ready"
    );
    Ok(bundle)
}

/// Ask the backend for a random track from `playlist` and fetch it
pub async fn fetch_from_playlist(
    fetcher: &dyn TrackFetcher,
    store: &BlobStore,
    playlist: &str,
    settings: &QueueSettings,
) -> Result<ResourceBundle> {
    let path = fetcher
        .choose_random_track(playlist, &settings.filters)
        .await?;
    debug!(playlist = %playlist, path = %path, "Chose track");
    fetch_bundle(fetcher, store, &path, settings).await
}

//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use rotary_core::{
    AudioQuality, CoreError, ImageQuality, Lyrics, MediaPayload, Result, Track, TrackFilters,
    TrackPath,
};
use rotary_playback::{BlobStore, MediaHandle, QueueScheduler, QueueSettings, ResourceBundle, SchedulerTimings};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const AUDIO_LEN: usize = 64;
pub const COVER_LEN: usize = 16;

/// In-memory backend that invents tracks on demand
///
/// Paths look like `{playlist}/track-{n}.ogg` with a global counter, so
/// every choice yields a distinct track.
#[derive(Default)]
pub struct FakeFetcher {
    counter: AtomicUsize,
    chosen: Mutex<Vec<String>>,
    empty_playlists: Mutex<HashSet<String>>,
    failing_fetches: AtomicUsize,
    delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        let fetcher = Self::default();
        *fetcher.delay.lock().unwrap() = delay;
        Arc::new(fetcher)
    }

    /// Playlists asked for, in order
    pub fn chosen(&self) -> Vec<String> {
        self.chosen.lock().unwrap().clone()
    }

    pub fn choose_calls(&self) -> usize {
        self.chosen.lock().unwrap().len()
    }

    /// Highest number of concurrent `choose_random_track` calls seen
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Make the next `count` metadata fetches fail
    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    /// Make a playlist answer with "no eligible track"
    pub fn mark_empty(&self, playlist: &str) {
        self.empty_playlists
            .lock()
            .unwrap()
            .insert(playlist.to_string());
    }

    fn playlist_of(path: &TrackPath) -> String {
        path.as_str()
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl rotary_core::TrackFetcher for FakeFetcher {
    async fn choose_random_track(&self, playlist: &str, _filters: &TrackFilters) -> Result<TrackPath> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _in_flight = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.chosen.lock().unwrap().push(playlist.to_string());
        if self.empty_playlists.lock().unwrap().contains(playlist) {
            return Err(CoreError::EmptyPlaylist(playlist.to_string()));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(TrackPath::new(format!("{playlist}/track-{n}.ogg")))
    }

    async fn fetch_track(&self, path: &TrackPath) -> Result<Track> {
        let failing = self
            .failing_fetches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CoreError::network("connection reset"));
        }

        let mut track = Track::new(path.clone(), Self::playlist_of(path), 180);
        track.title = Some(path.file_stem().replace('-', " "));
        track.artists = vec!["Test Artist".to_string()];
        Ok(track)
    }

    async fn fetch_audio(&self, _path: &TrackPath, _quality: AudioQuality) -> Result<MediaPayload> {
        Ok(MediaPayload::bytes(vec![0u8; AUDIO_LEN], "audio/ogg"))
    }

    async fn fetch_cover(
        &self,
        _path: &TrackPath,
        _quality: ImageQuality,
        _meme: bool,
    ) -> Result<MediaPayload> {
        Ok(MediaPayload::bytes(vec![0u8; COVER_LEN], "image/webp"))
    }

    async fn fetch_lyrics(&self, _path: &TrackPath) -> Result<Option<Lyrics>> {
        Ok(None)
    }
}

/// Timings matching the defaults, spelled out for readability in tests
pub fn timings() -> SchedulerTimings {
    SchedulerTimings {
        selection_retry: Duration::from_millis(500),
        failure_retry: Duration::from_secs(5),
        advance_retry: Duration::from_secs(1),
    }
}

pub fn create_scheduler(
    fetcher: Arc<FakeFetcher>,
    target_depth: usize,
    playlists: &[&str],
) -> QueueScheduler {
    let settings = QueueSettings {
        target_depth,
        ..QueueSettings::default()
    };
    let scheduler = QueueScheduler::with_parts(fetcher, BlobStore::new(), settings, timings());
    scheduler.set_enabled_playlists(playlists.iter().map(|p| (*p).to_string()).collect());
    scheduler
}

/// Bundle for a hand-picked track, registered in `store`
pub fn create_manual_entry(store: &BlobStore, title: &str) -> ResourceBundle {
    let mut track = Track::new(format!("Manual/{title}.ogg"), "Manual", 200);
    track.title = Some(title.to_string());
    ResourceBundle::new(
        track,
        store.register(MediaPayload::bytes(vec![1u8; AUDIO_LEN], "audio/ogg")),
        store.register(MediaPayload::bytes(vec![1u8; COVER_LEN], "image/webp")),
        None,
    )
}

pub fn create_virtual_entry(store: &BlobStore) -> ResourceBundle {
    ResourceBundle::virtual_entry(
        store.register(MediaPayload::bytes(vec![2u8; AUDIO_LEN], "audio/ogg")),
        MediaHandle::Url {
            url: "https://radio.example/news.webp".to_string(),
        },
    )
}

/// Poll `condition` (letting the paused clock run) until it holds
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 10s");
}

/// Wait until the automatic queue holds at least `depth` entries
pub async fn wait_for_depth(scheduler: &QueueScheduler, depth: usize) {
    wait_for(|| scheduler.snapshot().automatic.len() >= depth).await;
}

/// Run `future` with a deadline so a hung test fails instead of blocking
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(60), future)
        .await
        .expect("timed out")
}

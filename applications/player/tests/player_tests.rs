//! Playback loop tests against an in-memory backend

use async_trait::async_trait;
use rotary_core::{
    AudioQuality, CoreError, ImageQuality, Lyrics, MediaPayload, Result, Track, TrackFetcher,
    TrackFilters, TrackPath,
};
use rotary_playback::{QueueScheduler, QueueSettings};
use rotary_player::{run_player, SimulatedTransport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Every track lasts `track_length` seconds
struct ShortTracks {
    track_length: u32,
    counter: AtomicUsize,
}

impl ShortTracks {
    fn new(track_length: u32) -> Arc<Self> {
        Arc::new(Self {
            track_length,
            counter: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TrackFetcher for ShortTracks {
    async fn choose_random_track(&self, playlist: &str, _filters: &TrackFilters) -> Result<TrackPath> {
        if playlist == "Empty" {
            return Err(CoreError::EmptyPlaylist(playlist.to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(TrackPath::new(format!("{playlist}/track-{n}.ogg")))
    }

    async fn fetch_track(&self, path: &TrackPath) -> Result<Track> {
        let playlist = path.as_str().split('/').next().unwrap_or_default();
        Ok(Track::new(path.clone(), playlist, self.track_length))
    }

    async fn fetch_audio(&self, _path: &TrackPath, _quality: AudioQuality) -> Result<MediaPayload> {
        Ok(MediaPayload::bytes(vec![0u8; 8], "audio/ogg"))
    }

    async fn fetch_cover(
        &self,
        _path: &TrackPath,
        _quality: ImageQuality,
        _meme: bool,
    ) -> Result<MediaPayload> {
        Ok(MediaPayload::Url("https://music.example.com/cover.webp".to_string()))
    }

    async fn fetch_lyrics(&self, _path: &TrackPath) -> Result<Option<Lyrics>> {
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn test_player_advances_at_end_of_track() {
    let scheduler = QueueScheduler::new(ShortTracks::new(10), QueueSettings::default());
    scheduler.set_enabled_playlists(vec!["Rock".to_string(), "Jazz".to_string()]);
    scheduler.start();
    let transport = SimulatedTransport::new();

    let started = run_player(
        &scheduler,
        &transport,
        tokio::time::sleep(Duration::from_secs(35)),
    )
    .await;

    // The queue is empty at first, so tracks start at 1 s, 11 s, 21 s and 31 s
    assert_eq!(started, 4);
    let snapshot = scheduler.snapshot();
    assert_eq!(snapshot.history.len(), 3);
    assert!(snapshot.current.is_some());
    assert_eq!(snapshot.automatic.len(), 3);

    let playlists: Vec<String> = snapshot
        .history
        .iter()
        .filter_map(|entry| entry.track.as_ref().map(|t| t.playlist.clone()))
        .collect();
    assert!(playlists.windows(2).all(|pair| pair[0] != pair[1]));
}

#[tokio::test(start_paused = true)]
async fn test_paused_transport_holds_the_queue() {
    let scheduler = QueueScheduler::new(ShortTracks::new(10), QueueSettings::default());
    scheduler.set_enabled_playlists(vec!["Rock".to_string()]);
    scheduler.start();
    let transport = Arc::new(SimulatedTransport::new());

    let pauser = {
        let transport = transport.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            transport.pause();
        })
    };

    let started = run_player(
        &scheduler,
        &transport,
        tokio::time::sleep(Duration::from_secs(60)),
    )
    .await;
    pauser.await.unwrap();

    assert_eq!(started, 1);
    assert!(scheduler.snapshot().history.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_player_waits_while_nothing_can_be_queued() {
    let scheduler = QueueScheduler::new(ShortTracks::new(10), QueueSettings::default());
    scheduler.set_enabled_playlists(vec!["Empty".to_string()]);
    scheduler.start();
    let transport = SimulatedTransport::new();

    let started = run_player(
        &scheduler,
        &transport,
        tokio::time::sleep(Duration::from_secs(12)),
    )
    .await;

    assert_eq!(started, 0);
    assert!(!transport.is_loaded());
    assert!(scheduler.snapshot().is_starved());
}

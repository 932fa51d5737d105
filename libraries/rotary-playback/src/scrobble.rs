//! Scrobble timer and now-playing reporting
//!
//! A track counts as played once it has been *playing* (not paused) for
//! longer than `min(240 s, round(duration / 2))`. The timer resets on every
//! track change and fires at most once per track. The played report
//! carries the time playback started, not the time the threshold was
//! crossed.
//!
//! Now-playing reports are a separate presence signal without a threshold:
//! frequent while playing, rare while paused.

use crate::events::QueueEvent;
use chrono::{DateTime, Utc};
use rotary_core::{PlaybackReporter, Track, TrackPath};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Upper bound on the listening time required for a scrobble
pub const SCROBBLE_CEILING_SECS: u32 = 240;

/// Listening time required before `track` counts as played
pub fn required_seconds(track: &Track) -> u32 {
    // Durations are whole seconds, so ceil(d / 2) equals round(d / 2)
    // with halves rounded up
    SCROBBLE_CEILING_SECS.min(track.duration.div_ceil(2))
}

/// Report emitted when a track crosses the scrobble threshold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedReport {
    pub path: TrackPath,
    /// When playback of the track started
    pub started_at: DateTime<Utc>,
}

/// Timer state for the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrobblePhase {
    /// Nothing playing (or a virtual entry)
    Disabled,
    /// Reset, no playing time yet
    Fresh,
    /// Counting playing time
    Accumulating,
    /// Played report already emitted
    Scrobbled,
}

/// Per-track scrobble timer
#[derive(Debug, Clone)]
pub struct ScrobbleTimer {
    path: Option<TrackPath>,
    required: Option<Duration>,
    playing: Duration,
    has_scrobbled: bool,
    started_at: DateTime<Utc>,
}

impl Default for ScrobbleTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrobbleTimer {
    /// Create a disabled timer
    pub fn new() -> Self {
        Self {
            path: None,
            required: None,
            playing: Duration::ZERO,
            has_scrobbled: false,
            started_at: Utc::now(),
        }
    }

    /// Start timing a new track; `None` disables the timer
    pub fn reset(&mut self, track: Option<&Track>, now: DateTime<Utc>) {
        self.path = track.map(|t| t.path.clone());
        self.required = track.map(|t| Duration::from_secs(u64::from(required_seconds(t))));
        self.playing = Duration::ZERO;
        self.has_scrobbled = false;
        self.started_at = now;
    }

    /// Account for one tick
    ///
    /// Paused ticks add nothing. Returns the played report the first time
    /// the accumulated playing time exceeds the threshold.
    pub fn tick(&mut self, paused: bool, interval: Duration) -> Option<PlayedReport> {
        let required = self.required?;
        if paused {
            return None;
        }

        self.playing += interval;
        if self.has_scrobbled || self.playing <= required {
            return None;
        }

        self.has_scrobbled = true;
        self.path.clone().map(|path| PlayedReport {
            path,
            started_at: self.started_at,
        })
    }

    pub fn phase(&self) -> ScrobblePhase {
        if self.required.is_none() {
            ScrobblePhase::Disabled
        } else if self.has_scrobbled {
            ScrobblePhase::Scrobbled
        } else if self.playing.is_zero() {
            ScrobblePhase::Fresh
        } else {
            ScrobblePhase::Accumulating
        }
    }

    pub fn path(&self) -> Option<&TrackPath> {
        self.path.as_ref()
    }

    pub fn playing_time(&self) -> Duration {
        self.playing
    }

    pub fn required_time(&self) -> Option<Duration> {
        self.required
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn has_scrobbled(&self) -> bool {
        self.has_scrobbled
    }
}

/// Decides when the next now-playing report is due
#[derive(Debug, Clone)]
pub struct NowPlayingCadence {
    playing_interval: Duration,
    paused_interval: Duration,
    last_sent: Option<Instant>,
}

impl NowPlayingCadence {
    pub fn new(playing_interval: Duration, paused_interval: Duration) -> Self {
        Self {
            playing_interval,
            paused_interval,
            last_sent: None,
        }
    }

    /// Forget the last report so the next check is due immediately
    pub fn reset(&mut self) {
        self.last_sent = None;
    }

    /// Whether a report is due at `now`
    pub fn is_due(&self, paused: bool, now: Instant) -> bool {
        let interval = if paused {
            self.paused_interval
        } else {
            self.playing_interval
        };
        self.last_sent
            .map_or(true, |last| now.saturating_duration_since(last) >= interval)
    }

    pub fn mark_sent(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }
}

/// Read access to the audio transport
pub trait PlaybackTransport: Send + Sync {
    /// Whether playback is paused
    ///
    /// Also `true` when nothing is playing (stopped, or the track ended),
    /// so that time is not counted towards a scrobble.
    fn is_paused(&self) -> bool;

    /// Playback position as a fraction of the track (0.0 - 1.0)
    fn position_percent(&self) -> f32;
}

/// Timing of the scrobble service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrobbleSettings {
    /// Timer tick (default: 5 s)
    pub tick_interval: Duration,
    /// Now-playing interval while playing (default: 10 s)
    pub now_playing_interval: Duration,
    /// Now-playing interval while paused (default: 60 s)
    pub now_playing_paused_interval: Duration,
}

impl Default for ScrobbleSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(5),
            now_playing_interval: Duration::from_secs(10),
            now_playing_paused_interval: Duration::from_secs(60),
        }
    }
}

/// Drives a [`ScrobbleTimer`] from queue events and transport state
pub struct ScrobbleService {
    reporter: Arc<dyn PlaybackReporter>,
    transport: Arc<dyn PlaybackTransport>,
    settings: ScrobbleSettings,
}

impl ScrobbleService {
    pub fn new(
        reporter: Arc<dyn PlaybackReporter>,
        transport: Arc<dyn PlaybackTransport>,
        settings: ScrobbleSettings,
    ) -> Self {
        Self {
            reporter,
            transport,
            settings,
        }
    }

    /// Run until the event channel closes
    ///
    /// Reports are sent from spawned tasks so a slow backend never delays
    /// the timer.
    pub async fn run(self, mut events: broadcast::Receiver<QueueEvent>) {
        let mut timer = ScrobbleTimer::new();
        let mut cadence = NowPlayingCadence::new(
            self.settings.now_playing_interval,
            self.settings.now_playing_paused_interval,
        );
        let mut ticker = tokio::time::interval(self.settings.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.reset();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(QueueEvent::TrackChanged { current, .. }) => {
                        let track = current.and_then(|entry| entry.track);
                        timer.reset(track.as_ref(), Utc::now());
                        cadence.reset();
                        ticker.reset();
                        debug!(
                            path = ?timer.path().map(TrackPath::as_str),
                            required = ?timer.required_time(),
                            "Scrobble timer reset"
                        );
                        self.send_now_playing(&timer, &mut cadence);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Scrobble service lagged behind queue events");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = ticker.tick() => {
                    let paused = self.transport.is_paused();
                    if let Some(report) = timer.tick(paused, self.settings.tick_interval) {
                        self.send_played(report);
                    }
                    self.send_now_playing(&timer, &mut cadence);
                }
            }
        }

        debug!("Scrobble service stopped");
    }

    fn send_now_playing(&self, timer: &ScrobbleTimer, cadence: &mut NowPlayingCadence) {
        let Some(path) = timer.path().cloned() else {
            return;
        };
        let paused = self.transport.is_paused();
        let now = Instant::now();
        if !cadence.is_due(paused, now) {
            return;
        }
        cadence.mark_sent(now);

        let position = self.transport.position_percent();
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            if let Err(e) = reporter.report_now_playing(&path, paused, position).await {
                warn!(path = %path, error = %e, "Now playing report failed");
            }
        });
    }

    fn send_played(&self, report: PlayedReport) {
        info!(path = %report.path, started_at = %report.started_at, "Track played");
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            if let Err(e) = reporter.report_played(&report.path, report.started_at).await {
                warn!(path = %report.path, error = %e, "Played report failed");
            }
        });
    }
}

//! Simulated audio transport
//!
//! Stands in for an audio element: it "plays" a loaded track by letting the
//! clock run and reports the position, pause state and end of track.

use rotary_playback::PlaybackTransport;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct Clock {
    length: Option<Duration>,
    /// Play time accumulated before the current run
    elapsed: Duration,
    /// Start of the current run; `None` while paused or stopped
    resumed_at: Option<Instant>,
}

impl Clock {
    fn position(&self) -> Duration {
        let running = self
            .resumed_at
            .map_or(Duration::ZERO, |at| at.elapsed());
        let position = self.elapsed + running;
        self.length.map_or(position, |length| position.min(length))
    }

    fn is_finished(&self) -> bool {
        self.length.is_some_and(|length| self.position() >= length)
    }
}

/// Transport that advances with the (Tokio) clock
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    clock: Mutex<Clock>,
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Clock> {
        self.clock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load a track and start playing it from the beginning
    pub fn load(&self, length: Duration) {
        *self.lock() = Clock {
            length: Some(length),
            elapsed: Duration::ZERO,
            resumed_at: Some(Instant::now()),
        };
    }

    /// Unload the current track
    pub fn stop(&self) {
        *self.lock() = Clock::default();
    }

    pub fn pause(&self) {
        let mut clock = self.lock();
        if let Some(at) = clock.resumed_at.take() {
            clock.elapsed += at.elapsed();
        }
    }

    pub fn resume(&self) {
        let mut clock = self.lock();
        if clock.length.is_some() && clock.resumed_at.is_none() {
            clock.resumed_at = Some(Instant::now());
        }
    }

    pub fn position(&self) -> Duration {
        self.lock().position()
    }

    pub fn is_loaded(&self) -> bool {
        self.lock().length.is_some()
    }

    /// Whether the loaded track has played to its end
    pub fn is_finished(&self) -> bool {
        self.lock().is_finished()
    }
}

impl PlaybackTransport for SimulatedTransport {
    /// Stopped and finished tracks report as paused so their idle time
    /// never counts as playing time
    fn is_paused(&self) -> bool {
        let clock = self.lock();
        clock.resumed_at.is_none() || clock.is_finished()
    }

    #[allow(clippy::cast_precision_loss)]
    fn position_percent(&self) -> f32 {
        let clock = self.lock();
        match clock.length {
            Some(length) if !length.is_zero() => {
                (clock.position().as_secs_f64() / length.as_secs_f64()) as f32
            }
            _ => 0.0,
        }
    }
}

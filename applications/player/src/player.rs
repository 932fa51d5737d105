//! Playback loop
//!
//! Plays the queue on a [`SimulatedTransport`]: loads every new current
//! entry, and advances the queue when the transport reaches the end.

use crate::transport::SimulatedTransport;
use rotary_core::Track;
use rotary_playback::{AdvanceOutcome, QueueEvent, QueueScheduler};
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// How often the transport is checked for the end of a track
pub const END_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Play length for entries without track information
pub const VIRTUAL_ENTRY_LENGTH: Duration = Duration::from_secs(30);

/// Play the queue until `shutdown` completes or the scheduler goes away
///
/// Returns the number of entries that started playing.
pub async fn run_player(
    scheduler: &QueueScheduler,
    transport: &SimulatedTransport,
    shutdown: impl Future<Output = ()>,
) -> usize {
    let mut events = scheduler.subscribe();
    let mut end_check = tokio::time::interval(END_CHECK_INTERVAL);
    tokio::pin!(shutdown);

    let mut started = 0;
    if scheduler.advance() == AdvanceOutcome::Pending {
        info!("Waiting for the first track");
    }

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!(played = started, "Stopping playback");
                break;
            }
            event = events.recv() => match event {
                Ok(QueueEvent::TrackChanged { current: Some(entry), .. }) => {
                    let length = entry
                        .track
                        .as_ref()
                        .map_or(VIRTUAL_ENTRY_LENGTH, Track::duration);
                    transport.load(length);
                    started += 1;

                    match &entry.track {
                        Some(track) => info!(
                            playlist = %track.playlist,
                            length = ?length,
                            "Now playing: {}",
                            track.display_line()
                        ),
                        None => info!("Now playing: {}", entry.title),
                    }
                }
                Ok(QueueEvent::TrackChanged { current: None, .. }) => transport.stop(),
                Ok(QueueEvent::FillFailed { playlist, message }) => {
                    warn!(playlist = %playlist, "Could not queue a track: {}", message);
                }
                Ok(QueueEvent::NothingSelected { playlist: Some(playlist) }) => {
                    warn!(playlist = %playlist, "Playlist has no eligible track");
                }
                Ok(QueueEvent::NothingSelected { playlist: None }) => {
                    warn!("No playlist enabled, nothing to queue");
                }
                Ok(QueueEvent::QueueChanged { manual, automatic }) => {
                    debug!(manual, automatic, "Queue changed");
                }
                Ok(QueueEvent::MetadataChanged { .. }) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Player lagged behind queue events");
                }
                Err(RecvError::Closed) => break,
            },
            _ = end_check.tick() => {
                if transport.is_finished() {
                    transport.stop();
                    scheduler.advance();
                }
            }
        }
    }

    started
}

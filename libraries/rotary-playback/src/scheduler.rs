//! Prefetch queue scheduler
//!
//! Owns the play queue, the current entry and the history, and keeps the
//! automatic queue filled to the target depth by drawing tracks from the
//! enabled playlists in rotation.
//!
//! # Fill state machine
//!
//! ```text
//! IDLE -> SELECTING -> FETCHING -> ENQUEUED -> (loop back to IDLE)
//!             |             |
//!             v             v
//!          WAITING       FAILED
//!     (selection_retry) (failure_retry)
//! ```
//!
//! A playlist with no eligible track counts as an empty selection, not a
//! failure. A failed override fill keeps its override only when the error
//! is transient.
//!
//! At most one fill runs at a time. Any operation may request a fill; the
//! request is a no-op while one is running. The running fill re-reads the
//! target depth before every fetch, so it picks up changes made while it
//! was waiting on the network.
//!
//! Queue state sits behind a mutex that is never held across an `.await`,
//! so every operation is atomic with respect to the others and the fill
//! loop never blocks `remove`/`reorder`/`insert`.
//!
//! All operations that can trigger a fill spawn onto the current Tokio
//! runtime and must be called from within one.

use crate::error::{PlaybackError, Result};
use crate::events::{EntrySummary, QueueEvent, QueueSnapshot};
use crate::fetch::fetch_from_playlist;
use crate::history::History;
use crate::queue::{Queue, Tier};
use crate::resources::{BlobStore, ResourceBundle};
use crate::rotation::{PlaylistRotation, Selection};
use crate::types::{AdvanceOutcome, FillPhase, QueueSettings, RemovalPolicy, SchedulerTimings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rotary_core::{CoreError, Track, TrackFetcher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

/// Capacity of the event channel; slow subscribers lag rather than block
const EVENT_CHANNEL_CAPACITY: usize = 64;

struct State {
    queue: Queue,
    current: Option<ResourceBundle>,
    history: History,
    rotation: PlaylistRotation,
    settings: QueueSettings,
    phase: FillPhase,
    rng: StdRng,
}

impl State {
    fn needs_fill(&self) -> bool {
        self.queue.automatic_len() < self.settings.target_depth
    }

    fn queue_changed(&self) -> QueueEvent {
        QueueEvent::QueueChanged {
            manual: self.queue.manual_len(),
            automatic: self.queue.automatic_len(),
        }
    }
}

struct Inner {
    state: Mutex<State>,
    fetcher: Arc<dyn TrackFetcher>,
    store: BlobStore,
    events: broadcast::Sender<QueueEvent>,
    filling: AtomicBool,
    advance_pending: AtomicBool,
    timings: SchedulerTimings,
}

enum Pick {
    /// Draw from this playlist with these settings
    Playlist(Selection, QueueSettings),
    /// Automatic queue is at target depth
    Satisfied,
    /// No playlist enabled
    Nothing,
}

/// Clears the busy flag when the fill that acquired it ends
struct FillGuard {
    inner: Arc<Inner>,
}

impl FillGuard {
    fn acquire(inner: &Arc<Inner>) -> Option<Self> {
        inner
            .filling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                inner: Arc::clone(inner),
            })
    }
}

impl Drop for FillGuard {
    fn drop(&mut self) {
        self.inner.filling.store(false, Ordering::Release);
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: QueueEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn request_fill(self: &Arc<Self>) -> bool {
        let Some(guard) = FillGuard::acquire(self) else {
            trace!("Fill already running");
            return false;
        };
        {
            let mut state = self.lock();
            if !state.needs_fill() {
                state.phase = FillPhase::Idle;
                return false;
            }
        }
        tokio::spawn(Arc::clone(self).fill_loop(guard));
        true
    }

    fn request_fill_after(self: &Arc<Self>, delay: Duration) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.request_fill();
        });
    }

    /// SELECTING step of the fill state machine
    fn select(&self) -> Pick {
        let mut state = self.lock();
        if !state.needs_fill() {
            state.phase = FillPhase::Idle;
            return Pick::Satisfied;
        }

        state.phase = FillPhase::Selecting;
        let State { rotation, rng, .. } = &mut *state;
        match rotation.select(rng) {
            Some(selection) => {
                state.phase = FillPhase::Fetching;
                Pick::Playlist(selection, state.settings.clone())
            }
            None => {
                state.phase = FillPhase::Waiting;
                Pick::Nothing
            }
        }
    }

    async fn fill_loop(self: Arc<Self>, guard: FillGuard) {
        loop {
            let (selection, settings) = match self.select() {
                Pick::Playlist(selection, settings) => (selection, settings),
                Pick::Satisfied => break,
                Pick::Nothing => {
                    drop(guard);
                    debug!("No playlist enabled, waiting");
                    self.publish(QueueEvent::NothingSelected { playlist: None });
                    self.request_fill_after(self.timings.selection_retry);
                    return;
                }
            };

            debug!(
                playlist = %selection.playlist,
                forced = selection.from_override,
                "Filling automatic queue"
            );

            let fetched =
                fetch_from_playlist(&*self.fetcher, &self.store, &selection.playlist, &settings)
                    .await;

            match fetched {
                Ok(bundle) => {
                    let event = {
                        let mut state = self.lock();
                        info!(
                            playlist = %selection.playlist,
                            title = %bundle.display_title(),
                            depth = state.queue.automatic_len() + 1,
                            "Queued track"
                        );
                        state.queue.insert(bundle, Tier::Automatic, false);
                        state.phase = FillPhase::Idle;
                        state.queue_changed()
                    };
                    self.publish(event);
                }
                Err(PlaybackError::Fetch(CoreError::EmptyPlaylist(_))) => {
                    // Dropping the override lets rotation move on to the
                    // other enabled playlists.
                    self.lock().phase = FillPhase::Waiting;
                    drop(guard);
                    debug!(
                        playlist = %selection.playlist,
                        forced = selection.from_override,
                        "Playlist has no eligible track, waiting"
                    );
                    self.publish(QueueEvent::NothingSelected {
                        playlist: Some(selection.playlist),
                    });
                    self.request_fill_after(self.timings.selection_retry);
                    return;
                }
                Err(e) => {
                    let transient = e.is_transient();
                    {
                        let mut state = self.lock();
                        state.phase = FillPhase::Failed;
                        if selection.from_override && transient {
                            state.rotation.push_override(selection.playlist.clone());
                        }
                    }
                    drop(guard);
                    if transient {
                        debug!(
                            playlist = %selection.playlist,
                            error = %e,
                            retry_in = ?self.timings.failure_retry,
                            "Fill failed"
                        );
                    } else {
                        warn!(
                            playlist = %selection.playlist,
                            error = %e,
                            retry_in = ?self.timings.failure_retry,
                            "Fill failed"
                        );
                    }
                    self.publish(QueueEvent::FillFailed {
                        playlist: selection.playlist,
                        message: e.to_string(),
                    });
                    self.request_fill_after(self.timings.failure_retry);
                    return;
                }
            }
        }

        drop(guard);
        // A request that arrived while the guard was held was dropped;
        // pick up any deficit it left behind.
        if self.lock().needs_fill() {
            self.request_fill();
        }
    }

    fn schedule_advance_retry(self: &Arc<Self>) {
        if self.advance_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(inner.timings.advance_retry).await;
            if inner.advance_pending.swap(false, Ordering::AcqRel) {
                QueueScheduler { inner }.advance();
            }
        });
    }
}

/// Play queue with background prefetch
///
/// Cloning yields another handle to the same scheduler.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = QueueScheduler::new(fetcher, QueueSettings::default());
/// scheduler.set_enabled_playlists(vec!["Rock".into(), "Jazz".into()]);
/// let mut events = scheduler.subscribe();
///
/// scheduler.start();
/// scheduler.advance(); // plays as soon as the first track is fetched
/// ```
#[derive(Clone)]
pub struct QueueScheduler {
    inner: Arc<Inner>,
}

impl QueueScheduler {
    /// Create a scheduler with default timings and a fresh blob store
    pub fn new(fetcher: Arc<dyn TrackFetcher>, settings: QueueSettings) -> Self {
        Self::with_parts(fetcher, BlobStore::new(), settings, SchedulerTimings::default())
    }

    /// Create a scheduler from explicit parts
    pub fn with_parts(
        fetcher: Arc<dyn TrackFetcher>,
        store: BlobStore,
        settings: QueueSettings,
        timings: SchedulerTimings,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = State {
            queue: Queue::new(),
            current: None,
            history: History::new(settings.history_size),
            rotation: PlaylistRotation::default(),
            settings,
            phase: FillPhase::Idle,
            rng: StdRng::from_entropy(),
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                fetcher,
                store,
                events,
                filling: AtomicBool::new(false),
                advance_pending: AtomicBool::new(false),
                timings,
            }),
        }
    }

    /// Subscribe to queue events
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events.subscribe()
    }

    /// Blob store backing fetched media
    pub fn store(&self) -> &BlobStore {
        &self.inner.store
    }

    /// Start filling the automatic queue
    pub fn start(&self) {
        info!("Starting queue scheduler");
        self.inner.request_fill();
    }

    /// Request a fill attempt
    ///
    /// Returns `false` if a fill is already running or the automatic queue
    /// is already at the target depth.
    pub fn request_fill(&self) -> bool {
        self.inner.request_fill()
    }

    /// Whether a fill is in flight
    pub fn is_filling(&self) -> bool {
        self.inner.filling.load(Ordering::Acquire)
    }

    // ===== Playback navigation =====

    /// Move to the next entry
    ///
    /// The current entry goes to history (evicting and releasing the oldest
    /// entry if history is full). Manual entries are taken before automatic
    /// ones. On an empty queue nothing changes and a retry is scheduled.
    pub fn advance(&self) -> AdvanceOutcome {
        let changed = {
            let mut state = self.inner.lock();
            match state.queue.pop_next() {
                None => None,
                Some((next, tier)) => {
                    let previous = state.current.take();
                    let previous_id = previous.as_ref().map(ResourceBundle::id);
                    if let Some(previous) = previous {
                        if let Some(evicted) = state.history.push(previous) {
                            evicted.release(&self.inner.store);
                        }
                    }

                    info!(title = %next.display_title(), from = ?tier, "Now playing");
                    let current = EntrySummary::from(&next);
                    state.current = Some(next);
                    Some((
                        QueueEvent::TrackChanged {
                            current: Some(current),
                            previous: previous_id,
                        },
                        state.queue_changed(),
                    ))
                }
            }
        };

        let outcome = match changed {
            Some((track_changed, queue_changed)) => {
                self.inner.advance_pending.store(false, Ordering::Release);
                self.inner.publish(track_changed);
                self.inner.publish(queue_changed);
                AdvanceOutcome::Advanced
            }
            None => {
                debug!(
                    retry_in = ?self.inner.timings.advance_retry,
                    "Queue empty, waiting for prefetch"
                );
                self.inner.schedule_advance_retry();
                AdvanceOutcome::Pending
            }
        };

        self.inner.request_fill();
        outcome
    }

    /// Go back to the most recent history entry
    ///
    /// The current entry is pushed to the front of the manual queue so the
    /// next `advance` returns to it. Returns `false` if history is empty.
    pub fn go_back(&self) -> bool {
        let events = {
            let mut state = self.inner.lock();
            let Some(previous) = state.history.pop() else {
                return false;
            };

            let replaced = state.current.replace(previous);
            let replaced_id = replaced.as_ref().map(ResourceBundle::id);
            if let Some(replaced) = replaced {
                state.queue.insert(replaced, Tier::Manual, true);
            }

            let current = state.current.as_ref().map(EntrySummary::from);
            debug!(title = ?current.as_ref().map(|c| c.title.as_str()), "Went back");
            (
                QueueEvent::TrackChanged {
                    current,
                    previous: replaced_id,
                },
                state.queue_changed(),
            )
        };

        self.inner.publish(events.0);
        self.inner.publish(events.1);
        true
    }

    // ===== Queue editing =====

    /// Insert an entry into the manual or automatic queue
    pub fn insert(&self, bundle: ResourceBundle, manual: bool, at_front: bool) {
        let tier = if manual { Tier::Manual } else { Tier::Automatic };
        let event = {
            let mut state = self.inner.lock();
            debug!(title = %bundle.display_title(), ?tier, at_front, "Inserting entry");
            state.queue.insert(bundle, tier, at_front);
            state.queue_changed()
        };
        self.inner.publish(event);
        self.inner.request_fill();
    }

    /// Remove and release the entry at a combined index
    ///
    /// With [`RemovalPolicy::ResumeSamePlaylist`], removing an automatic
    /// entry makes the next fill draw from the same playlist.
    pub fn remove(&self, index: usize) -> Result<()> {
        let event = {
            let mut state = self.inner.lock();
            let (bundle, tier) = state.queue.remove(index)?;

            if tier == Tier::Automatic
                && state.settings.removal_policy == RemovalPolicy::ResumeSamePlaylist
            {
                if let Some(playlist) = bundle.playlist() {
                    debug!(playlist = %playlist, "Keeping rotation slot for removed entry");
                    state.rotation.push_override(playlist);
                }
            }

            bundle.release(&self.inner.store);
            state.queue_changed()
        };
        self.inner.publish(event);
        self.inner.request_fill();
        Ok(())
    }

    /// Move an entry between combined indices, possibly across tiers
    pub fn reorder(&self, from: usize, to: usize) -> Result<()> {
        let event = {
            let mut state = self.inner.lock();
            state.queue.reorder(from, to)?;
            state.queue_changed()
        };
        self.inner.publish(event);
        self.inner.request_fill();
        Ok(())
    }

    /// Release every queued entry; current and history are kept
    ///
    /// A fill already in flight is not cancelled and may land in the
    /// cleared queue. Returns the number of entries released.
    pub fn clear(&self) -> usize {
        let (released, event) = {
            let mut state = self.inner.lock();
            let drained = state.queue.drain();
            let released = drained.len();
            for bundle in drained {
                bundle.release(&self.inner.store);
            }
            (released, state.queue_changed())
        };
        info!(released, "Cleared queue");
        self.inner.publish(event);
        self.inner.request_fill();
        released
    }

    /// Replace the metadata of every entry for the same track
    ///
    /// Returns the number of entries updated.
    pub fn replace_track(&self, track: &Track) -> usize {
        let updated = {
            let mut state = self.inner.lock();
            let State {
                queue,
                current,
                history,
                ..
            } = &mut *state;

            current
                .iter_mut()
                .chain(queue.iter_mut())
                .chain(history.iter_mut())
                .map(|bundle| bundle.replace_track(track))
                .filter(|replaced| *replaced)
                .count()
        };

        if updated > 0 {
            debug!(path = %track.path, updated, "Track metadata replaced");
            self.inner.publish(QueueEvent::MetadataChanged {
                track: track.clone(),
                updated,
            });
        }
        updated
    }

    // ===== Settings =====

    /// Change the automatic look-ahead depth
    ///
    /// Lowering the depth does not drop already fetched entries.
    pub fn set_target_depth(&self, depth: usize) {
        self.inner.lock().settings.target_depth = depth;
        self.inner.request_fill();
    }

    /// Change the history size, releasing entries that no longer fit
    pub fn set_history_size(&self, size: usize) {
        let mut state = self.inner.lock();
        state.settings.history_size = size;
        for evicted in state.history.set_max_size(size) {
            evicted.release(&self.inner.store);
        }
    }

    pub fn set_removal_policy(&self, policy: RemovalPolicy) {
        self.inner.lock().settings.removal_policy = policy;
    }

    /// Replace all settings at once
    pub fn set_settings(&self, settings: QueueSettings) {
        {
            let mut state = self.inner.lock();
            for evicted in state.history.set_max_size(settings.history_size) {
                evicted.release(&self.inner.store);
            }
            state.settings = settings;
        }
        self.inner.request_fill();
    }

    pub fn settings(&self) -> QueueSettings {
        self.inner.lock().settings.clone()
    }

    /// Replace the set of playlists the rotation draws from
    pub fn set_enabled_playlists(&self, playlists: Vec<String>) {
        self.inner.lock().rotation.set_enabled(playlists);
        self.inner.request_fill();
    }

    /// Add a playlist to the rotation
    pub fn enable_playlist(&self, name: &str) -> bool {
        let added = self.inner.lock().rotation.enable(name);
        if added {
            self.inner.request_fill();
        }
        added
    }

    /// Remove a playlist from the rotation
    pub fn disable_playlist(&self, name: &str) -> bool {
        self.inner.lock().rotation.disable(name)
    }

    // ===== Inspection =====

    /// Read-only copy of the queue for rendering
    pub fn snapshot(&self) -> QueueSnapshot {
        let state = self.inner.lock();
        QueueSnapshot {
            current: state.current.as_ref().map(EntrySummary::from),
            manual: state.queue.manual().map(EntrySummary::from).collect(),
            automatic: state.queue.automatic().map(EntrySummary::from).collect(),
            history: state.history.iter().map(EntrySummary::from).collect(),
            fill_phase: state.phase,
            target_depth: state.settings.target_depth,
            enabled_playlists: state.rotation.enabled().to_vec(),
        }
    }

    /// Summary of the current entry
    pub fn current(&self) -> Option<EntrySummary> {
        self.inner.lock().current.as_ref().map(EntrySummary::from)
    }

    pub fn fill_phase(&self) -> FillPhase {
        self.inner.lock().phase
    }

    /// Pending playlist overrides, oldest first
    pub fn pending_overrides(&self) -> Vec<String> {
        self.inner.lock().rotation.overrides().to_vec()
    }
}

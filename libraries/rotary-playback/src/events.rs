//! Queue events and snapshots
//!
//! Events are published on a broadcast channel after the state mutation
//! that caused them has completed, so a subscriber reading a snapshot in
//! response always sees the new state.

use crate::queue::Tier;
use crate::resources::{EntryId, MediaHandle, ResourceBundle};
use crate::types::FillPhase;
use rotary_core::{Lyrics, Track};
use serde::{Deserialize, Serialize};

/// Events emitted by the queue scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueEvent {
    /// The current entry changed (advance, go back)
    TrackChanged {
        /// New current entry, `None` if nothing is playing
        current: Option<EntrySummary>,
        /// Entry that was current before
        previous: Option<EntryId>,
    },

    /// Entries were added, removed or reordered
    QueueChanged {
        /// Manual queue length
        manual: usize,
        /// Automatic queue length
        automatic: usize,
    },

    /// Metadata of a track was edited; handles are unchanged
    MetadataChanged {
        /// Edited track
        track: Track,
        /// Number of entries that were updated
        updated: usize,
    },

    /// A fill attempt failed and will be retried
    FillFailed {
        /// Playlist the fill drew from
        playlist: String,
        /// Error message
        message: String,
    },

    /// The fill found nothing to draw and is waiting
    NothingSelected {
        /// Playlist that had no eligible track, `None` if none is enabled
        playlist: Option<String>,
    },
}

/// Read-only view of a queue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: EntryId,
    /// `None` for virtual entries
    pub track: Option<Track>,
    pub title: String,
    pub audio: MediaHandle,
    pub image: MediaHandle,
    pub lyrics: Option<Lyrics>,
}

impl From<&ResourceBundle> for EntrySummary {
    fn from(bundle: &ResourceBundle) -> Self {
        Self {
            id: bundle.id(),
            track: bundle.track().cloned(),
            title: bundle.display_title().to_string(),
            audio: bundle.audio().clone(),
            image: bundle.image().clone(),
            lyrics: bundle.lyrics().cloned(),
        }
    }
}

/// Everything a UI needs to render the queue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub current: Option<EntrySummary>,
    pub manual: Vec<EntrySummary>,
    pub automatic: Vec<EntrySummary>,
    /// Oldest first
    pub history: Vec<EntrySummary>,
    pub fill_phase: FillPhase,
    pub target_depth: usize,
    pub enabled_playlists: Vec<String>,
}

impl QueueSnapshot {
    /// Combined queue length (manual + automatic)
    pub fn queue_len(&self) -> usize {
        self.manual.len() + self.automatic.len()
    }

    /// Entry at a combined index, with its tier
    pub fn entry(&self, index: usize) -> Option<(&EntrySummary, Tier)> {
        if index < self.manual.len() {
            Some((&self.manual[index], Tier::Manual))
        } else {
            self.automatic
                .get(index - self.manual.len())
                .map(|entry| (entry, Tier::Automatic))
        }
    }

    /// Entries in play order
    pub fn queued(&self) -> impl Iterator<Item = &EntrySummary> {
        self.manual.iter().chain(self.automatic.iter())
    }

    /// UI indicator: nothing to play and nothing coming
    pub fn is_starved(&self) -> bool {
        self.current.is_none()
            && self.queue_len() == 0
            && matches!(self.fill_phase, FillPhase::Waiting | FillPhase::Failed)
    }
}

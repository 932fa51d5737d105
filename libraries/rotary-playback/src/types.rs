//! Configuration and state types for the queue scheduler

use rotary_core::{AudioQuality, ImageQuality, TrackFilters};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens to the rotation when the user removes an automatic entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    /// Refill the removed slot from the same playlist
    #[default]
    ResumeSamePlaylist,

    /// Let rotation continue normally
    Rotate,
}

/// Runtime-adjustable queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Number of automatic entries to keep fetched ahead (default: 3)
    pub target_depth: usize,

    /// Maximum history size (default: 10)
    pub history_size: usize,

    /// Removal behaviour for automatic entries
    pub removal_policy: RemovalPolicy,

    /// Audio quality profile
    pub audio_quality: AudioQuality,

    /// Cover quality
    pub image_quality: ImageQuality,

    /// Ask the backend for meme covers
    pub meme_covers: bool,

    /// Filters for random track selection
    pub filters: TrackFilters,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            target_depth: 3,
            history_size: crate::history::DEFAULT_HISTORY_SIZE,
            removal_policy: RemovalPolicy::default(),
            audio_quality: AudioQuality::default(),
            image_quality: ImageQuality::default(),
            meme_covers: false,
            filters: TrackFilters::default(),
        }
    }
}

/// Backoff intervals used by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerTimings {
    /// Wait before retrying when no playlist could be selected
    pub selection_retry: Duration,

    /// Wait before retrying after a failed fetch
    pub failure_retry: Duration,

    /// Wait before retrying `advance` on an empty queue
    pub advance_retry: Duration,
}

impl Default for SchedulerTimings {
    fn default() -> Self {
        Self {
            selection_retry: Duration::from_millis(500),
            failure_retry: Duration::from_secs(5),
            advance_retry: Duration::from_secs(1),
        }
    }
}

/// Fill state machine phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPhase {
    /// No fill running
    #[default]
    Idle,
    /// Choosing a playlist
    Selecting,
    /// No playlist available, retry scheduled
    Waiting,
    /// Fetching a track bundle
    Fetching,
    /// Last fetch failed, retry scheduled
    Failed,
}

/// Result of `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A new entry is current
    Advanced,
    /// Queue was empty; a retry is scheduled
    Pending,
}

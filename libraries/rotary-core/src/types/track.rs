/// Track domain type
use crate::types::TrackPath;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Track descriptor as returned by a metadata fetch
///
/// Tracks are immutable once fetched. A metadata edit produces a
/// replacement `Track` with the same `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique path identifier
    pub path: TrackPath,

    /// Name of the playlist that owns this track
    pub playlist: String,

    /// Duration in whole seconds
    pub duration: u32,

    /// Track title
    #[serde(default)]
    pub title: Option<String>,

    /// Artist names
    #[serde(default)]
    pub artists: Vec<String>,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Album artist
    #[serde(default)]
    pub album_artist: Option<String>,

    /// Release year
    #[serde(default)]
    pub year: Option<u32>,

    /// Tags attached to the track
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Track {
    /// Create a track with only the required fields
    pub fn new(path: impl Into<TrackPath>, playlist: impl Into<String>, duration: u32) -> Self {
        Self {
            path: path.into(),
            playlist: playlist.into(),
            duration,
            title: None,
            artists: Vec::new(),
            album: None,
            album_artist: None,
            year: None,
            tags: Vec::new(),
        }
    }

    /// Track duration as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration))
    }

    /// Title for display, falling back to the file name
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or_else(|| self.path.file_stem())
    }

    /// "Artist, Artist - Title" for logs and notifications
    pub fn display_line(&self) -> String {
        if self.artists.is_empty() {
            self.display_title().to_string()
        } else {
            format!("{} - {}", self.artists.join(", "), self.display_title())
        }
    }

    /// Check whether the track carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Media payloads and quality profiles
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Audio quality profile requested from the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioQuality {
    /// Untouched source file
    Original,
    /// High bitrate transcode
    #[default]
    High,
    /// Medium bitrate transcode
    Medium,
    /// Low bitrate transcode (metered connections)
    Low,
}

impl AudioQuality {
    /// Value used in backend query strings
    pub fn as_str(self) -> &'static str {
        match self {
            AudioQuality::Original => "original",
            AudioQuality::High => "high",
            AudioQuality::Medium => "medium",
            AudioQuality::Low => "low",
        }
    }
}

/// Cover image quality
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    /// Full resolution cover
    #[default]
    High,
    /// Thumbnail-sized cover
    Low,
}

impl ImageQuality {
    /// Value used in backend query strings
    pub fn as_str(self) -> &'static str {
        match self {
            ImageQuality::High => "high",
            ImageQuality::Low => "low",
        }
    }
}

/// Raw media returned by a fetch
///
/// Either the fully downloaded bytes (which the player buffers locally) or
/// a URL the audio element streams from directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    /// Fully downloaded body
    Bytes {
        /// Response body
        data: Bytes,
        /// MIME type reported by the backend
        mime: String,
    },

    /// Remote URL, nothing buffered locally
    Url(String),
}

impl MediaPayload {
    /// Create a bytes payload
    pub fn bytes(data: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        MediaPayload::Bytes {
            data: data.into(),
            mime: mime.into(),
        }
    }

    /// Size of the locally buffered data (0 for URLs)
    pub fn buffered_len(&self) -> usize {
        match self {
            MediaPayload::Bytes { data, .. } => data.len(),
            MediaPayload::Url(_) => 0,
        }
    }
}

/// Lyrics for a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lyrics {
    /// Plain text, one line per lyric line
    pub text: String,

    /// Where the lyrics came from, if known
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Lyrics {
    /// Create lyrics from plain text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_url: None,
        }
    }

    /// Iterate over lyric lines
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

/// Filters forwarded to the backend when choosing a random track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackFilters {
    /// Only tracks carrying all of these tags
    #[serde(default)]
    pub include_tags: Vec<String>,

    /// Never tracks carrying any of these tags
    #[serde(default)]
    pub exclude_tags: Vec<String>,

    /// Minimum duration in seconds
    #[serde(default)]
    pub min_duration: Option<u32>,

    /// Maximum duration in seconds
    #[serde(default)]
    pub max_duration: Option<u32>,
}

impl TrackFilters {
    /// True when no filter is active
    pub fn is_empty(&self) -> bool {
        self.include_tags.is_empty()
            && self.exclude_tags.is_empty()
            && self.min_duration.is_none()
            && self.max_duration.is_none()
    }
}

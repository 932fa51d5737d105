//! Types for Rotary backend API requests and responses.

use serde::{Deserialize, Serialize};

/// Configuration for connecting to a Rotary backend.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the server (e.g., "https://music.example.com")
    pub url: String,
    /// Bearer token, if the backend requires one
    pub access_token: Option<String>,
    /// Hand out stream URLs instead of downloading audio up front
    pub stream_audio: bool,
}

impl ServerConfig {
    /// Create a new server config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
            stream_audio: false,
        }
    }

    /// Set the bearer token.
    #[must_use]
    pub fn with_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    /// Switch between streaming and buffered audio.
    #[must_use]
    pub fn streaming(mut self, stream_audio: bool) -> Self {
        self.stream_audio = stream_audio;
        self
    }
}

// =============================================================================
// Playlist Types
// =============================================================================

/// A playlist as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaylistInfo {
    pub name: String,
    #[serde(default)]
    pub track_count: u32,
    #[serde(default)]
    pub favorite: bool,
}

// =============================================================================
// Track Types
// =============================================================================

/// Response from the random track endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChooseResponse {
    pub path: String,
}

/// Response from the lyrics endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LyricsResponse {
    pub found: bool,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

// =============================================================================
// Activity Types
// =============================================================================

/// Request body for the now-playing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NowPlayingRequest {
    pub track: String,
    pub paused: bool,
    /// Playback position as a fraction of the track (0.0 - 1.0)
    pub position: f32,
}

/// Request body for the played endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlayedRequest {
    pub track: String,
    /// Unix timestamp (seconds) when playback started
    pub timestamp: i64,
}

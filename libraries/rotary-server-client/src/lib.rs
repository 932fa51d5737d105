//! Rotary Player Server Client
//!
//! HTTP client for the Rotary Player backend.
//!
//! # Features
//!
//! - **Playlists**: list the playlists the backend serves
//! - **Track selection**: random track per playlist, with tag and duration filters
//! - **Media**: metadata, audio (buffered or streamed), covers, lyrics
//! - **Activity**: now-playing and played reports
//!
//! [`RotaryServerClient`] implements [`TrackFetcher`](rotary_core::TrackFetcher)
//! and [`PlaybackReporter`](rotary_core::PlaybackReporter), so it plugs
//! straight into the queue scheduler and the scrobble service.
//!
//! # Example
//!
//! ```ignore
//! use rotary_server_client::{RotaryServerClient, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new("https://music.example.com").with_token("secret");
//!     let client = RotaryServerClient::new(config)?;
//!
//!     for playlist in client.list_playlists().await? {
//!         println!("{} ({} tracks)", playlist.name, playlist.track_count);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

// Re-export main types
pub use client::RotaryServerClient;
pub use error::{Result, ServerClientError};
pub use types::{
    ChooseResponse, LyricsResponse, NowPlayingRequest, PlayedRequest, PlaylistInfo, ServerConfig,
};

//! Rotary Player
//!
//! Headless player that keeps a prefetched queue drawn from rotating
//! playlists, plays it on a simulated transport and reports listening
//! activity back to the backend.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod error;
pub mod player;
pub mod transport;

// Re-export commonly used types for convenience
pub use config::{BackendSettings, PlayerConfig};
pub use error::{PlayerError, Result};
pub use player::run_player;
pub use transport::SimulatedTransport;

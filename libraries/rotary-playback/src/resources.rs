//! Resource lifecycle
//!
//! Fetched audio and cover bytes are registered in a [`BlobStore`], which
//! hands out [`MediaHandle`]s (the equivalent of object URLs). A
//! [`ResourceBundle`] owns one audio and one image handle and gives them
//! back to the store when it is released.
//!
//! Release consumes the bundle, so each bundle can be released at most
//! once. Callers remove a bundle from every queue/history slot before
//! releasing it.

use bytes::Bytes;
use rotary_core::{Lyrics, MediaPayload, Track};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};
use uuid::Uuid;

/// Text shown for entries without track information
pub const INFO_UNAVAILABLE: &str = "Info unavailable";

/// Identity of a queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a new random entry ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a buffered object inside a [`BlobStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(u64);

/// Handle to playable or displayable media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaHandle {
    /// Bytes buffered in a [`BlobStore`]
    Object {
        /// Store key
        id: BlobId,
        /// MIME type of the buffered bytes
        mime: String,
    },

    /// Plain remote URL, nothing to free
    Url {
        /// Remote location
        url: String,
    },
}

impl MediaHandle {
    /// URL the UI can point an audio/image element at
    pub fn src(&self) -> String {
        match self {
            MediaHandle::Object { id, .. } => format!("blob:rotary/{}", id.0),
            MediaHandle::Url { url } => url.clone(),
        }
    }

    /// Whether the handle is backed by locally buffered bytes
    pub fn is_object(&self) -> bool {
        matches!(self, MediaHandle::Object { .. })
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: u64,
    blobs: HashMap<BlobId, Bytes>,
    revoked: u64,
}

/// Registry of locally buffered media
///
/// Cloning the store yields another handle to the same registry.
#[derive(Debug, Clone, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl BlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a fetched payload and return its handle
    ///
    /// URL payloads are not buffered and come back as [`MediaHandle::Url`].
    pub fn register(&self, payload: MediaPayload) -> MediaHandle {
        match payload {
            MediaPayload::Url(url) => MediaHandle::Url { url },
            MediaPayload::Bytes { data, mime } => {
                let mut inner = self.lock();
                inner.next_id += 1;
                let id = BlobId(inner.next_id);
                trace!(blob = id.0, size = data.len(), "Registered blob");
                inner.blobs.insert(id, data);
                MediaHandle::Object { id, mime }
            }
        }
    }

    /// Read the bytes behind a handle
    pub fn get(&self, handle: &MediaHandle) -> Option<Bytes> {
        match handle {
            MediaHandle::Object { id, .. } => self.lock().blobs.get(id).cloned(),
            MediaHandle::Url { .. } => None,
        }
    }

    /// Free the bytes behind a handle
    ///
    /// Returns `true` if something was freed. URL handles and handles that
    /// were already revoked are ignored.
    pub fn revoke(&self, handle: &MediaHandle) -> bool {
        let MediaHandle::Object { id, .. } = handle else {
            return false;
        };
        let mut inner = self.lock();
        if inner.blobs.remove(id).is_some() {
            inner.revoked += 1;
            true
        } else {
            false
        }
    }

    /// Number of blobs currently buffered
    pub fn live_count(&self) -> usize {
        self.lock().blobs.len()
    }

    /// Total bytes currently buffered
    pub fn live_bytes(&self) -> usize {
        self.lock().blobs.values().map(Bytes::len).sum()
    }

    /// Number of blobs freed since the store was created
    pub fn revoked_count(&self) -> u64 {
        self.lock().revoked
    }
}

/// A fully fetched queue entry
///
/// Not `Clone`: the bundle is the single owner of its handles.
#[derive(Debug)]
pub struct ResourceBundle {
    id: EntryId,
    track: Option<Track>,
    audio: MediaHandle,
    image: MediaHandle,
    lyrics: Option<Lyrics>,
}

impl ResourceBundle {
    /// Bundle for a library track
    pub fn new(track: Track, audio: MediaHandle, image: MediaHandle, lyrics: Option<Lyrics>) -> Self {
        Self {
            id: EntryId::generate(),
            track: Some(track),
            audio,
            image,
            lyrics,
        }
    }

    /// Bundle without track information (news, announcements, ...)
    pub fn virtual_entry(audio: MediaHandle, image: MediaHandle) -> Self {
        Self {
            id: EntryId::generate(),
            track: None,
            audio,
            image,
            lyrics: None,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn audio(&self) -> &MediaHandle {
        &self.audio
    }

    pub fn image(&self) -> &MediaHandle {
        &self.image
    }

    pub fn lyrics(&self) -> Option<&Lyrics> {
        self.lyrics.as_ref()
    }

    /// Playlist the entry was drawn from
    pub fn playlist(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.playlist.as_str())
    }

    /// Title for display; virtual entries render as "Info unavailable"
    pub fn display_title(&self) -> &str {
        self.track
            .as_ref()
            .map_or(INFO_UNAVAILABLE, Track::display_title)
    }

    /// Swap in edited metadata for the same track
    ///
    /// Returns `false` (and changes nothing) if the paths differ.
    pub(crate) fn replace_track(&mut self, track: &Track) -> bool {
        match &self.track {
            Some(existing) if existing.path == track.path => {
                self.track = Some(track.clone());
                true
            }
            _ => false,
        }
    }

    /// Give the handles back to the store
    pub fn release(self, store: &BlobStore) {
        let audio = store.revoke(&self.audio);
        let image = store.revoke(&self.image);
        debug!(
            entry = %self.id,
            title = %self.display_title(),
            audio_freed = audio,
            image_freed = image,
            "Released queue entry"
        );
    }
}

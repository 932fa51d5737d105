/// Identifier types for library entities
use serde::{Deserialize, Serialize};
use std::fmt;

/// Track path identifier
///
/// The backend addresses tracks by their library-relative path
/// (`Playlist/Artist - Title.ogg`). Paths are opaque to the player and
/// are only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackPath(String);

impl TrackPath {
    /// Create a new track path
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path component without extension, used as a display fallback
    pub fn file_stem(&self) -> &str {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        }
    }
}

impl fmt::Display for TrackPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TrackPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_strips_directories_and_extension() {
        let path = TrackPath::new("Rock/Artist - Song.ogg");
        assert_eq!(path.file_stem(), "Artist - Song");
    }

    #[test]
    fn file_stem_without_extension() {
        assert_eq!(TrackPath::new("Jazz/untitled").file_stem(), "untitled");
        assert_eq!(TrackPath::new(".hidden").file_stem(), ".hidden");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&TrackPath::new("A/b.mp3")).unwrap();
        assert_eq!(json, "\"A/b.mp3\"");
    }
}

//! Playlist rotation
//!
//! Picks which playlist the next automatic fill draws from. Playlists are
//! visited round-robin in the order they were enabled; when there is no
//! usable previous pick the start point is random.

use rand::seq::SliceRandom;
use rand::Rng;

/// Choose the playlist after `previous`
///
/// - no enabled playlists: `None`
/// - `previous` missing or no longer enabled: a uniformly random member
/// - otherwise the member following `previous`, wrapping around
pub fn next_playlist<R: Rng + ?Sized>(
    enabled: &[String],
    previous: Option<&str>,
    rng: &mut R,
) -> Option<String> {
    if enabled.is_empty() {
        return None;
    }

    let position = previous.and_then(|prev| enabled.iter().position(|p| p == prev));
    match position {
        Some(index) => Some(enabled[(index + 1) % enabled.len()].clone()),
        None => enabled.choose(rng).cloned(),
    }
}

/// Result of a rotation pick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Playlist to draw from
    pub playlist: String,
    /// Whether the pick came from the override stack
    pub from_override: bool,
}

/// Rotation state: enabled set, last pick and override stack
#[derive(Debug, Clone, Default)]
pub struct PlaylistRotation {
    enabled: Vec<String>,
    last: Option<String>,
    overrides: Vec<String>,
}

impl PlaylistRotation {
    /// Create a rotation over the given playlists
    pub fn new(enabled: Vec<String>) -> Self {
        let mut rotation = Self::default();
        rotation.set_enabled(enabled);
        rotation
    }

    /// Replace the enabled set (duplicates are dropped, order kept)
    pub fn set_enabled(&mut self, playlists: Vec<String>) {
        self.enabled.clear();
        for name in playlists {
            if !self.enabled.contains(&name) {
                self.enabled.push(name);
            }
        }
    }

    /// Enable a playlist; returns `false` if it already was
    pub fn enable(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.enabled.contains(&name) {
            return false;
        }
        self.enabled.push(name);
        true
    }

    /// Disable a playlist; returns `false` if it was not enabled
    pub fn disable(&mut self, name: &str) -> bool {
        let before = self.enabled.len();
        self.enabled.retain(|p| p != name);
        self.enabled.len() != before
    }

    pub fn enabled(&self) -> &[String] {
        &self.enabled
    }

    /// Last playlist picked by rotation
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Force the next fill to draw from `playlist`
    pub fn push_override(&mut self, playlist: impl Into<String>) {
        self.overrides.push(playlist.into());
    }

    /// Pending overrides, oldest first
    pub fn overrides(&self) -> &[String] {
        &self.overrides
    }

    /// Pick the playlist for the next fill
    ///
    /// Overrides are drained first (most recent first). Overrides for
    /// playlists that have since been disabled are dropped. Override picks
    /// do not move the rotation cursor.
    pub fn select<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Selection> {
        while let Some(playlist) = self.overrides.pop() {
            if self.enabled.contains(&playlist) {
                return Some(Selection {
                    playlist,
                    from_override: true,
                });
            }
        }

        let playlist = next_playlist(&self.enabled, self.last.as_deref(), rng)?;
        self.last = Some(playlist.clone());
        Some(Selection {
            playlist,
            from_override: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn empty_set_yields_none() {
        assert_eq!(next_playlist(&[], Some("A"), &mut rng()), None);
        assert_eq!(next_playlist(&[], None, &mut rng()), None);
    }

    #[test]
    fn follows_previous() {
        let enabled = names(&["A", "B", "C"]);
        assert_eq!(next_playlist(&enabled, Some("A"), &mut rng()).as_deref(), Some("B"));
        assert_eq!(next_playlist(&enabled, Some("B"), &mut rng()).as_deref(), Some("C"));
    }

    #[test]
    fn wraps_around() {
        let enabled = names(&["A", "B", "C"]);
        assert_eq!(next_playlist(&enabled, Some("C"), &mut rng()).as_deref(), Some("A"));
    }

    #[test]
    fn skips_removed_member() {
        let enabled = names(&["A", "C"]);
        let next = next_playlist(&enabled, Some("A"), &mut rng()).unwrap();
        assert!(next == "A" || next == "C");
    }

    #[test]
    fn unknown_previous_picks_member() {
        let enabled = names(&["A", "B", "C"]);
        let mut rng = rng();
        for _ in 0..20 {
            let pick = next_playlist(&enabled, Some("gone"), &mut rng).unwrap();
            assert!(enabled.contains(&pick));
        }
        let pick = next_playlist(&enabled, None, &mut rng).unwrap();
        assert!(enabled.contains(&pick));
    }

    #[test]
    fn single_playlist_repeats() {
        let enabled = names(&["Solo"]);
        assert_eq!(next_playlist(&enabled, Some("Solo"), &mut rng()).as_deref(), Some("Solo"));
    }

    #[test]
    fn rotation_visits_every_playlist() {
        let mut rotation = PlaylistRotation::new(names(&["A", "B", "C"]));
        let mut rng = rng();
        let picks: Vec<String> = (0..6)
            .map(|_| rotation.select(&mut rng).unwrap().playlist)
            .collect();

        // Whatever the random start, consecutive picks cycle through the set
        for window in picks.windows(2) {
            let a = rotation.enabled().iter().position(|p| *p == window[0]).unwrap();
            let b = rotation.enabled().iter().position(|p| *p == window[1]).unwrap();
            assert_eq!(b, (a + 1) % 3);
        }
    }

    #[test]
    fn override_bypasses_rotation_once() {
        let mut rotation = PlaylistRotation::new(names(&["A", "B", "C"]));
        let mut rng = rng();
        let first = rotation.select(&mut rng).unwrap();
        assert!(!first.from_override);

        rotation.push_override("B");
        let forced = rotation.select(&mut rng).unwrap();
        assert_eq!(forced.playlist, "B");
        assert!(forced.from_override);

        // Cursor did not move: rotation continues after the first pick
        let next = rotation.select(&mut rng).unwrap();
        assert!(!next.from_override);
        assert_eq!(rotation.last(), Some(next.playlist.as_str()));
        let first_pos = rotation.enabled().iter().position(|p| *p == first.playlist).unwrap();
        assert_eq!(next.playlist, rotation.enabled()[(first_pos + 1) % 3]);
    }

    #[test]
    fn overrides_pop_most_recent_first() {
        let mut rotation = PlaylistRotation::new(names(&["A", "B"]));
        rotation.push_override("A");
        rotation.push_override("B");

        let mut rng = rng();
        assert_eq!(rotation.select(&mut rng).unwrap().playlist, "B");
        assert_eq!(rotation.select(&mut rng).unwrap().playlist, "A");
        assert!(rotation.overrides().is_empty());
    }

    #[test]
    fn override_for_disabled_playlist_is_dropped() {
        let mut rotation = PlaylistRotation::new(names(&["A", "B"]));
        rotation.push_override("B");
        rotation.disable("B");

        let pick = rotation.select(&mut rng()).unwrap();
        assert_eq!(pick.playlist, "A");
        assert!(!pick.from_override);
        assert!(rotation.overrides().is_empty());
    }

    #[test]
    fn enabled_set_deduplicates() {
        let mut rotation = PlaylistRotation::new(names(&["A", "B", "A"]));
        assert_eq!(rotation.enabled(), names(&["A", "B"]).as_slice());
        assert!(!rotation.enable("B"));
        assert!(rotation.enable("C"));
        assert!(rotation.disable("A"));
        assert!(!rotation.disable("A"));
        assert_eq!(rotation.enabled(), names(&["B", "C"]).as_slice());
    }

    #[test]
    fn nothing_enabled_selects_nothing() {
        let mut rotation = PlaylistRotation::default();
        assert!(rotation.select(&mut rng()).is_none());
    }
}

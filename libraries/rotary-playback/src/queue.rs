//! Two-tier play queue
//!
//! - Manual queue: entries the user asked for, always served first
//! - Automatic queue: look-ahead filled by playlist rotation
//!
//! Both tiers are addressed with a single combined index: manual entries
//! occupy `[0, manual_len)` and automatic entries the remainder.

use crate::error::{PlaybackError, Result};
use crate::resources::ResourceBundle;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which sub-queue an entry lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// User-requested entries
    Manual,
    /// Rotation-filled look-ahead
    Automatic,
}

/// Two-tier queue
///
/// Structure:
/// ```text
/// Manual Queue (served first):
///   - Entry B (user added)
///   - Entry C (user added)
/// ─────────────────────────────
/// Automatic Queue (rotation fill):
///   - Entry D (playlist Rock)
///   - Entry E (playlist Jazz)
/// ```
#[derive(Debug, Default)]
pub struct Queue {
    manual: VecDeque<ResourceBundle>,
    automatic: VecDeque<ResourceBundle>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert into a tier, at its front or back
    pub fn insert(&mut self, bundle: ResourceBundle, tier: Tier, at_front: bool) {
        let target = self.tier_mut(tier);
        if at_front {
            target.push_front(bundle);
        } else {
            target.push_back(bundle);
        }
    }

    /// Take the next entry to play
    ///
    /// Manual entries always come before automatic ones.
    pub fn pop_next(&mut self) -> Option<(ResourceBundle, Tier)> {
        if let Some(bundle) = self.manual.pop_front() {
            return Some((bundle, Tier::Manual));
        }
        self.automatic
            .pop_front()
            .map(|bundle| (bundle, Tier::Automatic))
    }

    /// Remove the entry at a combined index
    pub fn remove(&mut self, index: usize) -> Result<(ResourceBundle, Tier)> {
        let (tier, local) = self.locate(index)?;
        self.tier_mut(tier)
            .remove(local)
            .map(|bundle| (bundle, tier))
            .ok_or(PlaybackError::IndexOutOfBounds(index))
    }

    /// Move the entry at combined index `from` so it ends up at combined index `to`
    ///
    /// The entry may change tier. With `m` the manual length once the entry
    /// is taken out, `to < m` lands in manual, `to > m` in automatic, and
    /// `to == m` keeps the original tier (end of manual, front of automatic).
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let total = self.len();
        if from >= total {
            return Err(PlaybackError::IndexOutOfBounds(from));
        }
        if to >= total {
            return Err(PlaybackError::IndexOutOfBounds(to));
        }
        if from == to {
            return Ok(());
        }

        let (bundle, origin) = self.remove(from)?;
        let manual_len = self.manual.len();

        if to < manual_len || (to == manual_len && origin == Tier::Manual) {
            self.manual.insert(to, bundle);
        } else {
            self.automatic.insert(to - manual_len, bundle);
        }
        Ok(())
    }

    /// Take every entry out of both tiers (manual first)
    pub fn drain(&mut self) -> Vec<ResourceBundle> {
        self.manual.drain(..).chain(self.automatic.drain(..)).collect()
    }

    /// Entry at a combined index
    pub fn get(&self, index: usize) -> Option<&ResourceBundle> {
        let manual_len = self.manual.len();
        if index < manual_len {
            self.manual.get(index)
        } else {
            self.automatic.get(index - manual_len)
        }
    }

    /// All entries in play order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceBundle> {
        self.manual.iter().chain(self.automatic.iter())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResourceBundle> {
        self.manual.iter_mut().chain(self.automatic.iter_mut())
    }

    pub fn manual(&self) -> impl Iterator<Item = &ResourceBundle> {
        self.manual.iter()
    }

    pub fn automatic(&self) -> impl Iterator<Item = &ResourceBundle> {
        self.automatic.iter()
    }

    pub fn manual_len(&self) -> usize {
        self.manual.len()
    }

    pub fn automatic_len(&self) -> usize {
        self.automatic.len()
    }

    /// Total number of entries in both tiers
    pub fn len(&self) -> usize {
        self.manual.len() + self.automatic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manual.is_empty() && self.automatic.is_empty()
    }

    fn locate(&self, index: usize) -> Result<(Tier, usize)> {
        let manual_len = self.manual.len();
        if index < manual_len {
            Ok((Tier::Manual, index))
        } else if index < self.len() {
            Ok((Tier::Automatic, index - manual_len))
        } else {
            Err(PlaybackError::IndexOutOfBounds(index))
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut VecDeque<ResourceBundle> {
        match tier {
            Tier::Manual => &mut self.manual,
            Tier::Automatic => &mut self.automatic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MediaHandle;
    use rotary_core::Track;

    fn entry(name: &str) -> ResourceBundle {
        ResourceBundle::new(
            Track::new(format!("Rock/{name}.ogg"), "Rock", 180),
            MediaHandle::Url {
                url: format!("https://music/{name}.ogg"),
            },
            MediaHandle::Url {
                url: format!("https://music/{name}.webp"),
            },
            None,
        )
    }

    fn titles(queue: &Queue) -> Vec<String> {
        queue.iter().map(|b| b.display_title().to_string()).collect()
    }

    fn build(manual: &[&str], automatic: &[&str]) -> Queue {
        let mut queue = Queue::new();
        for name in manual {
            queue.insert(entry(name), Tier::Manual, false);
        }
        for name in automatic {
            queue.insert(entry(name), Tier::Automatic, false);
        }
        queue
    }

    #[test]
    fn create_empty_queue() {
        let queue = Queue::new();
        assert_eq!(queue.len(), 0);
        assert!(queue.is_empty());
        assert!(queue.get(0).is_none());
    }

    #[test]
    fn manual_queue_has_priority() {
        let mut queue = build(&[], &["a1", "a2"]);
        queue.insert(entry("m1"), Tier::Manual, false);

        let (next, tier) = queue.pop_next().unwrap();
        assert_eq!(next.display_title(), "m1");
        assert_eq!(tier, Tier::Manual);

        let (next, tier) = queue.pop_next().unwrap();
        assert_eq!(next.display_title(), "a1");
        assert_eq!(tier, Tier::Automatic);
    }

    #[test]
    fn insert_at_front() {
        let mut queue = build(&["m1"], &["a1"]);
        queue.insert(entry("m0"), Tier::Manual, true);
        queue.insert(entry("a0"), Tier::Automatic, true);
        assert_eq!(titles(&queue), ["m0", "m1", "a0", "a1"]);
    }

    #[test]
    fn remove_uses_combined_index() {
        let mut queue = build(&["m1", "m2"], &["a1", "a2"]);

        let (removed, tier) = queue.remove(2).unwrap();
        assert_eq!(removed.display_title(), "a1");
        assert_eq!(tier, Tier::Automatic);

        let (removed, tier) = queue.remove(1).unwrap();
        assert_eq!(removed.display_title(), "m2");
        assert_eq!(tier, Tier::Manual);

        assert_eq!(titles(&queue), ["m1", "a2"]);
    }

    #[test]
    fn remove_out_of_bounds() {
        let mut queue = build(&["m1"], &["a1"]);
        assert!(matches!(queue.remove(2), Err(PlaybackError::IndexOutOfBounds(2))));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn reorder_within_manual() {
        let mut queue = build(&["1", "2", "3"], &[]);
        queue.reorder(0, 2).unwrap();
        assert_eq!(titles(&queue), ["2", "3", "1"]);
    }

    #[test]
    fn reorder_within_automatic() {
        let mut queue = build(&["m"], &["1", "2", "3"]);
        queue.reorder(3, 1).unwrap();
        assert_eq!(titles(&queue), ["m", "3", "1", "2"]);
        assert_eq!(queue.manual_len(), 1);
    }

    #[test]
    fn reorder_manual_into_automatic() {
        let mut queue = build(&["m1"], &["a1", "a2"]);
        queue.reorder(0, 2).unwrap();

        assert_eq!(titles(&queue), ["a1", "a2", "m1"]);
        assert_eq!(queue.manual_len(), 0);
        assert_eq!(queue.automatic_len(), 3);
    }

    #[test]
    fn reorder_automatic_into_manual() {
        let mut queue = build(&["m1", "m2"], &["a1"]);
        queue.reorder(2, 0).unwrap();

        assert_eq!(titles(&queue), ["a1", "m1", "m2"]);
        assert_eq!(queue.manual_len(), 3);
        assert_eq!(queue.automatic_len(), 0);
    }

    #[test]
    fn reorder_to_boundary_keeps_tier() {
        let mut queue = build(&["m1", "m2"], &["a1"]);
        queue.reorder(0, 1).unwrap();
        assert_eq!(titles(&queue), ["m2", "m1", "a1"]);
        assert_eq!(queue.manual_len(), 2);

        let mut queue = build(&["m1"], &["a1", "a2"]);
        queue.reorder(2, 1).unwrap();
        assert_eq!(titles(&queue), ["m1", "a2", "a1"]);
        assert_eq!(queue.manual_len(), 1);
    }

    #[test]
    fn reorder_out_of_bounds() {
        let mut queue = build(&["m1"], &["a1"]);
        assert!(queue.reorder(0, 2).is_err());
        assert!(queue.reorder(5, 0).is_err());
        assert_eq!(titles(&queue), ["m1", "a1"]);
    }

    #[test]
    fn drain_empties_both_tiers() {
        let mut queue = build(&["m1"], &["a1", "a2"]);
        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert!(queue.is_empty());
    }
}

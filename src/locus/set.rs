//! Dense set with O(1) uniform sampling.

use std::hash::Hash;
use hashbrown::HashMap;
use rand::Rng;

/// A set stored as a dense vector plus a position index.
///
/// Insert, remove, membership and uniform draw are all O(1). Removal
/// swaps the last element into the vacated slot, so element order is
/// arbitrary and changes as the set is mutated.
#[derive(Debug, Clone)]
pub struct LocusSet<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T> Default for LocusSet<T> {
    fn default() -> Self {
        Self { items: Vec::new(), positions: HashMap::new() }
    }
}

impl<T: Copy + Eq + Hash> LocusSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    /// Insert `item`. Returns false if it was already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.positions.contains_key(&item) {
            return false;
        }
        self.positions.insert(item, self.items.len());
        self.items.push(item);
        true
    }

    /// Remove `item`. Returns false if it was not present.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(pos) = self.positions.remove(item) else {
            return false;
        };
        self.items.swap_remove(pos);
        if let Some(moved) = self.items.get(pos) {
            self.positions.insert(*moved, pos);
        }
        true
    }

    /// Pick an element uniformly at random without removing it.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        Some(self.items[rng.gen_range(0..self.items.len())])
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T> IntoIterator for &'a LocusSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_insert_is_idempotent() {
        let mut set = LocusSet::new();
        assert!(set.insert(3u32));
        assert!(!set.insert(3u32));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_keeps_positions_consistent() {
        let mut set = LocusSet::new();
        for i in 0..5u32 {
            set.insert(i);
        }
        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert!(set.remove(&4));

        let mut left: Vec<u32> = set.iter().copied().collect();
        left.sort();
        assert_eq!(left, vec![0, 2, 3]);
        for x in [0u32, 2, 3] {
            assert!(set.contains(&x));
            assert!(set.remove(&x));
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_draw_from_empty_is_none() {
        let set: LocusSet<u32> = LocusSet::new();
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(set.draw(&mut rng), None);
    }

    #[test]
    fn test_draw_covers_every_element() {
        let mut set = LocusSet::new();
        for i in 0..4u32 {
            set.insert(i);
        }
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [0usize; 4];
        for _ in 0..4000 {
            seen[set.draw(&mut rng).unwrap() as usize] += 1;
        }
        // Uniform: each bucket near 1000.
        assert!(seen.iter().all(|&c| c > 800 && c < 1200), "{seen:?}");
    }
}

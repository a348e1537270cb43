//! Bounded characterization cache keyed by a SHA-256 of the exact input.
//!
//! Eviction is FIFO: when full, the entry inserted first is dropped, whether
//! or not it was read recently.

use std::collections::{HashMap, VecDeque};

use sha2::{Digest, Sha256};

use crate::characterization::CodeCharacterization;

/// Hex SHA-256 of an input text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputHash(String);

impl InputHash {
    pub fn of(source: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InputHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct CharacterizationCache {
    capacity: usize,
    entries: HashMap<InputHash, CodeCharacterization>,
    insertion_order: VecDeque<InputHash>,
}

impl CharacterizationCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &InputHash) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &InputHash) -> Option<&CodeCharacterization> {
        self.entries.get(key)
    }

    /// Store `value`. Replacing an existing key keeps its queue position.
    pub fn insert(&mut self, key: InputHash, value: CodeCharacterization) {
        if self.entries.insert(key.clone(), value).is_some() {
            return;
        }
        self.insertion_order.push_back(key);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::trace!(key = %oldest, "evicted cached characterization");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(lines: usize) -> CodeCharacterization {
        let mut record = CodeCharacterization::default();
        record.structure.lines = lines;
        record
    }

    #[test]
    fn test_hash_is_stable_and_exact() {
        assert_eq!(InputHash::of("abc"), InputHash::of("abc"));
        assert_ne!(InputHash::of("abc"), InputHash::of("abc "));
        assert_eq!(
            InputHash::of("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fifo_eviction() {
        let mut cache = CharacterizationCache::new(2);
        let (a, b, c) = (InputHash::of("a"), InputHash::of("b"), InputHash::of("c"));
        cache.insert(a.clone(), record(1));
        cache.insert(b.clone(), record(2));
        // Reading `a` does not protect it
        assert!(cache.get(&a).is_some());
        cache.insert(c.clone(), record(3));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.contains(&c));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut cache = CharacterizationCache::new(2);
        let (a, b, c) = (InputHash::of("a"), InputHash::of("b"), InputHash::of("c"));
        cache.insert(a.clone(), record(1));
        cache.insert(b.clone(), record(2));
        cache.insert(a.clone(), record(10));
        assert_eq!(cache.get(&a).map(|r| r.structure.lines), Some(10));

        cache.insert(c, record(3));
        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut cache = CharacterizationCache::new(0);
        cache.insert(InputHash::of("a"), record(1));
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }
}

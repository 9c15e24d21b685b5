use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// A 2Q cache: a `recent` FIFO for first-sight keys, a `frequent` LRU for keys seen more than
/// once, and a `ghost` FIFO remembering recently evicted `recent` keys so that a key which comes
/// back quickly is promoted straight to `frequent` instead of restarting in `recent`.
///
/// Used to deduplicate assignment/bandit log events: a caller wraps its sink so the same
/// `(subject, flag)` → `(allocation, variation)` pair is only logged once until it changes.
pub struct TwoQueueCache<K, V> {
    capacity: usize,
    recent_capacity: usize,
    recent: VecDeque<K>,
    frequent: VecDeque<K>,
    ghost: VecDeque<K>,
    values: HashMap<K, V>,
}

impl<K: Eq + Hash + Clone, V> TwoQueueCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        let recent_capacity = (capacity / 4).max(1);
        TwoQueueCache {
            capacity,
            recent_capacity,
            recent: VecDeque::new(),
            frequent: VecDeque::new(),
            ghost: VecDeque::new(),
            values: HashMap::new(),
        }
    }

    /// Returns the cached value for `key`, promoting it within the cache's internal queues.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if let Some(pos) = self.frequent.iter().position(|k| k == key) {
            let k = self.frequent.remove(pos).expect("position just found");
            self.frequent.push_back(k);
        } else if let Some(pos) = self.recent.iter().position(|k| k == key) {
            let k = self.recent.remove(pos).expect("position just found");
            self.frequent.push_back(k);
            self.evict_frequent_if_needed();
        }
        self.values.get(key)
    }

    /// Inserts or updates `key` → `value`. If `key` is already tracked, updates in place without
    /// disturbing its queue position (besides the promotion `get` already performs). Otherwise
    /// inserts fresh, promoting from `ghost` to `frequent` directly when applicable.
    pub fn insert(&mut self, key: K, value: V) {
        if self.frequent.contains(&key) || self.recent.contains(&key) {
            self.values.insert(key, value);
            return;
        }

        if let Some(pos) = self.ghost.iter().position(|k| k == &key) {
            self.ghost.remove(pos);
            self.frequent.push_back(key.clone());
            self.values.insert(key, value);
            self.evict_frequent_if_needed();
            return;
        }

        self.recent.push_back(key.clone());
        self.values.insert(key, value);
        self.evict_recent_if_needed();
    }

    pub fn len(&self) -> usize {
        self.recent.len() + self.frequent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.recent.clear();
        self.frequent.clear();
        self.ghost.clear();
        self.values.clear();
    }

    fn evict_recent_if_needed(&mut self) {
        while self.recent.len() > self.recent_capacity {
            if let Some(evicted) = self.recent.pop_front() {
                self.values.remove(&evicted);
                self.ghost.push_back(evicted);
                if self.ghost.len() > self.recent_capacity {
                    self.ghost.pop_front();
                }
            }
        }
    }

    fn evict_frequent_if_needed(&mut self) {
        let frequent_capacity = self.capacity.saturating_sub(self.recent_capacity).max(1);
        while self.frequent.len() > frequent_capacity {
            if let Some(evicted) = self.frequent.pop_front() {
                self.values.remove(&evicted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recalls_inserted_value() {
        let mut cache: TwoQueueCache<&str, i32> = TwoQueueCache::new(8);
        cache.insert("a", 1);
        assert_eq!(cache.get(&"a"), Some(&1));
    }

    #[test]
    fn promotes_on_second_touch() {
        let mut cache: TwoQueueCache<&str, i32> = TwoQueueCache::new(8);
        cache.insert("a", 1);
        cache.get(&"a");
        cache.insert("a", 2);
        assert_eq!(cache.get(&"a"), Some(&2));
    }

    #[test]
    fn evicts_oldest_recent_entries_beyond_capacity() {
        let mut cache: TwoQueueCache<i32, i32> = TwoQueueCache::new(4);
        for i in 0..10 {
            cache.insert(i, i);
        }
        assert!(cache.len() <= 4);
    }

    #[test]
    fn ghost_promotes_returning_key_to_frequent() {
        let mut cache: TwoQueueCache<i32, i32> = TwoQueueCache::new(4);
        cache.insert(0, 0);
        // push enough entries to evict 0 from recent into ghost
        for i in 1..5 {
            cache.insert(i, i);
        }
        cache.insert(0, 99);
        assert_eq!(cache.get(&0), Some(&99));
    }
}

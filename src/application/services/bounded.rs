//! Capacity-bounded collections with oldest-first batch eviction.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// FIFO queue that never holds more than `capacity` items.
///
/// When a push would exceed capacity, the `evict_batch` oldest items are
/// removed first. New arrivals are never rejected.
#[derive(Debug, Clone)]
pub struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    evict_batch: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue. Capacity is at least 1; the batch is clamped to `1..=capacity`.
    #[must_use]
    pub fn new(capacity: usize, evict_batch: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            evict_batch: evict_batch.clamp(1, capacity),
        }
    }

    /// Appends `item`, returning whatever was evicted to make room.
    pub fn push(&mut self, item: T) -> Vec<T> {
        let evicted = if self.items.len() >= self.capacity {
            let count = self.evict_batch.min(self.items.len());
            self.items.drain(..count).collect()
        } else {
            Vec::new()
        };

        self.items.push_back(item);
        evicted
    }

    /// Removes and returns up to `limit` items from the front.
    pub fn drain_front(&mut self, limit: usize) -> Vec<T> {
        let count = limit.min(self.items.len());
        self.items.drain(..count).collect()
    }

    /// Oldest `count` items, front first.
    pub fn front(&self, count: usize) -> impl Iterator<Item = &T> {
        self.items.iter().take(count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub const fn evict_batch(&self) -> usize {
        self.evict_batch
    }
}

/// Set with insertion-order eviction, built on `BoundedQueue`.
#[derive(Debug, Clone)]
pub struct BoundedSet<K> {
    order: BoundedQueue<K>,
    members: HashSet<K>,
}

impl<K: Eq + Hash + Clone> BoundedSet<K> {
    #[must_use]
    pub fn new(capacity: usize, evict_batch: usize) -> Self {
        let order = BoundedQueue::new(capacity, evict_batch);
        Self {
            members: HashSet::with_capacity(order.capacity()),
            order,
        }
    }

    /// Inserts `key`. Returns `false` if it was already present, in which case
    /// nothing changes (its age is not refreshed).
    pub fn insert(&mut self, key: K) -> bool {
        if self.members.contains(&key) {
            return false;
        }

        for evicted in self.order.push(key.clone()) {
            self.members.remove(&evicted);
        }
        self.members.insert(key);
        true
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.order.capacity()
    }
}

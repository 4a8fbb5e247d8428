//! Recently-seen message ids.

use super::bounded::BoundedSet;
use crate::domain::entities::MessageId;

pub const DEFAULT_DEDUP_CAPACITY: usize = 500;
pub const DEFAULT_DEDUP_EVICT_BATCH: usize = 100;

/// Bounded set of source event ids already turned into inbox items.
#[derive(Debug)]
pub struct DedupCache {
    seen: BoundedSet<MessageId>,
}

impl DedupCache {
    #[must_use]
    pub fn new(capacity: usize, evict_batch: usize) -> Self {
        Self {
            seen: BoundedSet::new(capacity, evict_batch),
        }
    }

    #[must_use]
    pub fn contains(&self, id: MessageId) -> bool {
        self.seen.contains(&id)
    }

    /// Records `id`; returns `false` if it was already present.
    pub fn insert(&mut self, id: MessageId) -> bool {
        self.seen.insert(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY, DEFAULT_DEDUP_EVICT_BATCH)
    }
}

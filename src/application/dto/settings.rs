use std::time::Duration;

use crate::application::services::{
    DEFAULT_DEDUP_CAPACITY, DEFAULT_DEDUP_EVICT_BATCH, DEFAULT_INBOX_CAPACITY,
};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Tunables for one adapter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSettings {
    pub connect_timeout: Duration,
    pub event_buffer: usize,
    pub inbox_capacity: usize,
    pub dedup_capacity: usize,
    pub dedup_evict_batch: usize,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            event_buffer: DEFAULT_EVENT_BUFFER,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            dedup_capacity: DEFAULT_DEDUP_CAPACITY,
            dedup_evict_batch: DEFAULT_DEDUP_EVICT_BATCH,
        }
    }
}

impl AdapterSettings {
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }

    #[must_use]
    pub const fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity;
        self
    }

    #[must_use]
    pub const fn with_dedup(mut self, capacity: usize, evict_batch: usize) -> Self {
        self.dedup_capacity = capacity;
        self.dedup_evict_batch = evict_batch;
        self
    }
}

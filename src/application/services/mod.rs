//! Ingestion pipeline building blocks.

pub mod bounded;
pub mod classifier;
pub mod dedup_cache;
pub mod inbox_store;
pub mod ingest;

pub use bounded::{BoundedQueue, BoundedSet};
pub use classifier::{MessageClassifier, Verdict};
pub use dedup_cache::{DEFAULT_DEDUP_CAPACITY, DEFAULT_DEDUP_EVICT_BATCH, DedupCache};
pub use inbox_store::{DEFAULT_INBOX_CAPACITY, InboxStore, PEEK_PREVIEW_LEN};
pub use ingest::{Ingestor, spawn_ingest_task};

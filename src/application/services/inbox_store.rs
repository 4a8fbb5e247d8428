//! Bounded FIFO of inbox items awaiting consumption.

use parking_lot::Mutex;
use tracing::debug;

use super::bounded::BoundedQueue;
use crate::domain::entities::{InboxItem, InboxPeek};

pub const DEFAULT_INBOX_CAPACITY: usize = 50;
pub const PEEK_PREVIEW_LEN: usize = 5;

/// Shared inbox. Overflow drops the oldest item; new arrivals always land.
#[derive(Debug)]
pub struct InboxStore {
    queue: Mutex<BoundedQueue<InboxItem>>,
}

impl InboxStore {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(BoundedQueue::new(capacity, 1)),
        }
    }

    pub fn enqueue(&self, item: InboxItem) {
        let dropped = self.queue.lock().push(item);
        for old in dropped {
            debug!(item_id = %old.id(), "Inbox full, dropped oldest item");
        }
    }

    /// Removes up to `limit` items in arrival order.
    pub fn drain(&self, limit: usize) -> Vec<InboxItem> {
        self.queue.lock().drain_front(limit)
    }

    #[must_use]
    pub fn peek(&self) -> InboxPeek {
        let queue = self.queue.lock();
        InboxPeek {
            count: queue.len(),
            preview: queue.front(PEEK_PREVIEW_LEN).cloned().collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl Default for InboxStore {
    fn default() -> Self {
        Self::new(DEFAULT_INBOX_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ChannelId, InboxKind, MessageAuthor, MessageId, RawMessage, UserId,
    };

    fn item(n: u64) -> InboxItem {
        let raw = RawMessage::new(
            MessageId(n),
            MessageAuthor::new(UserId(7), "alice"),
            ChannelId(1),
            format!("message {n}"),
        );
        InboxItem::from_message(InboxKind::DirectMessage, &raw)
    }

    fn ids(items: &[InboxItem]) -> Vec<u64> {
        items.iter().map(|i| i.source_event_id().as_u64()).collect()
    }

    #[test]
    fn test_sixty_enqueues_keep_last_fifty() {
        let store = InboxStore::default();
        for n in 1..=60 {
            store.enqueue(item(n));
        }

        assert_eq!(store.len(), 50);
        let drained = store.drain(100);
        assert_eq!(ids(&drained), (11..=60).collect::<Vec<_>>());
    }

    #[test]
    fn test_drain_is_fifo_and_partial() {
        let store = InboxStore::default();
        for n in 1..=4 {
            store.enqueue(item(n));
        }

        assert_eq!(ids(&store.drain(3)), vec![1, 2, 3]);
        assert_eq!(store.len(), 1);
        assert_eq!(ids(&store.drain(10)), vec![4]);
        assert!(store.drain(10).is_empty());
    }

    #[test]
    fn test_peek_is_non_destructive() {
        let store = InboxStore::default();
        for n in 1..=8 {
            store.enqueue(item(n));
        }

        let peek = store.peek();
        assert_eq!(peek.count, 8);
        assert_eq!(ids(&peek.preview), vec![1, 2, 3, 4, 5]);
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_peek_empty() {
        let peek = InboxStore::default().peek();
        assert_eq!(peek.count, 0);
        assert!(peek.preview.is_empty());
    }
}

//! Inbound event consumption: dedup, classify, enqueue.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::classifier::{MessageClassifier, Verdict};
use super::dedup_cache::DedupCache;
use super::inbox_store::InboxStore;
use crate::domain::entities::{InboxItem, RawMessage};
use crate::domain::ports::InboundEvent;

/// Owns the dedup cache and feeds accepted messages into the inbox.
pub struct Ingestor {
    dedup: Mutex<DedupCache>,
    inbox: Arc<InboxStore>,
}

impl Ingestor {
    #[must_use]
    pub fn new(dedup: DedupCache, inbox: Arc<InboxStore>) -> Self {
        Self {
            dedup: Mutex::new(dedup),
            inbox,
        }
    }

    #[must_use]
    pub fn inbox(&self) -> &Arc<InboxStore> {
        &self.inbox
    }

    #[must_use]
    pub fn dedup_len(&self) -> usize {
        self.dedup.lock().len()
    }

    /// Runs one message through the pipeline. The dedup lock is held until the
    /// item is enqueued, so a redelivered event can never slip in between.
    pub fn ingest(&self, classifier: &MessageClassifier, message: &RawMessage) -> Option<InboxItem> {
        let mut dedup = self.dedup.lock();

        let kind = match classifier.evaluate(message, &dedup) {
            Verdict::Accepted(kind) => kind,
            verdict => {
                debug!(message_id = %message.id, ?verdict, "Inbound message skipped");
                return None;
            }
        };

        dedup.insert(message.id);
        let item = InboxItem::from_message(kind, message);

        info!(
            kind = %kind,
            author = %item.author_display_name(),
            channel = %item.channel_name(),
            "Inbox item queued"
        );

        self.inbox.enqueue(item.clone());
        Some(item)
    }
}

/// Spawns the single consumer for a connection's event channel.
pub fn spawn_ingest_task(
    mut events: mpsc::Receiver<InboundEvent>,
    classifier: MessageClassifier,
    ingestor: Arc<Ingestor>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                InboundEvent::Message(message) => {
                    ingestor.ingest(&classifier, &message);
                }
                InboundEvent::Warning(message) => warn!(%message, "Platform warning"),
                InboundEvent::Error(message) => error!(%message, "Platform error"),
            }
        }
        debug!("Inbound event channel closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        ChannelId, GuildId, InboxKind, MessageAuthor, MessageId, UserId,
    };

    const BOT: UserId = UserId(1000);

    fn ingestor() -> Arc<Ingestor> {
        Arc::new(Ingestor::new(
            DedupCache::default(),
            Arc::new(InboxStore::default()),
        ))
    }

    fn dm(id: u64) -> RawMessage {
        RawMessage::new(
            MessageId(id),
            MessageAuthor::new(UserId(7), "alice"),
            ChannelId(1),
            "hello",
        )
    }

    #[test]
    fn test_duplicate_delivery_yields_one_item() {
        let ingestor = ingestor();
        let classifier = MessageClassifier::new(BOT);

        assert!(ingestor.ingest(&classifier, &dm(1)).is_some());
        assert!(ingestor.ingest(&classifier, &dm(1)).is_none());

        assert_eq!(ingestor.inbox().len(), 1);
        assert_eq!(ingestor.dedup_len(), 1);
    }

    #[test]
    fn test_unaddressed_messages_leave_no_trace() {
        let ingestor = ingestor();
        let classifier = MessageClassifier::new(BOT);
        let chatter = dm(2).in_guild(GuildId(3), "Guild");

        assert!(ingestor.ingest(&classifier, &chatter).is_none());
        assert_eq!(ingestor.dedup_len(), 0);
        assert!(ingestor.inbox().is_empty());
    }

    #[tokio::test]
    async fn test_task_processes_events_in_order() {
        let ingestor = ingestor();
        let (tx, rx) = mpsc::channel(16);
        let handle = spawn_ingest_task(rx, MessageClassifier::new(BOT), ingestor.clone());

        tx.send(InboundEvent::Warning("slow down".into())).await.unwrap();
        for id in [3, 1, 3, 2] {
            tx.send(InboundEvent::Message(dm(id))).await.unwrap();
        }
        tx.send(InboundEvent::Error("socket hiccup".into())).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let items = ingestor.inbox().drain(10);
        let ids: Vec<u64> = items.iter().map(|i| i.source_event_id().as_u64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert!(items.iter().all(|i| i.kind() == InboxKind::DirectMessage));
    }
}

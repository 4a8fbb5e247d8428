//! Decides whether an inbound message needs the bot's attention.

use crate::domain::entities::{InboxKind, RawMessage, UserId};

use super::dedup_cache::DedupCache;

/// Outcome of evaluating one inbound message. Rules apply in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Sent by this bot or another bot account.
    IgnoredAuthor,
    /// Already turned into an inbox item.
    Duplicate,
    Accepted(InboxKind),
    /// Nothing addresses the bot.
    NotAddressed,
}

/// Classifier bound to the identity of the connected bot.
#[derive(Debug, Clone, Copy)]
pub struct MessageClassifier {
    bot_id: UserId,
}

impl MessageClassifier {
    #[must_use]
    pub const fn new(bot_id: UserId) -> Self {
        Self { bot_id }
    }

    #[must_use]
    pub const fn bot_id(&self) -> UserId {
        self.bot_id
    }

    /// Evaluates `message` without mutating anything.
    #[must_use]
    pub fn evaluate(&self, message: &RawMessage, seen: &DedupCache) -> Verdict {
        if message.author.id == self.bot_id || message.author.bot {
            return Verdict::IgnoredAuthor;
        }

        if seen.contains(message.id) {
            return Verdict::Duplicate;
        }

        self.kind_of(message)
            .map_or(Verdict::NotAddressed, Verdict::Accepted)
    }

    fn kind_of(&self, message: &RawMessage) -> Option<InboxKind> {
        if message.is_direct() {
            Some(InboxKind::DirectMessage)
        } else if message.mentions_user(self.bot_id) {
            Some(InboxKind::Mention)
        } else if message.reply_to.is_some() {
            Some(InboxKind::Reply)
        } else {
            None
        }
    }
}

//! Normalized inbox entries.

use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, MessageId, RawMessage, UserId};

/// Channel name reported for direct-message channels.
pub const DIRECT_CHANNEL_NAME: &str = "DM";

/// Why an inbound message needs the bot's attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxKind {
    DirectMessage,
    Mention,
    Reply,
}

impl std::fmt::Display for InboxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectMessage => write!(f, "dm"),
            Self::Mention => write!(f, "mention"),
            Self::Reply => write!(f, "reply"),
        }
    }
}

/// One address-worthy inbound message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    id: String,
    kind: InboxKind,
    author_id: UserId,
    author_display_name: String,
    content: String,
    channel_id: ChannelId,
    channel_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_id: Option<GuildId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_name: Option<String>,
    source_event_id: MessageId,
    timestamp: i64,
}

impl InboxItem {
    /// Shapes a classified message into an inbox entry.
    #[must_use]
    pub fn from_message(kind: InboxKind, message: &RawMessage) -> Self {
        let channel_name = if message.is_direct() {
            DIRECT_CHANNEL_NAME.to_string()
        } else {
            message
                .channel_name
                .clone()
                .unwrap_or_else(|| message.channel_id.to_string())
        };

        Self {
            id: format!("discord-{}", message.id),
            kind,
            author_id: message.author.id,
            author_display_name: message.author.display_name().to_string(),
            content: message.content.clone(),
            channel_id: message.channel_id,
            channel_name,
            server_id: message.guild_id,
            server_name: message.guild_id.and(message.guild_name.clone()),
            source_event_id: message.id,
            timestamp: message.timestamp.timestamp_millis(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn kind(&self) -> InboxKind {
        self.kind
    }

    #[must_use]
    pub const fn author_id(&self) -> UserId {
        self.author_id
    }

    #[must_use]
    pub fn author_display_name(&self) -> &str {
        &self.author_display_name
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    #[must_use]
    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    #[must_use]
    pub const fn server_id(&self) -> Option<GuildId> {
        self.server_id
    }

    #[must_use]
    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    #[must_use]
    pub const fn source_event_id(&self) -> MessageId {
        self.source_event_id
    }

    /// Creation time in epoch milliseconds.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Non-destructive view of the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxPeek {
    pub count: usize,
    pub preview: Vec<InboxItem>,
}

//! Message shapes crossing the platform boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChannelId, GuildId, MessageAuthor, MessageId, UserId};

/// Inbound message event as delivered by the transport, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub id: MessageId,
    pub author: MessageAuthor,
    pub content: String,
    pub channel_id: ChannelId,
    pub channel_name: Option<String>,
    pub guild_id: Option<GuildId>,
    pub guild_name: Option<String>,
    pub mentions: Vec<UserId>,
    pub reply_to: Option<MessageId>,
    pub timestamp: DateTime<Utc>,
}

impl RawMessage {
    #[must_use]
    pub fn new(
        id: MessageId,
        author: MessageAuthor,
        channel_id: ChannelId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            channel_id,
            channel_name: None,
            guild_id: None,
            guild_name: None,
            mentions: Vec::new(),
            reply_to: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn in_guild(mut self, guild_id: GuildId, guild_name: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id);
        self.guild_name = Some(guild_name.into());
        self
    }

    #[must_use]
    pub fn with_channel_name(mut self, name: impl Into<String>) -> Self {
        self.channel_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_mentions(mut self, mentions: Vec<UserId>) -> Self {
        self.mentions = mentions;
        self
    }

    #[must_use]
    pub const fn replying_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }

    #[must_use]
    pub const fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// A message without a guild arrived in a one-to-one channel.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }

    #[must_use]
    pub fn mentions_user(&self, user_id: UserId) -> bool {
        self.mentions.contains(&user_id)
    }
}

/// Message returned from channel history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<MessageId>,
}

/// Embed requested in place of plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedSpec {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
}

/// Options accepted by `sendMessage`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub embed: Option<EmbedSpec>,
    pub reply_to: Option<MessageId>,
}

impl SendOptions {
    #[must_use]
    pub fn with_embed(mut self, embed: EmbedSpec) -> Self {
        self.embed = Some(embed);
        self
    }

    #[must_use]
    pub const fn with_reply(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Fully shaped outbound message handed to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingBody {
    Text(String),
    Embed(EmbedSpec),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub body: OutgoingBody,
    pub reply_to: Option<MessageId>,
}

impl OutgoingMessage {
    /// Builds the outbound body; an embed without description carries `content` there.
    #[must_use]
    pub fn from_content(content: impl Into<String>, options: SendOptions) -> Self {
        let content = content.into();
        let body = match options.embed {
            Some(mut embed) => {
                if embed.description.is_none() && !content.is_empty() {
                    embed.description = Some(content);
                }
                OutgoingBody::Embed(embed)
            }
            None => OutgoingBody::Text(content),
        };

        Self {
            body,
            reply_to: options.reply_to,
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{
    BotIdentity, ChannelId, ChannelInfo, ChannelKind, EmbedSpec, GuildId, HistoryMessage,
    MessageId, OutgoingBody, OutgoingMessage, UserId,
};

/// Discord API user response structure.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    #[serde(with = "crate::domain::serde_utils::snowflake")]
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl UserResponse {
    #[must_use]
    pub fn into_identity(self) -> BotIdentity {
        BotIdentity::new(UserId(self.id), self.username, self.discriminator)
    }

    fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChannelResponse {
    pub id: ChannelId,
    #[serde(rename = "type", default)]
    pub kind: u8,
    pub name: Option<String>,
    pub guild_id: Option<GuildId>,
}

impl From<ChannelResponse> for ChannelInfo {
    fn from(channel: ChannelResponse) -> Self {
        Self {
            id: channel.id,
            kind: ChannelKind::from(channel.kind),
            name: channel.name,
            guild_id: channel.guild_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MessageReferenceResponse {
    pub message_id: Option<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub author: UserResponse,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub message_reference: Option<MessageReferenceResponse>,
}

impl From<MessageResponse> for HistoryMessage {
    fn from(message: MessageResponse) -> Self {
        Self {
            id: message.id,
            author_id: UserId(message.author.id),
            author_name: message.author.display_name().to_string(),
            content: message.content,
            timestamp: message.timestamp.timestamp_millis(),
            reply_to: message.message_reference.and_then(|r| r.message_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InviteGuildResponse {
    pub id: GuildId,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteResponse {
    pub code: String,
    pub guild: Option<InviteGuildResponse>,
}

/// Body of `POST /channels/{id}/messages`.
#[derive(Debug, Serialize)]
pub struct CreateMessageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<EmbedRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReferenceRequest>,
}

#[derive(Debug, Serialize)]
pub struct EmbedRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MessageReferenceRequest {
    pub message_id: MessageId,
    /// Lets a reply go through when the referenced message was deleted.
    pub fail_if_not_exists: bool,
}

impl From<EmbedSpec> for EmbedRequest {
    fn from(embed: EmbedSpec) -> Self {
        Self {
            title: embed.title,
            description: embed.description,
            color: embed.color,
        }
    }
}

impl From<OutgoingMessage> for CreateMessageRequest {
    fn from(message: OutgoingMessage) -> Self {
        let (content, embeds) = match message.body {
            OutgoingBody::Text(text) => (Some(text), Vec::new()),
            OutgoingBody::Embed(embed) => (None, vec![embed.into()]),
        };

        Self {
            content,
            embeds,
            message_reference: message.reply_to.map(|message_id| MessageReferenceRequest {
                message_id,
                fail_if_not_exists: false,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatedMessageResponse {
    pub id: MessageId,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::entities::SendOptions;

    #[test]
    fn test_history_message_from_response() {
        let response: MessageResponse = serde_json::from_value(json!({
            "id": "200",
            "channel_id": "10",
            "author": {"id": "7", "username": "alice", "global_name": "Alice", "discriminator": "0"},
            "content": "hello",
            "timestamp": "2024-05-01T12:00:00.000000+00:00",
            "message_reference": {"message_id": "150", "channel_id": "10"}
        }))
        .unwrap();

        let message = HistoryMessage::from(response);
        assert_eq!(message.id, MessageId(200));
        assert_eq!(message.author_name, "Alice");
        assert_eq!(message.reply_to, Some(MessageId(150)));
        assert_eq!(message.timestamp, 1_714_564_800_000);
    }

    #[test]
    fn test_channel_info_from_response() {
        let response: ChannelResponse =
            serde_json::from_value(json!({"id": "5", "type": 1})).unwrap();
        let info = ChannelInfo::from(response);
        assert_eq!(info.kind, ChannelKind::Dm);
        assert!(info.guild_id.is_none());
    }

    #[test]
    fn test_text_request_body() {
        let request = CreateMessageRequest::from(OutgoingMessage::from_content(
            "hi",
            SendOptions::default(),
        ));
        assert_eq!(serde_json::to_value(request).unwrap(), json!({"content": "hi"}));
    }

    #[test]
    fn test_embed_reply_request_body() {
        let options = SendOptions::default()
            .with_embed(EmbedSpec {
                title: Some("Build".into()),
                description: None,
                color: Some(255),
            })
            .with_reply(MessageId(9));
        let request = CreateMessageRequest::from(OutgoingMessage::from_content("green", options));

        assert_eq!(
            serde_json::to_value(request).unwrap(),
            json!({
                "embeds": [{"title": "Build", "description": "green", "color": 255}],
                "message_reference": {"message_id": "9", "fail_if_not_exists": false}
            })
        );
    }
}

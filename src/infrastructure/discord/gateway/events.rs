//! Dispatch events the adapter acts on, parsed from raw gateway frames.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{GatewayError, GatewayResult};
use super::payloads::{
    ChannelPayload, GatewayMessage, GuildPayload, HelloPayload,
    MessagePayload, ReadyPayload, UnavailableGuildPayload, UserPayload,
};
use crate::domain::entities::{
    BotIdentity, ChannelId, ChannelKind, ChannelSummary, Guild, GuildId, MessageAuthor, RawMessage,
};

#[derive(Debug, Clone)]
pub enum DispatchEvent {
    Ready {
        session_id: String,
        resume_gateway_url: Option<String>,
        identity: BotIdentity,
        /// Guilds the bot belongs to, announced before their GUILD_CREATE.
        guild_ids: Vec<GuildId>,
    },
    Resumed,
    MessageCreate(RawMessage),
    GuildCreate(Guild),
    GuildUpdate {
        guild_id: GuildId,
        name: String,
    },
    GuildDelete {
        guild_id: GuildId,
        unavailable: bool,
    },
    ChannelUpsert {
        guild_id: GuildId,
        channel: ChannelSummary,
    },
    ChannelDelete {
        guild_id: GuildId,
        channel_id: ChannelId,
    },
    /// Events outside the adapter's interest, including DM channel lifecycle.
    Other {
        event_type: String,
    },
}

impl DispatchEvent {
    #[must_use]
    pub fn event_name(&self) -> &str {
        match self {
            Self::Ready { .. } => "READY",
            Self::Resumed => "RESUMED",
            Self::MessageCreate(_) => "MESSAGE_CREATE",
            Self::GuildCreate(_) => "GUILD_CREATE",
            Self::GuildUpdate { .. } => "GUILD_UPDATE",
            Self::GuildDelete { .. } => "GUILD_DELETE",
            Self::ChannelUpsert { .. } => "CHANNEL_UPSERT",
            Self::ChannelDelete { .. } => "CHANNEL_DELETE",
            Self::Other { event_type } => event_type,
        }
    }
}

pub struct EventParser;

impl EventParser {
    pub fn parse_message(json: &str) -> GatewayResult<GatewayMessage> {
        serde_json::from_str(json).map_err(|e| GatewayError::serialization(e.to_string()))
    }

    pub fn parse_hello(data: Option<Value>) -> GatewayResult<HelloPayload> {
        let data = data.ok_or_else(|| GatewayError::protocol("Hello missing data"))?;
        decode("Hello", data)
    }

    pub fn parse_dispatch(event_type: &str, data: Option<Value>) -> GatewayResult<DispatchEvent> {
        if event_type == "RESUMED" {
            return Ok(DispatchEvent::Resumed);
        }

        let data = data.ok_or_else(|| GatewayError::protocol("Missing dispatch data"))?;

        match event_type {
            "READY" => Self::parse_ready(data),
            "MESSAGE_CREATE" => Ok(DispatchEvent::MessageCreate(to_raw_message(decode(
                event_type, data,
            )?))),
            "GUILD_CREATE" => Ok(Self::parse_guild_create(decode(event_type, data)?)),
            "GUILD_UPDATE" => {
                let guild: GuildPayload = decode(event_type, data)?;
                Ok(DispatchEvent::GuildUpdate {
                    guild_id: guild.id,
                    name: guild.name,
                })
            }
            "GUILD_DELETE" => {
                let payload: UnavailableGuildPayload = decode(event_type, data)?;
                Ok(DispatchEvent::GuildDelete {
                    guild_id: payload.id,
                    unavailable: payload.unavailable,
                })
            }
            "CHANNEL_CREATE" | "CHANNEL_UPDATE" => {
                let channel: ChannelPayload = decode(event_type, data)?;
                Ok(match channel.guild_id {
                    Some(guild_id) => DispatchEvent::ChannelUpsert {
                        guild_id,
                        channel: to_channel_summary(channel),
                    },
                    None => DispatchEvent::Other {
                        event_type: event_type.to_string(),
                    },
                })
            }
            "CHANNEL_DELETE" => {
                let channel: ChannelPayload = decode(event_type, data)?;
                Ok(match channel.guild_id {
                    Some(guild_id) => DispatchEvent::ChannelDelete {
                        guild_id,
                        channel_id: channel.id,
                    },
                    None => DispatchEvent::Other {
                        event_type: event_type.to_string(),
                    },
                })
            }
            _ => Ok(DispatchEvent::Other {
                event_type: event_type.to_string(),
            }),
        }
    }

    fn parse_ready(data: Value) -> GatewayResult<DispatchEvent> {
        let ready: ReadyPayload = decode("Ready", data)?;
        let UserPayload {
            id,
            username,
            discriminator,
            ..
        } = ready.user;

        Ok(DispatchEvent::Ready {
            session_id: ready.session_id,
            resume_gateway_url: ready.resume_gateway_url,
            identity: BotIdentity::new(id, username, discriminator),
            guild_ids: ready.guilds.into_iter().map(|g| g.id).collect(),
        })
    }

    fn parse_guild_create(payload: GuildPayload) -> DispatchEvent {
        if payload.unavailable {
            return DispatchEvent::GuildDelete {
                guild_id: payload.id,
                unavailable: true,
            };
        }

        let channels = payload
            .channels
            .into_iter()
            .map(to_channel_summary)
            .collect();

        DispatchEvent::GuildCreate(
            Guild::new(payload.id, payload.name)
                .with_member_count(payload.member_count)
                .with_channels(channels),
        )
    }
}

fn decode<T: DeserializeOwned>(what: &str, data: Value) -> GatewayResult<T> {
    serde_json::from_value(data)
        .map_err(|e| GatewayError::serialization(format!("Failed to parse {what}: {e}")))
}

fn to_channel_summary(channel: ChannelPayload) -> ChannelSummary {
    let summary = ChannelSummary::new(
        channel.id,
        channel.name.unwrap_or_default(),
        ChannelKind::from(channel.kind),
    );
    match channel.topic.filter(|t| !t.is_empty()) {
        Some(topic) => summary.with_topic(topic),
        None => summary,
    }
}

/// Converts a `MESSAGE_CREATE` payload. Guild and channel names are left for
/// the guild cache to fill in.
fn to_raw_message(payload: MessagePayload) -> RawMessage {
    let display_name = payload
        .member
        .and_then(|m| m.nick)
        .or(payload.author.global_name);

    let mut author = MessageAuthor::new(payload.author.id, payload.author.username);
    if let Some(name) = display_name {
        author = author.with_display_name(name);
    }
    if payload.author.bot {
        author = author.as_bot();
    }

    let timestamp = DateTime::parse_from_rfc3339(&payload.timestamp)
        .map_or_else(|_| Utc::now(), |t| t.with_timezone(&Utc));

    let mut message = RawMessage::new(payload.id, author, payload.channel_id, payload.content)
        .with_mentions(payload.mentions.into_iter().map(|m| m.id).collect())
        .at(timestamp);
    message.guild_id = payload.guild_id;
    if let Some(reply_to) = payload.message_reference.and_then(|r| r.message_id) {
        message = message.replying_to(reply_to);
    }
    message
}

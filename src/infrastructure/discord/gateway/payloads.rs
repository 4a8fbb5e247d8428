use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::constants::{CLIENT_NAME, CLIENT_OS, GatewayOpcode, LARGE_THRESHOLD};
use crate::domain::entities::{ChannelId, GuildId, MessageId, UserId};

/// Outbound gateway frame.
#[derive(Debug, Serialize)]
pub struct GatewayPayload {
    pub op: u8,
    pub d: Value,
}

impl GatewayPayload {
    fn frame(opcode: GatewayOpcode, data: impl Serialize) -> Self {
        Self {
            op: opcode.code(),
            d: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// Heartbeat carrying the last sequence seen, or null before any dispatch.
    #[must_use]
    pub fn heartbeat(sequence: Option<u64>) -> Self {
        Self::frame(GatewayOpcode::Heartbeat, sequence)
    }

    #[must_use]
    pub fn identify(token: &str, intents: u32) -> Self {
        Self::frame(
            GatewayOpcode::Identify,
            IdentifyData {
                token,
                properties: IdentifyProperties::CLIENT,
                large_threshold: LARGE_THRESHOLD,
                intents,
            },
        )
    }

    #[must_use]
    pub fn resume(token: &str, session_id: &str, seq: u64) -> Self {
        Self::frame(
            GatewayOpcode::Resume,
            ResumeData {
                token,
                session_id,
                seq,
            },
        )
    }
}

#[derive(Debug, Serialize)]
struct IdentifyData<'a> {
    token: &'a str,
    properties: IdentifyProperties,
    large_threshold: u16,
    intents: u32,
}

#[derive(Debug, Serialize)]
struct IdentifyProperties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

impl IdentifyProperties {
    const CLIENT: Self = Self {
        os: CLIENT_OS,
        browser: CLIENT_NAME,
        device: CLIENT_NAME,
    };
}

#[derive(Debug, Serialize)]
struct ResumeData<'a> {
    token: &'a str,
    session_id: &'a str,
    seq: u64,
}

/// Inbound gateway frame.
#[derive(Debug, Deserialize)]
pub struct GatewayMessage {
    pub op: u8,
    pub d: Option<Value>,
    pub s: Option<u64>,
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReadyPayload {
    pub session_id: String,
    pub resume_gateway_url: Option<String>,
    pub user: UserPayload,
    /// Stubs only; full guilds follow as GUILD_CREATE.
    #[serde(default)]
    pub guilds: Vec<UnavailableGuildPayload>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Deserialize)]
pub struct MemberPayload {
    pub nick: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MentionPayload {
    pub id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct MessageReferencePayload {
    pub message_id: Option<MessageId>,
}

#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub author: UserPayload,
    pub member: Option<MemberPayload>,
    #[serde(default)]
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub mentions: Vec<MentionPayload>,
    pub message_reference: Option<MessageReferencePayload>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelPayload {
    pub id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: u8,
    pub topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuildPayload {
    pub id: GuildId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub member_count: u64,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
}

#[derive(Debug, Deserialize)]
pub struct UnavailableGuildPayload {
    pub id: GuildId,
    #[serde(default)]
    pub unavailable: bool,
}

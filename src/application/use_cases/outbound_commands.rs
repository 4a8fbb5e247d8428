//! Outbound operations against the live connection.

use std::sync::Arc;

use tracing::{debug, info};

use super::connection_manager::{ConnectionContext, ConnectionManager};
use crate::domain::entities::{
    ChannelId, ChannelInfo, ChannelSummary, Guild, GuildId, GuildSummary, HistoryMessage,
    InviteCode, JoinReport, MessageId, OutgoingMessage, SendOptions,
};
use crate::domain::errors::{AdapterError, AdapterResult};

/// Upper bound for `read_messages`.
pub const READ_LIMIT_MAX: u8 = 50;
/// How many recent messages `search_messages` scans.
pub const SEARCH_DEPTH: u8 = 100;

/// Send, read, search, list, and join. Every call requires a ready connection
/// and fails with `NotConnected` before touching the network otherwise.
#[derive(Clone)]
pub struct OutboundCommands {
    connection: Arc<ConnectionManager>,
}

impl OutboundCommands {
    #[must_use]
    pub const fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }

    fn context(&self) -> AdapterResult<Arc<ConnectionContext>> {
        self.connection.context()
    }

    /// # Errors
    ///
    /// Returns `NotConnected` unless ready.
    pub fn list_servers(&self) -> AdapterResult<Vec<GuildSummary>> {
        let context = self.context()?;
        Ok(context
            .session()
            .guilds()
            .iter()
            .map(Guild::summary)
            .collect())
    }

    /// Text, announcement, and forum channels of a server the bot belongs to.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` unless ready, `NotFound` for an unknown server.
    pub fn list_channels(&self, server_id: GuildId) -> AdapterResult<Vec<ChannelSummary>> {
        let context = self.context()?;
        let guild = context
            .session()
            .guilds()
            .into_iter()
            .find(|g| g.id() == server_id)
            .ok_or_else(|| AdapterError::server_not_found(server_id))?;

        Ok(guild
            .channels()
            .iter()
            .filter(|c| c.kind.is_listed_text())
            .cloned()
            .collect())
    }

    /// Sends plain text, or an embed when `options` asks for one.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` unless ready, `ChannelNotFound` if the channel cannot
    /// be resolved or written to, `TransientPlatform` for anything else.
    pub async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
        options: SendOptions,
    ) -> AdapterResult<MessageId> {
        let context = self.context()?;
        resolve_text_channel(&context, channel_id).await?;

        let message = OutgoingMessage::from_content(content, options);
        let id = context.session().send_message(channel_id, message).await?;

        info!(channel_id = %channel_id, message_id = %id, "Message sent");
        Ok(id)
    }

    /// Most recent messages, oldest first. `limit` is capped at 50; zero
    /// returns nothing without touching history.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` unless ready, `ChannelNotFound` if unresolvable.
    pub async fn read_messages(
        &self,
        channel_id: ChannelId,
        limit: usize,
    ) -> AdapterResult<Vec<HistoryMessage>> {
        let context = self.context()?;
        resolve_text_channel(&context, channel_id).await?;

        let limit = clamp_limit(limit, READ_LIMIT_MAX);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut messages = context.session().fetch_messages(channel_id, limit).await?;
        messages.reverse();

        debug!(channel_id = %channel_id, count = messages.len(), "Read channel history");
        Ok(messages)
    }

    /// Case-insensitive substring search over the last 100 messages.
    ///
    /// Results stay newest first, unlike `read_messages`.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` unless ready, `ChannelNotFound` if unresolvable.
    pub async fn search_messages(
        &self,
        channel_id: ChannelId,
        query: &str,
        limit: usize,
    ) -> AdapterResult<Vec<HistoryMessage>> {
        let context = self.context()?;
        resolve_text_channel(&context, channel_id).await?;

        let needle = query.to_lowercase();
        let matches: Vec<HistoryMessage> = context
            .session()
            .fetch_messages(channel_id, SEARCH_DEPTH)
            .await?
            .into_iter()
            .filter(|m| m.content.to_lowercase().contains(&needle))
            .take(limit)
            .collect();

        debug!(channel_id = %channel_id, query, count = matches.len(), "Searched channel history");
        Ok(matches)
    }

    /// Resolves an invite code or URL and reports membership.
    ///
    /// Bots cannot accept invites, so a successful report for a server the bot is
    /// not in carries an advisory `error` with an authorization URL instead.
    ///
    /// # Errors
    ///
    /// Returns `NotConnected` unless ready, `InvalidInvite` for an unparseable or
    /// unknown invite.
    pub async fn join_via_invite(&self, invite: &str) -> AdapterResult<JoinReport> {
        let context = self.context()?;
        let code = InviteCode::parse(invite)
            .ok_or_else(|| AdapterError::invalid_invite(format!("'{invite}' is not an invite")))?;

        let resolved = context.session().fetch_invite(&code).await?;
        let already_member = context
            .session()
            .guilds()
            .iter()
            .any(|g| g.id() == resolved.guild_id);

        info!(
            code = %code,
            guild_id = %resolved.guild_id,
            already_member,
            "Resolved invite"
        );

        Ok(if already_member {
            JoinReport::already_member(&resolved)
        } else {
            JoinReport::requires_authorization(&resolved, context.identity().id())
        })
    }
}

async fn resolve_text_channel(
    context: &ConnectionContext,
    channel_id: ChannelId,
) -> AdapterResult<ChannelInfo> {
    let channel = context.session().fetch_channel(channel_id).await?;
    if channel.kind.is_writable() {
        Ok(channel)
    } else {
        Err(AdapterError::channel_not_found(channel_id))
    }
}

fn clamp_limit(limit: usize, max: u8) -> u8 {
    u8::try_from(limit).map_or(max, |limit| limit.min(max))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::application::dto::AdapterSettings;
    use crate::application::services::{DedupCache, InboxStore, Ingestor};
    use crate::domain::entities::{
        AuthToken, ChannelKind, EmbedSpec, InviteInfo, OutgoingBody, UserId,
    };
    use crate::domain::ports::mocks::{MockConnector, MockSession, ReadyBehavior};
    use crate::domain::ports::MockCredentialSource;

    const GENERAL: ChannelId = ChannelId(10);
    const CATEGORY: ChannelId = ChannelId(11);
    const GUILD: GuildId = GuildId(1);

    struct Fixture {
        commands: OutboundCommands,
        manager: Arc<ConnectionManager>,
        session: Arc<MockSession>,
    }

    fn history(ids: std::ops::RangeInclusive<u64>, text: &str) -> Vec<HistoryMessage> {
        ids.rev()
            .map(|id| HistoryMessage {
                id: MessageId(id),
                author_id: UserId(7),
                author_name: "alice".into(),
                content: format!("{text} {id}"),
                timestamp: Utc::now().timestamp_millis(),
                reply_to: None,
            })
            .collect()
    }

    fn fixture() -> Fixture {
        let connector = Arc::new(MockConnector::new(ReadyBehavior::Immediate));
        let session = connector.session();
        session.add_guild(
            Guild::new(GUILD, "Rustaceans")
                .with_member_count(42)
                .with_channels(vec![
                    ChannelSummary::new(GENERAL, "general", ChannelKind::Text)
                        .with_topic("chat"),
                    ChannelSummary::new(CATEGORY, "Info", ChannelKind::Category),
                    ChannelSummary::new(ChannelId(12), "news", ChannelKind::Announcement),
                    ChannelSummary::new(ChannelId(13), "help", ChannelKind::Forum),
                    ChannelSummary::new(ChannelId(14), "Lounge", ChannelKind::Voice),
                ]),
        );
        session.add_channel(ChannelInfo {
            id: GENERAL,
            kind: ChannelKind::Text,
            name: Some("general".into()),
            guild_id: Some(GUILD),
        });
        session.add_channel(ChannelInfo {
            id: CATEGORY,
            kind: ChannelKind::Category,
            name: Some("Info".into()),
            guild_id: Some(GUILD),
        });

        let mut credentials = MockCredentialSource::new();
        credentials
            .expect_credential()
            .returning(|| AuthToken::new("test.bot.token"));

        let manager = Arc::new(ConnectionManager::new(
            connector,
            Arc::new(credentials),
            Arc::new(Ingestor::new(
                DedupCache::default(),
                Arc::new(InboxStore::default()),
            )),
            AdapterSettings::default(),
        ));

        Fixture {
            commands: OutboundCommands::new(manager.clone()),
            manager,
            session,
        }
    }

    async fn connected() -> Fixture {
        let fixture = fixture();
        fixture.manager.connect().await.unwrap();
        fixture
    }

    #[tokio::test]
    async fn test_every_command_requires_connection() {
        let f = fixture();

        assert_eq!(f.commands.list_servers(), Err(AdapterError::NotConnected));
        assert_eq!(f.commands.list_channels(GUILD), Err(AdapterError::NotConnected));
        assert_err!(f.commands.send_message(GENERAL, "x", SendOptions::default()).await);
        assert_err!(f.commands.read_messages(GENERAL, 5).await);
        assert_err!(f.commands.search_messages(GENERAL, "x", 5).await);
        assert_eq!(
            f.commands.join_via_invite("abc").await,
            Err(AdapterError::NotConnected)
        );
        assert_eq!(f.session.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_list_servers() {
        let f = connected().await;
        let servers = assert_ok!(f.commands.list_servers());

        assert_eq!(
            servers,
            vec![GuildSummary {
                id: GUILD,
                name: "Rustaceans".into(),
                member_count: 42,
                channel_count: 5,
                unavailable: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_list_channels_filters_text_capable() {
        let f = connected().await;
        let channels = f.commands.list_channels(GUILD).unwrap();

        let names: Vec<&str> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["general", "news", "help"]);
        assert_eq!(channels[0].topic.as_deref(), Some("chat"));
    }

    #[tokio::test]
    async fn test_list_channels_unknown_server() {
        let f = connected().await;
        assert_eq!(
            f.commands.list_channels(GuildId(999)),
            Err(AdapterError::server_not_found(999))
        );
    }

    #[tokio::test]
    async fn test_send_message_with_embed_and_reply() {
        let f = connected().await;
        let options = SendOptions::default()
            .with_embed(EmbedSpec {
                title: Some("Status".into()),
                description: None,
                color: Some(0xff0000),
            })
            .with_reply(MessageId(3));

        let id = f.commands.send_message(GENERAL, "down", options).await.unwrap();

        let sent = f.session.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, GENERAL);
        assert_eq!(sent[0].1.reply_to, Some(MessageId(3)));
        assert!(matches!(sent[0].1.body, OutgoingBody::Embed(_)));
        assert_eq!(id, MessageId(9000));
    }

    #[tokio::test]
    async fn test_send_to_unknown_or_unwritable_channel() {
        let f = connected().await;

        assert_eq!(
            f.commands
                .send_message(ChannelId(404), "x", SendOptions::default())
                .await,
            Err(AdapterError::channel_not_found(404))
        );
        assert_eq!(
            f.commands
                .send_message(CATEGORY, "x", SendOptions::default())
                .await,
            Err(AdapterError::channel_not_found(CATEGORY))
        );
        assert!(f.session.sent().is_empty());
    }

    #[tokio::test]
    async fn test_read_messages_clamps_and_is_chronological() {
        let f = connected().await;
        f.session.set_history(GENERAL, history(1..=120, "msg"));

        let messages = f.commands.read_messages(GENERAL, 1000).await.unwrap();

        assert_eq!(f.session.fetch_limits(), vec![50]);
        assert_eq!(messages.len(), 50);
        assert_eq!(messages.first().unwrap().id, MessageId(71));
        assert_eq!(messages.last().unwrap().id, MessageId(120));
    }

    #[tokio::test]
    async fn test_read_zero_messages_skips_fetch() {
        let f = connected().await;
        f.session.set_history(GENERAL, history(1..=10, "msg"));

        let messages = f.commands.read_messages(GENERAL, 0).await.unwrap();

        assert!(messages.is_empty());
        assert!(f.session.fetch_limits().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_newest_first_within_last_hundred() {
        let f = connected().await;
        let mut messages = history(101..=150, "Deploy done");
        messages.extend(history(1..=100, "deploy old"));
        f.session.set_history(GENERAL, messages);

        let results = f.commands.search_messages(GENERAL, "DEPLOY", 5).await.unwrap();
        let read = f.commands.read_messages(GENERAL, 5).await.unwrap();

        assert_eq!(f.session.fetch_limits(), vec![100, 5]);
        let ids: Vec<u64> = results.iter().map(|m| m.id.as_u64()).collect();
        assert_eq!(ids, vec![150, 149, 148, 147, 146]);
        let read_ids: Vec<u64> = read.iter().map(|m| m.id.as_u64()).collect();
        assert_eq!(read_ids, vec![146, 147, 148, 149, 150]);
    }

    #[tokio::test]
    async fn test_search_never_sees_beyond_depth() {
        let f = connected().await;
        let mut messages = history(11..=110, "noise");
        messages.extend(history(1..=10, "needle"));
        f.session.set_history(GENERAL, messages);

        let results = f.commands.search_messages(GENERAL, "needle", 50).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_join_when_already_member() {
        let f = connected().await;
        f.session.add_invite(InviteInfo {
            code: InviteCode::parse("rust").unwrap(),
            guild_id: GUILD,
            guild_name: "Rustaceans".into(),
        });

        let report = f
            .commands
            .join_via_invite("https://discord.gg/rust")
            .await
            .unwrap();

        assert!(report.success);
        assert!(report.already_member);
        assert_eq!(report.guild_id, GUILD);
        assert!(report.error.unwrap().contains("already in this server"));
    }

    #[tokio::test]
    async fn test_join_new_server_is_advisory() {
        let f = connected().await;
        f.session.add_invite(InviteInfo {
            code: InviteCode::parse("other").unwrap(),
            guild_id: GuildId(77),
            guild_name: "Elsewhere".into(),
        });

        let report = f.commands.join_via_invite("other").await.unwrap();

        assert!(report.success);
        assert!(!report.already_member);
        assert_eq!(report.guild_id, GuildId(77));
        assert!(report.authorize_url.unwrap().contains("client_id=1000"));
        assert!(report.error.is_some());
    }

    #[tokio::test]
    async fn test_join_invalid_invite() {
        let f = connected().await;

        assert!(matches!(
            f.commands.join_via_invite("not an invite").await,
            Err(AdapterError::InvalidInvite { .. })
        ));
        assert!(matches!(
            f.commands.join_via_invite("missing").await,
            Err(AdapterError::InvalidInvite { .. })
        ));
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(1000, READ_LIMIT_MAX), 50);
        assert_eq!(clamp_limit(0, READ_LIMIT_MAX), 0);
        assert_eq!(clamp_limit(20, READ_LIMIT_MAX), 20);
    }
}

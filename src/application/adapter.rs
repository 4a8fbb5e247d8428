//! Adapter facade exposing the full operation surface to a host.

use std::sync::Arc;

use super::dto::{AdapterSettings, StatusReport};
use super::services::{DedupCache, InboxStore, Ingestor};
use super::use_cases::{ConnectionManager, OutboundCommands, StatusReporter};
use crate::domain::ConnectionState;
use crate::domain::entities::{
    ChannelId, ChannelSummary, GuildId, GuildSummary, HistoryMessage, InboxItem, InboxPeek,
    JoinReport, MessageId, SendOptions,
};
use crate::domain::errors::AdapterResult;
use crate::domain::ports::{CredentialSource, PlatformConnector};

/// Items returned by `drain_inbox` when the caller gives no limit.
pub const DEFAULT_DRAIN_LIMIT: usize = 10;

/// One bot connection with its inbox and command surface.
///
/// The inbox and dedup history belong to the adapter, not the connection, so
/// they survive reconnects.
pub struct GatewayAdapter {
    connection: Arc<ConnectionManager>,
    commands: OutboundCommands,
    status: StatusReporter,
    inbox: Arc<InboxStore>,
}

impl GatewayAdapter {
    #[must_use]
    pub fn new(
        connector: Arc<dyn PlatformConnector>,
        credentials: Arc<dyn CredentialSource>,
        settings: AdapterSettings,
    ) -> Self {
        let inbox = Arc::new(InboxStore::new(settings.inbox_capacity));
        let dedup = DedupCache::new(settings.dedup_capacity, settings.dedup_evict_batch);
        let ingestor = Arc::new(Ingestor::new(dedup, inbox.clone()));
        let connection = Arc::new(ConnectionManager::new(
            connector,
            credentials,
            ingestor,
            settings,
        ));

        Self {
            commands: OutboundCommands::new(connection.clone()),
            status: StatusReporter::new(connection.clone(), inbox.clone()),
            connection,
            inbox,
        }
    }

    /// # Errors
    ///
    /// See [`ConnectionManager::connect`].
    pub async fn connect(&self) -> AdapterResult<String> {
        self.connection.connect().await
    }

    pub async fn disconnect(&self) {
        self.connection.disconnect().await;
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    #[must_use]
    pub fn status(&self) -> StatusReport {
        self.status.report()
    }

    /// Removes up to `limit` items (default 10) from the front of the inbox.
    #[must_use]
    pub fn drain_inbox(&self, limit: Option<usize>) -> Vec<InboxItem> {
        self.inbox.drain(limit.unwrap_or(DEFAULT_DRAIN_LIMIT))
    }

    #[must_use]
    pub fn peek_inbox(&self) -> InboxPeek {
        self.inbox.peek()
    }

    /// # Errors
    ///
    /// Returns `NotConnected` unless ready.
    pub fn list_servers(&self) -> AdapterResult<Vec<GuildSummary>> {
        self.commands.list_servers()
    }

    /// # Errors
    ///
    /// See [`OutboundCommands::list_channels`].
    pub fn list_channels(&self, server_id: GuildId) -> AdapterResult<Vec<ChannelSummary>> {
        self.commands.list_channels(server_id)
    }

    /// # Errors
    ///
    /// See [`OutboundCommands::send_message`].
    pub async fn send_message(
        &self,
        channel_id: ChannelId,
        content: &str,
        options: SendOptions,
    ) -> AdapterResult<MessageId> {
        self.commands.send_message(channel_id, content, options).await
    }

    /// # Errors
    ///
    /// See [`OutboundCommands::read_messages`].
    pub async fn read_messages(
        &self,
        channel_id: ChannelId,
        limit: usize,
    ) -> AdapterResult<Vec<HistoryMessage>> {
        self.commands.read_messages(channel_id, limit).await
    }

    /// # Errors
    ///
    /// See [`OutboundCommands::search_messages`].
    pub async fn search_messages(
        &self,
        channel_id: ChannelId,
        query: &str,
        limit: usize,
    ) -> AdapterResult<Vec<HistoryMessage>> {
        self.commands
            .search_messages(channel_id, query, limit)
            .await
    }

    /// # Errors
    ///
    /// See [`OutboundCommands::join_via_invite`].
    pub async fn join_via_invite(&self, invite: &str) -> AdapterResult<JoinReport> {
        self.commands.join_via_invite(invite).await
    }
}

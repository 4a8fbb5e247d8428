//! Discord implementation of the platform ports.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::gateway::{GatewayRunner, GuildCache, RunnerConfig, WebSocketConnection};
use super::rest::DiscordRestClient;
use crate::domain::entities::{
    AuthToken, ChannelId, ChannelInfo, Guild, HistoryMessage, InviteCode, InviteInfo, MessageId,
    OutgoingMessage,
};
use crate::domain::errors::AdapterResult;
use crate::domain::ports::{InboundEvent, PendingLogin, PlatformConnector, PlatformSession};

const RUNNER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Logs in over REST, then hands the gateway to a background runner.
pub struct DiscordConnector {
    rest: Arc<DiscordRestClient>,
    runner_config: RunnerConfig,
}

impl DiscordConnector {
    #[must_use]
    pub fn new(rest: DiscordRestClient) -> Self {
        Self::with_runner_config(rest, RunnerConfig::default())
    }

    #[must_use]
    pub fn with_runner_config(rest: DiscordRestClient, runner_config: RunnerConfig) -> Self {
        Self {
            rest: Arc::new(rest),
            runner_config,
        }
    }
}

#[async_trait]
impl PlatformConnector for DiscordConnector {
    async fn login(
        &self,
        token: &AuthToken,
        events: mpsc::Sender<InboundEvent>,
    ) -> AdapterResult<PendingLogin> {
        let account = self.rest.current_user(token).await?;
        info!(user = %account.tag(), token = %token.masked(), "Token accepted, opening gateway");

        let cache = Arc::new(GuildCache::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = oneshot::channel();

        let runner = GatewayRunner::new(
            WebSocketConnection::new(),
            self.runner_config.clone(),
            token.clone(),
            Arc::clone(&cache),
            events,
            ready_tx,
            shutdown_rx,
        );
        let task = tokio::spawn(runner.run());

        let session = DiscordSession::new(
            Arc::clone(&self.rest),
            token.clone(),
            cache,
            shutdown_tx,
            task,
        );

        Ok(PendingLogin {
            session: Arc::new(session),
            ready: ready_rx,
        })
    }
}

pub struct DiscordSession {
    rest: Arc<DiscordRestClient>,
    token: AuthToken,
    cache: Arc<GuildCache>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DiscordSession {
    fn new(
        rest: Arc<DiscordRestClient>,
        token: AuthToken,
        cache: Arc<GuildCache>,
        shutdown: watch::Sender<bool>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            rest,
            token,
            cache,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }
}

#[async_trait]
impl PlatformSession for DiscordSession {
    fn guilds(&self) -> Vec<Guild> {
        self.cache.guilds()
    }

    fn guild_count(&self) -> usize {
        self.cache.len()
    }

    async fn fetch_channel(&self, channel_id: ChannelId) -> AdapterResult<ChannelInfo> {
        self.rest.channel(&self.token, channel_id).await
    }

    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: OutgoingMessage,
    ) -> AdapterResult<MessageId> {
        self.rest.create_message(&self.token, channel_id, message).await
    }

    async fn fetch_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> AdapterResult<Vec<HistoryMessage>> {
        self.rest.messages(&self.token, channel_id, limit).await
    }

    async fn fetch_invite(&self, code: &InviteCode) -> AdapterResult<InviteInfo> {
        self.rest.invite(&self.token, code).await
    }

    async fn close(&self) {
        let _ = self.shutdown.send(true);

        let task = self.task.lock().take();
        let Some(task) = task else {
            return;
        };

        let abort = task.abort_handle();
        if timeout(RUNNER_STOP_TIMEOUT, task).await.is_err() {
            warn!("Gateway runner did not stop in time, aborting");
            abort.abort();
        }
        debug!("Discord session closed");
    }
}

impl Drop for DiscordSession {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

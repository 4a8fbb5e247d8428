//! Chat platform port definitions.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::domain::entities::{
    AuthToken, BotIdentity, ChannelId, ChannelInfo, Guild, HistoryMessage, InviteCode,
    InviteInfo, MessageId, OutgoingMessage, RawMessage,
};
use crate::domain::errors::AdapterResult;

/// Event pushed by the transport into the ingestion channel.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Message(RawMessage),
    Warning(String),
    Error(String),
}

/// A login in flight: the session handle plus its ready signal.
pub struct PendingLogin {
    pub session: Arc<dyn PlatformSession>,
    pub ready: oneshot::Receiver<AdapterResult<BotIdentity>>,
}

/// Port for establishing a platform connection.
#[async_trait]
pub trait PlatformConnector: Send + Sync {
    /// Starts a login. Inbound events are pushed into `events` until the session closes.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::LoginFailure` if the login cannot be started.
    async fn login(
        &self,
        token: &AuthToken,
        events: mpsc::Sender<InboundEvent>,
    ) -> AdapterResult<PendingLogin>;
}

/// Live connection handle used by the outbound command surface.
#[async_trait]
pub trait PlatformSession: Send + Sync {
    /// Guilds the connection currently belongs to.
    fn guilds(&self) -> Vec<Guild>;

    fn guild_count(&self) -> usize {
        self.guilds().len()
    }

    async fn fetch_channel(&self, channel_id: ChannelId) -> AdapterResult<ChannelInfo>;

    async fn send_message(
        &self,
        channel_id: ChannelId,
        message: OutgoingMessage,
    ) -> AdapterResult<MessageId>;

    /// Most recent messages, newest first, as the platform returns them.
    async fn fetch_messages(
        &self,
        channel_id: ChannelId,
        limit: u8,
    ) -> AdapterResult<Vec<HistoryMessage>>;

    async fn fetch_invite(&self, code: &InviteCode) -> AdapterResult<InviteInfo>;

    /// Stops event delivery and closes the socket. Idempotent.
    async fn close(&self);
}

#[cfg(test)]
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::domain::entities::UserId;
    use crate::domain::errors::AdapterError;

    /// How the mock resolves the ready signal after `login`.
    #[derive(Debug, Clone)]
    pub enum ReadyBehavior {
        Immediate,
        Fail(String),
        /// Held until `MockConnector::resolve_ready` is called.
        Manual,
    }

    /// In-memory session recording every call.
    pub struct MockSession {
        guilds: Mutex<Vec<Guild>>,
        channels: Mutex<HashMap<ChannelId, ChannelInfo>>,
        history: Mutex<HashMap<ChannelId, Vec<HistoryMessage>>>,
        invites: Mutex<HashMap<String, InviteInfo>>,
        sent: Mutex<Vec<(ChannelId, OutgoingMessage)>>,
        fetch_limits: Mutex<Vec<u8>>,
        next_message_id: AtomicUsize,
        network_calls: AtomicUsize,
        closes: AtomicUsize,
    }

    impl MockSession {
        pub fn new() -> Self {
            Self {
                guilds: Mutex::new(Vec::new()),
                channels: Mutex::new(HashMap::new()),
                history: Mutex::new(HashMap::new()),
                invites: Mutex::new(HashMap::new()),
                sent: Mutex::new(Vec::new()),
                fetch_limits: Mutex::new(Vec::new()),
                next_message_id: AtomicUsize::new(9000),
                network_calls: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
            }
        }

        pub fn add_guild(&self, guild: Guild) {
            self.guilds.lock().push(guild);
        }

        pub fn add_channel(&self, channel: ChannelInfo) {
            self.channels.lock().insert(channel.id, channel);
        }

        /// Stores history in platform order (newest first).
        pub fn set_history(&self, channel_id: ChannelId, newest_first: Vec<HistoryMessage>) {
            self.history.lock().insert(channel_id, newest_first);
        }

        pub fn add_invite(&self, invite: InviteInfo) {
            self.invites
                .lock()
                .insert(invite.code.as_str().to_string(), invite);
        }

        pub fn sent(&self) -> Vec<(ChannelId, OutgoingMessage)> {
            self.sent.lock().clone()
        }

        pub fn fetch_limits(&self) -> Vec<u8> {
            self.fetch_limits.lock().clone()
        }

        pub fn network_calls(&self) -> usize {
            self.network_calls.load(Ordering::SeqCst)
        }

        pub fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }

        fn record_call(&self) {
            self.network_calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Default for MockSession {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PlatformSession for MockSession {
        fn guilds(&self) -> Vec<Guild> {
            self.guilds.lock().clone()
        }

        async fn fetch_channel(&self, channel_id: ChannelId) -> AdapterResult<ChannelInfo> {
            self.record_call();
            self.channels
                .lock()
                .get(&channel_id)
                .cloned()
                .ok_or_else(|| AdapterError::channel_not_found(channel_id))
        }

        async fn send_message(
            &self,
            channel_id: ChannelId,
            message: OutgoingMessage,
        ) -> AdapterResult<MessageId> {
            self.record_call();
            self.sent.lock().push((channel_id, message));
            let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
            Ok(MessageId(id as u64))
        }

        async fn fetch_messages(
            &self,
            channel_id: ChannelId,
            limit: u8,
        ) -> AdapterResult<Vec<HistoryMessage>> {
            self.record_call();
            self.fetch_limits.lock().push(limit);
            let history = self.history.lock();
            let messages = history
                .get(&channel_id)
                .ok_or_else(|| AdapterError::channel_not_found(channel_id))?;
            Ok(messages.iter().take(usize::from(limit)).cloned().collect())
        }

        async fn fetch_invite(&self, code: &InviteCode) -> AdapterResult<InviteInfo> {
            self.record_call();
            self.invites
                .lock()
                .get(code.as_str())
                .cloned()
                .ok_or_else(|| AdapterError::invalid_invite(format!("unknown invite {code}")))
        }

        async fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Connector handing out one shared `MockSession`.
    pub struct MockConnector {
        session: Arc<MockSession>,
        identity: BotIdentity,
        behavior: Mutex<ReadyBehavior>,
        login_error: Mutex<Option<AdapterError>>,
        pending_ready: Mutex<Option<oneshot::Sender<AdapterResult<BotIdentity>>>>,
        events: Mutex<Option<mpsc::Sender<InboundEvent>>>,
        logins: AtomicUsize,
    }

    impl MockConnector {
        pub fn new(behavior: ReadyBehavior) -> Self {
            Self {
                session: Arc::new(MockSession::new()),
                identity: BotIdentity::new(UserId(1000), "inboxbot", "0"),
                behavior: Mutex::new(behavior),
                login_error: Mutex::new(None),
                pending_ready: Mutex::new(None),
                events: Mutex::new(None),
                logins: AtomicUsize::new(0),
            }
        }

        pub fn session(&self) -> Arc<MockSession> {
            self.session.clone()
        }

        pub fn identity(&self) -> &BotIdentity {
            &self.identity
        }

        pub fn set_behavior(&self, behavior: ReadyBehavior) {
            *self.behavior.lock() = behavior;
        }

        pub fn fail_next_login(&self, error: AdapterError) {
            *self.login_error.lock() = Some(error);
        }

        /// Resolves a `Manual` ready signal. Returns false if nothing was pending.
        pub fn resolve_ready(&self) -> bool {
            self.pending_ready
                .lock()
                .take()
                .is_some_and(|tx| tx.send(Ok(self.identity.clone())).is_ok())
        }

        pub fn logins(&self) -> usize {
            self.logins.load(Ordering::SeqCst)
        }

        /// Pushes an event as the transport would.
        pub async fn push(&self, event: InboundEvent) {
            let tx = self.events.lock().clone();
            if let Some(tx) = tx {
                let _ = tx.send(event).await;
            }
        }
    }

    #[async_trait]
    impl PlatformConnector for MockConnector {
        async fn login(
            &self,
            _token: &AuthToken,
            events: mpsc::Sender<InboundEvent>,
        ) -> AdapterResult<PendingLogin> {
            self.logins.fetch_add(1, Ordering::SeqCst);

            if let Some(error) = self.login_error.lock().take() {
                return Err(error);
            }

            *self.events.lock() = Some(events);

            let (tx, rx) = oneshot::channel();
            match self.behavior.lock().clone() {
                ReadyBehavior::Immediate => {
                    let _ = tx.send(Ok(self.identity.clone()));
                }
                ReadyBehavior::Fail(message) => {
                    let _ = tx.send(Err(AdapterError::login(message)));
                }
                ReadyBehavior::Manual => {
                    *self.pending_ready.lock() = Some(tx);
                }
            }

            Ok(PendingLogin {
                session: self.session.clone(),
                ready: rx,
            })
        }
    }
}

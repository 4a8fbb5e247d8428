//! Connection lifecycle management.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::application::dto::AdapterSettings;
use crate::application::services::{Ingestor, MessageClassifier, spawn_ingest_task};
use crate::domain::ConnectionState;
use crate::domain::entities::BotIdentity;
use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::ports::{CredentialSource, PlatformConnector, PlatformSession};

/// Live connection handed to the outbound command surface.
pub struct ConnectionContext {
    session: Arc<dyn PlatformSession>,
    identity: BotIdentity,
}

impl ConnectionContext {
    #[must_use]
    pub fn session(&self) -> &dyn PlatformSession {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn identity(&self) -> &BotIdentity {
        &self.identity
    }
}

struct ActiveConnection {
    context: Arc<ConnectionContext>,
    ingest: JoinHandle<()>,
}

impl ActiveConnection {
    async fn shutdown(self) {
        self.ingest.abort();
        self.context.session.close().await;
    }
}

struct Inner {
    state: ConnectionState,
    active: Option<ActiveConnection>,
    /// Bumped by every disconnect so a stale attempt cannot publish its result.
    generation: u64,
}

/// Owns the single platform connection and drives its state machine.
pub struct ConnectionManager {
    connector: Arc<dyn PlatformConnector>,
    credentials: Arc<dyn CredentialSource>,
    ingestor: Arc<Ingestor>,
    settings: AdapterSettings,
    inner: Mutex<Inner>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(
        connector: Arc<dyn PlatformConnector>,
        credentials: Arc<dyn CredentialSource>,
        ingestor: Arc<Ingestor>,
        settings: AdapterSettings,
    ) -> Self {
        Self {
            connector,
            credentials,
            ingestor,
            settings,
            inner: Mutex::new(Inner {
                state: ConnectionState::Disconnected,
                active: None,
                generation: 0,
            }),
        }
    }

    /// Connects and returns the bot's identity tag.
    ///
    /// A second call while one is pending is rejected, never queued.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` without a credential, `ConcurrentOperation` while
    /// another attempt is pending, `ConnectionTimeout` if the gateway is not
    /// ready in time, and `LoginFailure` for anything the platform rejects.
    pub async fn connect(&self) -> AdapterResult<String> {
        let token = self.credentials.credential().ok_or_else(|| {
            warn!("Connect requested without a bot token");
            AdapterError::configuration("no bot token configured")
        })?;

        let (generation, previous) = {
            let mut inner = self.inner.lock();
            if let (ConnectionState::Ready, Some(active)) = (inner.state, &inner.active) {
                return Ok(active.context.identity.tag());
            }
            if inner.state.is_connecting() {
                return Err(AdapterError::ConcurrentOperation);
            }
            inner.state = ConnectionState::Connecting;
            (inner.generation, inner.active.take())
        };
        let _attempt = AttemptGuard {
            inner: &self.inner,
            generation,
        };

        if let Some(previous) = previous {
            debug!("Releasing previous connection before reconnecting");
            previous.shutdown().await;
        }

        info!(token = %token, "Connecting to Discord");

        let (event_tx, event_rx) = mpsc::channel(self.settings.event_buffer.max(1));

        let pending = match self.connector.login(&token, event_tx).await {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.finish_failed(generation, ConnectionState::Disconnected);
                return Err(into_login_failure(e));
            }
        };

        let identity = match timeout(self.settings.connect_timeout, pending.ready).await {
            Ok(Ok(Ok(identity))) => identity,
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Gateway rejected login");
                pending.session.close().await;
                self.finish_failed(generation, ConnectionState::Disconnected);
                return Err(into_login_failure(e));
            }
            Ok(Err(_)) => {
                warn!("Gateway dropped the ready signal");
                pending.session.close().await;
                self.finish_failed(generation, ConnectionState::Disconnected);
                return Err(AdapterError::login("connection closed before ready"));
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.settings.connect_timeout.as_secs(),
                    "Timed out waiting for gateway ready"
                );
                pending.session.close().await;
                self.finish_failed(generation, ConnectionState::Error);
                return Err(AdapterError::ConnectionTimeout {
                    timeout: self.settings.connect_timeout,
                });
            }
        };

        let tag = identity.tag();
        let ingest = spawn_ingest_task(
            event_rx,
            MessageClassifier::new(identity.id()),
            self.ingestor.clone(),
        );
        let active = ActiveConnection {
            context: Arc::new(ConnectionContext {
                session: pending.session,
                identity,
            }),
            ingest,
        };

        let stale = {
            let mut inner = self.inner.lock();
            if inner.generation == generation {
                inner.state = ConnectionState::Ready;
                inner.active = Some(active);
                None
            } else {
                Some(active)
            }
        };

        if let Some(stale) = stale {
            info!("Connection attempt superseded by disconnect");
            stale.shutdown().await;
            return Err(AdapterError::login("connection attempt cancelled"));
        }

        info!(tag = %tag, "Connected to Discord");
        Ok(tag)
    }

    /// Drops the connection if there is one. Always succeeds.
    pub async fn disconnect(&self) {
        let previous = {
            let mut inner = self.inner.lock();
            inner.generation = inner.generation.wrapping_add(1);
            inner.state = ConnectionState::Disconnected;
            inner.active.take()
        };

        if let Some(previous) = previous {
            previous.shutdown().await;
            info!("Disconnected from Discord");
        }
    }

    fn finish_failed(&self, generation: u64, state: ConnectionState) {
        let mut inner = self.inner.lock();
        if inner.generation == generation {
            inner.state = state;
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.credentials.credential().is_some()
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Identity tag of the connected bot.
    #[must_use]
    pub fn current_identity(&self) -> Option<String> {
        let inner = self.inner.lock();
        inner
            .active
            .as_ref()
            .filter(|_| inner.state.is_ready())
            .map(|active| active.context.identity.tag())
    }

    /// The live connection, or `NotConnected`.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::NotConnected` unless the state is `Ready`.
    pub fn context(&self) -> AdapterResult<Arc<ConnectionContext>> {
        let inner = self.inner.lock();
        match (&inner.state, &inner.active) {
            (ConnectionState::Ready, Some(active)) => Ok(active.context.clone()),
            _ => Err(AdapterError::NotConnected),
        }
    }
}

/// Puts an abandoned attempt back to `Disconnected`. Every settled path has
/// already moved the state off `Connecting`, so dropping it there is a no-op.
struct AttemptGuard<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.generation == self.generation && inner.state.is_connecting() {
            debug!("Connect attempt dropped before it settled");
            inner.state = ConnectionState::Disconnected;
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(active) = self.inner.get_mut().active.take() {
            active.ingest.abort();
        }
    }
}

fn into_login_failure(error: AdapterError) -> AdapterError {
    match error {
        AdapterError::LoginFailure { .. } | AdapterError::Configuration { .. } => error,
        other => AdapterError::login(other.to_string()),
    }
}

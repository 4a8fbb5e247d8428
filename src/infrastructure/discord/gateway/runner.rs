//! Gateway supervision loop: one task per login that owns the socket,
//! heartbeats, resumes after drops and pushes inbound events.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, interval_at, sleep_until, timeout};
use tracing::{debug, error, info, trace, warn};

use super::cache::GuildCache;
use super::connection::GatewayConnection;
use super::constants::{
    FIRST_HEARTBEAT_FACTOR, GATEWAY_URL, GUILD_BACKFILL_TIMEOUT, GatewayIntents, GatewayOpcode,
    HELLO_TIMEOUT, MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_BASE, RECONNECT_DELAY_MAX, RECONNECT_JITTER_MAX,
};
use super::error::{GatewayError, GatewayResult};
use super::events::{DispatchEvent, EventParser};
use super::payloads::{GatewayMessage, GatewayPayload};
use super::session::SessionInfo;
use crate::domain::entities::{AuthToken, BotIdentity, GuildId};
use crate::domain::errors::{AdapterError, AdapterResult};
use crate::domain::ports::InboundEvent;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub gateway_url: String,
    pub intents: GatewayIntents,
    pub max_reconnect_attempts: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            gateway_url: GATEWAY_URL.to_string(),
            intents: GatewayIntents::inbox_bot(),
            max_reconnect_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

pub type ReadySender = oneshot::Sender<AdapterResult<BotIdentity>>;

/// Identity held back until the guilds announced in READY have arrived.
struct GuildBackfill {
    identity: BotIdentity,
    pending: HashSet<GuildId>,
    deadline: Instant,
}

pub struct GatewayRunner<C: GatewayConnection> {
    connection: C,
    config: RunnerConfig,
    token: AuthToken,
    session: SessionInfo,
    cache: Arc<GuildCache>,
    events: mpsc::Sender<InboundEvent>,
    ready: Option<ReadySender>,
    backfill: Option<GuildBackfill>,
    shutdown: watch::Receiver<bool>,
    attempts: u32,
}

impl<C: GatewayConnection> GatewayRunner<C> {
    #[must_use]
    pub fn new(
        connection: C,
        config: RunnerConfig,
        token: AuthToken,
        cache: Arc<GuildCache>,
        events: mpsc::Sender<InboundEvent>,
        ready: ReadySender,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            connection,
            config,
            token,
            session: SessionInfo::new(),
            cache,
            events,
            ready: Some(ready),
            backfill: None,
            shutdown,
            attempts: 0,
        }
    }

    /// Runs until shutdown is signalled or a fatal error ends the session.
    pub async fn run(mut self) {
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let result = self.run_socket().await;
            self.connection.close().await;

            let err = match result {
                Ok(()) | Err(GatewayError::ShuttingDown) => break,
                Err(err) => err,
            };

            if !err.can_resume() {
                self.session.clear();
            }

            if !err.should_reconnect() {
                error!(error = %err, "Gateway session ended");
                self.fail(err);
                break;
            }

            self.attempts += 1;
            if self.attempts > self.config.max_reconnect_attempts {
                let err = GatewayError::ReconnectionLimitExceeded {
                    attempts: self.attempts - 1,
                };
                error!(error = %err, "Giving up on gateway");
                self.fail(err);
                break;
            }

            let delay = calculate_backoff_delay(self.attempts);
            warn!(
                error = %err,
                attempt = self.attempts,
                delay_ms = delay.as_millis() as u64,
                "Gateway connection lost, reconnecting"
            );
            if self.ready.is_none() {
                self.push(InboundEvent::Warning(format!(
                    "gateway connection lost ({err}), reconnecting"
                )));
            }

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = self.shutdown.changed() => break,
            }
        }

        debug!("Gateway runner stopped");
    }

    async fn run_socket(&mut self) -> GatewayResult<()> {
        self.session.reset_socket();

        let resume = self.session.can_resume();
        let url = match (resume, self.session.resume_gateway_url()) {
            (true, Some(resume_url)) => format!("{resume_url}/?v=10&encoding=json"),
            _ => self.config.gateway_url.clone(),
        };

        self.connection.connect(&url).await?;

        let hello = timeout(HELLO_TIMEOUT, self.connection.receive())
            .await
            .map_err(|_| GatewayError::timeout("hello"))??;
        if GatewayOpcode::try_from(hello.op) != Ok(GatewayOpcode::Hello) {
            return Err(GatewayError::UnexpectedOpcode { opcode: hello.op });
        }
        let interval_ms = EventParser::parse_hello(hello.d)?.heartbeat_interval.max(1);
        debug!(interval_ms, "Received Hello");

        if let (true, Some(session_id), Some(sequence)) =
            (resume, self.session.session_id(), self.session.sequence())
        {
            debug!(session_id, sequence, "Resuming session");
            let payload = GatewayPayload::resume(self.token.as_str(), session_id, sequence);
            self.connection.send(&payload).await?;
        } else {
            debug!(intents = self.config.intents.bits(), "Identifying");
            let payload =
                GatewayPayload::identify(self.token.as_str(), self.config.intents.bits());
            self.connection.send(&payload).await?;
        }

        let period = Duration::from_millis(interval_ms);
        let mut heartbeat = interval_at(Instant::now() + period.mul_f64(FIRST_HEARTBEAT_FACTOR), period);

        loop {
            let backfill_deadline = self.backfill.as_ref().map(|b| b.deadline);

            tokio::select! {
                _ = self.shutdown.changed() => return Err(GatewayError::ShuttingDown),
                () = sleep_until(backfill_deadline.unwrap_or_else(Instant::now)),
                    if backfill_deadline.is_some() => self.release_ready(),
                _ = heartbeat.tick() => {
                    if !self.session.heartbeat_sent() {
                        return Err(GatewayError::HeartbeatTimeout);
                    }
                    trace!(sequence = ?self.session.sequence(), "Sending heartbeat");
                    self.connection
                        .send(&GatewayPayload::heartbeat(self.session.sequence()))
                        .await?;
                }
                received = self.connection.receive() => match received {
                    Ok(message) => self.handle_message(message).await?,
                    Err(GatewayError::SerializationError { message }) => {
                        warn!(error = %message, "Dropping malformed gateway frame");
                    }
                    Err(err) => return Err(err),
                },
            }
        }
    }

    async fn handle_message(&mut self, message: GatewayMessage) -> GatewayResult<()> {
        self.session.update_sequence(message.s);

        match GatewayOpcode::try_from(message.op).ok() {
            Some(GatewayOpcode::Dispatch) => {
                let Some(event_type) = message.t else {
                    return Ok(());
                };
                match EventParser::parse_dispatch(&event_type, message.d) {
                    Ok(event) => self.handle_dispatch(event)?,
                    Err(e) => warn!(event_type, error = %e, "Failed to parse dispatch"),
                }
            }
            Some(GatewayOpcode::Heartbeat) => {
                self.session.heartbeat_sent();
                self.connection
                    .send(&GatewayPayload::heartbeat(self.session.sequence()))
                    .await?;
            }
            Some(GatewayOpcode::HeartbeatAck) => self.session.heartbeat_acked(),
            Some(GatewayOpcode::Reconnect) => {
                info!("Gateway requested reconnect");
                return Err(GatewayError::ConnectionClosed {
                    code: 4000,
                    reason: "Reconnect requested".to_string(),
                });
            }
            Some(GatewayOpcode::InvalidSession) => {
                let resumable = message
                    .d
                    .and_then(|d| d.as_bool())
                    .unwrap_or(false);
                return Err(GatewayError::SessionInvalidated { resumable });
            }
            other => trace!(opcode = message.op, known = other.is_some(), "Ignoring opcode"),
        }

        Ok(())
    }

    fn handle_dispatch(&mut self, event: DispatchEvent) -> GatewayResult<()> {
        trace!(event = event.event_name(), "Dispatch");
        match event {
            DispatchEvent::Ready {
                session_id,
                resume_gateway_url,
                identity,
                guild_ids,
            } => {
                info!(user = %identity.tag(), guilds = guild_ids.len(), "Gateway ready");
                self.session.set_session(session_id, resume_gateway_url);
                self.attempts = 0;
                self.cache.clear();
                if self.ready.is_some() {
                    self.backfill = Some(GuildBackfill {
                        identity,
                        pending: guild_ids.into_iter().collect(),
                        deadline: Instant::now() + GUILD_BACKFILL_TIMEOUT,
                    });
                    self.guild_arrived(None);
                }
            }
            DispatchEvent::Resumed => {
                info!("Gateway session resumed");
                self.attempts = 0;
            }
            DispatchEvent::MessageCreate(mut message) => {
                self.cache.annotate(&mut message);
                if !self.push(InboundEvent::Message(message)) {
                    return Err(GatewayError::ShuttingDown);
                }
            }
            DispatchEvent::Other { event_type } => trace!(event_type, "Unhandled dispatch"),
            lifecycle => {
                let arrived = match &lifecycle {
                    DispatchEvent::GuildCreate(guild) => Some(guild.id()),
                    DispatchEvent::GuildDelete { guild_id, .. } => Some(*guild_id),
                    _ => None,
                };
                self.cache.apply(lifecycle);
                if arrived.is_some() {
                    self.guild_arrived(arrived);
                }
            }
        }
        Ok(())
    }

    /// Ticks off a guild announced in READY and reports ready once none are left.
    fn guild_arrived(&mut self, guild_id: Option<GuildId>) {
        let Some(backfill) = self.backfill.as_mut() else {
            return;
        };
        if let Some(id) = guild_id {
            backfill.pending.remove(&id);
        }
        if backfill.pending.is_empty() {
            self.release_ready();
        }
    }

    fn release_ready(&mut self) {
        let Some(backfill) = self.backfill.take() else {
            return;
        };
        if !backfill.pending.is_empty() {
            warn!(
                missing = backfill.pending.len(),
                "Guild list incomplete, reporting ready anyway"
            );
        }
        debug!(guilds = self.cache.len(), "Guild list loaded");
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(Ok(backfill.identity));
        }
    }

    /// Non-blocking so a slow consumer never stalls heartbeats.
    /// Returns false once the consumer is gone.
    fn push(&self, event: InboundEvent) -> bool {
        match self.events.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event buffer full, dropping inbound event");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    fn fail(&mut self, err: GatewayError) {
        match self.ready.take() {
            Some(ready) => {
                let _ = ready.send(Err(AdapterError::from(err)));
            }
            None => {
                self.push(InboundEvent::Error(err.to_string()));
            }
        }
    }
}

fn calculate_backoff_delay(attempt: u32) -> Duration {
    let base_delay = RECONNECT_DELAY_BASE.as_millis() as u64;
    let max_delay = RECONNECT_DELAY_MAX.as_millis() as u64;
    let jitter_max = RECONNECT_JITTER_MAX.as_millis() as u64;

    let exponential_delay = base_delay.saturating_mul(2_u64.saturating_pow(attempt.min(6)));
    let capped_delay = exponential_delay.min(max_delay);

    Duration::from_millis(capped_delay.saturating_add(rand_jitter(jitter_max)))
}

fn rand_jitter(max: u64) -> u64 {
    use std::time::SystemTime;

    if max == 0 {
        return 0;
    }

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0);

    nanos % max
}

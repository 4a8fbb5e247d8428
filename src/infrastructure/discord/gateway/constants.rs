use std::ops::BitOr;
use std::time::Duration;

/// Plain JSON transport; zlib streaming is not negotiated.
pub const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Backoff before reopening a socket: `base * 2^attempt` capped at the max, plus jitter.
pub const RECONNECT_DELAY_BASE: Duration = Duration::from_secs(1);
pub const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(60);
pub const RECONNECT_JITTER_MAX: Duration = Duration::from_millis(500);
/// Consecutive failed sockets before the runner gives up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 10;

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const HELLO_TIMEOUT: Duration = Duration::from_secs(10);
/// How long a fresh login waits for the guilds listed in READY before
/// reporting ready with whatever has arrived.
pub const GUILD_BACKFILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Fraction of the Hello interval before the first heartbeat.
pub const FIRST_HEARTBEAT_FACTOR: f64 = 0.95;

/// Values reported in the identify `properties` block.
pub const CLIENT_OS: &str = std::env::consts::OS;
pub const CLIENT_NAME: &str = "oxinbox";
/// Guilds above this member count arrive without their offline member list.
pub const LARGE_THRESHOLD: u16 = 50;

/// Opcodes the adapter sends or understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOpcode {
    Dispatch,
    Heartbeat,
    Identify,
    Resume,
    Reconnect,
    InvalidSession,
    Hello,
    HeartbeatAck,
}

impl GatewayOpcode {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Dispatch => 0,
            Self::Heartbeat => 1,
            Self::Identify => 2,
            Self::Resume => 6,
            Self::Reconnect => 7,
            Self::InvalidSession => 9,
            Self::Hello => 10,
            Self::HeartbeatAck => 11,
        }
    }
}

impl TryFrom<u8> for GatewayOpcode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            6 => Self::Resume,
            7 => Self::Reconnect,
            9 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            other => return Err(other),
        })
    }
}

impl From<GatewayOpcode> for u8 {
    fn from(opcode: GatewayOpcode) -> Self {
        opcode.code()
    }
}

/// Intent bitset sent with identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatewayIntents(u32);

impl GatewayIntents {
    pub const GUILDS: Self = Self(1 << 0);
    pub const GUILD_MEMBERS: Self = Self(1 << 1);
    pub const GUILD_MESSAGES: Self = Self(1 << 9);
    pub const DIRECT_MESSAGES: Self = Self(1 << 12);
    /// Privileged; must be enabled for the application in the developer portal.
    pub const MESSAGE_CONTENT: Self = Self(1 << 15);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Guild and DM messages with content, plus guild/channel lifecycle events.
    #[must_use]
    pub const fn inbox_bot() -> Self {
        Self::GUILDS
            .union(Self::GUILD_MESSAGES)
            .union(Self::DIRECT_MESSAGES)
            .union(Self::MESSAGE_CONTENT)
    }
}

impl BitOr for GatewayIntents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

mod credential_port;
mod platform_port;

pub use credential_port::CredentialSource;
#[cfg(test)]
pub use credential_port::MockCredentialSource;
pub use platform_port::{InboundEvent, PendingLogin, PlatformConnector, PlatformSession};

#[cfg(test)]
pub mod mocks {
    pub use super::platform_port::mock::{MockConnector, MockSession, ReadyBehavior};
}

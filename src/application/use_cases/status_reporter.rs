use std::sync::Arc;

use super::connection_manager::ConnectionManager;
use crate::application::dto::StatusReport;
use crate::application::services::InboxStore;

/// Builds status snapshots. Never fails and never touches the network.
#[derive(Clone)]
pub struct StatusReporter {
    connection: Arc<ConnectionManager>,
    inbox: Arc<InboxStore>,
}

impl StatusReporter {
    #[must_use]
    pub const fn new(connection: Arc<ConnectionManager>, inbox: Arc<InboxStore>) -> Self {
        Self { connection, inbox }
    }

    #[must_use]
    pub fn report(&self) -> StatusReport {
        let context = self.connection.context().ok();

        StatusReport {
            configured: self.connection.is_configured(),
            connected: context.is_some(),
            tag: context.as_ref().map(|c| c.identity().tag()),
            server_count: context.as_ref().map_or(0, |c| c.session().guild_count()),
            inbox_size: self.inbox.len(),
        }
    }
}

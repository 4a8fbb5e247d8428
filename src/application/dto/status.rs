use serde::Serialize;

/// Snapshot returned by the status operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub configured: bool,
    pub connected: bool,
    pub tag: Option<String>,
    pub server_count: usize,
    pub inbox_size: usize,
}

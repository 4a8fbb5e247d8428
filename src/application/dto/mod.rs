//! Data transfer objects for the application layer.

mod settings;
mod status;

pub use settings::AdapterSettings;
pub use status::StatusReport;

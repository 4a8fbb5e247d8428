//! Domain error types.

mod adapter_error;

pub use adapter_error::{AdapterError, AdapterResult};

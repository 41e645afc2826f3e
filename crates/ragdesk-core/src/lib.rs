//! ragdesk Core — configuration, error taxonomy, wire types.

pub mod config;
pub mod error;
pub mod types;

pub use config::{GatewayConfig, OperationTimeouts};
pub use error::{GatewayError, Result};
pub use types::*;

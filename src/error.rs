//! Crate-wide error type for startup and configuration failures.
//!
//! Request-path failures never use this type — they stay inside the tagged
//! result enums in [`crate::types`] per the no-exceptions design.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

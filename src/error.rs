//! Library error types
//!
//! Insufficient indicator data is deliberately NOT an error: it is the
//! `None` arm of each indicator result. These variants cover the genuinely
//! exceptional paths: configuration problems and state persistence.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("state persistence I/O failed")]
    Io(#[from] std::io::Error),

    #[error("state serialization failed")]
    Serialization(#[from] serde_json::Error),
}

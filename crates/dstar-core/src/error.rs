//! Error types shared across the D-STAR toolkit
//!
//! A single top-level enum covering every failure class named in the
//! error handling design (validation, I/O, protocol, timeout, integrity,
//! unsupported). Crates further down the stack (wire, net, reflector,
//! transcoder) define narrower enums and convert into this one at their
//! public boundary via `#[from]`.

use thiserror::Error;

/// Top-level result alias for the toolkit
pub type Result<T> = std::result::Result<T, DstarError>;

/// All possible error conditions surfaced by the toolkit
#[derive(Debug, Error)]
pub enum DstarError {
    // --- Validation ---
    #[error("invalid callsign: {0}")]
    InvalidCallsign(String),

    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // --- Connection & protocol ---
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("disconnected: {0}")]
    Disconnected(String),

    #[error("protocol rejected the request: {0}")]
    Protocol(String),

    // --- Timeout ---
    #[error("timed out waiting for {0}")]
    Timeout(String),

    // --- Unsupported ---
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl DstarError {
    /// Builds a [`DstarError::Connection`] from any displayable message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Builds a [`DstarError::Protocol`] from any displayable message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Builds a [`DstarError::Timeout`] from any displayable message.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// True for errors that a caller could reasonably retry (a fresh
    /// `open()` after a timeout or a dropped connection, for instance).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_) | Self::Disconnected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_text() {
        let e = DstarError::protocol("NACK from reflector");
        assert_eq!(e.to_string(), "protocol rejected the request: NACK from reflector");
    }

    #[test]
    fn retryable_classification() {
        assert!(DstarError::timeout("connect ack").is_retryable());
        assert!(DstarError::connection("refused").is_retryable());
        assert!(!DstarError::InvalidCallsign("x".into()).is_retryable());
    }
}

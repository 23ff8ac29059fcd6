//! Errors raised while building or parsing D-STAR wire structures

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WireError>;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("invalid callsign: {0}")]
    InvalidCallsign(String),

    #[error("malformed packet: {0}")]
    Malformed(String),

    #[error("unexpected magic bytes: {0}")]
    BadMagic(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<WireError> for dstar_core::DstarError {
    fn from(e: WireError) -> Self {
        match e {
            WireError::InvalidCallsign(m) => dstar_core::DstarError::InvalidCallsign(m),
            WireError::Io(e) => dstar_core::DstarError::Io(e),
            other => dstar_core::DstarError::InvalidPacket(other.to_string()),
        }
    }
}

//! Errors shared by the UDP endpoint, receive worker and stream connection

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetError>;

#[derive(Debug, Error)]
pub enum NetError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer rejected the request: {0}")]
    Protocol(String),

    #[error("disconnected: {0}")]
    Disconnected(String),

    #[error("timed out waiting for {0}")]
    Timeout(String),

    #[error("malformed packet: {0}")]
    Malformed(#[from] dstar_wire::WireError),
}

impl NetError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
    pub fn disconnected(msg: impl Into<String>) -> Self {
        Self::Disconnected(msg.into())
    }
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}

impl From<NetError> for dstar_core::DstarError {
    fn from(e: NetError) -> Self {
        match e {
            NetError::Io(e) => dstar_core::DstarError::Io(e),
            NetError::Protocol(m) => dstar_core::DstarError::Protocol(m),
            NetError::Disconnected(m) => dstar_core::DstarError::Disconnected(m),
            NetError::Timeout(m) => dstar_core::DstarError::Timeout(m),
            NetError::Malformed(e) => dstar_core::DstarError::InvalidPacket(e.to_string()),
        }
    }
}

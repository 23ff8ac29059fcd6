//! Errors raised while negotiating or running a reflector connection

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReflectorError>;

#[derive(Debug, Error)]
pub enum ReflectorError {
    #[error(transparent)]
    Net(#[from] dstar_net::NetError),

    #[error(transparent)]
    Wire(#[from] dstar_wire::WireError),

    #[error("connect rejected by reflector")]
    ConnectNack,

    #[error("login rejected: {0}")]
    LoginRejected(&'static str),

    #[error("handshake timed out waiting for {0}")]
    HandshakeTimeout(&'static str),
}

impl From<ReflectorError> for dstar_core::DstarError {
    fn from(e: ReflectorError) -> Self {
        match e {
            ReflectorError::Net(e) => e.into(),
            ReflectorError::Wire(e) => e.into(),
            ReflectorError::ConnectNack => {
                dstar_core::DstarError::protocol("reflector rejected the connect request")
            }
            ReflectorError::LoginRejected(why) => {
                dstar_core::DstarError::protocol(format!("login rejected: {why}"))
            }
            ReflectorError::HandshakeTimeout(what) => dstar_core::DstarError::timeout(what),
        }
    }
}

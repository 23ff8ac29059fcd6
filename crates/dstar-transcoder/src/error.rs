//! Errors raised while negotiating or running an AMBEd transcoder stream

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranscoderError>;

#[derive(Debug, Error)]
pub enum TranscoderError {
    #[error(transparent)]
    Net(#[from] dstar_net::NetError),

    #[error("AMBEd reported busy")]
    Busy,

    #[error("handshake timed out waiting for {0}")]
    HandshakeTimeout(&'static str),
}

impl From<TranscoderError> for dstar_core::DstarError {
    fn from(e: TranscoderError) -> Self {
        match e {
            TranscoderError::Net(e) => e.into(),
            TranscoderError::Busy => dstar_core::DstarError::protocol("AMBEd stream busy"),
            TranscoderError::HandshakeTimeout(what) => dstar_core::DstarError::timeout(what),
        }
    }
}

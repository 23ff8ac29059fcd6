//! dstar-net – UDP transport primitives shared by every protocol client
//!
//! A peer-filtered [`endpoint::UdpEndpoint`], a [`worker`] that drains it
//! on a background task, and a [`connection::ConnectionCore`] tying the
//! two together with the open/close/read/write lifecycle every reflector
//! and AMBEd client builds its handshake on top of.

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod worker;

pub use connection::{ConnectionCore, ConnectionState};
pub use endpoint::UdpEndpoint;
pub use error::{NetError, Result};
pub use worker::Classified;

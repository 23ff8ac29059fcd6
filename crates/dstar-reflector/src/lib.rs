//! dstar-reflector – DExtra, DExtra-Open and D-Plus reflector clients
//!
//! Each protocol owns a packet enum, a `classify` dispatch function (fixed
//! leading magic/length, no trial-decoding) and a connection type built on
//! [`dstar_net::ConnectionCore`]. [`protocol::select_protocol`] picks
//! between them from a reflector's callsign the way the recorder/player
//! binaries need to.

pub mod dextra;
pub mod dplus;
pub mod error;
pub mod protocol;

pub use dextra::{DExtraConnection, DExtraPacket, DExtraVariant};
pub use dplus::{DPlusConnection, DPlusPacket};
pub use error::{ReflectorError, Result};
pub use protocol::{select_protocol, ReflectorKind};

//! dstar-wire – D-STAR binary wire formats
//!
//! Callsign/suffix/module validation, the CCITT/Kermit CRC-16, the radio
//! header and voice/data frame, the DSVT UDP envelope around them, and the
//! `.dvtool` recording container. Nothing here touches a socket or a
//! file directly; it only encodes and decodes bytes.

pub mod callsign;
pub mod crc;
pub mod dsvt;
pub mod dvtool;
pub mod error;
pub mod header;

pub use callsign::{Callsign, Module, Suffix};
pub use crc::Crc16;
pub use dsvt::{DvFramePacket, DvHeaderPacket, PACKET_ID_MODULUS};
pub use dvtool::{read_stream, write_stream, DvPacket};
pub use error::{Result, WireError};
pub use header::{DstarFrame, DstarHeader, HeaderFlags3};

//! DExtra and DExtra-Open reflector clients
//!
//! The two protocols are wire-identical; only the default UDP port
//! differs, so [`DExtraVariant`] just picks which port `connect()` binds
//! to.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use dstar_core::timing::HANDSHAKE_TIMEOUT;
use dstar_net::{Classified, ConnectionCore, ConnectionState};
use dstar_wire::{Callsign, DvFramePacket, DvHeaderPacket, Module};

use crate::error::{ReflectorError, Result};

pub const DEXTRA_PORT: u16 = 30001;
pub const DEXTRA_OPEN_PORT: u16 = 30201;

/// Revision 1 is the only one this client emits; 0 and 2 are documented
/// as observed-but-unpinned on ingestion (spec's open question).
const REVISION_1: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DExtraVariant {
    Standard,
    Open,
}

impl DExtraVariant {
    pub fn default_port(self) -> u16 {
        match self {
            Self::Standard => DEXTRA_PORT,
            Self::Open => DEXTRA_OPEN_PORT,
        }
    }
}

/// Packets the foreground ever sees queued. `KeepAlive` is answered
/// directly from the receive worker and never reaches this enum; an
/// incoming `Disconnect` is turned into a disconnect sentinel instead of
/// being queued (see [`classify`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DExtraPacket {
    ConnectAck { my: Callsign, my_module: Module, dest_module: Module },
    ConnectNack { my: Callsign, my_module: Module, dest_module: Module },
    DisconnectAck,
    DvHeader(DvHeaderPacket),
    DvFrame(DvFramePacket),
}

fn encode_connect(my: Callsign, my_module: Module, dest_module: Module) -> [u8; 11] {
    let mut buf = [0u8; 11];
    buf[0..8].copy_from_slice(&my.to_bytes());
    buf[8] = my_module.to_byte();
    buf[9] = dest_module.to_byte();
    buf[10] = REVISION_1;
    buf
}

fn encode_disconnect(my: Callsign, my_module: Module) -> [u8; 11] {
    let mut buf = [0u8; 11];
    buf[0..8].copy_from_slice(&my.to_bytes());
    buf[8] = my_module.to_byte();
    buf[9] = Module::NONE.to_byte();
    buf[10] = 0x00;
    buf
}

fn encode_keepalive(my: Callsign) -> [u8; 9] {
    let mut buf = [0u8; 9];
    buf[0..8].copy_from_slice(&my.to_bytes());
    buf[8] = 0x00;
    buf
}

fn classify(bytes: &[u8], own_callsign: Callsign) -> Classified<DExtraPacket> {
    match bytes.len() {
        14 if &bytes[10..14] == b"ACK\0" => Classified::Packet(DExtraPacket::ConnectAck {
            my: Callsign::from_wire_bytes(bytes[0..8].try_into().unwrap()),
            my_module: Module::from_wire_byte(bytes[8]),
            dest_module: Module::from_wire_byte(bytes[9]),
        }),
        14 if &bytes[10..14] == b"NAK\0" => Classified::Packet(DExtraPacket::ConnectNack {
            my: Callsign::from_wire_bytes(bytes[0..8].try_into().unwrap()),
            my_module: Module::from_wire_byte(bytes[8]),
            dest_module: Module::from_wire_byte(bytes[9]),
        }),
        12 if bytes == b"DISCONNECTED" => Classified::Packet(DExtraPacket::DisconnectAck),
        9 => Classified::KeepAlive(encode_keepalive(own_callsign).to_vec()),
        11 => Classified::PeerDisconnect,
        56 => match DvHeaderPacket::decode(bytes) {
            Ok(p) => Classified::Packet(DExtraPacket::DvHeader(p)),
            Err(_) => Classified::Unknown,
        },
        27 => match DvFramePacket::decode(bytes) {
            Ok(p) => Classified::Packet(DExtraPacket::DvFrame(p)),
            Err(_) => Classified::Unknown,
        },
        _ => Classified::Unknown,
    }
}

/// An open DExtra (or DExtra-Open) reflector connection.
pub struct DExtraConnection {
    core: ConnectionCore<DExtraPacket>,
    my_callsign: Callsign,
}

impl DExtraConnection {
    /// Connects and completes the handshake. The client always announces
    /// a space MY module.
    pub async fn connect(
        my_callsign: Callsign,
        reflector_ip: IpAddr,
        reflector_module: Module,
        variant: DExtraVariant,
    ) -> Result<Self> {
        let remote = SocketAddr::new(reflector_ip, variant.default_port());
        let mut core =
            ConnectionCore::open(remote, None, move |b| classify(b, my_callsign)).await?;

        let connect = encode_connect(my_callsign, Module::NONE, reflector_module);
        core.write(&connect).await?;

        let reply = core
            .read_matching(HANDSHAKE_TIMEOUT, |p| {
                matches!(p, DExtraPacket::ConnectAck { .. } | DExtraPacket::ConnectNack { .. })
            })
            .await?;

        match reply {
            Some(DExtraPacket::ConnectAck { .. }) => {
                core.set_state(ConnectionState::Open);
                Ok(Self { core, my_callsign })
            }
            Some(DExtraPacket::ConnectNack { .. }) => {
                core.close().await;
                Err(ReflectorError::ConnectNack)
            }
            _ => {
                core.close().await;
                Err(ReflectorError::HandshakeTimeout("DExtra ConnectAck"))
            }
        }
    }

    pub async fn read(&mut self, timeout: Duration) -> Result<Option<DExtraPacket>> {
        Ok(self.core.read(timeout).await?)
    }

    pub async fn write_header(&self, packet: &DvHeaderPacket) -> Result<()> {
        self.core.write(&packet.encode()).await?;
        Ok(())
    }

    pub async fn write_frame(&self, packet: &DvFramePacket) -> Result<()> {
        self.core.write(&packet.encode()).await?;
        Ok(())
    }

    /// Sends `Disconnect` and waits briefly for `DisconnectAck`.
    /// Receipt is best-effort: on timeout the connection is still
    /// considered closed.
    pub async fn disconnect(mut self) {
        let disconnect = encode_disconnect(self.my_callsign, Module::NONE);
        let _ = self.core.write(&disconnect).await;
        let _ = self
            .core
            .read_matching(Duration::from_millis(500), |p| {
                matches!(p, DExtraPacket::DisconnectAck)
            })
            .await;
        self.core.close().await;
    }

    pub fn state(&self) -> ConnectionState {
        self.core.state()
    }
}

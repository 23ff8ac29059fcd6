//! A protocol-erased reflector connection shared by the recorder and
//! player binaries, so their orchestration logic doesn't need to branch
//! on which of the three reflector protocols it is driving.

use std::net::IpAddr;
use std::time::Duration;

use dstar_reflector::{
    DExtraConnection, DExtraPacket, DExtraVariant, DPlusConnection, DPlusPacket, ReflectorKind,
    Result as ReflectorResult,
};
use dstar_wire::{Callsign, DvFramePacket, DvHeaderPacket, Module};

/// Packet shapes common to every reflector protocol, after each
/// protocol's own handshake/keepalive chatter has been stripped away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectorEvent {
    DvHeader(DvHeaderPacket),
    DvFrame(DvFramePacket),
    PeerDisconnected,
}

pub enum ReflectorConnection {
    DExtra(DExtraConnection),
    DPlus(DPlusConnection),
}

impl ReflectorConnection {
    pub async fn connect(
        kind: ReflectorKind,
        my_callsign: Callsign,
        reflector_ip: IpAddr,
        reflector_module: Module,
    ) -> ReflectorResult<Self> {
        match kind {
            ReflectorKind::DExtra => {
                let conn = DExtraConnection::connect(
                    my_callsign,
                    reflector_ip,
                    reflector_module,
                    DExtraVariant::Standard,
                )
                .await?;
                Ok(Self::DExtra(conn))
            }
            ReflectorKind::DExtraOpen => {
                let conn = DExtraConnection::connect(
                    my_callsign,
                    reflector_ip,
                    reflector_module,
                    DExtraVariant::Open,
                )
                .await?;
                Ok(Self::DExtra(conn))
            }
            ReflectorKind::DPlus => {
                let conn = DPlusConnection::connect(my_callsign, reflector_ip).await?;
                Ok(Self::DPlus(conn))
            }
        }
    }

    pub async fn read(&mut self, timeout: Duration) -> ReflectorResult<Option<ReflectorEvent>> {
        match self {
            Self::DExtra(c) => {
                let packet = c.read(timeout).await?;
                Ok(packet.and_then(|p| match p {
                    DExtraPacket::DvHeader(h) => Some(ReflectorEvent::DvHeader(h)),
                    DExtraPacket::DvFrame(f) => Some(ReflectorEvent::DvFrame(f)),
                    DExtraPacket::ConnectAck { .. }
                    | DExtraPacket::ConnectNack { .. }
                    | DExtraPacket::DisconnectAck => None,
                }))
            }
            Self::DPlus(c) => {
                let packet = c.read(timeout).await?;
                Ok(packet.and_then(|p| match p {
                    DPlusPacket::DvHeader(h) => Some(ReflectorEvent::DvHeader(h)),
                    DPlusPacket::DvFrame(f) => Some(ReflectorEvent::DvFrame(f)),
                    DPlusPacket::Disconnect => Some(ReflectorEvent::PeerDisconnected),
                    DPlusPacket::ConnectEcho
                    | DPlusPacket::LoginOk
                    | DPlusPacket::LoginBusy
                    | DPlusPacket::LoginFail => None,
                }))
            }
        }
    }

    pub async fn write_header(&self, packet: &DvHeaderPacket) -> ReflectorResult<()> {
        match self {
            Self::DExtra(c) => c.write_header(packet).await,
            Self::DPlus(c) => c.write_header(packet).await,
        }
    }

    pub async fn write_frame(&self, packet: &DvFramePacket) -> ReflectorResult<()> {
        match self {
            Self::DExtra(c) => c.write_frame(packet).await,
            Self::DPlus(c) => c.write_frame(packet).await,
        }
    }

    pub async fn disconnect(self) {
        match self {
            Self::DExtra(c) => c.disconnect().await,
            Self::DPlus(c) => c.disconnect().await,
        }
    }
}

//! D-Plus reflector client
//!
//! D-Plus frames voice packets in three shapes depending on position in
//! the stream (`FrameHeader`, `FrameMid`, `FrameLast`); the last one
//! truncates the embedded frame and appends an opaque 15-byte terminator
//! literal that is reproduced byte-for-byte rather than understood.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use dstar_core::timing::HANDSHAKE_TIMEOUT;
use dstar_net::{Classified, ConnectionCore, ConnectionState};
use dstar_wire::{Callsign, DvFramePacket, DvHeaderPacket};

use crate::error::{ReflectorError, Result};

pub const DPLUS_PORT: u16 = 20001;

const CONNECT: [u8; 5] = [0x05, 0x00, 0x18, 0x00, 0x01];
const DISCONNECT: [u8; 5] = [0x05, 0x00, 0x18, 0x00, 0x00];
const KEEPALIVE: [u8; 3] = [0x03, 0x60, 0x00];
const LOGIN_TAG: [u8; 4] = [0x1C, 0xC0, 0x04, 0x00];
const LOGIN_OK_TAG: [u8; 4] = [0x08, 0xC0, 0x04, 0x00];

// Opaque trailer appended to the final frame of a stream; reproduced
// byte-for-byte, not otherwise interpreted.
const FRAME_LAST_TERMINATOR: [u8; 15] = [
    0x55, 0xC8, 0x7A, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x55, 0x25, 0x1A, 0xC6,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DPlusPacket {
    ConnectEcho,
    LoginOk,
    LoginBusy,
    LoginFail,
    Disconnect,
    DvHeader(DvHeaderPacket),
    DvFrame(DvFramePacket),
}

fn encode_login(callsign: Callsign) -> [u8; 28] {
    let mut buf = [0u8; 28];
    buf[0..4].copy_from_slice(&LOGIN_TAG);
    buf[4..12].copy_from_slice(&callsign.to_bytes());
    // bytes 12..20 stay zero (serial on the original connection is an
    // empty string, zero-padded)
    buf
}

fn encode_frame_header(packet: &DvHeaderPacket) -> [u8; 58] {
    let mut buf = [0u8; 58];
    buf[0] = 0x3A;
    buf[1] = 0x80;
    buf[2..].copy_from_slice(&packet.encode());
    buf
}

fn encode_frame_mid(packet: &DvFramePacket) -> [u8; 29] {
    let mut buf = [0u8; 29];
    buf[0] = 0x1D;
    buf[1] = 0x80;
    buf[2..].copy_from_slice(&packet.encode());
    buf
}

fn encode_frame_last(packet: &DvFramePacket) -> [u8; 32] {
    let encoded = packet.encode();
    let mut buf = [0u8; 32];
    buf[0] = 0x20;
    buf[1] = 0x80;
    buf[2..17].copy_from_slice(&encoded[..15]);
    buf[17..32].copy_from_slice(&FRAME_LAST_TERMINATOR);
    buf[8] = 0x81;
    buf
}

/// Serializes a frame, picking `FrameLast` for a last-bit frame and
/// `FrameMid` otherwise.
fn encode_frame(packet: &DvFramePacket) -> Vec<u8> {
    if packet.is_last {
        encode_frame_last(packet).to_vec()
    } else {
        encode_frame_mid(packet).to_vec()
    }
}

fn decode_frame_last(data: &[u8; 32]) -> std::result::Result<DvFramePacket, dstar_wire::WireError> {
    let mut frame_bytes = [0u8; 27];
    frame_bytes[..15].copy_from_slice(&data[2..17]);
    frame_bytes[15..27].copy_from_slice(&data[17..29]);
    let mut packet = DvFramePacket::decode(&frame_bytes)?;
    packet.is_last = true;
    Ok(packet)
}

fn classify(bytes: &[u8]) -> Classified<DPlusPacket> {
    match bytes.len() {
        5 if bytes == CONNECT => Classified::Packet(DPlusPacket::ConnectEcho),
        5 if bytes == DISCONNECT => Classified::Packet(DPlusPacket::Disconnect),
        8 if bytes[0..4] == LOGIN_OK_TAG && &bytes[4..8] == b"OKRW" => {
            Classified::Packet(DPlusPacket::LoginOk)
        }
        8 if bytes[0..4] == LOGIN_OK_TAG && &bytes[4..8] == b"BUSY" => {
            Classified::Packet(DPlusPacket::LoginBusy)
        }
        8 if bytes[0..4] == LOGIN_OK_TAG && &bytes[4..8] == b"FAIL" => {
            Classified::Packet(DPlusPacket::LoginFail)
        }
        3 if bytes == KEEPALIVE => Classified::KeepAlive(KEEPALIVE.to_vec()),
        58 if bytes[0..2] == [0x3A, 0x80] => match DvHeaderPacket::decode(&bytes[2..]) {
            Ok(p) => Classified::Packet(DPlusPacket::DvHeader(p)),
            Err(_) => Classified::Unknown,
        },
        29 if bytes[0..2] == [0x1D, 0x80] => match DvFramePacket::decode(&bytes[2..]) {
            Ok(p) => Classified::Packet(DPlusPacket::DvFrame(p)),
            Err(_) => Classified::Unknown,
        },
        32 if bytes[0..2] == [0x20, 0x80] => {
            let fixed: [u8; 32] = bytes.try_into().unwrap();
            match decode_frame_last(&fixed) {
                Ok(p) => Classified::Packet(DPlusPacket::DvFrame(p)),
                Err(_) => Classified::Unknown,
            }
        }
        _ => Classified::Unknown,
    }
}

/// An open, logged-in D-Plus reflector connection.
pub struct DPlusConnection {
    core: ConnectionCore<DPlusPacket>,
}

impl DPlusConnection {
    pub async fn connect(my_callsign: Callsign, reflector_ip: IpAddr) -> Result<Self> {
        let remote = SocketAddr::new(reflector_ip, DPLUS_PORT);
        let mut core = ConnectionCore::open(remote, None, |b| classify(b)).await?;

        core.write(&CONNECT).await?;
        let echoed = core
            .read_matching(HANDSHAKE_TIMEOUT, |p| matches!(p, DPlusPacket::ConnectEcho))
            .await?;
        if echoed.is_none() {
            core.close().await;
            return Err(ReflectorError::HandshakeTimeout("D-Plus connect echo"));
        }

        core.write(&encode_login(my_callsign)).await?;
        let login_reply = core
            .read_matching(HANDSHAKE_TIMEOUT, |p| {
                matches!(
                    p,
                    DPlusPacket::LoginOk | DPlusPacket::LoginBusy | DPlusPacket::LoginFail
                )
            })
            .await?;

        match login_reply {
            Some(DPlusPacket::LoginOk) => {
                core.set_state(ConnectionState::Open);
                Ok(Self { core })
            }
            Some(DPlusPacket::LoginBusy) => {
                core.close().await;
                Err(ReflectorError::LoginRejected("reflector busy"))
            }
            Some(DPlusPacket::LoginFail) => {
                core.close().await;
                Err(ReflectorError::LoginRejected("login failed"))
            }
            _ => {
                core.close().await;
                Err(ReflectorError::HandshakeTimeout("D-Plus login reply"))
            }
        }
    }

    pub async fn read(&mut self, timeout: Duration) -> Result<Option<DPlusPacket>> {
        Ok(self.core.read(timeout).await?)
    }

    pub async fn write_header(&self, packet: &DvHeaderPacket) -> Result<()> {
        self.core.write(&encode_frame_header(packet)).await?;
        Ok(())
    }

    pub async fn write_frame(&self, packet: &DvFramePacket) -> Result<()> {
        self.core.write(&encode_frame(packet)).await?;
        Ok(())
    }

    pub async fn disconnect(mut self) {
        let _ = self.core.write(&DISCONNECT).await;
        let _ = self
            .core
            .read_matching(Duration::from_millis(500), |p| {
                matches!(p, DPlusPacket::Disconnect)
            })
            .await;
        self.core.close().await;
    }

    pub fn state(&self) -> ConnectionState {
        self.core.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UdpSocket;

    #[tokio::test]
    async fn s4_login_busy_fails_open() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let my = Callsign::new("SV9OAN").unwrap();
        let connect_task = tokio::spawn(DPlusConnection::connect(my, peer_addr.ip()));

        let mut buf = [0u8; 64];
        let (len, from) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], &CONNECT);
        peer.send_to(&CONNECT, from).await.unwrap();

        let (len, from) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(len, 28);
        let mut busy = Vec::new();
        busy.extend_from_slice(&LOGIN_OK_TAG);
        busy.extend_from_slice(b"BUSY");
        peer.send_to(&busy, from).await.unwrap();

        let result = connect_task.await.unwrap();
        assert!(matches!(result, Err(ReflectorError::LoginRejected(_))));
    }

    #[test]
    fn frame_last_round_trips_is_last_bit() {
        let frame = DvFramePacket::new(0x1234, 20, true, dstar_wire::DstarFrame::silence());
        let encoded = encode_frame_last(&frame);
        assert_eq!(encoded[0], 0x20);
        assert_eq!(encoded[1], 0x80);
        assert_eq!(encoded[8], 0x81);

        let decoded = decode_frame_last(&encoded).unwrap();
        assert!(decoded.is_last);
        assert_eq!(decoded.stream_id, 0x1234);
    }

    #[test]
    fn frame_last_prefix_matches_frame_mid_prefix() {
        let frame = DvFramePacket::new(1, 5, true, dstar_wire::DstarFrame::silence());
        let last = encode_frame_last(&frame);
        let mid_shaped = encode_frame_mid(&DvFramePacket::new(1, 5, true, dstar_wire::DstarFrame::silence()));

        // bytes [2..17] of FrameLast equal the non-last 29-byte encoding's
        // bytes [2..17] except byte 8, which is forced to 0x81.
        for i in 2..17 {
            if i == 8 {
                assert_eq!(last[i], 0x81);
            } else {
                assert_eq!(last[i], mid_shaped[i]);
            }
        }
    }

    #[test]
    fn keepalive_is_answered_in_place() {
        match classify(&KEEPALIVE) {
            Classified::KeepAlive(reply) => assert_eq!(reply, KEEPALIVE.to_vec()),
            _ => panic!("expected keepalive classification"),
        }
    }
}

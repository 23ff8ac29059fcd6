//! Control-plane negotiation and data-plane frame exchange with AMBEd

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use dstar_core::timing::{FRAME_PACING, HANDSHAKE_TIMEOUT};
use dstar_net::{Classified, ConnectionCore};
use dstar_wire::Callsign;

use crate::codec::implied_codecs_out;
use crate::error::{Result, TranscoderError};

pub const AMBED_CONTROL_PORT: u16 = 10100;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ControlPacket {
    StreamDescriptor { stream_id: u16, port: u16, codec_in: u8, codecs_out: u8 },
    Busy,
    Pong,
}

fn encode_open_stream(callsign: Callsign, codec_in: u8, codecs_out: u8) -> [u8; 17] {
    let mut buf = [0u8; 17];
    buf[0..7].copy_from_slice(b"AMBEDOS");
    buf[7..15].copy_from_slice(&callsign.to_bytes());
    buf[15] = codec_in;
    buf[16] = codecs_out;
    buf
}

fn encode_close_stream(stream_id: u16) -> [u8; 9] {
    let mut buf = [0u8; 9];
    buf[0..7].copy_from_slice(b"AMBEDCS");
    buf[7..9].copy_from_slice(&stream_id.to_le_bytes());
    buf
}

fn encode_ping(callsign: Callsign) -> [u8; 17] {
    let mut buf = [0u8; 17];
    buf[0..9].copy_from_slice(b"AMBEDPING");
    buf[9..17].copy_from_slice(&callsign.to_bytes());
    buf
}

fn classify_control(bytes: &[u8]) -> Classified<ControlPacket> {
    match bytes.len() {
        14 if &bytes[0..8] == b"AMBEDSTD" => {
            let stream_id = u16::from_le_bytes([bytes[8], bytes[9]]);
            let port = u16::from_le_bytes([bytes[10], bytes[11]]);
            Classified::Packet(ControlPacket::StreamDescriptor {
                stream_id,
                port,
                codec_in: bytes[12],
                codecs_out: bytes[13],
            })
        }
        9 if bytes == b"AMBEDBUSY" => Classified::Packet(ControlPacket::Busy),
        9 if bytes == b"AMBEDPONG" => Classified::Packet(ControlPacket::Pong),
        _ => Classified::Unknown,
    }
}

fn classify_data(bytes: &[u8]) -> Classified<FrameOut> {
    if bytes.len() == 21 {
        Classified::Packet(FrameOut {
            codec1: bytes[0],
            codec2: bytes[1],
            packet_id: bytes[2],
            payload1: bytes[3..12].try_into().unwrap(),
            payload2: bytes[12..21].try_into().unwrap(),
        })
    } else {
        Classified::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameOut {
    codec1: u8,
    codec2: u8,
    packet_id: u8,
    payload1: [u8; 9],
    payload2: [u8; 9],
}

/// Control-plane connection to an AMBEd instance.
pub struct AmbedClient {
    core: ConnectionCore<ControlPacket>,
    my_callsign: Callsign,
    server_ip: IpAddr,
}

impl AmbedClient {
    pub async fn connect(my_callsign: Callsign, server_ip: IpAddr) -> Result<Self> {
        let remote = SocketAddr::new(server_ip, AMBED_CONTROL_PORT);
        let core = ConnectionCore::open(remote, None, classify_control).await?;
        Ok(Self { core, my_callsign, server_ip })
    }

    /// Opens a transcoding stream for `codec_in`; `codecs_out` is implied
    /// by the fixed map. Fails with [`TranscoderError::Busy`] if AMBEd
    /// has no capacity.
    pub async fn open_stream(&mut self, codec_in: u8) -> Result<TranscoderStream> {
        let codecs_out = implied_codecs_out(codec_in);
        self.core
            .write(&encode_open_stream(self.my_callsign, codec_in, codecs_out))
            .await?;

        let reply = self
            .core
            .read_matching(HANDSHAKE_TIMEOUT, |p| {
                matches!(p, ControlPacket::StreamDescriptor { .. } | ControlPacket::Busy)
            })
            .await?;

        match reply {
            Some(ControlPacket::StreamDescriptor { stream_id, port, codec_in, codecs_out }) => {
                let data_remote = SocketAddr::new(self.server_ip, port);
                let data = ConnectionCore::open(data_remote, None, classify_data).await?;
                Ok(TranscoderStream {
                    data,
                    stream_id,
                    codec_in,
                    codecs_out,
                    next_packet_id: 0,
                })
            }
            Some(ControlPacket::Busy) => Err(TranscoderError::Busy),
            _ => Err(TranscoderError::HandshakeTimeout("AMBEd StreamDescriptor")),
        }
    }

    /// Closes a stream's control-plane registration and then shuts down
    /// its data-plane socket.
    pub async fn close_stream(&self, stream: TranscoderStream) -> Result<()> {
        self.core.write(&encode_close_stream(stream.stream_id)).await?;
        stream.data.close().await;
        Ok(())
    }

    pub async fn ping(&mut self) -> Result<bool> {
        self.core.write(&encode_ping(self.my_callsign)).await?;
        let pong = self
            .core
            .read_matching(HANDSHAKE_TIMEOUT, |p| matches!(p, ControlPacket::Pong))
            .await?;
        Ok(pong.is_some())
    }
}

/// A negotiated transcoding session: a dedicated UDP endpoint paired with
/// the codec pair AMBEd agreed to produce.
pub struct TranscoderStream {
    data: ConnectionCore<FrameOut>,
    stream_id: u16,
    pub codec_in: u8,
    pub codecs_out: u8,
    next_packet_id: u8,
}

impl TranscoderStream {
    pub fn stream_id(&self) -> u16 {
        self.stream_id
    }

    /// Sends one `FrameIn` datagram; the caller is responsible for pacing
    /// calls at [`FRAME_PACING`] as the usage policy requires.
    pub async fn send_frame(&mut self, payload: [u8; 9]) -> Result<()> {
        let mut buf = [0u8; 11];
        buf[0] = self.codec_in;
        buf[1] = self.next_packet_id;
        buf[2..11].copy_from_slice(&payload);
        self.next_packet_id = self.next_packet_id.wrapping_add(1);
        self.data.write(&buf).await?;
        Ok(())
    }

    /// Writes a full burst of input frames, pacing one every
    /// [`FRAME_PACING`] as the transcoder usage policy requires.
    pub async fn send_burst(&mut self, payloads: &[[u8; 9]]) -> Result<()> {
        for payload in payloads {
            self.send_frame(*payload).await?;
            tokio::time::sleep(FRAME_PACING).await;
        }
        Ok(())
    }

    /// Waits for the next `FrameOut` and extracts the payload matching
    /// `codec_out`: `payload1` if `codec1 == codec_out`, else `payload2`.
    pub async fn recv_frame(&mut self, codec_out: u8, timeout: Duration) -> Result<Option<[u8; 9]>> {
        let frame = self.data.read(timeout).await?;
        Ok(frame.map(|f| {
            if f.codec1 == codec_out {
                f.payload1
            } else {
                f.payload2
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::UdpSocket;

    #[tokio::test]
    async fn s6_open_and_close_stream() {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let my = Callsign::new("SV9OAN").unwrap();
        let connect_task = tokio::spawn(AmbedClient::connect(my, peer_addr.ip()));
        let mut client = connect_task.await.unwrap().unwrap();

        let data_peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let data_port = data_peer.local_addr().unwrap().port();

        let open_task = tokio::spawn(async move {
            // `client` moves into the task so its control endpoint's worker
            // survives for the duration of this scripted exchange.
            let stream = client.open_stream(1).await;
            (client, stream)
        });

        let mut buf = [0u8; 64];
        let (len, from) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(len, 17);
        assert_eq!(&buf[0..7], b"AMBEDOS");
        assert_eq!(buf[15], 1); // codec_in
        assert_eq!(buf[16], 0x06); // AMBE2PLUS | CODEC2_3200

        let mut descriptor = Vec::new();
        descriptor.extend_from_slice(b"AMBEDSTD");
        descriptor.extend_from_slice(&1u16.to_le_bytes());
        descriptor.extend_from_slice(&data_port.to_le_bytes());
        descriptor.push(1);
        descriptor.push(0x06);
        peer.send_to(&descriptor, from).await.unwrap();

        let (mut client, stream) = open_task.await.unwrap();
        let stream = stream.unwrap();
        assert_eq!(stream.stream_id(), 1);
        assert_eq!(stream.codecs_out, 0x06);

        let close_task = tokio::spawn(async move { client.close_stream(stream).await });
        let (len, _from) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(len, 9);
        assert_eq!(&buf[0..7], b"AMBEDCS");
        assert_eq!(&buf[7..9], &1u16.to_le_bytes());

        close_task.await.unwrap().unwrap();
    }
}

//! A UDP socket bound to a single remote peer
//!
//! Datagrams from any source other than the configured remote host are
//! silently dropped — the port is not checked, only the IP, since some
//! reflectors answer a connect from a different ephemeral port than the
//! one a client first wrote to.

use std::net::{IpAddr, SocketAddr};

use tokio::net::UdpSocket;

use crate::error::{NetError, Result};

const RECV_BUFFER_SIZE: usize = 2048;

/// One UDP socket, owned exclusively by its enclosing connection. The
/// receive worker shares it for reading only; writes go through
/// [`UdpEndpoint::write`] regardless of which side (foreground or worker
/// keepalive auto-reply) originates them, so the one serialization point
/// is explicit.
pub struct UdpEndpoint {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpEndpoint {
    /// Binds a non-blocking UDP socket and targets it at `remote`.
    /// `bind_addr` defaults to `0.0.0.0:0` (OS-assigned ephemeral port).
    pub async fn open(remote: SocketAddr, bind_addr: Option<SocketAddr>) -> Result<Self> {
        let bind_addr = bind_addr.unwrap_or_else(|| "0.0.0.0:0".parse().unwrap());
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Self { socket, remote })
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Sends `bytes` to the configured remote. No retry, no buffering
    /// beyond the kernel socket.
    pub async fn write(&self, bytes: &[u8]) -> Result<usize> {
        Ok(self.socket.send_to(bytes, self.remote).await?)
    }

    /// A single non-blocking read attempt. Returns `Ok(None)` if no
    /// datagram is immediately available, or if the only datagram
    /// available came from a source IP other than `remote`.
    pub fn read(&self) -> Result<Option<Vec<u8>>> {
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match self.socket.try_recv_from(&mut buf) {
            Ok((len, from)) => {
                if !same_host(from.ip(), self.remote.ip()) {
                    tracing::debug!(from = %from, remote = %self.remote, "dropping datagram from unexpected source");
                    return Ok(None);
                }
                Ok(Some(buf[..len].to_vec()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(NetError::Io(e)),
        }
    }
}

fn same_host(a: IpAddr, b: IpAddr) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_read_round_trip() {
        // `b` only checks the sender's IP, so any loopback port works as
        // its configured remote.
        let loopback_any: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let b = UdpEndpoint::open("127.0.0.1:1".parse().unwrap(), Some(loopback_any))
            .await
            .unwrap();
        let b_addr = b.local_addr().unwrap();
        let a = UdpEndpoint::open(b_addr, Some(loopback_any)).await.unwrap();

        a.write(b"hello").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let got = b.read().unwrap().unwrap();
        assert_eq!(got, b"hello");
    }

    #[tokio::test]
    async fn read_returns_none_when_empty() {
        let ep = UdpEndpoint::open("127.0.0.1:9".parse().unwrap(), None)
            .await
            .unwrap();
        assert!(ep.read().unwrap().is_none());
    }

    #[tokio::test]
    async fn peer_filter_drops_unexpected_source() {
        // `target` only trusts 127.0.0.2, so a datagram from the
        // loopback-bound `sender` (127.0.0.1) must be dropped.
        let wrong_remote: SocketAddr = "127.0.0.2:1".parse().unwrap();
        let bind_local: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let target = UdpEndpoint::open(wrong_remote, Some(bind_local)).await.unwrap();
        let target_addr = target.local_addr().unwrap();

        let sender = UdpEndpoint::open(target_addr, None).await.unwrap();
        sender.write(b"spoofed").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(target.read().unwrap().is_none());
    }
}

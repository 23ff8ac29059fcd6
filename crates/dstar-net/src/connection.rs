//! Generic stream-connection base shared by every protocol client
//!
//! Replaces the original multiple-inheritance connection base with a
//! single concrete type parameterized over the protocol's packet enum.
//! Each protocol builds its `connect()`/`disconnect()` handshake out of
//! this type's `write`/`read_matching` primitives rather than overriding
//! virtual hooks.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::endpoint::UdpEndpoint;
use crate::error::{NetError, Result};
use crate::worker::{self, Classified};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Opening,
    Open,
    Closing,
    Disconnected,
}

/// Default size of the single-producer/single-consumer packet queue.
const DEFAULT_QUEUE_SIZE: usize = 64;

/// A UDP endpoint plus its receive worker and packet queue, with the
/// CLOSED/OPENING/OPEN/CLOSING/DISCONNECTED lifecycle every protocol
/// client shares.
pub struct ConnectionCore<P: Send + 'static> {
    endpoint: Arc<UdpEndpoint>,
    worker: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    disconnected: Arc<AtomicBool>,
    rx: mpsc::Receiver<P>,
    state: ConnectionState,
}

impl<P: Send + 'static> ConnectionCore<P> {
    /// Opens the socket and starts the worker. The connection begins in
    /// `Opening`; callers transition to `Open` once their handshake
    /// (built on top of `write`/`read_matching`) succeeds.
    pub async fn open<F>(
        remote: SocketAddr,
        bind_addr: Option<SocketAddr>,
        classify: F,
    ) -> Result<Self>
    where
        F: Fn(&[u8]) -> Classified<P> + Send + Sync + 'static,
    {
        let endpoint = Arc::new(UdpEndpoint::open(remote, bind_addr).await?);
        let stop = Arc::new(AtomicBool::new(false));
        let disconnected = Arc::new(AtomicBool::new(false));
        let (handle, rx) = worker::spawn(
            Arc::clone(&endpoint),
            classify,
            Arc::clone(&stop),
            Arc::clone(&disconnected),
            DEFAULT_QUEUE_SIZE,
        );

        Ok(Self {
            endpoint,
            worker: Some(handle),
            stop,
            disconnected,
            rx,
            state: ConnectionState::Opening,
        })
    }

    pub fn endpoint(&self) -> &UdpEndpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn set_state(&mut self, state: ConnectionState) {
        self.state = state;
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Relaxed)
    }

    pub async fn write(&self, bytes: &[u8]) -> Result<usize> {
        self.endpoint.write(bytes).await
    }

    /// Waits up to `timeout` for the next queued packet. Returns `Ok(None)`
    /// on timeout. If the worker signalled disconnect, fails with
    /// [`NetError::Disconnected`] and transitions the state.
    pub async fn read(&mut self, timeout: Duration) -> Result<Option<P>> {
        if self.is_disconnected() {
            self.state = ConnectionState::Disconnected;
            return Err(NetError::disconnected("peer closed the stream"));
        }

        match tokio::time::timeout(timeout, self.rx.recv()).await {
            Ok(Some(packet)) => Ok(Some(packet)),
            Ok(None) => {
                if self.is_disconnected() {
                    self.state = ConnectionState::Disconnected;
                    Err(NetError::disconnected("peer closed the stream"))
                } else {
                    Ok(None)
                }
            }
            Err(_elapsed) => Ok(None),
        }
    }

    /// Drains queued packets matching `accept` within a wall-clock
    /// `budget`, ignoring others while they still arrive. This is the
    /// mechanism every handshake uses.
    pub async fn read_matching<F>(&mut self, budget: Duration, accept: F) -> Result<Option<P>>
    where
        F: Fn(&P) -> bool,
    {
        let deadline = tokio::time::Instant::now() + budget;
        loop {
            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            match self.read(deadline - now).await? {
                Some(packet) if accept(&packet) => return Ok(Some(packet)),
                Some(_ignored) => continue,
                None => return Ok(None),
            }
        }
    }

    /// Drains the queue, joins the worker and closes the socket.
    /// Idempotent: safe to call after the worker has already exited.
    pub async fn close(mut self) {
        self.state = ConnectionState::Closing;
        self.stop.store(true, Ordering::Relaxed);
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        if let Some(handle) = self.worker.take() {
            let _ = handle.await;
        }
        self.state = ConnectionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Echo {
        Ping,
    }

    fn classify_echo(bytes: &[u8]) -> Classified<Echo> {
        if bytes == b"ping" {
            Classified::Packet(Echo::Ping)
        } else {
            Classified::Unknown
        }
    }

    #[tokio::test]
    async fn read_matching_finds_accepted_packet() {
        let bind_local: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let peer = UdpEndpoint::open("127.0.0.1:1".parse().unwrap(), Some(bind_local))
            .await
            .unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let mut conn = ConnectionCore::open(peer_addr, Some(bind_local), classify_echo)
            .await
            .unwrap();

        peer.write(b"ping").await.unwrap();
        let got = conn
            .read_matching(Duration::from_millis(500), |p| *p == Echo::Ping)
            .await
            .unwrap();
        assert_eq!(got, Some(Echo::Ping));

        conn.close().await;
    }

    #[tokio::test]
    async fn read_matching_times_out_with_nothing_arriving() {
        let bind_local: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let mut conn = ConnectionCore::open(
            "127.0.0.1:1".parse().unwrap(),
            Some(bind_local),
            classify_echo,
        )
        .await
        .unwrap();

        let got = conn
            .read_matching(Duration::from_millis(50), |p| *p == Echo::Ping)
            .await
            .unwrap();
        assert_eq!(got, None);
        conn.close().await;
    }
}

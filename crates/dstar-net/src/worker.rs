//! The receive worker: one background task per UDP endpoint
//!
//! Drains the socket of everything immediately available, classifies each
//! datagram, and either enqueues a recognized packet, answers a keepalive
//! directly, or flags the connection as disconnected. Sleeps briefly
//! between empty polls instead of busy-spinning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use dstar_core::timing::WORKER_IDLE_SLEEP;

use crate::endpoint::UdpEndpoint;

/// The outcome of classifying one datagram, returned by a protocol's
/// `classify` closure. This is the concrete replacement for the
/// trial-decode-by-exception dispatch pattern: a protocol module matches
/// fixed leading bytes/length once and returns the right variant.
pub enum Classified<P> {
    /// A recognized data- or control-plane packet, to be queued for the
    /// foreground to consume.
    Packet(P),
    /// A keepalive that must be answered immediately from the worker,
    /// never queued (so it cannot reorder user-visible packets).
    KeepAlive(Vec<u8>),
    /// The peer announced it is tearing down the session.
    PeerDisconnect,
    /// Not recognized by any decoder this protocol knows about.
    Unknown,
}

/// Spawns the receive worker as a child task and returns its handle plus
/// the receiving half of the packet queue. The worker exits once `stop`
/// is observed set, or the queue's sender is dropped by the caller.
pub fn spawn<P, F>(
    endpoint: Arc<UdpEndpoint>,
    classify: F,
    stop: Arc<AtomicBool>,
    disconnected: Arc<AtomicBool>,
    queue_size: usize,
) -> (JoinHandle<()>, mpsc::Receiver<P>)
where
    P: Send + 'static,
    F: Fn(&[u8]) -> Classified<P> + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel(queue_size);

    let handle = tokio::spawn(async move {
        tracing::debug!(remote = %endpoint.remote(), "receive worker started");
        loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }

            match endpoint.read() {
                Ok(Some(bytes)) => match classify(&bytes) {
                    Classified::Packet(p) => {
                        if tx.send(p).await.is_err() {
                            break;
                        }
                    }
                    Classified::KeepAlive(reply) => {
                        if let Err(e) = endpoint.write(&reply).await {
                            tracing::warn!(error = %e, "keepalive auto-reply failed");
                        }
                    }
                    Classified::PeerDisconnect => {
                        tracing::info!(remote = %endpoint.remote(), "peer signalled disconnect");
                        disconnected.store(true, Ordering::Relaxed);
                        break;
                    }
                    Classified::Unknown => {
                        tracing::debug!(bytes = bytes.len(), "dropped unrecognized datagram");
                    }
                },
                Ok(None) => {
                    tokio::time::sleep(WORKER_IDLE_SLEEP).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "receive worker I/O error");
                    tokio::time::sleep(WORKER_IDLE_SLEEP).await;
                }
            }
        }
        tracing::debug!("receive worker stopped");
    });

    (handle, rx)
}

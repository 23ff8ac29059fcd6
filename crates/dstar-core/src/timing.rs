//! Timing constants shared by every protocol client
//!
//! Centralized so the three reflector clients and the AMBEd client agree
//! on the same handshake budget and pacing without each redefining it.

use std::time::Duration;

/// Wall-clock deadline for a connect/disconnect handshake round-trip.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(3);

/// Sleep between empty polls of a UDP endpoint inside a receive worker.
pub const WORKER_IDLE_SLEEP: Duration = Duration::from_millis(10);

/// Pacing interval between frames written by the player and the AMBEd
/// input burst.
pub const FRAME_PACING: Duration = Duration::from_millis(20);

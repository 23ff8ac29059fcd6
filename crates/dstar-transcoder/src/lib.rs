//! dstar-transcoder – AMBEd transcoder service client
//!
//! Negotiates a transcoding stream over AMBEd's control plane and then
//! exchanges DV frame payloads on the ephemeral data-plane port AMBEd
//! hands back, one [`codec::Codec`] tag in, two out.

pub mod client;
pub mod codec;
pub mod error;

pub use client::{AmbedClient, TranscoderStream, AMBED_CONTROL_PORT};
pub use codec::{implied_codecs_out, Codec};
pub use error::{Result, TranscoderError};

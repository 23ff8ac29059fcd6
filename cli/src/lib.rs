//! Orchestration shared by the toolkit's five binaries: connecting to a
//! reflector, recording a stream, replaying one, and converting between
//! `.wav`, `.dvtool` and a transcoded `.dvtool`.

pub mod connection;
pub mod decoder;
pub mod encoder;
pub mod player;
pub mod recorder;
pub mod transcoder;

pub use connection::{ReflectorConnection, ReflectorEvent};

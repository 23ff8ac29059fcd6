//! dstar-vocoder – vocoder trait seams and Codec2-2400 FEC
//!
//! Binding to a real AMBE/Codec2 vocoder library is out of scope; the
//! [`VocoderEncoder`]/[`VocoderDecoder`] traits exist so the recorder,
//! player, encoder, decoder and transcoder binaries can be written
//! against a stable seam today and wired to a real implementation later.
//! The Golay(23,12) forward error correction used by Codec2-2400 framing
//! has no such external dependency and is implemented in full.

pub mod codec2_2400;
pub mod golay;

pub use golay::{golay23_decode, golay23_encode};

/// Encodes 160 8kHz PCM samples (one 20ms D-STAR frame) into a vocoder
/// payload. No implementation ships here; this is the seam a real
/// Codec2/AMBE binding plugs into.
pub trait VocoderEncoder: Send {
    fn encode(&mut self, samples: &[i16; 160]) -> Vec<u8>;
}

/// Decodes one vocoder payload back into 160 8kHz PCM samples.
pub trait VocoderDecoder: Send {
    fn decode(&mut self, frame: &[u8]) -> [i16; 160];
}

/// A test double standing in for a real vocoder: encodes to silence and
/// decodes to silence, so orchestration logic (recorder/player/transcoder
/// flows) can be exercised without a real Codec2/AMBE library present.
#[cfg(any(test, feature = "test-util"))]
pub struct NullVocoder;

#[cfg(any(test, feature = "test-util"))]
impl VocoderEncoder for NullVocoder {
    fn encode(&mut self, _samples: &[i16; 160]) -> Vec<u8> {
        vec![0u8; 9]
    }
}

#[cfg(any(test, feature = "test-util"))]
impl VocoderDecoder for NullVocoder {
    fn decode(&mut self, _frame: &[u8]) -> [i16; 160] {
        [0i16; 160]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_vocoder_encodes_to_nine_byte_silence() {
        let mut v = NullVocoder;
        let samples = [0i16; 160];
        assert_eq!(v.encode(&samples), vec![0u8; 9]);
    }

    #[test]
    fn null_vocoder_decodes_to_silence() {
        let mut v = NullVocoder;
        assert_eq!(v.decode(&[0u8; 9]), [0i16; 160]);
    }
}

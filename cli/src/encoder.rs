//! Encoder orchestration: read a mono 16-bit 8kHz WAV file, vocode it
//! 160 samples (20ms) at a time, and write the result as a `.dvtool`
//! recording.

use std::path::Path;

use dstar_vocoder::{codec2_2400, VocoderEncoder};
use dstar_wire::{
    Callsign, DstarFrame, DstarHeader, DvFramePacket, DvHeaderPacket, DvPacket, HeaderFlags3,
    Suffix, PACKET_ID_MODULUS,
};

const SAMPLES_PER_FRAME: usize = 160;
const NOCALL: &str = "NOCALL";
/// Slow-data sync pattern stamped into every 21st frame's `dvdata`.
const SYNC_PATTERN: [u8; 3] = [0x55, 0x2D, 0x16];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec2Mode {
    Rate3200,
    Rate2400Fec,
}

impl Codec2Mode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "3200" => Some(Self::Rate3200),
            "2400" => Some(Self::Rate2400Fec),
            _ => None,
        }
    }

    fn flag_3(self) -> u8 {
        match self {
            Self::Rate3200 => HeaderFlags3::CODEC2,
            Self::Rate2400Fec => HeaderFlags3::CODEC2 | HeaderFlags3::CODEC2_2400 | HeaderFlags3::FEC,
        }
    }
}

fn placeholder_header(mode: Codec2Mode) -> DstarHeader {
    let nocall = Callsign::new(NOCALL).unwrap();
    DstarHeader::new(nocall, Suffix::new(" ").unwrap(), nocall, nocall, nocall)
        .with_flag_3(mode.flag_3())
}

fn encode_frame(mode: Codec2Mode, raw: &[u8], packet_id: u8) -> DvFramePacket {
    let mut dvcodec = [0u8; 9];
    let voice_len = raw.len().min(9);
    dvcodec[..voice_len].copy_from_slice(&raw[..voice_len]);
    if mode == Codec2Mode::Rate2400Fec {
        codec2_2400::assemble_fec(&mut dvcodec);
    }
    let dvdata = if packet_id % PACKET_ID_MODULUS == 0 {
        SYNC_PATTERN
    } else {
        [0u8; 3]
    };
    let is_last = false; // corrected by the caller on the final frame
    DvFramePacket::new(
        0,
        packet_id,
        is_last,
        DstarFrame { dvcodec, dvdata },
    )
}

/// Encodes `samples` (8kHz mono PCM) into a DV stream, dropping any
/// trailing partial frame shorter than [`SAMPLES_PER_FRAME`].
pub fn encode_samples(
    samples: &[i16],
    mode: Codec2Mode,
    vocoder: &mut dyn VocoderEncoder,
) -> Vec<DvPacket> {
    let mut stream = vec![DvPacket::Header(DvHeaderPacket::new(
        0,
        placeholder_header(mode),
    ))];

    let mut packet_id = 0u8;
    let mut frames: Vec<DvFramePacket> = Vec::new();
    for chunk in samples.chunks(SAMPLES_PER_FRAME) {
        if chunk.len() < SAMPLES_PER_FRAME {
            break;
        }
        let mut buf = [0i16; SAMPLES_PER_FRAME];
        buf.copy_from_slice(chunk);
        let raw = vocoder.encode(&buf);
        frames.push(encode_frame(mode, &raw, packet_id % PACKET_ID_MODULUS));
        packet_id = packet_id.wrapping_add(1);
    }

    if let Some(last) = frames.last_mut() {
        last.is_last = true;
    }
    stream.extend(frames.into_iter().map(DvPacket::Frame));
    stream
}

pub fn run(input: &Path, output: &Path, mode: Codec2Mode) -> anyhow::Result<()> {
    let mut reader = hound::WavReader::open(input)?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_rate != 8000 {
        anyhow::bail!("input must be 1 channel, 16 bits/sample, 8000 samples/sec");
    }

    let samples: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;
    let mut vocoder = dstar_vocoder::NullVocoder;
    let stream = encode_samples(&samples, mode, &mut vocoder);

    dstar_wire::write_stream(std::fs::File::create(output)?, &stream)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentEncoder;
    impl VocoderEncoder for SilentEncoder {
        fn encode(&mut self, _samples: &[i16; 160]) -> Vec<u8> {
            vec![0u8; 9]
        }
    }

    #[test]
    fn drops_trailing_partial_frame() {
        let samples = vec![0i16; SAMPLES_PER_FRAME + 10];
        let mut v = SilentEncoder;
        let stream = encode_samples(&samples, Codec2Mode::Rate3200, &mut v);
        // 1 header + 1 full frame; the trailing 10 samples are dropped.
        assert_eq!(stream.len(), 2);
    }

    #[test]
    fn marks_final_frame_as_last() {
        let samples = vec![0i16; SAMPLES_PER_FRAME * 3];
        let mut v = SilentEncoder;
        let stream = encode_samples(&samples, Codec2Mode::Rate3200, &mut v);
        match stream.last().unwrap() {
            DvPacket::Frame(f) => assert!(f.is_last),
            _ => panic!("expected a frame"),
        }
    }

    #[test]
    fn rate_2400_assembles_fec_bytes() {
        let samples = vec![1i16; SAMPLES_PER_FRAME];
        let mut v = SilentEncoder;
        let stream = encode_samples(&samples, Codec2Mode::Rate2400Fec, &mut v);
        match &stream[1] {
            DvPacket::Frame(f) => {
                // FEC bytes for all-zero voice input are not all zero.
                assert_ne!(&f.frame.dvcodec[3..9], &[0u8; 6]);
            }
            _ => panic!("expected a frame"),
        }
    }
}

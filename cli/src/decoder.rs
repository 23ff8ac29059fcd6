//! Decoder orchestration: read a `.dvtool` recording and render it back
//! to a mono 16-bit 8kHz WAV file.

use std::path::Path;

use dstar_wire::{read_stream, DvPacket, HeaderFlags3};

const SAMPLE_RATE: u32 = 8000;

fn is_2400_fec(flag_3: u8) -> bool {
    flag_3 & HeaderFlags3::CODEC2 != 0 && flag_3 & HeaderFlags3::CODEC2_2400 != 0
}

/// Decodes a recorded stream into PCM samples, looking up the header's
/// `flag_3` once to decide whether each frame's trailing six bytes carry
/// Codec2-2400 FEC or raw vocoder bits.
pub fn decode_stream(
    packets: &[DvPacket],
    vocoder: &mut dyn dstar_vocoder::VocoderDecoder,
) -> Vec<i16> {
    let mut fec_mode = false;
    let mut samples = Vec::new();

    for packet in packets {
        match packet {
            DvPacket::Header(h) => fec_mode = is_2400_fec(h.header.flag_3),
            DvPacket::Frame(f) => {
                let payload = if fec_mode {
                    let (group1, group2) = dstar_vocoder::codec2_2400::extract_fec(&f.frame.dvcodec);
                    let mut raw = [0u8; 9];
                    raw[0] = (group1 >> 4) as u8;
                    raw[1] = ((group1 & 0x0F) << 4) as u8 | (group2 >> 8) as u8;
                    raw[2] = (group2 & 0xFF) as u8;
                    raw
                } else {
                    f.frame.dvcodec
                };
                samples.extend_from_slice(&vocoder.decode(&payload));
            }
        }
    }

    samples
}

pub fn run(input: &Path, output: &Path) -> anyhow::Result<()> {
    let packets = read_stream(std::fs::File::open(input)?)?;
    let mut vocoder = dstar_vocoder::NullVocoder;
    let samples = decode_stream(&packets, &mut vocoder);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(output, spec)?;
    for sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstar_wire::{Callsign, DstarFrame, DstarHeader, DvFramePacket, DvHeaderPacket, Suffix};

    fn sample_header(flag_3: u8) -> DstarHeader {
        DstarHeader::new(
            Callsign::new("SV9OAN").unwrap(),
            Suffix::new(" ").unwrap(),
            Callsign::new("CQCQCQ").unwrap(),
            Callsign::new("SV9OANB").unwrap(),
            Callsign::new("SV9OANG").unwrap(),
        )
        .with_flag_3(flag_3)
    }

    #[test]
    fn emits_160_samples_per_frame() {
        let packets = vec![
            DvPacket::Header(DvHeaderPacket::new(1, sample_header(HeaderFlags3::CODEC2))),
            DvPacket::Frame(DvFramePacket::new(1, 0, true, DstarFrame::silence())),
        ];
        let mut v = dstar_vocoder::NullVocoder;
        let samples = decode_stream(&packets, &mut v);
        assert_eq!(samples.len(), 160);
    }

    #[test]
    fn fec_mode_is_detected_from_header_flags() {
        assert!(!is_2400_fec(0));
        assert!(!is_2400_fec(HeaderFlags3::CODEC2));
        assert!(is_2400_fec(HeaderFlags3::CODEC2 | HeaderFlags3::CODEC2_2400));
    }

    #[test]
    fn multiple_frames_accumulate_samples() {
        let packets = vec![
            DvPacket::Header(DvHeaderPacket::new(2, sample_header(0))),
            DvPacket::Frame(DvFramePacket::new(2, 0, false, DstarFrame::silence())),
            DvPacket::Frame(DvFramePacket::new(2, 1, true, DstarFrame::silence())),
        ];
        let mut v = dstar_vocoder::NullVocoder;
        let samples = decode_stream(&packets, &mut v);
        assert_eq!(samples.len(), 320);
    }
}

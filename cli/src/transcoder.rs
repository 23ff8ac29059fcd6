//! Transcoder orchestration: replay every frame of a recorded stream
//! through AMBEd, swap the voice payloads for the transcoded codec and
//! rewrite the header's vocoder hint, then write the result out.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use dstar_core::timing::HANDSHAKE_TIMEOUT;
use dstar_transcoder::{implied_codecs_out, AmbedClient, Codec};
use dstar_wire::{read_stream, write_stream, Callsign, DvFramePacket, DvPacket, HeaderFlags3};

const RECV_TIMEOUT: Duration = HANDSHAKE_TIMEOUT;

/// Maps a header's `flag_3` vocoder hint to the AMBEd codec tag carried
/// in input frames. `flag_3` can't distinguish AMBEPLUS from AMBE2PLUS
/// when the source is an AMBE-family stream, so an AMBE source is always
/// treated as AMBEPLUS.
pub fn detect_codec_in(flag_3: u8) -> u8 {
    let is_codec2 = flag_3 & HeaderFlags3::CODEC2 != 0;
    let is_2400 = flag_3 & HeaderFlags3::CODEC2_2400 != 0;
    match (is_codec2, is_2400) {
        (false, _) => Codec::AMBEPLUS,
        (true, true) => Codec::CODEC2_2400,
        (true, false) => Codec::CODEC2_3200,
    }
}

/// Reverse of [`detect_codec_in`]: the `flag_3` to stamp on the rewritten
/// header for a given output codec.
pub fn flag3_for_codec(codec: u8) -> u8 {
    match codec {
        Codec::CODEC2_2400 => HeaderFlags3::CODEC2 | HeaderFlags3::CODEC2_2400 | HeaderFlags3::FEC,
        Codec::CODEC2_3200 => HeaderFlags3::CODEC2,
        _ => 0, // AMBEPLUS / AMBE2PLUS
    }
}

/// Picks a single codec out of a `codecs_out` bitset by its lowest set bit.
fn lowest_set_bit(bits: u8) -> u8 {
    bits & bits.wrapping_neg()
}

pub async fn run(
    my_callsign: Callsign,
    host: IpAddr,
    input: &Path,
    output: &Path,
) -> anyhow::Result<()> {
    let packets = read_stream(std::fs::File::open(input)?)?;

    let header_index = packets
        .iter()
        .position(|p| matches!(p, DvPacket::Header(_)))
        .ok_or_else(|| anyhow::anyhow!("recording has no header packet"))?;
    let DvPacket::Header(header_packet) = &packets[header_index] else {
        unreachable!()
    };

    let codec_in = detect_codec_in(header_packet.header.flag_3);
    let codec_out = lowest_set_bit(implied_codecs_out(codec_in));

    let mut client = AmbedClient::connect(my_callsign, host).await?;
    let mut stream = client.open_stream(codec_in).await?;

    let frame_payloads: Vec<[u8; 9]> = packets
        .iter()
        .filter_map(|p| match p {
            DvPacket::Frame(f) => Some(f.frame.dvcodec),
            DvPacket::Header(_) => None,
        })
        .collect();
    stream.send_burst(&frame_payloads).await?;

    let mut transcoded = Vec::with_capacity(frame_payloads.len());
    for _ in &frame_payloads {
        let payload = stream
            .recv_frame(codec_out, RECV_TIMEOUT)
            .await?
            .ok_or_else(|| anyhow::anyhow!("AMBEd stopped returning transcoded frames"))?;
        transcoded.push(payload);
    }

    client.close_stream(stream).await?;

    let mut out_packets = packets.clone();
    if let DvPacket::Header(h) = &mut out_packets[header_index] {
        h.header = h.header.with_flag_3(flag3_for_codec(codec_out));
    }
    let mut frame_idx = 0;
    for packet in out_packets.iter_mut() {
        if let DvPacket::Frame(f) = packet {
            let mut frame = f.frame;
            frame.dvcodec = transcoded[frame_idx];
            *f = DvFramePacket::new(f.stream_id, f.packet_id, f.is_last, frame);
            frame_idx += 1;
        }
    }

    write_stream(std::fs::File::create(output)?, &out_packets)?;
    Ok(())
}

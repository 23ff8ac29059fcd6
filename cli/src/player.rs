//! Player orchestration: rewrite a recorded stream's header fields for a
//! new callsign/reflector/module, assign fresh stream ids, and write it
//! out at 20ms pacing.

use std::path::Path;

use dstar_core::timing::FRAME_PACING;
use dstar_wire::{read_stream, Callsign, DvFramePacket, DvHeaderPacket, DvPacket, Module, Suffix};
use rand::Rng;

use crate::connection::ReflectorConnection;

const CQCQCQ: &str = "CQCQCQ";
const REPEATER_MODULE_GATEWAY: char = 'G';

/// Builds the repeater-1/repeater-2 callsigns the player announces: the
/// first 7 bytes of the reflector's space-padded 8-byte callsign field,
/// plus the target module for repeater-1, and the fixed 'G' (gateway)
/// module for repeater-2. Slicing the padded field (not the trimmed
/// string) keeps the module in the fixed 8th byte regardless of how
/// short the reflector's real name is.
fn repeater_callsigns(reflector: &Callsign, module: Module) -> (Callsign, Callsign) {
    let padded = reflector.to_bytes();
    let mut repeater_1_bytes = [0u8; Callsign::SIZE];
    repeater_1_bytes[..7].copy_from_slice(&padded[..7]);
    repeater_1_bytes[7] = module.to_byte();

    let mut repeater_2_bytes = repeater_1_bytes;
    repeater_2_bytes[7] = REPEATER_MODULE_GATEWAY as u8;

    (
        Callsign::from_wire_bytes(repeater_1_bytes),
        Callsign::from_wire_bytes(repeater_2_bytes),
    )
}

/// Rewrites one recorded packet for playback: a fresh header gets a new
/// MY callsign/suffix/UR/repeater fields and a random stream id; a frame
/// is re-tagged with the same new stream id, its payload untouched.
fn rewrite_packet(
    packet: DvPacket,
    my_callsign: Callsign,
    reflector: &Callsign,
    module: Module,
    stream_id: u16,
) -> DvPacket {
    match packet {
        DvPacket::Header(h) => {
            let (repeater_1, repeater_2) = repeater_callsigns(reflector, module);
            let mut header = h.header;
            header.my_call = my_callsign;
            header.my_suffix = Suffix::new(" ").unwrap();
            header.your_call = Callsign::new(CQCQCQ).unwrap();
            header.repeater_1 = repeater_1;
            header.repeater_2 = repeater_2;
            DvPacket::Header(DvHeaderPacket::new(stream_id, header))
        }
        DvPacket::Frame(f) => DvPacket::Frame(DvFramePacket::new(
            stream_id,
            f.packet_id,
            f.is_last,
            f.frame,
        )),
    }
}

/// Loads a `.dvtool` recording, rewrites it for `my_callsign`/`reflector`/
/// `module`, opens `conn` and writes the stream at [`FRAME_PACING`].
pub async fn run(
    conn: ReflectorConnection,
    input: &Path,
    my_callsign: Callsign,
    reflector: Callsign,
    module: Module,
) -> anyhow::Result<()> {
    let recorded = read_stream(std::fs::File::open(input)?)?;
    let stream_id: u16 = rand::thread_rng().gen();

    for packet in recorded {
        let rewritten = rewrite_packet(packet, my_callsign, &reflector, module, stream_id);
        match &rewritten {
            DvPacket::Header(h) => conn.write_header(h).await?,
            DvPacket::Frame(f) => conn.write_frame(f).await?,
        }
        tokio::time::sleep(FRAME_PACING).await;
    }

    conn.disconnect().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstar_wire::DstarHeader;

    #[test]
    fn repeater_callsigns_take_first_seven_chars_plus_module() {
        let reflector = Callsign::new("XRF757A").unwrap();
        let module = Module::new("B").unwrap();
        let (rpt1, rpt2) = repeater_callsigns(&reflector, module);
        assert!(rpt1.trimmed().ends_with('B'));
        assert!(rpt2.trimmed().ends_with('G'));
    }

    #[test]
    fn repeater_callsigns_put_module_in_eighth_byte_for_short_reflector() {
        // "XRF757" is only 6 real characters (the common case); the module
        // must still land in the fixed 8th byte, not get dropped because
        // the padded name was trimmed before slicing.
        let reflector = Callsign::new("XRF757").unwrap();
        let module = Module::new("B").unwrap();
        let (rpt1, rpt2) = repeater_callsigns(&reflector, module);
        assert_eq!(rpt1.to_bytes()[7], b'B');
        assert_eq!(rpt2.to_bytes()[7], b'G');
    }

    #[test]
    fn rewrite_header_sets_expected_fields() {
        let original = DstarHeader::new(
            Callsign::new("OLDCALL").unwrap(),
            Suffix::new("B").unwrap(),
            Callsign::new("OLDUR").unwrap(),
            Callsign::new("OLDRP1").unwrap(),
            Callsign::new("OLDRP2").unwrap(),
        );
        let packet = DvPacket::Header(DvHeaderPacket::new(1, original));
        let my = Callsign::new("SV9OAN").unwrap();
        let reflector = Callsign::new("XRF757A").unwrap();
        let module = Module::new("B").unwrap();

        let rewritten = rewrite_packet(packet, my, &reflector, module, 42);
        match rewritten {
            DvPacket::Header(h) => {
                assert_eq!(h.stream_id, 42);
                assert_eq!(h.header.my_call, my);
                assert_eq!(h.header.your_call.trimmed(), CQCQCQ);
                assert!(h.header.repeater_1.trimmed().ends_with('B'));
                assert!(h.header.repeater_2.trimmed().ends_with('G'));
            }
            _ => panic!("expected a header"),
        }
    }

    #[test]
    fn rewrite_frame_carries_new_stream_id() {
        let frame = DvFramePacket::new(1, 3, false, dstar_wire::DstarFrame::silence());
        let packet = DvPacket::Frame(frame);
        let my = Callsign::new("SV9OAN").unwrap();
        let reflector = Callsign::new("XRF757A").unwrap();
        let module = Module::new("B").unwrap();

        let rewritten = rewrite_packet(packet, my, &reflector, module, 99);
        match rewritten {
            DvPacket::Frame(f) => {
                assert_eq!(f.stream_id, 99);
                assert_eq!(f.packet_id, 3);
            }
            _ => panic!("expected a frame"),
        }
    }
}

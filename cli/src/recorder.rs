//! Recorder orchestration: buffer DV frames per stream, flush each stream
//! to `"<stream_id>.dvtool"` once its last frame arrives.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dstar_wire::{write_stream, DvPacket};

use crate::connection::{ReflectorConnection, ReflectorEvent};

const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Feeds one reflector event into the per-stream buffers. Returns the
/// completed stream (and clears its buffer) once a frame with the "last"
/// bit arrives. Frames whose `stream_id` has no open buffer are ignored.
pub fn process_event(
    buffers: &mut HashMap<u16, Vec<DvPacket>>,
    event: ReflectorEvent,
) -> Option<(u16, Vec<DvPacket>)> {
    match event {
        ReflectorEvent::DvHeader(header) => {
            let stream_id = header.stream_id;
            buffers.insert(stream_id, vec![DvPacket::Header(header)]);
            None
        }
        ReflectorEvent::DvFrame(frame) => {
            let stream_id = frame.stream_id;
            let is_last = frame.is_last;
            let buf = buffers.get_mut(&stream_id)?;
            buf.push(DvPacket::Frame(frame));
            if is_last {
                buffers.remove(&stream_id).map(|packets| (stream_id, packets))
            } else {
                None
            }
        }
        ReflectorEvent::PeerDisconnected => None,
    }
}

fn stream_path(dir: &Path, stream_id: u16) -> PathBuf {
    dir.join(format!("{stream_id}.dvtool"))
}

/// Drives a reflector connection to completion, writing each finished
/// stream into `out_dir`. Runs until the peer disconnects or a read
/// fails; any stream still buffered at that point (no last frame seen)
/// is discarded rather than flushed.
pub async fn run(mut conn: ReflectorConnection, out_dir: &Path) -> anyhow::Result<()> {
    let mut buffers: HashMap<u16, Vec<DvPacket>> = HashMap::new();

    loop {
        match conn.read(READ_TIMEOUT).await {
            Ok(Some(event)) => {
                let flushed = process_event(&mut buffers, event);
                if let Some((stream_id, packets)) = flushed {
                    let path = stream_path(out_dir, stream_id);
                    let file = std::fs::File::create(&path)?;
                    write_stream(file, &packets)?;
                    tracing::info!(stream_id, path = %path.display(), "stream recorded");
                }
            }
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "reflector read failed, closing");
                break;
            }
        }
    }

    conn.disconnect().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dstar_wire::{Callsign, DstarFrame, DstarHeader, DvFramePacket, DvHeaderPacket, Suffix};

    fn sample_header(stream_id: u16) -> DvHeaderPacket {
        let header = DstarHeader::new(
            Callsign::new("SV9OAN").unwrap(),
            Suffix::new(" ").unwrap(),
            Callsign::new("CQCQCQ").unwrap(),
            Callsign::new("SV9OANB").unwrap(),
            Callsign::new("SV9OANG").unwrap(),
        );
        DvHeaderPacket::new(stream_id, header)
    }

    #[test]
    fn full_22_record_stream_flushes_on_last_frame() {
        let mut buffers = HashMap::new();
        assert!(process_event(&mut buffers, ReflectorEvent::DvHeader(sample_header(7))).is_none());

        let mut flushed = None;
        for i in 0..21u8 {
            let frame =
                DvFramePacket::new(7, i, i == 20, DstarFrame::silence());
            flushed = process_event(&mut buffers, ReflectorEvent::DvFrame(frame));
        }

        let (stream_id, packets) = flushed.expect("last frame should flush the stream");
        assert_eq!(stream_id, 7);
        assert_eq!(packets.len(), 22); // 1 header + 21 frames
        assert!(buffers.is_empty());
    }

    #[test]
    fn frame_with_mismatched_stream_id_is_ignored() {
        let mut buffers = HashMap::new();
        process_event(&mut buffers, ReflectorEvent::DvHeader(sample_header(7)));

        let stray = DvFramePacket::new(99, 0, false, DstarFrame::silence());
        assert!(process_event(&mut buffers, ReflectorEvent::DvFrame(stray)).is_none());
        assert_eq!(buffers.get(&7).unwrap().len(), 1);
    }

    #[test]
    fn incomplete_stream_stays_buffered_until_last_bit() {
        let mut buffers = HashMap::new();
        process_event(&mut buffers, ReflectorEvent::DvHeader(sample_header(3)));
        let mid_frame = DvFramePacket::new(3, 0, false, DstarFrame::silence());
        assert!(process_event(&mut buffers, ReflectorEvent::DvFrame(mid_frame)).is_none());
        assert_eq!(buffers.get(&3).unwrap().len(), 2);
    }
}

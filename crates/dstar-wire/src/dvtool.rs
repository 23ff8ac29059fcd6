//! The `.dvtool` recording container: a magic, a packet count, and that
//! many length-prefixed DSVT packets — the first always a header, the
//! rest always frames.

use std::io::{Read, Write};

use crate::dsvt::{DvFramePacket, DvHeaderPacket};
use crate::error::WireError;

const MAGIC: &[u8; 6] = b"DVTOOL";

/// One packet of a recorded stream, tagged by which DSVT envelope it came
/// wrapped in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DvPacket {
    Header(DvHeaderPacket),
    Frame(DvFramePacket),
}

/// Serializes a full stream (header first, then frames) to the `.dvtool`
/// container format.
pub fn write_stream<W: Write>(mut out: W, stream: &[DvPacket]) -> Result<(), WireError> {
    out.write_all(MAGIC)?;
    out.write_all(&(stream.len() as u32).to_le_bytes())?;
    for packet in stream {
        match packet {
            DvPacket::Header(p) => {
                out.write_all(&(DvHeaderPacket::SIZE as u16).to_le_bytes())?;
                out.write_all(&p.encode())?;
            }
            DvPacket::Frame(p) => {
                out.write_all(&(DvFramePacket::SIZE as u16).to_le_bytes())?;
                out.write_all(&p.encode())?;
            }
        }
    }
    Ok(())
}

/// Reads back a stream previously written by [`write_stream`]. The first
/// record must be `DvHeaderPacket`-sized; every subsequent record must be
/// `DvFramePacket`-sized.
pub fn read_stream<R: Read>(mut input: R) -> Result<Vec<DvPacket>, WireError> {
    let mut magic = [0u8; 6];
    input.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(WireError::BadMagic(format!("{:?}", magic)));
    }

    let mut count_buf = [0u8; 4];
    input.read_exact(&mut count_buf)?;
    let count = u32::from_le_bytes(count_buf);

    let mut stream = Vec::with_capacity(count as usize);
    for i in 0..count {
        let mut size_buf = [0u8; 2];
        input.read_exact(&mut size_buf)?;
        let size = u16::from_le_bytes(size_buf) as usize;

        let mut data = vec![0u8; size];
        input.read_exact(&mut data)?;

        if i == 0 {
            if size != DvHeaderPacket::SIZE {
                return Err(WireError::Malformed(format!(
                    "first dvtool record is {size} bytes, expected {}",
                    DvHeaderPacket::SIZE
                )));
            }
            stream.push(DvPacket::Header(DvHeaderPacket::decode(&data)?));
        } else {
            if size != DvFramePacket::SIZE {
                return Err(WireError::Malformed(format!(
                    "dvtool record {i} is {size} bytes, expected {}",
                    DvFramePacket::SIZE
                )));
            }
            stream.push(DvPacket::Frame(DvFramePacket::decode(&data)?));
        }
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callsign::{Callsign, Suffix};
    use crate::header::{DstarFrame, DstarHeader};

    fn sample_stream() -> Vec<DvPacket> {
        let header = DstarHeader::new(
            Callsign::new("SV9OAN").unwrap(),
            Suffix::new(" ").unwrap(),
            Callsign::new("CQCQCQ").unwrap(),
            Callsign::new("SV9OANB").unwrap(),
            Callsign::new("SV9OANG").unwrap(),
        );
        let mut stream = vec![DvPacket::Header(DvHeaderPacket::new(99, header))];
        for i in 0..5u8 {
            stream.push(DvPacket::Frame(DvFramePacket::new(
                99,
                i,
                i == 4,
                DstarFrame::silence(),
            )));
        }
        stream
    }

    #[test]
    fn round_trip() {
        let stream = sample_stream();
        let mut buf = Vec::new();
        write_stream(&mut buf, &stream).unwrap();
        assert_eq!(&buf[0..6], b"DVTOOL");

        let read_back = read_stream(&buf[..]).unwrap();
        assert_eq!(read_back, stream);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = Vec::new();
        write_stream(&mut buf, &sample_stream()).unwrap();
        buf[0] = b'X';
        assert!(read_stream(&buf[..]).is_err());
    }

    #[test]
    fn rejects_wrong_first_record_size() {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&27u16.to_le_bytes());
        buf.extend_from_slice(&[0u8; 27]);
        assert!(read_stream(&buf[..]).is_err());
    }
}

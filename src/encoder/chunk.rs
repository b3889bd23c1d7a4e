//! PNG chunk framing.

use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};

pub const IHDR: [u8; 4] = *b"IHDR";
pub const IDAT: [u8; 4] = *b"IDAT";
pub const IEND: [u8; 4] = *b"IEND";

/// CRC-32 over the chunk type and its data.
pub fn chunk_crc(kind: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    hasher.finalize()
}

/// Writes one chunk: length, type, data and CRC.
pub fn write_chunk<W: Write>(w: &mut W, kind: &[u8; 4], data: &[u8]) -> io::Result<()> {
    let len = u32::try_from(data.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "chunk too large"))?;

    w.write_u32::<BigEndian>(len)?;
    w.write_all(kind)?;
    w.write_all(data)?;
    w.write_u32::<BigEndian>(chunk_crc(kind, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iend_has_the_well_known_crc() {
        let mut out = Vec::new();
        write_chunk(&mut out, &IEND, &[]).unwrap();
        assert_eq!(
            out,
            [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xae, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn length_is_big_endian() {
        let mut out = Vec::new();
        let data = vec![7u8; 0x0102];
        write_chunk(&mut out, &IDAT, &data).unwrap();

        assert_eq!(&out[..4], &[0, 0, 1, 2]);
        assert_eq!(&out[4..8], b"IDAT");
        assert_eq!(out.len(), 4 + 4 + data.len() + 4);

        let tail = &out[out.len() - 4..];
        let crc = u32::from_be_bytes([tail[0], tail[1], tail[2], tail[3]]);
        assert_eq!(crc, chunk_crc(&IDAT, &data));
    }
}

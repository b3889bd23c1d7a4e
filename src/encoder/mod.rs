//! PNG encoding of RGBA8 pixel buffers.
//!
//! The output is a plain, non-interlaced, 8-bit RGBA PNG: the signature, an `IHDR`
//! chunk, the filtered and deflated pixel data split into `IDAT` chunks, and `IEND`.

use byteorder::{BigEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use std::io::Write;

use crate::error::EncodingError;
use crate::surface_utils::Surface;

mod chunk;
mod filter;

pub use chunk::{chunk_crc, IDAT, IEND, IHDR};
pub use filter::FilterStrategy;
pub use flate2::Compression;

/// The eight bytes at the start of every PNG file.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Largest payload of a single `IDAT` chunk.
pub const MAX_IDAT_SIZE: usize = 32 * 1024;

/// PNG limits width and height to 2³¹ - 1.
const MAX_DIMENSION: u32 = 0x7fff_ffff;

/// Row-major straight-alpha RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps `data`, checking that it holds exactly `width × height` pixels.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<PixelBuffer, EncodingError> {
        let expected = usize::try_from(width)
            .ok()
            .and_then(|w| w.checked_mul(usize::try_from(height).ok()?))
            .and_then(|n| n.checked_mul(4))
            .ok_or(EncodingError::InvalidDimensions { width, height })?;

        if data.len() != expected {
            return Err(EncodingError::BufferSize {
                expected,
                actual: data.len(),
            });
        }

        Ok(PixelBuffer {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl From<Surface> for PixelBuffer {
    fn from(surface: Surface) -> PixelBuffer {
        let width = surface.width();
        let height = surface.height();

        PixelBuffer {
            width,
            height,
            data: surface.into_straight_rgba(),
        }
    }
}

/// Options for [`encode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    pub filter_strategy: FilterStrategy,
    pub compression: Compression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            filter_strategy: FilterStrategy::default(),
            compression: Compression::default(),
        }
    }
}

fn ihdr_data(width: u32, height: u32) -> Result<Vec<u8>, EncodingError> {
    let mut data = Vec::with_capacity(13);

    data.write_u32::<BigEndian>(width)?;
    data.write_u32::<BigEndian>(height)?;
    data.write_all(&[
        8, // bit depth
        6, // color type: RGBA
        0, // compression method: deflate
        0, // filter method: adaptive
        0, // interlace method: none
    ])?;

    Ok(data)
}

/// Encodes `buffer` as a PNG image.
///
/// Either the complete file is returned, or an error; never a partial stream.
pub fn encode(buffer: PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>, EncodingError> {
    let PixelBuffer {
        width,
        height,
        data,
    } = buffer;

    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(EncodingError::InvalidDimensions { width, height });
    }

    let stride = width as usize * 4;
    let filtered = filter::filter_image(&data, stride, options.filter_strategy);
    drop(data);

    let mut zlib = ZlibEncoder::new(Vec::new(), options.compression);
    zlib.write_all(&filtered)?;
    let compressed = zlib.finish()?;

    let mut png = Vec::with_capacity(compressed.len() + 64);
    png.extend_from_slice(&SIGNATURE);

    chunk::write_chunk(&mut png, &IHDR, &ihdr_data(width, height)?)?;

    for part in compressed.chunks(MAX_IDAT_SIZE) {
        chunk::write_chunk(&mut png, &IDAT, part)?;
    }

    chunk::write_chunk(&mut png, &IEND, &[])?;

    Ok(png)
}

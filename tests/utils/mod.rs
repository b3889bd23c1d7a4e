//! Helpers shared by the integration tests.

#![allow(dead_code)]

use svg2png::{ConversionError, Converter, Session, SizingRequest};

/// A decoded PNG with straight-alpha RGBA8 pixels.
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Image {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "({x}, {y}) is outside the image");
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|p| p[3] == 0)
    }
}

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const LIME: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];
pub const BLACK: [u8; 4] = [0, 0, 0, 255];
pub const CLEAR: [u8; 4] = [0, 0, 0, 0];

/// A converter that does not log.
pub fn converter() -> Converter {
    Converter::new().with_session(Session::new_for_test_suite())
}

pub fn convert(svg: &str, request: SizingRequest) -> Result<Vec<u8>, ConversionError> {
    converter().convert(svg, request)
}

/// Decodes a PNG with the `png` crate, checking that it is 8-bit RGBA.
pub fn decode(png_bytes: &[u8]) -> Image {
    let decoder = png::Decoder::new(png_bytes);
    let mut reader = decoder.read_info().unwrap();

    let mut data = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut data).unwrap();
    data.truncate(info.buffer_size());

    assert_eq!(info.color_type, png::ColorType::Rgba);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);

    Image {
        width: info.width,
        height: info.height,
        data,
    }
}

/// Converts at the document's own size and decodes the result.
pub fn render(svg: &str) -> Image {
    decode(&convert(svg, SizingRequest::Intrinsic).unwrap())
}

/// Splits a PNG stream into its chunks, as `(type, data, stored crc)`.
pub fn chunks(png_bytes: &[u8]) -> Vec<([u8; 4], Vec<u8>, u32)> {
    let mut out = Vec::new();
    let mut rest = &png_bytes[8..];

    while rest.len() >= 12 {
        let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let kind = [rest[4], rest[5], rest[6], rest[7]];
        let data = rest[8..8 + len].to_vec();
        let c = &rest[8 + len..12 + len];
        let crc = u32::from_be_bytes([c[0], c[1], c[2], c[3]]);

        out.push((kind, data, crc));
        rest = &rest[12 + len..];
    }

    assert!(rest.is_empty(), "trailing bytes after the last chunk");
    out
}

//! Checks on the structure of the PNG stream itself.

use svg2png::tests_only::{chunk_crc, MAX_IDAT_SIZE, SIGNATURE};
use svg2png::{Compression, FilterStrategy, SizingRequest};

mod utils;

use utils::{chunks, converter, decode};

const GRADIENT: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="64" height="48">
  <radialGradient id="g">
    <stop offset="0" stop-color="yellow"/>
    <stop offset="1" stop-color="navy" stop-opacity="0.5"/>
  </radialGradient>
  <rect width="64" height="48" fill="url(#g)"/>
  <circle cx="20" cy="20" r="12" fill="none" stroke="green" stroke-width="3"/>
</svg>"##;

fn convert_with(strategy: FilterStrategy, compression: Compression) -> Vec<u8> {
    converter()
        .with_filter_strategy(strategy)
        .with_compression(compression)
        .convert(GRADIENT, SizingRequest::Intrinsic)
        .unwrap()
}

#[test]
fn stream_starts_with_the_signature() {
    let png = convert_with(FilterStrategy::Adaptive, Compression::default());
    assert_eq!(png[..8], SIGNATURE);
}

#[test]
fn chunks_are_ihdr_idat_iend() {
    let png = convert_with(FilterStrategy::Adaptive, Compression::default());
    let chunks = chunks(&png);

    assert_eq!(&chunks[0].0, b"IHDR");
    assert_eq!(&chunks.last().unwrap().0, b"IEND");
    assert!(chunks.last().unwrap().1.is_empty());

    let middle = &chunks[1..chunks.len() - 1];
    assert!(!middle.is_empty());
    assert!(middle.iter().all(|(kind, _, _)| kind == b"IDAT"));
}

#[test]
fn header_describes_8_bit_rgba() {
    let png = convert_with(FilterStrategy::Adaptive, Compression::default());
    let (_, ihdr, _) = &chunks(&png)[0];

    assert_eq!(ihdr.len(), 13);
    assert_eq!(ihdr[..4], 64u32.to_be_bytes());
    assert_eq!(ihdr[4..8], 48u32.to_be_bytes());
    // bit depth, color type, compression, filter method, interlace
    assert_eq!(ihdr[8..], [8, 6, 0, 0, 0]);
}

#[test]
fn every_chunk_has_a_valid_crc() {
    let png = convert_with(FilterStrategy::Adaptive, Compression::default());

    for (kind, data, crc) in chunks(&png) {
        assert_eq!(
            chunk_crc(&kind, &data),
            crc,
            "bad CRC in {} chunk",
            String::from_utf8_lossy(&kind)
        );
    }
}

#[test]
fn filter_strategies_decode_to_the_same_pixels() {
    let reference = decode(&convert_with(FilterStrategy::None, Compression::default()));

    for strategy in [
        FilterStrategy::Sub,
        FilterStrategy::Up,
        FilterStrategy::Average,
        FilterStrategy::Paeth,
        FilterStrategy::Adaptive,
    ] {
        let img = decode(&convert_with(strategy, Compression::default()));
        assert!(img.data == reference.data, "{strategy:?} changed the pixels");
    }
}

#[test]
fn compression_level_does_not_change_the_pixels() {
    let stored = convert_with(FilterStrategy::Adaptive, Compression::none());
    let best = convert_with(FilterStrategy::Adaptive, Compression::best());

    assert!(stored.len() > best.len());
    assert!(decode(&stored).data == decode(&best).data);
}

#[test]
fn output_is_deterministic() {
    let a = convert_with(FilterStrategy::Adaptive, Compression::default());
    let b = convert_with(FilterStrategy::Adaptive, Compression::default());
    assert!(a == b);
}

#[test]
fn large_images_split_the_pixel_data() {
    let png = converter()
        .with_compression(Compression::none())
        .convert(GRADIENT, SizingRequest::Width(600.0))
        .unwrap();

    let idats: Vec<_> = chunks(&png)
        .into_iter()
        .filter(|(kind, _, _)| kind == b"IDAT")
        .collect();

    assert!(idats.len() > 1);
    assert!(idats.iter().all(|(_, data, _)| data.len() <= MAX_IDAT_SIZE));

    let img = decode(&png);
    assert_eq!((img.width, img.height), (600, 450));
}

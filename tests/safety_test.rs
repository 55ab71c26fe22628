//! Safety tests - basic validation of resource limits and malformed input
//!
//! These tests verify that safety limits and checks are in place.
//! Comprehensive testing should be done with fuzzing (cargo-fuzz).

use png_io::{
    test_utils::{PngBuilder, TrickleReader},
    Error, Header, ParseOptions, Parser, DEFAULT_CHUNK_SIZE, MAX_CHUNK_LENGTH, MAX_IMAGE_DATA,
};
use std::io::Cursor;

fn one_pixel() -> Header {
    Header {
        width: 1,
        height: 1,
        bit_depth: 8,
        ..Default::default()
    }
}

#[test]
fn test_limit_constants() {
    assert_eq!(MAX_CHUNK_LENGTH, 0x7FFF_FFFF, "PNG chunk length limit");
    assert_eq!(MAX_IMAGE_DATA, 256 * 1024 * 1024, "256 MB limit");
    assert_eq!(DEFAULT_CHUNK_SIZE, 64 * 1024);
}

#[test]
fn test_png_chunk_length_validation() {
    // PNG with chunk claiming a length above 2^31 - 1
    let png = PngBuilder::new()
        .raw(&[0xFF, 0xFF, 0xFF, 0xFF])
        .raw(b"IHDR")
        .raw(&[0; 17])
        .build();

    match Parser::new().parse_bytes(&png) {
        Err(Error::ChunkTooLarge { offset, length }) => {
            assert_eq!(offset, 8);
            assert_eq!(length, u32::MAX);
        }
        other => panic!("expected ChunkTooLarge, got {:?}", other),
    }
}

#[test]
fn test_huge_declared_length_without_data() {
    // 2 GB declared, nothing behind it: must fail on the short read, not on allocation
    let png = PngBuilder::new()
        .raw(&MAX_CHUNK_LENGTH.to_be_bytes())
        .raw(b"IDAT")
        .raw(&[0; 100])
        .build();

    match Parser::new().parse_bytes(&png) {
        Err(Error::ChunkDataRead { expected, got, .. }) => {
            assert_eq!(expected, MAX_CHUNK_LENGTH as usize);
            assert_eq!(got, 100);
        }
        other => panic!("expected ChunkDataRead, got {:?}", other),
    }
}

#[test]
fn test_decompression_bomb_limited() {
    // 16 MB of zeros compresses to a few KB
    let png = PngBuilder::new()
        .ihdr(&one_pixel())
        .idat(&vec![0u8; 16 * 1024 * 1024])
        .iend()
        .build();
    assert!(png.len() < 100 * 1024);

    let parser = Parser::with_options(ParseOptions::new().max_image_data(1024 * 1024));
    assert!(matches!(
        parser.parse_bytes(&png),
        Err(Error::DataTooLarge { max, .. }) if max == 1024 * 1024
    ));
}

#[test]
fn test_limit_applies_across_chunks() {
    let png = PngBuilder::new()
        .ihdr(&one_pixel())
        .idat(&[0u8; 600])
        .idat(&[0u8; 600])
        .iend()
        .build();

    let parser = Parser::with_options(ParseOptions::new().max_image_data(1000));
    assert!(matches!(
        parser.parse_bytes(&png),
        Err(Error::DataTooLarge { .. })
    ));

    let parser = Parser::with_options(ParseOptions::new().max_image_data(1200));
    assert_eq!(parser.parse_bytes(&png).unwrap().image_data.len(), 1200);
}

#[test]
fn test_short_reads_never_truncate() {
    // Payload larger than one read step, delivered a few bytes at a time
    let text = vec![b'z'; DEFAULT_CHUNK_SIZE + 1000];
    let png = PngBuilder::new()
        .ihdr(&one_pixel())
        .chunk(b"tEXt", &text)
        .idat(&[0, 0])
        .iend()
        .build();

    let source = TrickleReader::new(Cursor::new(png), 4093).interrupt_every(5);
    let image = Parser::new().parse(source).unwrap();
    assert_eq!(image.image_data, vec![0, 0]);
}

#[test]
fn test_garbage_never_panics() {
    let mut state = 0x1234_5678u32;
    for len in 0..200usize {
        let mut data = PngBuilder::new().build();
        for _ in 0..len {
            // xorshift
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            data.push(state as u8);
        }
        let _ = Parser::new().parse_bytes(&data);
        let _ = Parser::with_options(ParseOptions::strict()).parse_bytes(&data);
    }
}

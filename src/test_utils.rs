//! Test utilities for building PNG streams and working with fixture files.
//!
//! This module provides helpers for:
//! - Embedded fixtures (when `embed-fixtures` feature is enabled)
//! - File-based fixtures from `tests/fixtures/`
//! - Extended fixtures from custom directories (via `PNG_TEST_FIXTURES` env var)
//! - Synthesizing chunk streams with [`PngBuilder`], including bad CRCs
//! - Simulating slow sources with [`TrickleReader`]
//!
//! # Usage
//!
//! ```no_run
//! use png_io::test_utils::*;
//! use png_io::{Header, Parser};
//!
//! # fn example() -> png_io::Result<()> {
//! // Use predefined fixture constants
//! let image = Parser::new().parse_file(fixture_path(GRAY_2X2))?;
//!
//! // Or build a stream in memory
//! let png = PngBuilder::new()
//!     .ihdr(&Header { width: 1, height: 1, bit_depth: 8, ..Default::default() })
//!     .idat(&[0, 0])
//!     .iend()
//!     .build();
//! let image = Parser::new().parse_bytes(&png)?;
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashMap,
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    sync::LazyLock,
};

use byteorder::{BigEndian, ByteOrder};
use flate2::{write::ZlibEncoder, Compression};

use crate::{crc::checksum, header::Header, signature::PNG_SIGNATURE, Error, Result};

/// Macro to define fixtures with embedded data and file fallback
macro_rules! define_fixtures {
    ($($name:ident => $file:expr),* $(,)?) => {
        // Define constants for fixture names
        $(
            #[allow(dead_code)]
            pub const $name: &str = $file;
        )*

        // Create embedded registry (small files compiled into binary)
        static EMBEDDED_FIXTURES: LazyLock<HashMap<&'static str, &'static [u8]>> =
            LazyLock::new(|| {
                #[allow(unused_mut)]
                let mut map = HashMap::new();
                $(
                    // Only embed if feature is enabled
                    #[cfg(feature = "embed-fixtures")]
                    {
                        let bytes: &'static [u8] =
                            include_bytes!(concat!("../tests/fixtures/", $file));
                        map.insert($file, bytes);
                    }
                )*
                map
            });

        /// Get the embedded fixtures registry
        pub fn get_registry() -> &'static HashMap<&'static str, &'static [u8]> {
            &EMBEDDED_FIXTURES
        }

        /// List all defined fixtures
        pub fn list_all_fixtures() -> Vec<&'static str> {
            vec![$($file),*]
        }
    };
}

define_fixtures!(
    GRAY_2X2 => "gray_2x2.png",                 // 2x2 8-bit greyscale, one IDAT
    SPLIT_IDAT => "split_idat.png",             // 4x4 RGB, one zlib stream over 3 IDATs
    INDEPENDENT_IDAT => "independent_idat.png", // 3x2 greyscale, tEXt + one stream per IDAT
);

/// Get path to a fixture file
///
/// Search order:
/// 1. PNG_TEST_FIXTURES env var (for extended test sets)
/// 2. Default tests/fixtures directory
pub fn fixture_path(file_name: &str) -> PathBuf {
    if let Ok(custom_dir) = std::env::var("PNG_TEST_FIXTURES") {
        let path = PathBuf::from(custom_dir).join(file_name);
        if path.exists() {
            return path;
        }
    }

    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(file_name);
    path
}

/// Helper to get fixture data as bytes
pub fn fixture_bytes(name: &str) -> Result<Vec<u8>> {
    if let Some(bytes) = get_registry().get(name) {
        return Ok(bytes.to_vec());
    }

    fs::read(fixture_path(name)).map_err(Error::Io)
}

/// List all available fixtures (defined + any `.png` in PNG_TEST_FIXTURES)
pub fn list_fixtures() -> Result<Vec<String>> {
    let mut fixtures: Vec<String> = list_all_fixtures().into_iter().map(String::from).collect();

    if let Ok(custom_dir) = std::env::var("PNG_TEST_FIXTURES") {
        let extended_path = PathBuf::from(custom_dir);
        if extended_path.is_dir() {
            for entry in fs::read_dir(extended_path)? {
                let path = entry?.path();
                let is_png = path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("png"))
                    .unwrap_or(false);
                if !path.is_file() || !is_png {
                    continue;
                }
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if !fixtures.iter().any(|f| f == name) {
                        fixtures.push(name.to_string());
                    }
                }
            }
        }
    }

    Ok(fixtures)
}

/// Check if a fixture is embedded
pub fn is_embedded(fixture_name: &str) -> bool {
    get_registry().contains_key(fixture_name)
}

/// zlib-compress `data`
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .expect("compressing into a Vec cannot fail")
}

/// Encode one chunk with a correct CRC
pub fn encode_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    encode_chunk_with_crc(chunk_type, data, checksum(chunk_type, data))
}

/// Encode one chunk with an arbitrary stored CRC
pub fn encode_chunk_with_crc(chunk_type: &[u8; 4], data: &[u8], crc: u32) -> Vec<u8> {
    let mut out = vec![0u8; 8 + data.len() + 4];
    BigEndian::write_u32(&mut out[0..4], data.len() as u32);
    out[4..8].copy_from_slice(chunk_type);
    out[8..8 + data.len()].copy_from_slice(data);
    BigEndian::write_u32(&mut out[8 + data.len()..], crc);
    out
}

/// Builds a PNG byte stream chunk by chunk
///
/// Nothing is validated: chunks can be emitted in any order, with any CRC.
#[derive(Debug, Clone)]
pub struct PngBuilder {
    bytes: Vec<u8>,
}

impl PngBuilder {
    /// Start a stream with the PNG signature
    pub fn new() -> Self {
        Self {
            bytes: PNG_SIGNATURE.to_vec(),
        }
    }

    /// Start a stream with no signature
    pub fn without_signature() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append a chunk with a correct CRC
    pub fn chunk(mut self, chunk_type: &[u8; 4], data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&encode_chunk(chunk_type, data));
        self
    }

    /// Append a chunk with the given stored CRC
    pub fn chunk_with_crc(mut self, chunk_type: &[u8; 4], data: &[u8], crc: u32) -> Self {
        self.bytes
            .extend_from_slice(&encode_chunk_with_crc(chunk_type, data, crc));
        self
    }

    /// Append an IHDR chunk
    pub fn ihdr(self, header: &Header) -> Self {
        self.chunk(b"IHDR", &header.to_bytes())
    }

    /// Append an IDAT chunk holding `raw` as its own zlib stream
    pub fn idat(self, raw: &[u8]) -> Self {
        self.chunk(b"IDAT", &zlib(raw))
    }

    /// Append an IEND chunk
    pub fn iend(self) -> Self {
        self.chunk(b"IEND", &[])
    }

    /// Append arbitrary bytes
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Finish the stream
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for PngBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A reader that returns at most `max_per_read` bytes per call and can
/// inject `Interrupted` errors or a hard failure, to exercise short-read
/// and I/O error handling
#[derive(Debug)]
pub struct TrickleReader<R> {
    inner: R,
    max_per_read: usize,
    interrupt_every: usize,
    fail_after: Option<usize>,
    calls: usize,
    delivered: usize,
}

impl<R: Read> TrickleReader<R> {
    /// Wrap `inner`; `max_per_read` is clamped to at least 1
    pub fn new(inner: R, max_per_read: usize) -> Self {
        Self {
            inner,
            max_per_read: max_per_read.max(1),
            interrupt_every: 0,
            fail_after: None,
            calls: 0,
            delivered: 0,
        }
    }

    /// Fail every `n`th call with `ErrorKind::Interrupted` (0 disables)
    pub fn interrupt_every(mut self, n: usize) -> Self {
        self.interrupt_every = n;
        self
    }

    /// Deliver `n` bytes, then fail every further call with
    /// `ErrorKind::Other`
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl<R: Read> Read for TrickleReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.interrupt_every > 0 && self.calls % self.interrupt_every == 0 {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
        }
        let mut n = buf.len().min(self.max_per_read);
        if let Some(limit) = self.fail_after {
            if self.delivered >= limit {
                return Err(io::Error::new(io::ErrorKind::Other, "source failed"));
            }
            n = n.min(limit - self.delivered);
        }
        let got = self.inner.read(&mut buf[..n])?;
        self.delivered += got;
        Ok(got)
    }
}

//! Streaming PNG chunk parser.
//!
//! This crate reads a PNG byte stream into an [`Image`]: the decoded IHDR
//! [`Header`] and the decompressed (still filtered) IDAT data.
//!
//! # Design Principles
//!
//! - **Streaming**: Chunks are read one at a time from any [`std::io::Read`]
//! - **Exact reads**: Short reads are looped until filled; only a zero-byte
//!   read at a chunk boundary counts as end-of-stream
//! - **Lenient by default**: Chunks with bad CRCs are skipped, not fatal
//! - **Configurable**: [`ParseOptions`] selects stricter behaviour
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> png_io::Result<()> {
//! let image = png_io::parse_file("image.png")?;
//! println!(
//!     "{}x{}, {} bytes of filtered scanlines",
//!     image.header.width,
//!     image.header.height,
//!     image.image_data.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Options
//!
//! IDAT chunks are, by default, each decompressed as an independent zlib
//! stream. Files written by most encoders split a single zlib stream across
//! IDAT chunks; use [`InflateMode::Concatenated`] for those:
//!
//! ```no_run
//! use png_io::{InflateMode, ParseOptions, Parser};
//!
//! # fn main() -> png_io::Result<()> {
//! let parser = Parser::with_options(ParseOptions::new().inflate_mode(InflateMode::Concatenated));
//! let image = parser.parse_file("image.png")?;
//! # Ok(())
//! # }
//! ```

mod chunk;
mod crc;
mod dispatcher;
mod error;
mod header;
mod image;
mod inflate;
mod parser;
mod signature;

pub use chunk::{Chunk, ChunkReader, ChunkType, DEFAULT_CHUNK_SIZE, MAX_CHUNK_LENGTH};
pub use crc::{checksum, validate as validate_crc, CrcPolicy};
pub use dispatcher::{ChunkDispatcher, ParserState};
pub use error::{Error, RequiredChunk, Result};
pub use header::{Header, IHDR_SIZE};
pub use image::Image;
pub use inflate::{DataAccumulator, Inflate, InflateMode, ZlibInflater, MAX_IMAGE_DATA};
pub use parser::{HeaderPolicy, ParseOptions, Parser};
pub use signature::{check_signature, is_png, PNG_SIGNATURE};

// Test utilities - only compiled for tests or when explicitly enabled
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::io::Read;
use std::path::Path;

/// Parse a PNG from any byte source with default options
pub fn parse<R: Read>(source: R) -> Result<Image> {
    Parser::new().parse(source)
}

/// Open and parse a PNG file with default options
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Image> {
    Parser::new().parse_file(path)
}

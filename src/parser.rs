//! Top-level parser and its options

use crate::{
    chunk::ChunkReader,
    crc::{self, CrcPolicy},
    dispatcher::{ChunkDispatcher, ParserState},
    error::Result,
    image::Image,
    inflate::{Inflate, InflateMode, ZlibInflater, MAX_IMAGE_DATA},
    signature::{check_signature, PNG_SIGNATURE},
};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// What to do when a second IHDR shows up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// The later header replaces the earlier one (default)
    #[default]
    Overwrite,
    /// Fail with [`Error::DuplicateHeader`](crate::Error::DuplicateHeader)
    Reject,
}

/// Parser settings
///
/// The default reproduces the lenient behaviour: independent zlib stream per
/// IDAT, header redefinition allowed, chunks with bad CRCs skipped.
///
/// # Example
///
/// ```
/// use png_io::{CrcPolicy, InflateMode, ParseOptions};
///
/// let options = ParseOptions::new()
///     .inflate_mode(InflateMode::Concatenated)
///     .crc_policy(CrcPolicy::Strict)
///     .max_image_data(64 * 1024 * 1024);
/// assert_eq!(options.inflate_mode, InflateMode::Concatenated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// How IDAT payloads are decompressed
    pub inflate_mode: InflateMode,
    /// Handling of a repeated IHDR
    pub header_policy: HeaderPolicy,
    /// Handling of a CRC mismatch
    pub crc_policy: CrcPolicy,
    /// Maximum decompressed image data, in bytes
    pub max_image_data: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            inflate_mode: InflateMode::default(),
            header_policy: HeaderPolicy::default(),
            crc_policy: CrcPolicy::default(),
            max_image_data: MAX_IMAGE_DATA,
        }
    }
}

impl ParseOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that follow the PNG format strictly: IDAT payloads form one
    /// zlib stream, a repeated IHDR is an error, and so is a bad CRC
    pub fn strict() -> Self {
        Self::new()
            .inflate_mode(InflateMode::Concatenated)
            .header_policy(HeaderPolicy::Reject)
            .crc_policy(CrcPolicy::Strict)
    }

    /// Set how IDAT payloads are decompressed
    pub fn inflate_mode(mut self, mode: InflateMode) -> Self {
        self.inflate_mode = mode;
        self
    }

    /// Set handling of a repeated IHDR
    pub fn header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    /// Set handling of a CRC mismatch
    pub fn crc_policy(mut self, policy: CrcPolicy) -> Self {
        self.crc_policy = policy;
        self
    }

    /// Set the cap on decompressed image data
    pub fn max_image_data(mut self, max: usize) -> Self {
        self.max_image_data = max;
        self
    }
}

/// PNG parser
///
/// Validates the signature, then reads chunks until IEND or end-of-stream,
/// checking each CRC and dispatching IHDR/IDAT/IEND. The parse succeeds only
/// if all three were seen.
///
/// # Example
///
/// ```no_run
/// use png_io::{InflateMode, ParseOptions, Parser};
///
/// # fn main() -> png_io::Result<()> {
/// let parser = Parser::with_options(ParseOptions::new().inflate_mode(InflateMode::Concatenated));
/// let image = parser.parse_file("image.png")?;
/// println!("{}x{}", image.header.width, image.header.height);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parser<I = ZlibInflater> {
    options: ParseOptions,
    inflater: I,
}

impl Parser<ZlibInflater> {
    /// Parser with default options and zlib decompression
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with the given options and zlib decompression
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            inflater: ZlibInflater,
        }
    }
}

impl<I: Inflate> Parser<I> {
    /// Swap in a different decompressor
    pub fn with_inflater<J: Inflate>(self, inflater: J) -> Parser<J> {
        Parser {
            options: self.options,
            inflater,
        }
    }

    /// Current options
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Open and parse a file
    ///
    /// The file is closed on every return path.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Image> {
        let file = File::open(path)?;
        self.parse(BufReader::new(file))
    }

    /// Parse a memory-mapped PNG
    ///
    /// Mapping the file is left to the caller, who is responsible for
    /// keeping it unmodified while the map is alive.
    #[cfg(feature = "memory-mapped")]
    pub fn parse_mmap(&self, mmap: &memmap2::Mmap) -> Result<Image> {
        self.parse(&mmap[..])
    }

    /// Parse an in-memory PNG
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Image> {
        self.parse(bytes)
    }

    /// Parse a PNG from any byte source
    pub fn parse<R: Read>(&self, mut source: R) -> Result<Image> {
        check_signature(&mut source)?;

        let mut chunks = ChunkReader::new(source, PNG_SIGNATURE.len() as u64);
        let dispatcher = ChunkDispatcher::new(&self.options, &self.inflater);
        let mut state = ParserState::new(&self.options);

        while !state.end_seen() {
            let Some(chunk) = chunks.next_chunk()? else {
                break;
            };

            log::debug!(
                "{} chunk: {} bytes at offset {}",
                chunk.chunk_type,
                chunk.length(),
                chunk.offset
            );

            if let Err(mismatch) = crc::validate(&chunk) {
                match self.options.crc_policy {
                    CrcPolicy::Strict => return Err(mismatch),
                    CrcPolicy::Skip => {
                        log::warn!("skipping chunk: {}", mismatch);
                        continue;
                    }
                }
            }

            state = dispatcher.dispatch(state, chunk)?;
        }

        state.finish(&self.inflater)
    }
}

//! Image data decompression
//!
//! IDAT payloads are zlib-wrapped deflate data. The [`Inflate`] trait is the
//! seam to the decompressor; [`ZlibInflater`] is the default, backed by
//! `flate2`. [`DataAccumulator`] collects IDAT payloads in file order and
//! produces the decompressed image data.

use crate::error::{Error, Result};
use flate2::{Decompress, FlushDecompress, Status};
use std::io;

/// Size of the output window each decompression step writes into (64KB)
const INFLATE_STEP: usize = 64 * 1024;

/// Default cap on decompressed image data (256 MB)
pub const MAX_IMAGE_DATA: usize = 256 * 1024 * 1024;

/// Decompresses one complete zlib stream
pub trait Inflate {
    /// Decompress `compressed`, appending the output to `out`
    ///
    /// Implementations must fail with [`Error::DataTooLarge`] rather than let
    /// `out` grow past `limit` bytes, and with [`Error::Inflate`] if the
    /// stream is corrupt or ends before its final block.
    fn inflate(&self, compressed: &[u8], out: &mut Vec<u8>, limit: usize) -> Result<()>;
}

/// zlib decompression via `flate2`
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibInflater;

impl Inflate for ZlibInflater {
    fn inflate(&self, compressed: &[u8], out: &mut Vec<u8>, limit: usize) -> Result<()> {
        let mut stream = Decompress::new(true);
        let mut window = vec![0u8; INFLATE_STEP];

        loop {
            let in_before = stream.total_in();
            let out_before = stream.total_out();

            let status = stream
                .decompress(
                    &compressed[in_before as usize..],
                    &mut window,
                    FlushDecompress::None,
                )
                .map_err(|e| Error::Inflate(io::Error::new(io::ErrorKind::InvalidData, e)))?;

            let produced = (stream.total_out() - out_before) as usize;
            let size = out.len() + produced;
            if size > limit {
                return Err(Error::DataTooLarge { size, max: limit });
            }

            // Grow geometrically, but never reserve past the limit
            if out.capacity() < size {
                let target = size.max(out.len() * 2).min(limit);
                out.reserve_exact(target - out.len());
            }
            out.extend_from_slice(&window[..produced]);

            match status {
                Status::StreamEnd => return Ok(()),
                Status::Ok | Status::BufError => {
                    if produced == 0 && stream.total_in() == in_before {
                        return Err(Error::Inflate(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "zlib stream ended before its final block",
                        )));
                    }
                }
            }
        }
    }
}

/// How IDAT payloads map onto zlib streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InflateMode {
    /// Each IDAT payload is a complete zlib stream, decompressed on arrival
    /// and appended to the output (default)
    ///
    /// Only correct when the encoder ended a zlib stream at every IDAT
    /// boundary.
    #[default]
    PerChunk,
    /// All IDAT payloads are concatenated and decompressed once as a single
    /// zlib stream after IEND, as the PNG format defines
    Concatenated,
}

/// Collects IDAT payloads into decompressed image data
#[derive(Debug)]
pub struct DataAccumulator {
    mode: InflateMode,
    limit: usize,
    output: Vec<u8>,
    compressed: Vec<u8>,
}

impl DataAccumulator {
    /// Create an empty accumulator
    pub fn new(mode: InflateMode, limit: usize) -> Self {
        Self {
            mode,
            limit,
            output: Vec::new(),
            compressed: Vec::new(),
        }
    }

    /// Mode this accumulator was created with
    pub fn mode(&self) -> InflateMode {
        self.mode
    }

    /// Feed the payload of the next IDAT chunk
    pub fn push<I: Inflate + ?Sized>(&mut self, payload: &[u8], inflater: &I) -> Result<()> {
        match self.mode {
            InflateMode::PerChunk => inflater.inflate(payload, &mut self.output, self.limit),
            InflateMode::Concatenated => {
                self.compressed.extend_from_slice(payload);
                Ok(())
            }
        }
    }

    /// Produce the decompressed image data
    pub fn finish<I: Inflate + ?Sized>(self, inflater: &I) -> Result<Vec<u8>> {
        match self.mode {
            InflateMode::PerChunk => Ok(self.output),
            InflateMode::Concatenated => {
                let mut output = Vec::new();
                inflater.inflate(&self.compressed, &mut output, self.limit)?;
                Ok(output)
            }
        }
    }
}

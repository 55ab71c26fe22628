//! Chunk framing
//!
//! Every chunk after the signature is laid out as:
//!
//! ```text
//! [4 bytes length, big-endian][4 bytes type][length bytes data][4 bytes CRC]
//! ```
//!
//! [`ChunkReader`] pulls one chunk at a time from any [`Read`] source and
//! never assumes a single `read` call fills its buffer.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use std::fmt;
use std::io::{self, Read};

/// Largest chunk length allowed by the PNG format (2^31 - 1)
pub const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

/// Payloads are read in steps of this size (64KB), so a corrupt length
/// field cannot force a huge allocation before any data arrives
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// Chunk type tag, with the critical chunks this crate acts on broken out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    /// `IHDR`
    Header,
    /// `IDAT`
    Data,
    /// `IEND`
    End,
    /// Any other tag, kept verbatim
    Unknown([u8; 4]),
}

impl ChunkType {
    /// Classify a raw 4-byte tag
    pub fn from_bytes(tag: [u8; 4]) -> Self {
        match &tag {
            b"IHDR" => Self::Header,
            b"IDAT" => Self::Data,
            b"IEND" => Self::End,
            _ => Self::Unknown(tag),
        }
    }

    /// The raw 4-byte tag as it appears in the stream
    pub fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::Header => *b"IHDR",
            Self::Data => *b"IDAT",
            Self::End => *b"IEND",
            Self::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            if byte.is_ascii_graphic() {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

/// One framed chunk
///
/// Chunks are transient: the parser consumes each one before reading the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Offset of the length field from the start of the stream
    pub offset: u64,
    /// Type tag
    pub chunk_type: ChunkType,
    /// Payload (`length` bytes)
    pub data: Vec<u8>,
    /// CRC stored after the payload
    pub crc: u32,
}

impl Chunk {
    /// Declared payload length
    pub fn length(&self) -> u32 {
        self.data.len() as u32
    }
}

/// Fill `buf` from `source`, looping over short reads
///
/// Returns the number of bytes read, which is less than `buf.len()` only if
/// the source reached end-of-stream. `Interrupted` reads are retried.
pub(crate) fn read_full<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Reads successive chunks from a byte source positioned just past the signature
pub struct ChunkReader<R> {
    source: R,
    offset: u64,
}

impl<R: Read> ChunkReader<R> {
    /// Wrap `source`; `offset` is its current position in the stream (used
    /// for error reporting only)
    pub fn new(source: R, offset: u64) -> Self {
        Self { source, offset }
    }

    /// Offset of the next chunk
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Read the next chunk
    ///
    /// Returns `Ok(None)` on a clean end-of-stream, i.e. when zero bytes are
    /// available where the next chunk header would start. Any other short
    /// read is a framing error.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>> {
        let offset = self.offset;

        let mut header = [0u8; 8];
        match read_full(&mut self.source, &mut header)? {
            0 => return Ok(None),
            8 => {}
            got => return Err(Error::ChunkHeaderRead { offset, got }),
        }

        let length = BigEndian::read_u32(&header[0..4]);
        let chunk_type = ChunkType::from_bytes([header[4], header[5], header[6], header[7]]);

        if length > MAX_CHUNK_LENGTH {
            return Err(Error::ChunkTooLarge { offset, length });
        }

        let data = self.read_data(offset, chunk_type, length as usize)?;

        let mut crc = [0u8; 4];
        let got = read_full(&mut self.source, &mut crc)?;
        if got < crc.len() {
            return Err(Error::ChunkCrcRead {
                offset,
                chunk_type,
                got,
            });
        }

        self.offset += 8 + length as u64 + 4;

        Ok(Some(Chunk {
            offset,
            chunk_type,
            data,
            crc: BigEndian::read_u32(&crc),
        }))
    }

    fn read_data(&mut self, offset: u64, chunk_type: ChunkType, length: usize) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(length.min(DEFAULT_CHUNK_SIZE));

        while data.len() < length {
            let start = data.len();
            let step = (length - start).min(DEFAULT_CHUNK_SIZE);
            data.resize(start + step, 0);

            let got = read_full(&mut self.source, &mut data[start..])?;
            if got < step {
                return Err(Error::ChunkDataRead {
                    offset,
                    chunk_type,
                    expected: length,
                    got: start + got,
                });
            }
        }

        Ok(data)
    }
}

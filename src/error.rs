//! Error types for png-io

use crate::chunk::ChunkType;
use std::fmt;
use std::io;

/// Result type for png-io operations
pub type Result<T> = std::result::Result<T, Error>;

/// A chunk that every PNG stream must contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredChunk {
    /// IHDR
    Header,
    /// At least one IDAT
    Data,
    /// IEND
    End,
}

impl fmt::Display for RequiredChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "IHDR",
            Self::Data => "IDAT",
            Self::End => "IEND",
        })
    }
}

/// Errors that can occur while parsing a PNG stream
///
/// Every variant except [`Error::CrcMismatch`] aborts the parse. A CRC
/// mismatch is only returned when [`CrcPolicy::Strict`](crate::CrcPolicy)
/// is selected; by default the offending chunk is skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from the underlying source
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with the 8-byte PNG signature
    #[error("Bad signature: not a PNG stream")]
    BadSignature,

    /// The 8-byte length/type header of a chunk was cut short
    #[error("Truncated chunk header at offset {offset}: got {got} of 8 bytes")]
    ChunkHeaderRead { offset: u64, got: usize },

    /// The chunk payload was cut short
    #[error("Truncated {chunk_type} data at offset {offset}: got {got} of {expected} bytes")]
    ChunkDataRead {
        offset: u64,
        chunk_type: ChunkType,
        expected: usize,
        got: usize,
    },

    /// The trailing CRC field was cut short
    #[error("Truncated {chunk_type} CRC at offset {offset}: got {got} of 4 bytes")]
    ChunkCrcRead {
        offset: u64,
        chunk_type: ChunkType,
        got: usize,
    },

    /// Declared chunk length exceeds 2^31 - 1
    #[error("Chunk at offset {offset} declares length {length} (max 2147483647)")]
    ChunkTooLarge { offset: u64, length: u32 },

    /// Stored CRC does not match the CRC of type tag + payload
    #[error(
        "CRC mismatch in {chunk_type} at offset {offset}: \
         stored {stored:#010x}, computed {computed:#010x}"
    )]
    CrcMismatch {
        offset: u64,
        chunk_type: ChunkType,
        stored: u32,
        computed: u32,
    },

    /// IDAT seen before IHDR
    #[error("IDAT at offset {offset} appears before IHDR")]
    ChunkOrder { offset: u64 },

    /// IHDR payload is not 13 bytes
    #[error("IHDR payload must be 13 bytes, got {0}")]
    IhdrSize(usize),

    /// A second IHDR was found and redefinition is rejected
    #[error("Duplicate IHDR at offset {offset}")]
    DuplicateHeader { offset: u64 },

    /// The stream ended without a mandatory chunk
    #[error("Missing {0} chunk")]
    MissingChunk(RequiredChunk),

    /// Decompression of image data failed
    #[error("Inflate error: {0}")]
    Inflate(#[source] io::Error),

    /// Decompressed data exceeds the configured maximum
    #[error("Data too large: {size} bytes (max: {max})")]
    DataTooLarge { size: usize, max: usize },
}

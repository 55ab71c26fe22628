//! Chunk CRC-32 checking
//!
//! The CRC covers the 4-byte type tag followed by the payload, using the
//! IEEE polynomial shared with zip and gzip.

use crate::{
    chunk::Chunk,
    error::{Error, Result},
};

/// What to do with a chunk whose stored CRC does not match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CrcPolicy {
    /// Log the mismatch and drop the chunk without applying it (default)
    #[default]
    Skip,
    /// Fail the parse with [`Error::CrcMismatch`]
    Strict,
}

/// Calculate the CRC-32 of a chunk's type tag and payload
pub fn checksum(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    hasher.finalize()
}

/// Compare a chunk's stored CRC against its contents
///
/// On mismatch the returned [`Error::CrcMismatch`] describes the chunk; the
/// caller decides whether it is fatal.
pub fn validate(chunk: &Chunk) -> Result<()> {
    let computed = checksum(&chunk.chunk_type.to_bytes(), &chunk.data);
    if computed == chunk.crc {
        Ok(())
    } else {
        Err(Error::CrcMismatch {
            offset: chunk.offset,
            chunk_type: chunk.chunk_type,
            stored: chunk.crc,
            computed,
        })
    }
}

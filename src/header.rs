//! IHDR decoding

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};

/// Size of an IHDR payload
pub const IHDR_SIZE: usize = 13;

/// Image header fields from the IHDR chunk
///
/// Values are decoded as stored. Whether a given bit depth is legal for a
/// given color type is not checked here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bits per sample or per palette index
    pub bit_depth: u8,
    /// Color type (0, 2, 3, 4 or 6 in valid files)
    pub color_type: u8,
    /// Compression method (0 = deflate)
    pub compression_method: u8,
    /// Filter method (0 = adaptive)
    pub filter_method: u8,
    /// Interlace method (0 = none, 1 = Adam7)
    pub interlace_method: u8,
}

impl Header {
    /// Decode a 13-byte IHDR payload
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() != IHDR_SIZE {
            return Err(Error::IhdrSize(data.len()));
        }

        Ok(Self {
            width: BigEndian::read_u32(&data[0..4]),
            height: BigEndian::read_u32(&data[4..8]),
            bit_depth: data[8],
            color_type: data[9],
            compression_method: data[10],
            filter_method: data[11],
            interlace_method: data[12],
        })
    }

    /// Encode back into an IHDR payload
    pub fn to_bytes(&self) -> [u8; IHDR_SIZE] {
        let mut out = [0u8; IHDR_SIZE];
        BigEndian::write_u32(&mut out[0..4], self.width);
        BigEndian::write_u32(&mut out[4..8], self.height);
        out[8] = self.bit_depth;
        out[9] = self.color_type;
        out[10] = self.compression_method;
        out[11] = self.filter_method;
        out[12] = self.interlace_method;
        out
    }
}

//! Parse result

use crate::header::Header;

/// A parsed PNG: its header and the decompressed image data
///
/// `image_data` is still filtered: each scanline starts with its filter-type
/// byte. Turning it into pixels is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Decoded IHDR
    pub header: Header,
    /// Decompressed IDAT stream
    pub image_data: Vec<u8>,
}

impl Image {
    /// Take ownership of the decompressed data
    pub fn into_image_data(self) -> Vec<u8> {
        self.image_data
    }
}

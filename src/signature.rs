//! PNG signature check

use crate::{
    chunk::read_full,
    error::{Error, Result},
};
use std::io::Read;

/// PNG signature: 89 50 4E 47 0D 0A 1A 0A
pub const PNG_SIGNATURE: [u8; 8] = *b"\x89PNG\r\n\x1a\n";

/// Detect if a buffer starts with the PNG signature
pub fn is_png(header: &[u8]) -> bool {
    header.len() >= PNG_SIGNATURE.len() && header[..PNG_SIGNATURE.len()] == PNG_SIGNATURE
}

/// Consume the first 8 bytes of `source` and check them against the signature
///
/// A source with fewer than 8 bytes is a [`Error::BadSignature`], same as a
/// mismatch.
pub fn check_signature<R: Read + ?Sized>(source: &mut R) -> Result<()> {
    let mut sig = [0u8; 8];
    let got = read_full(source, &mut sig)?;
    if got < sig.len() || sig != PNG_SIGNATURE {
        return Err(Error::BadSignature);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TrickleReader;
    use std::io::Cursor;

    #[test]
    fn test_valid_signature() {
        let mut source = Cursor::new(PNG_SIGNATURE.to_vec());
        assert!(check_signature(&mut source).is_ok());
        assert_eq!(source.position(), 8);
    }

    #[test]
    fn test_valid_signature_split_across_reads() {
        let mut source = TrickleReader::new(Cursor::new(PNG_SIGNATURE.to_vec()), 3);
        assert!(check_signature(&mut source).is_ok());
    }

    #[test]
    fn test_short_input() {
        for len in 0..PNG_SIGNATURE.len() {
            let mut source = Cursor::new(PNG_SIGNATURE[..len].to_vec());
            assert!(
                matches!(check_signature(&mut source), Err(Error::BadSignature)),
                "{} bytes should be a bad signature",
                len
            );
        }
    }

    #[test]
    fn test_every_byte_matters() {
        for i in 0..PNG_SIGNATURE.len() {
            let mut sig = PNG_SIGNATURE;
            sig[i] ^= 0x01;
            let mut source = Cursor::new(sig.to_vec());
            assert!(matches!(
                check_signature(&mut source),
                Err(Error::BadSignature)
            ));
        }
    }

    #[test]
    fn test_is_png() {
        assert!(is_png(b"\x89PNG\r\n\x1a\n\x00\x00"));
        assert!(!is_png(b"\x89PNG"));
        assert!(!is_png(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]));
    }
}

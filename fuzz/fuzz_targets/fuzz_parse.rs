#![no_main]

use libfuzzer_sys::fuzz_target;
use png_io::{test_utils::TrickleReader, ParseOptions, Parser, PNG_SIGNATURE};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // This should NEVER panic, only return errors
    let limit = 16 * 1024 * 1024;
    let lenient = Parser::with_options(ParseOptions::new().max_image_data(limit));
    let strict = Parser::with_options(ParseOptions::strict().max_image_data(limit));

    let _ = lenient.parse_bytes(data);
    let _ = strict.parse_bytes(data);

    // Most random inputs die at the signature; also try them as chunk streams
    let mut framed = PNG_SIGNATURE.to_vec();
    framed.extend_from_slice(data);
    let lenient_result = lenient.parse_bytes(&framed);
    let _ = strict.parse_bytes(&framed);

    // Short reads must not change the outcome
    let trickled = lenient.parse(TrickleReader::new(Cursor::new(framed), 3).interrupt_every(7));
    assert_eq!(lenient_result.is_ok(), trickled.is_ok());
    if let (Ok(a), Ok(b)) = (lenient_result, trickled) {
        assert_eq!(a, b);
    }
});

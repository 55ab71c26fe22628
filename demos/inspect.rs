//! Example: List the chunks of a PNG file, then parse it
//!
//! Run: `cargo run --example inspect -- <file.png> [--concatenated]`

use png_io::{
    check_signature, ChunkReader, ChunkType, InflateMode, ParseOptions, Parser, PNG_SIGNATURE,
};
use std::env;
use std::fs::File;
use std::io::{self, BufReader};

fn main() -> png_io::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.png> [--concatenated]", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];
    let mode = if args.iter().any(|a| a == "--concatenated") {
        InflateMode::Concatenated
    } else {
        InflateMode::PerChunk
    };
    println!("Parsing: {}", filename);

    // Raw chunk listing, CRC status included
    let mut source = BufReader::new(File::open(filename)?);
    check_signature(&mut source)?;
    let mut chunks = ChunkReader::new(source, PNG_SIGNATURE.len() as u64);

    println!("\nChunks:");
    while let Some(chunk) = chunks.next_chunk()? {
        let crc = if png_io::validate_crc(&chunk).is_ok() {
            "ok"
        } else {
            "BAD"
        };
        println!(
            "  {:>8}  {}  {:>8} bytes  crc {:#010x} ({})",
            chunk.offset,
            chunk.chunk_type,
            chunk.length(),
            chunk.crc,
            crc
        );
        if chunk.chunk_type == ChunkType::End {
            break;
        }
    }

    let trailing = io::copy(&mut chunks.into_inner(), &mut io::sink())?;
    if trailing > 0 {
        println!("  ({} bytes after the last chunk, ignored by the parser)", trailing);
    }

    let parser = Parser::with_options(ParseOptions::new().inflate_mode(mode));
    let image = parser.parse_file(filename)?;
    let header = &image.header;

    println!("\nHeader:");
    println!("  Size: {}x{}", header.width, header.height);
    println!("  Bit depth: {}", header.bit_depth);
    println!("  Color type: {}", header.color_type);
    println!(
        "  Compression/filter/interlace: {}/{}/{}",
        header.compression_method, header.filter_method, header.interlace_method
    );
    println!("\nImage data: {} bytes ({:?})", image.image_data.len(), mode);

    Ok(())
}

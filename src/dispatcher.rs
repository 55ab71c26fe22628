//! Chunk dispatch state machine
//!
//! ```text
//! Start --IHDR--> HeaderSeen --IDAT--> DataSeen --IEND--> Ended
//!                     ^   IDAT* \______/
//! ```
//!
//! [`ParserState`] is an explicit value: each call to
//! [`ChunkDispatcher::dispatch`] consumes it and hands back the updated state.

use crate::{
    chunk::{Chunk, ChunkType},
    error::{Error, RequiredChunk, Result},
    header::Header,
    image::Image,
    inflate::{DataAccumulator, Inflate},
    parser::{HeaderPolicy, ParseOptions},
};

/// Progress through the mandatory chunks, plus the image data collected so far
#[derive(Debug)]
pub struct ParserState {
    header: Option<Header>,
    data_seen: bool,
    end_seen: bool,
    data: DataAccumulator,
}

impl ParserState {
    /// Fresh state for one parse
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            header: None,
            data_seen: false,
            end_seen: false,
            data: DataAccumulator::new(options.inflate_mode, options.max_image_data),
        }
    }

    /// Decoded header, if an IHDR has been accepted
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// An IHDR has been accepted
    pub fn header_seen(&self) -> bool {
        self.header.is_some()
    }

    /// At least one IDAT has been accepted
    pub fn data_seen(&self) -> bool {
        self.data_seen
    }

    /// IEND has been accepted; no further chunks should be read
    pub fn end_seen(&self) -> bool {
        self.end_seen
    }

    /// First mandatory chunk not yet seen, checked in header, data, end order
    pub fn missing(&self) -> Option<RequiredChunk> {
        if !self.header_seen() {
            Some(RequiredChunk::Header)
        } else if !self.data_seen {
            Some(RequiredChunk::Data)
        } else if !self.end_seen {
            Some(RequiredChunk::End)
        } else {
            None
        }
    }

    /// Check completeness and assemble the [`Image`]
    pub fn finish<I: Inflate + ?Sized>(self, inflater: &I) -> Result<Image> {
        if let Some(which) = self.missing() {
            return Err(Error::MissingChunk(which));
        }
        let header = self.header.ok_or(Error::MissingChunk(RequiredChunk::Header))?;
        let image_data = self.data.finish(inflater)?;

        Ok(Image { header, image_data })
    }
}

/// Routes CRC-checked chunks to the header decoder and data accumulator
pub struct ChunkDispatcher<'a, I: ?Sized> {
    options: &'a ParseOptions,
    inflater: &'a I,
}

impl<'a, I: Inflate + ?Sized> ChunkDispatcher<'a, I> {
    /// Create a dispatcher
    pub fn new(options: &'a ParseOptions, inflater: &'a I) -> Self {
        Self { options, inflater }
    }

    /// Apply one chunk to `state`
    pub fn dispatch(&self, mut state: ParserState, chunk: Chunk) -> Result<ParserState> {
        match chunk.chunk_type {
            ChunkType::Header => {
                let header = Header::decode(&chunk.data)?;
                if state.header.is_some() {
                    match self.options.header_policy {
                        HeaderPolicy::Reject => {
                            return Err(Error::DuplicateHeader {
                                offset: chunk.offset,
                            })
                        }
                        HeaderPolicy::Overwrite => {
                            log::warn!("IHDR at offset {} replaces earlier header", chunk.offset)
                        }
                    }
                }
                state.header = Some(header);
            }

            ChunkType::Data => {
                if state.header.is_none() {
                    return Err(Error::ChunkOrder {
                        offset: chunk.offset,
                    });
                }
                state.data.push(&chunk.data, self.inflater)?;
                state.data_seen = true;
            }

            ChunkType::End => state.end_seen = true,

            ChunkType::Unknown(_) => {
                log::debug!(
                    "ignoring unrecognized {} chunk at offset {}",
                    chunk.chunk_type,
                    chunk.offset
                );
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crc::checksum,
        inflate::{InflateMode, ZlibInflater},
        test_utils::zlib,
    };

    fn chunk(chunk_type: ChunkType, data: Vec<u8>) -> Chunk {
        let crc = checksum(&chunk_type.to_bytes(), &data);
        Chunk {
            offset: 0,
            chunk_type,
            data,
            crc,
        }
    }

    fn ihdr(width: u32) -> Chunk {
        let header = Header {
            width,
            height: 1,
            bit_depth: 8,
            ..Default::default()
        };
        chunk(ChunkType::Header, header.to_bytes().to_vec())
    }

    #[test]
    fn test_full_sequence() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let mut state = ParserState::new(&options);
        assert_eq!(state.missing(), Some(RequiredChunk::Header));

        state = dispatcher.dispatch(state, ihdr(1)).unwrap();
        assert!(state.header_seen());
        assert_eq!(state.missing(), Some(RequiredChunk::Data));

        state = dispatcher
            .dispatch(state, chunk(ChunkType::Data, zlib(&[0, 7])))
            .unwrap();
        assert!(state.data_seen());
        assert_eq!(state.missing(), Some(RequiredChunk::End));

        state = dispatcher.dispatch(state, chunk(ChunkType::End, vec![])).unwrap();
        assert!(state.end_seen());
        assert_eq!(state.missing(), None);

        let image = state.finish(&ZlibInflater).unwrap();
        assert_eq!(image.header.width, 1);
        assert_eq!(image.image_data, vec![0, 7]);
    }

    #[test]
    fn test_data_before_header() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let state = ParserState::new(&options);

        // Payload is garbage, the ordering check comes first
        let mut idat = chunk(ChunkType::Data, vec![0xFF; 4]);
        idat.offset = 33;
        assert!(matches!(
            dispatcher.dispatch(state, idat),
            Err(Error::ChunkOrder { offset: 33 })
        ));
    }

    #[test]
    fn test_unknown_chunk_is_ignored() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let state = ParserState::new(&options);

        let state = dispatcher
            .dispatch(state, chunk(ChunkType::Unknown(*b"tEXt"), b"k\0v".to_vec()))
            .unwrap();
        assert!(!state.header_seen());
        assert!(!state.data_seen());
        assert!(!state.end_seen());
    }

    #[test]
    fn test_bad_ihdr_size_propagates() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let state = ParserState::new(&options);

        assert!(matches!(
            dispatcher.dispatch(state, chunk(ChunkType::Header, vec![0; 10])),
            Err(Error::IhdrSize(10))
        ));
    }

    #[test]
    fn test_inflate_error_propagates() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let state = dispatcher
            .dispatch(ParserState::new(&options), ihdr(1))
            .unwrap();

        assert!(matches!(
            dispatcher.dispatch(state, chunk(ChunkType::Data, vec![0xFF; 4])),
            Err(Error::Inflate(_))
        ));
    }

    #[test]
    fn test_duplicate_header_overwrites_by_default() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let mut state = ParserState::new(&options);

        state = dispatcher.dispatch(state, ihdr(1)).unwrap();
        state = dispatcher.dispatch(state, ihdr(2)).unwrap();
        assert_eq!(state.header().unwrap().width, 2);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let options = ParseOptions::new().header_policy(HeaderPolicy::Reject);
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let state = dispatcher
            .dispatch(ParserState::new(&options), ihdr(1))
            .unwrap();

        let mut second = ihdr(2);
        second.offset = 50;
        assert!(matches!(
            dispatcher.dispatch(state, second),
            Err(Error::DuplicateHeader { offset: 50 })
        ));
    }

    #[test]
    fn test_finish_reports_first_missing() {
        let options = ParseOptions::default();
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);

        // End without header or data: header is reported first
        let state = dispatcher
            .dispatch(ParserState::new(&options), chunk(ChunkType::End, vec![]))
            .unwrap();
        assert!(matches!(
            state.finish(&ZlibInflater),
            Err(Error::MissingChunk(RequiredChunk::Header))
        ));

        let state = dispatcher
            .dispatch(ParserState::new(&options), ihdr(1))
            .unwrap();
        let state = dispatcher.dispatch(state, chunk(ChunkType::End, vec![])).unwrap();
        assert!(matches!(
            state.finish(&ZlibInflater),
            Err(Error::MissingChunk(RequiredChunk::Data))
        ));
    }

    #[test]
    fn test_concatenated_mode_defers_inflate() {
        let options = ParseOptions::new().inflate_mode(InflateMode::Concatenated);
        let dispatcher = ChunkDispatcher::new(&options, &ZlibInflater);
        let mut state = dispatcher
            .dispatch(ParserState::new(&options), ihdr(1))
            .unwrap();

        let compressed = zlib(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let (a, b) = compressed.split_at(3);
        state = dispatcher.dispatch(state, chunk(ChunkType::Data, a.to_vec())).unwrap();
        state = dispatcher.dispatch(state, chunk(ChunkType::Data, b.to_vec())).unwrap();
        state = dispatcher.dispatch(state, chunk(ChunkType::End, vec![])).unwrap();

        let image = state.finish(&ZlibInflater).unwrap();
        assert_eq!(image.image_data, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }
}

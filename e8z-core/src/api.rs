//! Top-level `compress`/`decompress` API wiring every subsystem together.

use std::io::{Read, Write};

use tracing::{debug, trace, trace_span};

use crate::bitio::{BitReader, BitWriter};
use crate::container::{self, WordModeSections};
use crate::error::{Error, Result};
use crate::frame;
use crate::lattice::SymbolTable;
use crate::options::Options;
use crate::predictor::PredictionState;
use crate::rankcoder;
use crate::tokenizer::Mode;

const MAX_VOCAB_SIZE: usize = u16::MAX as usize;
const MAX_SYMBOL_LEN: usize = u8::MAX as usize;

/// Compresses `input` under `options`, returning a complete container.
pub fn compress(input: &[u8], options: &Options) -> Result<Vec<u8>> {
    options.validate()?;
    let _span = trace_span!("compress", bytes = input.len(), mode = ?options.mode).entered();

    match options.mode {
        Mode::Byte => container::write_byte_mode(input, options.checksum),
        Mode::Char | Mode::Word => compress_learned(input, options),
    }
}

/// Decompresses a container produced by [`compress`].
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    let magic = container::detect_magic(input)?;
    let _span = trace_span!("decompress", bytes = input.len()).entered();
    if magic == container::BYTE_MODE_MAGIC {
        container::read_byte_mode(input, true)
    } else {
        decompress_learned(input)
    }
}

/// Streaming variant of [`compress`]: reads all of `reader` into memory (the
/// frame partitioner still bounds per-frame working set; only the whole
/// compressed container is buffered before being written out, since the
/// container's header fields are only known once encoding finishes) and
/// writes the container to `writer`.
pub fn compress_stream<R: Read, W: Write>(mut reader: R, mut writer: W, options: &Options) -> Result<()> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    let out = compress(&input, options)?;
    writer.write_all(&out)?;
    Ok(())
}

/// Streaming variant of [`decompress`].
pub fn decompress_stream<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<()> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    let out = decompress(&input)?;
    writer.write_all(&out)?;
    Ok(())
}

fn compress_learned(input: &[u8], options: &Options) -> Result<Vec<u8>> {
    let frame_size = options.frame_size_bytes();
    let frame_count = frame::partition(input.len(), frame_size).len();
    let byte_mode = false;

    // First pass: tokenize the *whole* input once, then build the shared
    // symbol table over that single token stream.
    //
    // Horizon Batching's byte-range frames bound the encode pass's working
    // set (see the loop below, and §4.7), but a word or a multi-byte UTF-8
    // character can straddle an arbitrary byte offset. Tokenizing each
    // frame's raw byte range independently would silently cut such a token
    // in two, interning each half as its own unrelated symbol. So
    // tokenization always runs over the full input before any framing is
    // applied; frame boundaries only affect how the *encode* pass below is
    // conceptually grouped; the token stream itself is produced in one
    // in-memory pass.
    let _pass1 = trace_span!("singularity_pass", frame_count).entered();
    let mut table = SymbolTable::with_capacity(256);
    let mut tokens: Vec<Box<[u8]>> = Vec::new();
    for t in options.mode.tokenize(input) {
        if t.len() > MAX_SYMBOL_LEN {
            return Err(Error::InvalidOption(format!(
                "word/char-mode symbol of {} bytes exceeds the {MAX_SYMBOL_LEN}-byte container limit",
                t.len()
            )));
        }
        if table.get_index(&t).is_none() {
            if table.len() >= MAX_VOCAB_SIZE {
                return Err(Error::InvalidOption(format!(
                    "vocabulary exceeds the {MAX_VOCAB_SIZE}-symbol container limit"
                )));
            }
            table.intern(&t, byte_mode)?;
        }
        tokens.push(t.into_owned().into_boxed_slice());
    }
    table.freeze();
    drop(_pass1);

    // Second pass: differential/predictor/rank coding over the frozen table.
    // `Options::validate` has already rejected any non-default
    // `predictor_context` for char/word mode (the container has no field to
    // recover a different context length on decode), so it is safe to pass
    // the option straight through here.
    let _pass2 = trace_span!("encode_pass").entered();
    let mut predictor = PredictionState::new(options.predictor_context as usize);
    let mut rank_writer = BitWriter::new();

    for (i, symbol) in tokens.iter().enumerate() {
        let index = table.get_index(symbol).expect("every symbol was interned in pass 1");
        let root = table.root_of(index)?;
        let offset = table.offset_in_root(index)?;

        // The very first root of the stream has no predictor context to
        // rank against, so it is written raw (8 bits) instead of rank-coded
        // (spec.md §4.4/§4.6; `examples/original_source/Examples/
        // gqe_compression/compressor.py`'s `else: ... raw 8 bits` branch).
        if i == 0 {
            rank_writer.write_bits(root as u64, 8);
        } else {
            let rank = predictor.rank(root);
            rankcoder::write_rank(&mut rank_writer, rank);
        }
        predictor.update(root);
        rankcoder::write_offset(&mut rank_writer, offset);
    }
    let token_count = tokens.len() as u32;
    drop(_pass2);
    debug!(token_count, vocab_size = table.len(), "encoded learned-prediction stream");

    let oov_records = serialize_oov_block(&table);
    container::write_word_mode(
        token_count,
        table.checksum(),
        &oov_records,
        table.len().min(MAX_VOCAB_SIZE) as u16,
        &rank_writer.into_bytes(),
        options.checksum,
    )
}

fn decompress_learned(input: &[u8]) -> Result<Vec<u8>> {
    let WordModeSections { token_count, oov_block, rank_stream, .. } = container::read_word_mode(input, true)?;

    let table = deserialize_oov_block(&oov_block)?;

    let mut predictor = PredictionState::new(crate::options::DEFAULT_PREDICTOR_CONTEXT as usize);
    let mut reader = BitReader::from_bytes(&rank_stream)?;

    let mut out = Vec::new();
    for i in 0..token_count {
        let root = if i == 0 {
            reader.read_bits(8)? as u8
        } else {
            let rank = rankcoder::read_rank(&mut reader)?;
            predictor.root_at_rank(rank)?
        };
        predictor.update(root);
        let offset = rankcoder::read_offset(&mut reader)?;
        let index = table.index_at(root, offset)?;
        let symbol = table.symbol_at(index)?;
        if !out.is_empty() {
            out.push(b' ');
        }
        out.extend_from_slice(symbol);
        trace!(i, root, offset, "decoded token");
    }
    Ok(out)
}

fn serialize_oov_block(table: &SymbolTable) -> Vec<u8> {
    let mut out = Vec::new();
    for index in 0..table.len() as u32 {
        let root = table.root_of(index).expect("every interned index has a root");
        let symbol = table.symbol_at(index).expect("every interned index has symbol bytes");
        out.push(root);
        out.push(symbol.len() as u8);
        out.extend_from_slice(symbol);
    }
    out
}

fn deserialize_oov_block(data: &[u8]) -> Result<SymbolTable> {
    let mut table = SymbolTable::with_capacity(data.len() / 4);
    let mut cursor = 0usize;
    while cursor < data.len() {
        if cursor + 2 > data.len() {
            return Err(Error::SymbolTableCorrupt { reason: "OOV record truncated before length byte" });
        }
        let root = data[cursor];
        let len = data[cursor + 1] as usize;
        cursor += 2;
        if cursor + len > data.len() {
            return Err(Error::SymbolTableCorrupt { reason: "OOV record body runs past end of block" });
        }
        let symbol = &data[cursor..cursor + len];
        table.insert_at_root(symbol, root);
        cursor += len;
    }
    table.freeze();
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_mode_round_trips_through_the_public_api() {
        let options = Options::default();
        let input = b"aaaaaaaaaa";
        let compressed = compress(input, &options).unwrap();
        assert_eq!(&compressed[0..2], &container::BYTE_MODE_MAGIC);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }

    #[test]
    fn word_mode_round_trips_with_single_space_join() {
        let options = Options { mode: Mode::Word, ..Options::default() };
        let input = b"The Quick Brown Fox";
        let compressed = compress(input, &options).unwrap();
        assert_eq!(&compressed[0..2], &container::WORD_MODE_MAGIC);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, b"the quick brown fox");
    }

    #[test]
    fn streaming_api_matches_in_memory_api() {
        let options = Options::default();
        let input = vec![7u8; 4096];
        let mut out = Vec::new();
        compress_stream(&input[..], &mut out, &options).unwrap();
        let mut roundtrip = Vec::new();
        decompress_stream(&out[..], &mut roundtrip).unwrap();
        assert_eq!(roundtrip, input);
    }
}

//! Versioned container headers and the two wire layouts: the byte-mode
//! deflate envelope (`E8 70`) and the learned-prediction word/char envelope
//! (`E8 60`).

use std::io::{Read, Write};

use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned, LE, U16, U32};

use crate::error::{Error, Result};

/// Magic bytes identifying the byte-mode (deflate-wrapped) container.
pub const BYTE_MODE_MAGIC: [u8; 2] = [0xE8, 0x70];

/// Magic bytes identifying the word/char-mode (learned-prediction) container.
pub const WORD_MODE_MAGIC: [u8; 2] = [0xE8, 0x60];

const BYTE_MODE_FLAG: u16 = 0x0001;

/// Fixed-size header for the byte-mode container.
#[derive(FromBytes, FromZeroes, AsBytes, Unaligned, Debug, Clone, Copy)]
#[repr(C)]
pub struct ByteModeHeader {
    magic: [u8; 2],
    flags: U16<LE>,
    original_length: U32<LE>,
    crc32: U32<LE>,
}

/// Fixed-size header for the word/char-mode container, up to but not
/// including the variable-length `oov_block`.
#[derive(FromBytes, FromZeroes, AsBytes, Unaligned, Debug, Clone, Copy)]
#[repr(C)]
pub struct WordModeHeader {
    magic: [u8; 2],
    atlas_version: U16<LE>,
    token_count: U32<LE>,
    crc32: U32<LE>,
    shared_table_id: U32<LE>,
    oov_count: U16<LE>,
    oov_block_length: U32<LE>,
}

/// Compresses `input` with `flate2`'s DEFLATE implementation.
pub fn deflate(input: &[u8]) -> Result<Vec<u8>> {
    let mut enc = flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(input)?;
    Ok(enc.finish()?)
}

/// Inverse of [`deflate`].
pub fn inflate(input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut dec = flate2::read::DeflateDecoder::new(input);
    let mut out = Vec::with_capacity(expected_len);
    dec.read_to_end(&mut out)?;
    Ok(out)
}

/// Writes the byte-mode container: `E8 70` header plus a deflate-wrapped
/// copy of `input`.
pub fn write_byte_mode(input: &[u8], checksum: bool) -> Result<Vec<u8>> {
    let payload = deflate(input)?;
    let crc = if checksum { crc32fast::hash(input) } else { 0 };

    let header = ByteModeHeader {
        magic: BYTE_MODE_MAGIC,
        flags: U16::new(BYTE_MODE_FLAG),
        original_length: U32::new(input.len() as u32),
        crc32: U32::new(crc),
    };

    let mut out = Vec::with_capacity(12 + payload.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Reads a byte-mode container and returns the original bytes.
pub fn read_byte_mode(data: &[u8], verify_checksum: bool) -> Result<Vec<u8>> {
    let header = ByteModeHeader::read_from_prefix(data)
        .ok_or(Error::TruncatedStream { expected: std::mem::size_of::<ByteModeHeader>(), found: data.len() })?;
    if header.magic != BYTE_MODE_MAGIC {
        return Err(Error::InvalidMagic { found: header.magic });
    }
    let payload = &data[std::mem::size_of::<ByteModeHeader>()..];
    let original_length = header.original_length.get() as usize;
    let output = inflate(payload, original_length)?;
    if output.len() != original_length {
        return Err(Error::TruncatedStream { expected: original_length, found: output.len() });
    }
    if verify_checksum && header.crc32.get() != 0 {
        let computed = crc32fast::hash(&output);
        if computed != header.crc32.get() {
            return Err(Error::ChecksumMismatch { stored: header.crc32.get(), computed });
        }
    }
    Ok(output)
}

/// The parsed pieces of a word/char-mode container, still in wire form.
pub struct WordModeSections {
    /// Number of token positions in the stream.
    pub token_count: u32,
    /// Checksum the encoder recorded over the shared symbol table.
    pub shared_table_id: u32,
    /// Deflate-wrapped OOV records: `root(1) + len(1) + utf8(len)` each.
    pub oov_block: Vec<u8>,
    /// Number of OOV records in `oov_block`.
    pub oov_count: u16,
    /// Raw bytes of the rank/offset bitstream (see [`crate::rankcoder`]).
    pub rank_stream: Vec<u8>,
}

/// Writes the word/char-mode container around already-encoded sections.
///
/// The trailing `token_stream` section named in the wire layout is always
/// empty in this implementation: a fully decoded `rank_stream` already
/// determines root and bucket offset per position, so a second
/// atlas-or-OOV reference per position would be redundant (see
/// `SPEC_FULL.md` §4.8 for the reasoning).
pub fn write_word_mode(
    token_count: u32,
    shared_table_id: u32,
    oov_records: &[u8],
    oov_count: u16,
    rank_stream: &[u8],
    checksum: bool,
) -> Result<Vec<u8>> {
    let oov_block = deflate(oov_records)?;
    let crc = if checksum { crc32fast::hash(rank_stream) } else { 0 };

    let header = WordModeHeader {
        magic: WORD_MODE_MAGIC,
        atlas_version: U16::new(1),
        token_count: U32::new(token_count),
        crc32: U32::new(crc),
        shared_table_id: U32::new(shared_table_id),
        oov_count: U16::new(oov_count),
        oov_block_length: U32::new(oov_block.len() as u32),
    };

    let mut out = Vec::with_capacity(
        std::mem::size_of::<WordModeHeader>() + oov_block.len() + 4 + rank_stream.len(),
    );
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&oov_block);
    out.extend_from_slice(&(rank_stream.len() as u32).to_le_bytes());
    out.extend_from_slice(rank_stream);
    Ok(out)
}

/// Reads a word/char-mode container into its component sections, inflating
/// the OOV block but leaving `rank_stream` for the caller to bit-decode.
pub fn read_word_mode(data: &[u8], verify_checksum: bool) -> Result<WordModeSections> {
    let header_size = std::mem::size_of::<WordModeHeader>();
    let header = WordModeHeader::read_from_prefix(data)
        .ok_or(Error::TruncatedStream { expected: header_size, found: data.len() })?;
    if header.magic != WORD_MODE_MAGIC {
        return Err(Error::InvalidMagic { found: header.magic });
    }
    if header.atlas_version.get() != 1 {
        return Err(Error::UnsupportedVersion { version: header.atlas_version.get() as u8 });
    }

    let mut cursor = header_size;
    let oov_len = header.oov_block_length.get() as usize;
    if data.len() < cursor + oov_len {
        return Err(Error::TruncatedStream { expected: cursor + oov_len, found: data.len() });
    }
    let oov_compressed = &data[cursor..cursor + oov_len];
    let oov_block = if oov_compressed.is_empty() { Vec::new() } else { inflate(oov_compressed, 0)? };
    cursor += oov_len;

    if data.len() < cursor + 4 {
        return Err(Error::TruncatedStream { expected: cursor + 4, found: data.len() });
    }
    let rank_len = u32::from_le_bytes(data[cursor..cursor + 4].try_into().unwrap()) as usize;
    cursor += 4;
    if data.len() < cursor + rank_len {
        return Err(Error::TruncatedStream { expected: cursor + rank_len, found: data.len() });
    }
    let rank_stream = data[cursor..cursor + rank_len].to_vec();

    if verify_checksum && header.crc32.get() != 0 {
        let computed = crc32fast::hash(&rank_stream);
        if computed != header.crc32.get() {
            return Err(Error::ChecksumMismatch { stored: header.crc32.get(), computed });
        }
    }

    Ok(WordModeSections {
        token_count: header.token_count.get(),
        shared_table_id: header.shared_table_id.get(),
        oov_block,
        oov_count: header.oov_count.get(),
        rank_stream,
    })
}

/// Dispatches on the first two magic bytes of `data`.
pub fn detect_magic(data: &[u8]) -> Result<[u8; 2]> {
    if data.len() < 2 {
        return Err(Error::TruncatedStream { expected: 2, found: data.len() });
    }
    let magic = [data[0], data[1]];
    if magic != BYTE_MODE_MAGIC && magic != WORD_MODE_MAGIC {
        return Err(Error::InvalidMagic { found: magic });
    }
    Ok(magic)
}

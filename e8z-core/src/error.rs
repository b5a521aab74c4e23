//! The tagged error type returned by every fallible operation in this crate.

/// Every way a compress or decompress call can fail.
///
/// Variants map one-to-one onto the exit codes the CLI front-end reports;
/// see `e8ztool` for that mapping.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The container's leading two bytes did not match a known magic.
    #[error("invalid container magic: {found:?}")]
    InvalidMagic {
        /// The bytes actually found at the start of the stream.
        found: [u8; 2],
    },

    /// The stream ended before a declared length was satisfied.
    #[error("truncated stream: expected at least {expected} more bytes, found {found}")]
    TruncatedStream {
        /// Bytes required to continue parsing.
        expected: usize,
        /// Bytes actually available.
        found: usize,
    },

    /// The CRC32 recorded in the container did not match the recomputed value.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        /// Checksum recorded in the container header.
        stored: u32,
        /// Checksum recomputed from the decoded payload.
        computed: u32,
    },

    /// The container declares a format version this build does not understand.
    #[error("unsupported container version: {version}")]
    UnsupportedVersion {
        /// The version byte read from the header.
        version: u8,
    },

    /// The symbol table section failed a structural check while decoding.
    #[error("symbol table corrupt: {reason}")]
    SymbolTableCorrupt {
        /// Human-readable description of what check failed.
        reason: &'static str,
    },

    /// A decoded rank value fell outside the range the rank coder can produce.
    #[error("rank out of range: {rank} (max {max})")]
    RankOutOfRange {
        /// The decoded rank.
        rank: u32,
        /// The largest rank the current configuration can emit.
        max: u32,
    },

    /// Propagated I/O failure from the underlying reader or writer.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A caller-supplied `Options` value failed validation.
    #[error("invalid option: {0}")]
    InvalidOption(String),
}

/// Shorthand for `Result<T, Error>`, used throughout the crate's public API.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The process exit code this error should map to at the CLI boundary,
    /// per the exit-code table in spec.md §6: 1 invalid arguments, 2 I/O
    /// error, 3 format error, 4 checksum mismatch.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidOption(_) => 1,
            Error::IoError(_) => 2,
            Error::InvalidMagic { .. }
            | Error::TruncatedStream { .. }
            | Error::UnsupportedVersion { .. }
            | Error::SymbolTableCorrupt { .. }
            | Error::RankOutOfRange { .. } => 3,
            Error::ChecksumMismatch { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_documented_cli_table() {
        assert_eq!(Error::InvalidOption(String::new()).exit_code(), 1);
        assert_eq!(Error::IoError(std::io::Error::other("x")).exit_code(), 2);
        assert_eq!(Error::InvalidMagic { found: [0, 0] }.exit_code(), 3);
        assert_eq!(Error::ChecksumMismatch { stored: 0, computed: 1 }.exit_code(), 4);
    }
}


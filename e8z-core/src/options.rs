//! Caller-configurable knobs for [`crate::compress`]/[`crate::compress_stream`].

use crate::error::{Error, Result};
use crate::frame::{DEFAULT_FRAME_SIZE_KIB, MAX_FRAME_SIZE_KIB, MIN_FRAME_SIZE_KIB};
use crate::tokenizer::Mode;

/// Default, and maximum allowed, predictor context window length.
pub const DEFAULT_PREDICTOR_CONTEXT: u8 = 3;
const MAX_PREDICTOR_CONTEXT: u8 = 8;

/// Options controlling how a stream is compressed. Every field has a
/// documented default; call [`Options::validate`] before use (the top-level
/// API does this for you).
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Tokenizer mode; `Byte` is the lossless default for arbitrary data.
    pub mode: Mode,
    /// Target frame size, in KiB, for Horizon Batching.
    pub frame_size_kib: u32,
    /// Length of the predictor's context window, `0` disables prediction.
    pub predictor_context: u8,
    /// Reserved for the out-of-core self-learning embedding subsystem; this
    /// implementation only ever performs per-stream online updates, so this
    /// flag has no effect other than being validated and echoed back by
    /// round-tripping callers.
    pub self_learning: bool,
    /// Whether to compute and verify a CRC32 integrity field.
    pub checksum: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::Byte,
            frame_size_kib: DEFAULT_FRAME_SIZE_KIB,
            predictor_context: DEFAULT_PREDICTOR_CONTEXT,
            self_learning: false,
            checksum: true,
        }
    }
}

impl Options {
    /// Checks every field against its documented valid range, returning
    /// [`Error::InvalidOption`] on the first violation found.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FRAME_SIZE_KIB..=MAX_FRAME_SIZE_KIB).contains(&self.frame_size_kib) {
            return Err(Error::InvalidOption(format!(
                "frame_size_kib must be between {MIN_FRAME_SIZE_KIB} and {MAX_FRAME_SIZE_KIB}, got {}",
                self.frame_size_kib
            )));
        }
        if self.predictor_context > MAX_PREDICTOR_CONTEXT {
            return Err(Error::InvalidOption(format!(
                "predictor_context must be between 0 and {MAX_PREDICTOR_CONTEXT}, got {}",
                self.predictor_context
            )));
        }
        // The word/char-mode container (§4.8) carries no field to recover a
        // non-default context length on decode (decompress takes no
        // Options), so the learned-prediction path only supports the
        // default window for now; byte mode never builds a PredictionState
        // at all and is unaffected.
        if self.mode != Mode::Byte && self.predictor_context != DEFAULT_PREDICTOR_CONTEXT {
            return Err(Error::InvalidOption(format!(
                "predictor_context must be {DEFAULT_PREDICTOR_CONTEXT} for char/word mode (got {}): \
                 the container format has no field to recover a different context length on decode",
                self.predictor_context
            )));
        }
        Ok(())
    }

    /// The frame size in bytes implied by [`Options::frame_size_kib`].
    pub fn frame_size_bytes(&self) -> usize {
        self.frame_size_kib as usize * 1024
    }
}

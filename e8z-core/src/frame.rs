//! "Horizon Batching": splits an input of arbitrary size into bounded-size
//! frames so encoding and decoding keep a working set independent of total
//! input length.

/// Default frame size in KiB (233 KiB, the design point from the original
/// chunking scheme).
pub const DEFAULT_FRAME_SIZE_KIB: u32 = 233;

/// Smallest frame size an implementation is required to accept.
pub const MIN_FRAME_SIZE_KIB: u32 = 8;

/// Largest frame size an implementation is required to accept.
pub const MAX_FRAME_SIZE_KIB: u32 = 2 * 1024;

/// A contiguous byte range of the input, identifying one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    /// Inclusive start offset into the input.
    pub start: usize,
    /// Exclusive end offset into the input.
    pub end: usize,
}

impl FrameBounds {
    /// The number of bytes this frame spans.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the frame spans no bytes (never produced by [`partition`]).
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits an input of `input_len` bytes into frames of at most `frame_size`
/// bytes each. For `input_len <= frame_size` this returns a single frame
/// covering the whole input, so frame-boundary handling collapses to the
/// single-frame case exactly as required.
pub fn partition(input_len: usize, frame_size: usize) -> Vec<FrameBounds> {
    if input_len == 0 {
        return Vec::new();
    }
    let frame_size = frame_size.max(1);
    let mut frames = Vec::with_capacity(input_len.div_ceil(frame_size));
    let mut start = 0;
    while start < input_len {
        let end = (start + frame_size).min(input_len);
        frames.push(FrameBounds { start, end });
        start = end;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_frame_when_input_fits() {
        let frames = partition(100, 233 * 1024);
        assert_eq!(frames, vec![FrameBounds { start: 0, end: 100 }]);
    }

    #[test]
    fn splits_into_equal_frames_with_a_remainder() {
        let frames = partition(250, 100);
        assert_eq!(
            frames,
            vec![
                FrameBounds { start: 0, end: 100 },
                FrameBounds { start: 100, end: 200 },
                FrameBounds { start: 200, end: 250 },
            ]
        );
    }

    #[test]
    fn empty_input_has_no_frames() {
        assert!(partition(0, 100).is_empty());
    }

    #[test]
    fn concatenated_frame_ranges_cover_the_whole_input_exactly_once() {
        let frames = partition(1024 * 1024, 233 * 1024);
        let mut cursor = 0;
        for f in &frames {
            assert_eq!(f.start, cursor);
            cursor = f.end;
        }
        assert_eq!(cursor, 1024 * 1024);
    }
}

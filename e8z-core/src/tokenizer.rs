//! Splits input bytes into the `Symbol` sequence a [`crate::lattice::SymbolTable`] indexes.

/// Selects how input bytes are split into symbols.
///
/// Byte mode is the lossless default; char and word mode are text-only and
/// carry the normalization caveat documented on [`Mode::Word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Every input byte is its own symbol. Always round-trips exactly.
    Byte,
    /// Every Unicode scalar value is a symbol. Falls back to `Byte` if the
    /// input is not valid UTF-8.
    Char,
    /// Input is split on whitespace runs; each symbol is the lowercased
    /// UTF-8 of one run. Whitespace itself is not preserved: decoding joins
    /// words with a single space, so word mode does not round-trip bit for
    /// bit.
    Word,
}

impl Mode {
    /// Splits `input` into symbols under this mode, falling back to byte
    /// mode transparently if `Char`/`Word` mode is requested on non-UTF-8
    /// input.
    pub fn tokenize<'a>(self, input: &'a [u8]) -> Vec<std::borrow::Cow<'a, [u8]>> {
        use std::borrow::Cow;

        match self {
            Mode::Byte => input.iter().map(|&b| Cow::Owned(vec![b])).collect(),
            Mode::Char => match std::str::from_utf8(input) {
                Ok(s) => s.chars().map(|c| Cow::Owned(c.to_string().into_bytes())).collect(),
                Err(_) => input.iter().map(|&b| Cow::Owned(vec![b])).collect(),
            },
            Mode::Word => match std::str::from_utf8(input) {
                Ok(s) => s
                    .split_whitespace()
                    .map(|w| Cow::Owned(w.to_lowercase().into_bytes()))
                    .collect(),
                Err(_) => input.iter().map(|&b| Cow::Owned(vec![b])).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_mode_is_identity() {
        let input = b"hello\x00\xffworld";
        let tokens = Mode::Byte.tokenize(input);
        assert_eq!(tokens.len(), input.len());
        for (t, &b) in tokens.iter().zip(input.iter()) {
            assert_eq!(t.as_ref(), &[b]);
        }
    }

    #[test]
    fn char_mode_splits_scalar_values() {
        let input = "héllo".as_bytes();
        let tokens = Mode::Char.tokenize(input);
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn char_mode_falls_back_on_invalid_utf8() {
        let input = &[0xff, 0xfe, 0x00];
        let tokens = Mode::Char.tokenize(input);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn word_mode_lowercases_and_splits_on_whitespace() {
        let tokens = Mode::Word.tokenize(b"The Quick\tBrown  FOX");
        let words: Vec<&[u8]> = tokens.iter().map(|t| t.as_ref()).collect();
        assert_eq!(words, vec![b"the".as_slice(), b"quick", b"brown", b"fox"]);
    }
}

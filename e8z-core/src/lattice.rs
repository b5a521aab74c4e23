//! The E8 root system, the shared symbol table ("Singularity"), and the
//! deterministic symbol-to-root assignment built on top of it.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Number of roots in the E8 root system, and the size of the alphabet every
/// other subsystem codes against.
pub const ROOT_COUNT: usize = 240;

/// Number of bytes (240..=255) that fall back to sharing a root with a
/// direct-mapped byte below 240.
pub const BYTE_OVERFLOW_COUNT: usize = 16;

/// Fixed seed for the word/char-mode symbol hash, part of the on-wire format
/// contract: containers are only cross-compatible with implementations that
/// agree on hash and seed.
pub const LATTICE_HASH_SEED: u64 = 0x4538_3730_4538_3630;

/// Generates the 240 roots of the E8 lattice as 8-dimensional vectors.
///
/// Type I: the 112 roots with exactly two nonzero coordinates, each ±1.
/// Type II: the 128 roots with every coordinate ±0.5 and an even number of
/// minus signs. All 240 roots have Euclidean norm `sqrt(2)`.
pub fn generate_e8_roots() -> [[f64; 8]; ROOT_COUNT] {
    let mut roots = [[0.0f64; 8]; ROOT_COUNT];
    let mut idx = 0;

    for i in 0..8 {
        for j in (i + 1)..8 {
            for &s1 in &[1.0, -1.0] {
                for &s2 in &[1.0, -1.0] {
                    let mut v = [0.0f64; 8];
                    v[i] = s1;
                    v[j] = s2;
                    roots[idx] = v;
                    idx += 1;
                }
            }
        }
    }
    debug_assert_eq!(idx, 112);

    for mask in 0u32..256 {
        if mask.count_ones() % 2 == 0 {
            let mut v = [0.0f64; 8];
            for bit in 0..8 {
                v[bit] = if (mask >> bit) & 1 == 1 { -0.5 } else { 0.5 };
            }
            roots[idx] = v;
            idx += 1;
        }
    }
    debug_assert_eq!(idx, ROOT_COUNT);

    roots
}

fn dot(a: &[f64; 8], b: &[f64; 8]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64; 8]) -> f64 {
    dot(a, a).sqrt()
}

/// Computes the cosine similarity between every pair of the 240 roots,
/// returned as a row-major `240 * 240` flat matrix.
pub fn root_cosine_similarity() -> Vec<f64> {
    let roots = generate_e8_roots();
    let norms: Vec<f64> = roots.iter().map(norm).collect();
    let mut sim = vec![0.0f64; ROOT_COUNT * ROOT_COUNT];
    for i in 0..ROOT_COUNT {
        for j in 0..ROOT_COUNT {
            let denom = norms[i] * norms[j];
            sim[i * ROOT_COUNT + j] = if denom > 0.0 { dot(&roots[i], &roots[j]) / denom } else { 0.0 };
        }
    }
    sim
}

/// Derives a row-stochastic geometric prior over roots from their pairwise
/// cosine similarity, with a softmax at the given temperature `tau`.
///
/// Row `i`, column `j` is the prior probability of transitioning from root
/// `i` to root `j`, derived purely from lattice geometry with no dependence
/// on observed data.
pub fn geometric_prior(tau: f64) -> Vec<f64> {
    let sim = root_cosine_similarity();
    let mut prior = vec![0.0f64; ROOT_COUNT * ROOT_COUNT];
    for i in 0..ROOT_COUNT {
        let row = &sim[i * ROOT_COUNT..(i + 1) * ROOT_COUNT];
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = row.iter().map(|&s| ((s - max) / tau).exp()).collect();
        let sum: f64 = exp.iter().sum();
        for j in 0..ROOT_COUNT {
            prior[i * ROOT_COUNT + j] = exp[j] / sum;
        }
    }
    prior
}

/// Maps a symbol (a byte, in byte mode) to a root id in `[0, 240)`.
///
/// Bytes `0..240` map directly to their own root. Bytes `240..256` share
/// roots `0..16`, distinguished from the direct-mapped byte by a nonzero
/// `offset_in_root` assigned by [`SymbolTable`].
pub fn byte_root_id(byte: u8) -> u8 {
    (byte as u16 % ROOT_COUNT as u16) as u8
}

/// Hashes an arbitrary symbol (word/char mode) down to a root id using a
/// fixed-seed 64-bit hash, per [`LATTICE_HASH_SEED`].
pub fn symbol_root_id(symbol: &[u8]) -> u8 {
    let h = xxhash_rust::xxh3::xxh3_64_with_seed(symbol, LATTICE_HASH_SEED);
    (h % ROOT_COUNT as u64) as u8
}

/// The shared, insertion-ordered symbol table ("Singularity") threaded
/// through every frame of a stream.
///
/// Invariants: the forward map is injective, indices are contiguous
/// starting at 0, and once [`SymbolTable::freeze`] has been called no new
/// symbol may be inserted.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    forward: Vec<Box<[u8]>>,
    reverse: HashMap<Box<[u8]>, u32>,
    frozen: bool,
    /// `buckets[root]` holds the indices of every symbol assigned to that
    /// root, in insertion order; position within the bucket is the symbol's
    /// `offset_in_root`.
    buckets: Vec<Vec<u32>>,
    /// `index_root[i]` is the root assigned to symbol index `i`; kept
    /// alongside `buckets` so `root_of` is O(1) instead of a bucket scan.
    index_root: Vec<u8>,
}

impl SymbolTable {
    /// Creates an empty table, pre-sizing the forward/reverse maps to
    /// `expected_symbols` as the allocation discipline in the streaming
    /// design calls for.
    pub fn with_capacity(expected_symbols: usize) -> Self {
        Self {
            forward: Vec::with_capacity(expected_symbols),
            reverse: HashMap::with_capacity(expected_symbols),
            frozen: false,
            buckets: vec![Vec::new(); ROOT_COUNT],
            index_root: Vec::with_capacity(expected_symbols),
        }
    }

    /// Number of distinct symbols currently in the table.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// True if the table holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Whether the table has been frozen and will reject further inserts.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Prevents further inserts. Called once the first encode pass over the
    /// stream has completed.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn root_for(byte_mode: bool, symbol: &[u8]) -> u8 {
        if byte_mode {
            debug_assert_eq!(symbol.len(), 1);
            byte_root_id(symbol[0])
        } else {
            symbol_root_id(symbol)
        }
    }

    /// Looks up `symbol`, inserting it (and assigning it a root/bucket
    /// offset) if the table is not frozen and the symbol is new.
    ///
    /// `byte_mode` selects the [`crate::lattice`] assignment rule to use for
    /// a newly inserted symbol.
    pub fn intern(&mut self, symbol: &[u8], byte_mode: bool) -> Result<u32> {
        if let Some(&index) = self.reverse.get(symbol) {
            return Ok(index);
        }
        if self.frozen {
            return Err(Error::SymbolTableCorrupt {
                reason: "symbol table is frozen but a new symbol was encountered",
            });
        }
        let index = self.forward.len() as u32;
        let boxed: Box<[u8]> = symbol.into();
        let root = Self::root_for(byte_mode, symbol);
        self.buckets[root as usize].push(index);
        self.index_root.push(root);
        self.forward.push(boxed.clone());
        self.reverse.insert(boxed, index);
        Ok(index)
    }

    /// Looks up an existing symbol without inserting; returns `None` if
    /// unseen.
    pub fn get_index(&self, symbol: &[u8]) -> Option<u32> {
        self.reverse.get(symbol).copied()
    }

    /// Recovers the symbol bytes for a previously interned index.
    pub fn symbol_at(&self, index: u32) -> Result<&[u8]> {
        self.forward
            .get(index as usize)
            .map(|b| b.as_ref())
            .ok_or(Error::SymbolTableCorrupt { reason: "symbol index out of range" })
    }

    /// The root id assigned to `index`.
    pub fn root_of(&self, index: u32) -> Result<u8> {
        self.index_root
            .get(index as usize)
            .copied()
            .ok_or(Error::SymbolTableCorrupt { reason: "symbol index not assigned to any root" })
    }

    /// The position of `index` within its root's bucket (insertion order).
    pub fn offset_in_root(&self, index: u32) -> Result<u32> {
        let root = self.root_of(index)?;
        self.buckets[root as usize]
            .iter()
            .position(|&i| i == index)
            .map(|p| p as u32)
            .ok_or(Error::SymbolTableCorrupt { reason: "symbol index not found in its root bucket" })
    }

    /// Recovers the symbol index from a `(root, offset_in_root)` pair, the
    /// canonical codable identifier once the table is known to the decoder.
    pub fn index_at(&self, root: u8, offset_in_root: u32) -> Result<u32> {
        self.buckets
            .get(root as usize)
            .and_then(|bucket| bucket.get(offset_in_root as usize))
            .copied()
            .ok_or(Error::SymbolTableCorrupt { reason: "(root, offset) pair has no symbol" })
    }

    /// The number of symbols currently sharing `root`.
    pub fn bucket_len(&self, root: u8) -> usize {
        self.buckets[root as usize].len()
    }

    /// Registers a symbol index directly under a known root without
    /// consulting the hash/mod rule, used when reconstructing a table from
    /// an explicit on-wire OOV block during decode.
    pub fn insert_at_root(&mut self, symbol: &[u8], root: u8) -> u32 {
        let index = self.forward.len() as u32;
        let boxed: Box<[u8]> = symbol.into();
        self.buckets[root as usize].push(index);
        self.index_root.push(root);
        self.forward.push(boxed.clone());
        self.reverse.insert(boxed, index);
        index
    }

    /// A CRC32 over the forward table, usable as the container's
    /// `shared_table_id` to let a decoder detect a mismatched table.
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        for symbol in &self.forward {
            hasher.update(&(symbol.len() as u32).to_le_bytes());
            hasher.update(symbol);
        }
        hasher.finalize()
    }
}

//! A lossless compressor built on E8-lattice symbol geometry.
//!
//! Input symbols are assigned onto the 240-point E8 root system
//! ([`lattice`]), consecutive roots are differentially encoded as signed
//! angular displacements ([`diffcoder`]), and a context-conditioned
//! predictor ([`predictor`]) turns the sequence into prediction ranks that a
//! fixed prefix code ([`rankcoder`]) packs into a bit stream ([`bitio`]).
//! [`frame`] partitions arbitrarily large input into bounded frames that
//! share one symbol table across the whole stream, so working-set memory
//! during encode/decode stays independent of input size. [`container`]
//! defines the two on-wire layouts, and [`api`] wires every subsystem
//! together behind [`compress`]/[`decompress`].
//!
//! See `SPEC_FULL.md` at the workspace root for the full design rationale
//! and `DESIGN.md` for the grounding of each module.

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

pub mod api;
pub mod bitio;
pub mod container;
pub mod diffcoder;
pub mod error;
pub mod frame;
pub mod lattice;
pub mod options;
pub mod predictor;
pub mod rankcoder;
pub mod tokenizer;

pub use api::{compress, compress_stream, decompress, decompress_stream};
pub use error::{Error, Result};
pub use options::Options;
pub use tokenizer::Mode;

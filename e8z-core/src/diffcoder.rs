//! Differential displacement coding over the 240-point root ring.

use crate::lattice::ROOT_COUNT;

const RING: i32 = ROOT_COUNT as i32;
const HALF: i32 = 120;

/// Encodes a root sequence as a displacement sequence: the first element is
/// passed through raw, every subsequent element is the signed modular
/// difference from its predecessor, wrapped into `[-120, 119]`.
pub fn encode(roots: &[u8]) -> Vec<i32> {
    let mut out = Vec::with_capacity(roots.len());
    let mut prev: Option<i32> = None;
    for &r in roots {
        let r = r as i32;
        match prev {
            None => out.push(r),
            Some(p) => out.push(((r - p + HALF).rem_euclid(RING)) - HALF),
        }
        prev = Some(r);
    }
    out
}

/// Inverse of [`encode`]: reconstructs the root sequence from displacements.
pub fn decode(displacements: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(displacements.len());
    let mut prev: Option<i32> = None;
    for &d in displacements {
        let r = match prev {
            None => d.rem_euclid(RING),
            Some(p) => (p + d).rem_euclid(RING),
        };
        out.push(r as u8);
        prev = Some(r);
    }
    out
}

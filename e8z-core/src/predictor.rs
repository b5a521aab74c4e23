//! The context-conditioned predictor: a bigram transition-count matrix over
//! the 240 roots, seeded with a geometric prior and updated online in
//! lock-step by encoder and decoder.

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::lattice::{geometric_prior, ROOT_COUNT};

/// Row-sum threshold above which a row's counts are halved.
pub const SATURATION_THRESHOLD: u64 = 1 << 16;

/// Default integer weight applied to the geometric prior when seeding the
/// count matrix.
pub const DEFAULT_PRIOR_WEIGHT: u64 = 10;

/// Small positive floor added to every cell so no row starts at zero.
pub const PRIOR_EPSILON: u64 = 1;

/// Default softmax temperature for the geometric prior.
pub const DEFAULT_TEMPERATURE: f64 = 0.5;

const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Mutable predictor state: the 240x240 count matrix plus a bounded context
/// window of recently seen roots.
///
/// Encoder and decoder construct this identically and apply the exact same
/// update after every symbol, so their internal state never diverges.
#[derive(Debug, Clone)]
pub struct PredictionState {
    counts: Vec<u64>,
    context: VecDeque<u8>,
    context_size: usize,
}

impl PredictionState {
    /// Builds a fresh predictor with `context_size` history slots (the
    /// design point is 3; `0` disables prediction entirely — callers should
    /// check for that case before using rank coding). The count matrix is
    /// seeded from the lattice's geometric prior at `DEFAULT_TEMPERATURE`
    /// scaled by `DEFAULT_PRIOR_WEIGHT` plus `PRIOR_EPSILON`.
    pub fn new(context_size: usize) -> Self {
        Self::with_params(context_size, DEFAULT_PRIOR_WEIGHT, PRIOR_EPSILON, DEFAULT_TEMPERATURE)
    }

    /// Like [`PredictionState::new`] but with explicit prior-seeding
    /// parameters, exposed for testing and tuning.
    pub fn with_params(context_size: usize, omega: u64, epsilon: u64, tau: f64) -> Self {
        let prior = geometric_prior(tau);
        let counts = prior
            .iter()
            .map(|&p| (p * omega as f64).round() as u64 + epsilon)
            .collect();
        Self { counts, context: VecDeque::with_capacity(context_size.max(1)), context_size }
    }

    fn row(&self, root: u8) -> &[u64] {
        let start = root as usize * ROOT_COUNT;
        &self.counts[start..start + ROOT_COUNT]
    }

    fn context_weights(&self) -> Vec<(u8, f64)> {
        self.context
            .iter()
            .enumerate()
            .map(|(i, &root)| (root, 1.0 / GOLDEN_RATIO.powi(i as i32)))
            .collect()
    }

    /// Computes the probability distribution over the next root given the
    /// current context. Returns the uniform distribution if the context is
    /// empty (stream start, or `context_size == 0`).
    pub fn distribution(&self) -> [f64; ROOT_COUNT] {
        let mut p = [0.0f64; ROOT_COUNT];
        let weighted = self.context_weights();
        if weighted.is_empty() {
            let uniform = 1.0 / ROOT_COUNT as f64;
            p.fill(uniform);
            return p;
        }

        let weight_sum: f64 = weighted.iter().map(|(_, w)| w).sum();
        for &(ctx_root, w) in &weighted {
            let row = self.row(ctx_root);
            let row_sum: u64 = row.iter().sum();
            for j in 0..ROOT_COUNT {
                p[j] += w * (row[j] as f64 / row_sum as f64);
            }
        }
        for v in p.iter_mut() {
            *v /= weight_sum;
        }
        p
    }

    /// Returns roots in descending-probability order, ties broken by
    /// ascending root id (a stable sort over root id already gives this once
    /// probabilities compare equal).
    fn ranked_roots(&self) -> [u8; ROOT_COUNT] {
        let p = self.distribution();
        let mut order: [u8; ROOT_COUNT] = std::array::from_fn(|i| i as u8);
        order.sort_by(|&a, &b| {
            p[b as usize]
                .partial_cmp(&p[a as usize])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        order
    }

    /// The rank of `actual` within the descending-probability ordering.
    pub fn rank(&self, actual: u8) -> u32 {
        let order = self.ranked_roots();
        order.iter().position(|&r| r == actual).expect("every root appears exactly once") as u32
    }

    /// The inverse of [`PredictionState::rank`]: recovers the root at a
    /// given rank.
    pub fn root_at_rank(&self, rank: u32) -> Result<u8> {
        if rank as usize >= ROOT_COUNT {
            return Err(Error::RankOutOfRange { rank, max: ROOT_COUNT as u32 - 1 });
        }
        Ok(self.ranked_roots()[rank as usize])
    }

    /// Updates the count matrix with an observed transition into `actual`,
    /// then slides `actual` into the context window. Must be called in the
    /// same order by encoder and decoder.
    pub fn update(&mut self, actual: u8) {
        if let Some(&last) = self.context.front() {
            let idx = last as usize * ROOT_COUNT + actual as usize;
            self.counts[idx] += 1;
            self.saturate_row(last);
        }
        self.context.push_front(actual);
        self.context.truncate(self.context_size);
    }

    fn saturate_row(&mut self, root: u8) {
        let start = root as usize * ROOT_COUNT;
        let row = &mut self.counts[start..start + ROOT_COUNT];
        let sum: u64 = row.iter().sum();
        if sum > SATURATION_THRESHOLD {
            for c in row.iter_mut() {
                *c = *c / 2 + 1;
            }
        }
    }
}

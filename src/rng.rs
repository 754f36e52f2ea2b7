// src/rng.rs

//! Seed handling and deterministic pseudo-randomness.
//!
//! Everything stochastic in this crate flows through one 256-bit seed. The
//! seed is reduced to a bounded integer (`reduce`), and every independent
//! decision (palette, fold geometry, render mode, ...) derives its own
//! *channel* by adding a fixed offset to that integer before seeding a fresh
//! [`SeededSequence`]. Re-running any channel from the same seed reproduces
//! the same infinite output sequence; this determinism is the whole point.
//!
//! The reduction rule, the LCG constants, and the channel offsets are an
//! external contract shared with an independently maintained on-chain
//! evaluator. Do not change them.

use anyhow::{bail, Result};

/// Modulus for the seed domain and the sequence state: `2^31 - 1`.
pub const SEED_DOMAIN: u64 = 0x7fff_ffff;

const LCG_MUL: u64 = 1_103_515_245;
const LCG_INC: u64 = 12_345;

/// Fixed per-purpose channel offsets. Part of the reproducibility contract.
pub mod channel {
    /// Palette selection.
    pub const PALETTE: u64 = 1111;
    /// Fold geometry (per-step simulation draws).
    pub const GEOMETRY: u64 = 2222;
    /// Render mode selection.
    pub const RENDER_MODE: u64 = 3333;
    /// Draw direction selection.
    pub const DRAW_DIRECTION: u64 = 4444;
    /// Fold strategy preset selection.
    pub const FOLD_STRATEGY: u64 = 5555;
    /// Paper profile (absorbency, grain angle affinity).
    pub const PAPER: u64 = 6666;
    /// Rare crease-line overlay roll.
    pub const CREASE_LINES: u64 = 7777;
    /// Rare hit-count overlay roll.
    pub const HIT_COUNTS: u64 = 8888;
    /// Rare analytics overlay roll.
    pub const ANALYTICS: u64 = 9999;
}

/// An opaque 256-bit seed supplied by external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Wraps raw seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Seed(bytes)
    }

    /// Parses a seed from a 64-digit hex string, with or without a `0x`
    /// prefix.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
        if digits.len() != 64 {
            bail!(
                "seed must be 64 hex digits (256 bits), got {} digits",
                digits.len()
            );
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("seed contains non-hex characters");
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16)
                .map_err(|e| anyhow::anyhow!("invalid hex at byte {}: {}", i, e))?;
        }
        Ok(Seed(bytes))
    }

    /// Renders the seed back as a `0x`-prefixed lowercase hex string.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(66);
        out.push_str("0x");
        for b in &self.0 {
            out.push_str(&format!("{:02x}", b));
        }
        out
    }

    /// The upper 64 bits of the seed, big-endian.
    pub fn upper64(&self) -> u64 {
        u64::from_be_bytes(self.0[..8].try_into().unwrap())
    }
}

/// Reduces a 256-bit seed to the seed domain: upper 64 bits mod `2^31 - 1`.
///
/// This exact rule is recomputed by a constrained on-chain evaluator that
/// only has cheap 64-bit word operations; any change breaks parity.
pub fn reduce(seed: &Seed) -> u64 {
    seed.upper64() % SEED_DOMAIN
}

/// A deterministic pseudo-random sequence of floats in `[0, 1)`.
///
/// Fixed linear-congruential recurrence over a 31-bit state. The state is
/// exclusively owned; restart a channel by constructing a fresh instance
/// with the same channel seed.
#[derive(Debug, Clone)]
pub struct SeededSequence {
    state: u64,
}

impl SeededSequence {
    /// Creates a sequence keyed by a channel seed.
    pub fn new(channel_seed: u64) -> Self {
        SeededSequence {
            state: channel_seed % SEED_DOMAIN,
        }
    }

    /// Advances the state and returns the next float in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        // state < 2^31, so state * LCG_MUL < 2^61: no overflow in u64.
        self.state = (self.state * LCG_MUL + LCG_INC) & SEED_DOMAIN;
        self.state as f64 / SEED_DOMAIN as f64
    }

    /// Next float scaled into `[min, max)`.
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next() * (max - min)
    }
}

/// Which end of a list `pick_biased` favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Start,
    End,
}

/// Picks a uniformly random element.
///
/// # Panics
/// Panics if `items` is empty; callers guarantee non-empty pools.
pub fn pick_uniform<'a, T>(seq: &mut SeededSequence, items: &'a [T]) -> &'a T {
    let idx = ((seq.next() * items.len() as f64) as usize).min(items.len() - 1);
    &items[idx]
}

/// Picks an element with the index biased toward one end of the list, by
/// squaring the draw (and mirroring it for [`Bias::End`]).
///
/// # Panics
/// Panics if `items` is empty; callers guarantee non-empty pools.
pub fn pick_biased<'a, T>(seq: &mut SeededSequence, items: &'a [T], bias: Bias) -> &'a T {
    let d = seq.next();
    let t = match bias {
        Bias::Start => d * d,
        Bias::End => 1.0 - d * d,
    };
    let idx = ((t * items.len() as f64) as usize).min(items.len() - 1);
    &items[idx]
}

/// Draws an index proportionally to a weight list. Ties break toward the
/// first index whose cumulative weight reaches the draw.
///
/// # Panics
/// Panics if `weights` is empty.
pub fn weighted_index(seq: &mut SeededSequence, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    let target = seq.next() * total;
    let mut cum = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cum += w;
        if target < cum {
            return i;
        }
    }
    weights.len() - 1
}

/// SplitMix64-style avalanche, used as the fold simulator's step-mutation
/// hash. Not part of the on-chain contract, but still deterministic.
pub fn mix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn seed_with_upper(upper: u64) -> Seed {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&upper.to_be_bytes());
        Seed::from_bytes(bytes)
    }

    #[test]
    fn reduce_matches_documented_golden_value() {
        let seed = seed_with_upper(0x1234_5678_90ab_cdef);
        assert_eq!(reduce(&seed), 890_534_624);
    }

    #[test]
    fn reduce_ignores_lower_bits() {
        let mut bytes = [0xffu8; 32];
        bytes[..8].copy_from_slice(&0x1234_5678_90ab_cdefu64.to_be_bytes());
        assert_eq!(reduce(&Seed::from_bytes(bytes)), 890_534_624);
    }

    #[test]
    fn hex_round_trip() {
        let hex = "0x0fedcba987654321000000000000000000000000000000000000000000000000";
        let seed = Seed::from_hex(hex).unwrap();
        assert_eq!(seed.upper64(), 0x0fed_cba9_8765_4321);
        assert_eq!(seed.to_hex(), hex);
    }

    #[test]
    fn hex_rejects_bad_input() {
        assert!(Seed::from_hex("0x1234").is_err());
        assert!(Seed::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn sequence_is_reproducible() {
        let mut a = SeededSequence::new(42);
        let mut b = SeededSequence::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn sequence_outputs_stay_in_unit_interval() {
        let mut seq = SeededSequence::new(0);
        for _ in 0..10_000 {
            let v = seq.next();
            assert!((0.0..1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn channels_decorrelate() {
        let mut a = SeededSequence::new(1000 + channel::PALETTE);
        let mut b = SeededSequence::new(1000 + channel::GEOMETRY);
        let first_a: Vec<f64> = (0..4).map(|_| a.next()).collect();
        let first_b: Vec<f64> = (0..4).map(|_| b.next()).collect();
        assert_ne!(first_a, first_b);
    }

    #[test]
    fn weighted_index_respects_cumulative_buckets() {
        // With weights [1, 1] a draw below 0.5 picks index 0, above picks 1.
        let mut seq = SeededSequence::new(7);
        let draw_preview = SeededSequence::new(7).next();
        let idx = weighted_index(&mut seq, &[1.0, 1.0]);
        assert_eq!(idx, usize::from(draw_preview >= 0.5));
    }

    #[test]
    fn pick_biased_start_prefers_low_indices() {
        let items: Vec<usize> = (0..100).collect();
        let mut seq = SeededSequence::new(99);
        let mut sum_start = 0usize;
        for _ in 0..500 {
            sum_start += *pick_biased(&mut seq, &items, Bias::Start);
        }
        let mut seq = SeededSequence::new(99);
        let mut sum_end = 0usize;
        for _ in 0..500 {
            sum_end += *pick_biased(&mut seq, &items, Bias::End);
        }
        assert!(sum_start < sum_end);
    }
}

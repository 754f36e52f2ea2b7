// src/traits.rs

//! Seed-only trait classification.
//!
//! Every function here derives its label directly from the seed, without
//! touching the rendering path. Most are thin wrappers replaying the same
//! channel rolls the pipeline components use, kept independently callable
//! because the minting flow asks for traits without rendering.
//!
//! Hard invariant: for a fixed seed, every label must be byte-identical
//! between this engine and the constrained on-chain evaluator. That parity
//! is enforced by the fixture corpus under `tests/fixtures/`, not by
//! runtime checks; treat any mismatch as a defect, never as a reason to
//! adjust a formula.

use crate::fold::FoldStrategy;
use crate::glyph::RareFeatures;
use crate::palette;
use crate::renderer::{DrawDirection, RenderMode};
use crate::rng::{channel, reduce, Seed, SeededSequence};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Probability of the crease-line overlay trait.
pub const CREASE_LINES_PROBABILITY: f64 = 0.03;
/// Probability of the hit-count overlay trait.
pub const HIT_COUNTS_PROBABILITY: f64 = 0.02;
/// Probability of the analytics overlay trait.
pub const ANALYTICS_PROBABILITY: f64 = 0.015;
/// Probability that the paper carries a grain angle affinity.
pub const PAPER_GRAIN_PROBABILITY: f64 = 0.30;

/// The complete discrete label set exposed for NFT metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitSet {
    pub fold_strategy: String,
    pub render_mode: String,
    pub draw_direction: String,
    pub palette_strategy: String,
    pub color_count: u8,
    pub is_monochrome: bool,
    pub paper_type: String,
    pub has_paper_grain: bool,
    pub has_crease_lines: bool,
    pub has_hit_counts: bool,
    pub has_analytics_mode: bool,
}

/// Paper type and grain angle affinity from the paper channel.
///
/// Absorbency is a continuous first draw: below 0.35 the paper resists ink,
/// below 0.65 it is standard stock, above it soaks. The grain sub-roll
/// yields an angle affinity only for a minority of seeds; the grain trait
/// is simply whether that angle exists.
pub fn paper_profile(channel_seed: u64) -> (&'static str, Option<f64>) {
    let mut seq = SeededSequence::new(channel_seed);
    let absorbency = seq.next();
    let paper_type = if absorbency < 0.35 {
        "Resistant"
    } else if absorbency < 0.65 {
        "Standard"
    } else {
        "Absorbent"
    };
    let grain_roll = seq.next();
    let angle = if grain_roll < PAPER_GRAIN_PROBABILITY {
        Some(seq.next() * 360.0)
    } else {
        None
    };
    (paper_type, angle)
}

/// Rare render features, each gated by a low-probability roll on its own
/// channel. Shared with the renderer so traits and artwork agree.
pub fn rare_features(seed_domain: u64) -> RareFeatures {
    let mut features = RareFeatures::empty();
    if SeededSequence::new(seed_domain + channel::CREASE_LINES).next() < CREASE_LINES_PROBABILITY {
        features |= RareFeatures::CREASE_LINES;
    }
    if SeededSequence::new(seed_domain + channel::HIT_COUNTS).next() < HIT_COUNTS_PROBABILITY {
        features |= RareFeatures::HIT_COUNTS;
    }
    if SeededSequence::new(seed_domain + channel::ANALYTICS).next() < ANALYTICS_PROBABILITY {
        features |= RareFeatures::ANALYTICS;
    }
    features
}

/// Derives the full trait set from a seed. Pure; no rendering involved.
pub fn classify(seed: &Seed) -> TraitSet {
    let n = reduce(seed);
    let pal = palette::generate(n + channel::PALETTE);
    let (paper_type, grain_angle) = paper_profile(n + channel::PAPER);
    let features = rare_features(n);
    TraitSet {
        fold_strategy: FoldStrategy::roll(n + channel::FOLD_STRATEGY)
            .name()
            .to_string(),
        render_mode: RenderMode::roll(n + channel::RENDER_MODE).name().to_string(),
        draw_direction: DrawDirection::roll(n + channel::DRAW_DIRECTION)
            .name()
            .to_string(),
        palette_strategy: pal.strategy.display_name(),
        color_count: pal.color_count(),
        is_monochrome: pal.strategy.is_monochrome(),
        paper_type: paper_type.to_string(),
        has_paper_grain: grain_angle.is_some(),
        has_crease_lines: features.contains(RareFeatures::CREASE_LINES),
        has_hit_counts: features.contains(RareFeatures::HIT_COUNTS),
        has_analytics_mode: features.contains(RareFeatures::ANALYTICS),
    }
}

/// One record of the parity fixture corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParityRecord {
    pub seed_hex: String,
    pub seed_num: u64,
    pub traits: TraitSet,
}

/// The parity fixture file shape shared with the on-chain evaluator's test
/// harness: a record list plus a map of special seeds, one per rare trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityFixture {
    pub records: Vec<ParityRecord>,
    pub special: BTreeMap<String, String>,
}

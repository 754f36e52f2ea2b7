// src/lib.rs

//! paperfold: a deterministic paper-fold artwork and trait engine.
//!
//! Given a 256-bit seed and a fold count, the engine renders a unique
//! "paper-fold" artwork, and independently derives a fixed vocabulary of
//! discrete classification labels from the same seed. Both operations are
//! pure, bounded computations: the same inputs always produce the same
//! pixels and the same labels, on any runtime.
//!
//! External collaborators interact through two narrow contracts only:
//! [`render`] (seed + fold count -> pixel buffer) and [`classify`]
//! (seed -> trait labels).

pub mod color;
pub mod config;
pub mod density;
pub mod fold;
pub mod geometry;
pub mod glyph;
pub mod palette;
pub mod renderer;
pub mod rng;
pub mod traits;

use anyhow::{bail, Result};
use log::{debug, info};

pub use crate::config::Config;
pub use crate::renderer::Frame;
pub use crate::rng::Seed;
pub use crate::traits::{ParityFixture, ParityRecord, TraitSet};

use crate::density::ShadeThresholds;
use crate::fold::FoldStrategy;
use crate::renderer::{DrawDirection, GridRenderer, RenderMode};
use crate::rng::channel;

/// Renders the artwork for a seed with the process-wide default config.
///
/// Deterministic: the same inputs always yield a byte-identical buffer.
/// Zero width or height is reported as an error; no useful sheet polygon
/// exists for an empty canvas.
pub fn render(seed: &Seed, fold_count: u32, width: u32, height: u32) -> Result<Frame> {
    render_with_config(seed, fold_count, width, height, &config::CONFIG)
}

/// [`render`] with an explicit configuration.
pub fn render_with_config(
    seed: &Seed,
    fold_count: u32,
    width: u32,
    height: u32,
    cfg: &Config,
) -> Result<Frame> {
    if width == 0 || height == 0 {
        bail!("render target must have nonzero dimensions, got {}x{}", width, height);
    }

    let n = rng::reduce(seed);
    info!("render: seed domain {} fold count {}", n, fold_count);

    let palette = palette::generate(n + channel::PALETTE);
    let strategy = FoldStrategy::roll(n + channel::FOLD_STRATEGY);
    let outcome = fold::simulate(
        width as f64,
        height as f64,
        fold_count,
        n + channel::GEOMETRY,
        (cfg.fold.weight_min, cfg.fold.weight_max),
        strategy,
    );
    debug!(
        "render: strategy {} produced {} creases",
        strategy.name(),
        outcome.creases.len()
    );

    let cols = (width / cfg.render.cell_width).max(1) as usize;
    let rows = (height / cfg.render.cell_height).max(1) as usize;
    let cell_width = width as f64 / cols as f64;
    let cell_height = height as f64 / rows as f64;
    let grid = density::analyze(&outcome.creases, cols, rows, cell_width, cell_height);
    let thresholds = ShadeThresholds::from_weights(&grid.nonzero_weights());

    let last_target_cell = outcome.last_target.map(|p| {
        (
            ((p.x / cell_width) as usize).min(cols - 1),
            ((p.y / cell_height) as usize).min(rows - 1),
        )
    });

    let mut frame = Frame::new(width, height);
    GridRenderer {
        grid: &grid,
        thresholds,
        palette: &palette,
        mode: RenderMode::roll(n + channel::RENDER_MODE),
        direction: DrawDirection::roll(n + channel::DRAW_DIRECTION),
        features: traits::rare_features(n),
        last_target_cell,
        creases: &outcome.creases,
    }
    .paint(&mut frame)?;
    Ok(frame)
}

/// Derives the trait labels for a seed. Pure; never renders.
pub fn classify(seed: &Seed) -> TraitSet {
    traits::classify(seed)
}

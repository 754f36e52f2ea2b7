// src/fold.rs

//! The iterative paper-fold simulation.
//!
//! Each step folds the current sheet polygon across the perpendicular
//! bisector of a seeded source/target point pair: split, reflect the side
//! holding the source, and recombine the two sides through a convex-hull
//! union. The hull union approximates true origami re-stacking without
//! tracking overlapping layers; this is deliberate, observed behavior and
//! must not be "fixed" (parity fixtures depend on it).
//!
//! Degenerate steps (tiny span, empty split side, off-canvas crease) are
//! skipped locally: they advance a mutation hash but consume no crease
//! slot, and the simulation continues from the prior polygon.

use crate::geometry::{
    clip_segment_to_rect, convex_hull, reflect_across, side_of, Point, Polygon,
};
use crate::rng::{mix64, weighted_index, SeededSequence};
use log::trace;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

/// Minimum source/target span as a fraction of the bounding box short side.
pub const MIN_FOLD_SPAN_FRACTION: f64 = 0.05;
/// The polygon is renormalized to the canvas every this many accepted steps.
pub const RENORM_INTERVAL: usize = 5;
/// Decayed crease weights never drop below this.
pub const WEIGHT_FLOOR: f64 = 0.01;

/// Fold-strategy presets. They bias only the initial parameter choices
/// (preferred fold axis, cluster disc, lattice snap) and never the per-step
/// algorithm itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStrategy {
    Horizontal,
    Vertical,
    Diagonal,
    Radial,
    Grid,
    Clustered,
    Random,
}

impl FoldStrategy {
    pub const ALL: [FoldStrategy; 7] = [
        FoldStrategy::Horizontal,
        FoldStrategy::Vertical,
        FoldStrategy::Diagonal,
        FoldStrategy::Radial,
        FoldStrategy::Grid,
        FoldStrategy::Clustered,
        FoldStrategy::Random,
    ];

    /// Selection weights for the dedicated strategy channel.
    pub const WEIGHTS: [f64; 7] = [20.0, 20.0, 15.0, 12.0, 12.0, 11.0, 10.0];

    pub fn name(&self) -> &'static str {
        match self {
            FoldStrategy::Horizontal => "Horizontal",
            FoldStrategy::Vertical => "Vertical",
            FoldStrategy::Diagonal => "Diagonal",
            FoldStrategy::Radial => "Radial",
            FoldStrategy::Grid => "Grid",
            FoldStrategy::Clustered => "Clustered",
            FoldStrategy::Random => "Random",
        }
    }

    /// Weighted roll on a dedicated channel seed.
    pub fn roll(channel_seed: u64) -> FoldStrategy {
        let mut seq = SeededSequence::new(channel_seed);
        Self::ALL[weighted_index(&mut seq, &Self::WEIGHTS)]
    }
}

/// One recorded fold line. Creases are append-only; `depth` is creation
/// order and never reused.
#[derive(Debug, Clone)]
pub struct Crease {
    /// Endpoints, already clipped to the drawing rectangle.
    pub p1: Point,
    pub p2: Point,
    pub depth: usize,
    pub weight: f64,
    /// Index within the repeating decay cycle.
    pub cycle_position: usize,
    /// Per-cycle-position weight multiplier, drawn once at simulation start.
    pub decay: f64,
}

/// Result of a full simulation run.
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    pub creases: Vec<Crease>,
    pub outline: Polygon,
    /// Clipped target point of the last accepted step, if any.
    pub last_target: Option<Point>,
    pub strategy: FoldStrategy,
}

/// Initial choices a strategy preset biases.
struct StrategyParams {
    /// Preferred source->target direction (the crease runs perpendicular).
    axis: Option<f64>,
    /// Disc the target picks gravitate toward.
    cluster: Option<(Point, f64)>,
    /// Snap candidate points to an n-by-n lattice.
    lattice: Option<u32>,
}

fn initial_params(
    strategy: FoldStrategy,
    seq: &mut SeededSequence,
    width: f64,
    height: f64,
) -> StrategyParams {
    let short = width.min(height);
    let mut params = StrategyParams {
        axis: None,
        cluster: None,
        lattice: None,
    };
    match strategy {
        // A vertical crease comes from a horizontal source->target pair and
        // vice versa.
        FoldStrategy::Horizontal => params.axis = Some(FRAC_PI_2),
        FoldStrategy::Vertical => params.axis = Some(0.0),
        FoldStrategy::Diagonal => {
            params.axis = Some(if seq.next() < 0.5 {
                FRAC_PI_4
            } else {
                3.0 * FRAC_PI_4
            })
        }
        FoldStrategy::Radial => {
            params.cluster = Some((Point::new(width / 2.0, height / 2.0), short / 3.0))
        }
        FoldStrategy::Grid => params.lattice = Some(4),
        FoldStrategy::Clustered => {
            let center = Point::new(seq.next() * width, seq.next() * height);
            params.cluster = Some((center, short / 4.0));
        }
        FoldStrategy::Random => {}
    }
    params
}

/// Runs the fold simulation.
///
/// `fold_count` is the number of creases to accept; degenerate steps are
/// retried up to a bounded attempt budget so the loop always terminates.
/// The caller resolves the strategy (its own channel, or a forced preset).
pub fn simulate(
    width: f64,
    height: f64,
    fold_count: u32,
    channel_seed: u64,
    weight_range: (f64, f64),
    strategy: FoldStrategy,
) -> FoldOutcome {
    let mut seq = SeededSequence::new(channel_seed);
    let mut weight_seq = SeededSequence::new(channel_seed + 101);

    // Two fixed-frequency/phase wobble channels drift the visual crease
    // placement over many folds without turning it into noise.
    let short = width.min(height);
    let mut wob1 = SeededSequence::new(channel_seed + 202);
    let freq1 = wob1.next_range(0.05, 0.25);
    let phase1 = wob1.next_range(0.0, TAU);
    let amp1 = short * (0.01 + wob1.next() * 0.03);
    let mut wob2 = SeededSequence::new(channel_seed + 303);
    let freq2 = wob2.next_range(0.01, 0.06);
    let phase2 = wob2.next_range(0.0, TAU);
    let amp2 = short * (0.005 + wob2.next() * 0.02);

    // Per-seed decay cycle: length and per-position multipliers are fixed
    // at simulation start.
    let cycle_len = 8 + (seq.next() * 17.0) as usize;
    let decays: Vec<f64> = (0..cycle_len).map(|_| seq.next_range(0.001, 0.25)).collect();

    let params = initial_params(strategy, &mut seq, width, height);

    let mut polygon = Polygon::sheet(width, height);
    let mut creases: Vec<Crease> = Vec::new();
    let mut last_target: Option<Point> = None;
    let mut salt = mix64(channel_seed ^ 0x9E37_79B9_7F4A_7C15);
    let mut attempts: u32 = 0;
    let max_attempts = fold_count.saturating_mul(4).saturating_add(16);

    while (creases.len() as u32) < fold_count && attempts < max_attempts {
        attempts += 1;
        let reject = |salt: &mut u64, why: &str| {
            trace!("fold attempt {} skipped: {}", attempts, why);
            *salt = mix64(*salt ^ attempts as u64);
        };

        // Source on the boundary, jittered by the mutation hash so rejected
        // attempts stay well distributed.
        let jitter = (salt >> 11) as f64 / (1u64 << 53) as f64;
        let source = polygon.perimeter_point((seq.next() + jitter).fract());

        // Targets: every vertex plus one edge-interpolated point per edge,
        // with the interpolation fraction kept away from the vertices.
        let pts = polygon.points().to_vec();
        let n = pts.len();
        let mut candidates: Vec<Point> = Vec::with_capacity(2 * n);
        for i in 0..n {
            candidates.push(pts[i]);
            let frac = seq.next_range(0.2, 0.8);
            candidates.push(Point::lerp(pts[i], pts[(i + 1) % n], frac));
        }
        if let Some(nlat) = params.lattice {
            let sx = width / nlat as f64;
            let sy = height / nlat as f64;
            for c in &mut candidates {
                c.x = (c.x / sx).round() * sx;
                c.y = (c.y / sy).round() * sy;
            }
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|c| {
                let d = source.dist(*c);
                if d < 1e-9 {
                    return 0.0;
                }
                let mut w = 1.0;
                if let Some(axis) = params.axis {
                    let ang = (c.y - source.y).atan2(c.x - source.x);
                    let align = (ang - axis).cos().abs();
                    w *= 0.25 + 4.0 * align * align;
                }
                if let Some((center, radius)) = params.cluster {
                    w *= 1.0 / (1.0 + c.dist(center) / radius);
                }
                w
            })
            .collect();
        let target = candidates[weighted_index(&mut seq, &weights)];

        let bb = polygon.bbox();
        if source.dist(target) < MIN_FOLD_SPAN_FRACTION * bb.short_side() {
            reject(&mut salt, "span below threshold");
            continue;
        }

        // Crease line: perpendicular bisector of source->target, extended
        // far enough that clipping against the polygon is total.
        let mid = Point::midpoint(source, target);
        let len = source.dist(target);
        let ux = (target.x - source.x) / len;
        let uy = (target.y - source.y) / len;
        let ext = 4.0 * bb.diagonal();
        let la = Point::new(mid.x + uy * ext, mid.y - ux * ext);
        let lb = Point::new(mid.x - uy * ext, mid.y + ux * ext);

        // Visual crease: sinusoidal midpoint drift along the fold normal,
        // then clipped to the canvas.
        let depth = creases.len();
        let wobble = amp1 * (freq1 * depth as f64 + phase1).sin()
            + amp2 * (freq2 * depth as f64 + phase2).sin();
        let visual = clip_segment_to_rect(
            Point::new(la.x + ux * wobble, la.y + uy * wobble),
            Point::new(lb.x + ux * wobble, lb.y + uy * wobble),
            width,
            height,
        );
        let Some((c1, c2)) = visual else {
            reject(&mut salt, "crease outside canvas");
            continue;
        };

        let Some((side_l, side_r)) = polygon.split(la, lb) else {
            reject(&mut salt, "split degenerated");
            continue;
        };
        let s = side_of(la, lb, source);
        if s.abs() < 1e-9 {
            reject(&mut salt, "source on crease");
            continue;
        }
        let (folding, staying) = if s > 0.0 {
            (side_l, side_r)
        } else {
            (side_r, side_l)
        };

        // Convex-hull union of the staying side and the reflected folding
        // side; approximates re-stacking without overlap bookkeeping.
        let mut union_pts: Vec<Point> = staying.points().to_vec();
        union_pts.extend(
            folding
                .points()
                .iter()
                .map(|p| reflect_across(la, lb, *p)),
        );
        let Some(next_polygon) = convex_hull(&union_pts) else {
            reject(&mut salt, "union hull degenerated");
            continue;
        };
        polygon = next_polygon;

        let weight = weight_seq.next_range(weight_range.0, weight_range.1);
        let cycle_position = depth % cycle_len;
        creases.push(Crease {
            p1: c1,
            p2: c2,
            depth,
            weight,
            cycle_position,
            decay: decays[cycle_position],
        });
        last_target = Some(Point::new(
            target.x.clamp(0.0, width),
            target.y.clamp(0.0, height),
        ));

        if creases.len() % RENORM_INTERVAL == 0 {
            polygon.fit_into(width, height, 0.05 * short);
        }

        // Cycle wraparound: every existing crease decays by its own stored
        // multiplier, floored.
        if creases.len() % cycle_len == 0 {
            for c in &mut creases {
                c.weight = (c.weight * c.decay).max(WEIGHT_FLOOR);
            }
        }
    }

    trace!(
        "fold simulation: {} creases from {} attempts",
        creases.len(),
        attempts
    );
    FoldOutcome {
        creases,
        outline: polygon,
        last_target,
        strategy,
    }
}

// src/density.rs

//! Crease-intersection density analysis.
//!
//! Intersections are transient: recomputed in full for every render, never
//! stored between calls. Every unordered crease pair is tested; hits are
//! bucketed into a uniform grid, and adaptive shading thresholds are derived
//! from the resulting weight distribution.

use crate::fold::Crease;
use crate::geometry::{segment_intersection, Point};
use log::debug;

/// One crease-pair hit.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub at: Point,
    pub depth_a: usize,
    pub depth_b: usize,
    /// `|depth_a - depth_b|`: how far apart in fold history the two creases
    /// were created.
    pub gap: usize,
    /// Sum of the two creases' weights.
    pub weight: f64,
}

/// Per-cell accumulated intersection activity.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    pub cols: usize,
    pub rows: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    weights: Vec<f64>,
    max_gaps: Vec<usize>,
    counts: Vec<u32>,
    pub intersections: Vec<Intersection>,
}

impl DensityGrid {
    pub fn weight_at(&self, col: usize, row: usize) -> f64 {
        self.weights[row * self.cols + col]
    }

    pub fn max_gap_at(&self, col: usize, row: usize) -> usize {
        self.max_gaps[row * self.cols + col]
    }

    pub fn count_at(&self, col: usize, row: usize) -> u32 {
        self.counts[row * self.cols + col]
    }

    /// The single cell holding the grid-wide maximum depth gap, if any cell
    /// has a nonzero gap. Row-major order breaks ties toward the first cell.
    pub fn max_gap_cell(&self) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, usize)> = None;
        for row in 0..self.rows {
            for col in 0..self.cols {
                let gap = self.max_gap_at(col, row);
                if gap > 0 && best.map_or(true, |(_, _, bg)| gap > bg) {
                    best = Some((col, row, gap));
                }
            }
        }
        best.map(|(c, r, _)| (c, r))
    }

    /// Non-zero cell weights, unsorted.
    pub fn nonzero_weights(&self) -> Vec<f64> {
        self.weights.iter().copied().filter(|w| *w > 0.0).collect()
    }
}

/// Computes all pairwise crease intersections and buckets them.
pub fn analyze(
    creases: &[Crease],
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
) -> DensityGrid {
    let mut grid = DensityGrid {
        cols,
        rows,
        cell_width,
        cell_height,
        weights: vec![0.0; cols * rows],
        max_gaps: vec![0; cols * rows],
        counts: vec![0; cols * rows],
        intersections: Vec::new(),
    };

    for i in 0..creases.len() {
        for j in (i + 1)..creases.len() {
            let (a, b) = (&creases[i], &creases[j]);
            let Some(at) = segment_intersection(a.p1, a.p2, b.p1, b.p2) else {
                continue;
            };
            let col = ((at.x / cell_width) as usize).min(cols.saturating_sub(1));
            let row = ((at.y / cell_height) as usize).min(rows.saturating_sub(1));
            let idx = row * cols + col;
            let gap = a.depth.abs_diff(b.depth);
            let weight = a.weight + b.weight;
            grid.weights[idx] += weight;
            grid.counts[idx] += 1;
            if gap > grid.max_gaps[idx] {
                grid.max_gaps[idx] = gap;
            }
            grid.intersections.push(Intersection {
                at,
                depth_a: a.depth,
                depth_b: b.depth,
                gap,
                weight,
            });
        }
    }

    debug!(
        "density: {} intersections across {}x{} cells",
        grid.intersections.len(),
        cols,
        rows
    );
    grid
}

/// Adaptive shading thresholds, strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeThresholds {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub t_extreme: f64,
}

/// Minimum separation enforced between consecutive thresholds.
const MIN_STEP: f64 = 0.01;

impl ShadeThresholds {
    /// Fixed defaults for an empty weight distribution.
    pub fn defaults() -> ShadeThresholds {
        ShadeThresholds {
            t1: 1.0,
            t2: 2.0,
            t3: 3.0,
            t_extreme: 999.0,
        }
    }

    /// Percentile-based thresholds over the non-zero cell weights:
    /// t1 = p70, t2 = p94, t3 = t2 + epsilon, t_extreme = p98.5, clamped to
    /// stay strictly increasing.
    pub fn from_weights(weights: &[f64]) -> ShadeThresholds {
        if weights.is_empty() {
            return ShadeThresholds::defaults();
        }
        let mut sorted = weights.to_vec();
        sorted.sort_by(f64::total_cmp);
        let percentile = |p: f64| {
            let idx = ((p / 100.0) * (sorted.len() - 1) as f64 + 0.5).floor() as usize;
            sorted[idx.min(sorted.len() - 1)]
        };
        let t1 = percentile(70.0);
        let t2 = (percentile(94.0)).max(t1 + MIN_STEP);
        let t3 = t2 + MIN_STEP;
        let t_extreme = (percentile(98.5)).max(t3 + MIN_STEP);
        ShadeThresholds { t1, t2, t3, t_extreme }
    }

    /// Universal shading quantization: 0 for empty cells, then buckets by
    /// the adaptive thresholds. Non-decreasing in `weight`.
    pub fn level_of(&self, weight: f64) -> u8 {
        if weight == 0.0 {
            0
        } else if weight <= self.t1 {
            1
        } else if weight <= self.t2 {
            2
        } else {
            3
        }
    }
}

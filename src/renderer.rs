// src/renderer.rs

//! The grid renderer.
//!
//! Translates density buckets, the active palette, and a render mode into
//! abstract drawing commands against a [`Canvas`]. The renderer is
//! backend-agnostic: it never touches pixels directly, only the canvas
//! primitives, so tests can run it against a recording mock. The bundled
//! [`Frame`] canvas is an owned RGBA buffer scoped to one render call.

use crate::color::{hsl_to_rgb, rgb_to_hsl, Rgb};
use crate::density::{DensityGrid, ShadeThresholds};
use crate::fold::Crease;
use crate::glyph::{Glyph, RareFeatures, MAX_LEVEL};
use crate::palette::Palette;
use crate::rng::{weighted_index, SeededSequence};

use anyhow::Result;
use log::{trace, warn};

/// Cells at or above this accumulated weight get the hue-shifted "extreme"
/// treatment.
pub const EXTREME_WEIGHT: f64 = 1.5;

/// How a quantized density level maps onto the shading ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Normal,
    Binary,
    Inverted,
    Sparse,
    Dense,
}

impl RenderMode {
    /// Roll order of the mode table; paired with [`Self::WEIGHTS`]. Frozen
    /// by the parity fixtures.
    pub const ALL: [RenderMode; 5] = [
        RenderMode::Normal,
        RenderMode::Binary,
        RenderMode::Sparse,
        RenderMode::Inverted,
        RenderMode::Dense,
    ];

    pub const WEIGHTS: [f64; 5] = [55.0, 12.0, 10.0, 13.0, 10.0];

    pub fn name(&self) -> &'static str {
        match self {
            RenderMode::Normal => "Normal",
            RenderMode::Binary => "Binary",
            RenderMode::Inverted => "Inverted",
            RenderMode::Sparse => "Sparse",
            RenderMode::Dense => "Dense",
        }
    }

    /// Weighted roll on the render-mode channel.
    pub fn roll(channel_seed: u64) -> RenderMode {
        let mut seq = SeededSequence::new(channel_seed);
        Self::ALL[weighted_index(&mut seq, &Self::WEIGHTS)]
    }

    /// The mode's level mapping for a cell that no priority rule claimed.
    fn map_level(&self, base: u8) -> u8 {
        match self {
            RenderMode::Normal => base,
            RenderMode::Binary => {
                if base > 0 {
                    MAX_LEVEL
                } else {
                    0
                }
            }
            RenderMode::Inverted => MAX_LEVEL - base,
            RenderMode::Sparse => {
                if base == 1 {
                    1
                } else {
                    0
                }
            }
            RenderMode::Dense => {
                if base >= 2 {
                    base
                } else {
                    0
                }
            }
        }
    }
}

/// Order in which cells are visited while painting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawDirection {
    LeftToRight,
    RightToLeft,
    Center,
    Alternate,
    Diagonal,
    RandomMid,
    Checkerboard,
}

impl DrawDirection {
    pub const ALL: [DrawDirection; 7] = [
        DrawDirection::LeftToRight,
        DrawDirection::RightToLeft,
        DrawDirection::Center,
        DrawDirection::Alternate,
        DrawDirection::Diagonal,
        DrawDirection::RandomMid,
        DrawDirection::Checkerboard,
    ];

    pub const WEIGHTS: [f64; 7] = [30.0, 15.0, 15.0, 12.0, 10.0, 10.0, 8.0];

    pub fn name(&self) -> &'static str {
        match self {
            DrawDirection::LeftToRight => "Left to Right",
            DrawDirection::RightToLeft => "Right to Left",
            DrawDirection::Center => "Center",
            DrawDirection::Alternate => "Alternate",
            DrawDirection::Diagonal => "Diagonal",
            DrawDirection::RandomMid => "Random Mid",
            DrawDirection::Checkerboard => "Checkerboard",
        }
    }

    /// Weighted roll on the draw-direction channel.
    pub fn roll(channel_seed: u64) -> DrawDirection {
        let mut seq = SeededSequence::new(channel_seed);
        Self::ALL[weighted_index(&mut seq, &Self::WEIGHTS)]
    }

    /// The full cell visit order. Cells are disjoint, so the order does not
    /// change the final buffer; it is observable in logs and overlays.
    fn cell_order(&self, cols: usize, rows: usize) -> Vec<(usize, usize)> {
        let mut cells: Vec<(usize, usize)> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (c, r)))
            .collect();
        match self {
            DrawDirection::LeftToRight => {}
            DrawDirection::RightToLeft => {
                cells.sort_by_key(|&(c, r)| (r, cols - 1 - c));
            }
            DrawDirection::Center => {
                let (cx, cy) = (cols as i64 - 1, rows as i64 - 1);
                cells.sort_by_key(|&(c, r)| {
                    let dx = 2 * c as i64 - cx;
                    let dy = 2 * r as i64 - cy;
                    (dx * dx + dy * dy, r, c)
                });
            }
            DrawDirection::Alternate => {
                cells.sort_by_key(|&(c, r)| (r, if r % 2 == 0 { c } else { cols - 1 - c }));
            }
            DrawDirection::Diagonal => {
                cells.sort_by_key(|&(c, r)| (c + r, c));
            }
            DrawDirection::RandomMid => {
                let mid = (cols * rows) / 2;
                cells.sort_by_key(|&(c, r)| {
                    let i = r * cols + c;
                    (i.abs_diff(mid), i)
                });
            }
            DrawDirection::Checkerboard => {
                cells.sort_by_key(|&(c, r)| ((c + r) % 2, r, c));
            }
        }
        cells
    }
}

/// A pixel-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Minimal drawing-surface interface the renderer paints through.
///
/// The handle is an external resource scoped to one render call; the
/// renderer never retains it.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) -> Result<()>;
    /// Fill a rectangle with the coverage stipple of a shading level.
    fn stipple_rect(&mut self, rect: PixelRect, color: Rgb, level: u8) -> Result<()>;
    /// 1-px line between two points.
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb) -> Result<()>;
    /// Alpha-blend a rectangle over the existing pixels.
    fn blend_rect(&mut self, rect: PixelRect, color: Rgb, alpha: f64) -> Result<()>;
}

/// An owned RGBA8 pixel buffer implementing [`Canvas`].
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Frame {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = 255;
    }

    fn clamp_rect(&self, rect: PixelRect) -> (u32, u32, u32, u32) {
        let x1 = rect.x.min(self.width);
        let y1 = rect.y.min(self.height);
        let x2 = (rect.x + rect.width).min(self.width);
        let y2 = (rect.y + rect.height).min(self.height);
        (x1, y1, x2, y2)
    }
}

/// Deterministic coverage mask for a shading level at absolute pixel
/// coordinates. Levels echo the block-character ramp.
fn stipple_on(level: u8, x: u32, y: u32) -> bool {
    match level {
        0 => false,
        1 => (x + 2 * y) % 4 == 0,
        2 => (x + y) % 2 == 0,
        _ => (x + 2 * y) % 4 != 0,
    }
}

impl Canvas for Frame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) -> Result<()> {
        let (x1, y1, x2, y2) = self.clamp_rect(rect);
        for y in y1..y2 {
            for x in x1..x2 {
                self.put(x as i64, y as i64, color);
            }
        }
        Ok(())
    }

    fn stipple_rect(&mut self, rect: PixelRect, color: Rgb, level: u8) -> Result<()> {
        let (x1, y1, x2, y2) = self.clamp_rect(rect);
        for y in y1..y2 {
            for x in x1..x2 {
                if stipple_on(level, x, y) {
                    self.put(x as i64, y as i64, color);
                }
            }
        }
        Ok(())
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgb) -> Result<()> {
        // Integer Bresenham over rounded endpoints.
        let (mut x0, mut y0) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
        Ok(())
    }

    fn blend_rect(&mut self, rect: PixelRect, color: Rgb, alpha: f64) -> Result<()> {
        let a = alpha.clamp(0.0, 1.0);
        let (x1, y1, x2, y2) = self.clamp_rect(rect);
        for y in y1..y2 {
            for x in x1..x2 {
                let cur = self.pixel(x, y);
                let mix = |c: u8, n: u8| {
                    (c as f64 * (1.0 - a) + n as f64 * a + 0.5).floor() as u8
                };
                self.put(
                    x as i64,
                    y as i64,
                    Rgb::new(mix(cur.r, color.r), mix(cur.g, color.g), mix(cur.b, color.b)),
                );
            }
        }
        Ok(())
    }
}

/// The extreme-cell treatment: hue rotated 30-180 degrees by how far the
/// weight overshoots the cutoff, with saturation and lightness boosted.
fn extreme_color(base: Rgb, weight: f64) -> Rgb {
    let over = (weight - EXTREME_WEIGHT).max(0.0);
    let rotation = 30.0 + (over * 60.0).min(150.0);
    let (h, s, l) = rgb_to_hsl(base);
    hsl_to_rgb(h + rotation, (s + 0.3).min(1.0), (l + 0.15).min(0.9))
}

/// Paints one density grid through a [`Canvas`].
pub struct GridRenderer<'a> {
    pub grid: &'a DensityGrid,
    pub thresholds: ShadeThresholds,
    pub palette: &'a Palette,
    pub mode: RenderMode,
    pub direction: DrawDirection,
    pub features: RareFeatures,
    /// Cell holding the clipped endpoint of the very last accepted fold.
    pub last_target_cell: Option<(usize, usize)>,
    /// Crease list, only consulted for the rare overlay features.
    pub creases: &'a [Crease],
}

impl<'a> GridRenderer<'a> {
    /// Resolves the glyph for one cell, applying the priority rules:
    /// last-fold target, grid-wide max depth gap, extreme weight, then the
    /// active render mode.
    fn glyph_for(&self, col: usize, row: usize, max_gap_cell: Option<(usize, usize)>) -> Glyph {
        if self.last_target_cell == Some((col, row)) {
            return Glyph::new(MAX_LEVEL, self.palette.accent_rgb());
        }
        if max_gap_cell == Some((col, row)) {
            return Glyph::new(MAX_LEVEL - 1, self.palette.accent_rgb());
        }
        let weight = self.grid.weight_at(col, row);
        if weight >= EXTREME_WEIGHT {
            return Glyph::new(MAX_LEVEL, extreme_color(self.palette.text_rgb(), weight));
        }
        let level = self.mode.map_level(self.thresholds.level_of(weight));
        let color = self
            .palette
            .ramp_rgb(level as usize)
            .unwrap_or_else(|| self.palette.text_rgb());
        Glyph::new(level, color)
    }

    /// Fills one cell by repeating the glyph across slot-sized columns,
    /// stepping the intensity down one level on every other repetition when
    /// the level is at least 2.
    fn paint_cell(
        &self,
        canvas: &mut dyn Canvas,
        col: usize,
        row: usize,
        glyph: Glyph,
    ) -> Result<()> {
        let cw = self.grid.cell_width;
        let ch = self.grid.cell_height;
        let x0 = (col as f64 * cw) as u32;
        let y0 = (row as f64 * ch) as u32;
        let x1 = ((col + 1) as f64 * cw) as u32;
        let y1 = ((row + 1) as f64 * ch) as u32;
        if x1 <= x0 || y1 <= y0 {
            warn!("renderer: cell ({}, {}) has no pixels", col, row);
            return Ok(());
        }

        let cell_px = x1 - x0;
        let slot_px = (ch as u32 / 2).max(2).min(cell_px);
        let reps = (cell_px / slot_px).max(1);
        for i in 0..reps {
            let sx0 = x0 + i * cell_px / reps;
            let sx1 = x0 + (i + 1) * cell_px / reps;
            let level = if glyph.level >= 2 && i % 2 == 1 {
                glyph.level - 1
            } else {
                glyph.level
            };
            canvas.stipple_rect(
                PixelRect {
                    x: sx0,
                    y: y0,
                    width: sx1 - sx0,
                    height: y1 - y0,
                },
                glyph.color,
                level,
            )?;
        }
        Ok(())
    }

    /// Runs the full paint pass.
    pub fn paint(&self, canvas: &mut dyn Canvas) -> Result<()> {
        let bg = self.palette.background_rgb();
        canvas.fill_rect(
            PixelRect {
                x: 0,
                y: 0,
                width: canvas.width(),
                height: canvas.height(),
            },
            bg,
        )?;

        let max_gap_cell = self.grid.max_gap_cell();
        let order = self.direction.cell_order(self.grid.cols, self.grid.rows);
        trace!(
            "renderer: painting {} cells, direction {}",
            order.len(),
            self.direction.name()
        );
        for (col, row) in order {
            let glyph = self.glyph_for(col, row, max_gap_cell);
            if glyph.level == 0 {
                continue;
            }
            self.paint_cell(canvas, col, row, glyph)?;
        }

        if self.features.contains(RareFeatures::ANALYTICS) {
            let text = self.palette.text_rgb();
            for col in 0..=self.grid.cols {
                let x = ((col as f64 * self.grid.cell_width) as u32).min(canvas.width() - 1);
                canvas.blend_rect(
                    PixelRect {
                        x,
                        y: 0,
                        width: 1,
                        height: canvas.height(),
                    },
                    text,
                    0.15,
                )?;
            }
            for row in 0..=self.grid.rows {
                let y = ((row as f64 * self.grid.cell_height) as u32).min(canvas.height() - 1);
                canvas.blend_rect(
                    PixelRect {
                        x: 0,
                        y,
                        width: canvas.width(),
                        height: 1,
                    },
                    text,
                    0.15,
                )?;
            }
        }

        if self.features.contains(RareFeatures::CREASE_LINES) {
            let text = self.palette.text_rgb();
            for crease in self.creases {
                canvas.draw_line(
                    (crease.p1.x, crease.p1.y),
                    (crease.p2.x, crease.p2.y),
                    text,
                )?;
            }
        }

        if self.features.contains(RareFeatures::HIT_COUNTS) {
            let accent = self.palette.accent_rgb();
            for hit in &self.grid.intersections {
                canvas.fill_rect(
                    PixelRect {
                        x: hit.at.x.max(0.0) as u32,
                        y: hit.at.y.max(0.0) as u32,
                        width: 2,
                        height: 2,
                    },
                    accent,
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::density::analyze;
    use crate::fold::Crease;
    use crate::geometry::Point;
    use crate::palette::generate;
    use test_log::test;

    fn crease(p1: (f64, f64), p2: (f64, f64), depth: usize, weight: f64) -> Crease {
        Crease {
            p1: Point::new(p1.0, p1.1),
            p2: Point::new(p2.0, p2.1),
            depth,
            weight,
            cycle_position: 0,
            decay: 0.1,
        }
    }

    /// Recording canvas: captures the op stream instead of pixels.
    #[derive(Default)]
    struct MockCanvas {
        fills: Vec<(PixelRect, Rgb)>,
        stipples: Vec<(PixelRect, Rgb, u8)>,
        lines: usize,
        blends: usize,
    }

    impl Canvas for MockCanvas {
        fn width(&self) -> u32 {
            100
        }
        fn height(&self) -> u32 {
            100
        }
        fn fill_rect(&mut self, rect: PixelRect, color: Rgb) -> Result<()> {
            self.fills.push((rect, color));
            Ok(())
        }
        fn stipple_rect(&mut self, rect: PixelRect, color: Rgb, level: u8) -> Result<()> {
            self.stipples.push((rect, color, level));
            Ok(())
        }
        fn draw_line(&mut self, _: (f64, f64), _: (f64, f64), _: Rgb) -> Result<()> {
            self.lines += 1;
            Ok(())
        }
        fn blend_rect(&mut self, _: PixelRect, _: Rgb, _: f64) -> Result<()> {
            self.blends += 1;
            Ok(())
        }
    }

    fn sample_grid() -> crate::density::DensityGrid {
        let creases = vec![
            crease((0.0, 50.0), (100.0, 50.0), 0, 0.4),
            crease((50.0, 0.0), (50.0, 100.0), 5, 0.3),
            crease((0.0, 0.0), (100.0, 100.0), 1, 0.2),
        ];
        analyze(&creases, 10, 10, 10.0, 10.0)
    }

    #[test]
    fn paint_starts_with_a_full_background_fill() {
        let grid = sample_grid();
        let palette = generate(12345);
        let renderer = GridRenderer {
            grid: &grid,
            thresholds: ShadeThresholds::defaults(),
            palette: &palette,
            mode: RenderMode::Normal,
            direction: DrawDirection::LeftToRight,
            features: RareFeatures::empty(),
            last_target_cell: None,
            creases: &[],
        };
        let mut canvas = MockCanvas::default();
        renderer.paint(&mut canvas).unwrap();
        let (first_rect, first_color) = canvas.fills[0];
        assert_eq!(
            first_rect,
            PixelRect { x: 0, y: 0, width: 100, height: 100 }
        );
        assert_eq!(first_color, palette.background_rgb());
    }

    #[test]
    fn forced_cells_use_the_accent_color() {
        let grid = sample_grid();
        let palette = generate(777);
        let renderer = GridRenderer {
            grid: &grid,
            thresholds: ShadeThresholds::defaults(),
            palette: &palette,
            mode: RenderMode::Normal,
            direction: DrawDirection::LeftToRight,
            features: RareFeatures::empty(),
            last_target_cell: Some((2, 3)),
            creases: &[],
        };
        let mut canvas = MockCanvas::default();
        renderer.paint(&mut canvas).unwrap();
        // The forced cell paints at the top level in accent.
        let accent = palette.accent_rgb();
        let forced: Vec<_> = canvas
            .stipples
            .iter()
            .filter(|(rect, color, level)| {
                rect.x >= 20 && rect.x < 30 && rect.y == 30 && *color == accent && *level >= 2
            })
            .collect();
        assert!(!forced.is_empty());
    }

    #[test]
    fn binary_mode_uses_only_extreme_levels() {
        // Equal depths keep the gap at zero, so no max-gap cell is forced
        // and every painted slot comes from the binary mapping.
        let creases = vec![
            crease((0.0, 50.0), (100.0, 50.0), 2, 0.4),
            crease((50.0, 0.0), (50.0, 100.0), 2, 0.3),
        ];
        let grid = analyze(&creases, 10, 10, 10.0, 10.0);
        let palette = generate(424242);
        let renderer = GridRenderer {
            grid: &grid,
            thresholds: ShadeThresholds::defaults(),
            palette: &palette,
            mode: RenderMode::Binary,
            direction: DrawDirection::Alternate,
            features: RareFeatures::empty(),
            last_target_cell: None,
            creases: &[],
        };
        let mut canvas = MockCanvas::default();
        renderer.paint(&mut canvas).unwrap();
        for (_, _, level) in &canvas.stipples {
            // Level 3 slots interleave down to 2; nothing below that.
            assert!(*level >= 2, "binary mode painted level {}", level);
        }
    }

    #[test]
    fn overlays_fire_only_when_their_flags_are_set() {
        let grid = sample_grid();
        let palette = generate(9);
        let creases = vec![crease((0.0, 0.0), (100.0, 100.0), 0, 1.0)];
        let mut renderer = GridRenderer {
            grid: &grid,
            thresholds: ShadeThresholds::defaults(),
            palette: &palette,
            mode: RenderMode::Normal,
            direction: DrawDirection::Center,
            features: RareFeatures::empty(),
            last_target_cell: None,
            creases: &creases,
        };
        let mut canvas = MockCanvas::default();
        renderer.paint(&mut canvas).unwrap();
        assert_eq!(canvas.lines, 0);
        assert_eq!(canvas.blends, 0);

        renderer.features = RareFeatures::CREASE_LINES | RareFeatures::ANALYTICS;
        let mut canvas = MockCanvas::default();
        renderer.paint(&mut canvas).unwrap();
        assert_eq!(canvas.lines, 1);
        assert!(canvas.blends > 0);
    }

    #[test]
    fn frame_pixels_are_deterministic() {
        let grid = sample_grid();
        let palette = generate(31337);
        let renderer = GridRenderer {
            grid: &grid,
            thresholds: ShadeThresholds::from_weights(&grid.nonzero_weights()),
            palette: &palette,
            mode: RenderMode::Normal,
            direction: DrawDirection::Diagonal,
            features: RareFeatures::empty(),
            last_target_cell: Some((5, 5)),
            creases: &[],
        };
        let mut a = Frame::new(100, 100);
        let mut b = Frame::new(100, 100);
        renderer.paint(&mut a).unwrap();
        renderer.paint(&mut b).unwrap();
        assert_eq!(a.data(), b.data());
        // And the background really landed.
        assert_eq!(a.pixel(0, 0), palette.background_rgb());
    }

    #[test]
    fn cell_orders_are_permutations() {
        for dir in DrawDirection::ALL {
            let order = dir.cell_order(7, 5);
            assert_eq!(order.len(), 35);
            let unique: std::collections::HashSet<_> = order.iter().collect();
            assert_eq!(unique.len(), 35, "{} repeated cells", dir.name());
        }
    }

    #[test]
    fn extreme_color_shifts_hue_and_keeps_range() {
        let base = Rgb::new(200, 40, 40);
        let shifted = extreme_color(base, 2.0);
        assert_ne!(shifted, base);
        let (_, s, l) = rgb_to_hsl(shifted);
        assert!(s >= 0.29);
        assert!(l <= 0.91);
    }
}

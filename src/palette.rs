// src/palette.rs

//! Palette selection: one channel of seeded draws against the color catalog.
//!
//! A rare "glitch" roll short-circuits into one of five fixed branches;
//! otherwise a mother color is transformed into a background/text/accent
//! trio through a named transformation strategy. The branch taken is carried
//! on the palette as a [`Strategy`] tag so the trait classifier can label it
//! without re-deriving anything.
//!
//! All candidate sorts use integer-valued keys (luminance percentages,
//! chroma, catalog index) so the selection is reproducible bit-for-bit by
//! the parallel on-chain implementation.

use crate::color::{
    catalog, contrast_ratio, ColorCatalog, ColorFamily, LuminanceTier, Rgb, SaturationTier,
    Temperature,
};
use crate::rng::{pick_biased, pick_uniform, weighted_index, Bias, SeededSequence};
use log::trace;

/// Probability of entering the glitch branch.
pub const GLITCH_PROBABILITY: f64 = 0.03;
/// Probability of computing a dedicated accent color (ordinary branch).
pub const ACCENT_PROBABILITY: f64 = 0.20;
/// Probability of enabling the 4-color level ramp (ordinary branch).
pub const RAMP_PROBABILITY: f64 = 0.25;
/// Minimum background/text contrast outside the fallback path.
pub const TEXT_CONTRAST_FLOOR: f64 = 4.5;
/// Minimum background/accent contrast for the confusable-pool rule.
pub const ACCENT_CONTRAST_FLOOR: f64 = 3.0;
/// Contrast floor for the accent luminance-midpoint fallback.
pub const MIDPOINT_CONTRAST_FLOOR: f64 = 2.5;

/// Primary transformation applied to the mother color to derive text
/// candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    ValueShift,
    TemperatureFlip,
    SaturationShift,
    Complement,
    CubeNeighbor,
}

impl Transform {
    pub fn label(&self) -> &'static str {
        match self {
            Transform::ValueShift => "value-shift",
            Transform::TemperatureFlip => "temperature-flip",
            Transform::SaturationShift => "saturation-shift",
            Transform::Complement => "complement",
            Transform::CubeNeighbor => "cube-neighbor",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Transform::ValueShift => "Value Shift",
            Transform::TemperatureFlip => "Temperature Flip",
            Transform::SaturationShift => "Saturation Shift",
            Transform::Complement => "Complement",
            Transform::CubeNeighbor => "Cube Neighbor",
        }
    }
}

/// Which branch produced a palette. The five glitch branches carry fixed
/// labels; the ordinary branch is labeled from its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Washed,
    Acid,
    Void,
    Bleach,
    Corrupt,
    Ordinary {
        ground: LuminanceTier,
        transform: Transform,
        accent: bool,
    },
}

impl Strategy {
    /// Internal label; `monochrome/`-prefixed strategies are the monochrome
    /// family.
    pub fn internal_label(&self) -> String {
        match self {
            Strategy::Washed => "monochrome/washed".to_string(),
            Strategy::Acid => "glitch/acid".to_string(),
            Strategy::Void => "monochrome/void".to_string(),
            Strategy::Bleach => "monochrome/bleach".to_string(),
            Strategy::Corrupt => "glitch/corrupt".to_string(),
            Strategy::Ordinary {
                ground,
                transform,
                accent,
            } => format!(
                "{}/{}{}",
                ground.label(),
                transform.label(),
                if *accent { "+accent" } else { "" }
            ),
        }
    }

    /// Human-readable trait name exposed in NFT metadata.
    pub fn display_name(&self) -> String {
        match self {
            Strategy::Washed | Strategy::Void | Strategy::Bleach => "Monochrome".to_string(),
            Strategy::Acid => "Acid".to_string(),
            Strategy::Corrupt => "Corrupt".to_string(),
            Strategy::Ordinary {
                ground, transform, ..
            } => {
                let g = match ground {
                    LuminanceTier::Light => "Light",
                    LuminanceTier::Dark => "Dark",
                    LuminanceTier::Mid => "Mid",
                };
                format!("{} {}", g, transform.display())
            }
        }
    }

    pub fn is_monochrome(&self) -> bool {
        self.internal_label().starts_with("monochrome/")
    }
}

/// A generated palette: catalog indices plus the strategy tag.
#[derive(Debug, Clone)]
pub struct Palette {
    pub background: usize,
    pub text: usize,
    pub accent: usize,
    /// Level-indexed 4-color ramp, when multi-color rendering is enabled.
    pub ramp: Option<[usize; 4]>,
    pub strategy: Strategy,
}

impl Palette {
    pub fn background_rgb(&self) -> Rgb {
        catalog().entry(self.background).rgb
    }

    pub fn text_rgb(&self) -> Rgb {
        catalog().entry(self.text).rgb
    }

    pub fn accent_rgb(&self) -> Rgb {
        catalog().entry(self.accent).rgb
    }

    pub fn ramp_rgb(&self, level: usize) -> Option<Rgb> {
        self.ramp.map(|r| catalog().entry(r[level.min(3)]).rgb)
    }

    /// Number of distinct colors the palette contributes to a render.
    pub fn color_count(&self) -> u8 {
        if self.ramp.is_some() {
            4
        } else if self.accent != self.text && self.accent != self.background {
            3
        } else {
            2
        }
    }
}

fn chebyshev(a: [u8; 3], b: [u8; 3]) -> u8 {
    let d0 = a[0].abs_diff(b[0]);
    let d1 = a[1].abs_diff(b[1]);
    let d2 = a[2].abs_diff(b[2]);
    d0.max(d1).max(d2)
}

/// Draws three distinct indices out of a pool: bounded re-draws, then a
/// deterministic linear fallback.
fn pick_distinct(seq: &mut SeededSequence, pool: &[usize], exclude: &[usize]) -> usize {
    for _ in 0..8 {
        let c = *pick_uniform(seq, pool);
        if !exclude.contains(&c) {
            return c;
        }
    }
    *pool
        .iter()
        .find(|i| !exclude.contains(i))
        .expect("pool larger than exclusion set")
}

/// Candidate text indices for a transform, already sorted by the transform's
/// own rule. Pool may be empty; the caller owns the fallback chain.
fn transform_candidates(
    cat: &ColorCatalog,
    transform: Transform,
    mother: usize,
    background: usize,
) -> Vec<usize> {
    let m = cat.entry(mother);
    match transform {
        Transform::ValueShift => {
            // Aim roughly 40 luminance points away from the mother, in the
            // direction that moves off the background.
            let bg = cat.entry(background);
            let target = if bg.luminance_pct >= 50.0 {
                (m.luminance_pct - 40.0).clamp(0.0, 100.0)
            } else {
                (m.luminance_pct + 40.0).clamp(0.0, 100.0)
            };
            let mut c = cat.indices_where(|e| e.saturation != SaturationTier::Gray);
            c.sort_by_key(|&i| {
                let e = cat.entry(i);
                (
                    u8::from(e.temperature != m.temperature),
                    (e.luminance_pct - target).abs() as i64,
                    i,
                )
            });
            c
        }
        Transform::TemperatureFlip => {
            let opp = m.temperature.opposite();
            let mut c = cat.indices_where(|e| e.temperature == opp);
            c.sort_by_key(|&i| ((cat.entry(i).luminance_pct - m.luminance_pct).abs() as i64, i));
            c
        }
        Transform::SaturationShift => {
            let target = if m.saturation == SaturationTier::Vivid {
                SaturationTier::Muted
            } else {
                SaturationTier::Vivid
            };
            let mut c =
                cat.indices_where(|e| e.temperature == m.temperature && e.saturation == target);
            c.sort_by_key(|&i| ((cat.entry(i).luminance_pct - m.luminance_pct).abs() as i64, i));
            c
        }
        Transform::Complement => {
            let mc = m.cube.expect("mother is always a cube entry");
            let comp = [5 - mc[0], 5 - mc[1], 5 - mc[2]];
            let mut c = cat.indices_where(|e| match e.cube {
                Some(cc) => chebyshev(cc, comp) <= 1,
                None => false,
            });
            c.sort_by_key(|&i| ((cat.entry(i).luminance_pct - m.luminance_pct).abs() as i64, i));
            c
        }
        Transform::CubeNeighbor => {
            let mc = m.cube.expect("mother is always a cube entry");
            let mut c = cat.indices_where(|e| match e.cube {
                Some(cc) => cc != mc && chebyshev(cc, mc) <= 1,
                None => false,
            });
            c.sort_by_key(|&i| ((cat.entry(i).luminance_pct - m.luminance_pct).abs() as i64, i));
            c
        }
    }
}

/// Filters candidates against the contrast floor and, if any survive, draws
/// one biased toward the front of the sorted pool.
fn choose_contrasting(
    seq: &mut SeededSequence,
    cat: &ColorCatalog,
    cands: &[usize],
    background: usize,
) -> Option<usize> {
    let bg = cat.entry(background).rgb;
    let filtered: Vec<usize> = cands
        .iter()
        .copied()
        .filter(|&i| i != background && contrast_ratio(cat.entry(i).rgb, bg) >= TEXT_CONTRAST_FLOOR)
        .collect();
    if filtered.is_empty() {
        return None;
    }
    let window = &filtered[..filtered.len().min(6)];
    Some(*pick_biased(seq, window, Bias::Start))
}

fn washed(seq: &mut SeededSequence, cat: &ColorCatalog) -> Palette {
    let center = seq.next_range(35.0, 65.0);
    let mut band = cat.indices_where(|e| {
        (e.luminance_pct - center).abs() <= 8.0
            && matches!(e.saturation, SaturationTier::Gray | SaturationTier::Muted)
    });
    band.sort_by_key(|&i| (cat.entry(i).luminance_pct as i64, i));
    let mut background = *pick_biased(seq, &band, Bias::Start);
    let mut text = *pick_biased(seq, &band, Bias::End);
    if text == background {
        background = band[0];
        text = band[band.len() - 1];
    }
    Palette {
        background,
        text,
        accent: text,
        ramp: None,
        strategy: Strategy::Washed,
    }
}

fn acid(seq: &mut SeededSequence, cat: &ColorCatalog) -> Palette {
    let warm = cat.indices_where(|e| {
        e.temperature == Temperature::Warm && e.saturation == SaturationTier::Vivid
    });
    let cool = cat.indices_where(|e| {
        e.temperature == Temperature::Cool && e.saturation == SaturationTier::Vivid
    });
    let darks = cat.indices_where(|e| e.luminance_pct <= 12.0);
    let text = *pick_uniform(seq, &warm);
    let accent = *pick_uniform(seq, &cool);
    let background = *pick_uniform(seq, &darks);
    Palette {
        background,
        text,
        accent,
        ramp: None,
        strategy: Strategy::Acid,
    }
}

fn void(seq: &mut SeededSequence, cat: &ColorCatalog) -> Palette {
    let mut pool = cat.indices_where(|e| e.luminance_pct <= 8.0);
    pool.sort_by_key(|&i| (cat.entry(i).luminance_pct as i64, i));
    let mut background = *pick_biased(seq, &pool, Bias::Start);
    let mut text = *pick_biased(seq, &pool, Bias::End);
    if text == background {
        background = pool[0];
        text = pool[pool.len() - 1];
    }
    Palette {
        background,
        text,
        accent: text,
        ramp: None,
        strategy: Strategy::Void,
    }
}

fn bleach(seq: &mut SeededSequence, cat: &ColorCatalog) -> Palette {
    let mut pool = cat.indices_where(|e| e.luminance_pct >= 92.0);
    pool.sort_by_key(|&i| (cat.entry(i).luminance_pct as i64, i));
    let mut background = *pick_biased(seq, &pool, Bias::End);
    let mut text = *pick_biased(seq, &pool, Bias::Start);
    if text == background {
        background = pool[pool.len() - 1];
        text = pool[0];
    }
    Palette {
        background,
        text,
        accent: text,
        ramp: None,
        strategy: Strategy::Bleach,
    }
}

fn corrupt(seq: &mut SeededSequence, cat: &ColorCatalog) -> Palette {
    let presets = cat.indices_where(|e| e.family == ColorFamily::Preset);
    let background = *pick_uniform(seq, &presets);
    let text = pick_distinct(seq, &presets, &[background]);
    let accent = pick_distinct(seq, &presets, &[background, text]);
    Palette {
        background,
        text,
        accent,
        ramp: None,
        strategy: Strategy::Corrupt,
    }
}

/// Catalog entry closest in luminance to the background/text midpoint,
/// restricted to chromatic entries. Integer distance key keeps ties stable.
fn midpoint_entry(cat: &ColorCatalog, background: usize, text: usize) -> usize {
    let sum = cat.entry(background).luminance_pct + cat.entry(text).luminance_pct;
    let mut best: Option<(i64, usize)> = None;
    for (i, e) in cat.entries().iter().enumerate() {
        if i == background || i == text || e.saturation == SaturationTier::Gray {
            continue;
        }
        let key = (e.luminance_pct * 2.0 - sum).abs() as i64;
        if best.map_or(true, |(bk, _)| key < bk) {
            best = Some((key, i));
        }
    }
    best.expect("catalog always has chromatic entries").1
}

/// Generates a palette from one channel seed. Pure and total: every
/// filter has a documented fallback and the catalog is never empty.
pub fn generate(channel_seed: u64) -> Palette {
    let cat = catalog();
    let mut seq = SeededSequence::new(channel_seed);

    let glitch_roll = seq.next();
    if glitch_roll < GLITCH_PROBABILITY {
        let branch = ((seq.next() * 5.0) as usize).min(4);
        trace!("palette: glitch branch {}", branch);
        return match branch {
            0 => washed(&mut seq, cat),
            1 => acid(&mut seq, cat),
            2 => void(&mut seq, cat),
            3 => bleach(&mut seq, cat),
            _ => corrupt(&mut seq, cat),
        };
    }

    let chromatic_cube = cat.indices_where(|e| {
        e.family == ColorFamily::Cube && e.saturation != SaturationTier::Gray
    });
    let mother = *pick_uniform(&mut seq, &chromatic_cube);
    let m_temp = cat.entry(mother).temperature;

    let ground = [LuminanceTier::Light, LuminanceTier::Dark, LuminanceTier::Mid]
        [weighted_index(&mut seq, &[40.0, 40.0, 20.0])];
    let transform = [
        Transform::ValueShift,
        Transform::TemperatureFlip,
        Transform::SaturationShift,
        Transform::Complement,
        Transform::CubeNeighbor,
    ][weighted_index(&mut seq, &[30.0, 20.0, 15.0, 15.0, 20.0])];

    let mut bg_pool = cat.indices_where(|e| {
        e.tier() == ground && (e.temperature == m_temp || e.temperature == Temperature::Neutral)
    });
    if bg_pool.is_empty() {
        bg_pool = cat.indices_where(|e| e.tier() == ground);
    }
    let background = *pick_uniform(&mut seq, &bg_pool);

    // Text: transform candidates, then the documented fallback chain.
    let cands = transform_candidates(cat, transform, mother, background);
    let mut text = choose_contrasting(&mut seq, cat, &cands, background);
    if text.is_none() && transform != Transform::ValueShift {
        let retry = transform_candidates(cat, Transform::ValueShift, mother, background);
        text = choose_contrasting(&mut seq, cat, &retry, background);
    }
    let text = text.unwrap_or_else(|| {
        // Last resort: the whole catalog ordered by contrast against the
        // background. May dip below the 4.5 floor, but never returns the
        // background itself.
        let bg = cat.entry(background).rgb;
        let mut all: Vec<usize> = (0..cat.len()).filter(|&i| i != background).collect();
        all.sort_by_key(|&i| {
            (
                -((contrast_ratio(cat.entry(i).rgb, bg) * 1000.0).floor() as i64),
                i,
            )
        });
        all[0]
    });

    // Accent: confusable-pool rule with a midpoint fallback.
    let accent_roll = seq.next();
    let has_accent = accent_roll < ACCENT_PROBABILITY;
    let accent = if has_accent {
        let bg = cat.entry(background);
        let tx = cat.entry(text);
        let mut pool: Vec<usize> = Vec::new();
        for (i, e) in cat.entries().iter().enumerate() {
            if i == background || i == text {
                continue;
            }
            let confusable_bg = (e.luminance_pct - bg.luminance_pct).abs() <= 12.0
                && (e.temperature != bg.temperature || e.saturation != bg.saturation);
            let confusable_tx = (e.luminance_pct - tx.luminance_pct).abs() <= 12.0
                && (e.temperature != tx.temperature || e.saturation != tx.saturation);
            if (confusable_bg || confusable_tx)
                && contrast_ratio(e.rgb, bg.rgb) >= ACCENT_CONTRAST_FLOOR
            {
                pool.push(i);
            }
        }
        pool.sort_by_key(|&i| {
            let e = cat.entry(i);
            (
                u8::from(e.saturation != SaturationTier::Vivid),
                -(e.rgb.chroma() as i64),
                i,
            )
        });
        if let Some(&best) = pool.first() {
            best
        } else {
            let sum = bg.luminance_pct + tx.luminance_pct;
            let mut best: Option<(i64, usize)> = None;
            for (i, e) in cat.entries().iter().enumerate() {
                if i == background {
                    continue;
                }
                if contrast_ratio(e.rgb, bg.rgb) < MIDPOINT_CONTRAST_FLOOR {
                    continue;
                }
                let key = (e.luminance_pct * 2.0 - sum).abs() as i64;
                if best.map_or(true, |(bk, _)| key < bk) {
                    best = Some((key, i));
                }
            }
            best.map(|(_, i)| i).unwrap_or(text)
        }
    } else {
        text
    };

    let ramp_roll = seq.next();
    let ramp = if ramp_roll < RAMP_PROBABILITY {
        let mid = midpoint_entry(cat, background, text);
        Some([background, mid, text, accent])
    } else {
        None
    };

    Palette {
        background,
        text,
        accent,
        ramp,
        strategy: Strategy::Ordinary {
            ground,
            transform,
            accent: has_accent,
        },
    }
}

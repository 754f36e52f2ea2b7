// src/color.rs

//! The process-wide color catalog and color math helpers.
//!
//! The catalog is the classic 256-entry terminal palette: 16 high-contrast
//! presets, a 6-level-per-channel color cube (component `c` maps to `0` or
//! `c * 40 + 55`), and a 24-step grayscale ramp (`g * 10 + 8`). Every entry
//! is annotated up front with the luminance, temperature, and saturation
//! classifications the palette generator filters on.
//!
//! Built once at first use into an immutable singleton; safe for unlimited
//! concurrent readers.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A concrete sRGB color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear luma in `[0, 1]`. Deliberately gamma-free so that every
    /// derived quantity is reproducible bit-for-bit from integer inputs.
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }

    /// Chroma as the max/min channel spread, `0..=255`.
    pub fn chroma(&self) -> u8 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        max - min
    }
}

/// Contrast ratio between two colors, always >= 1.
pub fn contrast_ratio(a: Rgb, b: Rgb) -> f64 {
    let (ya, yb) = (a.luminance(), b.luminance());
    let (hi, lo) = if ya >= yb { (ya, yb) } else { (yb, ya) };
    (hi + 0.05) / (lo + 0.05)
}

/// Warm/cool/neutral classification by red/blue dominance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperature {
    Warm,
    Cool,
    Neutral,
}

impl Temperature {
    /// The flip target used by the temperature-flip palette transform.
    /// Neutral colors flip warm.
    pub fn opposite(&self) -> Temperature {
        match self {
            Temperature::Warm => Temperature::Cool,
            Temperature::Cool => Temperature::Warm,
            Temperature::Neutral => Temperature::Warm,
        }
    }

    fn classify(rgb: Rgb) -> Temperature {
        let spread = rgb.r as i16 - rgb.b as i16;
        if spread > 24 {
            Temperature::Warm
        } else if spread < -24 {
            Temperature::Cool
        } else {
            Temperature::Neutral
        }
    }
}

/// Four-tier saturation classification from channel chroma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaturationTier {
    Gray,
    Muted,
    Moderate,
    Vivid,
}

impl SaturationTier {
    fn classify(rgb: Rgb) -> SaturationTier {
        match rgb.chroma() {
            0 => SaturationTier::Gray,
            1..=59 => SaturationTier::Muted,
            60..=159 => SaturationTier::Moderate,
            _ => SaturationTier::Vivid,
        }
    }
}

/// Which of the three catalog source families an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorFamily {
    Preset,
    Cube,
    Grayscale,
}

/// Luminance ground tier used when choosing a palette background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LuminanceTier {
    Light,
    Dark,
    Mid,
}

impl LuminanceTier {
    /// Tier of a luminance percentage: light >= 55, dark <= 20, else mid.
    pub fn of(pct: f64) -> LuminanceTier {
        if pct >= 55.0 {
            LuminanceTier::Light
        } else if pct <= 20.0 {
            LuminanceTier::Dark
        } else {
            LuminanceTier::Mid
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LuminanceTier::Light => "light",
            LuminanceTier::Dark => "dark",
            LuminanceTier::Mid => "mid",
        }
    }
}

/// One immutable catalog entry.
#[derive(Debug, Clone)]
pub struct ColorEntry {
    pub rgb: Rgb,
    pub hex: String,
    /// Cube coordinate, `0..=5` per axis; only for cube-family entries.
    pub cube: Option<[u8; 3]>,
    /// Integer-valued luminance percentage, `floor(luma * 100 + 0.5)`.
    pub luminance_pct: f64,
    pub temperature: Temperature,
    pub saturation: SaturationTier,
    pub family: ColorFamily,
}

impl ColorEntry {
    fn new(rgb: Rgb, cube: Option<[u8; 3]>, family: ColorFamily) -> Self {
        ColorEntry {
            hex: rgb.hex(),
            cube,
            luminance_pct: (rgb.luminance() * 100.0 + 0.5).floor(),
            temperature: Temperature::classify(rgb),
            saturation: SaturationTier::classify(rgb),
            family,
            rgb,
        }
    }

    pub fn tier(&self) -> LuminanceTier {
        LuminanceTier::of(self.luminance_pct)
    }
}

/// The common sRGB values for the 16 preset slots, as shipped by many
/// terminal emulators.
const PRESET_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

const CUBE_SIZE: u8 = 6;
const GRAYSCALE_LEVELS: u8 = 24;

/// The static, read-only color table.
#[derive(Debug)]
pub struct ColorCatalog {
    entries: Vec<ColorEntry>,
}

impl ColorCatalog {
    fn build() -> Self {
        let mut entries = Vec::with_capacity(256);

        for &(r, g, b) in &PRESET_RGB {
            entries.push(ColorEntry::new(Rgb::new(r, g, b), None, ColorFamily::Preset));
        }

        for idx in 0..(CUBE_SIZE as u16).pow(3) {
            let r_comp = ((idx / 36) % 6) as u8;
            let g_comp = ((idx / 6) % 6) as u8;
            let b_comp = (idx % 6) as u8;
            let level = |c: u8| if c == 0 { 0 } else { c * 40 + 55 };
            entries.push(ColorEntry::new(
                Rgb::new(level(r_comp), level(g_comp), level(b_comp)),
                Some([r_comp, g_comp, b_comp]),
                ColorFamily::Cube,
            ));
        }

        for g in 0..GRAYSCALE_LEVELS {
            let level = g * 10 + 8;
            entries.push(ColorEntry::new(
                Rgb::new(level, level, level),
                None,
                ColorFamily::Grayscale,
            ));
        }

        ColorCatalog { entries }
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn entry(&self, idx: usize) -> &ColorEntry {
        &self.entries[idx]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of entries matching a predicate, in catalog order.
    pub fn indices_where<F: Fn(&ColorEntry) -> bool>(&self, pred: F) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| pred(e))
            .map(|(i, _)| i)
            .collect()
    }
}

static CATALOG: Lazy<ColorCatalog> = Lazy::new(ColorCatalog::build);

/// The process-wide catalog singleton.
pub fn catalog() -> &'static ColorCatalog {
    &CATALOG
}

/// RGB -> HSL: hue in degrees `[0, 360)`, saturation/lightness in `[0, 1]`.
pub fn rgb_to_hsl(rgb: Rgb) -> (f64, f64, f64) {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        ((g - b) / d).rem_euclid(6.0)
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s, l)
}

/// HSL -> RGB; hue in degrees, saturation/lightness clamped to `[0, 1]`.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0 + 0.5).floor().clamp(0.0, 255.0) as u8;
    Rgb::new(to_byte(r1), to_byte(g1), to_byte(b1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn catalog_has_all_three_families() {
        let cat = catalog();
        assert_eq!(cat.len(), 256);
        assert_eq!(
            cat.indices_where(|e| e.family == ColorFamily::Preset).len(),
            16
        );
        assert_eq!(
            cat.indices_where(|e| e.family == ColorFamily::Cube).len(),
            216
        );
        assert_eq!(
            cat.indices_where(|e| e.family == ColorFamily::Grayscale).len(),
            24
        );
    }

    #[test]
    fn cube_entries_follow_terminal_formula() {
        let cat = catalog();
        // Cube index 16 is (0,0,0); index 16 + 215 is (5,5,5) = white.
        assert_eq!(cat.entry(16).rgb, Rgb::new(0, 0, 0));
        assert_eq!(cat.entry(16 + 215).rgb, Rgb::new(255, 255, 255));
        // Component 1 maps to 95.
        let e = cat.entry(16 + 36 + 6 + 1); // coord (1,1,1)
        assert_eq!(e.cube, Some([1, 1, 1]));
        assert_eq!(e.rgb, Rgb::new(95, 95, 95));
    }

    #[test]
    fn grayscale_ramp_is_monotone_in_luminance() {
        let cat = catalog();
        let grays = cat.indices_where(|e| e.family == ColorFamily::Grayscale);
        for pair in grays.windows(2) {
            let (a, b) = (cat.entry(pair[0]), cat.entry(pair[1]));
            assert!(a.luminance_pct < b.luminance_pct);
            assert_eq!(a.saturation, SaturationTier::Gray);
        }
        assert_eq!(cat.entry(grays[0]).rgb, Rgb::new(8, 8, 8));
        assert_eq!(cat.entry(grays[23]).rgb, Rgb::new(238, 238, 238));
    }

    #[test]
    fn temperature_classifies_red_and_blue_extremes() {
        assert_eq!(
            Temperature::classify(Rgb::new(255, 0, 0)),
            Temperature::Warm
        );
        assert_eq!(
            Temperature::classify(Rgb::new(0, 0, 238)),
            Temperature::Cool
        );
        assert_eq!(
            Temperature::classify(Rgb::new(127, 127, 127)),
            Temperature::Neutral
        );
    }

    #[test]
    fn contrast_ratio_spans_the_expected_range() {
        let black = Rgb::new(0, 0, 0);
        let white = Rgb::new(255, 255, 255);
        let c = contrast_ratio(black, white);
        assert!((c - 21.0).abs() < 1e-9);
        assert!((contrast_ratio(black, black) - 1.0).abs() < 1e-12);
        // Symmetric.
        assert_eq!(contrast_ratio(black, white), contrast_ratio(white, black));
    }

    #[test]
    fn hsl_round_trips_primary_colors() {
        for rgb in [
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
            Rgb::new(128, 64, 200),
        ] {
            let (h, s, l) = rgb_to_hsl(rgb);
            let back = hsl_to_rgb(h, s, l);
            assert!((back.r as i16 - rgb.r as i16).abs() <= 1);
            assert!((back.g as i16 - rgb.g as i16).abs() <= 1);
            assert!((back.b as i16 - rgb.b as i16).abs() <= 1);
        }
    }

    #[test]
    fn luminance_percentages_are_integer_valued() {
        for e in catalog().entries() {
            assert_eq!(e.luminance_pct, e.luminance_pct.floor());
            assert!((0.0..=100.0).contains(&e.luminance_pct));
        }
    }
}

// src/config.rs

//! Configuration structures for the paperfold engine.
//!
//! These structs can be deserialized from a configuration file (TOML, JSON,
//! YAML) to customize the render grid and fold behavior. Default values are
//! provided for every option; the library entry points take a `&Config` so
//! tests can override, while the CLI uses the process-wide default.
//!
//! Nothing here may change trait semantics: classification constants live
//! with the classifier because they are part of the cross-implementation
//! parity contract.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Render-grid settings.
    pub render: RenderConfig,
    /// Fold-simulation settings.
    pub fold: FoldConfig,
    /// CLI output settings.
    pub output: OutputConfig,
}

/// Render-grid geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Nominal character-cell width in pixels. The actual cell width is the
    /// canvas width divided by the derived column count, so cells always
    /// tile the canvas exactly.
    pub cell_width: u32,
    /// Nominal character-cell height in pixels.
    pub cell_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            cell_width: 16,
            cell_height: 16,
        }
    }
}

/// Fold-simulation knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldConfig {
    /// Lower bound of the per-crease weight draw.
    pub weight_min: f64,
    /// Upper bound of the per-crease weight draw.
    pub weight_max: f64,
}

impl Default for FoldConfig {
    fn default() -> Self {
        FoldConfig {
            weight_min: 0.35,
            weight_max: 1.25,
        }
    }
}

/// Where the CLI writes its image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output image path (PPM).
    pub image_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            image_path: PathBuf::from("paperfold.ppm"),
        }
    }
}

/// Process-wide default configuration.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::default);

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert!(cfg.render.cell_width > 0);
        assert!(cfg.render.cell_height > 0);
        assert!(cfg.fold.weight_min < cfg.fold.weight_max);
        assert!(cfg.fold.weight_min > 0.0);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"render": {"cell_width": 8}}"#).unwrap();
        assert_eq!(cfg.render.cell_width, 8);
        assert_eq!(cfg.render.cell_height, RenderConfig::default().cell_height);
        assert_eq!(cfg.fold.weight_max, FoldConfig::default().weight_max);
    }
}

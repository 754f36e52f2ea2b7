// src/main.rs

use paperfold::{classify, config::CONFIG, render, Frame, Seed};

use anyhow::{bail, Context, Result};
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DEFAULT_FOLD_COUNT: u32 = 120;
const DEFAULT_WIDTH: u32 = 960;
const DEFAULT_HEIGHT: u32 = 960;

/// Writes a frame to a PPM file (binary P6, no dependencies needed).
fn write_ppm<P: AsRef<Path>>(path: P, frame: &Frame) -> Result<()> {
    let mut file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.as_ref().display()))?;
    writeln!(file, "P6")?;
    writeln!(file, "{} {}", frame.width(), frame.height())?;
    writeln!(file, "255")?;
    for px in frame.data().chunks_exact(4) {
        file.write_all(&px[..3])?;
    }
    Ok(())
}

/// Entry point: render one seed and print its traits.
///
/// Usage: `paperfold <seed-hex> [fold-count] [width] [height] [out.ppm]`
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(seed_hex) = args.first() else {
        bail!("usage: paperfold <seed-hex> [fold-count] [width] [height] [out.ppm]");
    };
    let seed = Seed::from_hex(seed_hex).context("invalid seed")?;
    let fold_count = match args.get(1) {
        Some(s) => s.parse::<u32>().context("invalid fold count")?,
        None => DEFAULT_FOLD_COUNT,
    };
    let width = match args.get(2) {
        Some(s) => s.parse::<u32>().context("invalid width")?,
        None => DEFAULT_WIDTH,
    };
    let height = match args.get(3) {
        Some(s) => s.parse::<u32>().context("invalid height")?,
        None => DEFAULT_HEIGHT,
    };
    let out_path = args
        .get(4)
        .map(Path::new)
        .unwrap_or_else(|| CONFIG.output.image_path.as_path());

    info!(
        "rendering {} at {}x{} with {} folds",
        seed.to_hex(),
        width,
        height,
        fold_count
    );
    let frame = render(&seed, fold_count, width, height).context("render failed")?;
    write_ppm(out_path, &frame)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    info!("wrote {}", out_path.display());

    let traits = classify(&seed);
    println!("{}", serde_json::to_string_pretty(&traits)?);
    Ok(())
}

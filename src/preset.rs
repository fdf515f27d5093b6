// Presets (.cgp) are plain text: the first line holds the switches of a
// run exactly as they would be typed, later lines are free notes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{BaseColor, Cli, Pair, Rgb3, Settings};
use crate::config::SeedColor;

/// The switch line that reproduces `settings`. The drawn seed count
/// replaces any seed range.
pub fn switches(settings: &Settings, seed_count: usize) -> String {
    let growth = &settings.growth;
    let base = match growth.seed_color {
        SeedColor::Random => BaseColor::Random,
        SeedColor::Fixed(rgb) => BaseColor::Fixed(Rgb3(rgb)),
    };
    let [r, g, b] = settings.background.0;
    let bg = Rgb3([i32::from(r), i32::from(g), i32::from(b)]);
    [
        format!("--width {}", growth.width),
        format!("--height {}", growth.height),
        format!("--rshift {}", growth.shift),
        format!("--bg-color {}", bg),
        format!("--color-mutation-base {}", base),
        format!("--reclaim-orphans {}", growth.reclaim_orphans),
        format!("--border-blend {}", growth.border_blend),
        format!("--tileable {}", growth.wrap),
        format!("--stop-at-percent {}", growth.stop_at),
        format!("--save-every-n {}", growth.snapshot_every),
        format!("--random-seed {}", growth.rng_seed),
        format!("--start-coords-n {}", seed_count),
        format!(
            "--growth-clip {}",
            Pair(growth.viscosity.min, growth.viscosity.max)
        ),
        format!("--save-preset {}", settings.save_preset),
    ]
    .join(" ")
}

pub fn save(path: &Path, switches: &str, parent: Option<&Path>) -> Result<()> {
    let mut contents = switches.trim().to_string();
    if let Some(parent) = parent {
        contents.push_str(&format!("\n\nPARENT PRESET: {}\n", parent.display()));
    }
    fs::write(path, contents).with_context(|| format!("writing preset {}", path.display()))
}

pub fn load(path: &Path) -> Result<Cli> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading preset {}", path.display()))?;
    let line = contents.lines().next().unwrap_or_default();
    let args = std::iter::once("color_growth").chain(line.split_whitespace());
    Cli::try_parse_from(args).with_context(|| format!("parsing preset {}", path.display()))
}

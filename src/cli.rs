// Command-line surface. Every switch is optional so a loaded preset can
// fill the gaps before defaults are applied.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::builder::BoolishValueParser;
use clap::Parser;
use image::Rgb;
use log::info;

use crate::config::{check_channels, ConfigError, GrowthConfig, SeedColor, SeedSpec, Viscosity};

const DEFAULT_BG_COLOR: [i32; 3] = [255, 63, 52];
const DEFAULT_START_COORDS_RANGE: (usize, usize) = (1, 13);

/// Renders a PNG of pigment colonies that mutate color as they spread
/// over a canvas.
#[derive(Debug, Default, Clone, Parser)]
#[command(name = "color_growth", version, about, long_about = None)]
pub struct Cli {
    /// Width of the output image. Default 400.
    #[arg(long)]
    pub width: Option<usize>,
    /// Height of the output image. Default 200.
    #[arg(long)]
    pub height: Option<usize>,
    /// Vary each channel by a random value in [-RSHIFT, RSHIFT] / 2 per step. Default 8.
    #[arg(short = 'r', long)]
    pub rshift: Option<u32>,
    /// Canvas color for unpainted pixels, as [R,G,B] or a single gray value. Default [255,63,52].
    #[arg(short = 'b', long, value_name = "RGB")]
    pub bg_color: Option<Rgb3>,
    /// Starting color of every colony, as [R,G,B], a gray value, or `random` for one color per
    /// colony. Defaults to the canvas color.
    #[arg(short = 'c', long, value_name = "RGB|random")]
    pub color_mutation_base: Option<BaseColor>,
    /// Revive pixels that were grown around but never painted. Default true.
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub reclaim_orphans: Option<bool>,
    /// Blend the seams where two colonies meet. Default true.
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub border_blend: Option<bool>,
    /// Wrap growth around the edges so the image tiles seamlessly. Default false.
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub tileable: Option<bool>,
    /// Fraction of the canvas, in (0, 1], to paint before stopping. Default 1.
    #[arg(long)]
    pub stop_at_percent: Option<f64>,
    /// Save an animation frame every N growth steps; 0 disables. Default 0.
    #[arg(short = 'a', long)]
    pub save_every_n: Option<u32>,
    /// Seed for the random generator. Chosen at random and saved in the preset when omitted.
    #[arg(short = 's', long)]
    pub random_seed: Option<u64>,
    /// Number of colonies to start from. Overrides --start-coords-range.
    #[arg(short = 'q', long)]
    pub start_coords_n: Option<usize>,
    /// Range to draw the number of colonies from, as (LOW,HIGH). Default (1,13).
    #[arg(long, value_name = "(LOW,HIGH)")]
    pub start_coords_range: Option<Pair<usize>>,
    /// Bounds on how many neighbours one step claims, as (MIN,MAX). MIN may be negative and MAX
    /// may exceed 8; the draw is clipped to the open neighbours. Default (0,5).
    #[arg(long, value_name = "(MIN,MAX)")]
    pub growth_clip: Option<Pair<i32>>,
    /// Save the resolved parameters to a .cgp preset beside the image. Default true.
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub save_preset: Option<bool>,
    /// Load parameters from a .cgp preset; switches given here override it.
    #[arg(long, value_name = "FILE")]
    pub load_preset: Option<PathBuf>,
    /// Directory for the image, preset and frames. Default the current directory.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

/// An RGB triple as typed by the user, not yet range checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb3(pub [i32; 3]);

impl FromStr for Rgb3 {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let inner: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '[' && *c != ']')
            .collect();
        let parts = inner
            .split(',')
            .map(|part| {
                part.parse::<i32>()
                    .map_err(|error| format!("invalid channel {:?}: {}", part, error))
            })
            .collect::<Result<Vec<i32>, String>>()?;
        match parts.as_slice() {
            [gray] => Ok(Rgb3([*gray; 3])),
            [r, g, b] => Ok(Rgb3([*r, *g, *b])),
            _ => Err(format!("expected [R,G,B] or a single value, got {:?}", value)),
        }
    }
}

impl fmt::Display for Rgb3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "[{},{},{}]", r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseColor {
    Random,
    Fixed(Rgb3),
}

impl FromStr for BaseColor {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("random") {
            Ok(BaseColor::Random)
        } else {
            value.parse().map(BaseColor::Fixed)
        }
    }
}

impl fmt::Display for BaseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseColor::Random => f.write_str("random"),
            BaseColor::Fixed(rgb) => fmt::Display::fmt(rgb, f),
        }
    }
}

/// Two numbers written as `(a,b)` or `a,b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair<T>(pub T, pub T);

impl<T> FromStr for Pair<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let inner: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '(' && *c != ')')
            .collect();
        let (first, second) = inner
            .split_once(',')
            .ok_or_else(|| format!("expected (a,b), got {:?}", value))?;
        let parse = |part: &str| {
            part.parse::<T>()
                .map_err(|error| format!("invalid number {:?}: {}", part, error))
        };
        Ok(Pair(parse(first)?, parse(second)?))
    }
}

impl<T: fmt::Display> fmt::Display for Pair<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.0, self.1)
    }
}

/// Everything a render needs once presets, switches and defaults are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub growth: GrowthConfig,
    pub background: Rgb<u8>,
    pub save_preset: bool,
    pub load_preset: Option<PathBuf>,
    pub out_dir: PathBuf,
}

impl Cli {
    /// Fill every switch missing here from `preset`.
    pub fn layered_over(self, preset: Cli) -> Cli {
        Cli {
            width: self.width.or(preset.width),
            height: self.height.or(preset.height),
            rshift: self.rshift.or(preset.rshift),
            bg_color: self.bg_color.or(preset.bg_color),
            color_mutation_base: self.color_mutation_base.or(preset.color_mutation_base),
            reclaim_orphans: self.reclaim_orphans.or(preset.reclaim_orphans),
            border_blend: self.border_blend.or(preset.border_blend),
            tileable: self.tileable.or(preset.tileable),
            stop_at_percent: self.stop_at_percent.or(preset.stop_at_percent),
            save_every_n: self.save_every_n.or(preset.save_every_n),
            random_seed: self.random_seed.or(preset.random_seed),
            start_coords_n: self.start_coords_n.or(preset.start_coords_n),
            start_coords_range: self.start_coords_range.or(preset.start_coords_range),
            growth_clip: self.growth_clip.or(preset.growth_clip),
            save_preset: self.save_preset.or(preset.save_preset),
            load_preset: self.load_preset,
            out_dir: self.out_dir.or(preset.out_dir),
        }
    }

    /// Apply defaults. `fallback_seed` is used when no random seed was given.
    pub fn resolve(self, fallback_seed: u64) -> Result<Settings, ConfigError> {
        let defaults = GrowthConfig::default();
        let bg = self.bg_color.map_or(DEFAULT_BG_COLOR, |rgb| rgb.0);
        check_channels(bg)?;

        let seed_color = match self.color_mutation_base {
            Some(BaseColor::Random) => SeedColor::Random,
            Some(BaseColor::Fixed(rgb)) => SeedColor::Fixed(rgb.0),
            None => SeedColor::Fixed(bg),
        };
        let seeds = match (self.start_coords_n, self.start_coords_range) {
            (Some(count), range) => {
                if range.is_some() {
                    info!("--start-coords-n {} overrides --start-coords-range", count);
                }
                SeedSpec::Count(count)
            }
            (None, Some(Pair(low, high))) => SeedSpec::Range(low, high),
            (None, None) => {
                SeedSpec::Range(DEFAULT_START_COORDS_RANGE.0, DEFAULT_START_COORDS_RANGE.1)
            }
        };
        let viscosity = self
            .growth_clip
            .map_or(defaults.viscosity, |Pair(min, max)| Viscosity { min, max });

        let growth = GrowthConfig {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            seeds,
            seed_color,
            shift: self.rshift.unwrap_or(defaults.shift),
            viscosity,
            wrap: self.tileable.unwrap_or(defaults.wrap),
            border_blend: self.border_blend.unwrap_or(defaults.border_blend),
            reclaim_orphans: self.reclaim_orphans.unwrap_or(defaults.reclaim_orphans),
            stop_at: self.stop_at_percent.unwrap_or(defaults.stop_at),
            snapshot_every: self.save_every_n.unwrap_or(defaults.snapshot_every),
            rng_seed: self.random_seed.unwrap_or(fallback_seed),
        };
        growth.validate()?;

        Ok(Settings {
            growth,
            background: Rgb([bg[0] as u8, bg[1] as u8, bg[2] as u8]),
            save_preset: self.save_preset.unwrap_or(true),
            load_preset: self.load_preset,
            out_dir: self.out_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

// Run parameters for a color growth render, checked once before any
// grid work starts.

use std::collections::HashSet;

use thiserror::Error;

use crate::growth::Coord;

/// Errors raised when a growth configuration cannot produce a run.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("canvas dimensions must be positive (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },
    #[error("canvas {width}x{height} has too many cells")]
    CanvasTooLarge { width: usize, height: usize },
    #[error("growth clip max {max} is below min {min}")]
    InvertedViscosity { min: i32, max: i32 },
    #[error("start coordinate range ({low},{high}) is inverted")]
    InvertedSeedRange { low: usize, high: usize },
    #[error("{requested} start coordinates requested but the canvas only has {available}")]
    TooManySeeds { requested: usize, available: usize },
    #[error("start coordinate ({row},{col}) lies outside the canvas")]
    SeedOutOfBounds { row: usize, col: usize },
    #[error("start coordinate ({row},{col}) is listed more than once")]
    DuplicateSeed { row: usize, col: usize },
    #[error("color channel value {value} is outside 0..=255")]
    ChannelOutOfRange { value: i32 },
    #[error("stop fraction {0} must lie in (0, 1]")]
    InvalidStopFraction(f64),
}

/// How the start coordinates are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedSpec {
    /// Exactly this many distinct random coordinates.
    Count(usize),
    /// A count drawn uniformly from the inclusive range, then that many coordinates.
    Range(usize, usize),
    /// These coordinates, in this order.
    Coords(Vec<Coord>),
}

/// Initial color of every start coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeedColor {
    Fixed([i32; 3]),
    /// Each start coordinate draws its own color.
    Random,
}

/// Bounds on how many unpainted neighbours one growth step may claim.
///
/// `min` may be negative and `max` may exceed eight; the drawn count is
/// always clamped to the neighbours actually available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viscosity {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthConfig {
    pub width: usize,
    pub height: usize,
    pub seeds: SeedSpec,
    pub seed_color: SeedColor,
    /// Channel perturbation magnitude; each step adds `[-shift, shift] / 2`.
    pub shift: u32,
    pub viscosity: Viscosity,
    /// Toroidal neighbourhoods, producing a tileable canvas.
    pub wrap: bool,
    pub border_blend: bool,
    pub reclaim_orphans: bool,
    /// Fraction of the canvas to paint before stopping.
    pub stop_at: f64,
    /// Snapshot the grid every this many growth steps; 0 disables.
    pub snapshot_every: u32,
    pub rng_seed: u64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            seeds: SeedSpec::Range(1, 13),
            seed_color: SeedColor::Fixed([255, 63, 52]),
            shift: 8,
            viscosity: Viscosity { min: 0, max: 5 },
            wrap: false,
            border_blend: true,
            reclaim_orphans: true,
            stop_at: 1.0,
            snapshot_every: 0,
            rng_seed: 0,
        }
    }
}

/// Rejects any channel outside `0..=255`.
pub fn check_channels(rgb: [i32; 3]) -> Result<(), ConfigError> {
    match rgb.iter().find(|value| !(0..=255).contains(*value)) {
        Some(&value) => Err(ConfigError::ChannelOutOfRange { value }),
        None => Ok(()),
    }
}

impl GrowthConfig {
    /// Saturates for canvases that `validate` rejects.
    pub fn cells(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Painted count at which growth stops.
    pub fn target(&self) -> usize {
        (self.cells() as f64 * self.stop_at).floor() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        match self.width.checked_mul(self.height) {
            Some(cells) if cells <= isize::MAX as usize => {}
            _ => {
                return Err(ConfigError::CanvasTooLarge {
                    width: self.width,
                    height: self.height,
                })
            }
        }
        if self.viscosity.max < self.viscosity.min {
            return Err(ConfigError::InvertedViscosity {
                min: self.viscosity.min,
                max: self.viscosity.max,
            });
        }
        if !(self.stop_at > 0.0 && self.stop_at <= 1.0) {
            return Err(ConfigError::InvalidStopFraction(self.stop_at));
        }
        if let SeedColor::Fixed(rgb) = self.seed_color {
            check_channels(rgb)?;
        }
        self.validate_seeds()
    }

    fn validate_seeds(&self) -> Result<(), ConfigError> {
        let available = self.cells();
        match &self.seeds {
            SeedSpec::Count(requested) if *requested > available => {
                Err(ConfigError::TooManySeeds {
                    requested: *requested,
                    available,
                })
            }
            SeedSpec::Range(low, high) if high < low => Err(ConfigError::InvertedSeedRange {
                low: *low,
                high: *high,
            }),
            SeedSpec::Range(_, high) if *high > available => Err(ConfigError::TooManySeeds {
                requested: *high,
                available,
            }),
            SeedSpec::Coords(coords) => {
                let mut seen = HashSet::with_capacity(coords.len());
                for coord in coords {
                    if coord.row >= self.height || coord.col >= self.width {
                        return Err(ConfigError::SeedOutOfBounds {
                            row: coord.row,
                            col: coord.col,
                        });
                    }
                    if !seen.insert(*coord) {
                        return Err(ConfigError::DuplicateSeed {
                            row: coord.row,
                            col: coord.col,
                        });
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

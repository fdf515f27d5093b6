//! Pigment colonies that grow pixel by pixel across a canvas, mutating
//! color as they spread, rendered to PNG.

pub mod cli;
pub mod config;
pub mod growth;
pub mod output;
pub mod preset;

pub use config::{ConfigError, GrowthConfig, SeedColor, SeedSpec, Viscosity};
pub use growth::{Cell, Color, ColorGrowth, Coord, Grid, GrowthOutcome, Phase, StopReason};

// Where renders land on disk: file naming, the final image and
// numbered animation frames.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::Rgb;
use rand::Rng;

use crate::growth::Grid;

/// `<timestamp>__<six hex chars>_colorGrowth-Rs`, unique enough that
/// repeated renders never overwrite each other.
pub fn base_name<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> String {
    format!(
        "{}{:06x}_colorGrowth-Rs",
        now.format("%Y_%m_%d__%H_%M_%S__"),
        rng.gen_range(0..0x100_0000u32)
    )
}

pub fn save_image(grid: &Grid, background: Rgb<u8>, path: &Path) -> Result<()> {
    grid.image(background)
        .save(path)
        .with_context(|| format!("saving image {}", path.display()))
}

/// Writes snapshots as `0000.png`, `0001.png`, ... into one directory.
pub struct FrameWriter {
    dir: PathBuf,
    pad: usize,
    written: u64,
    background: Rgb<u8>,
}

impl FrameWriter {
    /// Frame numbers are padded to the digit count of `target`.
    pub fn create(dir: PathBuf, target: usize, background: Rgb<u8>) -> Result<FrameWriter> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating frame directory {}", dir.display()))?;
        Ok(FrameWriter {
            dir,
            pad: target.to_string().len(),
            written: 0,
            background,
        })
    }

    pub fn write(&mut self, grid: &Grid) -> Result<()> {
        let path = self
            .dir
            .join(format!("{:0width$}.png", self.written, width = self.pad));
        save_image(grid, self.background, &path)?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

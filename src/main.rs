use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::Rng;

use color_growth::cli::Cli;
use color_growth::output::{self, FrameWriter};
use color_growth::{preset, ColorGrowth};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();
    let args = match args.load_preset.clone() {
        Some(path) => {
            info!("Loading preset {}", path.display());
            args.layered_over(preset::load(&path)?)
        }
        None => args,
    };

    let mut rng = rand::thread_rng();
    let settings = args.resolve(rng.gen_range(0..=u64::from(u32::MAX)))?;
    let mut growth = ColorGrowth::new(settings.growth.clone())?;
    info!(
        "Random seed {}, {} start coordinates",
        settings.growth.rng_seed,
        growth.seed_count()
    );

    fs::create_dir_all(&settings.out_dir)
        .with_context(|| format!("creating output directory {}", settings.out_dir.display()))?;
    let base = output::base_name(chrono::Local::now(), &mut rng);

    if settings.save_preset {
        let path = settings.out_dir.join(format!("{}.cgp", base));
        preset::save(
            &path,
            &preset::switches(&settings, growth.seed_count()),
            settings.load_preset.as_deref(),
        )?;
        info!("Saved preset {}", path.display());
    }

    let outcome = if settings.growth.snapshot_every > 0 {
        let mut frames = FrameWriter::create(
            settings.out_dir.join(format!("{}_frames", base)),
            growth.target(),
            settings.background,
        )?;
        let outcome = growth.run_with(|grid| frames.write(grid))?;
        info!("Saved {} frames to {}", frames.written(), frames.dir().display());
        outcome
    } else {
        growth.run()
    };

    let image_path = settings.out_dir.join(format!("{}.png", base));
    output::save_image(growth.grid(), settings.background, &image_path)?;
    info!(
        "Render complete ({:?}): {} of {} painted, {} orphans reclaimed in {} steps; saved {}",
        outcome.stop,
        outcome.painted,
        outcome.total,
        outcome.reclaimed,
        outcome.steps,
        image_path.display()
    );
    Ok(())
}

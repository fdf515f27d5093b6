// Grow colonies of pigment across a canvas.
//
// Every colony starts from a seed and spreads pixel by pixel into
// unpainted neighbours, drifting its color slightly at each step. A
// viscosity clip bounds how many neighbours one step may claim, so
// colonies range from floods to stringy tendrils. Where two fronts meet
// head on the claimed pixel can be blended with the far side, and once
// every front has died an orphan sweep revives the pixels that were
// grown around but never claimed.

use std::convert::Infallible;

use image::{Rgb, RgbImage};
use log::{debug, info, warn};
use ndarray::Array2;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{ConfigError, GrowthConfig, SeedColor, SeedSpec};

const REPORT_EVERY_N: u64 = 5000;
// Seed counts drawn from a range come from their own stream, so a preset
// recording the drawn count replays the main sequence unchanged.
const SEED_COUNT_STREAM: u64 = 0x5eed;

// Moore neighbourhood, row-major, centre excluded
const OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub channels: [f64; 3],
}

impl Color {
    pub fn from_rgb(rgb: [i32; 3]) -> Color {
        Color {
            channels: [f64::from(rgb[0]), f64::from(rgb[1]), f64::from(rgb[2])],
        }
        .clamped()
    }

    pub fn clamped(self) -> Color {
        let [r, g, b] = self.channels;
        Color {
            channels: [r.clamp(0.0, 255.0), g.clamp(0.0, 255.0), b.clamp(0.0, 255.0)],
        }
    }

    /// Shift each channel by an independent draw from `[-shift, shift] / 2`.
    pub fn perturbed<R: Rng + ?Sized>(self, rng: &mut R, shift: u32) -> Color {
        let shift = i64::from(shift);
        let mut channels = self.channels;
        for channel in channels.iter_mut() {
            *channel += rng.gen_range(-shift..=shift) as f64 / 2.0;
        }
        Color { channels }.clamped()
    }

    pub fn average(self, other: Color) -> Color {
        let mut channels = self.channels;
        for (channel, theirs) in channels.iter_mut().zip(other.channels.iter()) {
            *channel = (*channel + theirs) / 2.0;
        }
        Color { channels }
    }

    fn pixel(self) -> Rgb<u8> {
        let [r, g, b] = self.channels;
        Rgb([r as u8, g as u8, b as u8])
    }
}

/// State of one canvas position. Painting is one way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Unpainted,
    Painted(Color),
}

impl Cell {
    pub fn is_painted(&self) -> bool {
        matches!(self, Cell::Painted(_))
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Cell::Painted(color) => Some(*color),
            Cell::Unpainted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

/// A neighbouring coordinate along with the offset that reached it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub coord: Coord,
    pub d_row: isize,
    pub d_col: isize,
}

// Canvas of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Grid {
        Grid {
            cells: Array2::from_elem((height, width), Cell::Unpainted),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cell(&self, at: Coord) -> Cell {
        self.cells[[at.row, at.col]]
    }

    pub fn color(&self, at: Coord) -> Option<Color> {
        self.cell(at).color()
    }

    pub fn is_painted(&self, at: Coord) -> bool {
        self.cell(at).is_painted()
    }

    pub fn paint(&mut self, at: Coord, color: Color) {
        self.cells[[at.row, at.col]] = Cell::Painted(color.clamped());
    }

    pub fn painted_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_painted()).count()
    }

    /// Step `at` by the given offset. Off-canvas results are `None` unless
    /// `wrap` folds them back onto the opposite edge.
    pub fn displaced(&self, at: Coord, d_row: isize, d_col: isize, wrap: bool) -> Option<Coord> {
        let height = self.height() as isize;
        let width = self.width() as isize;
        let row = at.row as isize + d_row;
        let col = at.col as isize + d_col;
        if wrap {
            Some(Coord {
                row: row.rem_euclid(height) as usize,
                col: col.rem_euclid(width) as usize,
            })
        } else if (0..height).contains(&row) && (0..width).contains(&col) {
            Some(Coord {
                row: row as usize,
                col: col as usize,
            })
        } else {
            None
        }
    }

    pub fn neighbors(&self, at: Coord, wrap: bool) -> impl Iterator<Item = Neighbor> + '_ {
        OFFSETS.iter().filter_map(move |&(d_row, d_col)| {
            self.displaced(at, d_row, d_col, wrap)
                .map(|coord| Neighbor { coord, d_row, d_col })
        })
    }

    pub fn unpainted_neighbors(&self, at: Coord, wrap: bool) -> Vec<Neighbor> {
        self.distinct_neighbors(at, wrap, false)
    }

    pub fn painted_neighbors(&self, at: Coord, wrap: bool) -> Vec<Neighbor> {
        self.distinct_neighbors(at, wrap, true)
    }

    // On very narrow wrapped canvases two offsets can land on the same cell.
    fn distinct_neighbors(&self, at: Coord, wrap: bool, painted: bool) -> Vec<Neighbor> {
        let mut found: Vec<Neighbor> = Vec::with_capacity(OFFSETS.len());
        for neighbor in self.neighbors(at, wrap) {
            if neighbor.coord == at || self.is_painted(neighbor.coord) != painted {
                continue;
            }
            if found.iter().all(|seen| seen.coord != neighbor.coord) {
                found.push(neighbor);
            }
        }
        found
    }

    pub fn image(&self, background: Rgb<u8>) -> RgbImage {
        let mut img = RgbImage::new(self.width() as u32, self.height() as u32);
        for ((row, col), cell) in self.cells.indexed_iter() {
            let pixel = cell.color().map_or(background, Color::pixel);
            img.put_pixel(col as u32, row as u32, pixel);
        }
        img
    }
}

/// Painted coordinates that may still grow. Unordered.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    coords: Vec<Coord>,
}

impl Frontier {
    pub fn push(&mut self, at: Coord) {
        self.coords.push(at);
    }

    /// Remove a uniformly chosen entry by swapping it with the last.
    pub fn take_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Coord> {
        if self.coords.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.coords.len());
        Some(self.coords.swap_remove(index))
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coord> {
        self.coords.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Growing,
    Reclaiming,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    /// The frontier died with reclamation disabled.
    Exhausted,
    /// A reclaim pass found no orphan adjacent to paint.
    NothingToReclaim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthOutcome {
    pub painted: usize,
    pub reclaimed: usize,
    pub steps: u64,
    pub target: usize,
    pub total: usize,
    pub stop: StopReason,
}

pub struct ColorGrowth {
    config: GrowthConfig,
    grid: Grid,
    frontier: Frontier,
    rng: Pcg32,
    painted: usize,
    reclaimed: usize,
    steps: u64,
    target: usize,
    seed_count: usize,
    phase: Phase,
    painted_at_report: usize,
}

impl ColorGrowth {
    /// Validate `config`, then paint the seeds and queue them for growth.
    pub fn new(config: GrowthConfig) -> Result<ColorGrowth, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(config.rng_seed);
        let mut grid = Grid::new(config.width, config.height);
        let mut frontier = Frontier::default();

        let seeds = match &config.seeds {
            SeedSpec::Count(count) => sample_coords(&mut rng, config.width, config.cells(), *count),
            SeedSpec::Range(low, high) => {
                let count =
                    Pcg32::new(config.rng_seed, SEED_COUNT_STREAM).gen_range(*low..=*high);
                sample_coords(&mut rng, config.width, config.cells(), count)
            }
            SeedSpec::Coords(coords) => coords.clone(),
        };
        for &seed in &seeds {
            let color = match config.seed_color {
                SeedColor::Fixed(rgb) => Color::from_rgb(rgb),
                SeedColor::Random => Color::from_rgb([
                    rng.gen_range(0..=255),
                    rng.gen_range(0..=255),
                    rng.gen_range(0..=255),
                ]),
            };
            grid.paint(seed, color);
            frontier.push(seed);
        }

        Ok(ColorGrowth {
            target: config.target(),
            seed_count: seeds.len(),
            painted: seeds.len(),
            config,
            grid,
            frontier,
            rng,
            reclaimed: 0,
            steps: 0,
            phase: Phase::Growing,
            painted_at_report: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn painted(&self) -> usize {
        self.painted
    }

    pub fn reclaimed(&self) -> usize {
        self.reclaimed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn seed_count(&self) -> usize {
        self.seed_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn target_reached(&self) -> bool {
        self.painted >= self.target
    }

    /// Grow from one frontier cell. Returns how many neighbours it claimed,
    /// or `None` when the frontier is empty.
    pub fn step(&mut self) -> Option<usize> {
        let wrap = self.config.wrap;
        let origin = self.frontier.take_random(&mut self.rng)?;
        let color = self.grid.color(origin);
        debug_assert!(color.is_some(), "frontier held unpainted {:?}", origin);
        let color = color?;
        let mutated = color.perturbed(&mut self.rng, self.config.shift);
        self.grid.paint(origin, mutated);
        self.steps += 1;

        let open = self.grid.unpainted_neighbors(origin, wrap);
        if open.is_empty() {
            return Some(0);
        }
        let requested = self
            .rng
            .gen_range(self.config.viscosity.min..=self.config.viscosity.max);
        let count = requested.clamp(0, open.len() as i32) as usize;
        let claimed: Vec<Neighbor> = open
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();

        for neighbor in &claimed {
            let far_color = if self.config.border_blend {
                self.grid
                    .displaced(neighbor.coord, neighbor.d_row, neighbor.d_col, wrap)
                    .and_then(|far| self.grid.color(far))
            } else {
                None
            };
            let color = far_color.map_or(mutated, |far| mutated.average(far));
            self.grid.paint(neighbor.coord, color);
            self.frontier.push(neighbor.coord);
            self.painted += 1;
        }
        Some(claimed.len())
    }

    /// One row-major sweep reviving every unpainted cell that touches paint.
    /// Cells revived earlier in the sweep count as paint for later ones.
    pub fn reclaim_orphans(&mut self) -> usize {
        let wrap = self.config.wrap;
        let mut reclaimed = 0;
        for row in 0..self.grid.height() {
            for col in 0..self.grid.width() {
                let at = Coord { row, col };
                if self.grid.is_painted(at) {
                    continue;
                }
                let painted = self.grid.painted_neighbors(at, wrap);
                let source = match painted.choose(&mut self.rng) {
                    Some(source) => source.coord,
                    None => continue,
                };
                let color = match self.grid.color(source) {
                    Some(color) => color.perturbed(&mut self.rng, self.config.shift),
                    None => continue,
                };
                self.grid.paint(at, color);
                self.frontier.push(at);
                self.painted += 1;
                reclaimed += 1;
            }
        }
        self.reclaimed += reclaimed;
        reclaimed
    }

    pub fn run(&mut self) -> GrowthOutcome {
        match self.run_with(|_| Ok::<(), Infallible>(())) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// Alternate growth and orphan sweeps until the target is met or no
    /// cell can be painted. `on_snapshot` sees the grid after growth steps
    /// 0, N, 2N, ... for a snapshot interval of N; its first error stops
    /// the run between steps.
    pub fn run_with<E, F>(&mut self, mut on_snapshot: F) -> Result<GrowthOutcome, E>
    where
        F: FnMut(&Grid) -> Result<(), E>,
    {
        info!(
            "Growing {}x{} canvas from {} start coordinates toward {} painted",
            self.grid.width(),
            self.grid.height(),
            self.seed_count,
            self.target
        );
        let every = u64::from(self.config.snapshot_every);
        loop {
            match self.phase {
                Phase::Growing => {
                    while !self.target_reached() {
                        let index = self.steps;
                        if self.step().is_none() {
                            break;
                        }
                        if every > 0 && index % every == 0 {
                            on_snapshot(&self.grid)?;
                        }
                        if index % REPORT_EVERY_N == 0 {
                            self.report_progress();
                        }
                    }
                    self.phase = if self.target_reached() || !self.config.reclaim_orphans {
                        Phase::Done
                    } else {
                        Phase::Reclaiming
                    };
                }
                Phase::Reclaiming => {
                    let reclaimed = self.reclaim_orphans();
                    debug!(
                        "Orphan sweep reclaimed {} ({} total, {} painted)",
                        reclaimed, self.reclaimed, self.painted
                    );
                    self.phase = if reclaimed > 0 {
                        Phase::Growing
                    } else {
                        Phase::Done
                    };
                }
                Phase::Done => break,
            }
        }

        let stop = if self.target_reached() {
            info!(
                "Painted count {} reached target {}; ending growth",
                self.painted, self.target
            );
            StopReason::TargetReached
        } else if self.config.reclaim_orphans {
            info!("No orphans left to reclaim; ending growth at {} painted", self.painted);
            StopReason::NothingToReclaim
        } else {
            warn!(
                "Frontier exhausted at {} of {} target; {} cells left unpainted",
                self.painted,
                self.target,
                self.config.cells() - self.painted
            );
            StopReason::Exhausted
        };
        Ok(GrowthOutcome {
            painted: self.painted,
            reclaimed: self.reclaimed,
            steps: self.steps,
            target: self.target,
            total: self.config.cells(),
            stop,
        })
    }

    fn report_progress(&mut self) {
        info!(
            "newly painted {} : total painted {} : target {} : canvas size {} : reclaimed orphans {}",
            self.painted - self.painted_at_report,
            self.painted,
            self.target,
            self.config.cells(),
            self.reclaimed
        );
        self.painted_at_report = self.painted;
    }
}

fn sample_coords<R: Rng + ?Sized>(
    rng: &mut R,
    width: usize,
    cells: usize,
    count: usize,
) -> Vec<Coord> {
    index::sample(rng, cells, count)
        .into_iter()
        .map(|i| Coord {
            row: i / width,
            col: i % width,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Viscosity;

    fn config(width: usize, height: usize, min: i32, max: i32) -> GrowthConfig {
        GrowthConfig {
            width,
            height,
            seeds: SeedSpec::Count(1),
            viscosity: Viscosity { min, max },
            wrap: false,
            border_blend: true,
            reclaim_orphans: false,
            stop_at: 1.0,
            rng_seed: 7,
            ..GrowthConfig::default()
        }
    }

    fn at(row: usize, col: usize) -> Coord {
        Coord { row, col }
    }

    fn assert_invariants(growth: &ColorGrowth) {
        let grid = growth.grid();
        assert_eq!(growth.painted(), grid.painted_cells());
        assert!(growth.painted() <= grid.width() * grid.height());
        for coord in growth.frontier().iter() {
            assert!(grid.is_painted(*coord), "frontier holds unpainted {:?}", coord);
        }
        for row in 0..grid.height() {
            for col in 0..grid.width() {
                if let Some(color) = grid.color(at(row, col)) {
                    assert!(color.channels.iter().all(|c| (0.0..=255.0).contains(c)));
                }
            }
        }
    }

    #[test_log::test]
    fn wrapped_corner_reaches_opposite_edges() {
        let grid = Grid::new(5, 4);
        let coords: Vec<Coord> = grid.neighbors(at(0, 0), true).map(|n| n.coord).collect();
        assert_eq!(coords.len(), 8);
        assert!(coords.contains(&at(3, 4)));
        assert!(coords.contains(&at(3, 0)));
        assert!(coords.contains(&at(0, 4)));
    }

    #[test_log::test]
    fn unwrapped_corner_has_three_neighbors() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.neighbors(at(0, 0), false).count(), 3);
        assert_eq!(grid.neighbors(at(3, 4), false).count(), 3);
        assert_eq!(grid.neighbors(at(1, 2), false).count(), 8);
        assert_eq!(grid.neighbors(at(0, 2), false).count(), 5);
    }

    #[test_log::test]
    fn narrow_wrapped_grid_lists_each_neighbor_once() {
        let grid = Grid::new(2, 2);
        let open = grid.unpainted_neighbors(at(0, 0), true);
        assert_eq!(open.len(), 3);

        let strip = Grid::new(1, 1);
        assert!(strip.unpainted_neighbors(at(0, 0), true).is_empty());
    }

    #[test_log::test]
    fn neighbor_queries_split_on_paint() {
        let mut grid = Grid::new(3, 3);
        grid.paint(at(0, 0), Color::from_rgb([1, 2, 3]));
        grid.paint(at(2, 2), Color::from_rgb([1, 2, 3]));
        let painted: Vec<Coord> = grid
            .painted_neighbors(at(1, 1), false)
            .iter()
            .map(|n| n.coord)
            .collect();
        assert_eq!(painted, vec![at(0, 0), at(2, 2)]);
        assert_eq!(grid.unpainted_neighbors(at(1, 1), false).len(), 6);
    }

    #[test_log::test]
    fn perturbation_stays_in_channel_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut color = Color::from_rgb([0, 128, 255]);
        for _ in 0..1000 {
            color = color.perturbed(&mut rng, 600);
            assert!(color.channels.iter().all(|c| (0.0..=255.0).contains(c)));
        }
        let still = Color::from_rgb([9, 8, 7]).perturbed(&mut rng, 0);
        assert_eq!(still, Color::from_rgb([9, 8, 7]));
    }

    #[test_log::test]
    fn frontier_removal_yields_each_entry_once() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut frontier = Frontier::default();
        for col in 0..6 {
            frontier.push(at(0, col));
        }
        let mut taken = Vec::new();
        while let Some(coord) = frontier.take_random(&mut rng) {
            taken.push(coord.col);
        }
        taken.sort_unstable();
        assert_eq!(taken, vec![0, 1, 2, 3, 4, 5]);
        assert!(frontier.is_empty());
    }

    #[test_log::test]
    fn seeds_are_painted_and_queued() {
        let growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Count(6),
            ..config(8, 8, 0, 5)
        })
        .unwrap();
        assert_eq!(growth.seed_count(), 6);
        assert_eq!(growth.painted(), 6);
        assert_eq!(growth.frontier().len(), 6);
        assert_invariants(&growth);
    }

    #[test_log::test]
    fn seed_range_draws_count_within_bounds() {
        let growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Range(3, 9),
            seed_color: SeedColor::Random,
            ..config(8, 8, 0, 5)
        })
        .unwrap();
        assert!((3..=9).contains(&growth.seed_count()));
        assert_eq!(growth.grid().painted_cells(), growth.seed_count());
    }

    #[test_log::test]
    fn drawn_seed_count_replays_as_fixed_count() {
        let ranged = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Range(2, 7),
            ..config(10, 10, 0, 5)
        })
        .unwrap();
        let fixed = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Count(ranged.seed_count()),
            ..config(10, 10, 0, 5)
        })
        .unwrap();
        assert_eq!(ranged.grid(), fixed.grid());
    }

    #[test_log::test]
    fn invalid_config_fails_before_grid_work() {
        let result = ColorGrowth::new(config(8, 8, 4, 1));
        assert!(matches!(
            result,
            Err(ConfigError::InvertedViscosity { min: 4, max: 1 })
        ));
    }

    #[test_log::test]
    fn invariants_hold_through_every_step_and_sweep() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Count(3),
            shift: 40,
            reclaim_orphans: true,
            ..config(12, 9, -2, 3)
        })
        .unwrap();
        loop {
            while growth.step().is_some() {
                assert_invariants(&growth);
            }
            let reclaimed = growth.reclaim_orphans();
            assert_invariants(&growth);
            if reclaimed == 0 {
                break;
            }
        }
        assert_eq!(growth.painted(), 12 * 9);
    }

    #[test_log::test]
    fn orphan_sweep_only_paints_cells_touching_paint() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Coords(vec![at(4, 4)]),
            reclaim_orphans: true,
            ..config(5, 5, 0, 0)
        })
        .unwrap();
        let reclaimed = growth.reclaim_orphans();
        assert_eq!(reclaimed, 4);
        assert_eq!(growth.reclaimed(), 4);
        assert_eq!(growth.painted(), 5);
        for coord in &[at(3, 3), at(3, 4), at(4, 2), at(4, 3)] {
            assert!(growth.grid().is_painted(*coord));
        }
        assert!(!growth.grid().is_painted(at(3, 2)));
        assert_eq!(growth.frontier().len(), 5);
        assert_invariants(&growth);
    }

    #[test_log::test]
    fn border_blend_averages_with_far_side() {
        let blended = |border_blend: bool| {
            let mut growth = ColorGrowth::new(GrowthConfig {
                seeds: SeedSpec::Coords(vec![at(0, 0), at(0, 2)]),
                seed_color: SeedColor::Random,
                shift: 0,
                border_blend,
                ..config(3, 1, 1, 1)
            })
            .unwrap();
            let left = growth.grid().color(at(0, 0)).unwrap();
            let right = growth.grid().color(at(0, 2)).unwrap();
            assert_eq!(growth.step(), Some(1));
            (left, right, growth.grid().color(at(0, 1)).unwrap())
        };

        let (left, right, middle) = blended(true);
        assert_eq!(middle, left.average(right));

        let (left, right, middle) = blended(false);
        assert!(middle == left || middle == right);
    }

    #[test_log::test]
    fn off_canvas_far_side_copies_origin_color() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Coords(vec![at(0, 0)]),
            seed_color: SeedColor::Random,
            ..config(2, 1, 1, 1)
        })
        .unwrap();
        assert_eq!(growth.step(), Some(1));
        let origin = growth.grid().color(at(0, 0)).unwrap();
        assert_eq!(growth.grid().color(at(0, 1)), Some(origin));
    }

    #[test_log::test]
    fn wrapped_claim_blends_across_the_seam() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Coords(vec![at(0, 0), at(0, 2)]),
            seed_color: SeedColor::Random,
            shift: 0,
            wrap: true,
            ..config(4, 1, 2, 2)
        })
        .unwrap();
        let left = growth.grid().color(at(0, 0)).unwrap();
        let right = growth.grid().color(at(0, 2)).unwrap();
        assert_eq!(growth.step(), Some(2));
        let blended = left.average(right);
        assert_eq!(growth.grid().color(at(0, 3)), Some(blended));
        assert_eq!(growth.grid().color(at(0, 1)), Some(blended));
    }

    #[test_log::test]
    #[should_panic(expected = "frontier held unpainted")]
    fn unpainted_frontier_entry_is_caught() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Count(0),
            ..config(3, 3, 1, 1)
        })
        .unwrap();
        growth.frontier.push(at(1, 1));
        growth.step();
    }

    #[test_log::test]
    fn full_flood_paints_every_cell() {
        let mut growth = ColorGrowth::new(config(9, 7, 8, 8)).unwrap();
        let outcome = growth.run();
        assert_eq!(outcome.painted, 63);
        assert_eq!(growth.grid().painted_cells(), 63);
        assert_eq!(outcome.stop, StopReason::TargetReached);
        assert_eq!(outcome.reclaimed, 0);
    }

    #[test_log::test]
    fn zero_viscosity_never_grows() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Count(4),
            ..config(6, 6, 0, 0)
        })
        .unwrap();
        let outcome = growth.run();
        assert_eq!(outcome.painted, 4);
        assert_eq!(growth.grid().painted_cells(), 4);
        assert_eq!(outcome.steps, 4);
        assert_eq!(outcome.stop, StopReason::Exhausted);
        assert_eq!(growth.phase(), Phase::Done);
    }

    #[test_log::test]
    fn reclamation_covers_whole_canvas() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            reclaim_orphans: true,
            ..config(16, 11, 1, 1)
        })
        .unwrap();
        let outcome = growth.run();
        assert_eq!(outcome.painted, 16 * 11);
        assert_eq!(growth.grid().painted_cells(), 16 * 11);
        assert_eq!(outcome.stop, StopReason::TargetReached);
    }

    #[test_log::test]
    fn wrapped_reclamation_covers_whole_canvas() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            reclaim_orphans: true,
            wrap: true,
            seeds: SeedSpec::Count(2),
            ..config(10, 6, 0, 2)
        })
        .unwrap();
        let outcome = growth.run();
        assert_eq!(outcome.painted, 60);
        assert_invariants(&growth);
    }

    #[test_log::test]
    fn partial_stop_crosses_target_once() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            stop_at: 0.5,
            reclaim_orphans: true,
            ..config(10, 10, 0, 5)
        })
        .unwrap();
        let outcome = growth.run();
        assert_eq!(outcome.target, 50);
        assert!(outcome.painted >= 50 && outcome.painted <= 100);
        // one step claims at most eight cells
        assert!(outcome.painted < 50 + 8 || outcome.reclaimed > 0);
        assert_eq!(outcome.stop, StopReason::TargetReached);
    }

    #[test_log::test]
    fn run_is_bounded_by_canvas_size() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            seeds: SeedSpec::Count(5),
            reclaim_orphans: true,
            ..config(13, 13, 0, 3)
        })
        .unwrap();
        let outcome = growth.run();
        assert!(outcome.steps <= 169);
        assert!(outcome.painted + outcome.reclaimed <= 2 * 169);
        assert_eq!(outcome.painted, 169);
    }

    #[test_log::test]
    fn same_seed_same_canvas() {
        let render = |rng_seed: u64| {
            let mut growth = ColorGrowth::new(GrowthConfig {
                seeds: SeedSpec::Range(1, 4),
                seed_color: SeedColor::Random,
                reclaim_orphans: true,
                wrap: true,
                rng_seed,
                ..config(20, 15, 0, 5)
            })
            .unwrap();
            let outcome = growth.run();
            (outcome, growth.grid().clone())
        };
        assert_eq!(render(99), render(99));
        assert_ne!(render(99).1, render(100).1);
    }

    #[test_log::test]
    fn snapshots_follow_interval() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            snapshot_every: 3,
            ..config(6, 5, 8, 8)
        })
        .unwrap();
        let mut frames = 0u64;
        let outcome = growth
            .run_with(|grid| {
                assert!(grid.painted_cells() > 0);
                frames += 1;
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(frames, (outcome.steps + 2) / 3);
    }

    #[test_log::test]
    fn snapshot_error_stops_between_steps() {
        let mut growth = ColorGrowth::new(GrowthConfig {
            snapshot_every: 1,
            ..config(6, 5, 8, 8)
        })
        .unwrap();
        let result = growth.run_with(|_| Err("disk full"));
        assert_eq!(result, Err("disk full"));
        assert_eq!(growth.steps(), 1);
        assert_invariants(&growth);
    }

    #[test_log::test]
    fn image_uses_background_for_unpainted() {
        let mut grid = Grid::new(2, 1);
        grid.paint(at(0, 1), Color::from_rgb([10, 20, 30]));
        let img = grid.image(Rgb([1, 2, 3]));
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(*img.get_pixel(0, 0), Rgb([1, 2, 3]));
        assert_eq!(*img.get_pixel(1, 0), Rgb([10, 20, 30]));
    }
}

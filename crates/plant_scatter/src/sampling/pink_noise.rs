//! Pink-noise rejection sampling over the coloured grid.
//!
//! Each cell draws uniform points inside its own rectangle and rejects any
//! draw that lands too close to points already accepted in the cell or its
//! neighbours. Cells of one colour are sampled in parallel against a shared,
//! read-only grid; the accepted points are appended after the colour drains.
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::grid::{Coordinate, PointPass, SpatialGrid};
use crate::pool::WorkerPool;
use crate::sampling::{rand_range, split_seeds};

/// Minimum-distance rejection sampler.
///
/// Distances are in world units; point separations are measured in grid units
/// and scaled by `grid_spacing` before the comparison.
#[derive(Clone, Debug, PartialEq)]
pub struct PinkNoiseSampler {
    /// Minimum spacing between canopy points.
    pub canopy_min_distance: f64,
    /// Minimum spacing between an undergrowth point and any canopy point.
    pub mid_min_distance: f64,
    /// Minimum spacing between undergrowth points.
    pub undergrowth_min_distance: f64,
    /// World units per grid unit.
    pub grid_spacing: f64,
    /// Consecutive rejections tolerated before a cell gives up.
    ///
    /// `None` retries forever, which livelocks if the cell's target cannot
    /// geometrically fit.
    pub rejection_budget: Option<u32>,
}

impl PinkNoiseSampler {
    #[inline]
    fn too_close(&self, a: Vec2, b: Vec2, min_distance: f64) -> bool {
        (a.distance(b) as f64) * self.grid_spacing < min_distance
    }

    /// Canopy points for `cell`, checked against canopy points of the cell and its neighbours.
    pub fn sample_canopy(
        &self,
        grid: &SpatialGrid,
        cell: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vec2>> {
        let existing = gather(grid, cell, PointPass::Canopy);
        self.sample_with(grid, cell, PointPass::Canopy, rng, |p, accepted| {
            existing
                .iter()
                .chain(accepted)
                .any(|&q| self.too_close(p, q, self.canopy_min_distance))
        })
    }

    /// Undergrowth points for `cell`.
    ///
    /// Requires canopy sampling to have completed for the whole grid. Draws are
    /// rejected near canopy points (mid distance) and near undergrowth points
    /// (undergrowth distance) of the cell and its neighbours.
    pub fn sample_undergrowth(
        &self,
        grid: &SpatialGrid,
        cell: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vec2>> {
        let canopy = gather(grid, cell, PointPass::Canopy);
        let existing = gather(grid, cell, PointPass::Undergrowth);
        self.sample_with(grid, cell, PointPass::Undergrowth, rng, |p, accepted| {
            canopy
                .iter()
                .any(|&q| self.too_close(p, q, self.mid_min_distance))
                || existing
                    .iter()
                    .chain(accepted)
                    .any(|&q| self.too_close(p, q, self.undergrowth_min_distance))
        })
    }

    /// Points for `cell` in `pass`.
    pub fn sample(
        &self,
        grid: &SpatialGrid,
        cell: usize,
        pass: PointPass,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Vec2>> {
        match pass {
            PointPass::Canopy => self.sample_canopy(grid, cell, rng),
            PointPass::Undergrowth => self.sample_undergrowth(grid, cell, rng),
        }
    }

    fn sample_with<F>(
        &self,
        grid: &SpatialGrid,
        cell: usize,
        pass: PointPass,
        rng: &mut dyn RngCore,
        rejected: F,
    ) -> Result<Vec<Vec2>>
    where
        F: Fn(Vec2, &[Vec2]) -> bool,
    {
        let c = grid.cell(cell);
        let target = c.target(pass);
        let (min, max) = (c.bounds.min, c.bounds.max);
        let mut accepted = Vec::with_capacity(target);
        let mut misses = 0u32;

        while accepted.len() < target {
            let x = rand_range(rng, min.x, max.x);
            let y = rand_range(rng, min.y, max.y);
            let p = Vec2::new(x, y);

            if rejected(p, accepted.as_slice()) {
                misses += 1;
                if self.rejection_budget.is_some_and(|budget| misses > budget) {
                    return Err(Error::GenerationFailed {
                        pass,
                        cell,
                        placed: accepted.len(),
                        target,
                    });
                }
                continue;
            }

            misses = 0;
            accepted.push(p);
        }

        Ok(accepted)
    }

    /// Sample every cell of `color` in parallel and append the accepted points.
    ///
    /// Task seeds are split from `parent` in cell order before any task starts.
    /// On failure no points of this colour are written. Returns the number of
    /// points added.
    pub fn sample_color(
        &self,
        grid: &mut SpatialGrid,
        color: usize,
        pass: PointPass,
        pool: &WorkerPool,
        parent: &mut dyn RngCore,
    ) -> Result<usize> {
        let cells = grid.cells_of_color(color).to_vec();
        if cells.is_empty() {
            debug!("Colour {} has no cells, skipping {} sampling.", color, pass);
            return Ok(0);
        }

        let tasks = split_seeds(parent, &cells);
        let shared: &SpatialGrid = grid;
        let results = pool
            .drain(tasks, |cell, seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                self.sample(shared, cell, pass, &mut rng)
            })
            .inspect_err(|e| warn!("Pink noise sampling aborted: {}", e))?;

        let mut added = 0;
        for (cell, points) in results {
            added += points.len();
            grid.cell_mut(cell)
                .points_mut(pass)
                .extend(points.into_iter().map(Coordinate::new));
        }
        Ok(added)
    }
}

/// Positions of `pass` points in `cell` and its neighbours.
fn gather(grid: &SpatialGrid, cell: usize, pass: PointPass) -> Vec<Vec2> {
    grid.neighborhood(cell)
        .flat_map(|i| grid.cell(i).points(pass).iter().map(|c| c.position))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(budget: Option<u32>) -> PinkNoiseSampler {
        PinkNoiseSampler {
            canopy_min_distance: 2.0,
            mid_min_distance: 1.5,
            undergrowth_min_distance: 1.0,
            grid_spacing: 0.9144,
            rejection_budget: budget,
        }
    }

    fn grid(canopy: usize, undergrowth: usize) -> SpatialGrid {
        let mut grid = SpatialGrid::partition(60.0, 60.0, 10.0).unwrap();
        grid.allocate_points(canopy, undergrowth, &mut StdRng::seed_from_u64(2));
        grid
    }

    fn run_all(grid: &mut SpatialGrid, s: &PinkNoiseSampler, seed: u64) -> Result<()> {
        let pool = WorkerPool::new(Some(4))?;
        let mut parent = StdRng::seed_from_u64(seed);
        for pass in PointPass::ORDERED {
            for color in 0..crate::grid::COLORS {
                s.sample_color(grid, color, pass, &pool, &mut parent)?;
            }
        }
        Ok(())
    }

    fn min_pairwise(a: &[Vec2], b: &[Vec2], same: bool) -> f32 {
        let mut best = f32::INFINITY;
        for (i, p) in a.iter().enumerate() {
            for (j, q) in b.iter().enumerate() {
                if same && i == j {
                    continue;
                }
                best = best.min(p.distance(*q));
            }
        }
        best
    }

    #[test]
    fn sampled_points_respect_minimum_distances() {
        let s = sampler(Some(5_000));
        let mut g = grid(180, 360);
        run_all(&mut g, &s, 7).unwrap();

        let canopy: Vec<Vec2> = g.points(PointPass::Canopy).map(|c| c.position).collect();
        let under: Vec<Vec2> = g.points(PointPass::Undergrowth).map(|c| c.position).collect();
        assert_eq!(canopy.len(), 180);
        assert_eq!(under.len(), 360);

        let spacing = s.grid_spacing as f32;
        assert!(min_pairwise(&canopy, &canopy, true) * spacing >= 2.0 - 1e-4);
        assert!(min_pairwise(&canopy, &under, false) * spacing >= 1.5 - 1e-4);
        assert!(min_pairwise(&under, &under, true) * spacing >= 1.0 - 1e-4);
    }

    #[test]
    fn points_stay_in_their_own_cell() {
        let s = sampler(Some(5_000));
        let mut g = grid(100, 100);
        run_all(&mut g, &s, 3).unwrap();
        for cell in g.cells() {
            assert_eq!(cell.points(PointPass::Canopy).len(), cell.target(PointPass::Canopy));
            assert!(cell.all_points().all(|c| cell.bounds.contains(c.position)));
        }
    }

    #[test]
    fn same_seed_same_points_regardless_of_workers() {
        let s = sampler(Some(5_000));
        let mut a = grid(120, 200);
        let mut b = grid(120, 200);
        run_all(&mut a, &s, 11).unwrap();

        let pool = WorkerPool::new(Some(1)).unwrap();
        let mut parent = StdRng::seed_from_u64(11);
        for pass in PointPass::ORDERED {
            for color in 0..crate::grid::COLORS {
                s.sample_color(&mut b, color, pass, &pool, &mut parent).unwrap();
            }
        }

        let pa: Vec<Vec2> = a.points(PointPass::Undergrowth).map(|c| c.position).collect();
        let pb: Vec<Vec2> = b.points(PointPass::Undergrowth).map(|c| c.position).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn overfull_cell_fails_within_budget() {
        let s = sampler(Some(200));
        let mut g = SpatialGrid::partition(4.0, 4.0, 4.0).unwrap();
        g.allocate_points(500, 0, &mut StdRng::seed_from_u64(1));
        let err = s
            .sample_canopy(&g, 0, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        match err {
            Error::GenerationFailed {
                pass,
                cell,
                placed,
                target,
            } => {
                assert_eq!(pass, PointPass::Canopy);
                assert_eq!(cell, 0);
                assert_eq!(target, 500);
                assert!(placed < target);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn failed_color_writes_nothing() {
        let s = sampler(Some(50));
        let mut g = SpatialGrid::partition(4.0, 4.0, 4.0).unwrap();
        g.allocate_points(500, 0, &mut StdRng::seed_from_u64(1));
        let pool = WorkerPool::new(Some(2)).unwrap();
        let res = s.sample_color(
            &mut g,
            0,
            PointPass::Canopy,
            &pool,
            &mut StdRng::seed_from_u64(1),
        );
        assert!(res.unwrap_err().is_generation_failure());
        assert_eq!(g.point_count(PointPass::Canopy), 0);
    }
}

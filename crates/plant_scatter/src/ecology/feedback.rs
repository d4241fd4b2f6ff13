//! Shading and root uptake around placed plants.
//!
//! A placed plant attenuates sunlight and draws moisture at every sampled
//! coordinate near it. Placement tasks record these adjustments in a
//! [`FeedbackLog`] and read terrain values through it, so later placements in
//! the same task see earlier ones. The log is applied to the shared terrain
//! once the colour class has drained.
use std::collections::HashMap;

use glam::Vec2;

use crate::grid::{PointPass, SpatialGrid};
use crate::terrain::Terrain;

/// Units of the feedback radius check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedbackUnits {
    /// Compare grid-space distances directly against the update distance.
    #[default]
    Grid,
    /// Scale grid-space distances by the grid spacing first.
    World,
}

/// Which coordinates a placed plant affects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbioticFeedback {
    pub units: FeedbackUnits,
    pub grid_spacing: f64,
}

impl AbioticFeedback {
    pub fn new(units: FeedbackUnits, grid_spacing: f64) -> Self {
        Self {
            units,
            grid_spacing,
        }
    }

    /// Reach of a plant's influence, `1.5 x canopy_radius`.
    #[inline]
    pub fn update_distance(canopy_radius: f64) -> f64 {
        1.5 * canopy_radius
    }

    #[inline]
    fn within(&self, a: Vec2, b: Vec2, update_distance: f64) -> bool {
        let d = a.distance(b) as f64;
        match self.units {
            FeedbackUnits::Grid => d < update_distance,
            FeedbackUnits::World => d * self.grid_spacing < update_distance,
        }
    }

    /// Positions of all canopy and undergrowth coordinates in `cell` and its
    /// neighbours that lie within reach of a plant at `position`.
    pub fn affected(
        &self,
        grid: &SpatialGrid,
        cell: usize,
        position: Vec2,
        canopy_radius: f64,
    ) -> Vec<Vec2> {
        let reach = Self::update_distance(canopy_radius);
        grid.neighborhood(cell)
            .flat_map(|i| {
                let c = grid.cell(i);
                c.points(PointPass::Canopy)
                    .iter()
                    .chain(c.points(PointPass::Undergrowth))
            })
            .map(|c| c.position)
            .filter(|&p| self.within(position, p, reach))
            .collect()
    }
}

/// One recorded adjustment of a terrain pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelAdjust {
    pub pixel: (usize, usize),
    /// Sunlight is multiplied by this in every month.
    pub transparency: f64,
    /// Moisture is reduced by this in every month.
    pub absorption: f64,
}

/// Ordered adjustments with a per-pixel view for reads.
#[derive(Clone, Debug, Default)]
pub struct FeedbackLog {
    ops: Vec<PixelAdjust>,
    by_pixel: HashMap<(usize, usize), Vec<usize>>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn record(&mut self, pixel: (usize, usize), transparency: f64, absorption: f64) {
        self.by_pixel.entry(pixel).or_default().push(self.ops.len());
        self.ops.push(PixelAdjust {
            pixel,
            transparency,
            absorption,
        });
    }

    fn adjustments(&self, pixel: (usize, usize)) -> impl Iterator<Item = &PixelAdjust> {
        self.by_pixel
            .get(&pixel)
            .into_iter()
            .flatten()
            .map(|&i| &self.ops[i])
    }

    /// Sunlight at `pixel` for `month` with the logged adjustments applied.
    pub fn sunlight(&self, terrain: &Terrain, month: usize, pixel: (usize, usize)) -> f64 {
        self.adjustments(pixel)
            .fold(terrain.sunlight.get(month, pixel.0, pixel.1), |s, a| {
                s * a.transparency
            })
    }

    /// Moisture at `pixel` for `month` with the logged adjustments applied.
    pub fn moisture(&self, terrain: &Terrain, month: usize, pixel: (usize, usize)) -> f64 {
        self.adjustments(pixel)
            .fold(terrain.moisture.get(month, pixel.0, pixel.1), |m, a| {
                m - a.absorption
            })
    }

    /// Apply every adjustment to the terrain, in recording order.
    pub fn apply(&self, terrain: &mut Terrain) {
        for op in &self.ops {
            let (x, y) = op.pixel;
            terrain.sunlight.scale_pixel(x, y, op.transparency);
            terrain.moisture.subtract_pixel(x, y, op.absorption);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coordinate;
    use crate::terrain::{MonthlyRaster, Raster, MONTHS};

    fn terrain() -> Terrain {
        let flat = |v| MonthlyRaster::uniform(Raster::filled(8, 8, v));
        Terrain::new(Raster::zeros(8, 8), 2.0, 46.0, flat(100.0), flat(10.0), flat(50.0)).unwrap()
    }

    #[test]
    fn update_distance_is_one_and_a_half_radii() {
        assert_eq!(AbioticFeedback::update_distance(2.0), 3.0);
    }

    #[test]
    fn affected_respects_units() {
        let mut grid = SpatialGrid::partition(7.0, 7.0, 7.0).unwrap();
        let points = grid.cell_mut(0).points_mut(PointPass::Canopy);
        points.push(Coordinate::new(Vec2::new(1.0, 1.0)));
        points.push(Coordinate::new(Vec2::new(3.0, 1.0)));
        grid.cell_mut(0)
            .points_mut(PointPass::Undergrowth)
            .push(Coordinate::new(Vec2::new(1.0, 2.5)));

        // reach 3.0
        let grid_units = AbioticFeedback::new(FeedbackUnits::Grid, 2.0);
        assert_eq!(grid_units.affected(&grid, 0, Vec2::new(1.0, 1.0), 2.0).len(), 3);

        let world_units = AbioticFeedback::new(FeedbackUnits::World, 2.0);
        let hit = world_units.affected(&grid, 0, Vec2::new(1.0, 1.0), 2.0);
        assert_eq!(hit, vec![Vec2::new(1.0, 1.0)]);

        // strictly closer than the reach of 1.5
        assert_eq!(grid_units.affected(&grid, 0, Vec2::new(1.0, 1.0), 1.0).len(), 1);
    }

    #[test]
    fn log_reads_see_earlier_adjustments() {
        let t = terrain();
        let mut log = FeedbackLog::new();
        log.record((2, 3), 0.5, 4.0);
        log.record((2, 3), 0.5, 4.0);
        log.record((5, 5), 0.9, 1.0);

        assert_eq!(log.sunlight(&t, 0, (2, 3)), 25.0);
        assert_eq!(log.moisture(&t, 11, (2, 3)), 42.0);
        assert_eq!(log.sunlight(&t, 0, (0, 0)), 100.0);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn apply_depletes_every_month_and_keeps_originals() {
        let mut t = terrain();
        let mut log = FeedbackLog::new();
        log.record((1, 1), 0.25, 60.0);
        log.apply(&mut t);
        for m in 0..MONTHS {
            assert_eq!(t.sunlight().get(m, 1, 1), 25.0);
            // moisture may go negative
            assert_eq!(t.moisture().get(m, 1, 1), -10.0);
            assert_eq!(t.sunlight().get(m, 0, 1), 100.0);
        }
        assert_eq!(t.original_sunlight().get(0, 1, 1), 100.0);
        assert_eq!(t.original_moisture().get(0, 1, 1), 50.0);
    }
}

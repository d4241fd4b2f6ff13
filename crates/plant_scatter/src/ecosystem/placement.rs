//! One placement task: score, select, derive and shade every coordinate of a cell.
use rand::RngCore;

use crate::ecology::{
    AbioticFeedback, AttributeDeriver, Conditions, FeedbackLog, RouletteSelector, ViabilityModel,
};
use crate::ecosystem::PlacedPlant;
use crate::error::{Error, Result};
use crate::grid::{PointPass, SpatialGrid};
use crate::species::SpeciesTable;
use crate::terrain::{Raster, Terrain, MONTHS};

/// What a cell task produced; merged into the shared state once its colour drains.
#[derive(Debug, Default)]
pub(crate) struct CellOutcome {
    /// Viability vector of every coordinate of the pass, in point order.
    pub(crate) viabilities: Vec<Vec<f64>>,
    pub(crate) plants: Vec<PlacedPlant>,
    pub(crate) log: FeedbackLog,
}

/// Monthly abiotic values at `pixel` with the adjustments of `log` applied.
pub(crate) fn read_conditions(
    terrain: &Terrain,
    slope: &Raster,
    log: &FeedbackLog,
    pixel: (usize, usize),
) -> Conditions {
    let (x, y) = pixel;
    let mut conditions = Conditions {
        sunlight: [0.0; MONTHS],
        moisture: [0.0; MONTHS],
        temperature: [0.0; MONTHS],
        slope: slope.get(x, y),
    };
    for m in 0..MONTHS {
        conditions.sunlight[m] = log.sunlight(terrain, m, pixel);
        conditions.moisture[m] = log.moisture(terrain, m, pixel);
        conditions.temperature[m] = terrain.temperature().get(m, x, y);
    }
    conditions
}

/// Read-only view shared by all tasks of one colour class.
pub(crate) struct PlacementContext<'a> {
    pub(crate) species: &'a SpeciesTable,
    pub(crate) terrain: &'a Terrain,
    pub(crate) slope: &'a Raster,
    pub(crate) grid: &'a SpatialGrid,
    pub(crate) attributes: &'a AttributeDeriver,
    pub(crate) feedback: AbioticFeedback,
}

impl PlacementContext<'_> {
    /// Monthly abiotic values at `pixel`, seen through the task's pending feedback.
    pub(crate) fn conditions(&self, log: &FeedbackLog, pixel: (usize, usize)) -> Conditions {
        read_conditions(self.terrain, self.slope, log, pixel)
    }

    /// Process every coordinate of `cell` in `pass`, in point order.
    pub(crate) fn place_cell(
        &self,
        cell: usize,
        pass: PointPass,
        rng: &mut dyn RngCore,
    ) -> Result<CellOutcome> {
        let model = ViabilityModel::new(self.species);
        let points = self.grid.cell(cell).points(pass);
        let mut outcome = CellOutcome {
            viabilities: Vec::with_capacity(points.len()),
            ..Default::default()
        };

        for (i, coord) in points.iter().enumerate() {
            let pos = coord.position;
            let pixel = self.terrain.pixel_of(pos.x, pos.y);
            let conditions = self.conditions(&outcome.log, pixel);
            if !conditions.is_finite() {
                return Err(Error::NonFiniteConditions { pixel });
            }
            let viabilities = model.average_viability(&conditions);

            if let Some(selection) = RouletteSelector::new(&viabilities).spin(rng) {
                let profile = self.species.get(selection.species)?;
                let attributes = self.attributes.derive(
                    profile,
                    selection.vigour,
                    pixel,
                    pass == PointPass::Canopy,
                    rng,
                );

                for p in self
                    .feedback
                    .affected(self.grid, cell, pos, attributes.canopy_radius)
                {
                    outcome.log.record(
                        self.terrain.pixel_of(p.x, p.y),
                        profile.leaf_transparency,
                        profile.moisture_absorption,
                    );
                }

                outcome.plants.push(PlacedPlant::new(
                    selection.species,
                    pos,
                    (cell, i),
                    pass,
                    selection.vigour,
                    attributes,
                ));
            }

            outcome.viabilities.push(viabilities);
        }

        Ok(outcome)
    }
}

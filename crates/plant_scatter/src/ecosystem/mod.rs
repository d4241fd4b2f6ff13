//! Pipeline orchestration: terrain, grid, points, slope, plants.
//!
//! [`Ecosystem`] owns all per-run state and advances through [`Stage`]s in a
//! fixed order. Sampling and placement process the grid colour by colour: the
//! cells of one colour run as parallel tasks against a read-only snapshot of
//! the shared state, and their results are merged in cell order before the
//! next colour starts. Runs are therefore reproducible for a given seed
//! regardless of the number of worker threads.
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::ecology::{AbioticFeedback, AttributeDeriver, FeedbackLog, ViabilityModel};
use crate::error::{Error, Result};
use crate::grid::{Cell, PointPass, SpatialGrid, COLORS};
use crate::pool::WorkerPool;
use crate::sampling::{split_seeds, PinkNoiseSampler};
use crate::species::SpeciesTable;
use crate::terrain::{derive_slope, MonthlyRaster, Raster, Terrain, TerrainSource};

pub mod config;
pub mod events;
mod placement;
pub mod plant;

pub use config::{EcosystemConfig, SamplerArgs};
pub use events::{EcosystemEvent, EventKind, EventSink, FnSink, MultiSink, VecSink};
pub use plant::PlacedPlant;

use placement::{read_conditions, CellOutcome, PlacementContext};

/// Pipeline stages, in the only order they can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Uninitialized,
    TerrainLoaded,
    GridInitialized,
    PointsSampled,
    SlopeDerived,
    PlantsAssigned,
}

/// Point counts after sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinkNoiseSummary {
    pub cells: usize,
    pub canopy_points: usize,
    pub undergrowth_points: usize,
}

/// Plant counts after assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementSummary {
    pub coordinates_scored: usize,
    pub canopy_plants: usize,
    pub undergrowth_plants: usize,
}

impl PlacementSummary {
    pub fn total_plants(&self) -> usize {
        self.canopy_plants + self.undergrowth_plants
    }
}

/// Owns the inputs, intermediate state and results of one placement run.
#[derive(Debug)]
pub struct Ecosystem {
    config: EcosystemConfig,
    species: SpeciesTable,
    stage: Stage,
    rng: StdRng,
    pool: WorkerPool,
    terrain: Option<Terrain>,
    grid: Option<SpatialGrid>,
    slope: Option<Raster>,
    plants: Vec<PlacedPlant>,
    pink_noise_failed: bool,
}

fn missing(what: &str) -> Error {
    Error::Other(format!("{what} is not available at this stage"))
}

impl Ecosystem {
    /// Validate the configuration and start the worker pool.
    pub fn new(config: EcosystemConfig, species: SpeciesTable) -> Result<Self> {
        config.validate()?;
        if species.is_empty() {
            return Err(Error::InvalidConfig("species table is empty".into()));
        }
        let pool = WorkerPool::new(config.workers)?;
        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            species,
            stage: Stage::Uninitialized,
            pool,
            terrain: None,
            grid: None,
            slope: None,
            plants: Vec::new(),
            pink_noise_failed: false,
        })
    }

    fn expect_stage(&self, expected: Stage) -> Result<()> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(Error::InvalidStage {
                expected,
                actual: self.stage,
            })
        }
    }

    fn advance(&mut self, stage: Stage, sink: &mut dyn EventSink) {
        self.stage = stage;
        debug!("Ecosystem reached stage {:?}.", stage);
        if sink.wants(EventKind::StageCompleted) {
            sink.send(EcosystemEvent::StageCompleted { stage });
        }
    }

    /// Load and validate terrain tensors.
    pub fn load_terrain(&mut self, source: &dyn TerrainSource) -> Result<()> {
        self.load_terrain_with_events(source, &mut ())
    }

    pub fn load_terrain_with_events(
        &mut self,
        source: &dyn TerrainSource,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        self.expect_stage(Stage::Uninitialized)?;
        info!("Loading terrain...");
        let terrain = source.load()?;
        terrain.validate()?;
        self.config
            .validate_for_terrain(terrain.dims(), terrain.grid_spacing())?;
        self.terrain = Some(terrain);
        self.advance(Stage::TerrainLoaded, sink);
        Ok(())
    }

    /// Partition the terrain and assign per-cell point budgets.
    pub fn initialise_grid(&mut self) -> Result<()> {
        self.initialise_grid_with_events(&mut ())
    }

    pub fn initialise_grid_with_events(&mut self, sink: &mut dyn EventSink) -> Result<()> {
        self.expect_stage(Stage::TerrainLoaded)?;
        let terrain = self.terrain.as_ref().ok_or_else(|| missing("terrain"))?;
        let cell_size = self.config.effective_cell_size(terrain.grid_spacing());
        let mut grid = SpatialGrid::for_terrain(terrain.dims(), cell_size)?;
        grid.allocate_points(
            self.config.sampler.canopy_points,
            self.config.sampler.undergrowth_points,
            &mut self.rng,
        );
        info!(
            "Grid initialised with {} cells ({} rows x {} cols).",
            grid.len(),
            grid.rows(),
            grid.cols()
        );
        self.grid = Some(grid);
        self.advance(Stage::GridInitialized, sink);
        Ok(())
    }

    /// Sample canopy points for every colour, then undergrowth points.
    ///
    /// On failure all sampled points are discarded, [`Ecosystem::pink_noise_failed`]
    /// is set and the stage stays at [`Stage::GridInitialized`].
    pub fn generate_pink_noise(&mut self) -> Result<PinkNoiseSummary> {
        self.generate_pink_noise_with_events(&mut ())
    }

    pub fn generate_pink_noise_with_events(
        &mut self,
        sink: &mut dyn EventSink,
    ) -> Result<PinkNoiseSummary> {
        self.expect_stage(Stage::GridInitialized)?;
        info!("Generating pink noise...");
        let grid_spacing = self
            .terrain
            .as_ref()
            .ok_or_else(|| missing("terrain"))?
            .grid_spacing();
        let sampler = PinkNoiseSampler {
            canopy_min_distance: self.config.sampler.canopy_min_distance,
            mid_min_distance: self.config.sampler.mid_min_distance,
            undergrowth_min_distance: self.config.sampler.undergrowth_min_distance,
            grid_spacing,
            rejection_budget: self.config.rejection_budget,
        };
        let grid = self.grid.as_mut().ok_or_else(|| missing("grid"))?;

        for pass in PointPass::ORDERED {
            for color in 0..COLORS {
                let cells = grid.cells_of_color(color).len();
                if sink.wants(EventKind::ColorStarted) {
                    sink.send(EcosystemEvent::ColorStarted { pass, color, cells });
                }
                match sampler.sample_color(grid, color, pass, &self.pool, &mut self.rng) {
                    Ok(produced) => {
                        if sink.wants(EventKind::ColorFinished) {
                            sink.send(EcosystemEvent::ColorFinished {
                                pass,
                                color,
                                produced,
                            });
                        }
                    }
                    Err(err) => {
                        grid.clear_points();
                        self.pink_noise_failed = true;
                        warn!("Pink noise generation failed: {}", err);
                        if sink.wants(EventKind::GenerationFailed) {
                            sink.send(EcosystemEvent::GenerationFailed {
                                message: err.to_string(),
                            });
                        }
                        return Err(err);
                    }
                }
            }
        }

        let summary = PinkNoiseSummary {
            cells: grid.len(),
            canopy_points: grid.point_count(PointPass::Canopy),
            undergrowth_points: grid.point_count(PointPass::Undergrowth),
        };
        info!(
            "Pink noise generated: {} canopy and {} undergrowth points.",
            summary.canopy_points, summary.undergrowth_points
        );
        self.pink_noise_failed = false;
        if sink.wants(EventKind::PinkNoiseFinished) {
            sink.send(EcosystemEvent::PinkNoiseFinished { summary });
        }
        self.advance(Stage::PointsSampled, sink);
        Ok(summary)
    }

    /// Derive the slope raster from the elevation.
    pub fn derive_slope(&mut self) -> Result<()> {
        self.derive_slope_with_events(&mut ())
    }

    pub fn derive_slope_with_events(&mut self, sink: &mut dyn EventSink) -> Result<()> {
        self.expect_stage(Stage::PointsSampled)?;
        let terrain = self.terrain.as_ref().ok_or_else(|| missing("terrain"))?;
        self.slope = Some(derive_slope(terrain.elevation(), terrain.grid_spacing()));
        self.advance(Stage::SlopeDerived, sink);
        Ok(())
    }

    /// Assign plants to canopy coordinates for every colour, then to undergrowth coordinates.
    ///
    /// If a task fails, sunlight, moisture, coordinate viabilities and the
    /// placed plants are restored to their state before this call.
    pub fn assign_plants(&mut self) -> Result<PlacementSummary> {
        self.assign_plants_with_events(&mut ())
    }

    pub fn assign_plants_with_events(
        &mut self,
        sink: &mut dyn EventSink,
    ) -> Result<PlacementSummary> {
        self.expect_stage(Stage::SlopeDerived)?;
        info!("Assigning plants...");

        let snapshot = {
            let terrain = self.terrain.as_ref().ok_or_else(|| missing("terrain"))?;
            (terrain.sunlight.clone(), terrain.moisture.clone(), self.plants.len())
        };

        match self.assign_passes(sink) {
            Ok(summary) => {
                if summary.total_plants() == 0 {
                    warn!("No plants were placed.");
                    if sink.wants(EventKind::Warning) {
                        sink.send(EcosystemEvent::Warning {
                            context: "assign_plants".into(),
                            message: "no coordinate produced a plant".into(),
                        });
                    }
                }
                info!(
                    "Placed {} canopy and {} undergrowth plants.",
                    summary.canopy_plants, summary.undergrowth_plants
                );
                if sink.wants(EventKind::PlacementFinished) {
                    sink.send(EcosystemEvent::PlacementFinished { summary });
                }
                self.advance(Stage::PlantsAssigned, sink);
                Ok(summary)
            }
            Err(err) => {
                warn!("Plant assignment failed, restoring terrain: {}", err);
                self.restore(snapshot);
                Err(err)
            }
        }
    }

    fn restore(&mut self, (sunlight, moisture, plants): (MonthlyRaster, MonthlyRaster, usize)) {
        if let Some(terrain) = self.terrain.as_mut() {
            terrain.sunlight = sunlight;
            terrain.moisture = moisture;
        }
        if let Some(grid) = self.grid.as_mut() {
            grid.clear_viabilities();
        }
        self.plants.truncate(plants);
    }

    fn assign_passes(&mut self, sink: &mut dyn EventSink) -> Result<PlacementSummary> {
        let Self {
            config,
            species,
            rng,
            pool,
            terrain,
            grid,
            slope,
            plants,
            ..
        } = self;
        let terrain = terrain.as_mut().ok_or_else(|| missing("terrain"))?;
        let grid = grid.as_mut().ok_or_else(|| missing("grid"))?;
        let slope = slope.as_ref().ok_or_else(|| missing("slope"))?;

        let attributes = AttributeDeriver::new(
            config.viability_threshold,
            config.default_age_cap,
            config.cohort_ages.clone(),
        );
        let feedback = AbioticFeedback::new(config.feedback_units, terrain.grid_spacing());
        let mut summary = PlacementSummary::default();

        for pass in PointPass::ORDERED {
            for color in 0..COLORS {
                let cells = grid.cells_of_color(color).to_vec();
                if cells.is_empty() {
                    debug!("Colour {} has no cells, skipping {} placement.", color, pass);
                    continue;
                }
                if sink.wants(EventKind::ColorStarted) {
                    sink.send(EcosystemEvent::ColorStarted {
                        pass,
                        color,
                        cells: cells.len(),
                    });
                }

                let tasks = split_seeds(rng, &cells);
                let ctx = PlacementContext {
                    species: &*species,
                    terrain: &*terrain,
                    slope,
                    grid: &*grid,
                    attributes: &attributes,
                    feedback,
                };
                let outcomes: Vec<(usize, CellOutcome)> = pool.drain(tasks, |cell, seed| {
                    ctx.place_cell(cell, pass, &mut StdRng::seed_from_u64(seed))
                })?;

                let mut produced = 0;
                for (cell, outcome) in outcomes {
                    let points = grid.cell_mut(cell).points_mut(pass);
                    for (coord, viabilities) in points.iter_mut().zip(outcome.viabilities) {
                        coord.set_viabilities(viabilities);
                        summary.coordinates_scored += 1;
                    }
                    outcome.log.apply(terrain);
                    produced += outcome.plants.len();
                    for plant in outcome.plants {
                        if sink.wants(EventKind::PlantPlaced) {
                            sink.send(EcosystemEvent::PlantPlaced {
                                plant: plant.clone(),
                            });
                        }
                        plants.push(plant);
                    }
                }

                match pass {
                    PointPass::Canopy => summary.canopy_plants += produced,
                    PointPass::Undergrowth => summary.undergrowth_plants += produced,
                }
                if sink.wants(EventKind::ColorFinished) {
                    sink.send(EcosystemEvent::ColorFinished {
                        pass,
                        color,
                        produced,
                    });
                }
            }
            debug!("Finished {} pass.", pass);
        }

        Ok(summary)
    }

    /// Run every remaining step from [`Stage::Uninitialized`] to [`Stage::PlantsAssigned`].
    pub fn run(&mut self, source: &dyn TerrainSource) -> Result<PlacementSummary> {
        self.run_with_events(source, &mut ())
    }

    pub fn run_with_events(
        &mut self,
        source: &dyn TerrainSource,
        sink: &mut dyn EventSink,
    ) -> Result<PlacementSummary> {
        self.load_terrain_with_events(source, sink)?;
        self.initialise_grid_with_events(sink)?;
        self.generate_pink_noise_with_events(sink)?;
        self.derive_slope_with_events(sink)?;
        self.assign_plants_with_events(sink)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    pub fn species(&self) -> &SpeciesTable {
        &self.species
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn grid(&self) -> Option<&SpatialGrid> {
        self.grid.as_ref()
    }

    pub fn slope(&self) -> Option<&Raster> {
        self.slope.as_ref()
    }

    /// Plants placed so far, canopy first, then in colour and cell order.
    pub fn placed_plants(&self) -> &[PlacedPlant] {
        &self.plants
    }

    /// Whether the last pink-noise generation gave up.
    pub fn pink_noise_failed(&self) -> bool {
        self.pink_noise_failed
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    /// The grid cell containing the grid-space point `(x, y)`.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<&Cell> {
        let grid = self.grid.as_ref()?;
        grid.cell_containing(x, y).map(|i| grid.cell(i))
    }

    /// Per-species viability at `(x, y)` against the current (possibly depleted) tensors.
    ///
    /// Available once the slope has been derived.
    pub fn viability_at(&self, x: f32, y: f32) -> Result<Vec<f64>> {
        if self.stage < Stage::SlopeDerived {
            return Err(Error::InvalidStage {
                expected: Stage::SlopeDerived,
                actual: self.stage,
            });
        }
        let terrain = self.terrain.as_ref().ok_or_else(|| missing("terrain"))?;
        let slope = self.slope.as_ref().ok_or_else(|| missing("slope"))?;
        let pixel = terrain.pixel_of(x, y);
        let conditions = read_conditions(terrain, slope, &FeedbackLog::new(), pixel);
        Ok(ViabilityModel::new(&self.species).average_viability(&conditions))
    }
}

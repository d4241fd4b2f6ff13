#![forbid(unsafe_code)]
//! plant_scatter: ecologically plausible, seed-reproducible plant placement over terrain.
//!
//! Modules:
//! - terrain: elevation and monthly abiotic rasters, terrain sources, slope derivation
//! - species: species profiles resolved to compact ids
//! - grid: coloured cell partition with neighbour lists and point lookup
//! - sampling: pink-noise rejection sampling of canopy and undergrowth points
//! - ecology: viability, roulette selection, growth attributes, abiotic feedback
//! - ecosystem: the staged pipeline, its configuration and events
//!
//! For examples, see the `plant_scatter_examples` crate.
pub mod ecology;
pub mod ecosystem;
pub mod error;
pub mod grid;
pub mod pool;
pub mod sampling;
pub mod species;
pub mod terrain;

/// Convenient re-exports for common types. Import with `use plant_scatter::prelude::*;`.
pub mod prelude {
    pub use crate::ecology::{
        AbioticFeedback, AttributeDeriver, Conditions, FeedbackUnits, PlantAttributes,
        RouletteSelector, Selection, ViabilityModel,
    };
    pub use crate::ecosystem::{
        Ecosystem, EcosystemConfig, EcosystemEvent, EventKind, EventSink, FnSink, MultiSink,
        PinkNoiseSummary, PlacedPlant, PlacementSummary, SamplerArgs, Stage, VecSink,
    };
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Cell, CellBounds, Coordinate, Direction, PointPass, SpatialGrid};
    pub use crate::pool::WorkerPool;
    pub use crate::sampling::PinkNoiseSampler;
    pub use crate::species::{SpeciesId, SpeciesProfile, SpeciesTable, Tolerance};
    pub use crate::terrain::{derive_slope, MonthlyRaster, Raster, Terrain, TerrainSource, MONTHS};
}

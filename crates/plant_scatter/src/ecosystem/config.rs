//! Per-run configuration of the placement pipeline.
use std::sync::Arc;

use crate::ecology::FeedbackUnits;
use crate::error::{Error, Result};
use crate::terrain::Raster;

/// Default cap on plant age when no cohort overlay value applies.
pub const DEFAULT_AGE_CAP: u32 = 350;

/// Default number of consecutive rejections before a cell gives up.
pub const DEFAULT_REJECTION_BUDGET: u32 = 10_000;

/// Cell edge length as a multiple of the canopy minimum distance.
const CELL_SIZE_FACTOR: f64 = 5.0;

/// Point counts and minimum distances for pink-noise sampling.
///
/// Distances are in world units.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerArgs {
    /// Total canopy points over the whole grid.
    pub canopy_points: usize,
    /// Total undergrowth points over the whole grid.
    pub undergrowth_points: usize,
    pub canopy_min_distance: f64,
    pub undergrowth_min_distance: f64,
    /// Minimum distance between undergrowth and canopy points.
    pub mid_min_distance: f64,
}

impl Default for SamplerArgs {
    fn default() -> Self {
        Self {
            canopy_points: 4000,
            undergrowth_points: 8000,
            canopy_min_distance: 2.0,
            undergrowth_min_distance: 1.0,
            mid_min_distance: 1.5,
        }
    }
}

impl SamplerArgs {
    pub fn new(
        canopy_points: usize,
        undergrowth_points: usize,
        canopy_min_distance: f64,
        undergrowth_min_distance: f64,
        mid_min_distance: f64,
    ) -> Self {
        Self {
            canopy_points,
            undergrowth_points,
            canopy_min_distance,
            undergrowth_min_distance,
            mid_min_distance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, d) in [
            ("canopy_min_distance", self.canopy_min_distance),
            ("undergrowth_min_distance", self.undergrowth_min_distance),
            ("mid_min_distance", self.mid_min_distance),
        ] {
            if !d.is_finite() || d <= 0.0 {
                return Err(Error::InvalidConfig(format!("{name} must be > 0")));
            }
        }
        Ok(())
    }

    /// Largest of the three minimum distances.
    pub fn max_min_distance(&self) -> f64 {
        self.canopy_min_distance
            .max(self.undergrowth_min_distance)
            .max(self.mid_min_distance)
    }
}

/// Immutable configuration shared by every step of one run.
#[non_exhaustive]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EcosystemConfig {
    /// Top-level seed; every random draw of the run derives from it.
    pub seed: u64,
    /// Vigour above which closed-canopy growth parameters apply.
    pub viability_threshold: f64,
    pub sampler: SamplerArgs,
    /// Grid cell edge in grid units. Defaults to five canopy minimum distances.
    ///
    /// Times the terrain's grid spacing it must cover the largest minimum distance.
    pub cell_size: Option<f32>,
    /// Consecutive rejections per cell before sampling fails; `None` never gives up.
    pub rejection_budget: Option<u32>,
    /// Worker threads; `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
    /// Age cap applied where the cohort overlay has no value.
    pub default_age_cap: u32,
    /// Units of the distance check in abiotic feedback.
    pub feedback_units: FeedbackUnits,
    /// Optional per-pixel maximum age; negative values mean "no cap".
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cohort_ages: Option<Arc<Raster>>,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            viability_threshold: 0.5,
            sampler: SamplerArgs::default(),
            cell_size: None,
            rejection_budget: Some(DEFAULT_REJECTION_BUDGET),
            workers: None,
            default_age_cap: DEFAULT_AGE_CAP,
            feedback_units: FeedbackUnits::Grid,
            cohort_ages: None,
        }
    }
}

impl EcosystemConfig {
    /// Creates a new [`EcosystemConfig`] with the given sampler arguments and seed.
    pub fn new(sampler: SamplerArgs, seed: u64) -> Self {
        Self {
            sampler,
            seed,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_viability_threshold(mut self, threshold: f64) -> Self {
        self.viability_threshold = threshold;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerArgs) -> Self {
        self.sampler = sampler;
        self
    }

    /// Overrides the grid cell size.
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    /// Sets the rejection budget; `None` retries forever.
    pub fn with_rejection_budget(mut self, budget: Option<u32>) -> Self {
        self.rejection_budget = budget;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_default_age_cap(mut self, cap: u32) -> Self {
        self.default_age_cap = cap;
        self
    }

    pub fn with_feedback_units(mut self, units: FeedbackUnits) -> Self {
        self.feedback_units = units;
        self
    }

    pub fn with_cohort_ages(mut self, cohort_ages: Raster) -> Self {
        self.cohort_ages = Some(Arc::new(cohort_ages));
        self
    }

    /// Cell size in grid units used to partition a terrain with `grid_spacing`.
    ///
    /// Defaults to five canopy minimum distances converted to grid units, never below 1.
    pub fn effective_cell_size(&self, grid_spacing: f64) -> f32 {
        self.cell_size.unwrap_or_else(|| {
            ((CELL_SIZE_FACTOR * self.sampler.canopy_min_distance / grid_spacing) as f32).max(1.0)
        })
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        if !self.viability_threshold.is_finite() {
            return Err(Error::InvalidConfig(
                "viability_threshold must be finite".into(),
            ));
        }
        if let Some(cell_size) = self.cell_size {
            if !cell_size.is_finite() || cell_size < 1.0 {
                return Err(Error::InvalidConfig(format!(
                    "cell_size must be >= 1, got {cell_size}"
                )));
            }
        }
        if self.workers == Some(0) {
            return Err(Error::InvalidConfig("workers must be > 0".into()));
        }
        if self.default_age_cap == 0 {
            return Err(Error::InvalidConfig("default_age_cap must be > 0".into()));
        }
        Ok(())
    }

    /// Checks the configuration against a terrain of `dims` pixels spaced `grid_spacing` apart.
    ///
    /// Cells of one colour are sampled concurrently and only see their direct
    /// neighbours, so a cell must be at least as wide as the largest minimum
    /// distance. The cohort overlay, if any, must match the terrain dimensions.
    pub fn validate_for_terrain(&self, dims: (usize, usize), grid_spacing: f64) -> Result<()> {
        let cell_world = self.effective_cell_size(grid_spacing) as f64 * grid_spacing;
        let widest = self.sampler.max_min_distance();
        if cell_world < widest {
            return Err(Error::InvalidConfig(format!(
                "cell size {cell_world} (world units) is below the largest minimum distance {widest}"
            )));
        }
        match &self.cohort_ages {
            Some(cohort) if cohort.dims() != dims => Err(Error::DimensionMismatch {
                what: "cohort ages".into(),
                expected: dims,
                actual: cohort.dims(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EcosystemConfig::default();
        config.validate().unwrap();
        assert_eq!(config.effective_cell_size(1.0), 10.0);
        assert_eq!(config.default_age_cap, 350);
        assert_eq!(config.rejection_budget, Some(DEFAULT_REJECTION_BUDGET));
    }

    #[test]
    fn builders_override_fields() {
        let config = EcosystemConfig::new(SamplerArgs::new(10, 20, 3.0, 1.0, 2.0), 9)
            .with_viability_threshold(0.3)
            .with_cell_size(4.0)
            .with_rejection_budget(None)
            .with_workers(2)
            .with_feedback_units(FeedbackUnits::World);
        assert_eq!(config.seed, 9);
        assert_eq!(config.effective_cell_size(0.25), 4.0);
        assert_eq!(config.rejection_budget, None);
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.feedback_units, FeedbackUnits::World);
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_values() {
        let base = EcosystemConfig::default();
        assert!(base.clone().with_cell_size(0.5).validate().is_err());
        assert!(base.clone().with_workers(0).validate().is_err());
        assert!(base.clone().with_default_age_cap(0).validate().is_err());
        assert!(base
            .clone()
            .with_sampler(SamplerArgs::new(1, 1, 0.0, 1.0, 1.0))
            .validate()
            .is_err());
        assert!(base.with_cell_size(f32::NAN).validate().is_err());
    }

    #[test]
    fn cohort_dims_must_match_terrain() {
        let config = EcosystemConfig::default().with_cohort_ages(Raster::filled(4, 4, -1.0));
        config.validate_for_terrain((4, 4), 1.0).unwrap();
        assert!(matches!(
            config.validate_for_terrain((4, 5), 1.0),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn default_cell_size_converts_to_grid_units() {
        let config = EcosystemConfig::new(SamplerArgs::new(10, 20, 1.0, 0.5, 0.75), 1);
        assert_eq!(config.effective_cell_size(1.0), 5.0);
        assert!((config.effective_cell_size(0.15) - 33.333_332).abs() < 1e-3);
        // coarse terrain never drops below one grid unit
        assert_eq!(config.effective_cell_size(20.0), 1.0);
        config.validate_for_terrain((64, 64), 0.15).unwrap();
        config.validate_for_terrain((64, 64), 20.0).unwrap();
    }

    #[test]
    fn cells_narrower_than_the_spacing_are_rejected() {
        let config = EcosystemConfig::new(SamplerArgs::new(10, 20, 5.0, 1.0, 1.5), 1)
            .with_cell_size(4.0);
        config.validate().unwrap();
        assert!(matches!(
            config.validate_for_terrain((64, 64), 1.0),
            Err(Error::InvalidConfig(_))
        ));
        // the same cells are wide enough on a coarser terrain
        config.validate_for_terrain((64, 64), 2.0).unwrap();

        // the widest of the three distances decides
        let config = EcosystemConfig::new(SamplerArgs::new(10, 20, 2.0, 1.0, 6.0), 1)
            .with_cell_size(5.0);
        assert!(config.validate_for_terrain((64, 64), 1.0).is_err());
    }
}

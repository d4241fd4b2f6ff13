//! Terrain tensors consumed by the placement pipeline.
//!
//! This module defines how external terrain data integrates into the core:
//! - Store elevation and monthly abiotic values in [`Terrain`].
//! - Provide terrain from any format by implementing [`TerrainSource`].
//! - Derive slope with [`derive_slope`].
//!
//! Parsing of on-disk formats is left to implementors of [`TerrainSource`]; the
//! core only ever sees the resulting tensors.
use tracing::debug;

use crate::error::{Error, Result};

pub mod raster;
pub mod slope;

pub use raster::{MonthlyRaster, Raster, MONTHS};
pub use slope::derive_slope;

/// Anything that can produce a [`Terrain`].
pub trait TerrainSource {
    /// Pixel dimensions `(dim_x, dim_y)` of the terrain this source produces.
    fn dims(&self) -> (usize, usize);

    /// Produce the terrain tensors.
    fn load(&self) -> Result<Terrain>;
}

/// Elevation, grid metadata and monthly abiotic tensors for one terrain.
///
/// Sunlight and moisture are depleted in place while plants are placed; the
/// values they were loaded with are kept in [`Terrain::original_sunlight`] and
/// [`Terrain::original_moisture`].
#[derive(Clone, Debug)]
pub struct Terrain {
    elevation: Raster,
    grid_spacing: f64,
    latitude: f64,
    pub(crate) sunlight: MonthlyRaster,
    temperature: MonthlyRaster,
    pub(crate) moisture: MonthlyRaster,
    original_sunlight: MonthlyRaster,
    original_moisture: MonthlyRaster,
}

impl Terrain {
    /// Bundle terrain tensors, failing fast if any dimension disagrees with the elevation.
    pub fn new(
        elevation: Raster,
        grid_spacing: f64,
        latitude: f64,
        sunlight: MonthlyRaster,
        temperature: MonthlyRaster,
        moisture: MonthlyRaster,
    ) -> Result<Self> {
        let terrain = Self {
            original_sunlight: sunlight.clone(),
            original_moisture: moisture.clone(),
            elevation,
            grid_spacing,
            latitude,
            sunlight,
            temperature,
            moisture,
        };
        terrain.validate()?;
        Ok(terrain)
    }

    /// Check that every tensor matches the elevation dimensions and the metadata is sane.
    pub fn validate(&self) -> Result<()> {
        let dims = self.elevation.dims();
        if dims.0 < 2 || dims.1 < 2 {
            return Err(Error::InvalidConfig(format!(
                "terrain must be at least 2x2 pixels, got {}x{}",
                dims.0, dims.1
            )));
        }
        if !self.grid_spacing.is_finite() || self.grid_spacing <= 0.0 {
            return Err(Error::InvalidConfig("grid_spacing must be > 0".into()));
        }
        for (what, tensor) in [
            ("sunlight", &self.sunlight),
            ("temperature", &self.temperature),
            ("moisture", &self.moisture),
        ] {
            if tensor.dims() != dims {
                return Err(Error::DimensionMismatch {
                    what: what.into(),
                    expected: dims,
                    actual: tensor.dims(),
                });
            }
        }
        if let Some((lo, hi)) = self.elevation.min_max() {
            debug!(
                "Terrain {}x{} validated, elevation {:.1}..{:.1}.",
                dims.0, dims.1, lo, hi
            );
        }
        Ok(())
    }

    /// Pixel dimensions `(dim_x, dim_y)`.
    pub fn dims(&self) -> (usize, usize) {
        self.elevation.dims()
    }

    /// Distance between adjacent pixels in world units.
    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn elevation(&self) -> &Raster {
        &self.elevation
    }

    /// Current (possibly depleted) sunlight.
    pub fn sunlight(&self) -> &MonthlyRaster {
        &self.sunlight
    }

    pub fn temperature(&self) -> &MonthlyRaster {
        &self.temperature
    }

    /// Current (possibly depleted) moisture.
    pub fn moisture(&self) -> &MonthlyRaster {
        &self.moisture
    }

    /// Sunlight as it was loaded, before any placement feedback.
    pub fn original_sunlight(&self) -> &MonthlyRaster {
        &self.original_sunlight
    }

    /// Moisture as it was loaded, before any placement feedback.
    pub fn original_moisture(&self) -> &MonthlyRaster {
        &self.original_moisture
    }

    /// Map a grid-space position to the nearest pixel, clamped into the terrain.
    pub fn pixel_of(&self, x: f32, y: f32) -> (usize, usize) {
        let (dim_x, dim_y) = self.dims();
        (round_to_pixel(x, dim_x), round_to_pixel(y, dim_y))
    }
}

impl TerrainSource for Terrain {
    fn dims(&self) -> (usize, usize) {
        Terrain::dims(self)
    }

    fn load(&self) -> Result<Terrain> {
        Ok(self.clone())
    }
}

/// Round half up to the nearest pixel index, clamped into `0..dim`.
#[inline]
pub(crate) fn round_to_pixel(v: f32, dim: usize) -> usize {
    let rounded = (v + 0.5).floor();
    if rounded <= 0.0 {
        0
    } else {
        (rounded as usize).min(dim.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(dim_x: usize, dim_y: usize) -> MonthlyRaster {
        MonthlyRaster::uniform(Raster::filled(dim_x, dim_y, 1.0))
    }

    #[test]
    fn new_rejects_mismatched_tensors() {
        let err = Terrain::new(
            Raster::zeros(4, 4),
            1.0,
            46.0,
            flat(4, 4),
            flat(4, 5),
            flat(4, 4),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { ref what, .. } if what == "temperature"));
    }

    #[test]
    fn new_rejects_bad_spacing_and_tiny_terrain() {
        assert!(Terrain::new(Raster::zeros(4, 4), 0.0, 0.0, flat(4, 4), flat(4, 4), flat(4, 4))
            .is_err());
        assert!(Terrain::new(Raster::zeros(1, 4), 1.0, 0.0, flat(1, 4), flat(1, 4), flat(1, 4))
            .is_err());
    }

    #[test]
    fn source_roundtrip_keeps_originals() {
        let terrain =
            Terrain::new(Raster::zeros(3, 3), 0.9, 46.0, flat(3, 3), flat(3, 3), flat(3, 3))
                .unwrap();
        let loaded = terrain.load().unwrap();
        assert_eq!(TerrainSource::dims(&terrain), (3, 3));
        assert_eq!(loaded.original_sunlight(), loaded.sunlight());
        assert_eq!(loaded.latitude(), 46.0);
    }

    #[test]
    fn pixel_rounding_is_half_up_and_clamped() {
        assert_eq!(round_to_pixel(1.49, 10), 1);
        assert_eq!(round_to_pixel(1.5, 10), 2);
        assert_eq!(round_to_pixel(-0.7, 10), 0);
        assert_eq!(round_to_pixel(42.0, 10), 9);
    }
}

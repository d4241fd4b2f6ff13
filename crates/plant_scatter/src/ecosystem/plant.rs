//! Plants accepted by the placement passes.
use glam::Vec2;

use crate::ecology::PlantAttributes;
use crate::grid::PointPass;
use crate::species::SpeciesId;

/// A plant placed at a sampled coordinate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedPlant {
    pub species: SpeciesId,
    /// Grid-space position of the coordinate the plant grows on.
    pub position: Vec2,
    /// Index of the grid cell owning the coordinate.
    pub cell: usize,
    /// Index of the coordinate within the cell's point list for its pass.
    pub point: usize,
    pub canopy: bool,
    /// Viability of the species at the coordinate when it was placed.
    pub vigour: f64,
    pub age: u32,
    pub height: f64,
    pub canopy_radius: f64,
}

impl PlacedPlant {
    pub(crate) fn new(
        species: SpeciesId,
        position: Vec2,
        (cell, point): (usize, usize),
        pass: PointPass,
        vigour: f64,
        attributes: PlantAttributes,
    ) -> Self {
        Self {
            species,
            position,
            cell,
            point,
            canopy: pass == PointPass::Canopy,
            vigour,
            age: attributes.age,
            height: attributes.height,
            canopy_radius: attributes.canopy_radius,
        }
    }

    pub fn pass(&self) -> PointPass {
        if self.canopy {
            PointPass::Canopy
        } else {
            PointPass::Undergrowth
        }
    }
}

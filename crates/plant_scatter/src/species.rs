//! Species parameter tables.
//!
//! Species are resolved to a compact [`SpeciesId`] once when the table is built;
//! everything downstream works with ids and never compares names.
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Index of a species in its [`SpeciesTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesId(pub u16);

impl SpeciesId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ideal value of an abiotic factor and how far from it a species still copes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance {
    pub ideal: f64,
    pub tolerance: f64,
}

impl Tolerance {
    pub const fn new(ideal: f64, tolerance: f64) -> Self {
        Self { ideal, tolerance }
    }
}

/// Growth and environment parameters of one species.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesProfile {
    pub name: String,
    /// Lifespan in years.
    pub lifespan: u32,
    /// Maximum height when growing in the open.
    pub max_height_open: f64,
    /// Maximum height when growing under a closed canopy.
    pub max_height_closed: f64,
    /// Steepness of the logistic height curve.
    pub q: f64,
    pub radius_multiplier_open: f64,
    pub radius_multiplier_closed: f64,
    /// Fraction of sunlight let through the crown, in `[0, 1]`.
    pub leaf_transparency: f64,
    /// Moisture removed from every covered pixel per month.
    pub moisture_absorption: f64,
    pub sunlight: Tolerance,
    pub moisture: Tolerance,
    pub temperature: Tolerance,
    pub slope: Tolerance,
}

impl SpeciesProfile {
    fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidConfig("species name must not be empty".into()));
        }
        if self.lifespan == 0 {
            return Err(Error::InvalidConfig(format!(
                "species '{}' lifespan must be > 0",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.leaf_transparency) {
            return Err(Error::InvalidConfig(format!(
                "species '{}' leaf_transparency must be within [0, 1]",
                self.name
            )));
        }
        if !self.moisture_absorption.is_finite() || self.moisture_absorption < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "species '{}' moisture_absorption must be finite and >= 0",
                self.name
            )));
        }
        for (field, v) in [
            ("max_height_open", self.max_height_open),
            ("max_height_closed", self.max_height_closed),
            ("q", self.q),
            ("radius_multiplier_open", self.radius_multiplier_open),
            ("radius_multiplier_closed", self.radius_multiplier_closed),
        ] {
            if !v.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "species '{}' {field} must be finite",
                    self.name
                )));
            }
        }
        for (factor, t) in [
            ("sunlight", self.sunlight),
            ("moisture", self.moisture),
            ("temperature", self.temperature),
            ("slope", self.slope),
        ] {
            if !t.tolerance.is_finite() || t.tolerance <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "species '{}' {factor} tolerance must be > 0",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Immutable, ordered set of species profiles.
#[derive(Clone, Debug, Default)]
pub struct SpeciesTable {
    profiles: Vec<SpeciesProfile>,
    by_name: HashMap<String, SpeciesId>,
}

impl SpeciesTable {
    /// Build a table, validating every profile and rejecting duplicate names.
    pub fn new(profiles: Vec<SpeciesProfile>) -> Result<Self> {
        if profiles.len() > u16::MAX as usize {
            return Err(Error::InvalidConfig("too many species".into()));
        }
        let mut by_name = HashMap::with_capacity(profiles.len());
        for (i, profile) in profiles.iter().enumerate() {
            profile.validate()?;
            if by_name
                .insert(profile.name.clone(), SpeciesId(i as u16))
                .is_some()
            {
                return Err(Error::InvalidConfig(format!(
                    "duplicate species '{}'",
                    profile.name
                )));
            }
        }
        Ok(Self { profiles, by_name })
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Resolve a species name to its id.
    pub fn id_of(&self, name: &str) -> Result<SpeciesId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownSpecies { name: name.into() })
    }

    /// Look up a profile by id.
    pub fn get(&self, id: SpeciesId) -> Result<&SpeciesProfile> {
        self.profiles
            .get(id.index())
            .ok_or_else(|| Error::UnknownSpecies {
                name: id.to_string(),
            })
    }

    /// Name of the species with the given id.
    pub fn name(&self, id: SpeciesId) -> Result<&str> {
        self.get(id).map(|p| p.name.as_str())
    }

    /// Species names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    /// `(id, profile)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (SpeciesId, &SpeciesProfile)> {
        self.profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (SpeciesId(i as u16), p))
    }
}

//! Species viability against monthly abiotic conditions.
//!
//! A species' response to one factor follows a bell-shaped adaptation curve
//! around its ideal value. Monthly viability is limited by the worst factor and
//! floored at zero; the yearly score is the mean over all months.
use crate::species::{SpeciesProfile, SpeciesTable, Tolerance};
use crate::terrain::MONTHS;

/// `ln(0.2)`; sets the curve to `-0.2 + 1.2 * 0.2 = 0.04` at `d == tolerance`.
const LN_FLOOR: f64 = -1.6094379124341003;
const SHAPE_EXPONENT: f64 = 4.5;
const FLOOR: f64 = 0.2;

/// Abiotic values at one pixel for every month.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditions {
    pub sunlight: [f64; MONTHS],
    pub moisture: [f64; MONTHS],
    pub temperature: [f64; MONTHS],
    pub slope: f64,
}

impl Conditions {
    /// The same values in every month.
    pub fn constant(sunlight: f64, moisture: f64, temperature: f64, slope: f64) -> Self {
        Self {
            sunlight: [sunlight; MONTHS],
            moisture: [moisture; MONTHS],
            temperature: [temperature; MONTHS],
            slope,
        }
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        self.slope.is_finite()
            && [&self.sunlight, &self.moisture, &self.temperature]
                .iter()
                .all(|m| m.iter().all(|v| v.is_finite()))
    }
}

#[inline]
pub fn distance(value: f64, ideal: f64) -> f64 {
    (value - ideal).abs()
}

/// Response to a deviation `d` from the ideal: `1` at `d == 0`, tending to `-0.2`.
#[inline]
pub fn adaptation(d: f64, tolerance: f64) -> f64 {
    (1.0 + FLOOR) * ((d / tolerance).powf(SHAPE_EXPONENT) * LN_FLOOR).exp() - FLOOR
}

#[inline]
fn factor(value: f64, t: Tolerance) -> f64 {
    adaptation(distance(value, t.ideal), t.tolerance)
}

/// Viability of `profile` for one month, limited by its worst factor.
pub fn monthly_viability(
    profile: &SpeciesProfile,
    sunlight: f64,
    moisture: f64,
    temperature: f64,
    slope: f64,
) -> f64 {
    let worst = factor(temperature, profile.temperature)
        .min(factor(moisture, profile.moisture))
        .min(factor(sunlight, profile.sunlight))
        .min(factor(slope, profile.slope));
    worst.max(0.0)
}

/// Scores every species of a table against [`Conditions`].
#[derive(Clone, Copy, Debug)]
pub struct ViabilityModel<'a> {
    species: &'a SpeciesTable,
}

impl<'a> ViabilityModel<'a> {
    pub fn new(species: &'a SpeciesTable) -> Self {
        Self { species }
    }

    /// Mean monthly viability of `profile`.
    pub fn average_for(profile: &SpeciesProfile, conditions: &Conditions) -> f64 {
        let total: f64 = (0..MONTHS)
            .map(|m| {
                monthly_viability(
                    profile,
                    conditions.sunlight[m],
                    conditions.moisture[m],
                    conditions.temperature[m],
                    conditions.slope,
                )
            })
            .sum();
        total / MONTHS as f64
    }

    /// Mean viability per species, aligned with the table order.
    pub fn average_viability(&self, conditions: &Conditions) -> Vec<f64> {
        self.species
            .iter()
            .map(|(_, profile)| Self::average_for(profile, conditions))
            .collect()
    }
}

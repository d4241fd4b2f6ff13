//! Roulette-wheel species selection.
//!
//! The wheel is built from the species with positive viability. A first draw
//! picks a species proportionally to its viability; a second draw decides
//! whether it germinates at all, with the species' viability as probability.
use rand::RngCore;

use crate::sampling::rand01_f64;
use crate::species::SpeciesId;

/// Species with positive viability, in table order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidViabilities {
    pub species: Vec<SpeciesId>,
    pub values: Vec<f64>,
}

impl ValidViabilities {
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

/// Outcome of a successful spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub species: SpeciesId,
    /// Viability of the chosen species, also its germination probability.
    pub vigour: f64,
}

/// Drop every species whose viability is `<= 0`.
pub fn valid_viabilities(viabilities: &[f64]) -> ValidViabilities {
    let mut valid = ValidViabilities::default();
    for (i, &v) in viabilities.iter().enumerate() {
        if v > 0.0 {
            valid.species.push(SpeciesId(i as u16));
            valid.values.push(v);
        }
    }
    valid
}

/// Running sum prefixed by zero: `[a, b]` becomes `[0, a, a + b]`.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len() + 1);
    let mut sum = 0.0;
    out.push(sum);
    for v in values {
        sum += v;
        out.push(sum);
    }
    out
}

/// Selector over one coordinate's viability vector.
#[derive(Clone, Debug)]
pub struct RouletteSelector {
    valid: ValidViabilities,
    cumulative: Vec<f64>,
}

impl RouletteSelector {
    pub fn new(viabilities: &[f64]) -> Self {
        let valid = valid_viabilities(viabilities);
        let cumulative = cumulative(&valid.values);
        Self { valid, cumulative }
    }

    /// Sum of all positive viabilities.
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    pub fn valid(&self) -> &ValidViabilities {
        &self.valid
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Resolve a spin from explicit draws: `r1` in `[0, total)`, `r2` in `[0, 1)`.
    pub fn spin_with(&self, r1: f64, r2: f64) -> Option<Selection> {
        let upper = self.cumulative.iter().skip(1).position(|&c| c > r1)?;
        let vigour = self.valid.values[upper];
        (r2 < vigour).then(|| Selection {
            species: self.valid.species[upper],
            vigour,
        })
    }

    /// Spin the wheel. Returns `None` without drawing when no species is viable.
    pub fn spin(&self, rng: &mut dyn RngCore) -> Option<Selection> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let r1 = rand01_f64(rng) * total;
        let r2 = rand01_f64(rng);
        self.spin_with(r1, r2)
    }
}

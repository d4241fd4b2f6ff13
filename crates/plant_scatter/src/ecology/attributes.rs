//! Age, height and canopy radius of a placed plant.
use std::sync::Arc;

use rand::RngCore;

use crate::sampling::rand_int_inclusive;
use crate::species::SpeciesProfile;
use crate::terrain::Raster;

/// Derived growth attributes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantAttributes {
    pub age: u32,
    pub height: f64,
    pub canopy_radius: f64,
}

/// Logistic height of a plant of `age` years.
///
/// Negative `q` gives a curve that rises towards `max_height`.
#[inline]
pub fn height_for_age(age: u32, lifespan: u32, q: f64, max_height: f64) -> f64 {
    let exponent = (age as f64 / lifespan as f64) * q;
    (2.0 / (1.0 + exponent.exp()) - 1.0) * max_height
}

/// Derives [`PlantAttributes`] from vigour, species and the optional cohort overlay.
#[derive(Clone, Debug)]
pub struct AttributeDeriver {
    viability_threshold: f64,
    default_age_cap: u32,
    cohort: Option<Arc<Raster>>,
}

impl AttributeDeriver {
    pub fn new(viability_threshold: f64, default_age_cap: u32, cohort: Option<Arc<Raster>>) -> Self {
        Self {
            viability_threshold,
            default_age_cap,
            cohort,
        }
    }

    /// Whether a plant of this vigour grows under a closed canopy.
    #[inline]
    pub fn is_closed(&self, vigour: f64) -> bool {
        vigour > self.viability_threshold
    }

    /// Age cap at `pixel`: the cohort value if one is set there, else the default cap.
    ///
    /// Always at least 1.
    pub fn max_age(&self, profile: &SpeciesProfile, pixel: (usize, usize)) -> u32 {
        let cap = self
            .cohort
            .as_ref()
            .and_then(|c| c.try_get(pixel.0, pixel.1))
            .filter(|v| *v >= 0.0)
            .map(|v| v.floor().min(u32::MAX as f64) as u32)
            .unwrap_or(self.default_age_cap);
        profile.lifespan.min(cap).max(1)
    }

    /// Oldest age an undergrowth plant may reach under `max_age`.
    #[inline]
    pub fn undergrowth_ceiling(max_age: u32) -> u32 {
        (0.4 * max_age as f64).max(1.0).round() as u32
    }

    /// Draw an age, scaled by vigour and rounded up, never below 1.
    ///
    /// Canopy plants draw from `(ceiling, max_age]`, undergrowth from `[1, ceiling]`.
    pub fn age(&self, max_age: u32, canopy: bool, vigour: f64, rng: &mut dyn RngCore) -> u32 {
        let ceiling = Self::undergrowth_ceiling(max_age);
        let (lo, hi) = if canopy {
            ((ceiling + 1).min(max_age), max_age)
        } else {
            (1, ceiling)
        };
        let drawn = rand_int_inclusive(rng, lo as i64, hi as i64) as f64;
        ((drawn * vigour).ceil() as u32).max(1)
    }

    pub fn derive(
        &self,
        profile: &SpeciesProfile,
        vigour: f64,
        pixel: (usize, usize),
        canopy: bool,
        rng: &mut dyn RngCore,
    ) -> PlantAttributes {
        let (max_height, multiplier) = if self.is_closed(vigour) {
            (profile.max_height_closed, profile.radius_multiplier_closed)
        } else {
            (profile.max_height_open, profile.radius_multiplier_open)
        };

        let max_age = self.max_age(profile, pixel);
        let age = self.age(max_age, canopy, vigour, rng);
        let height = height_for_age(age, profile.lifespan, profile.q, max_height);

        PlantAttributes {
            age,
            height,
            canopy_radius: height * multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sampling::tests::FixedRng;
    use crate::species::tests::profile;

    fn deriver(cohort: Option<Raster>) -> AttributeDeriver {
        AttributeDeriver::new(0.5, 350, cohort.map(Arc::new))
    }

    #[test]
    fn max_age_prefers_cohort_overlay() {
        let mut overlay = Raster::filled(4, 4, -1.0);
        overlay.set(1, 2, 40.0);
        overlay.set(3, 3, 500.0);
        let d = deriver(Some(overlay));
        let mut p = profile("Oak");
        p.lifespan = 400;

        assert_eq!(d.max_age(&p, (1, 2)), 40);
        assert_eq!(d.max_age(&p, (3, 3)), 400);
        // no cap at this pixel
        assert_eq!(d.max_age(&p, (0, 0)), 350);
        assert_eq!(deriver(None).max_age(&p, (0, 0)), 350);

        p.lifespan = 120;
        assert_eq!(deriver(None).max_age(&p, (0, 0)), 120);
    }

    #[test]
    fn undergrowth_ceiling_rounds_and_floors_at_one() {
        assert_eq!(AttributeDeriver::undergrowth_ceiling(100), 40);
        assert_eq!(AttributeDeriver::undergrowth_ceiling(9), 4);
        assert_eq!(AttributeDeriver::undergrowth_ceiling(4), 2);
        assert_eq!(AttributeDeriver::undergrowth_ceiling(1), 1);
    }

    #[test]
    fn ages_fall_in_their_pass_ranges() {
        let d = deriver(None);
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..500 {
            let canopy = d.age(100, true, 1.0, &mut rng);
            assert!((41..=100).contains(&canopy));
            let under = d.age(100, false, 1.0, &mut rng);
            assert!((1..=40).contains(&under));
        }
    }

    #[test]
    fn age_scales_with_vigour_and_rounds_up() {
        let d = deriver(None);
        // lowest draw in each range
        let mut low = FixedRng { value: 0 };
        assert_eq!(d.age(100, true, 0.5, &mut low), 21);
        assert_eq!(d.age(100, false, 0.01, &mut low), 1);
        let mut high = FixedRng { value: u64::MAX };
        assert_eq!(d.age(100, true, 0.25, &mut high), 25);
    }

    #[test]
    fn tiny_max_age_never_draws_an_empty_range() {
        let d = deriver(None);
        let mut rng = StdRng::seed_from_u64(2);
        for max_age in 1..4 {
            for _ in 0..20 {
                let age = d.age(max_age, true, 1.0, &mut rng);
                assert!((1..=max_age).contains(&age));
            }
        }
    }

    #[test]
    fn height_follows_logistic_curve() {
        assert_eq!(height_for_age(0, 100, -1.0, 10.0), 0.0);
        let h = height_for_age(100, 100, -1.0, 10.0);
        assert!((h - 10.0 * (2.0 / (1.0 + (-1.0f64).exp()) - 1.0)).abs() < 1e-12);
        let young = height_for_age(10, 100, -5.0, 30.0);
        let old = height_for_age(90, 100, -5.0, 30.0);
        assert!(young < old && old < 30.0);
    }

    #[test]
    fn closed_parameters_apply_above_threshold() {
        let d = deriver(None);
        let p = profile("Oak");
        let open = d.derive(&p, 0.5, (0, 0), false, &mut FixedRng { value: u64::MAX });
        let closed = d.derive(&p, 0.6, (0, 0), false, &mut FixedRng { value: u64::MAX });
        // profile: open height 10 x1, closed height 20 x2
        assert!((open.canopy_radius - open.height).abs() < 1e-12);
        assert!((closed.canopy_radius - 2.0 * closed.height).abs() < 1e-12);
        assert_eq!(open.age, 20);
        assert_eq!(closed.age, 24);
    }
}

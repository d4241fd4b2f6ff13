#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use plant_scatter::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(3);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Gently sloped terrain with a seasonal climate, `dim x dim` pixels of 1 unit.
pub fn terrain(dim: usize) -> Terrain {
    let season = |m: usize| (std::f64::consts::PI * m as f64 / 11.0).sin();
    Terrain::new(
        Raster::from_fn(dim, dim, |x, y| 0.4 * x as f64 + 0.2 * y as f64),
        1.0,
        46.0,
        MonthlyRaster::from_fn(dim, dim, |m, _, _| 8.0 + 4.0 * season(m)),
        MonthlyRaster::from_fn(dim, dim, |m, _, _| 5.0 + 10.0 * season(m)),
        MonthlyRaster::from_fn(dim, dim, |_, _, y| 40.0 + 0.05 * y as f64),
    )
    .expect("valid bench terrain")
}

pub fn species(count: usize) -> SpeciesTable {
    let profiles = (0..count)
        .map(|i| SpeciesProfile {
            name: format!("species_{i}"),
            lifespan: 80 + 40 * i as u32,
            max_height_open: 8.0 + i as f64,
            max_height_closed: 12.0 + i as f64,
            q: -2.0,
            radius_multiplier_open: 0.3,
            radius_multiplier_closed: 0.2,
            leaf_transparency: 0.6,
            moisture_absorption: 0.3,
            sunlight: Tolerance::new(7.0 + i as f64, 6.0),
            moisture: Tolerance::new(42.0, 20.0),
            temperature: Tolerance::new(6.0 + i as f64, 12.0),
            slope: Tolerance::new(20.0, 25.0),
        })
        .collect();
    SpeciesTable::new(profiles).expect("valid bench species")
}

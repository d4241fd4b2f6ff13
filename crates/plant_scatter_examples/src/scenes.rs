use std::f64::consts::PI;

use plant_scatter::prelude::*;

/// Elevation of the valley floor in metres.
const BASE_ELEVATION: f64 = 1200.0;
/// Temperature drop per metre of elevation.
const LAPSE_RATE: f64 = 0.0065;

/// `0` in January, `1` around July.
fn season(month: usize) -> f64 {
    (PI * (month as f64 + 0.5) / 12.0).sin()
}

fn monthly_climate(
    dim: usize,
    elevation: &Raster,
    shade: impl Fn(usize, usize) -> f64,
    wetness: impl Fn(usize, usize) -> f64,
) -> (MonthlyRaster, MonthlyRaster, MonthlyRaster) {
    let sunlight = MonthlyRaster::from_fn(dim, dim, |m, x, y| {
        (4.0 + 6.0 * season(m)) * shade(x, y)
    });
    let temperature = MonthlyRaster::from_fn(dim, dim, |m, x, y| {
        -4.0 + 18.0 * season(m) - LAPSE_RATE * (elevation.get(x, y) - BASE_ELEVATION)
    });
    let moisture = MonthlyRaster::from_fn(dim, dim, |m, x, y| {
        wetness(x, y) + 5.0 * (2.0 * PI * m as f64 / 12.0).cos()
    });
    (sunlight, temperature, moisture)
}

/// A north-running valley: steep flanks, a wet floor and a shaded west side.
pub fn valley_terrain(dim: usize, grid_spacing: f64) -> Result<Terrain> {
    let centre = dim as f64 / 2.0;
    let elevation = Raster::from_fn(dim, dim, |x, y| {
        let dx = (x as f64 - centre) * grid_spacing;
        BASE_ELEVATION + 0.01 * dx * dx + 0.5 * y as f64 * grid_spacing
    });
    let (sunlight, temperature, moisture) = monthly_climate(
        dim,
        &elevation,
        |x, _| if (x as f64) < centre { 0.85 } else { 1.0 },
        |x, _| 65.0 - 0.6 * (x as f64 - centre).abs(),
    );
    Terrain::new(elevation, grid_spacing, 46.5, sunlight, temperature, moisture)
}

/// A diagonal ridge that dries out towards its crest.
pub fn ridge_terrain(dim: usize, grid_spacing: f64) -> Result<Terrain> {
    let half = dim as f64 / 2.0;
    let elevation = Raster::from_fn(dim, dim, |x, y| {
        let off_crest = (x as f64 - y as f64).abs() / 2.0_f64.sqrt();
        BASE_ELEVATION + (half - off_crest).max(0.0) * 0.6 * grid_spacing
    });
    let crest_distance = |x: usize, y: usize| (x as f64 - y as f64).abs() / 2.0_f64.sqrt();
    let (sunlight, temperature, moisture) = monthly_climate(
        dim,
        &elevation,
        |x, y| if x > y { 1.0 } else { 0.8 },
        |x, y| 38.0 + 0.5 * crest_distance(x, y),
    );
    Terrain::new(elevation, grid_spacing, 46.5, sunlight, temperature, moisture)
}

/// Cohort overlay capping ages at `age` inside a disc, uncapped elsewhere.
pub fn cohort_patch(dim: usize, centre: (f64, f64), radius: f64, age: f64) -> Raster {
    Raster::from_fn(dim, dim, |x, y| {
        let (dx, dy) = (x as f64 - centre.0, y as f64 - centre.1);
        if dx * dx + dy * dy <= radius * radius {
            age
        } else {
            -1.0
        }
    })
}

#[allow(clippy::too_many_arguments)]
fn profile(
    name: &str,
    lifespan: u32,
    heights: (f64, f64),
    q: f64,
    radius_multipliers: (f64, f64),
    leaf_transparency: f64,
    moisture_absorption: f64,
    tolerances: [(f64, f64); 4],
) -> SpeciesProfile {
    let [sunlight, moisture, temperature, slope] = tolerances.map(|(i, t)| Tolerance::new(i, t));
    SpeciesProfile {
        name: name.into(),
        lifespan,
        max_height_open: heights.0,
        max_height_closed: heights.1,
        q,
        radius_multiplier_open: radius_multipliers.0,
        radius_multiplier_closed: radius_multipliers.1,
        leaf_transparency,
        moisture_absorption,
        sunlight,
        moisture,
        temperature,
        slope,
    }
}

/// Seven central-European montane species.
///
/// Tolerances are ordered sunlight, moisture, temperature, slope.
pub fn alpine_species() -> Result<SpeciesTable> {
    SpeciesTable::new(vec![
        profile("Boxwood", 150, (4.0, 6.0), -2.0, (0.5, 0.4), 0.4, 0.6,
            [(6.0, 5.0), (50.0, 25.0), (9.0, 14.0), (15.0, 25.0)]),
        profile("Snowy Mespilus", 60, (3.0, 4.0), -3.0, (0.6, 0.5), 0.5, 0.4,
            [(8.0, 5.0), (45.0, 25.0), (7.0, 14.0), (25.0, 25.0)]),
        profile("Mountain Pine", 300, (10.0, 15.0), -2.5, (0.3, 0.2), 0.3, 0.8,
            [(8.0, 6.0), (45.0, 30.0), (4.0, 14.0), (28.0, 25.0)]),
        profile("Silver Fir", 500, (45.0, 60.0), -1.5, (0.2, 0.15), 0.2, 1.2,
            [(5.0, 5.0), (58.0, 25.0), (6.0, 13.0), (12.0, 22.0)]),
        profile("Silver Birch", 100, (20.0, 25.0), -4.0, (0.25, 0.2), 0.6, 0.9,
            [(9.0, 5.0), (50.0, 25.0), (8.0, 15.0), (10.0, 25.0)]),
        profile("Sessile Oak", 800, (30.0, 40.0), -1.2, (0.3, 0.25), 0.3, 1.1,
            [(8.0, 5.0), (52.0, 22.0), (11.0, 13.0), (8.0, 20.0)]),
        profile("European Beech", 300, (35.0, 45.0), -1.8, (0.3, 0.25), 0.15, 1.0,
            [(6.0, 5.0), (60.0, 22.0), (9.0, 12.0), (14.0, 22.0)]),
    ])
}

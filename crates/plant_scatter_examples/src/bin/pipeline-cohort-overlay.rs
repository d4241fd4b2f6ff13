use plant_scatter::prelude::*;
use plant_scatter_examples::{alpine_species, cohort_patch, init_tracing, ridge_terrain};

const DIM: usize = 96;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let terrain = ridge_terrain(DIM, 1.0)?;
    // a young stand regrowing after a windthrow
    let cohort = cohort_patch(DIM, (48.0, 48.0), 20.0, 25.0);
    let config = EcosystemConfig::new(SamplerArgs::new(600, 1200, 2.0, 1.0, 1.5), 7)
        .with_cohort_ages(cohort);

    let mut ecosystem = Ecosystem::new(config, alpine_species()?)?;
    ecosystem.run(&terrain)?;

    let (inside, outside): (Vec<&PlacedPlant>, Vec<&PlacedPlant>) = ecosystem
        .placed_plants()
        .iter()
        .partition(|p| p.position.distance(glam::Vec2::new(48.0, 48.0)) <= 19.0);

    let mean_age = |plants: &[&PlacedPlant]| {
        if plants.is_empty() {
            0.0
        } else {
            plants.iter().map(|p| p.age as f64).sum::<f64>() / plants.len() as f64
        }
    };
    tracing::info!(
        "inside patch: {} plants, mean age {:.1}, oldest {}",
        inside.len(),
        mean_age(&inside),
        inside.iter().map(|p| p.age).max().unwrap_or(0)
    );
    tracing::info!(
        "outside patch: {} plants, mean age {:.1}, oldest {}",
        outside.len(),
        mean_age(&outside),
        outside.iter().map(|p| p.age).max().unwrap_or(0)
    );
    Ok(())
}

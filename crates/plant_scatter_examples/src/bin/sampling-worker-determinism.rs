use plant_scatter::prelude::*;
use plant_scatter_examples::{alpine_species, init_tracing, valley_terrain};

fn run(workers: usize) -> anyhow::Result<Ecosystem> {
    let config =
        EcosystemConfig::new(SamplerArgs::new(500, 1000, 2.0, 1.0, 1.5), 1234).with_workers(workers);
    let mut ecosystem = Ecosystem::new(config, alpine_species()?)?;
    ecosystem.run(&valley_terrain(80, 1.0)?)?;
    Ok(ecosystem)
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let reference = run(1)?;
    for workers in [2, 4, 8] {
        let other = run(workers)?;
        let same_plants = reference.placed_plants() == other.placed_plants();
        let same_tensors = match (reference.terrain(), other.terrain()) {
            (Some(a), Some(b)) => a.sunlight() == b.sunlight() && a.moisture() == b.moisture(),
            _ => false,
        };
        tracing::info!(
            "{workers} workers: {} plants, identical plants {same_plants}, identical tensors {same_tensors}",
            other.placed_plants().len()
        );
        anyhow::ensure!(same_plants && same_tensors, "{workers} workers diverged");
    }
    Ok(())
}

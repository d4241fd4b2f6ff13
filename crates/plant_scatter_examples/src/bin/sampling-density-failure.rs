use plant_scatter::prelude::*;
use plant_scatter_examples::{alpine_species, init_tracing, valley_terrain, ColorLogSink};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let terrain = valley_terrain(64, 1.0)?;
    // far more canopy points than fit at a 2 unit spacing
    let config = EcosystemConfig::new(SamplerArgs::new(20_000, 100, 2.0, 1.0, 1.5), 5)
        .with_rejection_budget(Some(2_000));

    let mut ecosystem = Ecosystem::new(config, alpine_species()?)?;
    let mut sink = ColorLogSink::default();
    ecosystem.load_terrain(&terrain)?;
    ecosystem.initialise_grid()?;

    match ecosystem.generate_pink_noise_with_events(&mut sink) {
        Ok(summary) => tracing::info!("unexpectedly sampled {:?}", summary),
        Err(err) => {
            tracing::info!(
                "sampling gave up ({err}); failed flag {}, stage {:?}, canopy points kept {}",
                ecosystem.pink_noise_failed(),
                ecosystem.stage(),
                ecosystem
                    .grid()
                    .map_or(0, |g| g.point_count(PointPass::Canopy))
            );
        }
    }
    Ok(())
}

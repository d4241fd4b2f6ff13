use plant_scatter::prelude::*;
use plant_scatter_examples::{
    alpine_species, init_tracing, log_depletion, log_species_counts, valley_terrain, ColorLogSink,
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let terrain = valley_terrain(128, 1.0)?;
    let species = alpine_species()?;
    let config = EcosystemConfig::new(SamplerArgs::new(1000, 2000, 2.0, 1.0, 1.5), 42);

    let mut ecosystem = Ecosystem::new(config, species)?;
    let mut sink = ColorLogSink::default();
    let summary = ecosystem.run_with_events(&terrain, &mut sink)?;

    tracing::info!(
        "{} coordinates scored, {} plants placed across {} colour classes on {} workers",
        summary.coordinates_scored,
        summary.total_plants(),
        sink.colors_finished,
        ecosystem.workers()
    );
    log_species_counts(&ecosystem);
    if let Some(terrain) = ecosystem.terrain() {
        log_depletion(terrain);
    }

    // the valley floor is wet and sheltered; the flanks are steep
    for (label, x) in [("west flank", 16.0), ("floor", 64.0), ("east flank", 112.0)] {
        let viabilities = ecosystem.viability_at(x, 64.0)?;
        let best = viabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, v)| (ecosystem.species().name(SpeciesId(i as u16)), *v));
        if let Some((Ok(name), v)) = best {
            tracing::info!("{label}: best suited is {name} ({v:.3})");
        }
    }
    Ok(())
}

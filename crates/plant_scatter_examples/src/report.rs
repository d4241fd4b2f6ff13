use plant_scatter::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Logs one line per finished colour class and every warning.
#[derive(Default)]
pub struct ColorLogSink {
    pub colors_finished: usize,
}

impl EventSink for ColorLogSink {
    fn send(&mut self, event: EcosystemEvent) {
        match event {
            EcosystemEvent::ColorFinished {
                pass,
                color,
                produced,
            } => {
                self.colors_finished += 1;
                info!("{pass} colour {color}: {produced} produced");
            }
            EcosystemEvent::Warning { context, message } => {
                info!("warning in {context}: {message}");
            }
            EcosystemEvent::GenerationFailed { message } => {
                info!("generation failed: {message}");
            }
            _ => {}
        }
    }

    fn wants(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::ColorFinished | EventKind::Warning | EventKind::GenerationFailed
        )
    }
}

/// Log plant counts and mean height per species, canopy and undergrowth apart.
pub fn log_species_counts(ecosystem: &Ecosystem) {
    let species = ecosystem.species();
    for (id, profile) in species.iter() {
        let mine = || {
            ecosystem
                .placed_plants()
                .iter()
                .filter(move |p| p.species == id)
        };
        let canopy = mine().filter(|p| p.canopy).count();
        let undergrowth = mine().filter(|p| !p.canopy).count();
        let total = canopy + undergrowth;
        let mean_height = if total == 0 {
            0.0
        } else {
            mine().map(|p| p.height).sum::<f64>() / total as f64
        };
        info!(
            "{:<16} canopy {:>5}  undergrowth {:>5}  mean height {:>6.2}",
            profile.name, canopy, undergrowth, mean_height
        );
    }
}

/// Log how much sunlight and moisture the placed plants consumed.
pub fn log_depletion(terrain: &Terrain) {
    let totals = |r: &MonthlyRaster| -> f64 {
        r.iter().map(|m| m.as_slice().iter().sum::<f64>()).sum()
    };
    for (what, now, then) in [
        ("sunlight", terrain.sunlight(), terrain.original_sunlight()),
        ("moisture", terrain.moisture(), terrain.original_moisture()),
    ] {
        let (now, then) = (totals(now), totals(then));
        let pct = if then.abs() > f64::EPSILON {
            100.0 * (then - now) / then
        } else {
            0.0
        };
        info!("{what}: {pct:.2}% consumed");
    }
}

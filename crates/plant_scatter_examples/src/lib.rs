#![forbid(unsafe_code)]

mod report;
mod scenes;

pub use report::{init_tracing, log_depletion, log_species_counts, ColorLogSink};
pub use scenes::{alpine_species, cohort_patch, ridge_terrain, valley_terrain};

//! Ecological models used while placing plants.
//!
//! - [`viability`]: per-species suitability of a coordinate.
//! - [`selection`]: roulette-wheel choice of at most one species.
//! - [`attributes`]: age, height and canopy radius of a placed plant.
//! - [`feedback`]: shading and moisture uptake around placed plants.
pub mod attributes;
pub mod feedback;
pub mod selection;
pub mod viability;

pub use attributes::{AttributeDeriver, PlantAttributes};
pub use feedback::{AbioticFeedback, FeedbackLog, FeedbackUnits, PixelAdjust};
pub use selection::{RouletteSelector, Selection, ValidViabilities};
pub use viability::{Conditions, ViabilityModel};

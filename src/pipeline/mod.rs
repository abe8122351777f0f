//! Deterministic scoring path: normalize → score → stratify → compose.

pub mod compose;
pub mod normalize;
pub mod risk;
pub mod scoring;

pub use compose::compose;
pub use normalize::{Normalizer, Observation};
pub use risk::{stratify, Stratification, StratificationRule};
pub use scoring::{score, top_matches};

//! Curated per-condition knowledge base.
//!
//! Loaded once at startup, validated atomically, then shared read-only
//! (behind an `Arc`) by every triage session.

pub mod base;
pub mod types;

use thiserror::Error;

pub use base::KnowledgeBase;
pub use types::{ConditionRecord, KnowledgeBaseDocument, RiskRule, TreatmentTiers, WeightedSymptom};

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Cannot read knowledge base {0}: {1}")]
    Io(String, String),

    #[error("Knowledge base is not valid: {0}")]
    Parse(String),

    #[error("Invalid condition record '{record}': {reason}")]
    InvalidRecord { record: String, reason: String },

    #[error("Duplicate condition id: {0}")]
    DuplicateId(String),

    #[error("Condition not found: {0}")]
    NotFound(String),
}

impl KnowledgeError {
    /// Errors that must halt startup. `NotFound` is a caller-side lookup error.
    pub fn is_load_error(&self) -> bool {
        !matches!(self, Self::NotFound(_))
    }
}

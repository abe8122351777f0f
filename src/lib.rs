pub mod advisory;
pub mod config;
pub mod engine;
pub mod knowledge;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

pub use advisory::{AdvisoryEnricher, GuidelineRetriever, MockAnnotator, OllamaAnnotator};
pub use config::EngineConfig;
pub use engine::{EngineError, TriageEngine, TriageSession};
pub use knowledge::{KnowledgeBase, KnowledgeError};
pub use models::{
    Advisory, AdvisoryStatus, ConditionScore, Language, RiskTier, SymptomEvidence, SymptomTag,
    TriageResult,
};
pub use pipeline::normalize::{Lexicon, Normalizer};

/// Install the global `fmt` subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

//! Optional advisory enrichment: LLM narrative and guideline snippets.
//!
//! Everything here is best-effort. Nothing in this module can change the
//! scores, priority or actions of a [`TriageResult`](crate::models::TriageResult);
//! it only produces an [`Advisory`](crate::models::Advisory) that is attached
//! afterwards.

pub mod enrich;
pub mod ollama;
pub mod prompt;
pub mod retrieval;
pub mod screen;

use thiserror::Error;

use crate::models::{GuidelineSnippet, Language};

pub use enrich::AdvisoryEnricher;
pub use ollama::{MockAnnotator, OllamaAnnotator};
pub use retrieval::GuidelineRetriever;

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("Annotator not reachable: {0}")]
    Connection(String),

    #[error("Annotator returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Advisory timed out after {0}ms")]
    Timeout(u64),

    #[error("Response parsing error: {0}")]
    Parse(String),

    #[error("Narrative rejected by safety screen: {0}")]
    Unsafe(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Untrusted text generator for patient-facing narrative.
pub trait NarrativeAnnotator: Send + Sync {
    fn annotate(&self, summary: &str, language: Language) -> Result<String, AdvisoryError>;
}

/// Source of supplementary, non-authoritative guideline passages.
pub trait SnippetRetriever: Send + Sync {
    fn retrieve(&self, query: &str) -> Result<Vec<GuidelineSnippet>, AdvisoryError>;
}

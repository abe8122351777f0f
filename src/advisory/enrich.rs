//! Timeout-bounded advisory enrichment.
//!
//! Collaborators are blocking (HTTP, file reads) so each call runs on the
//! blocking pool under one shared deadline. Dropping the returned future
//! abandons the enrichment; the scored result it was given stays valid.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::DEFAULT_ADVISORY_TIMEOUT_SECS;
use crate::models::{Advisory, AdvisoryStatus, GuidelineSnippet, TriageResult, ADVISORY_LABEL};

use super::prompt::build_summary;
use super::screen::screen_narrative;
use super::{AdvisoryError, NarrativeAnnotator, SnippetRetriever};

pub const DEFAULT_ADVISORY_TIMEOUT: Duration = Duration::from_secs(DEFAULT_ADVISORY_TIMEOUT_SECS);

#[derive(Clone)]
pub struct AdvisoryEnricher {
    annotator: Option<Arc<dyn NarrativeAnnotator>>,
    retriever: Option<Arc<dyn SnippetRetriever>>,
    timeout: Duration,
}

impl AdvisoryEnricher {
    /// An enricher with no collaborators; add them with the `with_*` builders.
    pub fn new(timeout: Duration) -> Self {
        Self {
            annotator: None,
            retriever: None,
            timeout,
        }
    }

    pub fn with_annotator(mut self, annotator: Arc<dyn NarrativeAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    pub fn with_retriever(mut self, retriever: Arc<dyn SnippetRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the advisory for `result`. Never fails: errors and timeouts
    /// degrade the status to `Partial` or `Unavailable`.
    pub async fn advise(&self, result: &TriageResult) -> Advisory {
        let deadline = Instant::now() + self.timeout;
        let mut attempted = 0usize;
        let mut succeeded = 0usize;

        let mut snippets: Vec<GuidelineSnippet> = Vec::new();
        if let (Some(retriever), Some(top)) = (&self.retriever, result.top_condition()) {
            attempted += 1;
            let retriever = Arc::clone(retriever);
            let query = top.condition_name.clone();
            match run_blocking(deadline, self.timeout, move || retriever.retrieve(&query)).await {
                Ok(found) => {
                    succeeded += 1;
                    snippets = found;
                }
                Err(e) => tracing::warn!(error = %e, "Guideline retrieval failed"),
            }
        }

        let mut narrative = None;
        if let Some(annotator) = &self.annotator {
            attempted += 1;
            let annotator = Arc::clone(annotator);
            let summary = build_summary(result, &snippets);
            let language = result.language;
            let outcome = run_blocking(deadline, self.timeout, move || {
                annotator.annotate(&summary, language)
            })
            .await
            .and_then(|text| screen_narrative(&text));
            match outcome {
                Ok(text) if !text.trim().is_empty() => {
                    succeeded += 1;
                    narrative = Some(text);
                }
                Ok(_) => tracing::warn!("Annotator returned empty narrative"),
                Err(e) => tracing::warn!(error = %e, "Narrative annotation failed"),
            }
        }

        let status = if succeeded == 0 {
            AdvisoryStatus::Unavailable
        } else if succeeded < attempted {
            AdvisoryStatus::Partial
        } else {
            AdvisoryStatus::Complete
        };

        tracing::info!(
            status = %status,
            attempted,
            succeeded,
            snippets = snippets.len(),
            "Advisory enrichment finished"
        );

        Advisory {
            label: ADVISORY_LABEL.to_string(),
            narrative,
            snippets,
            status,
        }
    }

    /// `result` with its advisory attached.
    pub async fn enrich(&self, result: TriageResult) -> TriageResult {
        let advisory = self.advise(&result).await;
        result.with_advisory(advisory)
    }
}

async fn run_blocking<T, F>(deadline: Instant, budget: Duration, f: F) -> Result<T, AdvisoryError>
where
    F: FnOnce() -> Result<T, AdvisoryError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout_at(deadline, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join)) => Err(AdvisoryError::Connection(format!("advisory worker failed: {join}"))),
        Err(_) => Err(AdvisoryError::Timeout(budget.as_millis() as u64)),
    }
}

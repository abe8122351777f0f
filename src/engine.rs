//! Top-level orchestration: free text in, [`TriageResult`] out.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::advisory::{AdvisoryEnricher, GuidelineRetriever, OllamaAnnotator};
use crate::config::{ConfigError, EngineConfig};
use crate::knowledge::{KnowledgeBase, KnowledgeError};
use crate::models::{Advisory, Language, SymptomEvidence, SymptomTag, TriageResult};
use crate::pipeline::normalize::{detect_language, Lexicon, LexiconError, Normalizer};
use crate::pipeline::{compose, score, stratify};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown red flag: {0}")]
    UnknownRedFlag(String),
}

/// Shared, immutable triage engine. Cheap to clone.
#[derive(Clone)]
pub struct TriageEngine {
    kb: Arc<KnowledgeBase>,
    normalizer: Arc<Normalizer>,
    default_language: Language,
    enricher: Option<AdvisoryEnricher>,
}

impl TriageEngine {
    pub fn new(kb: Arc<KnowledgeBase>, lexicon: Lexicon) -> Self {
        let normalizer = Normalizer::new(lexicon, &kb);
        Self {
            kb,
            normalizer: Arc::new(normalizer),
            default_language: Language::default(),
            enricher: None,
        }
    }

    /// Engine over the bundled knowledge base and lexicon, no advisory.
    pub fn bundled() -> Result<Self, EngineError> {
        let kb = KnowledgeBase::bundled()?;
        let lexicon = Lexicon::bundled()?;
        Ok(Self::new(Arc::new(kb), lexicon))
    }

    /// [`from_config`](Self::from_config) over `TRIAGE_*` environment variables.
    pub fn from_env() -> Result<Self, EngineError> {
        let config = EngineConfig::from_env()?;
        Self::from_config(&config)
    }

    /// Build everything `config` describes.
    ///
    /// Knowledge base and lexicon errors are fatal. Advisory collaborators
    /// that cannot be set up are logged and left out.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let kb = match &config.kb_path {
            Some(path) => KnowledgeBase::load(path)?,
            None => KnowledgeBase::bundled()?,
        };
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::load(path)?,
            None => Lexicon::bundled()?,
        };

        let mut engine = Self::new(Arc::new(kb), lexicon)
            .with_negation_window(config.negation_window)
            .with_default_language(config.default_language);

        let mut enricher =
            AdvisoryEnricher::new(Duration::from_secs(config.advisory_timeout_secs));
        let mut collaborators = 0;

        if let Some(dir) = &config.guidelines_dir {
            match GuidelineRetriever::load_dir(dir) {
                Ok(retriever) => {
                    enricher = enricher.with_retriever(Arc::new(retriever));
                    collaborators += 1;
                }
                Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "Guideline retrieval disabled"),
            }
        }
        if let Some(url) = config.annotator_url() {
            match OllamaAnnotator::new(url, &config.ollama_model, config.advisory_timeout_secs) {
                Ok(annotator) => {
                    enricher = enricher.with_annotator(Arc::new(annotator));
                    collaborators += 1;
                }
                Err(e) => tracing::warn!(url, error = %e, "Narrative annotation disabled"),
            }
        }
        if collaborators > 0 {
            engine = engine.with_enricher(enricher);
        }

        tracing::info!(
            conditions = engine.kb.len(),
            language = %engine.default_language,
            advisory = collaborators > 0,
            "Triage engine ready"
        );
        Ok(engine)
    }

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    pub fn with_negation_window(mut self, window: usize) -> Self {
        let normalizer = (*self.normalizer).clone().with_negation_window(window);
        self.normalizer = Arc::new(normalizer);
        self
    }

    pub fn with_enricher(mut self, enricher: AdvisoryEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Merge what `raw_text` says into `prior_evidence` and assess the result.
    ///
    /// Never fails: empty or unrecognisable text simply adds nothing.
    /// A newly stated duration replaces the prior one.
    pub fn triage(
        &self,
        raw_text: &str,
        prior_evidence: Option<&SymptomEvidence>,
        language_hint: Option<&str>,
    ) -> TriageResult {
        let hint = Language::from_hint(language_hint);
        let observation = self.normalizer.observe(raw_text, hint);

        let mut evidence = prior_evidence.cloned().unwrap_or_default();
        for tag in observation.tags {
            if self.kb.is_emergency_flag(tag.as_str()) {
                evidence.flag_red_flag(tag.clone());
            }
            evidence.report(tag);
        }
        if let Some(days) = observation.duration_days {
            evidence.set_duration_days(days);
        }

        let language = hint
            .or_else(|| detect_language(raw_text))
            .unwrap_or(self.default_language);

        self.assess(&evidence, language)
    }

    /// Score, stratify and compose for existing evidence.
    pub fn assess(&self, evidence: &SymptomEvidence, language: Language) -> TriageResult {
        let scores = score(evidence, &self.kb);
        let stratification = stratify(&scores, evidence);
        let result = compose(scores, stratification, &self.kb, evidence, language);

        tracing::info!(
            priority = result.priority,
            tier = %result.risk_tier,
            top = result.top_condition().map(|s| s.condition_id.as_str()),
            red_flags = result.red_flags_triggered.len(),
            "Triage assessed"
        );
        result
    }

    /// Attach advisory content. Without configured collaborators the advisory
    /// is marked unavailable.
    pub async fn enrich(&self, result: TriageResult) -> TriageResult {
        match &self.enricher {
            Some(enricher) => enricher.enrich(result).await,
            None => result.with_advisory(Advisory::unavailable()),
        }
    }

    pub fn session(&self) -> TriageSession {
        TriageSession::new(self.clone())
    }
}

/// One patient conversation. Owns its evidence; dropping the session
/// discards it.
pub struct TriageSession {
    id: Uuid,
    engine: TriageEngine,
    evidence: SymptomEvidence,
    language_hint: Option<String>,
}

impl TriageSession {
    fn new(engine: TriageEngine) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "Triage session started");
        Self {
            id,
            engine,
            evidence: SymptomEvidence::new(),
            language_hint: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn evidence(&self) -> &SymptomEvidence {
        &self.evidence
    }

    pub fn set_language_hint(&mut self, hint: Option<&str>) {
        self.language_hint = hint.map(str::to_string);
    }

    /// Add one patient message and reassess.
    pub fn submit(&mut self, text: &str) -> TriageResult {
        let result = self
            .engine
            .triage(text, Some(&self.evidence), self.language_hint.as_deref());
        self.evidence = result.evidence.clone();
        result
    }

    /// Raise a red flag reported outside free text (e.g. a checklist).
    pub fn flag_red_flag(&mut self, tag: &str) -> Result<TriageResult, EngineError> {
        let tag = SymptomTag::new(tag);
        if !self.engine.kb.is_known_tag(tag.as_str()) {
            return Err(EngineError::UnknownRedFlag(tag.to_string()));
        }
        tracing::warn!(session_id = %self.id, tag = %tag, "Red flag raised explicitly");
        self.evidence.flag_red_flag(tag);

        let language = Language::from_hint(self.language_hint.as_deref())
            .unwrap_or(self.engine.default_language);
        Ok(self.engine.assess(&self.evidence, language))
    }

    pub fn reset(&mut self) {
        self.evidence = SymptomEvidence::new();
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enums::{AdvisoryStatus, Language, RiskTier};
use super::symptom::{SymptomEvidence, SymptomTag};

/// Per-condition match against the current evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionScore {
    pub condition_id: String,
    pub condition_name: String,
    /// Weighted fraction of the condition's core symptoms present, in `[0, 1]`.
    pub match_fraction: f64,
    /// Core symptoms that were present, in the record's declared order.
    pub matched_tags: Vec<SymptomTag>,
    /// The condition's red flags present in the evidence.
    pub red_flags_present: Vec<SymptomTag>,
    pub red_flag_hit: bool,
    pub risk_tier: RiskTier,
}

impl ConditionScore {
    pub fn is_match(&self) -> bool {
        self.match_fraction > 0.0
    }

    /// Match fraction as a whole percentage, for display.
    pub fn likelihood_percent(&self) -> u8 {
        (self.match_fraction * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// One supplementary passage returned by the retrieval collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuidelineSnippet {
    pub source: String,
    pub text: String,
    pub relevance: f32,
}

/// Supplementary content attached after scoring. Never read by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub label: String,
    pub narrative: Option<String>,
    pub snippets: Vec<GuidelineSnippet>,
    pub status: AdvisoryStatus,
}

pub const ADVISORY_LABEL: &str = "Advisory only: not used for scoring or prioritisation";

impl Advisory {
    pub fn unavailable() -> Self {
        Self {
            label: ADVISORY_LABEL.to_string(),
            narrative: None,
            snippets: Vec::new(),
            status: AdvisoryStatus::Unavailable,
        }
    }
}

/// Immutable snapshot produced by one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageResult {
    /// Descending match fraction, ties broken by ascending condition id.
    pub ranked_scores: Vec<ConditionScore>,
    /// 1..=5, 5 = emergency.
    pub priority: u8,
    pub risk_tier: RiskTier,
    pub red_flags_triggered: BTreeSet<SymptomTag>,
    pub recommended_actions: Vec<String>,
    /// Unreported symptoms of the leading candidates, for follow-up questions.
    pub related_symptoms: Vec<SymptomTag>,
    /// True when no condition matched any reported symptom.
    pub insufficient_information: bool,
    pub language: Language,
    /// Evidence the result was computed from; pass it back for the next turn.
    pub evidence: SymptomEvidence,
    pub advisory: Option<Advisory>,
}

impl TriageResult {
    /// Highest-ranked condition with a non-zero match.
    pub fn top_condition(&self) -> Option<&ConditionScore> {
        self.ranked_scores.first().filter(|s| s.is_match())
    }

    /// Up to `n` conditions with a non-zero match, in rank order.
    pub fn top_matches(&self, n: usize) -> Vec<&ConditionScore> {
        self.ranked_scores.iter().filter(|s| s.is_match()).take(n).collect()
    }

    pub fn is_emergency(&self) -> bool {
        self.priority >= 5
    }

    /// New snapshot with the advisory field attached; scoring fields are untouched.
    pub fn with_advisory(mut self, advisory: Advisory) -> Self {
        self.advisory = Some(advisory);
        self
    }
}

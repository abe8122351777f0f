//! Per-condition match fraction, red-flag hit and risk tier.

use std::cmp::Ordering;

use crate::knowledge::{ConditionRecord, KnowledgeBase};
use crate::models::{ConditionScore, RiskTier, SymptomEvidence};

/// Score every condition against `evidence`.
///
/// Sorted by descending match fraction, ties by ascending condition id.
/// Conditions with no matching symptom are kept (fraction 0, tier low).
pub fn score(evidence: &SymptomEvidence, kb: &KnowledgeBase) -> Vec<ConditionScore> {
    for tag in evidence.reported_tags() {
        if !kb.is_known_tag(tag.as_str()) {
            tracing::warn!(tag = %tag, "Unknown symptom tag in evidence, not scored");
        }
    }

    let mut scores: Vec<ConditionScore> = kb
        .records()
        .iter()
        .filter(|r| !r.core_symptoms.is_empty())
        .map(|r| score_condition(r, evidence))
        .collect();

    scores.sort_by(rank_order);
    scores
}

/// Descending match fraction, then ascending condition id.
pub fn rank_order(a: &ConditionScore, b: &ConditionScore) -> Ordering {
    b.match_fraction
        .total_cmp(&a.match_fraction)
        .then_with(|| a.condition_id.cmp(&b.condition_id))
}

pub fn score_condition(record: &ConditionRecord, evidence: &SymptomEvidence) -> ConditionScore {
    let total = record.total_core_weight();
    let mut present = 0.0;
    let mut matched_tags = Vec::new();

    for symptom in &record.core_symptoms {
        if evidence.has_tag(symptom.tag.as_str()) {
            present += symptom.weight();
            matched_tags.push(symptom.tag.clone());
        }
    }

    let match_fraction = if total > 0.0 {
        (present / total).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let red_flags_present: Vec<_> = record
        .red_flags
        .iter()
        .filter(|t| evidence.has_tag(t.as_str()))
        .cloned()
        .collect();

    ConditionScore {
        condition_id: record.id.clone(),
        condition_name: record.name.clone(),
        match_fraction,
        matched_tags,
        red_flag_hit: !red_flags_present.is_empty(),
        red_flags_present,
        risk_tier: evaluate_risk_tier(record, evidence, match_fraction),
    }
}

/// First matching rule in declared order; `low` when none matches.
///
/// A condition with no matching symptom is always `low`.
pub fn evaluate_risk_tier(
    record: &ConditionRecord,
    evidence: &SymptomEvidence,
    match_fraction: f64,
) -> RiskTier {
    if match_fraction <= 0.0 {
        return RiskTier::Low;
    }
    record
        .risk_thresholds
        .iter()
        .find(|rule| rule.matches(evidence, match_fraction))
        .map(|rule| rule.tier)
        .unwrap_or(RiskTier::Low)
}

/// The first `n` scores with a non-zero match fraction.
pub fn top_matches(scores: &[ConditionScore], n: usize) -> Vec<&ConditionScore> {
    scores.iter().filter(|s| s.is_match()).take(n).collect()
}

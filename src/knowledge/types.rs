use serde::{Deserialize, Serialize};

use crate::models::{RiskTier, SymptomEvidence, SymptomTag, TreatmentTier};

/// Weight used when a core symptom does not declare one.
pub const DEFAULT_SYMPTOM_WEIGHT: f64 = 1.0;

/// Source document: one record per condition plus KB-wide emergency flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseDocument {
    #[serde(default)]
    pub version: Option<String>,
    /// Red flags that are not tied to any condition (e.g. seizure).
    #[serde(default)]
    pub emergency_flags: Vec<SymptomTag>,
    pub conditions: Vec<ConditionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub id: String,
    pub name: String,
    pub core_symptoms: Vec<WeightedSymptom>,
    pub red_flags: Vec<SymptomTag>,
    /// Evaluated in declared order; the first matching rule wins.
    pub risk_thresholds: Vec<RiskRule>,
    pub treatment_tiers: TreatmentTiers,
    pub source_reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedSymptom {
    pub tag: SymptomTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl WeightedSymptom {
    pub fn weight(&self) -> f64 {
        self.weight.unwrap_or(DEFAULT_SYMPTOM_WEIGHT)
    }
}

/// Maps a duration / match-fraction combination to a risk tier.
///
/// Every bound is optional. A duration bound only matches when the
/// duration is known. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_fraction_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_tags: Vec<SymptomTag>,
    pub tier: RiskTier,
}

impl RiskRule {
    pub fn matches(&self, evidence: &SymptomEvidence, match_fraction: f64) -> bool {
        let duration = evidence.duration_days();

        if let Some(min) = self.duration_min {
            match duration {
                Some(d) if d >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.duration_max {
            match duration {
                Some(d) if d <= max => {}
                _ => return false,
            }
        }
        if match_fraction < self.match_fraction_min.unwrap_or(0.0) {
            return false;
        }
        self.required_tags.iter().all(|t| evidence.has_tag(t.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentTiers {
    pub mild: String,
    pub moderate: String,
    pub severe: String,
}

impl TreatmentTiers {
    pub fn advice_for(&self, tier: TreatmentTier) -> &str {
        match tier {
            TreatmentTier::Mild => &self.mild,
            TreatmentTier::Moderate => &self.moderate,
            TreatmentTier::Severe => &self.severe,
        }
    }
}

impl ConditionRecord {
    pub fn is_core(&self, tag: &str) -> bool {
        self.core_symptoms.iter().any(|s| s.tag.as_str() == tag)
    }

    pub fn is_red_flag(&self, tag: &str) -> bool {
        self.red_flags.iter().any(|t| t.as_str() == tag)
    }

    /// Whether the record defines `tag` as a core symptom or red flag.
    pub fn defines(&self, tag: &str) -> bool {
        self.is_core(tag) || self.is_red_flag(tag)
    }

    pub fn total_core_weight(&self) -> f64 {
        self.core_symptoms.iter().map(WeightedSymptom::weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(json: &str) -> RiskRule {
        serde_json::from_str(json).unwrap()
    }

    fn evidence_with(duration: Option<f64>, tags: &[&str]) -> SymptomEvidence {
        let mut e = SymptomEvidence::new();
        for t in tags {
            e.report((*t).into());
        }
        if let Some(d) = duration {
            e.set_duration_days(d);
        }
        e
    }

    #[test]
    fn rule_without_bounds_always_matches() {
        let r = rule(r#"{"tier": "moderate"}"#);
        assert!(r.matches(&SymptomEvidence::new(), 0.0));
    }

    #[test]
    fn duration_bound_requires_known_duration() {
        let r = rule(r#"{"duration_min": 3, "tier": "high"}"#);
        assert!(!r.matches(&evidence_with(None, &[]), 1.0));
        assert!(!r.matches(&evidence_with(Some(2.0), &[]), 1.0));
        assert!(r.matches(&evidence_with(Some(3.0), &[]), 1.0));
    }

    #[test]
    fn duration_max_is_inclusive() {
        let r = rule(r#"{"duration_max": 2, "tier": "low"}"#);
        assert!(r.matches(&evidence_with(Some(2.0), &[]), 0.5));
        assert!(!r.matches(&evidence_with(Some(2.5), &[]), 0.5));
    }

    #[test]
    fn match_fraction_min_is_inclusive() {
        let r = rule(r#"{"match_fraction_min": 0.5, "tier": "moderate"}"#);
        assert!(r.matches(&SymptomEvidence::new(), 0.5));
        assert!(!r.matches(&SymptomEvidence::new(), 0.49));
    }

    #[test]
    fn required_tags_must_all_be_present() {
        let r = rule(r#"{"required_tags": ["cough", "fever"], "tier": "high"}"#);
        assert!(!r.matches(&evidence_with(None, &["cough"]), 1.0));
        assert!(r.matches(&evidence_with(None, &["fever", "cough"]), 1.0));
    }

    #[test]
    fn weight_defaults_to_one() {
        let s: WeightedSymptom = serde_json::from_str(r#"{"tag": "fever"}"#).unwrap();
        assert_eq!(s.weight(), DEFAULT_SYMPTOM_WEIGHT);
        let s: WeightedSymptom = serde_json::from_str(r#"{"tag": "fever", "weight": 2.5}"#).unwrap();
        assert_eq!(s.weight(), 2.5);
    }
}

use std::collections::HashSet;

use crate::knowledge::KnowledgeBase;
use crate::models::{ConditionScore, SymptomEvidence, SymptomTag};

/// Follow-up suggestions shown to the patient at most.
pub const RELATED_SYMPTOM_LIMIT: usize = 8;

/// Core symptoms of the matching conditions that the patient has not reported
/// yet, for follow-up questions.
///
/// Walks `scores` in rank order and each record's symptoms in declared order.
pub fn related_symptoms(
    scores: &[ConditionScore],
    evidence: &SymptomEvidence,
    kb: &KnowledgeBase,
    limit: usize,
) -> Vec<SymptomTag> {
    let mut seen = HashSet::new();
    let mut related = Vec::new();

    for score in scores.iter().filter(|s| s.is_match()) {
        let Ok(record) = kb.lookup(&score.condition_id) else {
            continue;
        };
        for symptom in &record.core_symptoms {
            if related.len() >= limit {
                return related;
            }
            let tag = &symptom.tag;
            if !evidence.has_tag(tag.as_str()) && seen.insert(tag.clone()) {
                related.push(tag.clone());
            }
        }
    }

    related
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::scoring::score;

    fn evidence(tags: &[&str]) -> SymptomEvidence {
        let mut e = SymptomEvidence::new();
        for t in tags {
            e.report((*t).into());
        }
        e
    }

    #[test]
    fn suggests_unreported_core_symptoms_in_rank_order() {
        let kb = KnowledgeBase::load_test();
        let e = evidence(&["fever", "blood_in_stool"]);
        let scores = score(&e, &kb);
        let related = related_symptoms(&scores, &e, &kb, RELATED_SYMPTOM_LIMIT);
        let tags: Vec<&str> = related.iter().map(|t| t.as_str()).collect();
        // diarrhoea first, then flu
        assert_eq!(tags, vec!["cramps", "cough", "headache", "muscle_pain"]);
    }

    #[test]
    fn respects_limit() {
        let kb = KnowledgeBase::bundled().unwrap();
        let e = evidence(&["fever", "headache"]);
        let scores = score(&e, &kb);
        assert_eq!(related_symptoms(&scores, &e, &kb, 3).len(), 3);
        assert!(related_symptoms(&scores, &e, &kb, RELATED_SYMPTOM_LIMIT).len() <= 8);
    }

    #[test]
    fn nothing_without_matches() {
        let kb = KnowledgeBase::load_test();
        let e = SymptomEvidence::new();
        let scores = score(&e, &kb);
        assert!(related_symptoms(&scores, &e, &kb, RELATED_SYMPTOM_LIMIT).is_empty());
    }
}

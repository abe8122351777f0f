//! Assemble the final [`TriageResult`] from scores and stratification.

pub mod messages;
pub mod related;

use crate::knowledge::KnowledgeBase;
use crate::models::{ConditionScore, Language, SymptomEvidence, TriageResult};

use super::risk::{Stratification, PRIORITY_URGENT};

pub use related::{related_symptoms, RELATED_SYMPTOM_LIMIT};

/// Build the result snapshot.
///
/// Actions, in order:
/// - treatment advice of the top-ranked condition for the overall tier, or
///   the insufficient-information line when nothing matched
/// - the triggered red flags, if any
/// - the seek-immediate-care line (plus local emergency numbers) at priority 4+
pub fn compose(
    scores: Vec<ConditionScore>,
    stratification: Stratification,
    kb: &KnowledgeBase,
    evidence: &SymptomEvidence,
    language: Language,
) -> TriageResult {
    let mut actions = Vec::new();

    let top = scores.first().filter(|s| s.is_match());
    let insufficient_information = top.is_none();

    match top.map(|s| kb.lookup(&s.condition_id)) {
        Some(Ok(record)) => {
            let tier = stratification.risk_tier.treatment_tier();
            actions.push(record.treatment_tiers.advice_for(tier).to_string());
        }
        Some(Err(e)) => {
            // Scores always come from the same knowledge base
            tracing::error!(error = %e, "Top condition missing from knowledge base");
        }
        None => {
            actions.push(messages::insufficient_information_i18n(language).to_string());
        }
    }

    if !stratification.red_flags_triggered.is_empty() {
        actions.push(messages::red_flags_line_i18n(
            language,
            &stratification.red_flags_triggered,
        ));
    }

    if stratification.priority >= PRIORITY_URGENT {
        actions.push(messages::seek_immediate_care_i18n(language).to_string());
        if let Some(contacts) = messages::emergency_contacts_i18n(language) {
            actions.push(contacts.to_string());
        }
    }

    let related_symptoms = related_symptoms(&scores, evidence, kb, RELATED_SYMPTOM_LIMIT);

    TriageResult {
        ranked_scores: scores,
        priority: stratification.priority,
        risk_tier: stratification.risk_tier,
        red_flags_triggered: stratification.red_flags_triggered,
        recommended_actions: actions,
        related_symptoms,
        insufficient_information,
        language,
        evidence: evidence.clone(),
        advisory: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{risk::stratify, scoring::score};

    fn run(tags: &[&str], duration: Option<f64>, flag: Option<&str>, lang: Language) -> TriageResult {
        let kb = KnowledgeBase::load_test();
        let mut evidence = SymptomEvidence::new();
        for t in tags {
            evidence.report((*t).into());
        }
        if let Some(d) = duration {
            evidence.set_duration_days(d);
        }
        if let Some(f) = flag {
            evidence.flag_red_flag(f.into());
        }
        let scores = score(&evidence, &kb);
        let strat = stratify(&scores, &evidence);
        compose(scores, strat, &kb, &evidence, lang)
    }

    #[test]
    fn advice_follows_overall_tier() {
        // flu low tier, fraction 0.5 → priority 2, mild advice
        let result = run(&["cough", "muscle_pain"], None, None, Language::En);
        assert_eq!(result.priority, 2);
        assert_eq!(result.recommended_actions, vec!["Rest and fluids.".to_string()]);
        assert!(!result.insufficient_information);
    }

    #[test]
    fn no_match_gives_insufficient_information() {
        let result = run(&[], None, None, Language::En);
        assert!(result.insufficient_information);
        assert_eq!(result.priority, 1);
        assert_eq!(result.recommended_actions, vec![messages::INSUFFICIENT_INFORMATION.to_string()]);
    }

    #[test]
    fn explicit_flag_without_match_keeps_insufficient_information() {
        let result = run(&[], None, Some("seizure"), Language::En);
        assert!(result.insufficient_information);
        assert_eq!(result.priority, 5);
        assert!(result.recommended_actions.contains(&messages::SEEK_IMMEDIATE_CARE.to_string()));
    }

    #[test]
    fn red_flag_adds_named_line_and_urgent_care() {
        let result = run(&["fever", "blood_in_stool"], Some(5.0), None, Language::En);
        assert_eq!(result.priority, 5);
        assert_eq!(
            result.recommended_actions,
            vec![
                "Same-day assessment.".to_string(),
                "Warning signs reported: blood in stool.".to_string(),
                messages::SEEK_IMMEDIATE_CARE.to_string(),
            ]
        );
    }

    #[test]
    fn indonesian_urgent_result_lists_emergency_numbers() {
        let result = run(&["fever", "blood_in_stool"], None, None, Language::Id);
        assert_eq!(result.language, Language::Id);
        assert!(result.recommended_actions.iter().any(|a| a.contains("118")));
    }

    #[test]
    fn below_priority_four_has_no_safety_line() {
        // diarrhoea moderate (fever + cramps, short duration) → priority 3
        let result = run(&["fever", "cramps"], Some(1.0), None, Language::En);
        assert_eq!(result.priority, 3);
        assert!(!result.recommended_actions.contains(&messages::SEEK_IMMEDIATE_CARE.to_string()));
        assert_eq!(result.recommended_actions, vec!["See a doctor within 24 hours.".to_string()]);
    }

    #[test]
    fn result_carries_related_symptoms() {
        let result = run(&["fever", "cramps"], None, None, Language::En);
        assert_eq!(result.related_symptoms.first().map(|t| t.as_str()), Some("blood_in_stool"));
    }
}

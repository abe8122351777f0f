//! Free text → canonical symptom tags.
//!
//! Matching is longest-phrase-first over folded tokens. A matched phrase
//! consumes its tokens, so "sakit kepala" never also fires a shorter form
//! inside it, and a negation word that belongs to a phrase ("tidak bisa
//! mencium bau") does not negate anything.

pub mod duration;
pub mod language_detect;
pub mod lexicon;
pub mod text;

use std::collections::{BTreeSet, HashSet};

use crate::knowledge::KnowledgeBase;
use crate::models::{Language, SymptomTag};

pub use duration::extract_duration_days;
pub use language_detect::detect_language;
pub use lexicon::{Lexicon, LexiconError, Phrase};
use text::{tokenize, Token};

/// Tokens before a symptom phrase searched for a negation marker.
pub const DEFAULT_NEGATION_WINDOW: usize = 3;

/// Everything one utterance contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    /// Affirmed tags in disclosure order, implied tags after their source.
    pub tags: Vec<SymptomTag>,
    /// Tags only ever mentioned under negation.
    pub negated: Vec<SymptomTag>,
    pub duration_days: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Normalizer {
    lexicon: Lexicon,
    /// Lexicon phrases restricted to the knowledge base vocabulary.
    phrases: Vec<Phrase>,
    negation_window: usize,
}

impl Normalizer {
    /// Bind a lexicon to a knowledge base.
    ///
    /// Lexicon tags the knowledge base does not know are dropped here with a
    /// warning; they can never reach scoring.
    pub fn new(lexicon: Lexicon, kb: &KnowledgeBase) -> Self {
        let mut unknown = BTreeSet::new();
        let mut phrases = Vec::with_capacity(lexicon.phrases().len());

        for phrase in lexicon.phrases() {
            if !kb.is_known_tag(phrase.tag.as_str()) {
                unknown.insert(phrase.tag.clone());
                continue;
            }
            let mut phrase = phrase.clone();
            phrase.implies.retain(|t| {
                let known = kb.is_known_tag(t.as_str());
                if !known {
                    unknown.insert(t.clone());
                }
                known
            });
            phrases.push(phrase);
        }

        for tag in &unknown {
            tracing::warn!(tag = %tag, "Lexicon tag not in knowledge base vocabulary, dropped");
        }

        Self {
            lexicon,
            phrases,
            negation_window: DEFAULT_NEGATION_WINDOW,
        }
    }

    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }

    pub fn negation_window(&self) -> usize {
        self.negation_window
    }

    /// Canonical tags asserted by `text`.
    ///
    /// `language` restricts surface forms and negation markers to one
    /// language; `None` uses all of them.
    pub fn extract(&self, text: &str, language: Option<Language>) -> BTreeSet<SymptomTag> {
        self.observe(text, language).tags.into_iter().collect()
    }

    /// Like [`extract`](Self::extract) but in disclosure order.
    pub fn extract_ordered(&self, text: &str, language: Option<Language>) -> Vec<SymptomTag> {
        self.observe(text, language).tags
    }

    pub fn extract_duration_days(&self, text: &str) -> Option<f64> {
        extract_duration_days(text)
    }

    pub fn observe(&self, text: &str, language: Option<Language>) -> Observation {
        if text.trim().is_empty() {
            return Observation::default();
        }

        let tokens = tokenize(text, |w| self.lexicon.is_clause_breaker(w, language));
        let mut consumed = vec![false; tokens.len()];
        let mut hits: Vec<(usize, &Phrase)> = Vec::new();

        let candidates = self
            .phrases
            .iter()
            .filter(|p| language.map_or(true, |l| p.language == l));

        for phrase in candidates {
            let len = phrase.tokens.len();
            if len > tokens.len() {
                continue;
            }
            for start in 0..=tokens.len() - len {
                let span = start..start + len;
                if consumed[span.clone()].iter().any(|c| *c) {
                    continue;
                }
                let window = &tokens[span.clone()];
                if window.iter().any(|t| t.clause != window[0].clause) {
                    continue;
                }
                if window.iter().zip(&phrase.tokens).all(|(t, p)| t.text == *p) {
                    consumed[span].fill(true);
                    hits.push((start, phrase));
                }
            }
        }
        hits.sort_by_key(|(start, _)| *start);

        let mut tags = Vec::new();
        let mut seen = HashSet::new();
        let mut negated = Vec::new();

        for (start, phrase) in hits {
            if self.is_negated(&tokens, &consumed, start, language) {
                if !negated.contains(&phrase.tag) {
                    negated.push(phrase.tag.clone());
                }
                continue;
            }
            for tag in std::iter::once(&phrase.tag).chain(phrase.implies.iter()) {
                if seen.insert(tag.clone()) {
                    tags.push(tag.clone());
                }
            }
        }
        negated.retain(|t| !seen.contains(t));

        let duration_days = extract_duration_days(text);

        tracing::debug!(
            tags = tags.len(),
            negated = negated.len(),
            duration_days,
            "Symptoms extracted"
        );

        Observation {
            tags,
            negated,
            duration_days,
        }
    }

    /// A free negation marker within the window before `start`, in the same clause.
    fn is_negated(
        &self,
        tokens: &[Token],
        consumed: &[bool],
        start: usize,
        language: Option<Language>,
    ) -> bool {
        let clause = tokens[start].clause;
        let from = start.saturating_sub(self.negation_window);
        (from..start).any(|i| {
            tokens[i].clause == clause
                && !consumed[i]
                && self.lexicon.is_negation_marker(&tokens[i].text, language)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        let kb = KnowledgeBase::bundled().unwrap();
        Normalizer::new(Lexicon::bundled().unwrap(), &kb)
    }

    fn tags(items: &[&str]) -> BTreeSet<SymptomTag> {
        items.iter().map(|t| SymptomTag::from(*t)).collect()
    }

    #[test]
    fn negation_is_clause_scoped() {
        let n = normalizer();
        assert_eq!(n.extract("no fever, headache present", None), tags(&["headache"]));
    }

    #[test]
    fn contrast_word_breaks_clause() {
        let n = normalizer();
        assert_eq!(n.extract("headache but no fever", None), tags(&["headache"]));
        assert_eq!(n.extract("tidak demam tapi batuk", None), tags(&["cough"]));
    }

    #[test]
    fn contraction_negates() {
        let n = normalizer();
        assert!(n.extract("I don't have a fever", None).is_empty());
    }

    #[test]
    fn negation_outside_window_is_ignored() {
        let n = normalizer();
        let out = n.extract("no history of anything like fever", None);
        assert_eq!(out, tags(&["fever"]));
    }

    #[test]
    fn negation_word_inside_phrase_does_not_negate() {
        let n = normalizer();
        assert_eq!(n.extract("tidak bisa mencium bau", None), tags(&["loss_of_smell"]));
    }

    #[test]
    fn negated_words_do_not_form_red_flags() {
        let n = normalizer();
        assert_eq!(
            n.extract("I have no urine infection, just a cough", None),
            tags(&["cough"])
        );
        let out = n.extract("saya tidak sadar sudah batuk 3 hari", None);
        assert!(!out.contains("loss_of_consciousness"));
    }

    #[test]
    fn explicit_red_flag_forms_still_match() {
        let n = normalizer();
        assert_eq!(
            n.extract("he has been passing no urine since morning", None),
            tags(&["severe_dehydration"])
        );
        assert_eq!(
            n.extract("ayah saya tidak sadarkan diri", None),
            tags(&["loss_of_consciousness"])
        );
    }

    #[test]
    fn bare_temperature_is_not_fever() {
        let n = normalizer();
        assert!(n.extract("my temperature is normal", None).is_empty());
        assert_eq!(n.extract("running a temperature", None), tags(&["fever"]));
        assert!(n.extract("I don't have a temperature", None).is_empty());
    }

    #[test]
    fn specific_phrase_implies_general_tag() {
        let n = normalizer();
        assert_eq!(
            n.extract_ordered("high fever and headache", None),
            vec![
                SymptomTag::from("fever_high"),
                SymptomTag::from("fever"),
                SymptomTag::from("headache"),
            ]
        );
        assert_eq!(
            n.extract("bloody diarrhea", None),
            tags(&["blood_in_stool", "loose_stool"])
        );
    }

    #[test]
    fn indonesian_multiword_forms() {
        let n = normalizer();
        let out = n.extract("Saya demam, sakit kepala dan sesak napas", None);
        assert_eq!(out, tags(&["fever", "headache", "shortness_of_breath"]));
    }

    #[test]
    fn case_and_diacritics_are_folded() {
        let n = normalizer();
        assert_eq!(n.extract("FEVER and Nausëa", None), tags(&["fever", "nausea"]));
    }

    #[test]
    fn language_hint_restricts_forms() {
        let n = normalizer();
        assert!(n.extract("demam", Some(Language::En)).is_empty());
        assert_eq!(n.extract("demam", Some(Language::Id)), tags(&["fever"]));
        assert_eq!(n.extract("demam", None), tags(&["fever"]));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let n = normalizer();
        assert!(n.extract("", None).is_empty());
        assert!(n.extract("   \n\t", None).is_empty());
        assert_eq!(n.observe("", None), Observation::default());
    }

    #[test]
    fn extraction_is_deterministic() {
        let n = normalizer();
        let text = "fever for 5 days, blood in stool, no vomiting but cramps";
        let first = n.observe(text, None);
        for _ in 0..10 {
            assert_eq!(n.observe(text, None), first);
        }
    }

    #[test]
    fn observation_reports_negated_and_duration() {
        let n = normalizer();
        let obs = n.observe("fever for 5 days, no vomiting", None);
        assert_eq!(obs.tags, vec![SymptomTag::from("fever")]);
        assert_eq!(obs.negated, vec![SymptomTag::from("vomiting")]);
        assert_eq!(obs.duration_days, Some(5.0));
    }

    #[test]
    fn affirmed_mention_overrides_negated_one() {
        let n = normalizer();
        let obs = n.observe("no cough yesterday. today cough", None);
        assert_eq!(obs.tags, vec![SymptomTag::from("cough")]);
        assert!(obs.negated.is_empty());
    }

    #[test]
    fn wider_window_reaches_further() {
        let n = normalizer().with_negation_window(6);
        assert!(n.extract("no history of anything like fever", None).is_empty());
    }

    #[test]
    fn lexicon_tags_outside_vocabulary_are_dropped() {
        let kb = KnowledgeBase::load_test();
        let lexicon = Lexicon::from_json(
            r#"{"symptoms": [
                {"tag": "itching", "forms": {"en": ["itchy"]}},
                {"tag": "fever", "implies": ["hot_flush"], "forms": {"en": ["fever"]}}
            ]}"#,
        )
        .unwrap();
        let n = Normalizer::new(lexicon, &kb);
        assert_eq!(n.extract("itchy with a fever", None), tags(&["fever"]));
    }
}

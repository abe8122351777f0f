use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Language, SymptomTag};

use super::text::tokenize;

const BUNDLED_LEXICON: &str = include_str!("../../../resources/lexicon.json");

/// A form opening with a negation marker needs this many words; shorter ones
/// ("no urine") read as a negated mention of something else.
pub const MIN_NEGATED_FORM_WORDS: usize = 3;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Cannot read lexicon {0}: {1}")]
    Io(String, String),

    #[error("Lexicon is not valid: {0}")]
    Parse(String),

    #[error("Invalid lexicon entry '{tag}': {reason}")]
    InvalidEntry { tag: String, reason: String },
}

/// Serialized lexicon document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconDocument {
    #[serde(default)]
    pub negation_markers: BTreeMap<Language, Vec<String>>,
    #[serde(default)]
    pub clause_breakers: BTreeMap<Language, Vec<String>>,
    pub symptoms: Vec<LexiconEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub tag: SymptomTag,
    /// Tags also reported whenever this entry matches (`fever_high` → `fever`).
    #[serde(default)]
    pub implies: Vec<SymptomTag>,
    pub forms: BTreeMap<Language, Vec<String>>,
}

/// A surface form, pre-tokenized for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub tokens: Vec<String>,
    pub tag: SymptomTag,
    pub implies: Vec<SymptomTag>,
    pub language: Language,
}

/// Bilingual mapping from surface forms to symptom tags.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// Longest first; equal lengths ordered by text then tag.
    phrases: Vec<Phrase>,
    negation_markers: BTreeMap<Language, HashSet<String>>,
    clause_breakers: BTreeMap<Language, HashSet<String>>,
}

impl Lexicon {
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| LexiconError::Io(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json)
    }

    /// The English/Indonesian lexicon bundled under `resources/`.
    pub fn bundled() -> Result<Self, LexiconError> {
        Self::from_json(BUNDLED_LEXICON)
    }

    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let document: LexiconDocument =
            serde_json::from_str(json).map_err(|e| LexiconError::Parse(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn from_document(document: LexiconDocument) -> Result<Self, LexiconError> {
        let negation_markers = word_sets(document.negation_markers);
        let mut phrases = Vec::new();
        let mut seen = HashSet::new();

        for entry in document.symptoms {
            if entry.tag.is_empty() {
                return Err(LexiconError::InvalidEntry {
                    tag: String::new(),
                    reason: "empty tag".into(),
                });
            }
            if entry.implies.iter().any(|t| t.is_empty() || *t == entry.tag) {
                return Err(LexiconError::InvalidEntry {
                    tag: entry.tag.to_string(),
                    reason: "implies must name other, non-empty tags".into(),
                });
            }
            if entry.forms.values().all(Vec::is_empty) {
                return Err(LexiconError::InvalidEntry {
                    tag: entry.tag.to_string(),
                    reason: "no surface forms".into(),
                });
            }

            for (&language, forms) in &entry.forms {
                for form in forms {
                    let tokens = single_clause_words(form).ok_or_else(|| {
                        LexiconError::InvalidEntry {
                            tag: entry.tag.to_string(),
                            reason: format!("form '{form}' is empty or spans clauses"),
                        }
                    })?;
                    if tokens.len() < MIN_NEGATED_FORM_WORDS
                        && contains_word(&negation_markers, &tokens[0], Some(language))
                    {
                        return Err(LexiconError::InvalidEntry {
                            tag: entry.tag.to_string(),
                            reason: format!("form '{form}' opens with a negation marker"),
                        });
                    }
                    // Identical form for the same tag and language: keep one.
                    if !seen.insert((tokens.clone(), entry.tag.clone(), language)) {
                        continue;
                    }
                    phrases.push(Phrase {
                        tokens,
                        tag: entry.tag.clone(),
                        implies: entry.implies.clone(),
                        language,
                    });
                }
            }
        }

        phrases.sort_by(|a, b| {
            b.tokens
                .len()
                .cmp(&a.tokens.len())
                .then_with(|| a.tokens.cmp(&b.tokens))
                .then_with(|| a.tag.cmp(&b.tag))
                .then_with(|| a.language.cmp(&b.language))
        });

        let lexicon = Self {
            phrases,
            negation_markers,
            clause_breakers: word_sets(document.clause_breakers),
        };

        tracing::info!(
            phrases = lexicon.phrases.len(),
            tags = lexicon.tags().len(),
            "Lexicon loaded"
        );

        Ok(lexicon)
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    /// Every tag the lexicon can emit, including implied tags.
    pub fn tags(&self) -> BTreeSet<SymptomTag> {
        self.phrases
            .iter()
            .flat_map(|p| std::iter::once(&p.tag).chain(p.implies.iter()))
            .cloned()
            .collect()
    }

    /// `language == None` checks every language.
    pub fn is_negation_marker(&self, word: &str, language: Option<Language>) -> bool {
        contains_word(&self.negation_markers, word, language)
    }

    pub fn is_clause_breaker(&self, word: &str, language: Option<Language>) -> bool {
        contains_word(&self.clause_breakers, word, language)
    }
}

fn single_clause_words(form: &str) -> Option<Vec<String>> {
    let tokens = tokenize(form, |_| false);
    if tokens.is_empty() || tokens.iter().any(|t| t.clause != 0) {
        return None;
    }
    Some(tokens.into_iter().map(|t| t.text).collect())
}

fn word_sets(raw: BTreeMap<Language, Vec<String>>) -> BTreeMap<Language, HashSet<String>> {
    raw.into_iter()
        .map(|(language, words)| {
            let set = words
                .iter()
                .flat_map(|w| tokenize(w, |_| false))
                .map(|t| t.text)
                .collect();
            (language, set)
        })
        .collect()
}

fn contains_word(
    sets: &BTreeMap<Language, HashSet<String>>,
    word: &str,
    language: Option<Language>,
) -> bool {
    match language {
        Some(language) => sets.get(&language).is_some_and(|s| s.contains(word)),
        None => sets.values().any(|s| s.contains(word)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "negation_markers": {"en": ["no", "Don't"], "id": ["tidak"]},
        "clause_breakers": {"en": ["but"], "id": ["tapi"]},
        "symptoms": [
            {"tag": "headache", "forms": {"en": ["headache"], "id": ["sakit kepala"]}},
            {"tag": "fever_high", "implies": ["fever"], "forms": {"en": ["high fever"]}}
        ]
    }"#;

    #[test]
    fn bundled_lexicon_is_valid() {
        let lexicon = Lexicon::bundled().unwrap();
        assert!(lexicon.tags().contains("blood_in_stool"));
        assert!(lexicon.is_negation_marker("tidak", Some(Language::Id)));
        assert!(lexicon.is_clause_breaker("but", Some(Language::En)));
    }

    #[test]
    fn phrases_are_longest_first() {
        let lexicon = Lexicon::from_json(SMALL).unwrap();
        let lengths: Vec<usize> = lexicon.phrases().iter().map(|p| p.tokens.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn markers_are_folded() {
        let lexicon = Lexicon::from_json(SMALL).unwrap();
        assert!(lexicon.is_negation_marker("dont", Some(Language::En)));
        assert!(lexicon.is_negation_marker("dont", None));
        assert!(!lexicon.is_negation_marker("tidak", Some(Language::En)));
    }

    #[test]
    fn implied_tags_are_listed() {
        let lexicon = Lexicon::from_json(SMALL).unwrap();
        let tags = lexicon.tags();
        assert!(tags.contains("fever"));
        assert!(tags.contains("fever_high"));
    }

    #[test]
    fn entry_without_forms_is_rejected() {
        let json = r#"{"symptoms": [{"tag": "rash", "forms": {"en": []}}]}"#;
        let err = Lexicon::from_json(json).unwrap_err();
        assert!(matches!(err, LexiconError::InvalidEntry { ref tag, .. } if tag == "rash"));
    }

    #[test]
    fn form_spanning_clauses_is_rejected() {
        let json = r#"{"symptoms": [{"tag": "rash", "forms": {"en": ["red, itchy"]}}]}"#;
        assert!(Lexicon::from_json(json).is_err());
    }

    #[test]
    fn short_form_opening_with_negation_is_rejected() {
        let json = r#"{
            "negation_markers": {"en": ["no"], "id": ["tidak"]},
            "symptoms": [{"tag": "severe_dehydration", "forms": {"en": ["no urine"]}}]
        }"#;
        let err = Lexicon::from_json(json).unwrap_err();
        assert!(
            matches!(err, LexiconError::InvalidEntry { ref tag, ref reason } if tag == "severe_dehydration" && reason.contains("negation"))
        );

        let json = r#"{
            "negation_markers": {"id": ["tidak"]},
            "symptoms": [{"tag": "loss_of_consciousness", "forms": {"id": ["tidak sadar"]}}]
        }"#;
        assert!(Lexicon::from_json(json).is_err());
    }

    #[test]
    fn longer_negation_shaped_form_is_accepted() {
        let json = r#"{
            "negation_markers": {"id": ["tidak"]},
            "symptoms": [{"tag": "loss_of_smell", "forms": {"id": ["tidak bisa mencium bau"]}}]
        }"#;
        assert_eq!(Lexicon::from_json(json).unwrap().phrases().len(), 1);
    }

    #[test]
    fn unknown_language_key_is_rejected() {
        let json = r#"{"symptoms": [{"tag": "rash", "forms": {"fr": ["eruption"]}}]}"#;
        assert!(matches!(Lexicon::from_json(json), Err(LexiconError::Parse(_))));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Lexicon::load(&dir.path().join("lexicon.json")).unwrap_err();
        assert!(matches!(err, LexiconError::Io(..)));
    }
}

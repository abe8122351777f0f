//! Lightweight English/Indonesian detection for patient free text.
//!
//! Only used to pick the language of fixed guidance lines when the caller
//! gives no hint. Never affects which symptoms are extracted.

use crate::models::Language;

use super::text::fold;

/// Below this many characters there is too little signal to decide.
const MIN_DETECT_CHARS: usize = 12;

/// Common Indonesian words unlikely in English text.
const INDONESIAN_INDICATORS: &[&str] = &[
    "saya", "aku", "sudah", "sejak", "dan", "tidak", "tapi", "yang", "dengan",
    "ada", "juga", "sangat", "sekali", "hari", "minggu", "bulan", "kemarin",
    "badan", "terasa", "sering", "agak", "belum", "masih", "rasanya",
    // Symptom vocabulary
    "demam", "batuk", "pilek", "sakit", "nyeri", "mual", "muntah", "diare",
    "pusing", "lemas", "sesak", "perut", "kepala", "dada",
];

/// Common English words unlikely in Indonesian text.
const ENGLISH_INDICATORS: &[&str] = &[
    "i", "have", "has", "had", "the", "and", "for", "with", "my", "since",
    "but", "not", "no", "been", "feel", "feeling", "days", "weeks", "very",
    "really", "am", "is", "of",
    // Symptom vocabulary
    "fever", "cough", "headache", "pain", "nausea", "vomiting", "diarrhea",
    "diarrhoea", "tired", "dizzy", "breath", "chest", "stomach",
];

/// Detect whether `text` is English or Indonesian.
///
/// Returns `None` when the text is too short or gives no signal either way.
/// Indonesian wins ties once any indicator is present.
pub fn detect_language(text: &str) -> Option<Language> {
    if text.trim().chars().count() < MIN_DETECT_CHARS {
        return None;
    }

    let folded = fold(text);
    let words: Vec<&str> = folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let indonesian = count_indicators(&words, INDONESIAN_INDICATORS);
    let english = count_indicators(&words, ENGLISH_INDICATORS);

    match (indonesian, english) {
        (0, 0) => None,
        (id, en) if id >= en => Some(Language::Id),
        _ => Some(Language::En),
    }
}

fn count_indicators(words: &[&str], indicators: &[&str]) -> u32 {
    words.iter().filter(|w| indicators.contains(w)).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_indonesian_complaint() {
        let text = "Saya demam sudah 3 hari dan sakit kepala";
        assert_eq!(detect_language(text), Some(Language::Id));
    }

    #[test]
    fn detects_english_complaint() {
        let text = "I have had a fever for 5 days and a headache";
        assert_eq!(detect_language(text), Some(Language::En));
    }

    #[test]
    fn short_text_is_undetected() {
        assert_eq!(detect_language("demam"), None);
        assert_eq!(detect_language(""), None);
        assert_eq!(detect_language("     "), None);
    }

    #[test]
    fn text_without_indicators_is_undetected() {
        assert_eq!(detect_language("xyzzy plugh qwerty"), None);
    }

    #[test]
    fn mixed_text_favors_indonesian_on_tie() {
        let text = "fever dan demam cough";
        assert_eq!(detect_language(text), Some(Language::Id));
    }

    #[test]
    fn english_not_misdetected() {
        let text = "My chest feels tight and I am short of breath since yesterday, \
                    the cough is really bad";
        assert_eq!(detect_language(text), Some(Language::En));
    }
}

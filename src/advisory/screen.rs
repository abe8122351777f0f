//! Diagnostic-language screen for annotator narrative.
//!
//! Narrative that asserts a diagnosis is dropped, never shown.

use std::sync::LazyLock;

use regex::Regex;

use super::AdvisoryError;

struct DiagnosticPattern {
    regex: Regex,
    description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenViolation {
    pub matched_text: String,
    pub offset: usize,
    pub reason: &'static str,
}

static DIAGNOSTIC_PATTERNS: LazyLock<Vec<DiagnosticPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            r"(?i)\byou\s+have\s+(?:been\s+diagnosed\s+with\s+|an?\s+|the\s+)?(?:[a-z]+\s+)?(?:[a-z]+(?:itis|osis|emia)|fever|flu|infection|disease|syndrome|diabetes|asthma|pneumonia|migraine|hypertension|covid|dengue|typhoid|gastritis)\b",
            "Direct diagnosis: 'you have [condition]'",
        ),
        pattern(
            r"(?i)\byou\s+are\s+suffering\s+from\b",
            "Direct diagnosis: 'you are suffering from'",
        ),
        pattern(
            r"(?i)\byou\s+(?:likely|probably|possibly|definitely)\s+have\b",
            "Speculative diagnosis: 'you likely/probably have'",
        ),
        pattern(
            r"(?i)\bthis\s+(?:means|indicates|suggests|confirms)\s+(?:you|that\s+you)\s+have\b",
            "Indirect diagnosis: 'this means you have'",
        ),
        pattern(
            r"(?i)\byou\s+(?:are|have\s+been)\s+diagnosed\b",
            "Diagnosis claim",
        ),
        pattern(
            r"(?i)\byour\s+(?:condition|diagnosis)\s+is\b",
            "Condition assertion: 'your condition is'",
        ),
        pattern(
            r"(?i)\byou\s+(?:appear|seem)\s+to\s+have\b",
            "Implied diagnosis: 'you appear to have'",
        ),
        pattern(
            r"(?i)\banda\s+(?:menderita|mengidap|terkena|terjangkit|didiagnosis)\b",
            "Direct diagnosis: 'Anda menderita/terkena'",
        ),
        pattern(
            r"(?i)\banda\s+(?:kemungkinan|mungkin|pasti)\s+(?:besar\s+)?(?:menderita|mengidap|terkena)\b",
            "Speculative diagnosis: 'Anda kemungkinan menderita'",
        ),
        pattern(
            r"(?i)\bdiagnosis\s+anda\s+(?:adalah|ialah)\b",
            "Condition assertion: 'diagnosis Anda adalah'",
        ),
    ]
});

/// "If you have fever for three days, ..." is advice, not a diagnosis.
static CONDITIONAL_LEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:if|when|whenever|whether|unless|jika|kalau|bila|apabila|jikalau)\s+$")
        .expect("Invalid conditional regex pattern")
});

fn pattern(regex_str: &str, description: &'static str) -> DiagnosticPattern {
    DiagnosticPattern {
        regex: Regex::new(regex_str).expect("Invalid diagnostic regex pattern"),
        description,
    }
}

/// All diagnostic assertions in `text`, in order of appearance.
pub fn scan_diagnostic_language(text: &str) -> Vec<ScreenViolation> {
    let mut violations: Vec<ScreenViolation> = DIAGNOSTIC_PATTERNS
        .iter()
        .flat_map(|p| {
            p.regex
                .find_iter(text)
                .filter(|m| !CONDITIONAL_LEAD_RE.is_match(&text[..m.start()]))
                .map(|m| ScreenViolation {
                    matched_text: m.as_str().to_string(),
                    offset: m.start(),
                    reason: p.description,
                })
        })
        .collect();

    violations.sort_by_key(|v| (v.offset, std::cmp::Reverse(v.matched_text.len())));
    // Overlapping patterns: keep the first, longest match at each offset
    violations.dedup_by_key(|v| v.offset);
    violations
}

/// Pass `text` through unchanged, or reject it with the first violation.
pub fn screen_narrative(text: &str) -> Result<String, AdvisoryError> {
    match scan_diagnostic_language(text).first() {
        None => Ok(text.to_string()),
        Some(v) => {
            tracing::warn!(reason = v.reason, offset = v.offset, "Annotator narrative rejected");
            Err(AdvisoryError::Unsafe(v.reason.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_diagnosis_is_flagged() {
        for text in [
            "Based on this, you have dengue fever.",
            "You are suffering from a stomach bug.",
            "You probably have an infection.",
            "This suggests that you have typhoid.",
            "Your condition is serious.",
            "You appear to have the flu.",
        ] {
            assert!(!scan_diagnostic_language(text).is_empty(), "{text}");
        }
    }

    #[test]
    fn indonesian_diagnosis_is_flagged() {
        for text in [
            "Anda menderita demam berdarah.",
            "Anda kemungkinan besar terkena tifus.",
            "Diagnosis Anda adalah gastritis.",
        ] {
            assert!(!scan_diagnostic_language(text).is_empty(), "{text}");
        }
    }

    #[test]
    fn self_care_advice_passes() {
        for text in [
            "Rest and drink plenty of fluids. Keep track of your temperature.",
            "If you have questions, talk to a health worker.",
            "Istirahat yang cukup dan minum banyak air.",
        ] {
            assert!(scan_diagnostic_language(text).is_empty(), "{text}");
            assert_eq!(screen_narrative(text).unwrap(), text);
        }
    }

    #[test]
    fn conditional_advice_passes() {
        for text in [
            "If you have fever for more than three days, see a health worker.",
            "When you have the flu, rest at home.",
            "Jika Anda menderita demam lebih dari tiga hari, periksa ke puskesmas.",
        ] {
            assert!(scan_diagnostic_language(text).is_empty(), "{text}");
        }
        let v = scan_diagnostic_language("If it helps: you have dengue fever.");
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn screen_rejects_with_reason() {
        let err = screen_narrative("You are suffering from migraine.").unwrap_err();
        assert!(matches!(err, AdvisoryError::Unsafe(ref r) if r.contains("suffering")));
    }

    #[test]
    fn overlapping_matches_are_deduplicated() {
        let v = scan_diagnostic_language("You have been diagnosed with asthma.");
        let offsets: Vec<usize> = v.iter().map(|v| v.offset).collect();
        let mut unique = offsets.clone();
        unique.dedup();
        assert_eq!(offsets, unique);
    }
}

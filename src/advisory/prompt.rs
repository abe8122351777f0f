use std::fmt::Write;

use crate::models::{GuidelineSnippet, Language, TriageResult};

/// Conditions listed in the annotator summary.
const SUMMARY_CONDITIONS: usize = 3;

pub const SYSTEM_PROMPT: &str = r#"You write short, calm self-care notes for a symptom checker. You are NOT a doctor.

RULES:
1. NEVER state or imply a diagnosis. Do not write "you have", "you are suffering from" or similar.
2. The urgency level and recommended actions are already decided. Do not change, soften or contradict them.
3. Do not name medicines or doses.
4. Give general comfort and self-monitoring tips that fit the listed symptoms.
5. At most five short sentences, plain language, no lists, no headings."#;

pub fn system_prompt_i18n(lang: Language) -> &'static str {
    match lang {
        Language::Id => r#"Anda menulis catatan perawatan diri yang singkat dan menenangkan untuk pemeriksa gejala. Anda BUKAN dokter.

ATURAN:
1. JANGAN PERNAH menyatakan atau menyiratkan diagnosis. Jangan menulis "Anda menderita" atau "Anda terkena".
2. Tingkat urgensi dan tindakan yang disarankan sudah ditentukan. Jangan mengubah, melunakkan, atau membantahnya.
3. Jangan menyebut nama obat atau dosis.
4. Berikan tips kenyamanan dan pemantauan mandiri yang umum sesuai gejala yang disebutkan.
5. Paling banyak lima kalimat pendek, bahasa sederhana, tanpa daftar, tanpa judul."#,
        Language::En => SYSTEM_PROMPT,
    }
}

/// Plain-text summary of a result for the annotator.
///
/// Carries only tags, names and numbers derived from scoring, never the
/// patient's raw text.
pub fn build_summary(result: &TriageResult, snippets: &[GuidelineSnippet]) -> String {
    let mut out = String::new();

    let reported: Vec<String> = result.evidence.reported_tags().iter().map(|t| t.label()).collect();
    let _ = writeln!(out, "Reported symptoms: {}", or_none(&reported));

    if let Some(days) = result.evidence.duration_days() {
        let _ = writeln!(out, "Duration: {days:.1} days");
    }

    let candidates: Vec<String> = result
        .top_matches(SUMMARY_CONDITIONS)
        .iter()
        .map(|s| format!("{} ({}% symptom match)", s.condition_name, s.likelihood_percent()))
        .collect();
    let _ = writeln!(out, "Candidate conditions: {}", or_none(&candidates));

    let _ = writeln!(out, "Urgency: priority {} of 5, {} risk", result.priority, result.risk_tier);

    let flags: Vec<String> = result.red_flags_triggered.iter().map(|t| t.label()).collect();
    if !flags.is_empty() {
        let _ = writeln!(out, "Warning signs: {}", flags.join(", "));
    }

    let _ = writeln!(out, "Decided actions:");
    for action in &result.recommended_actions {
        let _ = writeln!(out, "- {action}");
    }

    if !snippets.is_empty() {
        let _ = writeln!(out, "\nReference material:");
        for snippet in snippets {
            let _ = writeln!(out, "[{}] {}", snippet.source, snippet.text);
        }
    }

    let _ = write!(out, "\nWrite the self-care note now.");
    out
}

fn or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

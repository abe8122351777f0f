use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use crate::models::SymptomTag;

use super::types::{ConditionRecord, KnowledgeBaseDocument};
use super::KnowledgeError;

/// Knowledge base shipped with the crate.
const BUNDLED_KNOWLEDGE_BASE: &str = include_str!("../../resources/knowledge_base.json");

/// Validated, immutable collection of condition records.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    version: Option<String>,
    /// Sorted by id so that source order never affects results.
    records: Vec<ConditionRecord>,
    index: HashMap<String, usize>,
    emergency_flags: BTreeSet<SymptomTag>,
    vocabulary: BTreeSet<SymptomTag>,
}

impl KnowledgeBase {
    /// Load a knowledge base from a JSON file.
    pub fn load(path: &Path) -> Result<Self, KnowledgeError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| KnowledgeError::Io(path.display().to_string(), e.to_string()))?;
        Self::from_json(&json)
    }

    /// The knowledge base bundled under `resources/`.
    pub fn bundled() -> Result<Self, KnowledgeError> {
        Self::from_json(BUNDLED_KNOWLEDGE_BASE)
    }

    pub fn from_json(json: &str) -> Result<Self, KnowledgeError> {
        let document: KnowledgeBaseDocument =
            serde_json::from_str(json).map_err(|e| KnowledgeError::Parse(e.to_string()))?;
        Self::from_document(document)
    }

    /// Validate every record; any error rejects the whole document.
    pub fn from_document(document: KnowledgeBaseDocument) -> Result<Self, KnowledgeError> {
        let mut seen = HashSet::new();
        for record in &document.conditions {
            validate_record(record)?;
            if !seen.insert(record.id.clone()) {
                return Err(KnowledgeError::DuplicateId(record.id.clone()));
            }
        }
        if let Some(flag) = document.emergency_flags.iter().find(|t| t.is_empty()) {
            return Err(KnowledgeError::Parse(format!(
                "empty emergency flag tag '{flag}'"
            )));
        }

        let mut records = document.conditions;
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let index = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        let emergency_flags: BTreeSet<SymptomTag> =
            document.emergency_flags.into_iter().collect();

        let mut vocabulary = emergency_flags.clone();
        for record in &records {
            vocabulary.extend(record.core_symptoms.iter().map(|s| s.tag.clone()));
            vocabulary.extend(record.red_flags.iter().cloned());
        }

        tracing::info!(
            version = document.version.as_deref().unwrap_or("unversioned"),
            conditions = records.len(),
            vocabulary = vocabulary.len(),
            "Knowledge base loaded"
        );

        Ok(Self {
            version: document.version,
            records,
            index,
            emergency_flags,
            vocabulary,
        })
    }

    pub fn lookup(&self, condition_id: &str) -> Result<&ConditionRecord, KnowledgeError> {
        self.index
            .get(condition_id)
            .map(|&i| &self.records[i])
            .ok_or_else(|| KnowledgeError::NotFound(condition_id.to_string()))
    }

    /// Records in ascending id order.
    pub fn records(&self) -> &[ConditionRecord] {
        &self.records
    }

    /// Every core symptom, red flag and emergency flag.
    pub fn vocabulary(&self) -> &BTreeSet<SymptomTag> {
        &self.vocabulary
    }

    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.vocabulary.contains(tag)
    }

    pub fn emergency_flags(&self) -> &BTreeSet<SymptomTag> {
        &self.emergency_flags
    }

    pub fn is_emergency_flag(&self, tag: &str) -> bool {
        self.emergency_flags.contains(tag)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Small fixed knowledge base for tests (no file I/O).
    #[cfg(test)]
    pub(crate) fn load_test() -> Self {
        Self::from_json(TEST_KNOWLEDGE_BASE).expect("test knowledge base is valid")
    }
}

fn invalid(record: &ConditionRecord, reason: impl Into<String>) -> KnowledgeError {
    let label = if record.id.trim().is_empty() {
        record.name.clone()
    } else {
        record.id.clone()
    };
    KnowledgeError::InvalidRecord {
        record: label,
        reason: reason.into(),
    }
}

fn validate_record(record: &ConditionRecord) -> Result<(), KnowledgeError> {
    if record.id.trim().is_empty() {
        return Err(invalid(record, "missing id"));
    }
    if record.id != record.id.trim() {
        return Err(invalid(record, "id has surrounding whitespace"));
    }
    if record.name.trim().is_empty() {
        return Err(invalid(record, "missing name"));
    }
    if record.core_symptoms.is_empty() {
        return Err(invalid(record, "core_symptoms is empty"));
    }

    let mut core = HashSet::new();
    for symptom in &record.core_symptoms {
        if symptom.tag.is_empty() {
            return Err(invalid(record, "core symptom with empty tag"));
        }
        if !core.insert(symptom.tag.as_str()) {
            return Err(invalid(record, format!("duplicate core symptom '{}'", symptom.tag)));
        }
        if let Some(w) = symptom.weight {
            if !w.is_finite() || w <= 0.0 {
                return Err(invalid(
                    record,
                    format!("weight of '{}' must be positive, got {w}", symptom.tag),
                ));
            }
        }
    }

    if record.red_flags.iter().any(|t| t.is_empty()) {
        return Err(invalid(record, "red flag with empty tag"));
    }

    for (i, rule) in record.risk_thresholds.iter().enumerate() {
        for bound in [rule.duration_min, rule.duration_max].into_iter().flatten() {
            if !bound.is_finite() || bound < 0.0 {
                return Err(invalid(record, format!("risk rule {i}: invalid duration bound {bound}")));
            }
        }
        if let (Some(min), Some(max)) = (rule.duration_min, rule.duration_max) {
            if min > max {
                return Err(invalid(
                    record,
                    format!("risk rule {i}: duration_min {min} exceeds duration_max {max}"),
                ));
            }
        }
        if let Some(f) = rule.match_fraction_min {
            if !(0.0..=1.0).contains(&f) {
                return Err(invalid(
                    record,
                    format!("risk rule {i}: match_fraction_min {f} outside [0, 1]"),
                ));
            }
        }
        if let Some(tag) = rule.required_tags.iter().find(|t| !record.defines(t.as_str())) {
            return Err(invalid(
                record,
                format!("risk rule {i} references undefined tag '{tag}'"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) const TEST_KNOWLEDGE_BASE: &str = r#"{
  "version": "test",
  "emergency_flags": ["seizure"],
  "conditions": [
    {
      "id": "flu",
      "name": "Influenza",
      "core_symptoms": [{"tag": "fever"}, {"tag": "cough"}, {"tag": "headache"}, {"tag": "muscle_pain"}],
      "red_flags": ["cyanosis"],
      "risk_thresholds": [{"duration_min": 7, "match_fraction_min": 0.5, "tier": "moderate"}],
      "treatment_tiers": {"mild": "Rest and fluids.", "moderate": "See a doctor this week.", "severe": "Seek care today."},
      "source_reference": "test"
    },
    {
      "id": "diarrhoea",
      "name": "Infectious diarrhoea",
      "core_symptoms": [{"tag": "fever"}, {"tag": "blood_in_stool"}, {"tag": "cramps"}],
      "red_flags": ["blood_in_stool"],
      "risk_thresholds": [
        {"duration_min": 3, "match_fraction_min": 0.34, "tier": "high"},
        {"match_fraction_min": 0.34, "tier": "moderate"}
      ],
      "treatment_tiers": {"mild": "Oral rehydration.", "moderate": "See a doctor within 24 hours.", "severe": "Same-day assessment."},
      "source_reference": "test"
    },
    {
      "id": "migraine",
      "name": "Migraine",
      "core_symptoms": [{"tag": "headache", "weight": 2.0}, {"tag": "nausea"}, {"tag": "light_sensitivity"}],
      "red_flags": ["stiff_neck"],
      "risk_thresholds": [{"duration_min": 3, "tier": "moderate"}],
      "treatment_tiers": {"mild": "Rest in a dark room.", "moderate": "See a doctor.", "severe": "Emergency assessment."},
      "source_reference": "test"
    }
  ]
}"#;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn bundled_knowledge_base_is_valid() {
        let kb = KnowledgeBase::bundled().unwrap();
        assert!(kb.len() >= 10);
        assert!(kb.lookup("diarrhoea").is_ok());
        assert!(kb.is_emergency_flag("seizure"));
    }

    #[test]
    fn records_are_sorted_by_id() {
        let kb = KnowledgeBase::load_test();
        let ids: Vec<&str> = kb.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["diarrhoea", "flu", "migraine"]);
    }

    #[test]
    fn vocabulary_is_union_of_core_red_and_emergency() {
        let kb = KnowledgeBase::load_test();
        for tag in ["fever", "cough", "blood_in_stool", "cyanosis", "stiff_neck", "seizure"] {
            assert!(kb.is_known_tag(tag), "missing {tag}");
        }
        assert!(!kb.is_known_tag("itching"));
    }

    #[test]
    fn lookup_unknown_is_not_found() {
        let kb = KnowledgeBase::load_test();
        let err = kb.lookup("scurvy").unwrap_err();
        assert!(matches!(err, KnowledgeError::NotFound(ref id) if id == "scurvy"));
        assert!(!err.is_load_error());
    }

    #[test]
    fn missing_core_symptoms_field_fails_load() {
        let json = r#"{"conditions": [{
            "id": "x", "name": "X", "red_flags": [], "risk_thresholds": [],
            "treatment_tiers": {"mild": "", "moderate": "", "severe": ""},
            "source_reference": ""
        }]}"#;
        let err = KnowledgeBase::from_json(json).unwrap_err();
        assert!(matches!(err, KnowledgeError::Parse(ref m) if m.contains("core_symptoms")));
        assert!(err.is_load_error());
    }

    #[test]
    fn one_bad_record_rejects_whole_document() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        document.conditions[2].core_symptoms.clear();
        let err = KnowledgeBase::from_document(document).unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidRecord { ref record, .. } if record == "migraine"));
    }

    #[test]
    fn duplicate_id_fails_load() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        let copy = document.conditions[0].clone();
        document.conditions.push(copy);
        let err = KnowledgeBase::from_document(document).unwrap_err();
        assert!(matches!(err, KnowledgeError::DuplicateId(ref id) if id == "flu"));
    }

    #[test]
    fn rule_referencing_undefined_tag_fails_load() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        document.conditions[0].risk_thresholds[0].required_tags = vec!["rash".into()];
        let err = KnowledgeBase::from_document(document).unwrap_err();
        match err {
            KnowledgeError::InvalidRecord { record, reason } => {
                assert_eq!(record, "flu");
                assert!(reason.contains("undefined tag 'rash'"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_positive_weight_fails_load() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        document.conditions[0].core_symptoms[0].weight = Some(0.0);
        assert!(KnowledgeBase::from_document(document).is_err());
    }

    #[test]
    fn inverted_duration_range_fails_load() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        document.conditions[0].risk_thresholds[0].duration_max = Some(1.0);
        assert!(KnowledgeBase::from_document(document).is_err());
    }

    #[test]
    fn match_fraction_min_out_of_range_fails_load() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        document.conditions[1].risk_thresholds[1].match_fraction_min = Some(1.5);
        assert!(KnowledgeBase::from_document(document).is_err());
    }

    #[test]
    fn malformed_json_fails_load() {
        let err = KnowledgeBase::from_json("{ not json").unwrap_err();
        assert!(matches!(err, KnowledgeError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TEST_KNOWLEDGE_BASE.as_bytes()).unwrap();
        let kb = KnowledgeBase::load(file.path()).unwrap();
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.version(), Some("test"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KnowledgeBase::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, KnowledgeError::Io(..)));
    }

    #[test]
    fn source_order_does_not_change_records() {
        let mut document: KnowledgeBaseDocument = serde_json::from_str(TEST_KNOWLEDGE_BASE).unwrap();
        let a = KnowledgeBase::from_document(document.clone()).unwrap();
        document.conditions.reverse();
        let b = KnowledgeBase::from_document(document).unwrap();
        assert_eq!(a.records(), b.records());
    }
}

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identifier for one symptom concept, e.g. `fever_high`.
///
/// Always stored trimmed and lowercase so that tags coming from the
/// knowledge base, the lexicon and callers compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SymptomTag(String);

impl SymptomTag {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable label: `blood_in_stool` → `blood in stool`.
    pub fn label(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl From<String> for SymptomTag {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SymptomTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<SymptomTag> for String {
    fn from(value: SymptomTag) -> Self {
        value.0
    }
}

impl Borrow<str> for SymptomTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymptomTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Symptom evidence accumulated over one triage session.
///
/// `reported_tags` keeps disclosure order for display; scoring only ever
/// treats it as a set. Owned by exactly one session and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymptomEvidence {
    reported_tags: Vec<SymptomTag>,
    duration_days: Option<f64>,
    explicit_red_flags: BTreeSet<SymptomTag>,
}

impl SymptomEvidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags in the order the patient disclosed them.
    pub fn reported_tags(&self) -> &[SymptomTag] {
        &self.reported_tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.reported_tags.iter().any(|t| t.as_str() == tag)
    }

    /// Record a reported symptom. Returns `false` if it was already known.
    pub fn report(&mut self, tag: SymptomTag) -> bool {
        if tag.is_empty() || self.has_tag(tag.as_str()) {
            return false;
        }
        self.reported_tags.push(tag);
        true
    }

    pub fn duration_days(&self) -> Option<f64> {
        self.duration_days
    }

    /// Set the reported symptom duration. Negative or non-finite values are ignored.
    pub fn set_duration_days(&mut self, days: f64) {
        if days.is_finite() && days >= 0.0 {
            self.duration_days = Some(days);
        }
    }

    pub fn explicit_red_flags(&self) -> &BTreeSet<SymptomTag> {
        &self.explicit_red_flags
    }

    /// Raise a red flag independent of any condition. Returns `false` if already raised.
    pub fn flag_red_flag(&mut self, tag: SymptomTag) -> bool {
        if tag.is_empty() {
            return false;
        }
        self.explicit_red_flags.insert(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.reported_tags.is_empty()
            && self.explicit_red_flags.is_empty()
            && self.duration_days.is_none()
    }
}

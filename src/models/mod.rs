pub mod enums;
pub mod symptom;
pub mod triage;

pub use enums::{AdvisoryStatus, InvalidEnum, Language, RiskTier, TreatmentTier};
pub use symptom::{SymptomEvidence, SymptomTag};
pub use triage::{Advisory, ConditionScore, GuidelineSnippet, TriageResult, ADVISORY_LABEL};

//! Five-point priority and overall risk tier.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{ConditionScore, RiskTier, SymptomEvidence, SymptomTag};

pub const PRIORITY_EMERGENCY: u8 = 5;
pub const PRIORITY_URGENT: u8 = 4;
pub const PRIORITY_SOON: u8 = 3;
pub const PRIORITY_ROUTINE: u8 = 2;
pub const PRIORITY_SELF_CARE: u8 = 1;

/// Top-ranked match fraction at or above which a low-tier result is priority 2.
pub const ROUTINE_MATCH_FRACTION: f64 = 0.5;

/// Which precedence rule produced the priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StratificationRule {
    RedFlag,
    HighTier,
    ModerateTier,
    StrongMatch,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stratification {
    pub priority: u8,
    pub risk_tier: RiskTier,
    pub red_flags_triggered: BTreeSet<SymptomTag>,
    pub rule: StratificationRule,
}

/// Map ranked scores to a priority, first rule wins:
///
/// 1. any red flag (condition or explicit) → 5, high
/// 2. top-ranked tier high → 4, high
/// 3. top-ranked tier moderate → 3, moderate
/// 4. top-ranked match fraction ≥ 0.5 → 2, low
/// 5. otherwise → 1, low
///
/// `scores` must already be ranked.
pub fn stratify(scores: &[ConditionScore], evidence: &SymptomEvidence) -> Stratification {
    let mut red_flags_triggered: BTreeSet<SymptomTag> = scores
        .iter()
        .flat_map(|s| s.red_flags_present.iter().cloned())
        .collect();
    red_flags_triggered.extend(evidence.explicit_red_flags().iter().cloned());

    let red_flag = scores.iter().any(|s| s.red_flag_hit) || !evidence.explicit_red_flags().is_empty();
    let top = scores.first();

    let (priority, risk_tier, rule) = if red_flag {
        (PRIORITY_EMERGENCY, RiskTier::High, StratificationRule::RedFlag)
    } else {
        match top {
            Some(s) if s.risk_tier == RiskTier::High => {
                (PRIORITY_URGENT, RiskTier::High, StratificationRule::HighTier)
            }
            Some(s) if s.risk_tier == RiskTier::Moderate => {
                (PRIORITY_SOON, RiskTier::Moderate, StratificationRule::ModerateTier)
            }
            Some(s) if s.match_fraction >= ROUTINE_MATCH_FRACTION => {
                (PRIORITY_ROUTINE, RiskTier::Low, StratificationRule::StrongMatch)
            }
            _ => (PRIORITY_SELF_CARE, RiskTier::Low, StratificationRule::Default),
        }
    };

    if red_flag {
        let flags: Vec<&str> = red_flags_triggered.iter().map(|t| t.as_str()).collect();
        tracing::warn!(rule_id = "red_flag", ?flags, "Red flag escalation");
    }
    tracing::debug!(priority, tier = %risk_tier, ?rule, "Stratified");

    Stratification {
        priority,
        risk_tier,
        red_flags_triggered,
        rule,
    }
}

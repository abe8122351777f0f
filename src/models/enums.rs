use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a stored or configured string does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Coarse risk classification. Ordered: `Low < Moderate < High`.
    RiskTier {
        Low => "low",
        Moderate => "moderate",
        High => "high",
    }
);

str_enum!(
    /// Key into a condition's treatment advice.
    TreatmentTier {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
    }
);

str_enum!(
    /// Languages the lexicon and the fixed guidance lines are written in.
    Language {
        En => "en",
        Id => "id",
    }
);

str_enum!(
    /// How far advisory enrichment got before it returned.
    AdvisoryStatus {
        Complete => "complete",
        Partial => "partial",
        Unavailable => "unavailable",
    }
);

impl RiskTier {
    /// Treatment advice tier used for this risk tier.
    pub fn treatment_tier(&self) -> TreatmentTier {
        match self {
            Self::Low => TreatmentTier::Mild,
            Self::Moderate => TreatmentTier::Moderate,
            Self::High => TreatmentTier::Severe,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::En
    }
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Id];

    /// Parse an optional caller hint. Unknown hints are logged and ignored.
    pub fn from_hint(hint: Option<&str>) -> Option<Self> {
        let hint = hint?.trim();
        if hint.is_empty() {
            return None;
        }
        // Accept regional tags such as "en-US" or "id_ID".
        let primary = hint.split(['-', '_']).next().unwrap_or(hint);
        match primary.parse() {
            Ok(lang) => Some(lang),
            Err(_) => {
                tracing::warn!(hint, "Unsupported language hint, using all languages");
                None
            }
        }
    }
}

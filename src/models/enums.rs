use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
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

str_enum!(ToxicPart {
    Leaf => "Leaf",
    Bulb => "Bulb",
    Flower => "Flower",
    Pollen => "Pollen",
    Stem => "Stem",
    Root => "Root",
    Seed => "Seed",
    Bark => "Bark",
    Sap => "Sap",
    Latex => "Latex",
    Fruit => "Fruit",
    Berry => "Berry",
    EntirePlant => "Entire Plant",
});

// Declaration order is the severity rank: mild < moderate < severe < fatal.
str_enum!(Severity {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
    Fatal => "fatal",
});

str_enum!(BodySystem {
    Gastrointestinal => "Gastrointestinal",
    Renal => "Renal",
    Neurological => "Neurological",
    Cardiac => "Cardiac",
    Dermal => "Dermal",
    Respiratory => "Respiratory",
    Hepatic => "Hepatic",
    Hematological => "Hematological",
    Endocrine => "Endocrine",
    Metabolic => "Metabolic",
    Musculoskeletal => "Musculoskeletal",
});

impl Severity {
    /// Case-insensitive lookup, tolerating a trailing period ("Severe." → Severe).
    pub fn parse_loose(s: &str) -> Option<Self> {
        let cleaned = s.trim().trim_end_matches('.').to_lowercase();
        cleaned.parse().ok()
    }
}

impl BodySystem {
    /// Case-insensitive lookup against the canonical names only (no synonyms).
    pub fn parse_loose(s: &str) -> Option<Self> {
        let cleaned = s.trim().trim_end_matches('.').to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|b| b.as_str().to_lowercase() == cleaned)
    }
}

/// Topics the question-answering service is asked about, one raw answer each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Basics,
    ToxicParts,
    Toxins,
    Symptoms,
    Treatments,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basics => "basics",
            Self::ToxicParts => "toxic_parts",
            Self::Toxins => "toxins",
            Self::Symptoms => "symptoms",
            Self::Treatments => "treatments",
        }
    }

    pub fn all() -> &'static [Topic] {
        &[
            Self::Basics,
            Self::ToxicParts,
            Self::Toxins,
            Self::Symptoms,
            Self::Treatments,
        ]
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

use serde::{Deserialize, Serialize};

use super::plant::PlantIdentity;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Toxin {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chemical_formula: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub concentration_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body_system: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub onset: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// 1 = most urgent. Signed so that bad values loaded from disk can be reported.
    #[serde(default)]
    pub priority: Option<i64>,
}

/// One plant's full toxicity profile.
///
/// Enumerated values (toxic parts, severity, body system) are stored as text:
/// the normalizer writes canonical names and the validator re-checks them, which
/// also covers records edited by the cleaning service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    #[serde(default)]
    pub plant: PlantIdentity,
    #[serde(default)]
    pub toxic_parts: Vec<String>,
    #[serde(default)]
    pub toxins: Vec<Toxin>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

impl ExtractionRecord {
    /// Empty record for a plant, populated topic by topic.
    pub fn new(plant: PlantIdentity) -> Self {
        Self {
            plant,
            ..Default::default()
        }
    }

    pub fn file_name(&self) -> String {
        self.plant.file_name()
    }
}

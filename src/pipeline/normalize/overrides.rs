//! Curated per-plant corrections for answers that are consistently missing or
//! poor. Applied only where the extracted value is missing or low quality.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{is_placeholder_name, ExtractionRecord, Symptom, Toxin, Treatment};
use crate::pipeline::PipelineError;

const BUNDLED: &str = include_str!("overrides.json");

/// Descriptions shorter than this are replaced when an override exists.
pub const MIN_DESCRIPTION_LEN: usize = 20;

/// Hedging phrases that mark a description as unusable.
const HEDGES: &[&str] = &["limited information", "does not contain"];

/// Scientific name to use for a common name the service could not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameFix {
    pub common_name: String,
    pub scientific_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantOverride {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub toxic_parts: Vec<String>,
    #[serde(default)]
    pub toxins: Vec<Toxin>,
    #[serde(default)]
    pub symptoms: Vec<Symptom>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
}

/// Override table keyed by exact scientific name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualOverrides {
    #[serde(default)]
    pub name_fixes: Vec<NameFix>,
    #[serde(default)]
    pub plants: BTreeMap<String, PlantOverride>,
}

impl ManualOverrides {
    /// The table shipped with the crate.
    pub fn bundled() -> Result<Self, serde_json::Error> {
        serde_json::from_str(BUNDLED)
    }

    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| PipelineError::Overrides {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Correct the scientific name from the common name when it is missing,
    /// a placeholder, or a bare genus of the corrected name ("Lavandula").
    pub fn fix_scientific_name(&self, record: &mut ExtractionRecord) {
        let plant = &mut record.plant;
        let Some(fix) = self
            .name_fixes
            .iter()
            .find(|f| f.common_name.eq_ignore_ascii_case(plant.common_name.trim()))
        else {
            return;
        };

        let needs_fix = match plant.scientific_name.as_deref().map(str::trim) {
            None => true,
            Some(name) if is_placeholder_name(name) => true,
            Some(name) => {
                !name.contains(char::is_whitespace)
                    && fix.scientific_name.split_whitespace().next() == Some(name)
            }
        };
        if needs_fix {
            tracing::debug!(
                common_name = %plant.common_name,
                scientific_name = %fix.scientific_name,
                "Applying scientific name fix"
            );
            plant.scientific_name = Some(fix.scientific_name.clone());
        }
    }

    /// Fill missing or low-quality values from the plant's override entry.
    pub fn apply(&self, record: &mut ExtractionRecord) {
        let Some(scientific) = record.plant.scientific_name.as_deref() else {
            return;
        };
        let Some(entry) = self.plants.get(scientific.trim()) else {
            return;
        };

        if record.plant.family.is_none() {
            record.plant.family = entry.family.clone();
        }
        if let Some(description) = &entry.description {
            if is_low_quality_description(record.plant.description.as_deref()) {
                record.plant.description = Some(description.clone());
            }
        }
        if record.toxic_parts.is_empty() {
            record.toxic_parts = entry.toxic_parts.clone();
        }
        if record.toxins.is_empty() {
            record.toxins = entry.toxins.clone();
        }
        if record.symptoms.is_empty() {
            record.symptoms = entry.symptoms.clone();
        }
        if record.treatments.is_empty() {
            record.treatments = entry.treatments.clone();
        }
    }
}

/// Missing, too short to be useful, or a hedge instead of a description.
pub fn is_low_quality_description(description: Option<&str>) -> bool {
    match description {
        None => true,
        Some(d) => {
            let lower = d.to_lowercase();
            d.trim().chars().count() < MIN_DESCRIPTION_LEN || HEDGES.iter().any(|h| lower.contains(h))
        }
    }
}

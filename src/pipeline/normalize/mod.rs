//! Record normalization: canonical enumerations, clean names, recovered
//! families and curated overrides. Total and idempotent.

pub mod family;
pub mod fields;
pub mod overrides;

pub use family::clean_family;
pub use fields::{
    clean_concentration_notes, clean_name, clean_onset, clean_prose, normalize_body_system,
    normalize_formula, normalize_severity,
};
pub use overrides::{ManualOverrides, NameFix, PlantOverride};

use std::collections::BTreeSet;

use crate::models::{BodySystem, ExtractionRecord, ToxicPart};

/// Question labels that the basics answer sometimes echoes in place of a value.
pub const HEADER_LABELS: &[&str] = &[
    "botanical family",
    "brief description",
    "description",
    "symptom name",
    "treatment name",
    "name of the compound",
    "affected body system",
    "severity",
    "typical onset time",
];

/// Free-text body system synonyms, lower-case, in lookup priority order.
const BODY_SYSTEM_SYNONYMS: &[(&str, BodySystem)] = &[
    ("gastrointestinal", BodySystem::Gastrointestinal),
    ("gi", BodySystem::Gastrointestinal),
    ("renal", BodySystem::Renal),
    ("kidney", BodySystem::Renal),
    ("neurological", BodySystem::Neurological),
    ("nervous", BodySystem::Neurological),
    ("cns", BodySystem::Neurological),
    ("central nervous system", BodySystem::Neurological),
    ("cardiac", BodySystem::Cardiac),
    ("cardiovascular", BodySystem::Cardiac),
    ("heart", BodySystem::Cardiac),
    ("dermal", BodySystem::Dermal),
    ("skin", BodySystem::Dermal),
    ("respiratory", BodySystem::Respiratory),
    ("lung", BodySystem::Respiratory),
    ("hepatic", BodySystem::Hepatic),
    ("liver", BodySystem::Hepatic),
    ("hematological", BodySystem::Hematological),
    ("blood", BodySystem::Hematological),
    ("endocrine", BodySystem::Endocrine),
    ("metabolic", BodySystem::Metabolic),
    ("musculoskeletal", BodySystem::Musculoskeletal),
    ("neuromuscular", BodySystem::Neurological),
    ("behavioral", BodySystem::Neurological),
    ("ocular", BodySystem::Dermal),
    ("eye", BodySystem::Dermal),
    ("mucous membranes", BodySystem::Dermal),
    ("systemic", BodySystem::Metabolic),
    ("multisystem", BodySystem::Metabolic),
];

/// Immutable normalization tables.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub body_systems: Vec<(String, BodySystem)>,
    pub header_labels: Vec<String>,
    pub toxin_name_max: usize,
    pub symptom_name_max: usize,
    pub treatment_name_max: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            body_systems: BODY_SYSTEM_SYNONYMS
                .iter()
                .map(|(syn, system)| (syn.to_string(), *system))
                .collect(),
            header_labels: HEADER_LABELS.iter().map(|l| l.to_string()).collect(),
            toxin_name_max: 150,
            symptom_name_max: 150,
            treatment_name_max: 200,
        }
    }
}

pub struct Normalizer {
    config: NormalizerConfig,
    overrides: ManualOverrides,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig, overrides: ManualOverrides) -> Self {
        Self { config, overrides }
    }

    /// Settle the names that decide the record's identity and file name.
    pub fn normalize_identity(&self, record: &mut ExtractionRecord) {
        self.overrides.fix_scientific_name(record);
        let plant = &mut record.plant;
        plant.common_name = plant.common_name.trim().to_string();
        plant.scientific_name = plant
            .scientific_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    pub fn normalize(&self, record: &mut ExtractionRecord) {
        self.normalize_identity(record);

        let plant = &mut record.plant;
        plant.family = plant
            .family
            .as_deref()
            .and_then(|f| clean_family(f, &self.config.header_labels));
        plant.description = plant.description.as_deref().and_then(clean_prose);

        self.overrides.apply(record);
        // Overrides may have supplied a family; run it through the same rules.
        record.plant.family = record
            .plant
            .family
            .as_deref()
            .and_then(|f| clean_family(f, &self.config.header_labels));

        record.toxic_parts = canonical_parts(&record.toxic_parts);

        for toxin in &mut record.toxins {
            toxin.name = toxin
                .name
                .as_deref()
                .and_then(|n| clean_name(n, self.config.toxin_name_max));
            toxin.chemical_formula = toxin.chemical_formula.as_deref().and_then(normalize_formula);
            toxin.description = toxin.description.as_deref().and_then(clean_prose);
            toxin.concentration_notes = toxin
                .concentration_notes
                .as_deref()
                .and_then(clean_concentration_notes);
        }

        for symptom in &mut record.symptoms {
            symptom.name = symptom
                .name
                .as_deref()
                .and_then(|n| clean_name(n, self.config.symptom_name_max));
            symptom.severity = symptom.severity.as_deref().and_then(normalize_severity);
            symptom.body_system = symptom
                .body_system
                .as_deref()
                .and_then(|b| normalize_body_system(b, &self.config.body_systems));
            symptom.onset = symptom.onset.as_deref().and_then(clean_onset);
            symptom.notes = symptom.notes.as_deref().and_then(clean_prose);
        }

        for (i, treatment) in record.treatments.iter_mut().enumerate() {
            treatment.name = treatment
                .name
                .as_deref()
                .and_then(|n| clean_name(n, self.config.treatment_name_max));
            treatment.description = treatment.description.as_deref().and_then(clean_prose);
            treatment.notes = treatment.notes.as_deref().and_then(clean_prose);
            treatment.priority = Some(i as i64 + 1);
        }

        tracing::debug!(plant = %record.plant.identity(), "Normalized record");
    }
}

impl Default for Normalizer {
    /// Default tables with the bundled overrides (empty if the bundle is unreadable).
    fn default() -> Self {
        let overrides = ManualOverrides::bundled().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Bundled override table unreadable, continuing without");
            ManualOverrides::default()
        });
        Self::new(NormalizerConfig::default(), overrides)
    }
}

/// Known parts in enumeration order, then unrecognised values (kept for the validator).
fn canonical_parts(parts: &[String]) -> Vec<String> {
    let mut known = BTreeSet::new();
    let mut unknown: Vec<String> = Vec::new();
    for part in parts {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        match ToxicPart::all()
            .iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
        {
            Some(p) => {
                known.insert(*p);
            }
            None => {
                if !unknown.iter().any(|u| u == trimmed) {
                    unknown.push(trimmed.to_string());
                }
            }
        }
    }
    known
        .into_iter()
        .map(|p| p.as_str().to_string())
        .chain(unknown)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantIdentity, Symptom, Toxin, Treatment};

    fn normalizer() -> Normalizer {
        Normalizer::default()
    }

    fn messy_record() -> ExtractionRecord {
        let mut record = ExtractionRecord::new(PlantIdentity::new("Peace Lily", Some("Spathiphyllum spp.")));
        record.plant.family = Some("The peace lily belongs to the Araceae family.".into());
        record.plant.description = Some("Brief Description: A shade-tolerant houseplant with white spathes2.".into());
        record.toxic_parts = vec!["Stem".into(), "Leaf".into(), "Leaf".into()];
        record.toxins.push(Toxin {
            name: Some("1. Calcium oxalate crystals.".into()),
            chemical_formula: Some("Not specified in the text".into()),
            description: Some("Needle-like crystals that pierce tissue1,2".into()),
            concentration_notes: Some("Highest in leaves.\n ◦ Distribution: throughout".into()),
        });
        record.symptoms.push(Symptom {
            name: Some("Oral irritation.".into()),
            body_system: Some("Dermal (Skin).".into()),
            severity: Some("Mild to Severe.".into()),
            onset: Some("Immediate.\n4. Additional clinical notes: none".into()),
            notes: Some("No information available.".into()),
        });
        record.treatments.push(Treatment {
            name: Some("Rinse the mouth.".into()),
            description: Some("Flush with water.".into()),
            notes: None,
            priority: Some(7),
        });
        record
    }

    #[test]
    fn normalizes_every_field() {
        let mut record = messy_record();
        normalizer().normalize(&mut record);

        assert_eq!(record.plant.family.as_deref(), Some("Araceae"));
        assert_eq!(
            record.plant.description.as_deref(),
            Some("A shade-tolerant houseplant with white spathes.")
        );
        assert_eq!(record.toxic_parts, vec!["Leaf", "Stem"]);

        let toxin = &record.toxins[0];
        assert_eq!(toxin.name.as_deref(), Some("Calcium oxalate crystals"));
        assert_eq!(toxin.chemical_formula, None);
        assert_eq!(
            toxin.description.as_deref(),
            Some("Needle-like crystals that pierce tissue")
        );
        assert_eq!(toxin.concentration_notes.as_deref(), Some("Highest in leaves."));

        let symptom = &record.symptoms[0];
        assert_eq!(symptom.name.as_deref(), Some("Oral irritation"));
        assert_eq!(symptom.body_system.as_deref(), Some("Dermal"));
        assert_eq!(symptom.severity.as_deref(), Some("severe"));
        assert_eq!(symptom.onset.as_deref(), Some("Immediate."));
        assert_eq!(symptom.notes, None);

        assert_eq!(record.treatments[0].name.as_deref(), Some("Rinse the mouth"));
        assert_eq!(record.treatments[0].priority, Some(1));
    }

    #[test]
    fn normalization_is_idempotent() {
        let n = normalizer();
        let mut once = messy_record();
        n.normalize(&mut once);
        let mut twice = once.clone();
        n.normalize(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn overrides_fill_missing_data() {
        let mut record = ExtractionRecord::new(PlantIdentity::new("Morning Glory", Some("none")));
        normalizer().normalize(&mut record);

        assert_eq!(record.plant.scientific_name.as_deref(), Some("Ipomoea spp."));
        assert_eq!(record.plant.family.as_deref(), Some("Convolvulaceae"));
        assert_eq!(record.toxins[0].name.as_deref(), Some("Lysergic acid amides"));
        assert_eq!(record.symptoms.len(), 2);
        assert_eq!(record.file_name(), "ipomoea_spp.json");
    }

    #[test]
    fn override_parts_are_sorted() {
        let mut record = ExtractionRecord::new(PlantIdentity::new("Chinese Evergreen", Some("Aglaonema modestum")));
        normalizer().normalize(&mut record);
        assert_eq!(record.toxic_parts, vec!["Leaf", "Stem", "Entire Plant"]);
    }

    #[test]
    fn injected_overrides_replace_the_bundle() {
        let normalizer = Normalizer::new(NormalizerConfig::default(), ManualOverrides::default());
        let mut record = ExtractionRecord::new(PlantIdentity::new("Morning Glory", Some("none")));
        normalizer.normalize(&mut record);
        assert_eq!(record.plant.scientific_name.as_deref(), Some("none"));
        assert!(record.toxins.is_empty());
    }

    #[test]
    fn unknown_parts_are_kept_after_known_ones() {
        assert_eq!(
            canonical_parts(&["Needles".into(), "leaf".into(), " Bark ".into()]),
            vec!["Leaf", "Bark", "Needles"]
        );
    }
}

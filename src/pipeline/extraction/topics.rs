//! Per-topic parsers and record assembly.

use std::collections::BTreeSet;

use regex::Regex;

use super::chunking::{extract, label_anchored, numbered_chunks, Item};
use super::schema::{
    basics_schema, symptom_schema, toxin_schema, treatment_schema, FieldSchema,
};
use crate::models::{ExtractionRecord, RawPlantFile, Symptom, Topic, Toxin, ToxicPart, Treatment};
use crate::pipeline::strip::strip_field;

/// Separator the collector prints between the echoed prompt and the answer.
pub const HEADER_SEPARATOR: &str =
    "============================================================";

/// Echoed basics questions that are not answers.
const BASICS_ECHOES: &[&str] = &["what botanical", "give a brief", "what is the botanical"];

/// Immutable extraction tables: one schema per topic plus part keywords.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub basics: FieldSchema,
    pub toxins: FieldSchema,
    pub symptoms: FieldSchema,
    pub treatments: FieldSchema,
    pub part_keywords: Vec<(Regex, ToxicPart)>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            basics: basics_schema(),
            toxins: toxin_schema(),
            symptoms: symptom_schema(),
            treatments: treatment_schema(),
            part_keywords: default_part_keywords(),
        }
    }
}

fn default_part_keywords() -> Vec<(Regex, ToxicPart)> {
    let table: &[(&str, ToxicPart)] = &[
        (r"leaf|leaves|foliage", ToxicPart::Leaf),
        (r"bulbs?", ToxicPart::Bulb),
        (r"flowers?|petals?|blossoms?|blooms?", ToxicPart::Flower),
        (r"pollen", ToxicPart::Pollen),
        (r"stems?|stalks?", ToxicPart::Stem),
        (r"roots?|tubers?|rhizomes?", ToxicPart::Root),
        (r"seeds?", ToxicPart::Seed),
        (r"bark", ToxicPart::Bark),
        (r"sap", ToxicPart::Sap),
        (r"latex", ToxicPart::Latex),
        (r"fruits?", ToxicPart::Fruit),
        (r"berry|berries", ToxicPart::Berry),
        (r"entire\s+plant|whole\s+plant|all\s+parts", ToxicPart::EntirePlant),
    ];
    table
        .iter()
        .map(|(words, part)| (Regex::new(&format!(r"(?i)\b(?:{words})\b")).unwrap(), *part))
        .collect()
}

/// Family and description parsed from the basics answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Basics {
    pub family: Option<String>,
    pub description: Option<String>,
}

/// Drop the echoed prompt: keep only what follows the last separator line.
pub fn strip_header(text: &str) -> &str {
    match text.rfind(HEADER_SEPARATOR) {
        Some(idx) => text[idx + HEADER_SEPARATOR.len()..].trim_start_matches('=').trim(),
        None => text.trim(),
    }
}

pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn parse_basics(&self, text: &str) -> Basics {
        let text = strip_header(text);
        let items = label_anchored(text, &self.config.basics);

        let mut basics = Basics::default();
        if !items.is_empty() {
            basics.family = first_value(&items, "family");
            basics.description = first_value(&items, "description");
        } else {
            let chunks = numbered_chunks(text);
            if chunks.is_empty() {
                // Unstructured prose: the normalizer recovers a family token from it.
                basics.family = strip_field(text);
                basics.description = strip_field(text);
            } else {
                basics.family = chunks.first().and_then(|c| strip_field(c));
                basics.description = chunks.get(1).and_then(|c| strip_field(c));
            }
        }

        basics.family = basics.family.filter(|f| !self.is_basics_echo(f));
        basics.description = basics.description.filter(|d| !self.is_basics_echo(d));
        basics
    }

    /// Toxic parts mentioned anywhere in the answer, in enumeration order.
    pub fn parse_toxic_parts(&self, text: &str) -> Vec<String> {
        let text = strip_header(text);
        let parts: BTreeSet<ToxicPart> = self
            .config
            .part_keywords
            .iter()
            .filter(|(re, _)| re.is_match(text))
            .map(|(_, part)| *part)
            .collect();
        parts.into_iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn parse_toxins(&self, text: &str) -> Vec<Toxin> {
        extract(strip_header(text), &self.config.toxins)
            .into_iter()
            .map(|mut item| Toxin {
                name: take(&mut item, "name"),
                chemical_formula: take(&mut item, "chemical_formula"),
                description: take(&mut item, "description"),
                concentration_notes: take(&mut item, "concentration_notes"),
            })
            .collect()
    }

    pub fn parse_symptoms(&self, text: &str) -> Vec<Symptom> {
        extract(strip_header(text), &self.config.symptoms)
            .into_iter()
            .map(|mut item| Symptom {
                name: take(&mut item, "name"),
                body_system: take(&mut item, "body_system"),
                severity: take(&mut item, "severity"),
                onset: take(&mut item, "onset"),
                notes: take(&mut item, "notes"),
            })
            .collect()
    }

    pub fn parse_treatments(&self, text: &str) -> Vec<Treatment> {
        extract(strip_header(text), &self.config.treatments)
            .into_iter()
            .enumerate()
            .map(|(i, mut item)| Treatment {
                name: take(&mut item, "name"),
                description: take(&mut item, "description"),
                notes: take(&mut item, "notes"),
                priority: Some(i as i64 + 1),
            })
            .collect()
    }

    fn is_basics_echo(&self, value: &str) -> bool {
        let lower = value.to_lowercase();
        BASICS_ECHOES.iter().any(|e| lower.contains(e)) || self.config.basics.is_header_echo(value)
    }

    /// Assemble one record from a plant's raw answers. Missing topics stay empty.
    pub fn extract_record(&self, raw: &RawPlantFile) -> ExtractionRecord {
        let mut record = ExtractionRecord::new(raw.identity());

        if let Some(text) = raw.raw_text(Topic::Basics) {
            let basics = self.parse_basics(text);
            record.plant.family = basics.family;
            record.plant.description = basics.description;
        }
        if let Some(text) = raw.raw_text(Topic::ToxicParts) {
            record.toxic_parts = self.parse_toxic_parts(text);
        }
        if let Some(text) = raw.raw_text(Topic::Toxins) {
            record.toxins = self.parse_toxins(text);
        }
        if let Some(text) = raw.raw_text(Topic::Symptoms) {
            record.symptoms = self.parse_symptoms(text);
        }
        if let Some(text) = raw.raw_text(Topic::Treatments) {
            record.treatments = self.parse_treatments(text);
        }

        tracing::debug!(
            plant = %record.plant.identity(),
            toxic_parts = record.toxic_parts.len(),
            toxins = record.toxins.len(),
            symptoms = record.symptoms.len(),
            treatments = record.treatments.len(),
            "Extracted record"
        );
        record
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

fn first_value(items: &[Item], field: &str) -> Option<String> {
    items.iter().find_map(|item| item.get(field).cloned())
}

fn take(item: &mut Item, field: &str) -> Option<String> {
    item.remove(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeedPlant;

    fn extractor() -> Extractor {
        Extractor::default()
    }

    #[test]
    fn strip_header_keeps_text_after_last_separator() {
        let text = format!("Question echo\n{HEADER_SEPARATOR}\nmore echo\n{HEADER_SEPARATOR}\nThe answer.");
        assert_eq!(strip_header(&text), "The answer.");
        assert_eq!(strip_header("  plain answer "), "plain answer");
    }

    #[test]
    fn basics_from_labels() {
        let text = "1. **Botanical family:** Araceae\n2. **Brief description:** An evergreen houseplant with glossy leaves.";
        let basics = extractor().parse_basics(text);
        assert_eq!(basics.family.as_deref(), Some("Araceae"));
        assert_eq!(
            basics.description.as_deref(),
            Some("An evergreen houseplant with glossy leaves.")
        );
    }

    #[test]
    fn basics_from_numbered_entries() {
        let text = "1. Liliaceae\n2. A bulbous perennial with large trumpet-shaped flowers.";
        let basics = extractor().parse_basics(text);
        assert_eq!(basics.family.as_deref(), Some("Liliaceae"));
        assert_eq!(
            basics.description.as_deref(),
            Some("A bulbous perennial with large trumpet-shaped flowers.")
        );
    }

    #[test]
    fn basics_rejects_echoed_questions() {
        let text = "1. What botanical family does it belong to?\n2. Give a brief description.";
        let basics = extractor().parse_basics(text);
        assert_eq!(basics, Basics::default());
    }

    #[test]
    fn basics_from_prose_keeps_text_for_family_recovery() {
        let basics = extractor().parse_basics("The peace lily belongs to the Araceae family.");
        assert!(basics.family.unwrap().contains("Araceae"));
        assert!(basics.description.is_some());
    }

    #[test]
    fn toxic_parts_keywords_and_synonyms() {
        let ex = extractor();
        assert_eq!(
            ex.parse_toxic_parts("The leaves, stems and berries are toxic. Bulbs are worst."),
            vec!["Leaf", "Bulb", "Stem", "Berry"]
        );
        assert_eq!(
            ex.parse_toxic_parts("All parts of the plant are poisonous."),
            vec!["Entire Plant"]
        );
        assert_eq!(ex.parse_toxic_parts("The whole plant, including pollen."), vec!["Pollen", "Entire Plant"]);
    }

    #[test]
    fn toxic_parts_require_word_boundaries() {
        // "sapling" is not sap, "seedy" is not seed.
        assert!(extractor().parse_toxic_parts("A sapling with a seedy look.").is_empty());
    }

    #[test]
    fn treatments_are_prioritised_in_order() {
        let text = "Treatment name: Decontamination\nDescription: Induce vomiting.\n\
                    Treatment name: Activated charcoal\nDescription: Binds toxins.";
        let treatments = extractor().parse_treatments(text);
        assert_eq!(treatments.len(), 2);
        assert_eq!(treatments[0].priority, Some(1));
        assert_eq!(treatments[1].priority, Some(2));
        assert_eq!(treatments[1].name.as_deref(), Some("Activated charcoal"));
    }

    #[test]
    fn extract_record_assembles_all_topics() {
        let mut raw = RawPlantFile::new(SeedPlant {
            common_name: "Easter Lily".into(),
            scientific_name: Some("Lilium longiflorum".into()),
        });
        raw.set_raw_text(Topic::Basics, "Botanical family: Liliaceae\nBrief description: A white trumpet lily grown for spring.".into());
        raw.set_raw_text(Topic::ToxicParts, "All parts, including pollen.".into());
        raw.set_raw_text(
            Topic::Toxins,
            "1. Name: Lycorine\n2. Chemical formula: C16H17NO4\n3. Mechanism: causes vomiting1.\nSources: 1,2".into(),
        );
        raw.set_raw_text(Topic::Symptoms, "1. Vomiting\n2. Acute kidney injury".into());

        let record = extractor().extract_record(&raw);
        assert_eq!(record.plant.family.as_deref(), Some("Liliaceae"));
        assert_eq!(record.toxic_parts, vec!["Pollen", "Entire Plant"]);
        assert_eq!(record.toxins.len(), 1);
        assert_eq!(record.toxins[0].chemical_formula.as_deref(), Some("C16H17NO4"));
        assert_eq!(record.toxins[0].description.as_deref(), Some("causes vomiting."));
        assert_eq!(record.symptoms.len(), 2);
        assert!(record.treatments.is_empty());
        assert_eq!(record.file_name(), "lilium_longiflorum.json");
    }

    #[test]
    fn extraction_is_deterministic() {
        let text = "Symptom name: Vomiting\nSeverity: mild\nSymptom name: Ataxia\nSeverity: severe";
        let ex = extractor();
        assert_eq!(ex.parse_symptoms(text), ex.parse_symptoms(text));
    }
}

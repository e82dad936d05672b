use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::enums::Topic;

/// Scientific-name placeholders that mean "unknown" rather than a real binomial.
const NAME_PLACEHOLDERS: &[&str] = &["n/a", "na", "none", "unknown", "null"];

/// Identity of the plant a record describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantIdentity {
    #[serde(default)]
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PlantIdentity {
    pub fn new(common_name: &str, scientific_name: Option<&str>) -> Self {
        Self {
            common_name: common_name.to_string(),
            scientific_name: scientific_name.map(str::to_string),
            family: None,
            description: None,
        }
    }

    /// Scientific name when it is a real value, otherwise the common name.
    pub fn identity(&self) -> &str {
        match self.scientific_name.as_deref() {
            Some(name) if !is_placeholder_name(name) => name.trim(),
            _ => self.common_name.trim(),
        }
    }

    /// Output file name derived from the identity, stable across re-runs.
    pub fn file_name(&self) -> String {
        format!("{}.json", snake_case(self.identity()))
    }
}

/// True for empty or placeholder scientific names ("N/A", "none").
pub fn is_placeholder_name(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    lower.is_empty() || NAME_PLACEHOLDERS.contains(&lower.as_str())
}

/// Lower-case and join words with single underscores. Apostrophes are dropped;
/// any other run of non-alphanumerics separates words.
pub fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        } else if !matches!(c, '\'' | '\u{2019}') {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        "unknown_plant".to_string()
    } else {
        out
    }
}

/// The plant as seeded from the worklist, before any answers are parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedPlant {
    #[serde(default)]
    pub common_name: String,
    #[serde(default)]
    pub scientific_name: Option<String>,
}

/// A collected plant: its seed identity plus one raw answer per topic.
///
/// Raw answers are kept as arbitrary JSON so that malformed values
/// (null, numbers, objects) are detected downstream instead of failing the load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlantFile {
    #[serde(default)]
    pub plant: SeedPlant,
    #[serde(default)]
    pub raw_responses: BTreeMap<String, serde_json::Value>,
}

impl RawPlantFile {
    pub fn new(plant: SeedPlant) -> Self {
        Self {
            plant,
            raw_responses: BTreeMap::new(),
        }
    }

    /// Raw answer text for a topic; `None` when absent, not a string, or blank.
    pub fn raw_text(&self, topic: Topic) -> Option<&str> {
        self.raw_responses
            .get(topic.as_str())
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn set_raw_text(&mut self, topic: Topic, text: String) {
        self.raw_responses
            .insert(topic.as_str().to_string(), serde_json::Value::String(text));
    }

    pub fn identity(&self) -> PlantIdentity {
        PlantIdentity::new(
            &self.plant.common_name,
            self.plant.scientific_name.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_prefers_scientific_name() {
        let plant = PlantIdentity::new("Lily", Some("Lilium longiflorum"));
        assert_eq!(plant.identity(), "Lilium longiflorum");
        assert_eq!(plant.file_name(), "lilium_longiflorum.json");
    }

    #[test]
    fn identity_falls_back_to_common_name_for_placeholders() {
        let plant = PlantIdentity::new("Morning Glory", Some("N/A"));
        assert_eq!(plant.identity(), "Morning Glory");
        assert_eq!(plant.file_name(), "morning_glory.json");

        let plant = PlantIdentity::new("Mint", None);
        assert_eq!(plant.file_name(), "mint.json");
    }

    #[test]
    fn snake_case_drops_punctuation() {
        assert_eq!(snake_case("Scadoxus spp."), "scadoxus_spp");
        assert_eq!(snake_case("Hyacinthoides non-scripta"), "hyacinthoides_non_scripta");
        assert_eq!(snake_case("  "), "unknown_plant");
    }

    #[test]
    fn snake_case_separates_on_any_punctuation() {
        assert_eq!(snake_case("Monstera deliciosa/adansonii"), "monstera_deliciosa_adansonii");
        assert_eq!(snake_case("Aloe vera (A. barbadensis)"), "aloe_vera_a_barbadensis");
        assert_eq!(snake_case("Lilium__longiflorum"), "lilium_longiflorum");
        assert_eq!(snake_case("St. John's Wort"), "st_johns_wort");
    }

    #[test]
    fn raw_text_rejects_non_strings_and_blanks() {
        let json = r#"{
            "plant": {"common_name": "Lily", "scientific_name": "Lilium spp."},
            "raw_responses": {"basics": "Family: Liliaceae", "toxins": 42, "symptoms": "  ", "treatments": null}
        }"#;
        let raw: RawPlantFile = serde_json::from_str(json).unwrap();
        assert_eq!(raw.raw_text(Topic::Basics), Some("Family: Liliaceae"));
        assert_eq!(raw.raw_text(Topic::Toxins), None);
        assert_eq!(raw.raw_text(Topic::Symptoms), None);
        assert_eq!(raw.raw_text(Topic::Treatments), None);
        assert_eq!(raw.raw_text(Topic::ToxicParts), None);
    }
}

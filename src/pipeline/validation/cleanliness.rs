// Tier 3: no parsing or generation artifacts survived normalization.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::Issue;
use super::ValidatorConfig;
use crate::models::ExtractionRecord;
use crate::pipeline::strip::is_boilerplate;

static NUMBERED_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\d+\.\s").unwrap());

const SNIPPET_LEN: usize = 60;

/// Every string in the record with its JSON path ("toxins[0].description").
fn collect_strings(value: &Value, path: String, out: &mut Vec<(String, String)>) {
    match value {
        Value::String(s) => out.push((path, s.clone())),
        Value::Object(map) => {
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect_strings(v, child, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                collect_strings(v, format!("{path}[{i}]"), out);
            }
        }
        _ => {}
    }
}

fn snippet(value: &str) -> String {
    value.chars().take(SNIPPET_LEN).collect::<String>().replace('\n', "\\n")
}

pub fn check(record: &ExtractionRecord, config: &ValidatorConfig, issues: &mut Vec<Issue>) {
    let mut strings = Vec::new();
    match serde_json::to_value(record) {
        Ok(value) => collect_strings(&value, String::new(), &mut strings),
        Err(e) => tracing::warn!(error = %e, "Record could not be serialized for artifact scan"),
    }

    for (path, value) in &strings {
        let artifact = config
            .artifacts
            .iter()
            .find(|(re, _)| re.is_match(value))
            .map(|(_, label)| *label)
            .or_else(|| is_boilerplate(value).then_some("boilerplate placeholder"));
        if let Some(label) = artifact {
            issues.push(Issue::cleanliness(format!(
                "{path} contains {label}: \"{}...\"",
                snippet(value)
            )));
        }
    }

    if let Some(family) = record.plant.family.as_deref() {
        let len = family.chars().count();
        if len > 40 {
            issues.push(Issue::cleanliness(format!(
                "family is too long ({len} chars), should be a taxonomic family name"
            )));
        }
        if family.contains('.') && len > 20 {
            issues.push(Issue::cleanliness("family contains full stops, looks like prose"));
        }
        let lower = family.trim().to_lowercase();
        if config.header_labels.iter().any(|l| lower.starts_with(l.as_str())) {
            issues.push(Issue::cleanliness(format!(
                "family \"{family}\" looks like a header label, not a real value"
            )));
        }
    }

    let sections: [(&str, Vec<Option<&str>>); 3] = [
        ("toxins", record.toxins.iter().map(|t| t.name.as_deref()).collect()),
        ("symptoms", record.symptoms.iter().map(|s| s.name.as_deref()).collect()),
        ("treatments", record.treatments.iter().map(|t| t.name.as_deref()).collect()),
    ];
    for (section, names) in &sections {
        for (i, name) in names.iter().enumerate() {
            if let Some(name) = name {
                if name.trim_end().ends_with('.') {
                    issues.push(Issue::cleanliness(format!(
                        "{section}[{i}].name ends with a period: \"{}\"",
                        snippet(name)
                    )));
                }
            }
        }
    }

    for (i, symptom) in record.symptoms.iter().enumerate() {
        if symptom
            .onset
            .as_deref()
            .is_some_and(|o| NUMBERED_CONTINUATION.is_match(o))
        {
            issues.push(Issue::cleanliness(format!(
                "symptoms[{i}].onset contains trailing numbered item"
            )));
        }
    }

    for (i, toxin) in record.toxins.iter().enumerate() {
        if let Some(formula) = toxin.chemical_formula.as_deref() {
            if formula.trim().to_lowercase().starts_with("not specified") {
                issues.push(Issue::cleanliness(format!(
                    "toxins[{i}].chemical_formula is prose \"{}\", should be null",
                    snippet(formula)
                )));
            }
        }
    }
}

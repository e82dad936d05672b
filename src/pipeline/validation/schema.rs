// Tier 2: values fit the storage schema (lengths, enumerations, priorities).

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::types::Issue;
use super::ValidatorConfig;
use crate::models::{BodySystem, ExtractionRecord, Severity, ToxicPart};

/// Characters a formula may contain; anything else in a long value means prose.
static FORMULA_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9()\[\]{}\s,\-\.]+$").unwrap());

const FORMULA_PROSE_MIN_LEN: usize = 30;

fn check_len(path: &str, value: Option<&str>, limit: usize, issues: &mut Vec<Issue>) {
    if let Some(v) = value {
        let len = v.chars().count();
        if len > limit {
            issues.push(Issue::schema(format!("{path} exceeds {limit} chars ({len} chars)")));
        }
    }
}

pub fn check(record: &ExtractionRecord, config: &ValidatorConfig, issues: &mut Vec<Issue>) {
    let limits = &config.limits;
    let plant = &record.plant;

    check_len("plant.common_name", Some(&plant.common_name), limits.common_name, issues);
    check_len("plant.scientific_name", plant.scientific_name.as_deref(), limits.scientific_name, issues);
    check_len("plant.family", plant.family.as_deref(), limits.family, issues);

    for part in &record.toxic_parts {
        if ToxicPart::from_str(part).is_err() {
            issues.push(Issue::schema(format!("toxic_part \"{part}\" is not in the valid set")));
        }
        check_len("toxic_part", Some(part), limits.toxic_part, issues);
    }

    for (i, toxin) in record.toxins.iter().enumerate() {
        check_len(&format!("toxins[{i}].name"), toxin.name.as_deref(), limits.toxin_name, issues);
        if let Some(formula) = toxin.chemical_formula.as_deref() {
            check_len(
                &format!("toxins[{i}].chemical_formula"),
                Some(formula),
                limits.chemical_formula,
                issues,
            );
            if formula.chars().count() > FORMULA_PROSE_MIN_LEN && !FORMULA_CHARS.is_match(formula) {
                issues.push(Issue::schema(format!(
                    "toxins[{i}].chemical_formula looks like prose, not a formula"
                )));
            }
        }
    }

    for (i, symptom) in record.symptoms.iter().enumerate() {
        check_len(&format!("symptoms[{i}].name"), symptom.name.as_deref(), limits.symptom_name, issues);
        if let Some(severity) = symptom.severity.as_deref() {
            if Severity::from_str(severity).is_err() {
                issues.push(Issue::schema(format!(
                    "symptoms[{i}].severity \"{severity}\" is not a valid enum (must be mild/moderate/severe/fatal)"
                )));
            }
        }
        if let Some(system) = symptom.body_system.as_deref() {
            if BodySystem::from_str(system).is_err() {
                issues.push(Issue::schema(format!(
                    "symptoms[{i}].body_system \"{system}\" is not a recognized system"
                )));
            }
            check_len(&format!("symptoms[{i}].body_system"), Some(system), limits.body_system, issues);
        }
        check_len(&format!("symptoms[{i}].onset"), symptom.onset.as_deref(), limits.onset, issues);
    }

    for (i, treatment) in record.treatments.iter().enumerate() {
        match treatment.priority {
            None => issues.push(Issue::schema(format!("treatments[{i}] has no priority"))),
            Some(p) if p < 1 => issues.push(Issue::schema(format!(
                "treatments[{i}].priority \"{p}\" is not a valid int >= 1"
            ))),
            Some(_) => {}
        }
        check_len(
            &format!("treatments[{i}].name"),
            treatment.name.as_deref(),
            limits.treatment_name,
            issues,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PlantIdentity, Symptom, Toxin, Treatment};

    fn messages(record: &ExtractionRecord) -> Vec<String> {
        let mut issues = Vec::new();
        check(record, &ValidatorConfig::default(), &mut issues);
        issues.into_iter().map(|i| i.message).collect()
    }

    fn record() -> ExtractionRecord {
        ExtractionRecord::new(PlantIdentity::new("Lily", Some("Lilium spp.")))
    }

    #[test]
    fn enumerations_must_be_canonical() {
        let mut r = record();
        r.toxic_parts = vec!["Leaf".into(), "Leaves".into()];
        r.symptoms.push(Symptom {
            name: Some("Vomiting".into()),
            severity: Some("Mild to severe".into()),
            body_system: Some("Gut".into()),
            ..Default::default()
        });
        let msgs = messages(&r);
        assert_eq!(msgs.len(), 3);
        assert!(msgs[0].contains("\"Leaves\""));
        assert!(msgs[1].contains("severity"));
        assert!(msgs[2].contains("body_system \"Gut\""));
    }

    #[test]
    fn canonical_values_pass() {
        let mut r = record();
        r.toxic_parts = vec!["Entire Plant".into()];
        r.symptoms.push(Symptom {
            severity: Some("fatal".into()),
            body_system: Some("Renal".into()),
            ..Default::default()
        });
        r.treatments.push(Treatment {
            name: Some("Fluids".into()),
            priority: Some(1),
            ..Default::default()
        });
        assert!(messages(&r).is_empty());
    }

    #[test]
    fn length_limits_are_enforced() {
        let mut r = record();
        r.symptoms.push(Symptom {
            name: Some("x".repeat(151)),
            onset: Some("y".repeat(101)),
            ..Default::default()
        });
        let msgs = messages(&r);
        assert!(msgs.contains(&"symptoms[0].name exceeds 150 chars (151 chars)".to_string()));
        assert!(msgs.contains(&"symptoms[0].onset exceeds 100 chars (101 chars)".to_string()));
    }

    #[test]
    fn prose_formula_is_flagged() {
        let mut r = record();
        r.toxins.push(Toxin {
            name: Some("Saponins".into()),
            chemical_formula: Some("Varies; a family of glycosides (see notes)".into()),
            ..Default::default()
        });
        r.toxins.push(Toxin {
            name: Some("Lycorine".into()),
            chemical_formula: Some("C16H17NO4".into()),
            ..Default::default()
        });
        let msgs = messages(&r);
        assert_eq!(
            msgs,
            vec!["toxins[0].chemical_formula looks like prose, not a formula".to_string()]
        );
    }

    #[test]
    fn treatment_priority_required_and_positive() {
        let mut r = record();
        r.treatments.push(Treatment {
            name: Some("Fluids".into()),
            ..Default::default()
        });
        r.treatments.push(Treatment {
            name: Some("Charcoal".into()),
            priority: Some(0),
            ..Default::default()
        });
        let msgs = messages(&r);
        assert_eq!(msgs[0], "treatments[0] has no priority");
        assert!(msgs[1].starts_with("treatments[1].priority \"0\""));
    }
}

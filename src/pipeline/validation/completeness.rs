// Tier 1: every required section is present and non-empty.

use super::types::Issue;
use crate::models::ExtractionRecord;
use crate::pipeline::normalize::overrides::MIN_DESCRIPTION_LEN;

pub fn check(record: &ExtractionRecord, issues: &mut Vec<Issue>) {
    let plant = &record.plant;

    if plant.common_name.trim().is_empty() {
        issues.push(Issue::completeness("common_name is missing or empty"));
    }

    match plant.scientific_name.as_deref().map(str::trim) {
        None | Some("") => issues.push(Issue::completeness("scientific_name is null or empty")),
        Some(name) if name.eq_ignore_ascii_case("n/a") => issues.push(Issue::completeness(
            "scientific_name is 'N/A', needs a real binomial",
        )),
        Some(name)
            if name.split_whitespace().count() < 2 && !name.to_lowercase().contains("spp") =>
        {
            issues.push(Issue::completeness(format!(
                "scientific_name \"{name}\" does not look like a binomial"
            )))
        }
        Some(_) => {}
    }

    if plant.family.as_deref().map_or(true, |f| f.trim().is_empty()) {
        issues.push(Issue::completeness("family is missing"));
    }

    let description_len = plant
        .description
        .as_deref()
        .map(|d| d.trim().chars().count())
        .unwrap_or(0);
    if description_len < MIN_DESCRIPTION_LEN {
        issues.push(Issue::completeness(format!(
            "description is missing or too short (< {MIN_DESCRIPTION_LEN} chars)"
        )));
    }

    if record.toxic_parts.is_empty() {
        issues.push(Issue::completeness("toxic_parts[] is empty"));
    }

    check_named("toxins", record.toxins.iter().map(|t| t.name.as_deref()), issues);
    check_named("symptoms", record.symptoms.iter().map(|s| s.name.as_deref()), issues);
    check_named("treatments", record.treatments.iter().map(|t| t.name.as_deref()), issues);
}

/// The section has at least one item and every item has a name.
fn check_named<'a>(
    section: &str,
    names: impl ExactSizeIterator<Item = Option<&'a str>>,
    issues: &mut Vec<Issue>,
) {
    if names.len() == 0 {
        issues.push(Issue::completeness(format!("{section}[] is empty")));
    }
    for (i, name) in names.enumerate() {
        if name.map_or(true, |n| n.trim().is_empty()) {
            issues.push(Issue::completeness(format!("{section}[{i}] has no name")));
        }
    }
}

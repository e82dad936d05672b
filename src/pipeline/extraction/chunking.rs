//! Item chunking.
//!
//! Label-anchored chunking runs first: every occurrence of the first field's
//! label opens an item and fields are assigned by label inside it. When the
//! text carries no such label, numbered-list chunking takes over and each
//! "N." entry is one item whose first line is the first field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::schema::{FieldKind, FieldSchema};
use crate::pipeline::strip::{strip_field, strip_field_blocks};

/// One extracted item: field name to cleaned value. Absent fields are absent.
pub type Item = BTreeMap<&'static str, String>;

/// Top-level list numbering only; indented sub-lists stay inside their entry.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\d+\.[ \t]+").unwrap());

static LEADING_PUNCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\s:\-\.\*_]+").unwrap());

static TRAILING_EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\*_]+$").unwrap());

/// A label occurrence: `start..end` covers numbering, label text and colon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LabelHit {
    start: usize,
    end: usize,
}

/// Split `text` into items, trying label anchors before numbered entries.
pub fn extract(text: &str, schema: &FieldSchema) -> Vec<Item> {
    let items = label_anchored(text, schema);
    if !items.is_empty() {
        return items;
    }
    numbered(text, schema)
}

/// Strategy A. Empty when the first field's label never occurs.
pub fn label_anchored(text: &str, schema: &FieldSchema) -> Vec<Item> {
    let Some(first) = schema.first_field() else {
        return Vec::new();
    };

    let mut raw: Vec<(usize, usize)> = first
        .labels
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
        .collect();
    raw.sort_unstable();

    // Overlapping occurrences ("Symptom name:" also contains "name:") are one anchor.
    let mut anchors: Vec<usize> = Vec::new();
    let mut covered_to = 0;
    for (start, end) in raw {
        if !anchors.is_empty() && start < covered_to {
            covered_to = covered_to.max(end);
            continue;
        }
        anchors.push(start);
        covered_to = end;
    }

    let mut items = Vec::new();
    for (i, &start) in anchors.iter().enumerate() {
        let end = anchors.get(i + 1).copied().unwrap_or(text.len());
        let item = assign_fields(&text[start..end], schema, false);
        if !item.is_empty() {
            items.push(item);
        }
    }
    items
}

/// Strategy B: one item per "N." entry.
pub fn numbered(text: &str, schema: &FieldSchema) -> Vec<Item> {
    let Some(first) = schema.first_field() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    for chunk in numbered_chunks(text) {
        let first_line = chunk.lines().next().unwrap_or("");
        if schema.is_header_echo(first_line) {
            tracing::debug!(line = %first_line.trim(), "Dropping echoed header entry");
            continue;
        }
        let mut item = assign_fields(chunk, schema, true);
        if let Some(value) = clean_value(first_line, first.kind) {
            item.insert(first.name, value);
        }
        if !item.is_empty() {
            items.push(item);
        }
    }
    items
}

/// Bodies of the "N." entries of a numbered list, markers removed.
pub fn numbered_chunks(text: &str) -> Vec<&str> {
    let markers: Vec<(usize, usize)> = LIST_MARKER
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    markers
        .iter()
        .enumerate()
        .map(|(i, &(_, body_start))| {
            let end = markers.get(i + 1).map(|&(s, _)| s).unwrap_or(text.len());
            &text[body_start..end]
        })
        .collect()
}

/// Assign schema fields inside one item span.
///
/// Each field takes its earliest label occurrence (longest match first on equal
/// starts). When two fields' labels begin at the same offset, the field declared
/// first claims it and the other moves on to its next occurrence. A value runs
/// from the end of its label to the nearest later label of any other field.
fn assign_fields(span: &str, schema: &FieldSchema, skip_first: bool) -> Item {
    let fields = schema.fields();
    let skip = usize::from(skip_first);

    let hits: Vec<Vec<LabelHit>> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            if i < skip {
                return Vec::new();
            }
            let mut found: Vec<LabelHit> = field
                .labels
                .iter()
                .flat_map(|re| {
                    re.find_iter(span).map(|m| LabelHit {
                        start: m.start(),
                        end: m.end(),
                    })
                })
                .collect();
            found.sort_unstable_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
            found
        })
        .collect();

    let mut claimed: Vec<usize> = Vec::new();
    let mut chosen: Vec<Option<LabelHit>> = vec![None; fields.len()];
    for (i, field_hits) in hits.iter().enumerate() {
        let hit = field_hits.iter().find(|h| !claimed.contains(&h.start)).copied();
        if let Some(h) = hit {
            claimed.push(h.start);
        }
        chosen[i] = hit;
    }

    let mut item = Item::new();
    for (i, hit) in chosen.iter().enumerate() {
        let Some(hit) = hit else { continue };
        let boundary = hits
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, other)| other.iter())
            .map(|h| h.start)
            .filter(|&s| s >= hit.end)
            .min()
            .unwrap_or(span.len());
        if let Some(value) = clean_value(&span[hit.end..boundary], fields[i].kind) {
            item.insert(fields[i].name, value);
        }
    }
    item
}

/// Trim label leftovers and quotes, then strip artifacts for the field's kind.
fn clean_value(raw: &str, kind: FieldKind) -> Option<String> {
    let value = LEADING_PUNCT.replace(raw.trim(), "");
    let value = TRAILING_EMPHASIS.replace(&value, "");
    let value = value
        .trim()
        .trim_start_matches(['"', '\'', '“'])
        .trim_end_matches(['"', '\'', '”'])
        .trim();
    match kind {
        FieldKind::Text => strip_field(value),
        FieldKind::Formula => strip_field_blocks(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::schema::{symptom_schema, toxin_schema, treatment_schema};

    #[test]
    fn one_item_per_anchor() {
        let text = "Symptom name: Vomiting\nAffected body system: Gastrointestinal\nSeverity: mild\n\n\
                    Symptom name: Tremors\nAffected body system: Neurological\nSeverity: severe\n\n\
                    Symptom name: Drooling\nSeverity: mild";
        let items = extract(text, &symptom_schema());
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["name"], "Vomiting");
        assert_eq!(items[0]["body_system"], "Gastrointestinal");
        assert_eq!(items[1]["severity"], "severe");
        assert_eq!(items[2]["name"], "Drooling");
        assert!(!items[2].contains_key("body_system"));
    }

    #[test]
    fn numbered_labels_with_citations() {
        let text = "1. Name: Lycorine\n2. Chemical formula: C16H17NO4\n3. Mechanism: causes vomiting1.\nSources: 1,2";
        let items = extract(text, &toxin_schema());
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item["name"], "Lycorine");
        assert_eq!(item["chemical_formula"], "C16H17NO4");
        assert_eq!(item["description"], "causes vomiting.");
        assert!(!item.contains_key("concentration_notes"));
    }

    #[test]
    fn bold_markdown_labels() {
        let text = "**Treatment Name:** Decontamination\n**Brief description of the procedure:** Induce emesis.\n\
                    **Situation-specific notes:** Only within 2 hours.\n\n\
                    **Treatment Name:** Fluids\n**Description:** IV fluids for 48 hours.";
        let items = extract(text, &treatment_schema());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Decontamination");
        assert_eq!(items[0]["description"], "Induce emesis.");
        assert_eq!(items[0]["notes"], "Only within 2 hours.");
        assert_eq!(items[1]["description"], "IV fluids for 48 hours.");
    }

    #[test]
    fn overlapping_first_field_labels_are_one_anchor() {
        let text = "Symptom name: Vomiting\nSeverity: mild";
        let items = label_anchored(text, &symptom_schema());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Vomiting");
    }

    #[test]
    fn value_runs_to_nearest_other_label() {
        let text = "Symptom name: Vomiting Severity: moderate Onset: 2 hours";
        let items = extract(text, &symptom_schema());
        assert_eq!(items[0]["name"], "Vomiting");
        assert_eq!(items[0]["severity"], "moderate");
        assert_eq!(items[0]["onset"], "2 hours");
    }

    #[test]
    fn shared_label_offset_goes_to_the_earlier_field() {
        let schema = FieldSchema::new()
            .field("name", &["Name"])
            .field("first", &["Detail"])
            .field("second", &["Detail"]);
        let items = extract("Name: x\nDetail: one\nDetail: two", &schema);
        assert_eq!(items[0]["first"], "one");
        assert_eq!(items[0]["second"], "two");
    }

    #[test]
    fn boilerplate_values_are_absent() {
        let text = "Name: Saponins\nChemical formula: Not specified in the provided sources.\nDescription: Foaming agents.";
        let items = extract(text, &toxin_schema());
        assert!(!items[0].contains_key("chemical_formula"));
        assert_eq!(items[0]["description"], "Foaming agents.");
    }

    #[test]
    fn numbered_list_fallback() {
        let text = "1. Vomiting\n2. Lethargy\n3. Drooling";
        let items = extract(text, &symptom_schema());
        assert_eq!(items.len(), 3);
        assert_eq!(items[1]["name"], "Lethargy");
    }

    #[test]
    fn numbered_fallback_assigns_labelled_fields_except_name() {
        let text = "1. Vomiting\nSeverity: mild\nOnset: within hours\n2. Kidney failure\nSeverity: fatal";
        let items = extract(text, &symptom_schema());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["name"], "Vomiting");
        assert_eq!(items[0]["severity"], "mild");
        assert_eq!(items[0]["onset"], "within hours");
        assert_eq!(items[1]["severity"], "fatal");
    }

    #[test]
    fn echoed_header_entry_is_dropped() {
        let text = "1. Symptom name\n2. Vomiting\n3. Lethargy";
        let items = extract(text, &symptom_schema());
        let names: Vec<&str> = items.iter().map(|i| i["name"].as_str()).collect();
        assert_eq!(names, vec!["Vomiting", "Lethargy"]);
    }

    #[test]
    fn unstructured_text_yields_nothing() {
        assert!(extract("Cats may vomit after chewing the leaves.", &symptom_schema()).is_empty());
        assert!(extract("", &toxin_schema()).is_empty());
    }

    #[test]
    fn quotes_and_emphasis_are_trimmed() {
        let text = "Name: \"Oxalic acid\"\nChemical formula: **C2H2O4**";
        let items = extract(text, &toxin_schema());
        assert_eq!(items[0]["name"], "Oxalic acid");
        assert_eq!(items[0]["chemical_formula"], "C2H2O4");
    }

    #[test]
    fn numbered_chunks_strip_markers() {
        assert_eq!(numbered_chunks("1. Araceae\n2. A shrub."), vec!["Araceae\n", "A shrub."]);
        assert!(numbered_chunks("no list").is_empty());
    }

    #[test]
    fn indented_sub_list_stays_in_its_entry() {
        let chunks = numbered_chunks("1. Vomiting\n   1. mild form\n2. Lethargy");
        assert_eq!(chunks, vec!["Vomiting\n   1. mild form\n", "Lethargy"]);
    }
}

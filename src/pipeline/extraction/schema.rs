//! Field schemas: ordered fields, each recognised in prose by label patterns.
//!
//! A label is matched case-insensitively, optionally preceded by list numbering
//! ("3."), a bullet glyph or markdown emphasis, optionally followed by a short
//! parenthetical, and always terminated by a colon ("3. **Severity:**").

use regex::Regex;

/// How an assigned value is cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Prose or names: full artifact stripping.
    Text,
    /// Formula-like values whose trailing digits are meaningful.
    Formula,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub labels: Vec<Regex>,
}

/// Ordered mapping from field name to label patterns.
///
/// The first field anchors items. `header_labels` are the question's own field
/// names (lower-case); a numbered entry whose first line is one of them is an
/// echo of the question, not an answer.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
    header_labels: Vec<String>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            header_labels: Vec::new(),
        }
    }

    /// Add a prose field recognised by any of `labels`.
    pub fn field(self, name: &'static str, labels: &[&str]) -> Self {
        self.push(name, FieldKind::Text, labels)
    }

    /// Add a formula field recognised by any of `labels`.
    pub fn formula(self, name: &'static str, labels: &[&str]) -> Self {
        self.push(name, FieldKind::Formula, labels)
    }

    pub fn header_labels(mut self, labels: &[&str]) -> Self {
        self.header_labels = labels.iter().map(|l| l.to_lowercase()).collect();
        self
    }

    fn push(mut self, name: &'static str, kind: FieldKind, labels: &[&str]) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            labels: labels.iter().map(|l| label_pattern(l)).collect(),
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn first_field(&self) -> Option<&FieldSpec> {
        self.fields.first()
    }

    /// True when `line` is the question's own field label echoed back.
    pub fn is_header_echo(&self, line: &str) -> bool {
        let cleaned = line
            .trim()
            .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
            .trim_end_matches([':', '.', '?'])
            .trim()
            .to_lowercase();
        if cleaned.is_empty() {
            return false;
        }
        self.header_labels
            .iter()
            .any(|h| cleaned == *h || cleaned.starts_with(h.as_str()))
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile a label text into its recogniser.
pub fn label_pattern(label: &str) -> Regex {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let pattern = format!(
        r"(?i)(?:\d+[.)][ \t]*|[•◦▪*\-][ \t]*)?(?:\*\*|__)?\b{}\b[ \t]*(?:\([^)\n]{{0,80}}\))?(?:\s+in\s+cats)?[ \t]*(?:\*\*|__)?:(?:\*\*|__)?",
        words.join(r"\s+")
    );
    Regex::new(&pattern).unwrap()
}

// ═══════════════════════════════════════════
// Topic schemas
// ═══════════════════════════════════════════

pub fn basics_schema() -> FieldSchema {
    FieldSchema::new()
        .field("family", &["Botanical family", "Plant family", "Family"])
        .field("description", &["Brief description", "Plant description", "Description"])
        .header_labels(&["botanical family", "brief description", "description"])
}

pub fn toxin_schema() -> FieldSchema {
    FieldSchema::new()
        .field(
            "name",
            &["Name of the compound", "Compound name", "Toxin name", "Toxin", "Name"],
        )
        .formula("chemical_formula", &["Chemical formula", "Molecular formula", "Formula"])
        .field(
            "description",
            &[
                "Brief description of its mechanism of action",
                "Mechanism of action",
                "Mechanism",
                "Brief description",
                "Description",
            ],
        )
        .field(
            "concentration_notes",
            &[
                "Notes on concentration or potency",
                "Any notes on concentration or potency",
                "Concentration or potency",
                "Notes on concentration",
                "Concentration notes",
                "Toxicity notes",
                "Any notes",
                "Concentration",
                "Potency",
                "Notes",
            ],
        )
        .header_labels(&[
            "name of the compound",
            "chemical formula",
            "brief description of its mechanism",
            "mechanism of action",
            "any notes on concentration",
        ])
}

pub fn symptom_schema() -> FieldSchema {
    FieldSchema::new()
        .field("name", &["Symptom name", "Symptom", "Name"])
        .field("body_system", &["Affected body system", "Body system affected", "Body system"])
        .field("severity", &["Severity level", "Severity"])
        .field("onset", &["Typical onset time", "Time to onset", "Onset time", "Onset"])
        .field(
            "notes",
            &[
                "Any additional clinical notes",
                "Additional clinical notes",
                "Clinical notes",
                "Additional notes",
                "Notes",
            ],
        )
        .header_labels(&[
            "symptom name",
            "affected body system",
            "severity",
            "typical onset time",
            "any additional clinical notes",
        ])
}

pub fn treatment_schema() -> FieldSchema {
    FieldSchema::new()
        .field("name", &["Treatment name", "Treatment", "Name"])
        .field(
            "description",
            &[
                "Brief description of the procedure",
                "Description of the procedure",
                "Procedure",
                "Brief description",
                "Description",
            ],
        )
        .field(
            "notes",
            &[
                "Any situation-specific notes",
                "Situation-specific notes",
                "Situation notes",
                "Notes",
            ],
        )
        .header_labels(&[
            "treatment name",
            "brief description of the procedure",
            "any situation-specific notes",
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_matches_plain_numbered_bulleted_and_bold_forms() {
        let re = label_pattern("Severity");
        assert!(re.is_match("Severity: mild"));
        assert!(re.is_match("3. Severity: mild"));
        assert!(re.is_match("• Severity: mild"));
        assert!(re.is_match("**Severity:** mild"));
        assert!(re.is_match("3. **Severity**: mild"));
        assert!(re.is_match("severity (mild/moderate/severe/fatal): severe"));
    }

    #[test]
    fn label_requires_a_colon() {
        let re = label_pattern("Severity");
        assert!(!re.is_match("Severity varies with the dose"));
        assert!(!label_pattern("Symptom name").is_match("1. Symptom name\n"));
    }

    #[test]
    fn numbered_match_starts_at_the_number() {
        let re = label_pattern("Chemical formula");
        let m = re.find("x\n2. Chemical formula: C6H6").unwrap();
        assert_eq!(m.start(), 2);
        assert_eq!(m.as_str(), "2. Chemical formula:");
    }

    #[test]
    fn multi_word_labels_tolerate_extra_whitespace() {
        assert!(label_pattern("Affected body system").is_match("Affected  body\nsystem: Renal"));
    }

    #[test]
    fn label_does_not_match_inside_words() {
        assert!(!label_pattern("Name").is_match("Surname: Smith"));
    }

    #[test]
    fn header_echo_detection() {
        let schema = symptom_schema();
        assert!(schema.is_header_echo("Symptom name"));
        assert!(schema.is_header_echo("**Symptom Name:**"));
        assert!(schema.is_header_echo("Typical onset time (e.g. within 2 hours)"));
        assert!(!schema.is_header_echo("Vomiting"));
        assert!(!schema.is_header_echo(""));
    }

    #[test]
    fn schemas_declare_name_first() {
        for schema in [toxin_schema(), symptom_schema(), treatment_schema()] {
            assert_eq!(schema.first_field().unwrap().name, "name");
        }
        assert_eq!(basics_schema().first_field().unwrap().name, "family");
    }
}

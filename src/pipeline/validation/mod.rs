//! Three-tier record validation: completeness, schema, cleanliness.
//!
//! Read-only. All tiers always run, so a report lists every problem at once.

pub mod cleanliness;
pub mod completeness;
pub mod schema;
pub mod types;

pub use types::{Issue, IssueReport, IssueTier, ReportStatus, VerificationReport};

use regex::Regex;

use crate::models::ExtractionRecord;
use crate::pipeline::normalize::HEADER_LABELS;

/// Column length ceilings of the record store.
#[derive(Debug, Clone)]
pub struct LengthLimits {
    pub common_name: usize,
    pub scientific_name: usize,
    pub family: usize,
    pub toxin_name: usize,
    pub symptom_name: usize,
    pub treatment_name: usize,
    pub body_system: usize,
    pub onset: usize,
    pub toxic_part: usize,
    pub chemical_formula: usize,
}

impl Default for LengthLimits {
    fn default() -> Self {
        Self {
            common_name: 150,
            scientific_name: 200,
            family: 100,
            toxin_name: 150,
            symptom_name: 150,
            treatment_name: 200,
            body_system: 100,
            onset: 100,
            toxic_part: 50,
            chemical_formula: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub limits: LengthLimits,
    /// Artifact patterns with their report label, checked in order.
    pub artifacts: Vec<(Regex, &'static str)>,
    pub header_labels: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let artifacts = [
            (r"(?i)Sources?:\s*[\d,]+", "trailing source references"),
            (r"(?i)Would you like me to", "chatbot artifact"),
            (r"EXTREMELY IMPORTANT", "NotebookLM UI artifact"),
            (r"============+", "separator artifact"),
            (r"📚|❓|✅|⏳|🌐|📤", "emoji UI artifact"),
            (r"Loaded library with \d+ notebooks", "script log artifact"),
            (r"[•◦▪]", "bullet glyph"),
        ]
        .into_iter()
        .map(|(pattern, label)| (Regex::new(pattern).unwrap(), label))
        .collect();

        Self {
            limits: LengthLimits::default(),
            artifacts,
            header_labels: HEADER_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, record: &ExtractionRecord) -> Vec<Issue> {
        let mut issues = Vec::new();
        completeness::check(record, &mut issues);
        schema::check(record, &self.config, &mut issues);
        cleanliness::check(record, &self.config, &mut issues);
        issues
    }

    pub fn report(&self, file: &str, record: &ExtractionRecord) -> IssueReport {
        let issues = self.validate(record);
        if !issues.is_empty() {
            tracing::debug!(file = %file, issues = issues.len(), "Record failed verification");
        }
        IssueReport::from_issues(file, issues)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

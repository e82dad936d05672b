//! Directory drivers for the offline pipeline.
//!
//! raw answer files → extract → normalize → record files → verification report.
//!
//! Each file is handled independently: a file that fails to load or write is
//! logged and counted, and the batch moves on to the next one.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::extraction::Extractor;
use super::normalize::Normalizer;
use super::validation::{IssueReport, Validator, VerificationReport};
use super::PipelineError;
use crate::models::{ExtractionRecord, RawPlantFile, Topic};

/// Answers shorter than this are treated as truncated or refused.
pub const MIN_RESPONSE_LENGTH: usize = 50;

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// All `*.json` files directly under `dir`, sorted by name.
pub fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty JSON with a trailing newline.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

pub fn load_raw(path: &Path) -> Result<RawPlantFile, PipelineError> {
    read_json(path)
}

pub fn load_record(path: &Path) -> Result<ExtractionRecord, PipelineError> {
    read_json(path)
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Counts for one directory pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Turns raw answer files into normalized record files.
pub struct RecordProcessor {
    extractor: Extractor,
    normalizer: Normalizer,
}

impl RecordProcessor {
    pub fn new(extractor: Extractor, normalizer: Normalizer) -> Self {
        Self {
            extractor,
            normalizer,
        }
    }

    /// Extract and normalize one collected plant.
    pub fn build_record(&self, raw: &RawPlantFile) -> ExtractionRecord {
        let mut record = self.extractor.extract_record(raw);
        self.normalizer.normalize(&mut record);
        record
    }

    /// Where the record for `raw` lands, after name fixes.
    pub fn output_path(&self, raw: &RawPlantFile, output_dir: &Path) -> PathBuf {
        let mut stub = ExtractionRecord::new(raw.identity());
        self.normalizer.normalize_identity(&mut stub);
        output_dir.join(stub.file_name())
    }

    /// Process one raw file. Returns the path of the written record.
    pub fn process_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf, PipelineError> {
        let raw = load_raw(input)?;
        let record = self.build_record(&raw);
        let output = output_dir.join(record.file_name());
        write_json(&output, &record)?;

        tracing::debug!(
            file = %input.display(),
            output = %output.display(),
            toxins = record.toxins.len(),
            symptoms = record.symptoms.len(),
            treatments = record.treatments.len(),
            "Processed plant"
        );
        Ok(output)
    }

    /// Process every raw file in `input_dir`.
    ///
    /// With `skip_existing`, a raw file whose record already exists is left
    /// alone, so an interrupted run can be resumed.
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        skip_existing: bool,
    ) -> Result<ProcessSummary, PipelineError> {
        let files = list_json_files(input_dir)?;
        fs::create_dir_all(output_dir)?;
        let mut summary = ProcessSummary::default();

        for input in &files {
            if skip_existing {
                match load_raw(input) {
                    Ok(raw) if self.output_path(&raw, output_dir).exists() => {
                        summary.skipped += 1;
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(file = %input.display(), error = %e, "Skipping unreadable raw file");
                        summary.failed += 1;
                        continue;
                    }
                }
            }

            match self.process_file(input, output_dir) {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    tracing::warn!(file = %input.display(), error = %e, "Failed to process raw file");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            input = %input_dir.display(),
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Processing pass complete"
        );
        Ok(summary)
    }
}

impl Default for RecordProcessor {
    fn default() -> Self {
        Self::new(Extractor::default(), Normalizer::default())
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

pub fn verify_file(path: &Path, validator: &Validator) -> IssueReport {
    let label = file_label(path);
    match load_record(path) {
        Ok(record) => validator.report(&label, &record),
        Err(e) => IssueReport::error(label, e.to_string()),
    }
}

/// Validate every record in `dir`.
pub fn verify_directory(dir: &Path, validator: &Validator) -> Result<VerificationReport, PipelineError> {
    let results: Vec<IssueReport> = list_json_files(dir)?
        .iter()
        .map(|path| verify_file(path, validator))
        .collect();
    let report = VerificationReport::new(results);
    tracing::info!(
        dir = %dir.display(),
        total = report.total_files,
        passed = report.passed,
        failed = report.failed,
        "Verification complete"
    );
    Ok(report)
}

pub fn write_report(report: &VerificationReport, path: &Path) -> Result<(), PipelineError> {
    write_json(path, report)
}

// ---------------------------------------------------------------------------
// Raw audit
// ---------------------------------------------------------------------------

/// Problems found in one raw answer file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawAudit {
    pub file: String,
    pub common_name: String,
    pub issues: Vec<String>,
}

impl RawAudit {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check that every topic was answered with a usable string.
pub fn audit_raw_file(path: &Path) -> RawAudit {
    let file = file_label(path);
    let raw = match load_raw(path) {
        Ok(raw) => raw,
        Err(e) => {
            return RawAudit {
                file,
                common_name: String::new(),
                issues: vec![e.to_string()],
            }
        }
    };

    let mut issues = Vec::new();
    if raw
        .plant
        .scientific_name
        .as_deref()
        .map_or(true, |s| s.trim().is_empty())
    {
        issues.push("plant.scientific_name is null".to_string());
    }

    if raw.raw_responses.is_empty() {
        issues.push("raw_responses is missing entirely".to_string());
    } else {
        for topic in Topic::all() {
            let key = topic.as_str();
            match raw.raw_responses.get(key) {
                None | Some(serde_json::Value::Null) => {
                    issues.push(format!("raw_responses.{key} is null, needs re-querying"))
                }
                Some(serde_json::Value::String(text)) => {
                    let len = text.trim().chars().count();
                    if len < MIN_RESPONSE_LENGTH {
                        issues.push(format!("raw_responses.{key} is suspiciously short ({len} chars)"));
                    }
                }
                Some(_) => issues.push(format!("raw_responses.{key} is not a string")),
            }
        }
    }

    RawAudit {
        file,
        common_name: raw.plant.common_name,
        issues,
    }
}

pub fn audit_raw_directory(dir: &Path) -> Result<Vec<RawAudit>, PipelineError> {
    let audits: Vec<RawAudit> = list_json_files(dir)?.iter().map(|p| audit_raw_file(p)).collect();
    let failing = audits.iter().filter(|a| !a.passed()).count();
    if failing > 0 {
        tracing::warn!(dir = %dir.display(), failing, "Raw files need re-collection");
    }
    Ok(audits)
}

/// Console text for a raw audit, failures first.
pub fn render_raw_audit(audits: &[RawAudit]) -> String {
    let rule = "=".repeat(50);
    let passed = audits.iter().filter(|a| a.passed()).count();
    let mut out = format!(
        "{rule}\n  Raw Data Audit\n  {} files scanned: {} PASS, {} FAIL\n{rule}\n\n",
        audits.len(),
        passed,
        audits.len() - passed
    );
    for audit in audits.iter().filter(|a| !a.passed()) {
        out.push_str(&format!("FAIL {} ({} issues)\n", audit.file, audit.issues.len()));
        for issue in &audit.issues {
            out.push_str(&format!("   {issue}\n"));
        }
        out.push('\n');
    }
    for audit in audits.iter().filter(|a| a.passed()) {
        out.push_str(&format!("PASS {}\n", audit.file));
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

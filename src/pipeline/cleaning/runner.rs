// Directory driver for the cleaning stage.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use super::{BatchCleaner, CleaningError};
use crate::models::ExtractionRecord;
use crate::pipeline::processor::{list_json_files, load_record, write_json};
use crate::pipeline::PipelineError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningSummary {
    pub batches: usize,
    pub cleaned: usize,
    pub failed: usize,
}

/// Records in `input_dir` that have no cleaned counterpart in `output_dir` yet.
pub fn pending_files(input_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    Ok(list_json_files(input_dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .map_or(true, |name| !output_dir.join(name).exists())
        })
        .collect())
}

/// Clean every pending record, `batch_size` at a time.
///
/// A batch that fails is retried as a whole up to `max_attempts` times. When it
/// still fails none of its records are written, so the next run picks them up.
pub fn clean_directory(
    input_dir: &Path,
    output_dir: &Path,
    cleaner: &dyn BatchCleaner,
    batch_size: usize,
    max_attempts: usize,
) -> Result<CleaningSummary, PipelineError> {
    fs::create_dir_all(output_dir)?;
    let pending = pending_files(input_dir, output_dir)?;
    let mut summary = CleaningSummary::default();

    let mut loaded: Vec<(PathBuf, ExtractionRecord)> = Vec::with_capacity(pending.len());
    for path in pending {
        match load_record(&path) {
            Ok(record) => loaded.push((path, record)),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable record");
                summary.failed += 1;
            }
        }
    }

    for batch in loaded.chunks(batch_size.max(1)) {
        summary.batches += 1;
        let batch_id = Uuid::new_v4();
        let records: Vec<ExtractionRecord> = batch.iter().map(|(_, r)| r.clone()).collect();

        let mut cleaned = None;
        for attempt in 1..=max_attempts.max(1) {
            match cleaner
                .clean_batch(&records)
                .and_then(|result| ensure_count(result, records.len()))
            {
                Ok(result) => {
                    cleaned = Some(result);
                    break;
                }
                Err(e) => tracing::warn!(
                    batch = %batch_id,
                    attempt,
                    records = records.len(),
                    error = %e,
                    "Cleaning batch failed"
                ),
            }
        }

        let Some(cleaned) = cleaned else {
            summary.failed += batch.len();
            continue;
        };

        for ((path, _), record) in batch.iter().zip(cleaned) {
            let Some(name) = path.file_name() else { continue };
            match write_json(&output_dir.join(name), &record) {
                Ok(()) => summary.cleaned += 1,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Failed to write cleaned record");
                    summary.failed += 1;
                }
            }
        }
        tracing::info!(batch = %batch_id, records = batch.len(), "Cleaning batch written");
    }

    Ok(summary)
}

/// A cleaner must hand back exactly one record per input.
fn ensure_count(
    records: Vec<ExtractionRecord>,
    expected: usize,
) -> Result<Vec<ExtractionRecord>, CleaningError> {
    if records.len() == expected {
        Ok(records)
    } else {
        Err(CleaningError::CountMismatch {
            expected,
            actual: records.len(),
        })
    }
}

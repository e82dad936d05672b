pub mod strip;
pub mod extraction;
pub mod normalize;
pub mod validation;
pub mod processor; // Directory drivers: raw answers → records → report
pub mod collect;
pub mod cleaning; // LLM semantic cleaning of finished records

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid override table {}: {reason}", path.display())]
    Overrides { path: PathBuf, reason: String },

    #[error("Cleaning failed: {0}")]
    Cleaning(#[from] cleaning::CleaningError),
}

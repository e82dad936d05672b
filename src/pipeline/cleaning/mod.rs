//! LLM semantic cleaning of finished records.
//!
//! The rule-based normalizer leaves residue it cannot recognize safely
//! (inline citations glued to words, odd prefixes). This stage sends batches
//! of records to a chat model with fixed cleaning rules and accepts the
//! reply only when it carries exactly one record per input.

pub mod openai;
pub mod runner;

pub use openai::OpenAiCleaner;
pub use runner::{clean_directory, pending_files, CleaningSummary};

use thiserror::Error;

use crate::models::ExtractionRecord;

#[derive(Error, Debug)]
pub enum CleaningError {
    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Cleaning API returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed cleaning response: {0}")]
    MalformedResponse(String),

    #[error("Record count mismatch: sent {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Cleans a batch of records, returning them in the same order.
pub trait BatchCleaner {
    fn clean_batch(&self, records: &[ExtractionRecord]) -> Result<Vec<ExtractionRecord>, CleaningError>;
}

pub const SYSTEM_PROMPT: &str = "\
You are a data cleaning assistant for a veterinary toxicology database.
You will receive a JSON array of plant toxicity records.

Clean ALL string fields in every record by applying these rules:

1. INLINE CITATIONS: remove superscript-style numbers embedded in text.
   e.g. \"inhibits protein synthesis1.\" becomes \"inhibits protein synthesis.\"
   e.g. \"gastrointestinal signs1, which\" becomes \"gastrointestinal signs, which\"

2. BULLET CHARACTERS: remove leading bullets and arrows at the start of lines.
   Keep the sentence, just remove the symbol.

3. BOILERPLATE NON-ANSWERS: replace the entire field value with null when
   the text is a placeholder like:
   - \"Not provided in the given sources.\"
   - \"Not specified in the provided sources.\"
   - \"No information available.\"
   - Any variation of \"not mentioned / not detailed / not stated in the sources\"

4. REDUNDANT PREFIXES: strip these prefixes from field values:
   - \"in cats: \" at the start of toxin descriptions
   - \"Brief Description (Appearance, Habitat, and Where Commonly Found)\" on its own line
   - \"Brief Description:\"

5. PRESERVE everything else exactly: scientific names, dosages, medical terms,
   factual sentences, severity levels, body systems.

Return a JSON array with EXACTLY the same number of records in the same order.
Each record must keep the exact same structure and keys as the input.
Output ONLY the JSON array, no commentary.";

/// User message carrying the batch.
pub fn build_user_message(records: &[ExtractionRecord]) -> Result<String, CleaningError> {
    Ok(format!(
        "Clean these {} plant records and return the cleaned JSON array:\n\n{}",
        records.len(),
        serde_json::to_string_pretty(records)?
    ))
}

/// Pull the JSON array out of a model reply (first `[` to last `]`).
pub fn parse_cleaned(reply: &str, expected: usize) -> Result<Vec<ExtractionRecord>, CleaningError> {
    let reply = reply.trim();
    let (start, end) = match (reply.find('['), reply.rfind(']')) {
        (Some(start), Some(end)) if end > start => (start, end),
        _ => {
            let preview: String = reply.chars().take(200).collect();
            return Err(CleaningError::MalformedResponse(format!(
                "No JSON array found in response. Response starts with: {preview:?}"
            )));
        }
    };

    let records: Vec<ExtractionRecord> = serde_json::from_str(&reply[start..=end])?;
    if records.len() != expected {
        return Err(CleaningError::CountMismatch {
            expected,
            actual: records.len(),
        });
    }
    Ok(records)
}

use std::path::{Path, PathBuf};

/// Application-level constants
pub const APP_NAME: &str = "Toxiflora";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CLEAN_BATCH: usize = 10;
pub const DEFAULT_CLEAN_MODEL: &str = "gpt-4o";
pub const CLEAN_MAX_ATTEMPTS: usize = 3;
pub const CLEAN_TIMEOUT_SECS: u64 = 300;

/// Log filter used when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "toxiflora=info,toxiflora_lib=info,warn"
}

/// Collected raw answers, one file per plant.
pub fn raw_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("plants")
}

pub fn processed_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("plants_processed")
}

pub fn cleaned_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("plants_cleaned")
}

pub fn report_path(data_dir: &Path) -> PathBuf {
    data_dir.join("verification_report.json")
}

/// Runtime settings for one pipeline run, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    /// Replaces the bundled override table when set.
    pub overrides_path: Option<PathBuf>,
    pub clean: bool,
    pub clean_batch: usize,
    pub clean_model: String,
    pub openai_api_key: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            overrides_path: None,
            clean: false,
            clean_batch: DEFAULT_CLEAN_BATCH,
            clean_model: DEFAULT_CLEAN_MODEL.to_string(),
            openai_api_key: None,
        }
    }
}

impl PipelineConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(error = %e, "Failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let clean_batch = match non_empty("TOXIFLORA_CLEAN_BATCH") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(value = %v, "Invalid TOXIFLORA_CLEAN_BATCH, using default");
                    defaults.clean_batch
                }
            },
            None => defaults.clean_batch,
        };

        Self {
            data_dir: non_empty("TOXIFLORA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            overrides_path: non_empty("TOXIFLORA_OVERRIDES").map(PathBuf::from),
            clean: non_empty("TOXIFLORA_CLEAN")
                .is_some_and(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on")),
            clean_batch,
            clean_model: non_empty("TOXIFLORA_CLEAN_MODEL").unwrap_or(defaults.clean_model),
            openai_api_key: non_empty("OPENAI_API_KEY"),
        }
    }
}

pub mod config;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

use config::PipelineConfig;
use pipeline::cleaning::{clean_directory, OpenAiCleaner};
use pipeline::extraction::Extractor;
use pipeline::normalize::{ManualOverrides, Normalizer, NormalizerConfig};
use pipeline::processor::{audit_raw_directory, verify_directory, write_report, RecordProcessor};
use pipeline::validation::Validator;
use pipeline::PipelineError;

pub fn run() -> Result<(), PipelineError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let settings = PipelineConfig::from_env();
    run_pipeline(&settings)
}

/// Audit → process → verify, then clean when enabled.
pub fn run_pipeline(settings: &PipelineConfig) -> Result<(), PipelineError> {
    let data_dir = settings.data_dir.as_path();
    let raw_dir = config::raw_dir(data_dir);
    let processed_dir = config::processed_dir(data_dir);

    let overrides = match &settings.overrides_path {
        Some(path) => ManualOverrides::from_file(path)?,
        None => ManualOverrides::bundled()?,
    };
    let processor = RecordProcessor::new(
        Extractor::default(),
        Normalizer::new(NormalizerConfig::default(), overrides),
    );

    let audits = audit_raw_directory(&raw_dir)?;
    let incomplete = audits.iter().filter(|a| !a.passed()).count();
    if incomplete > 0 {
        tracing::warn!(incomplete, "Some raw files have missing or short answers");
    }

    processor.process_directory(&raw_dir, &processed_dir, false)?;

    let report = verify_directory(&processed_dir, &Validator::default())?;
    write_report(&report, &config::report_path(data_dir))?;
    println!("{}", report.render_summary());

    if settings.clean {
        match settings.openai_api_key.as_deref() {
            Some(key) => {
                let cleaner = OpenAiCleaner::new(key, &settings.clean_model, config::CLEAN_TIMEOUT_SECS)?;
                let summary = clean_directory(
                    &processed_dir,
                    &config::cleaned_dir(data_dir),
                    &cleaner,
                    settings.clean_batch,
                    config::CLEAN_MAX_ATTEMPTS,
                )?;
                tracing::info!(
                    batches = summary.batches,
                    cleaned = summary.cleaned,
                    failed = summary.failed,
                    "Cleaning pass complete"
                );
            }
            None => tracing::warn!("TOXIFLORA_CLEAN is set but OPENAI_API_KEY is missing, skipping cleaning"),
        }
    }

    Ok(())
}

//! Raw answer collection.
//!
//! Each seed plant is asked one question per topic through an `AnswerSource`.
//! Topics that already hold an answer are not asked again, so a partly
//! collected plant can be resumed.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::processor::{load_raw, write_json};
use super::PipelineError;
use crate::models::{PlantIdentity, RawPlantFile, SeedPlant, Topic};

/// Footer the notebook service appends after every answer.
pub const ANSWER_FOOTER: &str = "EXTREMELY IMPORTANT: Is that ALL you need to know?";

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Answer source unavailable: {0}")]
    Unavailable(String),

    #[error("Question failed: {0}")]
    QuestionFailed(String),

    #[error("Empty answer")]
    EmptyAnswer,
}

/// Anything that can answer a free-text question about a plant.
pub trait AnswerSource {
    fn ask(&self, question: &str) -> Result<String, CollectionError>;
}

/// Drop the service footer and surrounding whitespace.
pub fn trim_footer(answer: &str) -> &str {
    match answer.find(ANSWER_FOOTER) {
        Some(pos) => answer[..pos].trim(),
        None => answer.trim(),
    }
}

/// The five questions for a plant, in topic order.
pub fn questions_for(plant: &SeedPlant) -> Vec<(Topic, String)> {
    let common = plant.common_name.as_str();
    let scientific = plant.scientific_name.as_deref().unwrap_or("Unknown");

    Topic::all()
        .iter()
        .map(|topic| {
            let question = match topic {
                Topic::Basics => format!(
                    "For the plant {common} ({scientific}): 1. What botanical family does it belong to? \
                     2. Give a brief description of the plant (appearance, habitat, where commonly found). \
                     Cite your sources."
                ),
                Topic::ToxicParts => format!(
                    "Which parts of {common} are toxic to cats? (e.g. leaves, bulbs, flowers, pollen, stems, \
                     roots, seeds, bark, sap, fruit, entire plant). Cite your sources."
                ),
                Topic::Toxins => format!(
                    "What are the toxic compounds or substances in {common} that harm cats? \
                     For each toxin provide: 1. Name of the compound. 2. Chemical formula (if available). \
                     3. Brief description of its mechanism of action in cats. \
                     4. Any notes on concentration or potency. Cite your sources."
                ),
                Topic::Symptoms => format!(
                    "What symptoms does a cat show after ingesting or being exposed to {common}? \
                     For each symptom provide: 1. Symptom name. 2. Affected body system (gastrointestinal, \
                     renal, neurological, cardiac, dermal, respiratory, hepatic, hematological). \
                     3. Severity: mild, moderate, severe, or fatal. 4. Typical onset time \
                     (e.g. 'within 2 hours', '6-12 hours'). 5. Any additional clinical notes. Cite your sources."
                ),
                Topic::Treatments => format!(
                    "What are the recommended veterinary treatments if a cat ingests {common}? \
                     List them in order of priority (most urgent first). For each treatment provide: \
                     1. Treatment name. 2. Brief description of the procedure. \
                     3. Any situation-specific notes. Cite your sources."
                ),
            };
            (*topic, question)
        })
        .collect()
}

/// Ask every topic that `existing` has no answer for.
///
/// A failed question is logged and left unanswered; the remaining topics are
/// still asked.
pub fn collect_plant(
    source: &dyn AnswerSource,
    plant: &SeedPlant,
    existing: Option<RawPlantFile>,
) -> RawPlantFile {
    let mut raw = match existing {
        Some(mut file) => {
            file.plant = plant.clone();
            file
        }
        None => RawPlantFile::new(plant.clone()),
    };

    for (topic, question) in questions_for(plant) {
        if raw.raw_text(topic).is_some() {
            continue;
        }
        let answer = source.ask(&question).and_then(|text| {
            let trimmed = trim_footer(&text);
            if trimmed.is_empty() {
                Err(CollectionError::EmptyAnswer)
            } else {
                Ok(trimmed.to_string())
            }
        });
        match answer {
            Ok(text) => raw.set_raw_text(topic, text),
            Err(e) => tracing::warn!(
                plant = %plant.common_name,
                topic = %topic,
                error = %e,
                "Question failed, topic left unanswered"
            ),
        }
    }
    raw
}

/// Collect each seed into `raw_dir`, resuming from files already there.
pub fn collect_into_dir(
    source: &dyn AnswerSource,
    plants: &[SeedPlant],
    raw_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::with_capacity(plants.len());
    for plant in plants {
        let identity = PlantIdentity::new(&plant.common_name, plant.scientific_name.as_deref());
        let path = raw_dir.join(identity.file_name());

        let existing = if path.exists() {
            match load_raw(&path) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Ignoring unreadable raw file");
                    None
                }
            }
        } else {
            None
        };

        let raw = collect_plant(source, plant, existing);
        write_json(&path, &raw)?;
        tracing::info!(plant = %plant.common_name, file = %path.display(), "Collected plant");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Answers from a fixed script; records every question asked.
    struct MockSource {
        asked: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl MockSource {
        fn new() -> Self {
            Self {
                asked: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl AnswerSource for MockSource {
        fn ask(&self, question: &str) -> Result<String, CollectionError> {
            self.asked.borrow_mut().push(question.to_string());
            if self.fail_on.is_some_and(|needle| question.contains(needle)) {
                return Err(CollectionError::QuestionFailed("timeout".into()));
            }
            Ok(format!(
                "Answer to: {}\n\n{ANSWER_FOOTER} Ask a follow-up.",
                &question[..20]
            ))
        }
    }

    fn seed() -> SeedPlant {
        SeedPlant {
            common_name: "Easter Lily".into(),
            scientific_name: Some("Lilium longiflorum".into()),
        }
    }

    #[test]
    fn footer_is_trimmed() {
        assert_eq!(trim_footer(&format!("Liliaceae.\n{ANSWER_FOOTER} more")), "Liliaceae.");
        assert_eq!(trim_footer("  plain  "), "plain");
    }

    #[test]
    fn questions_cover_every_topic() {
        let questions = questions_for(&seed());
        assert_eq!(questions.len(), 5);
        assert!(questions[0].1.contains("Easter Lily (Lilium longiflorum)"));
        assert_eq!(questions[4].0, Topic::Treatments);
        assert!(questions.iter().all(|(_, q)| q.ends_with("Cite your sources.")));
    }

    #[test]
    fn collects_all_topics_without_footer() {
        let source = MockSource::new();
        let raw = collect_plant(&source, &seed(), None);
        assert_eq!(source.asked.borrow().len(), 5);
        for topic in Topic::all() {
            let text = raw.raw_text(*topic).unwrap();
            assert!(!text.contains("EXTREMELY IMPORTANT"));
        }
    }

    #[test]
    fn resume_asks_only_missing_topics() {
        let mut existing = RawPlantFile::new(seed());
        existing.set_raw_text(Topic::Basics, "Liliaceae".into());
        existing.set_raw_text(Topic::Toxins, "Unknown toxin".into());

        let source = MockSource::new();
        let raw = collect_plant(&source, &seed(), Some(existing));
        assert_eq!(source.asked.borrow().len(), 3);
        assert_eq!(raw.raw_text(Topic::Basics), Some("Liliaceae"));
    }

    #[test]
    fn failed_question_leaves_topic_unanswered() {
        let source = MockSource {
            fail_on: Some("What symptoms"),
            ..MockSource::new()
        };
        let raw = collect_plant(&source, &seed(), None);
        assert_eq!(source.asked.borrow().len(), 5);
        assert!(raw.raw_text(Topic::Symptoms).is_none());
        assert!(raw.raw_text(Topic::Treatments).is_some());
    }

    #[test]
    fn collect_into_dir_resumes_from_disk() {
        let dir = TempDir::new().unwrap();
        let failing = MockSource {
            fail_on: Some("veterinary treatments"),
            ..MockSource::new()
        };
        let paths = collect_into_dir(&failing, &[seed()], dir.path()).unwrap();
        assert!(paths[0].ends_with("lilium_longiflorum.json"));

        let source = MockSource::new();
        collect_into_dir(&source, &[seed()], dir.path()).unwrap();
        assert_eq!(source.asked.borrow().len(), 1);
        let raw = load_raw(&paths[0]).unwrap();
        assert!(raw.raw_text(Topic::Treatments).is_some());
    }
}

// Recover a botanical family token from whatever the basics answer produced.

use std::sync::LazyLock;

use regex::Regex;

static TRAILING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+$").unwrap());

static BELONGS_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:belongs?\s+to\s+(?:the\s+)?(?:family\s+)?|family[:\s]+)([A-Z][a-z]+(?:aceae|idae|ales|eae))",
    )
    .unwrap()
});

static THE_OR_IS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:the\s+|is\s+)([A-Z][a-z]+(?:aceae|idae|ales|eae))").unwrap());

static ANY_ACEAE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+aceae)\b").unwrap());

const SENTENCE_PUNCT: &[char] = &['.', '!', '?', ';'];

/// Clean a family value; `None` when no plausible family can be recovered.
pub fn clean_family(value: &str, header_labels: &[String]) -> Option<String> {
    let stripped = value.trim();
    if stripped.is_empty() {
        return None;
    }
    let lower = stripped.to_lowercase();

    for label in header_labels {
        let echoes = lower == *label
            || lower.starts_with(&format!("{label} "))
            || lower.starts_with(&format!("{label}:"));
        if echoes {
            let remainder = stripped[label.len()..].trim().trim_start_matches(':').trim();
            return if remainder.is_empty() {
                None
            } else {
                clean_family(remainder, header_labels)
            };
        }
    }

    if stripped.chars().count() <= 40
        && !stripped.contains(SENTENCE_PUNCT)
        && stripped.split_whitespace().count() <= 3
    {
        let cleaned = TRAILING_DIGITS.replace(stripped, "");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            return Some(cleaned.to_string());
        }
    }

    for re in [&*BELONGS_TO, &*THE_OR_IS, &*ANY_ACEAE] {
        if let Some(caps) = re.captures(stripped) {
            return Some(caps[1].to_string());
        }
    }

    if stripped.chars().count() <= 60 && !stripped.contains(SENTENCE_PUNCT) {
        let cleaned = TRAILING_DIGITS.replace(stripped, "");
        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            return Some(cleaned.to_string());
        }
    }
    None
}

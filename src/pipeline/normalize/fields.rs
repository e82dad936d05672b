//! Field-level canonicalization rules.
//!
//! Every cleaner is total and idempotent: cleaners that cut or truncate are
//! repeated until the value stops changing, since each step only removes text.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{BodySystem, Severity};
use crate::pipeline::strip::{is_boilerplate, strip, strip_blocks, strip_field};

static LEADING_NUMBERING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s*").unwrap());

static SUBSTANCE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^/?substance:\s*").unwrap());

static TRAILING_NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w)]+$").unwrap());

/// "\n5. Additional notes…" where the next list entry leaked into the value.
static NUMBERED_CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\n\s*\d+\.\s.*$").unwrap());

/// "◦ Highest concentration in…" sub-bullets copied from the source outline.
static OUTLINE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[\n\r]\s*◦\s*(?:Highest |Distribution|Concentration).*$").unwrap()
});

static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Restated labels at the start of prose ("Brief Description: …", "In cats: …").
static PROSE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\*\*)?(?:brief\s+description|description|mechanism(?:\s+of\s+action)?|in\s+cats)(?:\*\*)?\s*:(?:\*\*)?\s*",
    )
    .unwrap()
});

const NAME_SEPARATORS: &[&str] = &[" (", ", ", " — ", " - "];
const ONSET_SEPARATORS: &[&str] = &[". ", ", ", " — ", " - ", "; "];
const FORMULA_NON_ANSWERS: &[&str] = &["not specified", "not available", "n/a", "unknown", "none"];

/// Boundaries closer than this to the start are not used for truncation.
const MIN_CUT: usize = 20;

pub const ONSET_MAX_LEN: usize = 100;

/// Apply `step` until the value stops changing.
fn settle(value: String, step: impl Fn(&str) -> String) -> String {
    let mut current = value;
    loop {
        let next = step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() || is_boilerplate(&value) {
        None
    } else {
        Some(value)
    }
}

/// Canonical severity: exact match, else the most severe word mentioned.
pub fn normalize_severity(value: &str) -> Option<String> {
    if let Some(severity) = Severity::parse_loose(value) {
        return Some(severity.as_str().to_string());
    }
    let lower = value.to_lowercase();
    Severity::all()
        .iter()
        .rev()
        .find(|s| lower.contains(s.as_str()))
        .map(|s| s.as_str().to_string())
}

/// Canonical body system via the synonym table; unmatched values pass through trimmed.
pub fn normalize_body_system(value: &str, synonyms: &[(String, BodySystem)]) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned = trimmed.trim_end_matches('.').trim().to_lowercase();
    let lookup = |key: &str| {
        synonyms
            .iter()
            .find(|(syn, _)| syn == key)
            .map(|(_, system)| *system)
    };

    if let Some(system) = lookup(&cleaned) {
        return Some(system.as_str().to_string());
    }

    for segment in cleaned.split(['/', ',']) {
        let segment = PARENTHETICAL.replace_all(segment, "");
        if let Some(system) = lookup(segment.trim()) {
            return Some(system.as_str().to_string());
        }
    }

    let leftmost = synonyms
        .iter()
        .filter_map(|(syn, system)| find_word(&cleaned, syn).map(|idx| (idx, *system)))
        .min_by_key(|(idx, _)| *idx);
    match leftmost {
        Some((_, system)) => Some(system.as_str().to_string()),
        None => Some(trimmed.to_string()),
    }
}

/// Byte offset of the first whole-word occurrence of `needle`, plural
/// `s`/`es` endings included ("kidneys" matches "kidney").
fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    let ends_word = |rest: &str| !rest.chars().next().is_some_and(char::is_alphanumeric);
    haystack.match_indices(needle).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let rest = &haystack[i + needle.len()..];
        !before.is_some_and(char::is_alphanumeric)
            && (ends_word(rest)
                || rest.strip_prefix("es").is_some_and(ends_word)
                || rest.strip_prefix('s').is_some_and(ends_word))
    })
}

/// Formula, or `None` when the value is a non-answer or prose.
pub fn normalize_formula(value: &str) -> Option<String> {
    let cleaned = strip_blocks(value);
    if cleaned.is_empty() || is_boilerplate(&cleaned) {
        return None;
    }
    let lower = cleaned.to_lowercase();
    if FORMULA_NON_ANSWERS.iter().any(|p| lower.starts_with(p)) {
        return None;
    }
    if cleaned.chars().count() > 40 && cleaned.split_whitespace().count() > 3 {
        return None;
    }
    Some(cleaned)
}

/// Names: strip, drop list numbering and "/substance:", truncate at a natural
/// boundary, then trim trailing punctuation other than ")".
pub fn clean_name(value: &str, max_len: usize) -> Option<String> {
    let settled = settle(value.to_string(), |v| {
        let v = strip(v).replace('…', "...");
        let v = LEADING_NUMBERING.replace(&v, "");
        let v = SUBSTANCE_PREFIX.replace(&v, "");
        let v = truncate_at_boundary(&v, max_len, NAME_SEPARATORS, false);
        TRAILING_NON_WORD.replace(&v, "").trim().to_string()
    });
    non_empty(settled)
}

pub fn clean_onset(value: &str) -> Option<String> {
    let settled = settle(value.to_string(), |v| {
        let v = NUMBERED_CONTINUATION.replace(v, "");
        let v = strip(&v);
        truncate_at_boundary(&v, ONSET_MAX_LEN, ONSET_SEPARATORS, true)
            .trim()
            .to_string()
    });
    non_empty(settled)
}

pub fn clean_concentration_notes(value: &str) -> Option<String> {
    let settled = settle(value.to_string(), |v| {
        let v = NUMBERED_CONTINUATION.replace(v, "");
        let v = OUTLINE_CONTINUATION.replace(&v, "");
        strip(&v)
    });
    non_empty(settled)
}

/// Descriptions and notes: strip, drop restated labels, boilerplate to `None`.
pub fn clean_prose(value: &str) -> Option<String> {
    let settled = settle(value.to_string(), |v| {
        let v = strip(v);
        PROSE_PREFIX.replace(&v, "").trim().to_string()
    });
    strip_field(&settled).and_then(non_empty)
}

/// Cut `text` to at most `max_len` chars.
///
/// Prefers the latest separator past [`MIN_CUT`], then the last whitespace, and
/// only hard-cuts a single unbroken word. With `keep_period`, a ". " boundary
/// keeps its period.
pub fn truncate_at_boundary(text: &str, max_len: usize, separators: &[&str], keep_period: bool) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let head_end = text
        .char_indices()
        .nth(max_len)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..head_end];

    let boundary = separators
        .iter()
        .filter_map(|sep| head.rfind(sep).map(|idx| (idx, *sep)))
        .filter(|(idx, _)| head[..*idx].chars().count() > MIN_CUT)
        .max_by_key(|(idx, _)| *idx);
    if let Some((idx, sep)) = boundary {
        let end = if keep_period && sep.starts_with('.') { idx + 1 } else { idx };
        return head[..end].trim_end().to_string();
    }

    match head.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => head[..idx].trim_end().to_string(),
        _ => head.to_string(),
    }
}

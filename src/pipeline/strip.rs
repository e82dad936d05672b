// Strip generation and UI noise from answer text.
// Every pass only deletes text, so repeating passes until nothing changes
// terminates and makes `strip` idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// "Sources: 1,2,3" blocks, inline or on their own (optionally bulleted) line.
static CITATION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[ \t]*(?:\r?\n[ \t]*)?(?:[•◦▪\-\*][ \t]*)?\bsources?[ \t]*:[ \t]*\d[\d,.\t ]*")
        .unwrap()
});

/// Citation digits glued to the last word: "synthesis1." → "synthesis.".
static TRAILING_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z\)\]])\d[\d,]*(\.*)[ \t]*$").unwrap());

/// The same digits mid-text, before punctuation and whitespace:
/// "vomiting1. Then" → "vomiting. Then". Lower-case only so formulas such as
/// "CO2." survive.
static INLINE_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\)\]])\d+(?:,\d+)*([.,;:])(\s)").unwrap());

/// Conversational trailers and UI chrome, removed with everything they cover.
static TRAILERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)would you like me to[^\n]*").unwrap(),
        Regex::new(r"(?is)the provided text does not contain.*$").unwrap(),
        Regex::new(r"(?s)EXTREMELY IMPORTANT:.*$").unwrap(),
        Regex::new(r"(?s)\n[ \t]*-{3,}.*$").unwrap(),
    ]
});

/// Whole-value placeholders the answering service emits instead of an answer.
static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^
        (?:(?:this|that|it)\s+(?:is|was)\s+)?
        (?:
            no\s+(?:specific\s+|further\s+)?information\s+(?:is\s+)?(?:available|provided|given|found)
          | not\s+(?:explicitly\s+|specifically\s+)?
            (?:provided|specified|mentioned|detailed|stated|available|given|listed|found|included|described)
            (?:\s+(?:in|by|within)\s+(?:the\s+)?(?:given\s+|provided\s+|available\s+|supplied\s+)?
               (?:sources?|text|documents?|materials?|information|context))?
        )
        \s*\.?$",
    )
    .unwrap()
});

/// Remove citation blocks, trailers and glued citation digits.
pub fn strip(text: &str) -> String {
    to_fixpoint(text, false)
}

/// Like [`strip`] but keeps trailing digits, for values such as "C16H17NO4".
pub fn strip_blocks(text: &str) -> String {
    to_fixpoint(text, true)
}

/// True when the ENTIRE value is a "no information" placeholder.
pub fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE.is_match(text.trim())
}

/// Strip and map empty results and placeholders to `None`.
pub fn strip_field(text: &str) -> Option<String> {
    non_answer_to_none(strip(text))
}

/// [`strip_blocks`] counterpart of [`strip_field`].
pub fn strip_field_blocks(text: &str) -> Option<String> {
    non_answer_to_none(strip_blocks(text))
}

fn non_answer_to_none(cleaned: String) -> Option<String> {
    if cleaned.is_empty() || is_boilerplate(&cleaned) {
        None
    } else {
        Some(cleaned)
    }
}

fn to_fixpoint(text: &str, keep_digits: bool) -> String {
    let mut current = strip_pass(text, keep_digits);
    loop {
        let next = strip_pass(&current, keep_digits);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_pass(text: &str, keep_digits: bool) -> String {
    let mut out = CITATION_BLOCK.replace_all(text, "").into_owned();
    for trailer in TRAILERS.iter() {
        out = trailer.replace_all(&out, "").into_owned();
    }
    let out = out.trim();
    if keep_digits {
        return out.to_string();
    }
    let out = INLINE_CITATION.replace_all(out, "${1}${2}${3}");
    TRAILING_CITATION
        .replace(&out, "${1}${2}")
        .trim()
        .to_string()
}

use regex::{Regex, RegexBuilder};

use crate::error::{ConfigError, Result};

/// Trims and collapses internal whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `text` without `suffix`, compared ASCII case-insensitively.
pub fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || text.len() < suffix.len() {
        return None;
    }
    let split = text.len() - suffix.len();
    if !text.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = text.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

pub fn ends_with_ignore_case(text: &str, suffix: &str) -> bool {
    strip_suffix_ignore_case(text, suffix).is_some()
}

pub fn contains_ignore_case(text: &str, needle: &str) -> bool {
    text.to_ascii_uppercase()
        .contains(&needle.to_ascii_uppercase())
}

/// Whether `word` appears in `text` as a whole alphanumeric token.
pub fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| token.eq_ignore_ascii_case(word))
}

pub fn is_percentage(unit: &str) -> bool {
    unit.contains('%')
}

/// Compiles a case-insensitive regex, mapping failures to [`ConfigError`].
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compiles literal alternatives into one word-bounded, case-insensitive
/// regex. The matched alternative is capture group 1.
///
/// Boundaries are "not alphanumeric" rather than `\b` so literals that start
/// or end with punctuation (`%`, `/HPF`) still anchor correctly.
pub fn compile_literals<S: AsRef<str>>(alternatives: &[S]) -> Result<Regex> {
    let body = alternatives
        .iter()
        .map(|alternative| regex::escape(normalize_text(alternative.as_ref()).as_str()))
        .collect::<Vec<_>>()
        .join("|");
    compile_pattern(&format!(r"(?:^|[^[:alnum:]])({body})(?:[^[:alnum:]]|$)"))
}

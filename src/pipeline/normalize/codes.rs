use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// One uppercase letter, two digits, optional `.d` or `.dd` (ICD-10-like).
static ICD10_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]\d{2}(?:\.\d{1,2})?\b").unwrap());

/// Separators after which a diagnosis line stops being description text.
const DESCRIPTION_SEPARATORS: &[&str] = &["ICD", "-"];

/// Unique diagnosis codes found in `text`.
pub fn extract_codes(text: Option<&str>) -> BTreeSet<String> {
    let Some(text) = text else {
        return BTreeSet::new();
    };
    ICD10_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Free-text description preceding the code part of a diagnosis line.
///
/// Uses the first separator that occurs in the text; no separator means no
/// description.
pub fn extract_descriptions(text: Option<&str>) -> Vec<String> {
    let Some(text) = text else {
        return Vec::new();
    };

    DESCRIPTION_SEPARATORS
        .iter()
        .find_map(|sep| text.split_once(*sep))
        .map(|(before, _)| before.trim())
        .filter(|desc| !desc.is_empty())
        .map(|desc| vec![desc.to_string()])
        .unwrap_or_default()
}

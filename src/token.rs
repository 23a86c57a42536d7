/// Split `text` into lowercase word tokens.
///
/// Tag text, descriptions, and queries all pass through here, so
/// `"Install Knowledge?"` and `"install knowledge"` match identically.
/// Any non-alphanumeric character is a boundary (whitespace and
/// punctuation alike), and empty fragments are discarded. Deterministic
/// and total: empty or all-punctuation input yields an empty vector.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.to_lowercase())
        .collect()
}

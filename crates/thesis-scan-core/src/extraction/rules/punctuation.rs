//! Punctuation repair for recognized paragraph text.

use super::patterns::{COMMA_SPACING, PERIOD_SPACING, SEMICOLON_BEFORE_WORD, WHITESPACE_RUN};

/// Repair OCR punctuation in free text.
///
/// Semicolons before a word become commas, colons become periods unless
/// they sit between two digits, spacing around commas and periods is
/// normalized, whitespace is collapsed and a final period is guaranteed.
/// Blank input yields an empty string.
pub fn normalize_punctuation(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = SEMICOLON_BEFORE_WORD.replace_all(text, ",${1}");
    let text = replace_colons(&text);
    let text = COMMA_SPACING.replace_all(&text, ", ");
    let text = PERIOD_SPACING.replace_all(&text, ". ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    let mut text = text.trim().to_string();
    if !text.ends_with('.') {
        text.push('.');
    }
    text
}

/// Colons become periods, except between two digits ("10:30", "1:2").
fn replace_colons(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != ':' {
                return c;
            }
            let digit_before = i > 0 && chars[i - 1].is_ascii_digit();
            let digit_after = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if digit_before && digit_after { ':' } else { '.' }
        })
        .collect()
}

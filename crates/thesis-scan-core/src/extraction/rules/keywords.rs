//! Keyword list extraction.

use super::patterns::{COMMA_SPACING, KEYWORDS_LABEL, is_section_heading};

/// Collect the keyword list that follows a "Keywords" label.
///
/// Capture starts at the first line mentioning "keyword" and ends at the
/// next abstract, chapter or introduction heading. Labelled lines
/// contribute whatever follows the label; other captured lines are taken
/// whole.
pub fn extract_keywords<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let mut items: Vec<String> = Vec::new();
    let mut capture = false;

    for line in lines {
        let line = line.as_ref();

        if line.to_lowercase().contains("keyword") {
            capture = true;
            let stripped = KEYWORDS_LABEL.replace_all(line, "");
            if !stripped.is_empty() {
                items.push(stripped.into_owned());
            }
            continue;
        }

        if capture {
            if is_section_heading(line.trim_start()) {
                break;
            }
            items.push(line.to_string());
        }
    }

    let joined = items
        .iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| item.replace(';', ",").trim().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let keywords = COMMA_SPACING.replace_all(&joined, ", ").into_owned();

    (!keywords.is_empty()).then_some(keywords)
}

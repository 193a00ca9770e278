//! Abstract body extraction.

use super::patterns::is_keywords_heading;
use super::punctuation::normalize_punctuation;

/// Collect the abstract paragraph up to the "Keywords" label.
pub fn extract_abstract<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    let mut abstract_lines: Vec<&str> = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        if is_keywords_heading(line) {
            break;
        }
        if line.to_lowercase().contains("keywords") {
            continue;
        }
        abstract_lines.push(line);
    }

    let text = normalize_punctuation(&abstract_lines.join(" "));
    (!text.is_empty()).then_some(text)
}

//! Title and author extraction from a thesis title page.

use serde::{Deserialize, Serialize};

use super::patterns::is_author_line;

/// Title and authors found on a title page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleAuthors {
    pub title: Option<String>,
    pub authors: Option<String>,
}

/// Split title page lines into title and authors.
///
/// Lines before the first author line form the title. After that only
/// author lines are kept; anything else (adviser names, institution) is
/// ignored.
pub fn extract_title_authors<S: AsRef<str>>(lines: &[S]) -> TitleAuthors {
    let mut title_lines: Vec<&str> = Vec::new();
    let mut authors: Vec<&str> = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        if is_author_line(line) {
            authors.push(line.trim_end_matches(','));
        } else if authors.is_empty() {
            title_lines.push(line);
        }
    }

    TitleAuthors {
        title: (!title_lines.is_empty()).then(|| title_lines.join(" ")),
        authors: (!authors.is_empty()).then(|| authors.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_then_author() {
        let result = extract_title_authors(&["A Study of Rivers", "Smith, John"]);

        assert_eq!(
            result,
            TitleAuthors {
                title: Some("A Study of Rivers".to_string()),
                authors: Some("Smith, John".to_string()),
            }
        );
    }

    #[test]
    fn test_author_first_leaves_no_title() {
        let result = extract_title_authors(&["Smith J.", "A Study of Rivers"]);

        assert_eq!(result.title, None);
        assert_eq!(result.authors, Some("Smith J.".to_string()));
    }

    #[test]
    fn test_multi_line_title_and_several_authors() {
        let lines = [
            "AN AUTOMATED LIBRARY",
            "CATALOGUING SYSTEM USING OCR",
            "Dela Cruz, Maria A.,",
            "Reyes, Paolo B.,",
            "Bachelor of Science in Information Technology",
            "Santos, Carla D.",
        ];

        let result = extract_title_authors(&lines);

        assert_eq!(
            result.title.as_deref(),
            Some("AN AUTOMATED LIBRARY CATALOGUING SYSTEM USING OCR")
        );
        assert_eq!(
            result.authors.as_deref(),
            Some("Dela Cruz, Maria A., Reyes, Paolo B., Santos, Carla D.")
        );
    }

    #[test]
    fn test_no_authors_keeps_whole_page_as_title() {
        let result = extract_title_authors(&["RIVER HEALTH", "IN THE PHILIPPINES"]);

        assert_eq!(result.title.as_deref(), Some("RIVER HEALTH IN THE PHILIPPINES"));
        assert_eq!(result.authors, None);
    }

    #[test]
    fn test_empty_batch() {
        let lines: [&str; 0] = [];
        assert_eq!(extract_title_authors(&lines), TitleAuthors::default());
    }
}

//! Regex patterns and line predicates for thesis page extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Author listings: surname first ("Smith, John") or initialed ("Smith J.")
    pub static ref AUTHOR_SURNAME_FIRST: Regex = Regex::new(
        r"[A-Z][a-z]+.*,"
    ).unwrap();

    pub static ref AUTHOR_INITIALED: Regex = Regex::new(
        r"[A-Z][a-z]+ [A-Z]\."
    ).unwrap();

    // Publication date ("March 2024")
    pub static ref MONTH_YEAR: Regex = Regex::new(
        r"[A-Z][a-z]+ \d{4}"
    ).unwrap();

    // "Keywords:" / "Keyword -" label at the start of a line
    pub static ref KEYWORDS_HEADING: Regex = Regex::new(
        r"(?i)^keywords?\s*[:\-]?"
    ).unwrap();

    // The same label anywhere in a line, with trailing spacing, for stripping
    pub static ref KEYWORDS_LABEL: Regex = Regex::new(
        r"(?i)keywords?\s*[:\-]?\s*"
    ).unwrap();

    // Headings that follow a keyword list
    pub static ref SECTION_HEADING: Regex = Regex::new(
        r"(?i)^(abstract|chapter|introduction)"
    ).unwrap();

    // Punctuation repair
    pub static ref SEMICOLON_BEFORE_WORD: Regex = Regex::new(
        r";(\s*[a-zA-Z0-9])"
    ).unwrap();

    pub static ref COMMA_SPACING: Regex = Regex::new(
        r"\s*,\s*"
    ).unwrap();

    pub static ref PERIOD_SPACING: Regex = Regex::new(
        r"\s*\.\s*"
    ).unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(
        r"\s+"
    ).unwrap();
}

/// A line listing one or more authors.
pub fn is_author_line(line: &str) -> bool {
    AUTHOR_SURNAME_FIRST.is_match(line) || AUTHOR_INITIALED.is_match(line)
}

/// A line naming both the department and the college.
pub fn is_department_college_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("department") && lower.contains("college")
}

/// A line carrying a "<Month> <Year>" date.
pub fn is_date_line(line: &str) -> bool {
    MONTH_YEAR.is_match(line)
}

/// First "<Month> <Year>" occurrence in a line.
pub fn find_month_year(line: &str) -> Option<&str> {
    MONTH_YEAR.find(line).map(|m| m.as_str())
}

/// A line opening with a "Keywords" label.
pub fn is_keywords_heading(line: &str) -> bool {
    KEYWORDS_HEADING.is_match(line)
}

/// A line opening one of the sections that follow the keyword list.
pub fn is_section_heading(line: &str) -> bool {
    SECTION_HEADING.is_match(line)
}

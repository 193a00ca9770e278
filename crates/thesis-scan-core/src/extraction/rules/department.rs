//! Department name to degree program abbreviation.

const SKIP_WORDS: [&str; 3] = ["of", "the", "and"];

/// Abbreviate a department name into a Bachelor of Science program code.
///
/// Initials of the words left after dropping "of", "the" and "and" are
/// prefixed with `BS`, minus the first initial, which is assumed to belong
/// to the word "Department":
/// "Department of Information Technology" → "BSIT".
///
/// Returns `None` for an empty name.
pub fn abbreviate_department(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }

    let initials: String = name
        .split_whitespace()
        .filter(|word| !SKIP_WORDS.iter().any(|skip| word.eq_ignore_ascii_case(skip)))
        .filter_map(|word| word.chars().next())
        .skip(1)
        .flat_map(char::to_uppercase)
        .collect();

    Some(format!("BS{}", initials))
}

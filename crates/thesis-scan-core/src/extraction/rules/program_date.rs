//! Degree program, college and publication date extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::department::abbreviate_department;
use super::patterns::{find_month_year, is_date_line, is_department_college_line};

/// Program/course and publication date found on an approval or title page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDate {
    pub program_course: Option<String>,
    pub date_published: Option<String>,
}

/// Extract the program (abbreviated department plus college) and date.
pub fn extract_program_date<S: AsRef<str>>(lines: &[S]) -> ProgramDate {
    let mut department: Option<String> = None;
    let mut course: Option<String> = None;
    let mut date_published: Option<String> = None;

    for line in lines {
        let line = line.as_ref().trim();
        if line.is_empty() {
            continue;
        }
        // ASCII lowering keeps byte offsets aligned with `line`
        let lower = line.to_ascii_lowercase();

        if department.is_none() && course.is_none() && is_department_college_line(line) {
            let (dept, college) = split_department_college(line, &lower);
            trace!("Department/college line: {:?} / {:?}", dept, college);
            department = Some(dept);
            course = Some(college);
        } else if department.is_none() && lower.starts_with("department") {
            department = Some(line.to_string());
        } else if department.is_some() && course.is_none() && lower.starts_with("college") {
            course = Some(line.to_string());
        }

        if date_published.is_none() && is_date_line(line) {
            date_published = find_month_year(line).map(str::to_string);
        }
    }

    let mut program = department
        .as_deref()
        .and_then(abbreviate_department)
        .or(department)
        .unwrap_or_default();

    if let Some(course) = course {
        program.push_str(", ");
        program.push_str(&course);
    }

    ProgramDate {
        program_course: (!program.is_empty()).then_some(program),
        date_published,
    }
}

/// Department text runs from "department" up to "college"; the course is
/// everything from "college" on.
fn split_department_college(line: &str, lower: &str) -> (String, String) {
    let (Some(d_idx), Some(c_idx)) = (lower.find("department"), lower.find("college")) else {
        return (String::new(), String::new());
    };

    let department = if d_idx < c_idx {
        line[d_idx..c_idx].trim()
    } else {
        ""
    };
    let course = line[c_idx..].trim();

    (department.to_string(), course.to_string())
}

/// Parse a "<Month> <Year>" date into the first day of that month.
///
/// Accepts full and three-letter English month names.
pub fn parse_publication_date(text: &str) -> Option<NaiveDate> {
    let (month, year) = text.trim().split_once(char::is_whitespace)?;
    let month = month_to_number(month)?;
    let year: i32 = year.trim().parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_to_number(month: &str) -> Option<u32> {
    let number = match month.to_lowercase().trim_end_matches('.') {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(number)
}

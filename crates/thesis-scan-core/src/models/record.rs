//! Thesis catalogue record assembled from the four extraction steps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extraction::rules::parse_publication_date;
use crate::extraction::{ExtractedFields, ExtractionMode, ExtractionResult};
use crate::ocr::round2;

/// Page images grouped by the extraction step that reads them.
#[derive(Debug, Clone)]
pub struct RecordPages<B = Vec<u8>> {
    /// Title page(s).
    pub title_authors: Vec<B>,
    /// Approval sheet or other page naming department and date.
    pub program_date: Vec<B>,
    /// Abstract page(s).
    pub abstract_text: Vec<B>,
    /// Page(s) carrying the keyword list.
    pub keywords: Vec<B>,
}

impl<B> RecordPages<B> {
    /// Pages submitted for `mode`.
    pub fn pages(&self, mode: ExtractionMode) -> &[B] {
        match mode {
            ExtractionMode::TitleAuthors => &self.title_authors,
            ExtractionMode::ProgramDate => &self.program_date,
            ExtractionMode::Abstract => &self.abstract_text,
            ExtractionMode::Keywords => &self.keywords,
        }
    }

    /// True when no step has pages.
    pub fn is_empty(&self) -> bool {
        ExtractionMode::ALL
            .iter()
            .all(|&mode| self.pages(mode).is_empty())
    }
}

impl<B> Default for RecordPages<B> {
    fn default() -> Self {
        Self {
            title_authors: Vec::new(),
            program_date: Vec::new(),
            abstract_text: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

/// Accuracy of each step that ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepAccuracy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_authors: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_date: Option<f64>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<f64>,
}

impl StepAccuracy {
    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        [
            self.title_authors,
            self.program_date,
            self.abstract_text,
            self.keywords,
        ]
        .into_iter()
        .flatten()
    }
}

/// A thesis catalogue entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThesisRecord {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub program_course: Option<String>,

    /// Publication date as printed, e.g. "March 2024".
    pub date_published: Option<String>,

    /// First day of the publication month, when the printed date parses.
    pub date_published_iso: Option<NaiveDate>,

    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,

    pub keywords: Option<String>,

    /// Accuracy per step.
    pub steps: StepAccuracy,

    /// Mean accuracy of the steps that ran.
    pub accuracy: f64,
}

impl ThesisRecord {
    /// Fields that must be present before a record can be catalogued.
    pub const REQUIRED_FIELDS: [&'static str; 4] =
        ["title", "authors", "program_course", "date_published"];

    /// Merge extraction results. Later results for the same step win.
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        let mut record = Self::default();

        for result in results {
            match &result.fields {
                ExtractedFields::TitleAuthors { title, authors } => {
                    record.title = title.clone();
                    record.authors = authors.clone();
                    record.steps.title_authors = Some(result.accuracy);
                }
                ExtractedFields::ProgramDate {
                    program_course,
                    date_published,
                } => {
                    record.program_course = program_course.clone();
                    record.date_published = date_published.clone();
                    record.date_published_iso =
                        date_published.as_deref().and_then(parse_publication_date);
                    record.steps.program_date = Some(result.accuracy);
                }
                ExtractedFields::Abstract { abstract_text } => {
                    record.abstract_text = abstract_text.clone();
                    record.steps.abstract_text = Some(result.accuracy);
                }
                ExtractedFields::Keywords { keywords } => {
                    record.keywords = keywords.clone();
                    record.steps.keywords = Some(result.accuracy);
                }
            }
        }

        let ran: Vec<f64> = record.steps.values().collect();
        record.accuracy = if ran.is_empty() {
            0.0
        } else {
            round2(ran.iter().sum::<f64>() / ran.len() as f64)
        };

        record
    }

    /// Required catalogue fields that are still null.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let values = [
            &self.title,
            &self.authors,
            &self.program_course,
            &self.date_published,
        ];

        Self::REQUIRED_FIELDS
            .into_iter()
            .zip(values)
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    /// True when every required field is present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

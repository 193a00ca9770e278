//! Bibliographic field extraction from recognized thesis pages.

pub mod rules;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ocr::{LineBatch, RecognizedLine};

use rules::{extract_abstract, extract_keywords, extract_program_date, extract_title_authors};

/// Which group of fields a request extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    TitleAuthors,
    ProgramDate,
    Abstract,
    Keywords,
}

impl ExtractionMode {
    /// Every mode, in catalogue order.
    pub const ALL: [ExtractionMode; 4] = [
        ExtractionMode::TitleAuthors,
        ExtractionMode::ProgramDate,
        ExtractionMode::Abstract,
        ExtractionMode::Keywords,
    ];

    /// Keyword pages get the gentler denoise and keyword recognition profile.
    pub fn is_keyword_mode(self) -> bool {
        matches!(self, ExtractionMode::Keywords)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMode::TitleAuthors => "title-authors",
            ExtractionMode::ProgramDate => "program-date",
            ExtractionMode::Abstract => "abstract",
            ExtractionMode::Keywords => "keywords",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "title-authors" => Ok(ExtractionMode::TitleAuthors),
            "program-date" => Ok(ExtractionMode::ProgramDate),
            "abstract" => Ok(ExtractionMode::Abstract),
            "keywords" => Ok(ExtractionMode::Keywords),
            other => Err(format!("unknown extraction mode: {}", other)),
        }
    }
}

/// Fields produced by one extraction mode.
///
/// Serializes flat, with `null` for absent fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExtractedFields {
    TitleAuthors {
        title: Option<String>,
        authors: Option<String>,
    },
    ProgramDate {
        program_course: Option<String>,
        date_published: Option<String>,
    },
    Abstract {
        #[serde(rename = "abstract")]
        abstract_text: Option<String>,
    },
    Keywords {
        keywords: Option<String>,
    },
}

impl ExtractedFields {
    /// Mode these fields belong to.
    pub fn mode(&self) -> ExtractionMode {
        match self {
            ExtractedFields::TitleAuthors { .. } => ExtractionMode::TitleAuthors,
            ExtractedFields::ProgramDate { .. } => ExtractionMode::ProgramDate,
            ExtractedFields::Abstract { .. } => ExtractionMode::Abstract,
            ExtractedFields::Keywords { .. } => ExtractionMode::Keywords,
        }
    }

    /// `(name, value)` pairs in output order.
    pub fn entries(&self) -> Vec<(&'static str, Option<&str>)> {
        match self {
            ExtractedFields::TitleAuthors { title, authors } => vec![
                ("title", title.as_deref()),
                ("authors", authors.as_deref()),
            ],
            ExtractedFields::ProgramDate {
                program_course,
                date_published,
            } => vec![
                ("program_course", program_course.as_deref()),
                ("date_published", date_published.as_deref()),
            ],
            ExtractedFields::Abstract { abstract_text } => {
                vec![("abstract", abstract_text.as_deref())]
            }
            ExtractedFields::Keywords { keywords } => vec![("keywords", keywords.as_deref())],
        }
    }

    /// True when every field is absent.
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, value)| value.is_none())
    }
}

/// Run the extractor for `mode` over a merged line sequence.
pub fn extract_fields(mode: ExtractionMode, lines: &[RecognizedLine]) -> ExtractedFields {
    match mode {
        ExtractionMode::TitleAuthors => {
            let found = extract_title_authors(lines);
            ExtractedFields::TitleAuthors {
                title: found.title,
                authors: found.authors,
            }
        }
        ExtractionMode::ProgramDate => {
            let found = extract_program_date(lines);
            ExtractedFields::ProgramDate {
                program_course: found.program_course,
                date_published: found.date_published,
            }
        }
        ExtractionMode::Abstract => ExtractedFields::Abstract {
            abstract_text: extract_abstract(lines),
        },
        ExtractionMode::Keywords => ExtractedFields::Keywords {
            keywords: extract_keywords(lines),
        },
    }
}

/// Result of one extraction request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    /// Extracted fields.
    #[serde(flatten)]
    pub fields: ExtractedFields,

    /// Recognition quality of the batch, 0-100.
    pub accuracy: f64,
}

impl ExtractionResult {
    /// Extract `mode` fields from a batch and attach its accuracy.
    pub fn from_batch(mode: ExtractionMode, batch: &LineBatch) -> Self {
        Self {
            fields: extract_fields(mode, &batch.lines),
            accuracy: batch.accuracy(),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.fields.mode()
    }

    /// Value of a named field, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .entries()
            .into_iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value)
    }
}

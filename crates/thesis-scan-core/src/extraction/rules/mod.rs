//! Rule-based field extractors for thesis pages.
//!
//! Each extractor is a pure function over the merged line batch of one
//! request; none of them look at pixels or keep state between calls.

pub mod abstract_text;
pub mod department;
pub mod keywords;
pub mod patterns;
pub mod program_date;
pub mod punctuation;
pub mod title_authors;

pub use abstract_text::extract_abstract;
pub use department::abbreviate_department;
pub use keywords::extract_keywords;
pub use patterns::*;
pub use program_date::{ProgramDate, extract_program_date, parse_publication_date};
pub use punctuation::normalize_punctuation;
pub use title_authors::{TitleAuthors, extract_title_authors};
